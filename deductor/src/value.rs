use serde::Serialize;
use std::fmt;

/// A numeric value that may not be known
///
/// Replaces NaN as the unknown marker: NaN compares unequal to itself and
/// silently propagates through arithmetic, `Unknown` does neither.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum Value {
    Known(f64),
    #[default]
    Unknown,
}

impl Value {
    /// Normalize a raw float: NaN becomes `Unknown`
    pub fn from_f64(value: f64) -> Self {
        if value.is_nan() {
            Value::Unknown
        } else {
            Value::Known(value)
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Value::Known(_))
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Value::Unknown)
    }

    /// Get the number if known
    pub fn known(&self) -> Option<f64> {
        match self {
            Value::Known(v) => Some(*v),
            Value::Unknown => None,
        }
    }

    /// Apply `f` to a known value, keep `Unknown` as is
    pub fn map(self, f: impl FnOnce(f64) -> f64) -> Self {
        match self {
            Value::Known(v) => Value::from_f64(f(v)),
            Value::Unknown => Value::Unknown,
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::from_f64(value)
    }
}

impl From<Option<f64>> for Value {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Value::Unknown, Value::from_f64)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Known(v) => write!(f, "{}", v),
            Value::Unknown => write!(f, "?"),
        }
    }
}

/// A value together with the units and description of the attribute it was read from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotatedValue {
    pub value: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl AnnotatedValue {
    pub fn new(value: Value, units: Option<String>, description: Option<String>) -> Self {
        Self {
            value,
            units,
            description,
        }
    }

    pub fn known(&self) -> Option<f64> {
        self.value.known()
    }

    pub fn is_known(&self) -> bool {
        self.value.is_known()
    }
}

impl fmt::Display for AnnotatedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)?;
        if let Some(units) = &self.units {
            write!(f, " {}", units)?;
        }
        if let Some(description) = &self.description {
            write!(f, " ({})", description)?;
        }
        Ok(())
    }
}

/// One line of the tabular listing of a model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    pub name: String,
    pub value: Option<f64>,
    pub units: Option<String>,
    pub description: Option<String>,
}
