use std::fmt;

/// Error types for schema composition, deduction and validation
///
/// Every construction-time error aborts the whole construction: there is no
/// partially built model.
#[derive(Debug, Clone, PartialEq)]
pub enum DeductorError {
    /// Malformed schema: bad name, duplicate name, missing target or arity mismatch
    Schema(String),

    /// A name that is neither a base attribute nor used by any rule
    UnknownVariable { name: String },

    /// A seed value that is NaN or infinite
    InvalidSeed { name: String, value: f64 },

    /// A rule produced an undefined value during deduction
    DeducedNaN { name: String, rule: String },

    /// Two sources disagree on a value beyond the relative tolerance
    Contradiction {
        name: String,
        rule: String,
        existing: f64,
        deduced: f64,
    },

    /// A strict validator could not run because some of its inputs are unknown
    MissingInput {
        validator: String,
        names: Vec<String>,
    },

    /// A validator predicate evaluated to false
    ValidationFailed { description: String },

    /// Deduction did not reach a fixed point within the pass ceiling
    NonConvergence { passes: usize },

    /// Attempt to assign an attribute that has no setter
    ReadOnly { name: String },

    /// Seed or query input that could not be read
    Input(String),
}

impl DeductorError {
    /// Create a schema error
    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema(message.into())
    }

    /// Short machine-friendly name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            DeductorError::Schema(_) => "schema",
            DeductorError::UnknownVariable { .. } => "unknown_variable",
            DeductorError::InvalidSeed { .. } => "invalid_seed",
            DeductorError::DeducedNaN { .. } => "deduced_nan",
            DeductorError::Contradiction { .. } => "contradiction",
            DeductorError::MissingInput { .. } => "missing_input",
            DeductorError::ValidationFailed { .. } => "validation_failed",
            DeductorError::NonConvergence { .. } => "non_convergence",
            DeductorError::ReadOnly { .. } => "read_only",
            DeductorError::Input(_) => "input",
        }
    }
}

impl fmt::Display for DeductorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeductorError::Schema(msg) => write!(f, "Schema error: {}", msg),
            DeductorError::UnknownVariable { name } => {
                write!(f, "Unknown variable '{}'", name)
            }
            DeductorError::InvalidSeed { name, value } => {
                write!(f, "Invalid value {} for '{}'", value, name)
            }
            DeductorError::DeducedNaN { name, rule } => {
                write!(f, "Value of '{}' deduced by {} is undefined", name, rule)
            }
            DeductorError::Contradiction {
                name,
                rule,
                existing,
                deduced,
            } => write!(
                f,
                "Contradiction: '{}' is {}, but {} deduces {}",
                name, existing, rule, deduced
            ),
            DeductorError::MissingInput { validator, names } => write!(
                f,
                "Missing input: {}: attributes {} must be defined",
                validator,
                names.join(", ")
            ),
            DeductorError::ValidationFailed { description } => {
                write!(f, "Validation failed: {}", description)
            }
            DeductorError::NonConvergence { passes } => write!(
                f,
                "Deduction did not converge after {} passes",
                passes
            ),
            DeductorError::ReadOnly { name } => {
                write!(f, "Attribute '{}' is read-only", name)
            }
            DeductorError::Input(msg) => write!(f, "Input error: {}", msg),
        }
    }
}

impl std::error::Error for DeductorError {}

impl From<serde_json::Error> for DeductorError {
    fn from(err: serde_json::Error) -> Self {
        DeductorError::Input(format!("JSON error: {}", err))
    }
}
