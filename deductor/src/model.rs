//! Model instances
//!
//! A model stores only the values of its base attributes. Every derived,
//! alias and scaled-alias read is recomputed from the current base values,
//! so assigning a base attribute is immediately visible everywhere.

use crate::engine::{DeductionEngine, Derivation};
use crate::schema::Accessor;
use crate::value::{AnnotatedValue, Row};
use crate::{Attribute, DeductionOptions, DeductorError, DeductorResult, Schema, Value, Verdict};
use std::sync::Arc;

/// Group name that selects every attribute in listings
pub const ALL_GROUPS: &str = "all";

/// Name and description attached to a model instance
#[derive(Debug, Clone, PartialEq)]
pub struct ModelLabel {
    pub name: String,
    pub description: String,
}

/// An instance of a schema, built by deduction from a partial seed
#[derive(Debug, Clone)]
pub struct Model {
    schema: Arc<Schema>,
    rel_tolerance: f64,
    base: Vec<Value>,
    label: Option<ModelLabel>,
    trace: Vec<Derivation>,
}

impl Model {
    /// Deduce a model from a seed
    ///
    /// Runs deduction to a fixed point, stores the base values, fills base
    /// defaults that deduction left unknown, then runs the validators unless
    /// `options.validate` is off. Any failure aborts construction.
    pub fn new<I, S>(schema: &Arc<Schema>, seed: I, options: &DeductionOptions) -> DeductorResult<Self>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let closure = DeductionEngine::new(schema, options).deduce(seed)?;
        tracing::debug!(
            schema = %schema.name(),
            passes = closure.passes(),
            known = closure.known().len(),
            "deduction converged"
        );
        let (mut base, trace) = closure.into_parts();

        let base_attributes = schema.attributes().iter().filter(|attr| attr.is_base());
        for (value, attribute) in base.iter_mut().zip(base_attributes) {
            if let (Value::Unknown, Some(default)) = (*value, attribute.base_default()) {
                *value = Value::Known(default);
            }
        }

        let model = Self {
            schema: Arc::clone(schema),
            rel_tolerance: options.rel_tolerance,
            base,
            label: None,
            trace,
        };

        if options.validate {
            model.validate()?;
        }

        Ok(model)
    }

    /// Deduce a model with default options
    pub fn from_seed<I, S>(schema: &Arc<Schema>, seed: I) -> DeductorResult<Self>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        Self::new(schema, seed, &DeductionOptions::default())
    }

    /// Attach a name and description to this instance
    pub fn named(mut self, name: impl Into<String>, description: impl Into<String>) -> Self {
        self.label = Some(ModelLabel {
            name: name.into(),
            description: description.into(),
        });
        self
    }

    pub fn label(&self) -> Option<&ModelLabel> {
        self.label.as_ref()
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Relative tolerance the model was deduced with
    pub fn rel_tolerance(&self) -> f64 {
        self.rel_tolerance
    }

    /// Seed values and first derivations from construction
    pub fn trace(&self) -> &[Derivation] {
        &self.trace
    }

    /// Read an attribute with its units and description
    pub fn get(&self, name: &str) -> DeductorResult<AnnotatedValue> {
        let idx = self.lookup(name)?;
        let attribute = &self.schema.attributes()[idx];
        Ok(self.annotate(attribute, self.read(idx)?))
    }

    /// Read the bare value of an attribute
    pub fn value(&self, name: &str) -> DeductorResult<Value> {
        let idx = self.lookup(name)?;
        self.read(idx)
    }

    /// Assign an attribute
    ///
    /// Base attributes are stored; aliases and scaled aliases write through to
    /// their target. Derived attributes, and aliases of them, are read-only.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> DeductorResult<()> {
        let idx = self.lookup(name)?;
        self.write(name, idx, value.into())
    }

    /// Attributes of a group with their current values
    pub fn values_by_group(&self, group: &str) -> DeductorResult<Vec<(&Attribute, AnnotatedValue)>> {
        self.selected(group)
            .into_iter()
            .map(|(idx, attribute)| -> DeductorResult<_> {
                Ok((attribute, self.annotate(attribute, self.read(idx)?)))
            })
            .collect()
    }

    /// Tabular listing of a group, or of everything for `"all"`
    pub fn rows(&self, group: &str) -> DeductorResult<Vec<Row>> {
        self.selected(group)
            .into_iter()
            .map(|(idx, attribute)| -> DeductorResult<Row> {
                Ok(Row {
                    name: attribute.name().to_string(),
                    value: self.read(idx)?.known(),
                    units: attribute.units().map(String::from),
                    description: attribute.description().map(String::from),
                })
            })
            .collect()
    }

    /// Whether every base attribute is known
    pub fn is_fully_defined(&self) -> bool {
        self.base.iter().all(Value::is_known)
    }

    /// Run the schema validators in order, stopping at the first failure
    pub fn validate(&self) -> DeductorResult<()> {
        for validator in self.schema.validators() {
            let verdict = validator.evaluate(self)?;
            if verdict == Verdict::Skipped {
                tracing::debug!(validator = validator.description(), "validator skipped");
            }
        }
        Ok(())
    }

    fn selected(&self, group: &str) -> Vec<(usize, &Attribute)> {
        self.schema
            .attributes()
            .iter()
            .enumerate()
            .filter(|(_, attr)| group == ALL_GROUPS || attr.has_group(group))
            .collect()
    }

    fn lookup(&self, name: &str) -> DeductorResult<usize> {
        self.schema
            .index_of(name)
            .ok_or_else(|| DeductorError::UnknownVariable {
                name: name.to_string(),
            })
    }

    fn annotate(&self, attribute: &Attribute, value: Value) -> AnnotatedValue {
        AnnotatedValue::new(
            value,
            attribute.units().map(String::from),
            attribute.description().map(String::from),
        )
    }

    fn read(&self, idx: usize) -> DeductorResult<Value> {
        match self.schema.accessor(idx) {
            Accessor::Stored { slot } => Ok(self.base[*slot]),
            Accessor::Computed { inputs, formula } => {
                let mut args = Vec::with_capacity(inputs.len());
                for &input in inputs {
                    match self.read(input)? {
                        Value::Known(v) => args.push(v),
                        Value::Unknown => return Ok(Value::Unknown),
                    }
                }
                Ok(formula.call(&args)?.first().copied().unwrap_or_default())
            }
            Accessor::Alias { target, .. } => self.read(*target),
            Accessor::Scaled { scale, target, .. } => {
                let scale = *scale;
                Ok(self.read(*target)?.map(|x| scale * x))
            }
        }
    }

    fn write(&mut self, name: &str, idx: usize, value: Value) -> DeductorResult<()> {
        let read_only = || DeductorError::ReadOnly {
            name: name.to_string(),
        };
        match self.schema.accessor(idx).clone() {
            Accessor::Stored { slot } => {
                self.base[slot] = value;
                Ok(())
            }
            Accessor::Computed { .. } => Err(read_only()),
            Accessor::Alias { target, settable } => {
                if !settable {
                    return Err(read_only());
                }
                self.write(name, target, value)
            }
            Accessor::Scaled {
                scale,
                target,
                settable,
            } => {
                if !settable {
                    return Err(read_only());
                }
                self.write(name, target, value.map(|x| x / scale))
            }
        }
    }
}
