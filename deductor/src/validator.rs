//! Post-deduction invariants
//!
//! A validator is a boolean predicate over named attributes. It runs once
//! deduction has converged; a strict validator also insists that all of its
//! inputs are known.

use crate::{DeductorError, DeductorResult, Model};
use std::fmt;
use std::sync::Arc;

type Predicate = dyn Fn(&[f64]) -> bool + Send + Sync;

/// Outcome of a validator that did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The predicate held
    Passed,
    /// Some inputs are unknown and the validator is not strict
    Skipped,
}

/// A named boolean invariant over a set of attributes
#[derive(Clone)]
pub struct Validator {
    description: String,
    inputs: Vec<String>,
    predicate: Arc<Predicate>,
    strict: bool,
}

impl Validator {
    /// Create a non-strict validator over `inputs`
    pub fn new<const N: usize, F>(description: impl Into<String>, inputs: [&str; N], predicate: F) -> Self
    where
        F: Fn([f64; N]) -> bool + Send + Sync + 'static,
    {
        let body = move |args: &[f64]| {
            let args: [f64; N] = std::array::from_fn(|i| args[i]);
            predicate(args)
        };
        Self {
            description: description.into(),
            inputs: inputs.iter().map(|s| s.to_string()).collect(),
            predicate: Arc::new(body),
            strict: false,
        }
    }

    /// Require every input to be known
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn inputs(&self) -> &[String] {
        &self.inputs
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Check the invariant against the current values of a model
    pub fn evaluate(&self, model: &Model) -> DeductorResult<Verdict> {
        let mut args = Vec::with_capacity(self.inputs.len());
        let mut missing = Vec::new();
        for name in &self.inputs {
            match model.get(name)?.known() {
                Some(value) => args.push(value),
                None => missing.push(name.clone()),
            }
        }

        if !missing.is_empty() {
            if self.strict {
                return Err(DeductorError::MissingInput {
                    validator: self.description.clone(),
                    names: missing,
                });
            }
            return Ok(Verdict::Skipped);
        }

        if (self.predicate)(&args) {
            Ok(Verdict::Passed)
        } else {
            Err(DeductorError::ValidationFailed {
                description: self.description.clone(),
            })
        }
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("description", &self.description)
            .field("inputs", &self.inputs)
            .field("strict", &self.strict)
            .finish_non_exhaustive()
    }
}
