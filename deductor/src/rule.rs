//! Derivation rules
//!
//! A rule maps a fixed ordered set of input names to a fixed ordered set of
//! output names through a pure [`Formula`]. Rules hold no state and are
//! shared by every model built from the same schema.

use crate::{DeductorError, DeductorResult, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

type Body = dyn Fn(&[f64]) -> Vec<Value> + Send + Sync;

/// The pure function body of a rule or derived attribute
///
/// Input and output arity are fixed when the formula is built, so a schema can
/// check them against the declared names before any deduction runs.
#[derive(Clone)]
pub struct Formula {
    arity: usize,
    outputs: usize,
    body: Arc<Body>,
}

impl Formula {
    fn from_body(arity: usize, outputs: usize, body: Arc<Body>) -> Self {
        Self {
            arity,
            outputs,
            body,
        }
    }

    /// A total function of `N` inputs with one output
    ///
    /// A NaN result is read as undefined.
    pub fn scalar<const N: usize, F>(f: F) -> Self
    where
        F: Fn([f64; N]) -> f64 + Send + Sync + 'static,
    {
        let body = move |args: &[f64]| {
            let args: [f64; N] = std::array::from_fn(|i| args[i]);
            vec![Value::from_f64(f(args))]
        };
        Self::from_body(N, 1, Arc::new(body))
    }

    /// A partial function of `N` inputs: `None` means no solution exists
    pub fn partial<const N: usize, F>(f: F) -> Self
    where
        F: Fn([f64; N]) -> Option<f64> + Send + Sync + 'static,
    {
        let body = move |args: &[f64]| {
            let args: [f64; N] = std::array::from_fn(|i| args[i]);
            vec![Value::from(f(args))]
        };
        Self::from_body(N, 1, Arc::new(body))
    }

    /// A function of `N` inputs producing `M` outputs at once
    pub fn vector<const N: usize, const M: usize, F>(f: F) -> Self
    where
        F: Fn([f64; N]) -> [f64; M] + Send + Sync + 'static,
    {
        let body = move |args: &[f64]| {
            let args: [f64; N] = std::array::from_fn(|i| args[i]);
            f(args).into_iter().map(Value::from_f64).collect()
        };
        Self::from_body(N, M, Arc::new(body))
    }

    /// Pass-through of a single value
    pub fn identity() -> Self {
        Self::scalar(|[x]| x)
    }

    /// Multiplication of a single value by a constant
    pub fn scale(factor: f64) -> Self {
        Self::scalar(move |[x]| factor * x)
    }

    /// Number of inputs the formula takes
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Number of values the formula returns
    pub fn outputs(&self) -> usize {
        self.outputs
    }

    /// Evaluate the formula on positional arguments
    pub fn call(&self, args: &[f64]) -> DeductorResult<Vec<Value>> {
        if args.len() != self.arity {
            return Err(DeductorError::schema(format!(
                "formula takes {} arguments, {} given",
                self.arity,
                args.len()
            )));
        }
        let values = (self.body)(args);
        if values.len() != self.outputs {
            return Err(DeductorError::schema(format!(
                "formula declared {} outputs but returned {}",
                self.outputs,
                values.len()
            )));
        }
        Ok(values)
    }
}

impl fmt::Debug for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Formula")
            .field("arity", &self.arity)
            .field("outputs", &self.outputs)
            .finish_non_exhaustive()
    }
}

/// Anything that can name one or more attributes
pub trait Names {
    fn into_names(self) -> Vec<String>;
}

impl Names for &str {
    fn into_names(self) -> Vec<String> {
        vec![self.to_string()]
    }
}

impl Names for String {
    fn into_names(self) -> Vec<String> {
        vec![self]
    }
}

impl<const N: usize> Names for [&str; N] {
    fn into_names(self) -> Vec<String> {
        self.iter().map(|s| s.to_string()).collect()
    }
}

impl Names for &[&str] {
    fn into_names(self) -> Vec<String> {
        self.iter().map(|s| s.to_string()).collect()
    }
}

impl Names for Vec<String> {
    fn into_names(self) -> Vec<String> {
        self
    }
}

/// A pure mapping from known input values to output values
#[derive(Debug, Clone)]
pub struct DerivationRule {
    outputs: Vec<String>,
    inputs: Vec<String>,
    formula: Formula,
    label: Option<String>,
}

impl DerivationRule {
    /// Create a rule producing `outputs` from `inputs`
    ///
    /// Arity is checked when the rule is registered in a schema.
    pub fn new(outputs: impl Names, inputs: impl Names, formula: Formula) -> Self {
        Self {
            outputs: outputs.into_names(),
            inputs: inputs.into_names(),
            formula,
            label: None,
        }
    }

    /// Attach a human-readable label used in diagnostics
    pub fn labeled(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn inputs(&self) -> &[String] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[String] {
        &self.outputs
    }

    pub fn formula(&self) -> &Formula {
        &self.formula
    }

    /// Check declared names against the formula arity
    pub(crate) fn check_arity(&self) -> DeductorResult<()> {
        if self.formula.arity() != self.inputs.len() {
            return Err(DeductorError::schema(format!(
                "{}: formula takes {} arguments but {} inputs are declared",
                self,
                self.formula.arity(),
                self.inputs.len()
            )));
        }
        if self.formula.outputs() != self.outputs.len() {
            return Err(DeductorError::schema(format!(
                "{}: formula returns {} values but {} outputs are declared",
                self,
                self.formula.outputs(),
                self.outputs.len()
            )));
        }
        Ok(())
    }

    /// Whether every input is among the known names
    pub fn is_applicable(&self, known: &HashMap<String, f64>) -> bool {
        self.inputs.iter().all(|name| known.contains_key(name))
    }

    /// Apply the rule to the known values
    ///
    /// Returns nothing unless every input is known; there is no partial application.
    pub fn apply(&self, known: &HashMap<String, f64>) -> DeductorResult<Vec<(String, Value)>> {
        let mut args = Vec::with_capacity(self.inputs.len());
        for name in &self.inputs {
            match known.get(name) {
                Some(value) => args.push(*value),
                None => return Ok(Vec::new()),
            }
        }
        let values = self.formula.call(&args)?;
        Ok(self.outputs.iter().cloned().zip(values).collect())
    }
}

impl fmt::Display for DerivationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.label {
            Some(label) => write!(f, "rule '{}'", label),
            None => write!(
                f,
                "rule ({}) -> ({})",
                self.inputs.join(", "),
                self.outputs.join(", ")
            ),
        }
    }
}
