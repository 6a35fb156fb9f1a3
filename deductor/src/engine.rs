//! Forward-chaining deduction
//!
//! Computes the closure of a seed under the rules of a schema:
//! 1. Reject seed names the schema does not recognize, then non-finite seed values
//! 2. Apply every rule in order, repeatedly, until a pass adds nothing new
//! 3. Record every base attribute that was not reached as unknown
//!
//! The first value accepted for a name is authoritative. Later derivations
//! of the same name only confirm it or raise a contradiction, which makes the
//! final set of known values independent of rule order.

use crate::{DeductionOptions, DeductorError, DeductorResult, Schema, Value};
use serde::Serialize;
use std::collections::HashMap;

/// Where a known value came from
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "rule", rename_all = "snake_case")]
pub enum Source {
    Seed,
    Rule(String),
}

/// First derivation of a value during deduction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Derivation {
    pub name: String,
    pub value: f64,
    pub pass: usize,
    pub source: Source,
}

/// Result of a converged deduction
#[derive(Debug, Clone)]
pub struct Closure {
    known: HashMap<String, f64>,
    base: Vec<Value>,
    passes: usize,
    trace: Vec<Derivation>,
}

impl Closure {
    /// Every name that became known, with its value
    pub fn known(&self) -> &HashMap<String, f64> {
        &self.known
    }

    pub fn get(&self, name: &str) -> Value {
        self.known.get(name).copied().into()
    }

    /// Values of the schema's base attributes, in `Schema::base_names` order
    pub fn base_values(&self) -> &[Value] {
        &self.base
    }

    /// Number of full passes over the rule list, including the final quiet one
    pub fn passes(&self) -> usize {
        self.passes
    }

    /// Seed values and first derivations, in the order they were accepted
    pub fn trace(&self) -> &[Derivation] {
        &self.trace
    }

    pub(crate) fn into_parts(self) -> (Vec<Value>, Vec<Derivation>) {
        (self.base, self.trace)
    }
}

/// Whether `deduced` disagrees with `existing` beyond the relative tolerance
///
/// The comparison is strict: a difference exactly at the boundary agrees.
pub fn contradicts(existing: f64, deduced: f64, rel_tolerance: f64) -> bool {
    (deduced - existing).abs() > rel_tolerance * existing.abs().max(deduced.abs())
}

/// Deduces all derivable values of a schema from a seed
pub struct DeductionEngine<'a> {
    schema: &'a Schema,
    options: &'a DeductionOptions,
}

impl<'a> DeductionEngine<'a> {
    pub fn new(schema: &'a Schema, options: &'a DeductionOptions) -> Self {
        Self { schema, options }
    }

    /// Run deduction to a fixed point
    pub fn deduce<I, S>(&self, seed: I) -> DeductorResult<Closure>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let seed: Vec<(String, f64)> = seed.into_iter().map(|(n, v)| (n.into(), v)).collect();

        let rel_tolerance = self.options.rel_tolerance;
        if !rel_tolerance.is_finite() || rel_tolerance < 0.0 {
            return Err(DeductorError::Input(format!(
                "Relative tolerance must be a finite non-negative number, got {}",
                rel_tolerance
            )));
        }

        if let Some((name, _)) = seed.iter().find(|(name, _)| !self.schema.is_recognized(name)) {
            return Err(DeductorError::UnknownVariable { name: name.clone() });
        }
        if let Some((name, value)) = seed.iter().find(|(_, value)| !value.is_finite()) {
            return Err(DeductorError::InvalidSeed {
                name: name.clone(),
                value: *value,
            });
        }

        let mut known: HashMap<String, f64> = HashMap::new();
        let mut trace = Vec::new();
        for (name, value) in seed {
            match known.get(&name) {
                Some(&existing) => {
                    self.check_agreement(&name, existing, value, "seed")?;
                }
                None => {
                    trace.push(Derivation {
                        name: name.clone(),
                        value,
                        pass: 0,
                        source: Source::Seed,
                    });
                    known.insert(name, value);
                }
            }
        }

        let mut passes = 0;
        loop {
            if passes >= self.options.max_passes {
                return Err(DeductorError::NonConvergence { passes });
            }
            passes += 1;

            let mut added = 0;
            for rule in self.schema.rules() {
                for (name, value) in rule.apply(&known)? {
                    let Value::Known(value) = value else {
                        return Err(DeductorError::DeducedNaN {
                            name,
                            rule: rule.to_string(),
                        });
                    };
                    match known.get(&name) {
                        Some(&existing) => {
                            self.check_agreement(&name, existing, value, &rule.to_string())?;
                        }
                        None => {
                            tracing::trace!(name = %name, value, %rule, "deduced");
                            trace.push(Derivation {
                                name: name.clone(),
                                value,
                                pass: passes,
                                source: Source::Rule(rule.to_string()),
                            });
                            known.insert(name, value);
                            added += 1;
                        }
                    }
                }
            }

            tracing::debug!(pass = passes, added, known = known.len(), "deduction pass");
            if added == 0 {
                break;
            }
        }

        let base: Vec<Value> = self
            .schema
            .base_names()
            .iter()
            .map(|name| known.get(name).copied().into())
            .collect();

        Ok(Closure {
            known,
            base,
            passes,
            trace,
        })
    }

    fn check_agreement(
        &self,
        name: &str,
        existing: f64,
        deduced: f64,
        rule: &str,
    ) -> DeductorResult<()> {
        if contradicts(existing, deduced, self.options.rel_tolerance) {
            return Err(DeductorError::Contradiction {
                name: name.to_string(),
                rule: rule.to_string(),
                existing,
                deduced,
            });
        }
        Ok(())
    }
}
