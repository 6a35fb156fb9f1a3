//! # Deductor
//!
//! **Declare the quantities, give what you know, deduce the rest.**
//!
//! Deductor is a small forward-chaining inference engine over named numeric
//! quantities. A schema declares stored, derived and aliased attributes plus
//! pure relations between them; a model is deduced from any partial set of
//! known values, with contradictions and invariant violations reported.
//!
//! ## Quick Start
//!
//! ```rust
//! use deductor::{Attribute, DerivationRule, Formula, Model, Schema, DeductorResult};
//!
//! fn main() -> DeductorResult<()> {
//!     let schema = Schema::builder("rl_circuit")
//!         .attribute(Attribute::base("R").with_units("Ohm"))
//!         .attribute(Attribute::base("L").with_units("H"))
//!         .attribute(
//!             Attribute::derived("tau", ["L", "R"], Formula::scalar(|[l, r]| l / r))
//!                 .with_units("s"),
//!         )
//!         .rule(DerivationRule::new("L", ["tau", "R"], Formula::scalar(|[tau, r]| tau * r)))
//!         .build()?;
//!
//!     let model = Model::from_seed(&schema, [("R", 2.0), ("tau", 2.0)])?;
//!     assert_eq!(model.value("L")?.known(), Some(4.0));
//!     Ok(())
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### Attributes
//! Base attributes are stored. Derived attributes are computed from other
//! attributes on every read. Aliases and scaled aliases are read/write
//! synonyms that write through to their target.
//!
//! ### Rules
//! Every non-base attribute implies rules; schemas add explicit rules for the
//! inverse relations. Deduction applies all rules until nothing new is learned.
//!
//! ### Validators
//! Boolean invariants checked once deduction has converged.

pub mod attribute;
pub mod engine;
pub mod error;
pub mod model;
pub mod options;
pub mod rule;
pub mod schema;
pub mod serializers;
pub mod validator;
pub mod value;

pub use attribute::{Attribute, AttributeKind, AttributeSummary, BASE_GROUP};
pub use engine::{contradicts, Closure, DeductionEngine, Derivation, Source};
pub use error::DeductorError;
pub use model::{Model, ModelLabel, ALL_GROUPS};
pub use options::DeductionOptions;
pub use rule::{DerivationRule, Formula, Names};
pub use schema::{is_valid_name, Schema, SchemaBuilder};
pub use validator::{Validator, Verdict};
pub use value::{AnnotatedValue, Row, Value};

/// Result type for Deductor operations
pub type DeductorResult<T> = Result<T, DeductorError>;

#[cfg(test)]
mod tests;
