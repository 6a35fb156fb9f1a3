use crate::{Attribute, DerivationRule, Formula, Schema};
use std::sync::Arc;



// Engine tests
mod engine;



/// R/L circuit: tau = L / R, with the inverse rule for L
fn rl_schema() -> Arc<Schema> {
    Schema::builder("rl")
        .attribute(
            Attribute::base("R")
                .with_units("Ohm")
                .with_description("Resistance"),
        )
        .attribute(
            Attribute::base("L")
                .with_units("H")
                .with_description("Inductance"),
        )
        .attribute(
            Attribute::derived("tau", ["L", "R"], Formula::scalar(|[l, r]| l / r))
                .with_units("s")
                .with_description("Time constant"),
        )
        .rule(DerivationRule::new(
            "L",
            ["tau", "R"],
            Formula::scalar(|[tau, r]| tau * r),
        ))
        .build()
        .unwrap()
}
