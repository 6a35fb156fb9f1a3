use super::rl_schema;
use crate::{
    contradicts, Attribute, DeductionEngine, DeductionOptions, DeductorError, DerivationRule,
    Formula, Schema, Source, Value,
};

#[test]
fn test_deduce_derived_from_base() {
    let schema = rl_schema();
    let options = DeductionOptions::default();
    let closure = DeductionEngine::new(&schema, &options)
        .deduce([("R", 2.0), ("L", 4.0)])
        .unwrap();
    assert_eq!(closure.get("tau"), Value::Known(2.0));
    assert_eq!(closure.base_values(), &[Value::Known(2.0), Value::Known(4.0)]);
}

#[test]
fn test_deduce_base_through_inverse_rule() {
    let schema = rl_schema();
    let options = DeductionOptions::default();
    let closure = DeductionEngine::new(&schema, &options)
        .deduce([("R", 2.0), ("tau", 2.0)])
        .unwrap();
    assert_eq!(closure.get("L"), Value::Known(4.0));
}

#[test]
fn test_undeducible_base_is_unknown() {
    let schema = rl_schema();
    let options = DeductionOptions::default();
    let closure = DeductionEngine::new(&schema, &options)
        .deduce([("R", 2.0)])
        .unwrap();
    assert_eq!(closure.base_values(), &[Value::Known(2.0), Value::Unknown]);
    assert_eq!(closure.get("tau"), Value::Unknown);
}

#[test]
fn test_empty_seed_converges_in_one_pass() {
    let schema = rl_schema();
    let options = DeductionOptions::default();
    let closure = DeductionEngine::new(&schema, &options)
        .deduce(Vec::<(String, f64)>::new())
        .unwrap();
    assert_eq!(closure.passes(), 1);
    assert!(closure.known().is_empty());
}

#[test]
fn test_contradiction_reported_with_both_values() {
    let schema = rl_schema();
    let options = DeductionOptions::default();
    let result = DeductionEngine::new(&schema, &options).deduce([("R", 2.0), ("L", 4.0), ("tau", 3.0)]);
    match result {
        Err(DeductorError::Contradiction {
            name,
            existing,
            deduced,
            ..
        }) => {
            // L is confirmed by tau * R = 6 vs 4 or tau contradicted by L / R = 2 vs 3
            assert!(name == "L" || name == "tau");
            assert_ne!(existing, deduced);
        }
        other => panic!("Expected contradiction, got {:?}", other),
    }
}

#[test]
fn test_value_within_tolerance_is_confirmation() {
    let schema = rl_schema();
    let options = DeductionOptions::default();
    let closure = DeductionEngine::new(&schema, &options)
        .deduce([("R", 2.0), ("L", 4.0), ("tau", 2.05)])
        .unwrap();
    // the seed stays authoritative
    assert_eq!(closure.get("tau"), Value::Known(2.05));
    assert_eq!(closure.get("L"), Value::Known(4.0));
}

#[test]
fn test_tolerance_boundary_is_strict() {
    assert!(!contradicts(100.0, 95.0, 0.05));
    assert!(contradicts(100.0, 94.9, 0.05));
    assert!(!contradicts(0.0, 0.0, 0.05));
    assert!(contradicts(0.0, 1e-12, 0.05));
    assert!(!contradicts(-2.0, -2.05, 0.05));
}

#[test]
fn test_tighter_tolerance_turns_confirmation_into_contradiction() {
    let schema = rl_schema();
    let options = DeductionOptions::default().with_tolerance(0.001);
    let result = DeductionEngine::new(&schema, &options).deduce([("R", 2.0), ("L", 4.0), ("tau", 2.05)]);
    assert!(matches!(result, Err(DeductorError::Contradiction { .. })));
}

#[test]
fn test_unknown_seed_name_rejected_before_propagation() {
    let schema = rl_schema();
    let options = DeductionOptions::default();
    let result = DeductionEngine::new(&schema, &options).deduce([("R", 2.0), ("Q", 1.0)]);
    assert_eq!(
        result.unwrap_err(),
        DeductorError::UnknownVariable {
            name: "Q".to_string()
        }
    );
}

#[test]
fn test_unknown_name_wins_over_contradiction() {
    let schema = rl_schema();
    let options = DeductionOptions::default();
    let result = DeductionEngine::new(&schema, &options)
        .deduce([("R", 2.0), ("L", 4.0), ("tau", 3.0), ("Q", 1.0)]);
    assert!(matches!(result, Err(DeductorError::UnknownVariable { .. })));
}

#[test]
fn test_nan_seed_rejected() {
    let schema = rl_schema();
    let options = DeductionOptions::default();
    let result = DeductionEngine::new(&schema, &options).deduce([("R", f64::NAN)]);
    assert!(matches!(result, Err(DeductorError::InvalidSeed { .. })));
}

#[test]
fn test_infinite_seed_rejected() {
    let schema = rl_schema();
    let options = DeductionOptions::default();
    let result = DeductionEngine::new(&schema, &options)
        .deduce([("L", f64::INFINITY), ("R", 2.0), ("tau", 3.0)]);
    assert_eq!(
        result.unwrap_err(),
        DeductorError::InvalidSeed {
            name: "L".to_string(),
            value: f64::INFINITY
        }
    );

    let result = DeductionEngine::new(&schema, &options).deduce([("R", f64::NEG_INFINITY)]);
    assert!(matches!(result, Err(DeductorError::InvalidSeed { .. })));
}

#[test]
fn test_unknown_name_checked_before_seed_values() {
    let schema = rl_schema();
    let options = DeductionOptions::default();
    let result = DeductionEngine::new(&schema, &options).deduce([("R", f64::NAN), ("Q", 1.0)]);
    assert_eq!(
        result.unwrap_err(),
        DeductorError::UnknownVariable {
            name: "Q".to_string()
        }
    );
}

#[test]
fn test_negative_tolerance_rejected() {
    let schema = rl_schema();
    let options = DeductionOptions::default().with_tolerance(-0.1);
    let result = DeductionEngine::new(&schema, &options).deduce([("R", 2.0), ("L", 4.0)]);
    match result {
        Err(DeductorError::Input(msg)) => assert!(msg.contains("-0.1")),
        other => panic!("Expected input error, got {:?}", other),
    }
}

#[test]
fn test_non_finite_tolerance_rejected() {
    let schema = rl_schema();
    for tolerance in [f64::NAN, f64::INFINITY] {
        let options = DeductionOptions::default().with_tolerance(tolerance);
        let result = DeductionEngine::new(&schema, &options)
            .deduce([("R", 2.0), ("L", 4.0), ("tau", 3.0)]);
        assert!(matches!(result, Err(DeductorError::Input(_))));
    }
}

#[test]
fn test_zero_tolerance_accepts_exact_confirmation() {
    let schema = rl_schema();
    let options = DeductionOptions::default().with_tolerance(0.0);
    let closure = DeductionEngine::new(&schema, &options)
        .deduce([("R", 2.0), ("L", 4.0)])
        .unwrap();
    assert_eq!(closure.get("tau"), Value::Known(2.0));
}

#[test]
fn test_conflicting_duplicate_seed_is_contradiction() {
    let schema = rl_schema();
    let options = DeductionOptions::default();
    let result = DeductionEngine::new(&schema, &options).deduce([("R", 2.0), ("R", 3.0)]);
    match result {
        Err(DeductorError::Contradiction { rule, .. }) => assert_eq!(rule, "seed"),
        other => panic!("Expected contradiction, got {:?}", other),
    }
}

#[test]
fn test_undefined_result_is_fatal_even_if_not_requested() {
    let schema = Schema::builder("roots")
        .attribute(Attribute::base("x"))
        .attribute(Attribute::base("y"))
        .rule(
            DerivationRule::new(
                "helper",
                ["x"],
                Formula::partial(|[x]| if x >= 0.0 { Some(x.sqrt()) } else { None }),
            )
            .labeled("square root"),
        )
        .build()
        .unwrap();
    let options = DeductionOptions::default();
    let result = DeductionEngine::new(&schema, &options).deduce([("x", -1.0)]);
    assert_eq!(
        result.unwrap_err(),
        DeductorError::DeducedNaN {
            name: "helper".to_string(),
            rule: "rule 'square root'".to_string(),
        }
    );
}

#[test]
fn test_chained_deduction_over_several_passes() {
    // rules listed so that each pass can only add one link of the chain
    let schema = Schema::builder("chain")
        .attribute(Attribute::base("a"))
        .rule(DerivationRule::new("d", ["c"], Formula::scale(2.0)))
        .rule(DerivationRule::new("c", ["b"], Formula::scale(2.0)))
        .rule(DerivationRule::new("b", ["a"], Formula::scale(2.0)))
        .build()
        .unwrap();
    let options = DeductionOptions::default();
    let closure = DeductionEngine::new(&schema, &options)
        .deduce([("a", 1.0)])
        .unwrap();
    assert_eq!(closure.get("d"), Value::Known(8.0));
    assert_eq!(closure.passes(), 4);
}

#[test]
fn test_pass_ceiling_raises_non_convergence() {
    let schema = Schema::builder("chain")
        .attribute(Attribute::base("a"))
        .rule(DerivationRule::new("d", ["c"], Formula::scale(2.0)))
        .rule(DerivationRule::new("c", ["b"], Formula::scale(2.0)))
        .rule(DerivationRule::new("b", ["a"], Formula::scale(2.0)))
        .build()
        .unwrap();
    let options = DeductionOptions::default().with_max_passes(2);
    let result = DeductionEngine::new(&schema, &options).deduce([("a", 1.0)]);
    assert_eq!(
        result.unwrap_err(),
        DeductorError::NonConvergence { passes: 2 }
    );
}

#[test]
fn test_trace_credits_first_producer() {
    let schema = rl_schema();
    let options = DeductionOptions::default();
    let closure = DeductionEngine::new(&schema, &options)
        .deduce([("R", 2.0), ("tau", 2.0)])
        .unwrap();
    let trace = closure.trace();
    assert_eq!(trace.len(), 3);
    assert_eq!(trace[0].source, Source::Seed);
    assert_eq!(trace[2].name, "L");
    assert_eq!(trace[2].pass, 1);
    assert!(matches!(&trace[2].source, Source::Rule(_)));
}
