use deductor::*;
use std::f64::consts::PI;
use std::sync::Arc;

fn rotary() -> Arc<Schema> {
    Schema::builder("rotary")
        .attribute(
            Attribute::base("L")
                .with_units("H")
                .with_description("Model inductance")
                .with_group("inductance"),
        )
        .attribute(
            Attribute::base("R")
                .with_units("Ohm")
                .with_description("Phase resistance")
                .with_group("resistance"),
        )
        .attribute(
            Attribute::base("Fm")
                .with_units("Wb")
                .with_description("Rotor flux linkage")
                .with_group("flux"),
        )
        .attribute(
            Attribute::base("N")
                .with_description("Number of pole pairs")
                .with_group("poles"),
        )
        .attribute(Attribute::alias("n_pole_pairs", "N").with_group("poles"))
        .attribute(Attribute::scaled("Lll", 2.0, "L").with_units("H").with_group("inductance"))
        .attribute(Attribute::scaled("n_poles", 2.0, "N").with_group("poles"))
        .attribute(
            Attribute::derived("Kemf", ["Fm", "N"], Formula::scalar(|[fm, n]| n * fm))
                .with_units("Vs")
                .with_group("flux"),
        )
        .attribute(
            Attribute::derived("Kt", ["Fm", "N"], Formula::scalar(|[fm, n]| 1.5 * n * fm))
                .with_units("Nm/A")
                .with_group("flux"),
        )
        .attribute(
            Attribute::scaled("Kemf_rpm", 2.0 * PI / 60.0, "Kemf")
                .with_units("V/rpm")
                .with_group("flux"),
        )
        .rule(DerivationRule::new("Fm", ["N", "Kt"], Formula::scalar(|[n, kt]| kt / (1.5 * n))))
        .rule(DerivationRule::new("Fm", ["N", "Kemf"], Formula::scalar(|[n, kemf]| kemf / n)))
        .build()
        .unwrap()
}

fn rotary_dq() -> Arc<Schema> {
    Schema::builder("rotary_dq")
        .extends(&rotary())
        .attribute(
            Attribute::base("L2")
                .with_units("H")
                .with_group("inductance")
                .with_default(0.0),
        )
        .attribute(
            Attribute::derived("Ld", ["L", "L2"], Formula::scalar(|[l, l2]| l + l2))
                .with_units("H")
                .with_group("inductance"),
        )
        .attribute(
            Attribute::derived("Lq", ["L", "L2"], Formula::scalar(|[l, l2]| l - l2))
                .with_units("H")
                .with_group("inductance"),
        )
        .rule(DerivationRule::new(
            ["L", "L2"],
            ["Ld", "Lq"],
            Formula::vector(|[ld, lq]| [(ld + lq) / 2.0, (ld - lq) / 2.0]),
        ))
        .validator(Validator::new("Ld must not be below Lq", ["Ld", "Lq"], |[ld, lq]| ld >= lq))
        .build()
        .unwrap()
}

#[test]
fn test_flux_deduced_from_torque_constant() {
    let model = Model::from_seed(&rotary(), [("n_poles", 8.0), ("Kt", 0.3)]).unwrap();
    assert_eq!(model.value("N").unwrap(), Value::Known(4.0));
    assert_eq!(model.value("n_pole_pairs").unwrap(), Value::Known(4.0));
    let fm = model.value("Fm").unwrap().known().unwrap();
    assert!((fm - 0.05).abs() < 1e-12);
    let kemf = model.value("Kemf").unwrap().known().unwrap();
    assert!((kemf - 0.2).abs() < 1e-12);
}

#[test]
fn test_flux_deduced_through_scaled_alias_chain() {
    let kemf_rpm = 0.2 * 2.0 * PI / 60.0;
    let model = Model::from_seed(&rotary(), [("N", 4.0), ("Kemf_rpm", kemf_rpm)]).unwrap();
    let fm = model.value("Fm").unwrap().known().unwrap();
    assert!((fm - 0.05).abs() < 1e-12);
}

#[test]
fn test_inconsistent_constants_contradict() {
    // Kt = 1.5 * N * Fm = 0.3 implies Kemf = 0.2, not 0.4
    let result = Model::from_seed(&rotary(), [("N", 4.0), ("Kt", 0.3), ("Kemf", 0.4)]);
    assert!(matches!(result, Err(DeductorError::Contradiction { .. })));
}

#[test]
fn test_dq_inductances_from_axes() {
    let model = Model::from_seed(&rotary_dq(), [("Ld", 3e-3), ("Lq", 1e-3)]).unwrap();
    let l = model.value("L").unwrap().known().unwrap();
    let l2 = model.value("L2").unwrap().known().unwrap();
    assert!((l - 2e-3).abs() < 1e-15);
    assert!((l2 - 1e-3).abs() < 1e-15);
    let lll = model.value("Lll").unwrap().known().unwrap();
    assert!((lll - 4e-3).abs() < 1e-15);
}

#[test]
fn test_dq_default_second_harmonic() {
    let model = Model::from_seed(&rotary_dq(), [("L", 2e-3)]).unwrap();
    assert_eq!(model.value("L2").unwrap(), Value::Known(0.0));
    assert_eq!(model.value("Ld").unwrap(), Value::Known(2e-3));
    assert_eq!(model.value("Lq").unwrap(), Value::Known(2e-3));
}

#[test]
fn test_dq_validator() {
    let result = Model::from_seed(&rotary_dq(), [("Ld", 1e-3), ("Lq", 3e-3)]);
    assert_eq!(
        result.unwrap_err(),
        DeductorError::ValidationFailed {
            description: "Ld must not be below Lq".to_string()
        }
    );
}

#[test]
fn test_inherited_groups_listing() {
    let model = Model::from_seed(&rotary_dq(), [("L", 2e-3), ("R", 0.5)]).unwrap();
    let rows = model.rows("inductance").unwrap();
    let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["L", "Lll", "L2", "Ld", "Lq"]);
    assert!(rows.iter().all(|r| r.value.is_some()));
}

#[test]
fn test_unknown_seed_name() {
    let result = Model::from_seed(&rotary(), [("N", 4.0), ("Ld", 1e-3)]);
    assert_eq!(
        result.unwrap_err(),
        DeductorError::UnknownVariable {
            name: "Ld".to_string()
        }
    );
}

#[test]
fn test_schema_shared_across_threads() {
    let schema = rotary_dq();
    let handles: Vec<_> = (1..=4)
        .map(|n| {
            let schema = Arc::clone(&schema);
            std::thread::spawn(move || {
                Model::from_seed(&schema, [("N", n as f64), ("Fm", 0.01)])
                    .unwrap()
                    .value("Kemf")
                    .unwrap()
            })
        })
        .collect();
    for (n, handle) in (1..=4).zip(handles) {
        let kemf = handle.join().unwrap().known().unwrap();
        assert!((kemf - 0.01 * n as f64).abs() < 1e-12);
    }
}
