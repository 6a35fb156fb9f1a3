//! Built-in model catalog
//!
//! `rl` is the smallest useful schema. `rotary`, `rotary-dq` and `nominal`
//! form an inheritance chain describing a permanent magnet synchronous motor.

use crate::pmsm::Nameplate;
use deductor::{Attribute, DeductorResult, DerivationRule, Formula, Schema, Validator};
use std::f64::consts::PI;
use std::sync::Arc;

/// A named schema constructor
pub struct Entry {
    pub name: &'static str,
    pub description: &'static str,
    build: fn() -> DeductorResult<Arc<Schema>>,
}

impl Entry {
    pub fn schema(&self) -> DeductorResult<Arc<Schema>> {
        (self.build)()
    }
}

pub const ENTRIES: &[Entry] = &[
    Entry {
        name: "rl",
        description: "Series RL circuit and its time constant",
        build: rl,
    },
    Entry {
        name: "rotary",
        description: "Rotary PMSM: winding, flux and motor constants",
        build: rotary,
    },
    Entry {
        name: "rotary-dq",
        description: "Rotary PMSM with saliency (d/q axis inductances)",
        build: rotary_dq,
    },
    Entry {
        name: "nominal",
        description: "Rotary PMSM with rated operating point",
        build: nominal,
    },
];

pub fn find(name: &str) -> Option<&'static Entry> {
    ENTRIES.iter().find(|entry| entry.name == name)
}

/// Comma separated catalog names, for error messages
pub fn names() -> String {
    ENTRIES
        .iter()
        .map(|entry| entry.name)
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn rl() -> DeductorResult<Arc<Schema>> {
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
        .rule(DerivationRule::new("L", ["tau", "R"], Formula::scalar(|[tau, r]| tau * r)))
        .rule(DerivationRule::new("R", ["L", "tau"], Formula::scalar(|[l, tau]| l / tau)))
        .build()
}

pub fn rotary() -> DeductorResult<Arc<Schema>> {
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
                .with_description("Phase resistance, between the star point and a phase")
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
        .attribute(
            Attribute::base("J")
                .with_units("kg m^2")
                .with_description("Rotor inertia")
                .with_group("inertia"),
        )
        .attribute(Attribute::alias("Rph", "R").with_group("resistance"))
        .attribute(Attribute::alias("n_pole_pairs", "N").with_group("poles"))
        .attribute(
            Attribute::scaled("Lph", 2.0 / 3.0, "L")
                .with_units("H")
                .with_description("Measured phase inductance")
                .with_group("inductance"),
        )
        .attribute(
            Attribute::scaled("Lll", 2.0, "L")
                .with_units("H")
                .with_description("Measured line to line inductance")
                .with_group("inductance"),
        )
        .attribute(
            Attribute::scaled("Rll", 2.0, "R")
                .with_units("Ohm")
                .with_description("Measured line to line resistance")
                .with_group("resistance"),
        )
        .attribute(
            Attribute::scaled("n_poles", 2.0, "N")
                .with_description("Number of poles")
                .with_group("poles"),
        )
        .attribute(
            Attribute::derived("Kemf", ["Fm", "N"], Formula::scalar(|[fm, n]| n * fm))
                .with_units("Vs")
                .with_description("Back EMF constant, rad/s to phase voltage amplitude")
                .with_group("flux"),
        )
        .attribute(
            Attribute::derived("Kt", ["Fm", "N"], Formula::scalar(|[fm, n]| 1.5 * n * fm))
                .with_units("Nm/A")
                .with_description("Torque constant")
                .with_group("flux"),
        )
        .attribute(
            Attribute::scaled("Kemf_llrms_rpm", 2.0 * PI / 60.0 * 1.5f64.sqrt(), "Kemf")
                .with_units("V/rpm")
                .with_description("Back EMF constant, rpm to line to line rms voltage")
                .with_group("flux"),
        )
        .attribute(
            Attribute::scaled("Kemf_rpm", 2.0 * PI / 60.0, "Kemf")
                .with_units("V/rpm")
                .with_description("Back EMF constant, rpm to phase voltage amplitude")
                .with_group("flux"),
        )
        .rule(DerivationRule::new("Fm", ["N", "Kt"], Formula::scalar(|[n, kt]| kt / (1.5 * n))))
        .rule(DerivationRule::new("Fm", ["N", "Kemf"], Formula::scalar(|[n, kemf]| kemf / n)))
        .build()
}

pub fn rotary_dq() -> DeductorResult<Arc<Schema>> {
    Schema::builder("rotary-dq")
        .extends(&rotary()?)
        .attribute(
            Attribute::base("L2")
                .with_units("H")
                .with_description("Second inductance harmonic")
                .with_group("inductance")
                .with_default(0.0),
        )
        .attribute(
            Attribute::derived("Ld", ["L", "L2"], Formula::scalar(|[l, l2]| l + l2))
                .with_units("H")
                .with_description("Direct axis inductance")
                .with_group("inductance"),
        )
        .attribute(
            Attribute::derived("Lq", ["L", "L2"], Formula::scalar(|[l, l2]| l - l2))
                .with_units("H")
                .with_description("Quadrature axis inductance")
                .with_group("inductance"),
        )
        .rule(
            DerivationRule::new(
                ["L", "L2"],
                ["Ld", "Lq"],
                Formula::vector(|[ld, lq]| [(ld + lq) / 2.0, (ld - lq) / 2.0]),
            )
            .labeled("(L, L2) = f(Ld, Lq)"),
        )
        .build()
}

pub fn nominal() -> DeductorResult<Arc<Schema>> {
    Schema::builder("nominal")
        .extends(&rotary_dq()?)
        .attribute(
            Attribute::base("Un")
                .with_units("V")
                .with_description("Rated phase voltage amplitude"),
        )
        .attribute(
            Attribute::base("In")
                .with_units("A")
                .with_description("Rated phase current amplitude"),
        )
        .attribute(
            Attribute::base("vn")
                .with_units("rad/s")
                .with_description("Rated speed"),
        )
        .attribute(
            Attribute::base("Tn")
                .with_units("Nm")
                .with_description("Rated torque"),
        )
        .attribute(Attribute::alias("rated_speed", "vn").with_groups(["rated_speed", "rated"]))
        .attribute(Attribute::alias("rated_torque", "Tn").with_groups(["rated_torque", "rated"]))
        .attribute(
            Attribute::scaled("rated_ac_voltage", 1.5f64.sqrt(), "Un")
                .with_units("V")
                .with_description("Rated three phase rms voltage")
                .with_groups(["rated_voltage", "rated"]),
        )
        .attribute(
            Attribute::scaled("Un_rms", 0.5f64.sqrt(), "Un")
                .with_units("V")
                .with_description("Rated phase rms voltage"),
        )
        .attribute(
            Attribute::scaled("rated_dc_voltage", 3f64.sqrt(), "Un")
                .with_units("V")
                .with_description("DC bus voltage")
                .with_groups(["rated_voltage", "rated"]),
        )
        .attribute(
            Attribute::scaled("In_rms", 0.5f64.sqrt(), "In")
                .with_units("A")
                .with_description("Rated phase rms current"),
        )
        .attribute(
            Attribute::scaled("rated_speed_rpm", 30.0 / PI, "vn")
                .with_units("rpm")
                .with_description("Rated speed")
                .with_groups(["rated_speed", "rated"]),
        )
        .attribute(Attribute::alias("rated_current", "In_rms").with_groups(["rated_current", "rated"]))
        .attribute(
            Attribute::alias("rated_ac_phase_voltage", "Un_rms")
                .with_groups(["rated_voltage", "rated"]),
        )
        .attribute(
            Attribute::derived("Pn", ["vn", "Tn"], Formula::scalar(|[vn, tn]| vn * tn))
                .with_units("W")
                .with_description("Rated power"),
        )
        .attribute(
            Attribute::derived("fn", ["N", "vn"], Formula::scalar(|[n, vn]| n * vn / (2.0 * PI)))
                .with_units("Hz")
                .with_description("Rated electrical frequency"),
        )
        .attribute(Attribute::alias("rated_power", "Pn").with_groups(["rated_power", "rated"]))
        .attribute(Attribute::alias("rated_frequency", "fn").with_groups(["rated_speed", "rated"]))
        .rule(DerivationRule::new("vn", ["Pn", "Tn"], Formula::scalar(|[pn, tn]| pn / tn)))
        .rule(DerivationRule::new(
            "vn",
            ["N", "fn"],
            Formula::scalar(|[n, f]| 2.0 * PI * f / n),
        ))
        .rule(DerivationRule::new("Tn", ["vn", "Pn"], Formula::scalar(|[vn, pn]| pn / vn)))
        .rule(
            DerivationRule::new(
                "Fm",
                ["R", "L", "N", "vn", "Pn", "In", "Un"],
                Formula::partial(|[r, l, n, vn, pn, i_n, un]| {
                    let plate = Nameplate {
                        r,
                        l,
                        n,
                        vn,
                        pn,
                        i_n,
                        un,
                    };
                    plate.motor_mode().map(|point| point.fm)
                }),
            )
            .labeled("Fm = nominal motor mode(R, L, N, vn, Pn, In, Un)"),
        )
        .validator(Validator::new(
            "Mechanical power output must not exceed electrical power input",
            ["Un_rms", "In_rms", "Pn"],
            |[u, i, pn]| 3.0 * u * i > pn,
        ))
        .build()
}
