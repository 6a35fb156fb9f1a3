//! Steady-state relations of a permanent magnet synchronous motor
//!
//! Used as the body of the catalog rule that recovers the rotor flux from a
//! nameplate: rated voltage, current, speed and power.

/// Nameplate quantities, all in SI units and phase amplitudes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Nameplate {
    /// Phase resistance
    pub r: f64,
    /// Model inductance
    pub l: f64,
    /// Pole pairs
    pub n: f64,
    /// Rated mechanical speed, rad/s
    pub vn: f64,
    /// Rated mechanical power
    pub pn: f64,
    /// Rated current amplitude
    pub i_n: f64,
    /// Rated phase voltage amplitude
    pub un: f64,
}

/// Operating point in the rotor reference frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OperatingPoint {
    pub fm: f64,
    pub id: f64,
    pub iq: f64,
    pub ud: f64,
    pub uq: f64,
}

impl Nameplate {
    /// Solve for the operating point at rated load in motor mode
    ///
    /// The current angle is the larger root of a quadratic in its cotangent.
    /// Returns `None` when the nameplate admits no real solution.
    pub fn motor_mode(&self) -> Option<OperatingPoint> {
        let Nameplate {
            r,
            l,
            n,
            vn,
            pn,
            i_n,
            un,
        } = *self;
        let x = n * vn * l;

        let a = 4.0 / 9.0 * (pn / i_n).powi(2);
        let b = 4.0 / 3.0 * x * pn;
        let c = (r * i_n).powi(2) + (x * i_n).powi(2) + 4.0 / 3.0 * pn * r + a - un.powi(2);
        let discriminant = b * b - 4.0 * a * c;
        if discriminant.is_nan() || discriminant < 0.0 || a == 0.0 {
            return None;
        }

        let cot = (-b + discriminant.sqrt()) / (2.0 * a);
        let iq = i_n * (1.0 / (1.0 + cot * cot)).sqrt();
        let id = (i_n * i_n - iq * iq).max(0.0).sqrt() * if cot < 0.0 { -1.0 } else { 1.0 };
        let fm = 2.0 / 3.0 * pn / (n * vn * iq);
        if !fm.is_finite() {
            return None;
        }

        Some(OperatingPoint {
            fm,
            id,
            iq,
            ud: r * id - x * iq,
            uq: r * iq + x * id + n * vn * fm,
        })
    }
}
