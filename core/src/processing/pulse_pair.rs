use crate::math::complex::{arg, autocorrelation, mean_power};
use crate::prelude::{nyquist_velocity, Complex64, MomentEstimator, Moments};
use std::f64::consts::{PI, SQRT_2};

/// Time-domain pulse-pair moments from R(0) and R(1).
///
/// A positive pulse-to-pulse phase advance gives a negative velocity. Width
/// is `λ / (2·√2·π·PRT) · sqrt(ln(R0/|R1|))`, the Gaussian-spectrum result,
/// written below as `√2·v_nyq/π`.
pub struct PulsePairEstimator {
    wavelength_m: f64,
}

impl PulsePairEstimator {
    pub fn new(wavelength_m: f64) -> Self {
        Self { wavelength_m }
    }
}

/// Lag-0 power, or `None` when it is zero, negative or not finite.
pub(crate) fn lag0_power(iq: &[Complex64]) -> Option<f64> {
    let power = mean_power(iq);
    (power.is_finite() && power > 0.0).then_some(power)
}

/// Velocity from the phase of R(1).
pub(crate) fn velocity_from_r1(r1: Complex64, nyquist: f64) -> Option<f64> {
    let vel = nyquist / PI * arg(r1);
    vel.is_finite().then_some(vel)
}

impl MomentEstimator for PulsePairEstimator {
    fn name(&self) -> &'static str {
        "pulse_pair"
    }

    fn estimate(&self, iq: &[Complex64], prt_secs: f64) -> Moments {
        if iq.len() < 2 {
            return Moments::missing();
        }
        let Some(r0) = lag0_power(iq) else {
            return Moments::missing();
        };

        let nyquist = nyquist_velocity(self.wavelength_m, prt_secs);
        let r1 = autocorrelation(iq, 1);
        let r1_mag = r1.norm();

        let width = if r1_mag > 0.0 && r1_mag.is_finite() {
            let ln_ratio = (r0 / r1_mag).ln();
            let width = if ln_ratio > 0.0 {
                SQRT_2 * nyquist / PI * ln_ratio.sqrt()
            } else {
                0.0
            };
            width.is_finite().then_some(width)
        } else {
            None
        };

        Moments {
            power: Some(r0),
            vel: velocity_from_r1(r1, nyquist),
            width,
        }
    }
}
