use crate::math::complex::autocorrelation;
use crate::prelude::{nyquist_velocity, Complex64, MomentEstimator, Moments};
use crate::processing::pulse_pair::{lag0_power, velocity_from_r1};
use std::f64::consts::PI;

/// Alternative pulse-pair estimator: power and velocity as pulse-pair,
/// width from the R(1)/R(2) ratio, which white noise does not bias.
pub struct AbpEstimator {
    wavelength_m: f64,
}

impl AbpEstimator {
    pub fn new(wavelength_m: f64) -> Self {
        Self { wavelength_m }
    }
}

impl MomentEstimator for AbpEstimator {
    fn name(&self) -> &'static str {
        "abp"
    }

    fn estimate(&self, iq: &[Complex64], prt_secs: f64) -> Moments {
        if iq.len() < 3 {
            return Moments::missing();
        }
        let Some(r0) = lag0_power(iq) else {
            return Moments::missing();
        };

        let nyquist = nyquist_velocity(self.wavelength_m, prt_secs);
        let r1 = autocorrelation(iq, 1);
        let r2 = autocorrelation(iq, 2);
        let (r1_mag, r2_mag) = (r1.norm(), r2.norm());

        let width = if r1_mag > 0.0 && r2_mag > 0.0 {
            let ln_r1r2 = (r1_mag / r2_mag).ln();
            let factor = 2.0 * nyquist / (PI * 6.0_f64.sqrt());
            let width = if ln_r1r2 > 0.0 {
                factor * ln_r1r2.sqrt()
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

#[cfg(test)]
mod tests {
    use super::*;

    const WAVELENGTH: f64 = 0.0316;
    const PRT: f64 = 0.0005;

    #[test]
    fn phasor_matches_pulse_pair_velocity() {
        let step = 0.6;
        let iq: Vec<Complex64> = (0..128)
            .map(|i| Complex64::from_polar(3.0, step * i as f64))
            .collect();
        let moments = AbpEstimator::new(WAVELENGTH).estimate(&iq, PRT);
        let nyquist = nyquist_velocity(WAVELENGTH, PRT);
        assert!((moments.vel.unwrap() + nyquist * step / PI).abs() < 1e-9);
        assert!((moments.power.unwrap() - 9.0).abs() < 1e-9);
        assert!(moments.width.unwrap().abs() < 1e-6);
    }

    #[test]
    fn width_follows_lag_ratio() {
        let iq: Vec<Complex64> = (0..256)
            .map(|i| {
                let wobble = ((i * 7919) % 13) as f64 / 13.0 - 0.5;
                Complex64::from_polar(1.0, 0.4 * i as f64 + 1.5 * wobble)
            })
            .collect();
        let moments = AbpEstimator::new(WAVELENGTH).estimate(&iq, PRT);
        let r1 = autocorrelation(&iq, 1).norm();
        let r2 = autocorrelation(&iq, 2).norm();
        let nyquist = nyquist_velocity(WAVELENGTH, PRT);
        let expected = if r1 > r2 {
            2.0 * nyquist / (PI * 6.0_f64.sqrt()) * (r1 / r2).ln().sqrt()
        } else {
            0.0
        };
        assert!((moments.width.unwrap() - expected).abs() < 1e-9);
        assert!(moments.width.unwrap() >= 0.0);
    }

    #[test]
    fn short_series_is_missing() {
        let iq = vec![Complex64::new(1.0, 1.0); 2];
        assert_eq!(AbpEstimator::new(WAVELENGTH).estimate(&iq, PRT), Moments::missing());
    }

    #[test]
    fn zero_power_is_missing() {
        let iq = vec![Complex64::new(0.0, 0.0); 16];
        assert_eq!(AbpEstimator::new(WAVELENGTH).estimate(&iq, PRT), Moments::missing());
    }
}
