//! Polarimetric products for fast-alternating H/V transmission.
//!
//! The H half-series holds the H-transmit pulses received on the H channel,
//! the V half-series the V-transmit pulses received on the V channel. Each V
//! pulse follows its H pulse by one PRT.

use crate::math::complex::{arg, mean_conjugate_product, mean_power};
use crate::prelude::Complex64;
use std::f64::consts::PI;

/// Offset, in half-series samples, that pairs each V pulse with the H pulse
/// transmitted one PRT after it. A wrong value corrupts ΦDP and velocity
/// without any other symptom.
pub const TRANSMIT_ALIGNMENT_OFFSET: usize = 1;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DualPolProducts {
    pub phidp_deg: Option<f64>,
    pub vel: Option<f64>,
    pub rhohv: Option<f64>,
}

/// Cross-channel lag-1 correlations `(Rhhvv1, Rvvhh1)`.
pub fn cross_correlations(iqh: &[Complex64], iqv: &[Complex64]) -> (Complex64, Complex64) {
    let off = TRANSMIT_ALIGNMENT_OFFSET;
    let len = iqh.len().min(iqv.len()).saturating_sub(off);
    let rhhvv1 = mean_conjugate_product(&iqv[..len], &iqh[off..off + len]);
    let rvvhh1 = mean_conjugate_product(&iqh[off..off + len], &iqv[off..off + len]);
    (rhhvv1, rvvhh1)
}

/// ΦDP, velocity and ρHV from the co-polar half-series.
///
/// Velocity follows the same sign convention as the single-channel
/// estimators; `nyquist` is for the pulse-to-pulse PRT.
pub fn fast_alt_products(iqh: &[Complex64], iqv: &[Complex64], nyquist: f64) -> DualPolProducts {
    let off = TRANSMIT_ALIGNMENT_OFFSET;
    let len = iqh.len().min(iqv.len());
    if len <= off + 1 {
        return DualPolProducts::default();
    }
    let (iqh, iqv) = (&iqh[..len], &iqv[..len]);

    let phh = mean_power(&iqh[off..]);
    let pvv = mean_power(&iqv[off..]);
    if !(phh > 0.0 && pvv > 0.0 && phh.is_finite() && pvv.is_finite()) {
        return DualPolProducts::default();
    }

    let (rhhvv1, rvvhh1) = cross_correlations(iqh, iqv);
    let arg_hhvv = arg(rhhvv1);
    let arg_vvhh = arg(rvvhh1);

    let phidp_rad = (arg_hhvv - arg_vvhh) / 2.0;
    let arg_vel_hhvv = phidp_rad - arg_hhvv;
    let arg_vel_vvhh = -phidp_rad - arg_vvhh;
    let mean_arg_vel = (arg_vel_hhvv + arg_vel_vvhh) / 2.0;
    let vel = -(mean_arg_vel / PI) * nyquist;

    DualPolProducts {
        phidp_deg: Some(phidp_rad.to_degrees()).filter(|v| v.is_finite()),
        vel: Some(vel).filter(|v| v.is_finite()),
        rhohv: rhohv(iqh, rhhvv1, phh, pvv),
    }
}

/// Lag-1 cross correlation over `sqrt(Phh Pvv)`, corrected to lag 0 by the
/// fourth root of the H lag-2 coherence and clamped to `[0, 1]`.
fn rhohv(iqh: &[Complex64], rhhvv1: Complex64, phh: f64, pvv: f64) -> Option<f64> {
    let off = TRANSMIT_ALIGNMENT_OFFSET;
    let rhohhvv1 = rhhvv1.norm() / (phh * pvv).sqrt();
    let rhhhh2 = mean_conjugate_product(&iqh[..iqh.len() - off], &iqh[off..]);
    let rhohh2 = rhhhh2.norm() / phh;
    if !(rhohh2 > 0.0 && rhohh2.is_finite() && rhohhvv1.is_finite()) {
        return None;
    }
    let rhohv0 = rhohhvv1 / rhohh2.powf(0.25);
    rhohv0.is_finite().then(|| rhohv0.clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::complex::split_alternating;

    const NYQUIST: f64 = 25.0;

    /// Alternating-transmit series: H on even pulses, V on odd pulses with
    /// an extra differential phase.
    fn alternating(n: usize, step: f64, phidp_rad: f64, v_amp: f64) -> (Vec<Complex64>, Vec<Complex64>) {
        let h: Vec<Complex64> = (0..n)
            .map(|i| Complex64::from_polar(1.0, step * i as f64))
            .collect();
        let v: Vec<Complex64> = (0..n)
            .map(|i| Complex64::from_polar(v_amp, step * i as f64 + phidp_rad))
            .collect();
        (split_alternating(&h).0, split_alternating(&v).1)
    }

    #[test]
    fn identical_channels_give_unit_rhohv_and_zero_phidp() {
        let series: Vec<Complex64> = (0..64)
            .map(|i| Complex64::from_polar(2.0, 0.3 * i as f64))
            .collect();
        let (iqh, _) = split_alternating(&series);
        let (_, iqv) = split_alternating(&series);
        let products = fast_alt_products(&iqh, &iqv, NYQUIST);
        assert!((products.rhohv.unwrap() - 1.0).abs() < 1e-9);
        assert!(products.phidp_deg.unwrap().abs() < 1e-9);
    }

    #[test]
    fn recovers_differential_phase() {
        let (iqh, iqv) = alternating(64, 0.2, 30.0_f64.to_radians(), 0.8);
        let products = fast_alt_products(&iqh, &iqv, NYQUIST);
        assert!((products.phidp_deg.unwrap() - 30.0).abs() < 1e-9);
    }

    #[test]
    fn velocity_matches_phase_step() {
        let step = -0.4;
        let (iqh, iqv) = alternating(64, step, 0.5, 1.0);
        let products = fast_alt_products(&iqh, &iqv, NYQUIST);
        assert!((products.vel.unwrap() + step / PI * NYQUIST).abs() < 1e-9);
    }

    #[test]
    fn rhohv_is_bounded_for_noisy_input() {
        let iqh: Vec<Complex64> = (0..32)
            .map(|i| Complex64::new((i as f64 * 1.7).sin(), (i as f64 * 0.9).cos()))
            .collect();
        let iqv: Vec<Complex64> = (0..32)
            .map(|i| Complex64::new((i as f64 * 2.3).cos(), (i as f64 * 0.4).sin()))
            .collect();
        let rho = fast_alt_products(&iqh, &iqv, NYQUIST).rhohv.unwrap();
        assert!((0.0..=1.0).contains(&rho));
    }

    #[test]
    fn rhohv_is_clamped_to_one() {
        // coherent H-to-V cross lag, incoherent H lag
        let iqh: Vec<Complex64> = (0..32)
            .map(|i| Complex64::from_polar(1.0, 0.9 * (i * i) as f64))
            .collect();
        let mut iqv: Vec<Complex64> = iqh[1..].to_vec();
        iqv.push(Complex64::new(1.0, 0.0));

        let (rhhvv1, _) = cross_correlations(&iqh, &iqv);
        let rhhhh2 = mean_conjugate_product(&iqh[..31], &iqh[1..]);
        let unclamped = rhhvv1.norm() / (rhhhh2.norm()).powf(0.25);
        assert!(unclamped > 1.0);
        assert_eq!(fast_alt_products(&iqh, &iqv, NYQUIST).rhohv, Some(1.0));
    }

    #[test]
    fn zero_power_gives_nothing() {
        let zeros = vec![Complex64::new(0.0, 0.0); 16];
        assert_eq!(
            fast_alt_products(&zeros, &zeros, NYQUIST),
            DualPolProducts::default()
        );
    }

    #[test]
    fn too_short_series_gives_nothing() {
        let one = vec![Complex64::new(1.0, 0.0); 2];
        assert_eq!(fast_alt_products(&one, &one, NYQUIST), DualPolProducts::default());
    }
}
