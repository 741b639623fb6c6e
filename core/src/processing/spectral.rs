//! Spectral moments from the Doppler power spectrum.
//!
//! The spectrum is centred on its peak, a noise level is estimated from its
//! quieter ends, and the first two moments of the power above that level
//! give velocity and width.

use crate::math::fft::FftHelper;
use crate::math::stats::StatsHelper;
use crate::prelude::{Complex64, MomentEstimator, Moments};

/// Consecutive bins below the noise threshold that end the signal region.
const N_BELOW_NOISE: usize = 3;

/// Shortest spectrum for which a noise level is estimated.
const MIN_BINS_FOR_NOISE: usize = 8;

pub struct FftEstimator {
    wavelength_m: f64,
    fft: FftHelper,
}

impl FftEstimator {
    pub fn new(wavelength_m: f64) -> Self {
        Self {
            wavelength_m,
            fft: FftHelper::new(),
        }
    }

    /// Per-bin power, scaled so the bins sum to the mean sample power.
    pub fn power_spectrum(&self, iq: &[Complex64]) -> Vec<f64> {
        let n = iq.len() as f64;
        self.fft
            .forward(iq)
            .iter()
            .map(|c| c.norm_sqr() / (n * n))
            .collect()
    }

    fn vel_width(&self, power: &[f64], total: f64, prt_secs: f64) -> (Option<f64>, Option<f64>) {
        let n = power.len();
        let k_cent = n / 2;

        let mut k_max = 0;
        let mut max_power = power[0];
        for (k, &p) in power.iter().enumerate() {
            if p > max_power {
                k_max = k;
                max_power = p;
            }
        }
        let k_max = if k_max >= k_cent {
            k_max as i64 - n as i64
        } else {
            k_max as i64
        };
        let k_offset = k_cent as i64 - k_max;

        let mut centered = vec![0.0; n];
        for (ii, &p) in power.iter().enumerate() {
            let jj = (ii as i64 + k_offset).rem_euclid(n as i64) as usize;
            centered[jj] = p;
        }

        let (noise_mean, noise_sdev) = spectral_noise(&centered);
        let (k_start, k_end) = signal_bounds(&centered, k_cent, noise_mean + noise_sdev);

        let mut sum_power = 0.0;
        let mut sum_k = 0.0;
        let mut sum_k2 = 0.0;
        for (k, &p) in centered.iter().enumerate().take(k_end + 1).skip(k_start) {
            let excess = (p - noise_mean).max(0.0);
            let phase = k as f64;
            sum_power += excess;
            sum_k += excess * phase;
            sum_k2 += excess * phase * phase;
        }
        // nothing stands above the noise level
        if !(sum_power > f64::EPSILON * total && sum_power.is_finite()) {
            return (None, None);
        }

        let mean_k = sum_k / sum_power;
        let diff = sum_k2 / sum_power - mean_k * mean_k;
        let sdev_k = if diff > 0.0 { diff.sqrt() } else { 0.0 };

        let vel_fac = self.wavelength_m / (2.0 * n as f64 * prt_secs);
        let vel = -vel_fac * (mean_k - k_offset as f64);
        let width = vel_fac * sdev_k;
        (
            vel.is_finite().then_some(vel),
            width.is_finite().then_some(width),
        )
    }
}

/// Noise mean and sdev from the least powerful of three end regions:
/// 1/8 at each end combined, the lower 1/4 and the upper 1/4.
fn spectral_noise(centered: &[f64]) -> (f64, f64) {
    let n = centered.len();
    if n < MIN_BINS_FOR_NOISE {
        return (0.0, 0.0);
    }
    let nby4 = n / 4;
    let nby8 = n / 8;

    let both: Vec<f64> = centered[..nby8]
        .iter()
        .chain(centered[n - nby8..].iter())
        .copied()
        .collect();
    let both = StatsHelper::mean_sdev(&both);
    let lower = StatsHelper::mean_sdev(&centered[..nby4]);
    let upper = StatsHelper::mean_sdev(&centered[n - nby4..]);

    if both.0 < lower.0 && both.0 < upper.0 {
        both
    } else if lower.0 < upper.0 {
        lower
    } else {
        upper
    }
}

/// Walks out from the centre until the power stays below `threshold` for
/// [`N_BELOW_NOISE`] consecutive bins on each side.
fn signal_bounds(centered: &[f64], k_cent: usize, threshold: f64) -> (usize, usize) {
    let n = centered.len();

    let mut count = 0;
    let mut k_start = k_cent.saturating_sub(1);
    for ii in (0..k_cent).rev() {
        if centered[ii] < threshold {
            count += 1;
            if count >= N_BELOW_NOISE {
                break;
            }
        } else {
            count = 0;
        }
        k_start = ii;
    }

    count = 0;
    let mut k_end = (k_cent + 1).min(n - 1);
    for (ii, &p) in centered.iter().enumerate().skip(k_cent + 1) {
        if p < threshold {
            count += 1;
            if count >= N_BELOW_NOISE {
                break;
            }
        } else {
            count = 0;
        }
        k_end = ii;
    }

    (k_start, k_end)
}

impl MomentEstimator for FftEstimator {
    fn name(&self) -> &'static str {
        "fft"
    }

    fn estimate(&self, iq: &[Complex64], prt_secs: f64) -> Moments {
        if iq.len() < 2 {
            return Moments::missing();
        }
        let power = self.power_spectrum(iq);
        let total: f64 = power.iter().sum();
        if !(total.is_finite() && total > 0.0) {
            return Moments::missing();
        }
        let (vel, width) = self.vel_width(&power, total, prt_secs);
        Moments {
            power: Some(total),
            vel,
            width,
        }
    }
}
