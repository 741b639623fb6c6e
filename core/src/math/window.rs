//! Window functions applied to a pulse series before moment estimation.

use crate::math::stats::StatsHelper;
use crate::prelude::Complex64;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum WindowType {
    #[default]
    Rectangular,
    Hanning,
    Blackman,
}

impl WindowType {
    /// Raw window shape of length `n`. Fewer than two points always gives a
    /// rectangular window.
    pub fn weights(self, n: usize) -> Vec<f64> {
        if n < 2 {
            return vec![1.0; n];
        }
        let denom = (n - 1) as f64;
        match self {
            WindowType::Rectangular => vec![1.0; n],
            WindowType::Hanning => (0..n)
                .map(|i| 0.5 - 0.5 * (2.0 * PI * i as f64 / denom).cos())
                .collect(),
            WindowType::Blackman => (0..n)
                .map(|i| {
                    let x = i as f64 / denom;
                    0.42 - 0.5 * (2.0 * PI * x).cos() + 0.08 * (4.0 * PI * x).cos()
                })
                .collect(),
        }
    }

    /// Window shape scaled to unit RMS, so that windowing keeps mean power.
    pub fn normalized_weights(self, n: usize) -> Vec<f64> {
        let mut weights = self.weights(n);
        let rms = StatsHelper::rms(&weights);
        if rms > 0.0 {
            weights.iter_mut().for_each(|w| *w /= rms);
        }
        weights
    }
}

/// Multiplies the real and imaginary parts of `iq` by `weights`.
pub fn apply_window(iq: &[Complex64], weights: &[f64]) -> Vec<Complex64> {
    iq.iter()
        .zip(weights.iter())
        .map(|(sample, &w)| Complex64::new(sample.re * w, sample.im * w))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rectangular_is_all_ones() {
        assert_eq!(WindowType::Rectangular.weights(4), vec![1.0; 4]);
    }

    #[test]
    fn short_windows_degenerate_to_rectangular() {
        assert_eq!(WindowType::Hanning.weights(1), vec![1.0]);
        assert_eq!(WindowType::Blackman.weights(0), Vec::<f64>::new());
    }

    #[test]
    fn hanning_is_symmetric_with_zero_ends() {
        let w = WindowType::Hanning.weights(9);
        assert!(w[0].abs() < 1e-12);
        assert!(w[8].abs() < 1e-12);
        assert!((w[4] - 1.0).abs() < 1e-12);
        for i in 0..9 {
            assert!((w[i] - w[8 - i]).abs() < 1e-12);
        }
    }

    #[test]
    fn blackman_peaks_at_centre() {
        let w = WindowType::Blackman.weights(11);
        assert!((w[5] - 1.0).abs() < 1e-12);
        assert!(w[0].abs() < 1e-12);
    }

    #[test]
    fn normalized_window_has_unit_rms() {
        let w = WindowType::Blackman.normalized_weights(64);
        assert!((StatsHelper::rms(&w) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn apply_window_scales_both_parts() {
        let iq = [Complex64::new(2.0, -4.0), Complex64::new(1.0, 1.0)];
        let out = apply_window(&iq, &[0.5, 2.0]);
        assert_eq!(out[0], Complex64::new(1.0, -2.0));
        assert_eq!(out[1], Complex64::new(2.0, 2.0));
    }
}
