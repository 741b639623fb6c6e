use crate::prelude::Complex64;
use rustfft::{Fft, FftPlanner};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Helper that wraps `rustfft` plans for reuse across series lengths.
pub struct FftHelper {
    plans: Mutex<HashMap<usize, Arc<dyn Fft<f64>>>>,
}

impl FftHelper {
    pub fn new() -> Self {
        Self {
            plans: Mutex::new(HashMap::new()),
        }
    }

    fn plan(&self, size: usize) -> Arc<dyn Fft<f64>> {
        let mut plans = match self.plans.lock() {
            Ok(plans) => plans,
            Err(poisoned) => poisoned.into_inner(),
        };
        plans
            .entry(size)
            .or_insert_with(|| FftPlanner::new().plan_fft_forward(size))
            .clone()
    }

    /// Unnormalized forward transform of `input`.
    pub fn forward(&self, input: &[Complex64]) -> Vec<Complex64> {
        let mut buffer = input.to_vec();
        if buffer.is_empty() {
            return buffer;
        }
        self.plan(buffer.len()).process(&mut buffer);
        buffer
    }
}

impl Default for FftHelper {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fft_helper_returns_same_length() {
        let helper = FftHelper::new();
        let output = helper.forward(&[
            Complex64::new(1.0, 0.0),
            Complex64::new(0.0, 0.0),
            Complex64::new(-1.0, 0.0),
            Complex64::new(0.0, 0.0),
        ]);
        assert_eq!(output.len(), 4);
    }

    #[test]
    fn phasor_lands_in_its_bin() {
        let helper = FftHelper::new();
        let n = 16;
        let input: Vec<Complex64> = (0..n)
            .map(|i| Complex64::from_polar(1.0, 2.0 * std::f64::consts::PI * 3.0 * i as f64 / n as f64))
            .collect();
        let output = helper.forward(&input);
        assert!((output[3].norm() - n as f64).abs() < 1e-9);
        assert!(output[5].norm() < 1e-9);
    }

    #[test]
    fn empty_input_is_passed_through() {
        assert!(FftHelper::new().forward(&[]).is_empty());
    }
}
