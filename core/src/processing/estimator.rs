use crate::prelude::{Algorithm, MomentEstimator};
use crate::processing::abp::AbpEstimator;
use crate::processing::pulse_pair::PulsePairEstimator;
use crate::processing::spectral::FftEstimator;

/// Builds the estimator for `algorithm` at the given wavelength.
pub fn build_estimator(algorithm: Algorithm, wavelength_m: f64) -> Box<dyn MomentEstimator> {
    match algorithm {
        Algorithm::Fft => Box::new(FftEstimator::new(wavelength_m)),
        Algorithm::PulsePair => Box::new(PulsePairEstimator::new(wavelength_m)),
        Algorithm::Abp => Box::new(AbpEstimator::new(wavelength_m)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::Complex64;

    #[test]
    fn builds_each_algorithm() {
        assert_eq!(build_estimator(Algorithm::Fft, 0.1).name(), "fft");
        assert_eq!(build_estimator(Algorithm::PulsePair, 0.1).name(), "pulse_pair");
        assert_eq!(build_estimator(Algorithm::Abp, 0.1).name(), "abp");
    }

    #[test]
    fn all_algorithms_agree_on_dc_power() {
        let iq = vec![Complex64::new(0.5, -0.5); 32];
        for algorithm in [Algorithm::Fft, Algorithm::PulsePair, Algorithm::Abp] {
            let moments = build_estimator(algorithm, 0.1).estimate(&iq, 0.001);
            assert!((moments.power.unwrap() - 0.5).abs() < 1e-9, "{:?}", algorithm);
            assert!(moments.vel.unwrap().abs() < 1e-6, "{:?}", algorithm);
        }
    }
}
