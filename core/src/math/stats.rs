pub struct StatsHelper;

impl StatsHelper {
    pub fn rms(samples: &[f64]) -> f64 {
        if samples.is_empty() {
            return 0.0;
        }
        let sum_sq: f64 = samples.iter().map(|&v| v * v).sum();
        (sum_sq / samples.len() as f64).sqrt()
    }

    /// `10 * log10(power)`, or `None` when the power is not positive and finite.
    pub fn power_to_db(power: f64) -> Option<f64> {
        if power.is_finite() && power > 0.0 {
            Some(10.0 * power.log10())
        } else {
            None
        }
    }

    pub fn db_to_power(db: f64) -> f64 {
        10.0_f64.powf(db / 10.0)
    }

    /// Mean and standard deviation; the deviation is zero when rounding makes
    /// the variance negative.
    pub fn mean_sdev(samples: &[f64]) -> (f64, f64) {
        if samples.is_empty() {
            return (0.0, 0.0);
        }
        let n = samples.len() as f64;
        let mean = samples.iter().sum::<f64>() / n;
        let mean_sq = samples.iter().map(|v| v * v).sum::<f64>() / n;
        let diff = mean_sq - mean * mean;
        (mean, if diff > 0.0 { diff.sqrt() } else { 0.0 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rms_zero_sequence_yields_zero() {
        assert_eq!(StatsHelper::rms(&[]), 0.0);
        assert_eq!(StatsHelper::rms(&[0.0, 0.0]), 0.0);
    }

    #[test]
    fn rms_handles_single_value() {
        assert_eq!(StatsHelper::rms(&[4.0]), 4.0);
    }

    #[test]
    fn power_to_db_guards_non_positive() {
        assert_eq!(StatsHelper::power_to_db(0.0), None);
        assert_eq!(StatsHelper::power_to_db(-1.0), None);
        assert_eq!(StatsHelper::power_to_db(f64::NAN), None);
        assert!((StatsHelper::power_to_db(100.0).unwrap() - 20.0).abs() < 1e-12);
    }

    #[test]
    fn db_round_trip() {
        let p = StatsHelper::db_to_power(-113.0);
        assert!((StatsHelper::power_to_db(p).unwrap() + 113.0).abs() < 1e-9);
    }

    #[test]
    fn mean_sdev_of_constant() {
        let (mean, sdev) = StatsHelper::mean_sdev(&[3.0, 3.0, 3.0]);
        assert!((mean - 3.0).abs() < 1e-12);
        assert_eq!(sdev, 0.0);
    }
}
