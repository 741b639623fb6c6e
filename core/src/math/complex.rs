use crate::prelude::Complex64;

/// Mean of |c|² over the series; zero for an empty series.
pub fn mean_power(iq: &[Complex64]) -> f64 {
    if iq.is_empty() {
        return 0.0;
    }
    iq.iter().map(|c| c.norm_sqr()).sum::<f64>() / iq.len() as f64
}

/// Mean of `c1[i] * conj(c2[i])` over the shorter of the two series.
pub fn mean_conjugate_product(c1: &[Complex64], c2: &[Complex64]) -> Complex64 {
    let len = c1.len().min(c2.len());
    if len == 0 {
        return Complex64::new(0.0, 0.0);
    }
    let sum: Complex64 = c1
        .iter()
        .zip(c2.iter())
        .map(|(a, b)| a * b.conj())
        .sum();
    sum / len as f64
}

/// Lag-`lag` autocorrelation `mean(s[i] * conj(s[i + lag]))`.
pub fn autocorrelation(iq: &[Complex64], lag: usize) -> Complex64 {
    if lag >= iq.len() {
        return Complex64::new(0.0, 0.0);
    }
    mean_conjugate_product(&iq[..iq.len() - lag], &iq[lag..])
}

/// Phase angle in radians, zero for a zero or non-finite value.
pub fn arg(c: Complex64) -> f64 {
    if !(c.re.is_finite() && c.im.is_finite()) || (c.re == 0.0 && c.im == 0.0) {
        return 0.0;
    }
    c.im.atan2(c.re)
}

/// Splits an alternating series into its even and odd pulses.
pub fn split_alternating(iq: &[Complex64]) -> (Vec<Complex64>, Vec<Complex64>) {
    let even = iq.iter().step_by(2).copied().collect();
    let odd = iq.iter().skip(1).step_by(2).copied().collect();
    (even, odd)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_power_of_unit_phasors() {
        let iq: Vec<Complex64> = (0..8).map(|i| Complex64::from_polar(1.0, i as f64)).collect();
        assert!((mean_power(&iq) - 1.0).abs() < 1e-12);
        assert_eq!(mean_power(&[]), 0.0);
    }

    #[test]
    fn conjugate_product_removes_common_phase() {
        let a = [Complex64::from_polar(2.0, 0.7)];
        let b = [Complex64::from_polar(3.0, 0.2)];
        let r = mean_conjugate_product(&a, &b);
        assert!((r.norm() - 6.0).abs() < 1e-12);
        assert!((arg(r) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn autocorrelation_of_rotating_phasor() {
        let step = 0.25;
        let iq: Vec<Complex64> = (0..16)
            .map(|i| Complex64::from_polar(1.0, step * i as f64))
            .collect();
        let r1 = autocorrelation(&iq, 1);
        assert!((arg(r1) + step).abs() < 1e-12);
        assert!((r1.norm() - 1.0).abs() < 1e-12);
        assert_eq!(autocorrelation(&iq, 16), Complex64::new(0.0, 0.0));
    }

    #[test]
    fn arg_of_pure_imaginary() {
        assert!((arg(Complex64::new(0.0, 1.0)) - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
        assert_eq!(arg(Complex64::new(0.0, 0.0)), 0.0);
        assert_eq!(arg(Complex64::new(f64::NAN, 1.0)), 0.0);
    }

    #[test]
    fn split_alternating_interleaves() {
        let iq: Vec<Complex64> = (0..5).map(|i| Complex64::new(i as f64, 0.0)).collect();
        let (even, odd) = split_alternating(&iq);
        assert_eq!(even.iter().map(|c| c.re).collect::<Vec<_>>(), vec![0.0, 2.0, 4.0]);
        assert_eq!(odd.iter().map(|c| c.re).collect::<Vec<_>>(), vec![1.0, 3.0]);
    }
}
