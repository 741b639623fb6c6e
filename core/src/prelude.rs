pub use num_complex::Complex64;

use crate::calibration::CalibrationContext;
use crate::math::window::WindowType;
use serde::{Deserialize, Serialize};

/// Sentinel written at the serialization boundary for values that were not computed.
pub const MISSING_DBL: f64 = -9999.0;

/// Moment-estimation algorithm, selected once per manager.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    Fft,
    #[default]
    PulsePair,
    Abp,
}

/// Shared configuration for the moments manager.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MomentsConfig {
    pub wavelength_cm: f64,
    pub window: WindowType,
    pub algorithm: Algorithm,
    pub start_range_km: f64,
    pub gate_spacing_km: f64,
    pub atmos_attenuation_db_per_km: f64,
    pub dbz_calib_correction_db: f64,
    pub zdr_correction_db: f64,
    pub ldr_correction_db: f64,
    /// Velocity and width are censored below this SNR when set.
    pub snr_threshold_db: Option<f64>,
    /// Pre-sizes the range correction table.
    pub max_gates: Option<usize>,
    pub parallel_gates: bool,
    pub calibration: CalibrationContext,
}

impl Default for MomentsConfig {
    fn default() -> Self {
        Self {
            wavelength_cm: 10.68,
            window: WindowType::Hanning,
            algorithm: Algorithm::PulsePair,
            start_range_km: 0.15,
            gate_spacing_km: 0.15,
            atmos_attenuation_db_per_km: 0.012,
            dbz_calib_correction_db: 0.0,
            zdr_correction_db: 0.0,
            ldr_correction_db: 0.0,
            snr_threshold_db: None,
            max_gates: None,
            parallel_gates: false,
            calibration: CalibrationContext::default(),
        }
    }
}

impl MomentsConfig {
    pub fn wavelength_m(&self) -> f64 {
        self.wavelength_cm / 100.0
    }

    pub fn validate(&self) -> MomentsResult<()> {
        if !(self.wavelength_cm.is_finite() && self.wavelength_cm > 0.0) {
            return Err(MomentsError::Config(format!(
                "wavelength must be positive, got {} cm",
                self.wavelength_cm
            )));
        }
        if !(self.gate_spacing_km.is_finite() && self.gate_spacing_km > 0.0) {
            return Err(MomentsError::Config(format!(
                "gate spacing must be positive, got {} km",
                self.gate_spacing_km
            )));
        }
        if !(self.start_range_km.is_finite() && self.start_range_km >= 0.0) {
            return Err(MomentsError::Config(format!(
                "start range must be non-negative, got {} km",
                self.start_range_km
            )));
        }
        let corrections = [
            ("atmospheric attenuation", self.atmos_attenuation_db_per_km),
            ("dbz calibration correction", self.dbz_calib_correction_db),
            ("zdr correction", self.zdr_correction_db),
            ("ldr correction", self.ldr_correction_db),
        ];
        for (name, value) in corrections {
            if !value.is_finite() {
                return Err(MomentsError::Config(format!("{} is not finite", name)));
            }
        }
        self.calibration.validate()
    }
}

/// Power, velocity and spectral width from one pulse series.
///
/// `None` marks a degenerate series; it becomes [`MISSING_DBL`] when written out.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Moments {
    pub power: Option<f64>,
    pub vel: Option<f64>,
    pub width: Option<f64>,
}

impl Moments {
    pub fn missing() -> Self {
        Self::default()
    }
}

/// Common error type for the moments core.
#[derive(thiserror::Error, Debug)]
pub enum MomentsError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type MomentsResult<T> = Result<T, MomentsError>;

/// Strategy computing moments from one windowed pulse series.
///
/// Implementations never panic on NaN/Inf input and report degenerate
/// series through `None` members rather than errors.
pub trait MomentEstimator: Send + Sync {
    fn name(&self) -> &'static str;
    fn estimate(&self, iq: &[Complex64], prt_secs: f64) -> Moments;
}

/// Nyquist velocity in m/s for a wavelength in meters and a PRT in seconds.
pub fn nyquist_velocity(wavelength_m: f64, prt_secs: f64) -> f64 {
    wavelength_m / (4.0 * prt_secs)
}
