//! Moment estimation for weather radar time series.
//!
//! Turns per-gate I/Q pulse series into calibrated power, reflectivity,
//! Doppler velocity, spectrum width and, for dual-polarization beams, the
//! polarimetric variables.

pub mod beam_interface;
pub mod calibration;
pub mod math;
pub mod prelude;
pub mod processing;
pub mod telemetry;

pub use beam_interface::{BeamInfo, BeamIq, Fields, PolarizationMode};
pub use calibration::{CalibrationContext, Channel, ReceiverCalibration};
pub use prelude::{Algorithm, MomentEstimator, Moments, MomentsConfig, MomentsError, MomentsResult};
pub use processing::MomentsMgr;
