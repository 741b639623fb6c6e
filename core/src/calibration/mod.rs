//! Receiver calibration and range-dependent corrections.
//!
//! Calibration is loaded once with the configuration and is read-only while
//! beams are processed.

pub mod range;

pub use range::{RangeCorrectionTable, RangeGeometry};

use crate::math::stats::StatsHelper;
use crate::prelude::{MomentsError, MomentsResult};
use serde::{Deserialize, Serialize};

/// Receiver channel index.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    /// H co-polar
    Hc,
    /// V co-polar
    Vc,
    /// H cross-polar
    Hx,
    /// V cross-polar
    Vx,
}

impl Channel {
    pub const ALL: [Channel; 4] = [Channel::Hc, Channel::Vc, Channel::Hx, Channel::Vx];

    pub fn label(self) -> &'static str {
        match self {
            Channel::Hc => "hc",
            Channel::Vc => "vc",
            Channel::Hx => "hx",
            Channel::Vx => "vx",
        }
    }
}

/// Calibration constants for one receiver channel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReceiverCalibration {
    /// Fixed receiver noise floor in dBm.
    pub noise_fixed_dbm: f64,
    /// Reflectivity at 0 dB SNR and 1 km. Falls back to `base_dbz_1km`.
    pub dbz0: Option<f64>,
    pub receiver_gain_db: f64,
    pub base_dbz_1km: f64,
}

impl Default for ReceiverCalibration {
    fn default() -> Self {
        Self {
            noise_fixed_dbm: -113.0,
            dbz0: None,
            receiver_gain_db: 37.0,
            base_dbz_1km: -45.0,
        }
    }
}

impl ReceiverCalibration {
    /// Noise floor as linear power (mW).
    pub fn noise_power(&self) -> f64 {
        StatsHelper::db_to_power(self.noise_fixed_dbm)
    }

    pub fn dbz0(&self) -> f64 {
        self.dbz0.unwrap_or(self.base_dbz_1km)
    }

    fn validate(&self, channel: Channel) -> MomentsResult<()> {
        let values = [
            self.noise_fixed_dbm,
            self.dbz0(),
            self.receiver_gain_db,
            self.base_dbz_1km,
        ];
        if values.iter().all(|v| v.is_finite()) {
            Ok(())
        } else {
            Err(MomentsError::Config(format!(
                "calibration for channel {} has non-finite values",
                channel.label()
            )))
        }
    }
}

/// Calibration for the four receiver channels.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CalibrationContext {
    pub hc: ReceiverCalibration,
    pub vc: ReceiverCalibration,
    pub hx: ReceiverCalibration,
    pub vx: ReceiverCalibration,
}

impl CalibrationContext {
    /// Same calibration on every channel.
    pub fn uniform(receiver: ReceiverCalibration) -> Self {
        Self {
            hc: receiver.clone(),
            vc: receiver.clone(),
            hx: receiver.clone(),
            vx: receiver,
        }
    }

    pub fn receiver(&self, channel: Channel) -> &ReceiverCalibration {
        match channel {
            Channel::Hc => &self.hc,
            Channel::Vc => &self.vc,
            Channel::Hx => &self.hx,
            Channel::Vx => &self.vx,
        }
    }

    pub fn validate(&self) -> MomentsResult<()> {
        Channel::ALL
            .iter()
            .try_for_each(|&channel| self.receiver(channel).validate(channel))
    }
}
