use crate::calibration::Channel;
use crate::prelude::{Complex64, MomentsError, MomentsResult};
use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Receive/transmit arrangement of a beam, which selects the compute path.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PolarizationMode {
    /// H transmit, HC receive.
    #[default]
    Single,
    /// Alternating H/V transmit, HC and VC receive.
    DualFastAlt,
    /// H transmit, HC co-polar and VX cross-polar receive.
    DualCp2Xband,
}

impl PolarizationMode {
    pub fn channels(self) -> &'static [Channel] {
        match self {
            PolarizationMode::Single => &[Channel::Hc],
            PolarizationMode::DualFastAlt => &[Channel::Hc, Channel::Vc],
            PolarizationMode::DualCp2Xband => &[Channel::Hc, Channel::Vx],
        }
    }
}

/// Pointing and timing context of one beam.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeamInfo {
    /// Seconds since the Unix epoch.
    pub time_secs: f64,
    pub elevation_deg: f64,
    pub azimuth_deg: f64,
    pub prt_secs: f64,
    pub n_gates: usize,
}

impl BeamInfo {
    pub fn new(
        time_secs: f64,
        elevation_deg: f64,
        azimuth_deg: f64,
        prt_secs: f64,
        n_gates: usize,
    ) -> Self {
        Self {
            time_secs,
            elevation_deg,
            azimuth_deg,
            prt_secs,
            n_gates,
        }
    }
}

/// I/Q time series for one beam, shaped `[gate][pulse]` per receiver channel.
#[derive(Debug, Clone)]
pub struct BeamIq {
    pub info: BeamInfo,
    channels: BTreeMap<Channel, Array2<Complex64>>,
}

impl BeamIq {
    pub fn new(info: BeamInfo) -> Self {
        Self {
            info,
            channels: BTreeMap::new(),
        }
    }

    pub fn with_channel(mut self, channel: Channel, iq: Array2<Complex64>) -> Self {
        self.channels.insert(channel, iq);
        self
    }

    pub fn channel(&self, channel: Channel) -> MomentsResult<ArrayView2<'_, Complex64>> {
        self.channels
            .get(&channel)
            .map(|iq| iq.view())
            .ok_or_else(|| {
                MomentsError::InvalidInput(format!("beam has no {} channel", channel.label()))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn beam_returns_registered_channels() {
        let info = BeamInfo::new(0.0, 0.5, 90.0, 0.001, 3);
        let beam = BeamIq::new(info)
            .with_channel(Channel::Hc, Array2::zeros((3, 16)))
            .with_channel(Channel::Vx, Array2::zeros((3, 16)));
        assert_eq!(beam.channel(Channel::Hc).unwrap().dim(), (3, 16));
        assert!(beam.channel(Channel::Vc).is_err());
    }

    #[test]
    fn mode_lists_required_channels() {
        assert_eq!(PolarizationMode::Single.channels(), &[Channel::Hc]);
        assert_eq!(
            PolarizationMode::DualCp2Xband.channels(),
            &[Channel::Hc, Channel::Vx]
        );
    }

    #[test]
    fn mode_reads_snake_case() {
        let mode: PolarizationMode = serde_json::from_str("\"dual_fast_alt\"").unwrap();
        assert_eq!(mode, PolarizationMode::DualFastAlt);
    }
}
