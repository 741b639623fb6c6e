use crate::beam_interface::BeamInfo;
use log::{debug, info, warn};

pub struct LogManager;

impl LogManager {
    pub fn new() -> Self {
        Self
    }

    pub fn record(&self, message: &str) {
        info!("{}", message);
    }

    pub fn warn(&self, message: &str) {
        warn!("{}", message);
    }

    /// Per-beam trace line.
    pub fn beam(&self, path: &str, beam: &BeamInfo) {
        debug!(
            "computing {} moments, el {:.2}, az {:.2}, gates {}, prt {:.6}, time {:.3}",
            path, beam.elevation_deg, beam.azimuth_deg, beam.n_gates, beam.prt_secs, beam.time_secs
        );
    }
}

impl Default for LogManager {
    fn default() -> Self {
        Self::new()
    }
}
