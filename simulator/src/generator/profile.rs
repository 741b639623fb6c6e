use crate::generator::template::{Echo, GateEchoes, PulseTemplate};
use anyhow::Context;
use momentscore::math::stats::StatsHelper;
use momentscore::prelude::{nyquist_velocity, Complex64};
use momentscore::{BeamInfo, BeamIq, PolarizationMode};
use ndarray::Array2;
use rand::{rngs::StdRng, SeedableRng};
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Configuration for generating synthetic I/Q beams.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub n_gates: usize,
    pub n_samples: usize,
    pub prt_secs: f64,
    pub wavelength_cm: f64,
    pub start_range_km: f64,
    pub gate_spacing_km: f64,
    pub elevation_deg: f64,
    pub azimuth_step_deg: f64,
    /// Radial velocity of the target, positive away from the radar.
    pub velocity_ms: f64,
    /// SNR at zero range; it drops linearly with range.
    pub snr_db_near: f64,
    pub snr_falloff_db_per_km: f64,
    pub zdr_db: f64,
    pub phidp_deg: f64,
    pub ldr_db: f64,
    pub noise_dbm: f64,
    pub seed: u64,
    pub description: Option<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            n_gates: 200,
            n_samples: 64,
            prt_secs: 0.001,
            wavelength_cm: 10.68,
            start_range_km: 0.15,
            gate_spacing_km: 0.15,
            elevation_deg: 0.5,
            azimuth_step_deg: 1.0,
            velocity_ms: 8.0,
            snr_db_near: 40.0,
            snr_falloff_db_per_km: 0.5,
            zdr_db: 1.5,
            phidp_deg: 20.0,
            ldr_db: -25.0,
            noise_dbm: -113.0,
            seed: 0,
            description: None,
        }
    }
}

impl GeneratorConfig {
    fn normalized_gates(&self) -> usize {
        self.n_gates.max(1)
    }

    fn normalized_samples(&self) -> usize {
        self.n_samples.max(2)
    }

    /// Pulse-to-pulse Doppler phase step; motion away from the radar
    /// retards the phase.
    pub fn phase_step(&self) -> f64 {
        let nyquist = nyquist_velocity(self.wavelength_cm / 100.0, self.prt_secs);
        -PI * self.velocity_ms / nyquist
    }

    pub fn snr_db(&self, gate: usize) -> f64 {
        let range_km = self.start_range_km + gate as f64 * self.gate_spacing_km;
        self.snr_db_near - self.snr_falloff_db_per_km * range_km
    }

    fn echoes(&self, gate: usize) -> GateEchoes {
        let noise = StatsHelper::db_to_power(self.noise_dbm);
        let h = (noise * StatsHelper::db_to_power(self.snr_db(gate))).sqrt();
        GateEchoes {
            h: Echo::new(h, 0.0),
            v: Echo::new(h * 10.0_f64.powf(-self.zdr_db / 20.0), self.phidp_deg.to_radians()),
            cross: Echo::new(h * 10.0_f64.powf(self.ldr_db / 20.0), 0.0),
        }
    }
}

pub fn build_beam(
    config: &GeneratorConfig,
    mode: PolarizationMode,
    beam_index: usize,
) -> anyhow::Result<BeamIq> {
    let n_gates = config.normalized_gates();
    let n_samples = config.normalized_samples();
    n_gates
        .checked_mul(n_samples)
        .context("overflow computing sample count for generator")?;
    if !(config.prt_secs.is_finite() && config.prt_secs > 0.0) {
        anyhow::bail!("generator prt must be positive, got {}", config.prt_secs);
    }

    let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(beam_index as u64));
    // half the noise power on each of I and Q
    let noise_sdev = (StatsHelper::db_to_power(config.noise_dbm) / 2.0).sqrt();
    let noise_dist = Normal::new(0.0, noise_sdev)
        .with_context(|| format!("invalid noise level {} dBm", config.noise_dbm))?;
    let phase_step = config.phase_step();
    let echoes: Vec<GateEchoes> = (0..n_gates).map(|gate| config.echoes(gate)).collect();

    let info = BeamInfo::new(
        beam_index as f64 * n_samples as f64 * config.prt_secs,
        config.elevation_deg,
        (beam_index as f64 * config.azimuth_step_deg).rem_euclid(360.0),
        config.prt_secs,
        n_gates,
    );

    let mut beam = BeamIq::new(info);
    for &channel in mode.channels() {
        let iq = Array2::from_shape_fn((n_gates, n_samples), |(gate, pulse)| {
            let template = PulseTemplate::for_channel(mode, channel, &echoes[gate]);
            let noise = Complex64::new(noise_dist.sample(&mut rng), noise_dist.sample(&mut rng));
            template.sample(pulse, phase_step) + noise
        });
        beam = beam.with_channel(channel, iq);
    }
    Ok(beam)
}
