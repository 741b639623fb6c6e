use crate::generator::profile::build_beam;
use crate::workflow::config::WorkflowConfig;
use anyhow::Context;
use log::info;
use momentscore::telemetry::MetricsSnapshot;
use momentscore::{BeamInfo, Fields, MomentsMgr};
use serde::Serialize;

/// Moments of one beam, written out as one JSON line.
#[derive(Debug, Clone, Serialize)]
pub struct BeamFields {
    pub info: BeamInfo,
    pub fields: Vec<Fields>,
}

pub struct WorkflowResult {
    pub beams: Vec<BeamFields>,
    pub metrics: MetricsSnapshot,
    pub estimator: &'static str,
}

#[derive(Clone)]
pub struct Runner {
    config: WorkflowConfig,
}

impl Runner {
    pub fn new(config: WorkflowConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> anyhow::Result<WorkflowResult> {
        let mut mgr = MomentsMgr::new(self.config.moments.clone())
            .context("configuring moments manager")?;
        let generator = self.config.synced_generator();

        let mut beams = Vec::with_capacity(self.config.n_beams);
        for beam_index in 0..self.config.n_beams {
            let beam = build_beam(&generator, self.config.mode, beam_index)
                .with_context(|| format!("generating beam {}", beam_index))?;
            let fields = mgr
                .compute(&beam, self.config.mode)
                .with_context(|| format!("computing moments for beam {}", beam_index))?;
            beams.push(BeamFields {
                info: beam.info,
                fields,
            });
        }

        let metrics = mgr.metrics();
        info!(
            "processed {} beams, {} gates, {} missing",
            metrics.beams, metrics.gates, metrics.missing_gates
        );
        Ok(WorkflowResult {
            beams,
            metrics,
            estimator: mgr.estimator_name(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use momentscore::math::window::WindowType;
    use momentscore::PolarizationMode;

    fn config(mode: PolarizationMode) -> WorkflowConfig {
        let mut cfg = WorkflowConfig::from_args(mode, 2, 20, 64, 11);
        cfg.moments.window = WindowType::Rectangular;
        cfg
    }

    #[test]
    fn runner_executes_workflow() {
        let cfg = config(PolarizationMode::Single);
        let result = Runner::new(cfg.clone()).execute().unwrap();
        assert_eq!(result.beams.len(), cfg.n_beams);
        assert_eq!(result.beams[0].fields.len(), cfg.generator.n_gates);
        assert_eq!(result.metrics.beams, 2);
        assert_eq!(result.metrics.gates, 40);
        assert_eq!(result.estimator, "pulse_pair");
    }

    #[test]
    fn single_mode_recovers_velocity() {
        let cfg = config(PolarizationMode::Single);
        let result = Runner::new(cfg.clone()).execute().unwrap();
        let near = &result.beams[0].fields[0];
        assert!((near.vel.unwrap() - cfg.generator.velocity_ms).abs() < 0.5);
        assert!(near.snr.unwrap() > 30.0);
    }

    #[test]
    fn fast_alt_recovers_polarimetric_variables() {
        let cfg = config(PolarizationMode::DualFastAlt);
        let result = Runner::new(cfg.clone()).execute().unwrap();
        let near = &result.beams[0].fields[0];
        assert!((near.zdr.unwrap() - cfg.generator.zdr_db).abs() < 0.3);
        assert!((near.phidp.unwrap() - cfg.generator.phidp_deg).abs() < 2.0);
        assert!((near.vel.unwrap() - cfg.generator.velocity_ms).abs() < 0.5);
        assert!(near.rhohv.unwrap() > 0.95);
        assert!((near.ldrh.unwrap() - cfg.generator.ldr_db).abs() < 1.0);
    }

    #[test]
    fn cp2_mode_recovers_ldr() {
        let cfg = config(PolarizationMode::DualCp2Xband);
        let result = Runner::new(cfg.clone()).execute().unwrap();
        let near = &result.beams[0].fields[0];
        assert!((near.ldrh.unwrap() - cfg.generator.ldr_db).abs() < 1.0);
        assert_eq!(near.dbzhc, near.dbz);
    }

    #[test]
    fn invalid_moments_config_is_reported() {
        let mut cfg = config(PolarizationMode::Single);
        cfg.moments.gate_spacing_km = 0.0;
        let err = Runner::new(cfg).execute().err().unwrap();
        assert!(format!("{:#}", err).contains("configuring moments manager"));
    }
}
