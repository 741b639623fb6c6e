use crate::generator::profile::GeneratorConfig;
use anyhow::Context;
use momentscore::{MomentsConfig, PolarizationMode};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub mode: PolarizationMode,
    pub n_beams: usize,
    pub moments: MomentsConfig,
    pub generator: GeneratorConfig,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            mode: PolarizationMode::Single,
            n_beams: 4,
            moments: MomentsConfig::default(),
            generator: GeneratorConfig::default(),
        }
    }
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_args(mode: PolarizationMode, n_beams: usize, n_gates: usize, n_samples: usize, seed: u64) -> Self {
        Self {
            mode,
            n_beams,
            moments: MomentsConfig::default(),
            generator: GeneratorConfig {
                n_gates,
                n_samples,
                seed,
                ..Default::default()
            },
        }
    }

    /// Generator settings with the radar and gate geometry taken from the
    /// moments configuration.
    pub fn synced_generator(&self) -> GeneratorConfig {
        GeneratorConfig {
            wavelength_cm: self.moments.wavelength_cm,
            start_range_km: self.moments.start_range_km,
            gate_spacing_km: self.moments.gate_spacing_km,
            ..self.generator.clone()
        }
    }
}
