use anyhow::Context;
use clap::{Parser, ValueEnum};
use momentscore::prelude::Algorithm;
use momentscore::PolarizationMode;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use workflow::config::WorkflowConfig;
use workflow::runner::{Runner, WorkflowResult};

mod generator;
mod workflow;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeArg {
    Single,
    FastAlt,
    Cp2,
}

impl From<ModeArg> for PolarizationMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Single => PolarizationMode::Single,
            ModeArg::FastAlt => PolarizationMode::DualFastAlt,
            ModeArg::Cp2 => PolarizationMode::DualCp2Xband,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum AlgorithmArg {
    Fft,
    PulsePair,
    Abp,
}

impl From<AlgorithmArg> for Algorithm {
    fn from(algorithm: AlgorithmArg) -> Self {
        match algorithm {
            AlgorithmArg::Fft => Algorithm::Fft,
            AlgorithmArg::PulsePair => Algorithm::PulsePair,
            AlgorithmArg::Abp => Algorithm::Abp,
        }
    }
}

#[derive(Parser)]
#[command(author, version, about = "Synthetic-beam driver for the radar moments core")]
struct Args {
    /// Load a workflow config from YAML; the shape flags below are ignored
    #[arg(long)]
    workflow: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = ModeArg::Single)]
    mode: ModeArg,
    /// Overrides the estimator of the workflow
    #[arg(long, value_enum)]
    algorithm: Option<AlgorithmArg>,
    #[arg(long, default_value_t = 4)]
    beams: usize,
    #[arg(long, default_value_t = 200)]
    gates: usize,
    #[arg(long, default_value_t = 64)]
    samples: usize,
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// JSON-lines output, one beam per line
    #[arg(long, default_value = "tools/data/moments.jsonl")]
    output: PathBuf,
}

fn write_json_lines(path: &Path, result: &WorkflowResult) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating output directory {}", parent.display()))?;
    }
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    for beam in &result.beams {
        serde_json::to_writer(&mut writer, beam).context("serializing beam fields")?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut workflow_config = if let Some(path) = args.workflow {
        WorkflowConfig::load(path)?
    } else {
        WorkflowConfig::from_args(args.mode.into(), args.beams, args.gates, args.samples, args.seed)
    };
    if let Some(algorithm) = args.algorithm {
        workflow_config.moments.algorithm = algorithm.into();
    }

    let runner = Runner::new(workflow_config.clone());
    let result = runner.execute()?;
    write_json_lines(&args.output, &result)?;

    println!(
        "{:?} run ({}) -> beams {}, gates {}, missing {}, output {}",
        workflow_config.mode,
        result.estimator,
        result.metrics.beams,
        result.metrics.gates,
        result.metrics.missing_gates,
        args.output.display()
    );
    Ok(())
}
