use anyhow::Context;
use clap::Parser;
use generator::profile::build_spectrogram;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use workflow::config::WorkflowConfig;
use workflow::runner::{Runner, WorkflowResult};

mod generator;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Offline driver for the streaming dedispersion core")]
struct Args {
    /// Load a workflow config from YAML
    #[arg(long)]
    workflow: Option<PathBuf>,
    #[arg(long, default_value_t = 256)]
    vec_length: usize,
    #[arg(long, default_value_t = 64)]
    num_dms: usize,
    #[arg(long, default_value_t = 1.0)]
    dm_step: f64,
    #[arg(long, default_value_t = 1024)]
    samples_per_call: usize,
    /// Override the DM of the synthetic pulse
    #[arg(long)]
    pulse_dm: Option<f64>,
    /// Override the generator and chunking seeds
    #[arg(long)]
    seed: Option<u64>,
    /// Where to write the JSON summary
    #[arg(long, default_value = "tools/data/dedispersion_report.json")]
    report: PathBuf,
}

#[derive(Serialize)]
struct Report<'a> {
    config: &'a WorkflowConfig,
    result: &'a WorkflowResult,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut workflow_config = if let Some(path) = args.workflow {
        WorkflowConfig::load(path)?
    } else {
        WorkflowConfig::from_args(
            args.vec_length,
            args.num_dms,
            args.dm_step,
            args.samples_per_call,
        )
    };
    if let Some(dm) = args.pulse_dm {
        workflow_config.generator.pulse_dm = dm;
    }
    if let Some(seed) = args.seed {
        workflow_config.generator.seed = seed;
        workflow_config.stream.seed = seed;
    }

    let spectrogram = build_spectrogram(
        &workflow_config.generator,
        &workflow_config.dedispersion,
        workflow_config.stream.total_samples,
    )
    .context("synthesising dispersed pulse")?;

    let runner = Runner::new(workflow_config.clone());
    let result = runner.execute(spectrogram.view())?;

    println!(
        "Dedispersed {} samples over {} trials (max shift {}, {} work calls, {} starved)",
        result.samples_produced,
        result.trials.len(),
        result.max_shift,
        result.work_calls,
        result.starved_calls
    );
    if let Some(best) = result.best() {
        println!(
            "Best trial {} at DM {:.3}: peak {:.3} at sample {}, S/N {:.2} (injected DM {:.3})",
            best.trial,
            best.dm,
            best.peak,
            best.peak_sample,
            best.snr,
            workflow_config.generator.pulse_dm
        );
    }

    write_report(
        &args.report,
        &Report {
            config: &workflow_config,
            result: &result,
        },
    )
}

fn write_report(path: &Path, report: &Report<'_>) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating report directory {}", parent.display()))?;
    }
    let body = serde_json::to_string_pretty(report).context("serialising report")?;
    fs::write(path, body).with_context(|| format!("writing report {}", path.display()))?;
    Ok(())
}
