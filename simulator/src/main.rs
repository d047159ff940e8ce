use anyhow::Context;
use clap::Parser;
use generator::profile::scenario_batch;
use ingest::group_records;
use ingest::reader::read_waveform_file;
use report::model::Verdict;
use std::fs;
use std::path::PathBuf;
use workflow::config::WorkflowConfig;
use workflow::runner::Runner;

mod generator;
mod ingest;
mod report;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Batch driver for ground-motion channel groups")]
struct Args {
    /// JSON waveform files to ingest
    #[arg(long = "input")]
    inputs: Vec<PathBuf>,
    /// Process the built-in synthetic scenario batch
    #[arg(long, default_value_t = false)]
    synthetic: bool,
    /// Seed for the synthetic scenario batch
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Load a workflow config from YAML
    #[arg(long)]
    workflow: Option<PathBuf>,
    #[arg(long, default_value_t = gmstream::prelude::DEFAULT_INTERPOLATION_WINDOW)]
    interpolation_window: usize,
    #[arg(long, default_value_t = 4)]
    workers: usize,
    /// Write the batch report as JSON
    #[arg(long)]
    report: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let workflow_config = if let Some(path) = args.workflow {
        WorkflowConfig::load(path)?
    } else {
        WorkflowConfig::from_args(args.interpolation_window, args.workers)
    };

    let mut records = Vec::new();
    for path in &args.inputs {
        records.extend(read_waveform_file(path, &workflow_config.exclude_seismometers)?);
    }
    if args.synthetic || args.inputs.is_empty() {
        records.extend(scenario_batch(args.seed)?);
    }

    let groups = group_records(records);
    let runner = Runner::new(workflow_config);
    let report = runner.execute(groups)?;

    for group in &report.groups {
        let detail = match group.verdict {
            Verdict::Passed => String::new(),
            Verdict::Flagged => format!(" -> {}", group.failures.join("; ")),
            Verdict::Rejected => format!(" -> {}", group.error.clone().unwrap_or_default()),
        };
        println!("{} {:?}{}", group.group_id, group.verdict, detail);
    }
    println!(
        "Batch -> passed {}, flagged {}, rejected {}",
        report.metrics.passed, report.metrics.flagged, report.metrics.rejected
    );

    if let Some(path) = args.report {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&report).context("serializing batch report")?;
        fs::write(&path, json).with_context(|| format!("writing report {}", path.display()))?;
    }

    Ok(())
}
