use anyhow::{Context, Result};
use seqbench::battery::{BatteryConfig, BatteryReport, BenchSequence, run_battery};
use seqbench::cli::{Cli, Target};
use seqbench::logging;
use seqbench::report::Comparison;
use sequence_buffer::SequenceBuffer;
use tracing::info;

fn main() -> Result<()> {
    let cli = Cli::parse_args();
    logging::init_logging(cli.verbose);

    let config = cli
        .battery_config()
        .context("Invalid benchmark configuration")?;
    info!(?config, containers = ?cli.target, "starting");

    let reports = run_targets(cli.target, &config);
    println!("{}", Comparison::new(&reports));
    Ok(())
}

fn run_targets(target: Target, config: &BatteryConfig) -> Vec<BatteryReport> {
    let mut reports = Vec::new();
    if target.includes_buffer() {
        reports.push(run_one::<SequenceBuffer<i32>>(config));
    }
    if target.includes_std() {
        reports.push(run_one::<Vec<i32>>(config));
    }
    reports
}

fn run_one<V: BenchSequence>(config: &BatteryConfig) -> BatteryReport {
    println!("Benchmarking {}", V::NAME);
    let report = run_battery::<V>(config);
    println!("------------------------------------------------");
    report
}
