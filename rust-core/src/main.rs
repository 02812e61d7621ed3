//! Landslide Sensing Engine
//!
//! Stand-alone tick driver. Runs the monitoring pipeline for a fixed number
//! of ticks, logs hazard transitions and summarizes the run. For library
//! use, see lib.rs.
//!
//! Usage:
//! ```text
//! RUST_LOG=landslide_sensing=debug cargo run --bin landslide-sense -- --profile motion --ticks 1440 --seed 7
//! ```

use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use landslide_sensing::{
    Channel, HazardLevel, MonitorPipeline, PipelineConfig, RunRecorder, SensorProfile,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ProfileArg {
    Landslide,
    Motion,
}

impl From<ProfileArg> for SensorProfile {
    fn from(arg: ProfileArg) -> Self {
        match arg {
            ProfileArg::Landslide => SensorProfile::Landslide,
            ProfileArg::Motion => SensorProfile::Motion,
        }
    }
}

#[derive(Parser)]
#[command(name = "landslide-sense")]
#[command(version, about = "Simulate sensor channels and classify hazard levels tick by tick", long_about = None)]
struct Cli {
    /// Channel preset to simulate
    #[arg(short, long, value_enum, default_value = "landslide")]
    profile: ProfileArg,

    /// Number of ticks to run (1440 = one simulated day)
    #[arg(short, long, default_value = "1440")]
    ticks: u64,

    /// Random seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// TOML pipeline config; overrides the profile preset
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print every tick report as a JSON line on stdout
    #[arg(long)]
    json: bool,

    /// Ticks either side of the peak to show in the summary
    #[arg(long, default_value = "10")]
    peak_radius: usize,
}

fn load_config(cli: &Cli) -> Result<PipelineConfig, Box<dyn Error>> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
            PipelineConfig::from_toml_str(&text)?
        }
        None => PipelineConfig::for_profile(cli.profile.into()),
    };
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    Ok(config)
}

fn run(cli: &Cli) -> Result<(), Box<dyn Error>> {
    let config = load_config(cli)?;
    let channels = config.channel_ids();
    let peak_channel = config.monitored.first().or(channels.first()).copied();

    let mut pipeline = MonitorPipeline::new(config)?;
    let mut recorder = RunRecorder::new(channels);
    let mut previous: Option<HazardLevel> = None;

    info!(ticks = cli.ticks, profile = ?cli.profile, "starting run");

    for tick in 0..cli.ticks {
        let report = pipeline.step(tick)?;

        if previous != Some(report.level()) {
            let finding = report
                .hazard
                .finding
                .map(|f| format!("{}[{}]={:.4}", f.channel, f.index, f.value))
                .unwrap_or_default();
            match report.level() {
                HazardLevel::Danger => warn!(tick, level = %report.level(), %finding, "warning level changed"),
                _ => info!(tick, level = %report.level(), %finding, "warning level changed"),
            }
            previous = Some(report.level());
        }

        if cli.json {
            match serde_json::to_string(&report) {
                Ok(line) => println!("{line}"),
                Err(e) => warn!(tick, "failed to serialize report: {e}"),
            }
        }

        recorder.record(&report);
    }

    let (normal, risk, danger) = recorder.level_counts();
    info!(normal, risk, danger, "run complete");

    if let Some(trend) = pipeline.trend_state(Channel::Acceleration) {
        info!(state = ?trend, "final acceleration trend");
    }

    if let Some(peak) = peak_channel.and_then(|c| recorder.peak_neighborhood(c, cli.peak_radius)) {
        info!(
            channel = %peak.channel,
            tick = peak.peak_tick,
            value = peak.peak_value,
            "peak"
        );
        for row in peak.rows {
            let values: Vec<String> = recorder
                .channels()
                .iter()
                .zip(&row.values)
                .map(|(c, v)| format!("{c}={v:.3}"))
                .collect();
            info!(tick = row.tick, level = %row.level, "{}", values.join(" "));
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
