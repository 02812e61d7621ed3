/// Daily motion example: simulate 24 hours of rotation/acceleration/axis readings
use landslide_sensing::{Channel, MonitorPipeline, PipelineConfig, RunRecorder, SensorProfile};

const MINUTES_PER_DAY: u64 = 24 * 60;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Landslide Sensing Engine: 24-Hour Motion Run ===\n");

    let config = PipelineConfig::for_profile(SensorProfile::Motion).with_seed(20);
    let mut pipeline = MonitorPipeline::new(config)?;
    let mut recorder = RunRecorder::new(pipeline.config().channel_ids());

    for minute in 0..MINUTES_PER_DAY {
        let report = pipeline.step(minute)?;
        if minute % 60 == 0 {
            println!(
                "Hour {:>2}: trend {:?}, acceleration {:.2}, level {}",
                minute / 60,
                pipeline.trend_state(Channel::Acceleration).unwrap_or_default(),
                report.sample(Channel::Acceleration).unwrap_or(f64::NAN),
                report.level()
            );
        }
        recorder.record(&report);
    }

    let (normal, risk, danger) = recorder.level_counts();
    println!("\nMinutes per level: normal={normal} risk={risk} danger={danger}");

    if let Some(peak) = recorder.peak_neighborhood(Channel::Acceleration, 10) {
        println!(
            "\nPeak acceleration {:.2} at minute {}",
            peak.peak_value, peak.peak_tick
        );
        println!("Axes around the peak:");
        let columns: Vec<usize> = [Channel::X, Channel::Y, Channel::Z]
            .iter()
            .filter_map(|c| recorder.channels().iter().position(|r| r == c))
            .collect();
        for row in peak.rows {
            let axes: Vec<String> = columns.iter().map(|&i| format!("{:.3}", row.values[i])).collect();
            println!("  minute {:>4}: {}", row.tick, axes.join("  "));
        }
    }

    Ok(())
}
