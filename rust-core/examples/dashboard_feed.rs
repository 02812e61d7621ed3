/// Dashboard feed example: drive the landslide profile the way a live page would
use landslide_sensing::{Channel, HazardLevel, MonitorPipeline, PipelineConfig, TickReport};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Landslide Sensing Engine: Dashboard Feed ===\n");

    // Default profile: vibration, moisture, temperature in [0.40, 0.45), 100-sample windows
    let config = PipelineConfig::default().with_seed(2403);
    let mut pipeline = MonitorPipeline::new(config)?;

    let mut previous: Option<HazardLevel> = None;

    for tick in 0..130 {
        let report = pipeline.step(tick)?;

        // The gauge only needs redrawing when the level moves
        if previous != Some(report.level()) {
            print_report(&report);
            previous = Some(report.level());
        }
    }

    // One vibration spike, pushed straight into the window
    println!("\nInjecting a vibration spike of 0.47...");
    let mut buffer = pipeline.buffer().clone();
    buffer.push_tick(&[
        (Channel::Vibration, 0.47),
        (Channel::Moisture, 0.42),
        (Channel::Temperature, 0.42),
    ])?;
    let classifier = landslide_sensing::HazardClassifier::new(
        pipeline.config().thresholds,
        pipeline.config().monitored.clone(),
    )?;
    let assessment = classifier.assess(&buffer.snapshot())?;
    println!(
        "Warning Level: {} (gauge {})",
        assessment.level,
        assessment.severity()
    );

    Ok(())
}

fn print_report(report: &TickReport) {
    println!("\n--- Tick {} ---", report.tick);
    for (channel, value) in &report.samples {
        println!("  {channel:<12} {value:.4}");
    }
    println!("  Warning Level: {} (gauge {})", report.level(), report.severity);
    if let Some(finding) = report.hazard.finding {
        println!(
            "  Triggered by {} at window index {} = {:.4}",
            finding.channel, finding.index, finding.value
        );
    }
    println!("  Cluster sizes: {:?}", report.clusters.sizes());
    for (label, centroid) in report.clusters.centroids.iter().enumerate() {
        let coords: Vec<String> = centroid.iter().map(|v| format!("{v:.4}")).collect();
        println!("    Cluster {}: [{}]", label + 1, coords.join(", "));
    }
}
