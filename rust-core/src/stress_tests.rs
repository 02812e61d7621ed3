/// Stress testing for the monitoring pipeline.
///
/// Long runs, extreme parameters and pathological inputs that only show up
/// after many ticks or at the edges of the configuration space.

#[cfg(test)]
mod stress_tests {
    use crate::cluster::{ClusterConfig, ClusterEngine};
    use crate::pipeline::*;
    use crate::trend::TrendConfig;
    use crate::types::*;
    use crate::window::SlidingWindowBuffer;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    // ============================================================================
    // CATEGORY 1: EXTREME DURATION
    // ============================================================================

    /// A full week of minute ticks on the motion profile.
    #[test]
    fn stress_one_week_motion_run() {
        let mut config = PipelineConfig::for_profile(SensorProfile::Motion).with_seed(1);
        config.cluster.n_init = 1;
        let mut pipeline = MonitorPipeline::new(config).unwrap();

        for tick in 0..7 * 1440 {
            let report = pipeline.step(tick).unwrap();
            assert_eq!(report.clusters.len(), 100);
        }

        // The escalation latch never releases, even across day boundaries.
        assert_eq!(pipeline.trend_state(Channel::Acceleration), Some(TrendState::High));
        assert_eq!(pipeline.ticks_run(), 7 * 1440);
    }

    /// Window integrity after many wraps of the ring.
    #[test]
    fn stress_many_wraps_keep_order() {
        let channels = [Channel::X, Channel::Y];
        let mut buffer = SlidingWindowBuffer::new(&channels, 13).unwrap();

        for tick in 0..100_000u64 {
            let v = tick as f64;
            buffer.push_tick(&[(Channel::X, v), (Channel::Y, -v)]).unwrap();
        }

        let expected: Vec<f64> = (100_000 - 13..100_000).map(|t| t as f64).collect();
        assert_eq!(buffer.values(Channel::X).unwrap(), expected);
        let negated: Vec<f64> = expected.iter().map(|v| -v).collect();
        assert_eq!(buffer.values(Channel::Y).unwrap(), negated);
    }

    // ============================================================================
    // CATEGORY 2: EXTREME PARAMETER VALUES
    // ============================================================================

    /// Window of a single sample.
    #[test]
    fn stress_window_of_one() {
        let mut config = PipelineConfig::default().with_seed(2);
        config.window_size = 1;
        let mut pipeline = MonitorPipeline::new(config).unwrap();

        for tick in 0..50 {
            let report = pipeline.step(tick).unwrap();
            assert_eq!(report.clusters.len(), 1);
            assert_eq!(report.level(), HazardLevel::Normal);
        }
    }

    /// More clusters than window rows.
    #[test]
    fn stress_k_exceeds_window() {
        let mut config = PipelineConfig::default().with_seed(3);
        config.window_size = 4;
        config.cluster.k = 10;
        let mut pipeline = MonitorPipeline::new(config).unwrap();

        for tick in 0..20 {
            let report = pipeline.step(tick).unwrap();
            assert_eq!(report.clusters.len(), 4);
            assert_eq!(report.clusters.k(), 10);
            assert!(report.clusters.labels.iter().all(|&l| l < 10));
        }
    }

    /// Bad weather every hour, and escalation disabled.
    #[test]
    fn stress_always_average_without_escalation() {
        let mut config = PipelineConfig::for_profile(SensorProfile::Motion).with_seed(4);
        config.trend = TrendConfig {
            switch_probability: 1.0,
            escalation_enabled: false,
            ..Default::default()
        };
        config.cluster.n_init = 1;
        let mut pipeline = MonitorPipeline::new(config).unwrap();

        for tick in 0..2000 {
            let report = pipeline.step(tick).unwrap();
            let value = report.sample(Channel::Acceleration).unwrap();
            assert!((2.0..10.0).contains(&value), "tick {tick}: {value}");
        }
        assert_eq!(pipeline.trend_state(Channel::Acceleration), Some(TrendState::Average));
    }

    /// Channels spanning wildly different scales still cluster every row.
    #[test]
    fn stress_multiscale_channels() {
        let mut config = PipelineConfig::for_profile(SensorProfile::Motion).with_seed(5);
        config.clustered = vec![Channel::Acceleration, Channel::X, Channel::Rotation];
        config.cluster.n_init = 2;
        let mut pipeline = MonitorPipeline::new(config).unwrap();

        for tick in 1150..1300 {
            let report = pipeline.step(tick).unwrap();
            assert_eq!(report.clusters.len(), 100);
            assert!(report.clusters.inertia.is_finite());
        }
    }

    // ============================================================================
    // CATEGORY 3: PATHOLOGICAL INPUT
    // ============================================================================

    /// Constant channels produce identical rows for clustering.
    #[test]
    fn stress_constant_channels() {
        let mut config = PipelineConfig::default().with_seed(6);
        config.channels = vec![
            ChannelSpec::uniform(Channel::Vibration, 0.42, 0.42),
            ChannelSpec::uniform(Channel::Moisture, 0.42, 0.42),
            ChannelSpec::uniform(Channel::Temperature, 0.42, 0.42),
        ];
        let mut pipeline = MonitorPipeline::new(config).unwrap();

        let reports = pipeline.run(200).unwrap();
        let last = reports.last().unwrap();
        assert_eq!(last.level(), HazardLevel::Normal);
        assert!(last.clusters.inertia < 1e-20);
        assert!(last.clusters.converged);
    }

    /// Huge magnitudes do not overflow the distance computation.
    #[test]
    fn stress_large_magnitudes() {
        let engine = ClusterEngine::new(ClusterConfig::default()).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let rows: Vec<Vec<f64>> = (0..100)
            .map(|i| vec![1e100 * (i % 3) as f64, 1e100, -1e100])
            .collect();

        let result = engine.fit(&rows, &mut rng);
        assert_eq!(result.len(), 100);
        assert!(result.labels.iter().all(|&l| l < 3));
    }

    /// NaN samples never panic the clustering.
    #[test]
    fn stress_nan_rows() {
        let engine = ClusterEngine::new(ClusterConfig::default()).unwrap();
        let mut rng = StdRng::seed_from_u64(8);
        let mut rows = vec![vec![0.5, 0.5]; 50];
        rows[10] = vec![f64::NAN, 0.5];

        let result = engine.fit(&rows, &mut rng);
        assert_eq!(result.len(), 50);
        assert!(result.labels.iter().all(|&l| l < 3));
    }
}
