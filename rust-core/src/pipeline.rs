//! Complete monitoring pipeline integrating all stages.
//!
//! One call to [`MonitorPipeline::step`] performs a full tick:
//! 1. **Generation**: every channel's source draws its sample for the tick
//! 2. **Windowing**: all samples are pushed into the sliding windows at once
//! 3. **Clustering**: the joint window over the clustered channels is
//!    partitioned from scratch
//! 4. **Classification**: the monitored channels' windows map to a hazard level
//!
//! The pipeline is the only owner of simulation state (trend regimes, window
//! contents, the random source). `step` takes `&mut self`, so ticks cannot
//! overlap and every draw of a tick completes before the snapshot is read.
//!
//! # Randomness
//! A single `StdRng` is shared by all channels and the cluster seeding. With a
//! fixed seed a run is reproducible value for value.

use rand::rngs::{OsRng, StdRng};
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::cluster::{ClusterAssignment, ClusterConfig, ClusterEngine};
use crate::error::{ConfigError, Result};
use crate::hazard::{HazardAssessment, HazardClassifier, HazardThresholds};
use crate::trend::{SampleSource, TrendConfig};
use crate::types::{Channel, ChannelSpec, HazardLevel, SensorProfile, TrendState};
use crate::window::{SlidingWindowBuffer, WindowSnapshot};

/// Configuration for the complete pipeline.
///
/// Bundles every component configuration so a whole run can be described by
/// one value or one TOML file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Samples kept per channel. Typical: 100.
    pub window_size: usize,

    /// Fixed seed for reproducible runs. `None` seeds from the OS.
    pub seed: Option<u64>,

    /// Channels forming the columns of the clustering input.
    pub clustered: Vec<Channel>,

    /// Channels scanned by the hazard classifier.
    pub monitored: Vec<Channel>,

    /// Regime rules for trended channels.
    pub trend: TrendConfig,

    /// K-means parameters.
    pub cluster: ClusterConfig,

    /// Normal band for hazard classification.
    pub thresholds: HazardThresholds,

    /// Channels and how each is generated, in window order.
    pub channels: Vec<ChannelSpec>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::for_profile(SensorProfile::Landslide)
    }
}

impl PipelineConfig {
    /// Preset channel layout for a profile.
    ///
    /// The motion profile monitors acceleration against a 0..10 band, so only
    /// the High regime (10..20) reaches Danger and Risk cannot occur.
    pub fn for_profile(profile: SensorProfile) -> Self {
        match profile {
            SensorProfile::Landslide => Self {
                channels: vec![
                    ChannelSpec::uniform(Channel::Vibration, 0.40, 0.45),
                    ChannelSpec::uniform(Channel::Moisture, 0.40, 0.45),
                    ChannelSpec::uniform(Channel::Temperature, 0.40, 0.45),
                ],
                window_size: 100,
                clustered: vec![Channel::Vibration, Channel::Moisture, Channel::Temperature],
                monitored: vec![Channel::Vibration, Channel::Moisture, Channel::Temperature],
                trend: TrendConfig::default(),
                cluster: ClusterConfig::default(),
                thresholds: HazardThresholds::default(),
                seed: None,
            },
            SensorProfile::Motion => Self {
                channels: vec![
                    ChannelSpec::uniform(Channel::Rotation, 0.0, 2.0),
                    ChannelSpec::trended(Channel::Acceleration),
                    ChannelSpec::uniform(Channel::X, 0.0, 1.0),
                    ChannelSpec::uniform(Channel::Y, 0.0, 1.0),
                    ChannelSpec::uniform(Channel::Z, 0.0, 1.0),
                ],
                window_size: 100,
                clustered: vec![Channel::X, Channel::Y, Channel::Z],
                monitored: vec![Channel::Acceleration],
                trend: TrendConfig::default(),
                cluster: ClusterConfig::default(),
                thresholds: HazardThresholds {
                    lower: 0.0,
                    upper: 10.0,
                },
                seed: None,
            },
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Parse a TOML document. Missing fields take the landslide defaults.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn channel_ids(&self) -> Vec<Channel> {
        self.channels.iter().map(|s| s.channel).collect()
    }

    /// Check every component configuration and cross-reference the channel
    /// selections against the channel set.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.channels.is_empty() {
            return Err(ConfigError::NoChannels);
        }
        if self.window_size == 0 {
            return Err(ConfigError::ZeroWindowSize);
        }
        let ids = self.channel_ids();
        for (i, channel) in ids.iter().enumerate() {
            if ids[..i].contains(channel) {
                return Err(ConfigError::DuplicateChannel(*channel));
            }
        }
        if self.clustered.is_empty() {
            return Err(ConfigError::NoClusterChannels);
        }
        for &channel in &self.clustered {
            if !ids.contains(&channel) {
                return Err(ConfigError::ChannelNotInSet { role: "clustered", channel });
            }
        }
        if self.monitored.is_empty() {
            return Err(ConfigError::NoMonitoredChannels);
        }
        for &channel in &self.monitored {
            if !ids.contains(&channel) {
                return Err(ConfigError::ChannelNotInSet { role: "monitored", channel });
            }
        }
        self.cluster.validate()?;
        self.thresholds.validate()?;
        Ok(())
    }
}

/// Everything the presentation layer needs for one tick.
#[derive(Debug, Clone, Serialize)]
pub struct TickReport {
    pub tick: u64,
    /// Sample generated for each channel this tick, in window order.
    pub samples: Vec<(Channel, f64)>,
    pub clusters: ClusterAssignment,
    pub hazard: HazardAssessment,
    /// Ordinal severity of `hazard` (Normal=1, Risk=2, Danger=3).
    pub severity: u8,
}

impl TickReport {
    pub fn level(&self) -> HazardLevel {
        self.hazard.level
    }

    pub fn sample(&self, channel: Channel) -> Option<f64> {
        self.samples.iter().find(|(c, _)| *c == channel).map(|(_, v)| *v)
    }
}

/// Owned simulation state driven one tick at a time.
pub struct MonitorPipeline {
    config: PipelineConfig,
    sources: Vec<(Channel, SampleSource)>,
    buffer: SlidingWindowBuffer,
    cluster_engine: ClusterEngine,
    classifier: HazardClassifier,
    rng: StdRng,
    ticks_run: u64,
    last_level: Option<HazardLevel>,
}

impl MonitorPipeline {
    /// Build a pipeline. Seeds from `config.seed`, or from the OS entropy
    /// source when no seed is given; an entropy failure is returned.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(OsRng)?,
        };
        Self::with_rng(config, rng)
    }

    /// Build a pipeline around an existing random source.
    pub fn with_rng(config: PipelineConfig, rng: StdRng) -> Result<Self> {
        config.validate()?;

        let sources = config
            .channels
            .iter()
            .map(|spec| Ok((spec.channel, SampleSource::from_spec(spec, &config.trend)?)))
            .collect::<std::result::Result<Vec<_>, ConfigError>>()?;
        let buffer = SlidingWindowBuffer::new(&config.channel_ids(), config.window_size)?;
        let cluster_engine = ClusterEngine::new(config.cluster.clone())?;
        let classifier = HazardClassifier::new(config.thresholds, config.monitored.clone())?;

        debug!(
            channels = sources.len(),
            window_size = config.window_size,
            k = config.cluster.k,
            seeded = config.seed.is_some(),
            "monitor pipeline created"
        );

        Ok(Self {
            config,
            sources,
            buffer,
            cluster_engine,
            classifier,
            rng,
            ticks_run: 0,
            last_level: None,
        })
    }

    /// Run one full tick: generate, push, cluster, classify.
    pub fn step(&mut self, tick: u64) -> Result<TickReport> {
        let samples: Vec<(Channel, f64)> = self
            .sources
            .iter_mut()
            .map(|(channel, source)| (*channel, source.next_sample(tick, &mut self.rng)))
            .collect();
        self.buffer.push_tick(&samples)?;

        let snapshot = self.buffer.snapshot();
        let rows = snapshot.rows(&self.config.clustered)?;
        let clusters = self.cluster_engine.fit(&rows, &mut self.rng);
        let hazard = self.classifier.assess(&snapshot)?;

        trace!(tick, level = %hazard.level, inertia = clusters.inertia, "tick processed");
        if self.last_level != Some(hazard.level) {
            debug!(tick, from = ?self.last_level, to = %hazard.level, "hazard level changed");
            self.last_level = Some(hazard.level);
        }
        self.ticks_run += 1;

        Ok(TickReport {
            tick,
            samples,
            severity: hazard.severity(),
            clusters,
            hazard,
        })
    }

    /// Drive ticks `0..ticks` and collect every report.
    pub fn run(&mut self, ticks: u64) -> Result<Vec<TickReport>> {
        (0..ticks).map(|tick| self.step(tick)).collect()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn buffer(&self) -> &SlidingWindowBuffer {
        &self.buffer
    }

    pub fn snapshot(&self) -> WindowSnapshot {
        self.buffer.snapshot()
    }

    /// Current regime of a trended channel; `None` for flat or unknown channels.
    pub fn trend_state(&self, channel: Channel) -> Option<TrendState> {
        self.sources
            .iter()
            .find(|(c, _)| *c == channel)
            .and_then(|(_, source)| source.trend_state())
    }

    pub fn ticks_run(&self) -> u64 {
        self.ticks_run
    }
}
