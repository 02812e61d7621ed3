//! Error types for the sensing engine.
//!
//! Configuration problems are caught at construction and are fatal. The only
//! runtime failures are a broken entropy source and addressing a channel the
//! engine was not built with. A zero-filled (not yet warmed) window is valid
//! input and never produces an error.

use thiserror::Error;

use crate::types::Channel;

/// A configuration value that cannot produce a working pipeline.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("window size must be positive")]
    ZeroWindowSize,

    #[error("cluster count k must be positive")]
    ZeroClusterCount,

    #[error("cluster restarts (n_init) must be positive")]
    ZeroRestarts,

    #[error("cluster iteration cap must be positive")]
    ZeroIterationCap,

    #[error("cluster tolerance must be finite and non-negative, got {0}")]
    InvalidTolerance(f64),

    #[error("lower threshold {lower} must be finite and below upper threshold {upper}")]
    InvalidThresholds { lower: f64, upper: f64 },

    #[error("uniform range [{low}, {high}] for {channel} is empty or non-finite")]
    InvalidRange { channel: Channel, low: f64, high: f64 },

    #[error("regime switch probability must lie in [0, 1], got {0}")]
    InvalidSwitchProbability(f64),

    #[error("regime period must be positive")]
    ZeroRegimePeriod,

    #[error("channel set is empty")]
    NoChannels,

    #[error("no channels selected for clustering")]
    NoClusterChannels,

    #[error("no channels selected for hazard monitoring")]
    NoMonitoredChannels,

    #[error("series for {channel} holds {got} samples, expected {expected}")]
    RaggedSeries { channel: Channel, expected: usize, got: usize },

    #[error("channel {0} appears more than once")]
    DuplicateChannel(Channel),

    #[error("{role} channel {channel} is not part of the channel set")]
    ChannelNotInSet { role: &'static str, channel: Channel },
}

/// Errors surfaced by the running pipeline.
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("entropy source failed: {0}")]
    Entropy(#[from] rand::Error),

    #[error("channel {0} is not held by this window")]
    UnknownChannel(Channel),

    #[error("tick supplied {got} samples but the window holds {expected} channels")]
    IncompleteTick { expected: usize, got: usize },

    #[error("failed to parse pipeline config: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, MonitorError>;
