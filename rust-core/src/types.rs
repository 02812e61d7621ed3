//! Core data types for the sensing engine.
//!
//! Every concept that crosses a module boundary gets a type here: the sensor
//! channel identifiers, how a channel is generated, the qualitative trend
//! regime, and the discrete hazard level handed to the presentation layer.
//!
//! Samples are `f64`. Thresholds such as 0.40 and 0.45 sit close together and
//! are compared with strict inequalities, so single precision is not enough.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a simulated sensor channel.
///
/// Channels are independent but co-indexed by tick: index `i` of every
/// channel's window was produced by the same tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    /// Ground vibration (landslide profile).
    Vibration,
    /// Soil moisture (landslide profile).
    Moisture,
    /// Ground temperature (landslide profile).
    Temperature,
    /// Rotation angle (motion profile).
    Rotation,
    /// Acceleration magnitude, the only channel with a trend regime.
    Acceleration,
    /// Spatial X axis (motion profile).
    X,
    /// Spatial Y axis (motion profile).
    Y,
    /// Spatial Z axis (motion profile).
    Z,
}

impl Channel {
    /// Stable lowercase name, matching the serialized form.
    pub fn name(&self) -> &'static str {
        match self {
            Channel::Vibration => "vibration",
            Channel::Moisture => "moisture",
            Channel::Temperature => "temperature",
            Channel::Rotation => "rotation",
            Channel::Acceleration => "acceleration",
            Channel::X => "x",
            Channel::Y => "y",
            Channel::Z => "z",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a channel produces its next sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChannelSource {
    /// Flat distribution with no trend concept: uniform in `[low, high)`.
    /// `low == high` yields a constant channel.
    Uniform { low: f64, high: f64 },
    /// Driven by a [`crate::trend::TrendGenerator`].
    Trended,
}

/// A channel together with its generator description.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChannelSpec {
    pub channel: Channel,
    pub source: ChannelSource,
}

impl ChannelSpec {
    pub fn uniform(channel: Channel, low: f64, high: f64) -> Self {
        Self {
            channel,
            source: ChannelSource::Uniform { low, high },
        }
    }

    pub fn trended(channel: Channel) -> Self {
        Self {
            channel,
            source: ChannelSource::Trended,
        }
    }
}

/// Preconfigured channel sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorProfile {
    /// Vibration, moisture and temperature, each uniform in [0.40, 0.45).
    Landslide,
    /// Rotation, trended acceleration and the three spatial axes.
    Motion,
}

/// Qualitative regime controlling a trended channel's sampling range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendState {
    /// Calm conditions.
    #[default]
    Low,
    /// Bad weather hour.
    Average,
    /// Forced escalation; once entered it is never left.
    High,
}

/// Discrete hazard classification of the current window.
///
/// Variant order follows severity, so `Ord` agrees with [`HazardLevel::severity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HazardLevel {
    Normal,
    Risk,
    Danger,
}

impl HazardLevel {
    /// Ordinal severity used by gauges: Normal=1, Risk=2, Danger=3.
    pub fn severity(&self) -> u8 {
        match self {
            HazardLevel::Normal => 1,
            HazardLevel::Risk => 2,
            HazardLevel::Danger => 3,
        }
    }

    /// Display text for the warning banner.
    pub fn label(&self) -> &'static str {
        match self {
            HazardLevel::Normal => "Normal",
            HazardLevel::Risk => "Risk",
            HazardLevel::Danger => "Danger",
        }
    }
}

impl fmt::Display for HazardLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
