//! Fixed-capacity sliding windows, one per channel.
//!
//! Each channel owns a ring of exactly `capacity` samples. The ring starts
//! zero-filled, so every snapshot has length `capacity` from the first tick
//! on; zero is the pre-warm sentinel and downstream consumers treat it as
//! ordinary data.
//!
//! A push overwrites the oldest slot and advances the head, which is the same
//! as dropping index 0 of the ordered view and appending at the end. O(1) per
//! push, no allocation after construction.

use serde::Serialize;

use crate::error::{ConfigError, MonitorError, Result};
use crate::types::Channel;

/// Ring buffer for a single channel. Always full.
#[derive(Debug, Clone)]
struct ChannelRing {
    channel: Channel,
    samples: Vec<f64>,
    /// Slot holding the oldest sample; the next push lands here.
    head: usize,
}

impl ChannelRing {
    fn new(channel: Channel, capacity: usize) -> Self {
        Self {
            channel,
            samples: vec![0.0; capacity],
            head: 0,
        }
    }

    fn push(&mut self, value: f64) {
        self.samples[self.head] = value;
        self.head = (self.head + 1) % self.samples.len();
    }

    /// Oldest-first iteration.
    fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        let (newer, older) = self.samples.split_at(self.head);
        older.iter().chain(newer.iter()).copied()
    }

    fn newest(&self) -> f64 {
        let len = self.samples.len();
        self.samples[(self.head + len - 1) % len]
    }
}

/// Co-indexed sliding windows for a fixed set of channels.
#[derive(Debug, Clone)]
pub struct SlidingWindowBuffer {
    rings: Vec<ChannelRing>,
    capacity: usize,
    ticks_pushed: u64,
}

impl SlidingWindowBuffer {
    /// Create zero-filled windows of `capacity` samples for each channel.
    pub fn new(channels: &[Channel], capacity: usize) -> std::result::Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::ZeroWindowSize);
        }
        if channels.is_empty() {
            return Err(ConfigError::NoChannels);
        }
        for (i, channel) in channels.iter().enumerate() {
            if channels[..i].contains(channel) {
                return Err(ConfigError::DuplicateChannel(*channel));
            }
        }

        Ok(Self {
            rings: channels.iter().map(|&c| ChannelRing::new(c, capacity)).collect(),
            capacity,
            ticks_pushed: 0,
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn channels(&self) -> impl Iterator<Item = Channel> + '_ {
        self.rings.iter().map(|r| r.channel)
    }

    fn ring_mut(&mut self, channel: Channel) -> Result<&mut ChannelRing> {
        self.rings
            .iter_mut()
            .find(|r| r.channel == channel)
            .ok_or(MonitorError::UnknownChannel(channel))
    }

    fn ring(&self, channel: Channel) -> Result<&ChannelRing> {
        self.rings
            .iter()
            .find(|r| r.channel == channel)
            .ok_or(MonitorError::UnknownChannel(channel))
    }

    /// Evict the oldest sample of `channel` and append `value`.
    ///
    /// Pushing a single channel breaks co-indexing until the other channels
    /// catch up; tick drivers should prefer [`Self::push_tick`].
    pub fn push(&mut self, channel: Channel, value: f64) -> Result<()> {
        self.ring_mut(channel)?.push(value);
        Ok(())
    }

    /// Push one sample for every channel as a single step.
    ///
    /// The tick is validated in full before any ring is touched, so a
    /// rejected tick leaves the windows unchanged.
    pub fn push_tick(&mut self, samples: &[(Channel, f64)]) -> Result<()> {
        if samples.len() != self.rings.len() {
            return Err(MonitorError::IncompleteTick {
                expected: self.rings.len(),
                got: samples.len(),
            });
        }
        for ring in &self.rings {
            if !samples.iter().any(|(c, _)| *c == ring.channel) {
                return Err(MonitorError::UnknownChannel(ring.channel));
            }
        }

        for &(channel, value) in samples {
            self.ring_mut(channel)?.push(value);
        }
        self.ticks_pushed += 1;
        Ok(())
    }

    /// Number of complete ticks pushed through [`Self::push_tick`].
    pub fn ticks_pushed(&self) -> u64 {
        self.ticks_pushed
    }

    /// True once every pre-warm zero has been evicted.
    pub fn is_warm(&self) -> bool {
        self.ticks_pushed >= self.capacity as u64
    }

    /// Most recent sample of `channel`.
    pub fn latest(&self, channel: Channel) -> Result<f64> {
        Ok(self.ring(channel)?.newest())
    }

    /// Ordered contents of one channel, oldest first.
    pub fn values(&self, channel: Channel) -> Result<Vec<f64>> {
        Ok(self.ring(channel)?.iter().collect())
    }

    /// Read-only copy of every channel's window.
    pub fn snapshot(&self) -> WindowSnapshot {
        WindowSnapshot {
            capacity: self.capacity,
            series: self
                .rings
                .iter()
                .map(|r| ChannelSeries {
                    channel: r.channel,
                    values: r.iter().collect(),
                })
                .collect(),
        }
    }
}

/// Ordered samples of one channel, index 0 oldest.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelSeries {
    pub channel: Channel,
    pub values: Vec<f64>,
}

/// Point-in-time view of all windows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowSnapshot {
    pub capacity: usize,
    pub series: Vec<ChannelSeries>,
}

impl WindowSnapshot {
    /// Build a snapshot directly from per-channel values.
    ///
    /// All series must share one length; that length becomes the capacity.
    pub fn from_series(series: Vec<ChannelSeries>) -> std::result::Result<Self, ConfigError> {
        let capacity = series.first().map(|s| s.values.len()).ok_or(ConfigError::NoChannels)?;
        if capacity == 0 {
            return Err(ConfigError::ZeroWindowSize);
        }
        if let Some(short) = series.iter().find(|s| s.values.len() != capacity) {
            return Err(ConfigError::RaggedSeries {
                channel: short.channel,
                expected: capacity,
                got: short.values.len(),
            });
        }
        Ok(Self { capacity, series })
    }

    pub fn get(&self, channel: Channel) -> Option<&[f64]> {
        self.series
            .iter()
            .find(|s| s.channel == channel)
            .map(|s| s.values.as_slice())
    }

    /// Joint matrix over `channels`: one row per window index, one column
    /// per channel in the order given.
    pub fn rows(&self, channels: &[Channel]) -> Result<Vec<Vec<f64>>> {
        let columns = channels
            .iter()
            .map(|&c| self.get(c).ok_or(MonitorError::UnknownChannel(c)))
            .collect::<Result<Vec<_>>>()?;

        Ok((0..self.capacity)
            .map(|i| columns.iter().map(|col| col[i]).collect())
            .collect())
    }
}
