//! In-memory record of a finite run.
//!
//! The sliding window only remembers the last N ticks. For a bounded run
//! (a simulated 24-hour day is 1440 ticks) the recorder keeps every raw
//! sample so the caller can look back at the whole day, find the peak of a
//! channel, and pull out the ticks surrounding it.
//!
//! Nothing is written anywhere; serializing rows is the caller's business.

use serde::Serialize;

use crate::pipeline::TickReport;
use crate::types::{Channel, HazardLevel};

/// One tick of raw samples, in channel order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordedTick {
    pub tick: u64,
    pub values: Vec<f64>,
    pub level: HazardLevel,
}

/// Ticks around a channel's maximum.
#[derive(Debug, Clone, PartialEq)]
pub struct PeakNeighborhood<'a> {
    pub channel: Channel,
    /// Position of the peak within the recording.
    pub peak_index: usize,
    pub peak_tick: u64,
    pub peak_value: f64,
    /// Recorded ticks in `[peak_index - radius, peak_index + radius)`,
    /// clamped to the recording.
    pub rows: &'a [RecordedTick],
}

#[derive(Debug, Clone, Default)]
pub struct RunRecorder {
    channels: Vec<Channel>,
    rows: Vec<RecordedTick>,
}

impl RunRecorder {
    pub fn new(channels: Vec<Channel>) -> Self {
        Self {
            channels,
            rows: Vec::new(),
        }
    }

    /// Append a report. Channels missing from the report record as NaN.
    pub fn record(&mut self, report: &TickReport) {
        let values = self
            .channels
            .iter()
            .map(|&c| report.sample(c).unwrap_or(f64::NAN))
            .collect();
        self.rows.push(RecordedTick {
            tick: report.tick,
            values,
            level: report.level(),
        });
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    pub fn rows(&self) -> &[RecordedTick] {
        &self.rows
    }

    fn column(&self, channel: Channel) -> Option<usize> {
        self.channels.iter().position(|&c| c == channel)
    }

    /// Full series of one channel.
    pub fn series(&self, channel: Channel) -> Option<Vec<f64>> {
        let col = self.column(channel)?;
        Some(self.rows.iter().map(|r| r.values[col]).collect())
    }

    /// Ticks spent at each hazard level, as (Normal, Risk, Danger).
    pub fn level_counts(&self) -> (usize, usize, usize) {
        self.rows.iter().fold((0, 0, 0), |(n, r, d), row| match row.level {
            HazardLevel::Normal => (n + 1, r, d),
            HazardLevel::Risk => (n, r + 1, d),
            HazardLevel::Danger => (n, r, d + 1),
        })
    }

    /// First occurrence of the channel's maximum and its neighbourhood.
    pub fn peak_neighborhood(&self, channel: Channel, radius: usize) -> Option<PeakNeighborhood<'_>> {
        let col = self.column(channel)?;

        let mut peak: Option<(usize, f64)> = None;
        for (i, row) in self.rows.iter().enumerate() {
            let value = row.values[col];
            if value.is_nan() {
                continue;
            }
            if peak.map_or(true, |(_, best)| value > best) {
                peak = Some((i, value));
            }
        }
        let (peak_index, peak_value) = peak?;

        let start = peak_index.saturating_sub(radius);
        let end = peak_index.saturating_add(radius).min(self.rows.len());
        Some(PeakNeighborhood {
            channel,
            peak_index,
            peak_tick: self.rows[peak_index].tick,
            peak_value,
            rows: &self.rows[start..end],
        })
    }
}
