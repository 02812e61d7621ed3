//! Threshold-based hazard classification.
//!
//! The classifier scans the entire window of every monitored channel, not
//! just the newest sample:
//! - Danger if any sample is strictly above `upper`.
//! - Otherwise Risk if any sample is strictly below `lower`.
//! - Otherwise Normal.
//!
//! A stale extreme keeps its level until it is evicted from the window.
//! There is no hysteresis and no memory beyond the window itself. Zero-filled
//! pre-warm slots fall below any positive `lower`, so a fresh window reads
//! as Risk.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, MonitorError, Result};
use crate::types::{Channel, HazardLevel};
use crate::window::WindowSnapshot;

/// Lower and upper bounds of the normal band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HazardThresholds {
    /// Samples below this raise Risk. Typical: 0.40.
    pub lower: f64,
    /// Samples above this raise Danger. Typical: 0.45.
    pub upper: f64,
}

impl Default for HazardThresholds {
    fn default() -> Self {
        Self {
            lower: 0.40,
            upper: 0.45,
        }
    }
}

impl HazardThresholds {
    pub fn new(lower: f64, upper: f64) -> std::result::Result<Self, ConfigError> {
        let thresholds = Self { lower, upper };
        thresholds.validate()?;
        Ok(thresholds)
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if !self.lower.is_finite() || !self.upper.is_finite() || self.lower >= self.upper {
            return Err(ConfigError::InvalidThresholds {
                lower: self.lower,
                upper: self.upper,
            });
        }
        Ok(())
    }
}

/// The sample that decided a non-Normal level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HazardFinding {
    pub channel: Channel,
    /// Window index, 0 oldest.
    pub index: usize,
    pub value: f64,
}

/// Level plus the first sample responsible for it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HazardAssessment {
    pub level: HazardLevel,
    /// `None` when the level is Normal.
    pub finding: Option<HazardFinding>,
}

impl HazardAssessment {
    pub fn severity(&self) -> u8 {
        self.level.severity()
    }
}

/// Maps a window snapshot to a [`HazardLevel`].
#[derive(Debug, Clone)]
pub struct HazardClassifier {
    thresholds: HazardThresholds,
    monitored: Vec<Channel>,
}

impl HazardClassifier {
    pub fn new(
        thresholds: HazardThresholds,
        monitored: Vec<Channel>,
    ) -> std::result::Result<Self, ConfigError> {
        thresholds.validate()?;
        if monitored.is_empty() {
            return Err(ConfigError::NoMonitoredChannels);
        }
        Ok(Self {
            thresholds,
            monitored,
        })
    }

    pub fn thresholds(&self) -> HazardThresholds {
        self.thresholds
    }

    pub fn monitored(&self) -> &[Channel] {
        &self.monitored
    }

    /// Classify the snapshot. Danger is decided over all monitored channels
    /// before Risk is considered.
    pub fn assess(&self, snapshot: &WindowSnapshot) -> Result<HazardAssessment> {
        let series = self
            .monitored
            .iter()
            .map(|&c| snapshot.get(c).map(|v| (c, v)).ok_or(MonitorError::UnknownChannel(c)))
            .collect::<Result<Vec<_>>>()?;

        let upper = self.thresholds.upper;
        if let Some(finding) = first_match(&series, |v| v > upper) {
            return Ok(HazardAssessment {
                level: HazardLevel::Danger,
                finding: Some(finding),
            });
        }

        let lower = self.thresholds.lower;
        if let Some(finding) = first_match(&series, |v| v < lower) {
            return Ok(HazardAssessment {
                level: HazardLevel::Risk,
                finding: Some(finding),
            });
        }

        Ok(HazardAssessment {
            level: HazardLevel::Normal,
            finding: None,
        })
    }

    pub fn classify(&self, snapshot: &WindowSnapshot) -> Result<HazardLevel> {
        Ok(self.assess(snapshot)?.level)
    }
}

fn first_match(series: &[(Channel, &[f64])], predicate: impl Fn(f64) -> bool) -> Option<HazardFinding> {
    series.iter().find_map(|&(channel, values)| {
        values
            .iter()
            .position(|&v| predicate(v))
            .map(|index| HazardFinding {
                channel,
                index,
                value: values[index],
            })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::{ChannelSeries, SlidingWindowBuffer};

    const CHANNELS: [Channel; 3] = [Channel::Vibration, Channel::Moisture, Channel::Temperature];

    fn classifier() -> HazardClassifier {
        HazardClassifier::new(HazardThresholds::default(), CHANNELS.to_vec()).unwrap()
    }

    fn snapshot(vibration: Vec<f64>, moisture: Vec<f64>, temperature: Vec<f64>) -> WindowSnapshot {
        WindowSnapshot::from_series(vec![
            ChannelSeries { channel: Channel::Vibration, values: vibration },
            ChannelSeries { channel: Channel::Moisture, values: moisture },
            ChannelSeries { channel: Channel::Temperature, values: temperature },
        ])
        .unwrap()
    }

    #[test]
    fn test_all_zero_is_risk() {
        let buffer = SlidingWindowBuffer::new(&CHANNELS, 100).unwrap();
        let assessment = classifier().assess(&buffer.snapshot()).unwrap();

        assert_eq!(assessment.level, HazardLevel::Risk);
        assert_eq!(assessment.severity(), 2);
        let finding = assessment.finding.unwrap();
        assert_eq!(finding.channel, Channel::Vibration);
        assert_eq!(finding.index, 0);
    }

    #[test]
    fn test_in_band_is_normal() {
        let snap = snapshot(vec![0.40, 0.42], vec![0.45, 0.43], vec![0.44, 0.41]);
        let assessment = classifier().assess(&snap).unwrap();
        assert_eq!(assessment.level, HazardLevel::Normal);
        assert_eq!(assessment.severity(), 1);
        assert!(assessment.finding.is_none());
    }

    #[test]
    fn test_boundaries_are_strict() {
        // Exactly on either threshold stays Normal.
        let snap = snapshot(vec![0.40; 3], vec![0.45; 3], vec![0.42; 3]);
        assert_eq!(classifier().classify(&snap).unwrap(), HazardLevel::Normal);
    }

    #[test]
    fn test_danger_precedes_risk() {
        let snap = snapshot(vec![0.10, 0.42], vec![0.42, 0.42], vec![0.42, 0.46]);
        let assessment = classifier().assess(&snap).unwrap();

        assert_eq!(assessment.level, HazardLevel::Danger);
        assert_eq!(assessment.severity(), 3);
        assert_eq!(
            assessment.finding,
            Some(HazardFinding { channel: Channel::Temperature, index: 1, value: 0.46 })
        );
    }

    #[test]
    fn test_stale_extreme_persists_until_evicted() {
        let mut buffer = SlidingWindowBuffer::new(&CHANNELS, 3).unwrap();
        let classifier = classifier();

        let tick = |v: f64| [(Channel::Vibration, v), (Channel::Moisture, 0.42), (Channel::Temperature, 0.42)];
        buffer.push_tick(&tick(0.42)).unwrap();
        buffer.push_tick(&tick(0.42)).unwrap();
        buffer.push_tick(&tick(0.50)).unwrap();
        assert_eq!(classifier.classify(&buffer.snapshot()).unwrap(), HazardLevel::Danger);

        buffer.push_tick(&tick(0.42)).unwrap();
        buffer.push_tick(&tick(0.42)).unwrap();
        assert_eq!(classifier.classify(&buffer.snapshot()).unwrap(), HazardLevel::Danger);

        buffer.push_tick(&tick(0.42)).unwrap();
        assert_eq!(classifier.classify(&buffer.snapshot()).unwrap(), HazardLevel::Normal);
    }

    #[test]
    fn test_unmonitored_channels_ignored() {
        let classifier =
            HazardClassifier::new(HazardThresholds::default(), vec![Channel::Vibration]).unwrap();
        let snap = snapshot(vec![0.42; 2], vec![0.99; 2], vec![0.0; 2]);
        assert_eq!(classifier.classify(&snap).unwrap(), HazardLevel::Normal);
    }

    #[test]
    fn test_missing_channel_is_error() {
        let classifier = HazardClassifier::new(HazardThresholds::default(), vec![Channel::Z]).unwrap();
        let snap = snapshot(vec![0.42], vec![0.42], vec![0.42]);
        assert!(matches!(
            classifier.classify(&snap),
            Err(MonitorError::UnknownChannel(Channel::Z))
        ));
    }

    #[test]
    fn test_invalid_thresholds() {
        assert!(HazardThresholds::new(0.45, 0.40).is_err());
        assert!(HazardThresholds::new(0.40, 0.40).is_err());
        assert!(HazardThresholds::new(f64::NAN, 0.40).is_err());
        assert!(HazardThresholds::new(0.0, 10.0).is_ok());
    }

    #[test]
    fn test_empty_monitored_set_rejected() {
        assert_eq!(
            HazardClassifier::new(HazardThresholds::default(), vec![]).unwrap_err(),
            ConfigError::NoMonitoredChannels
        );
    }
}
