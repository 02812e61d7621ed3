//! Regime-switching signal generation.
//!
//! Each simulated channel produces one sample per tick. Flat channels draw
//! from a fixed uniform range. Trended channels (acceleration) carry a
//! persistent [`TrendState`] that is re-rolled at every hour boundary and
//! latched to High at the escalation tick:
//!
//! - Every `regime_period` ticks, draw u ~ U[0,1). u < `switch_probability`
//!   selects Average, otherwise Low. This happens before the tick's sample.
//! - From `escalation_tick` on (when `escalation_enabled`), the state is High and stays High. Later hour
//!   boundaries still consume their draw but cannot change the state.
//! - The sample is drawn from the range belonging to the current state.
//!
//! Generators never see the window or any downstream consumer.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;
use crate::types::{Channel, ChannelSource, ChannelSpec, TrendState};

/// Half-open sampling range `[low, high)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleRange {
    pub low: f64,
    pub high: f64,
}

impl SampleRange {
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    fn validate(&self, channel: Channel) -> Result<(), ConfigError> {
        if !self.low.is_finite() || !self.high.is_finite() || self.low > self.high {
            return Err(ConfigError::InvalidRange {
                channel,
                low: self.low,
                high: self.high,
            });
        }
        Ok(())
    }

    /// Draw one value. A degenerate range returns `low`.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> f64 {
        if self.high > self.low {
            rng.gen_range(self.low..self.high)
        } else {
            self.low
        }
    }
}

/// Parameters for trended channels.
///
/// Defaults model one simulated day at one tick per minute: hourly weather
/// re-rolls with a 20% chance of a bad hour and a forced high-acceleration
/// event at the 20-hour mark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendConfig {
    /// Ticks between regime re-rolls. Typical: 60 (one hour of minutes).
    pub regime_period: u64,

    /// Probability that a re-roll selects Average instead of Low.
    /// Range: [0.0, 1.0]. Typical: 0.2.
    pub switch_probability: f64,

    /// Whether the forced High escalation fires at all.
    pub escalation_enabled: bool,

    /// Tick at which the state is forced to High for the rest of the run.
    /// Typical: 1200 (20 hours).
    pub escalation_tick: u64,

    /// Sampling range while Low.
    pub low_range: SampleRange,

    /// Sampling range while Average.
    pub average_range: SampleRange,

    /// Sampling range while High.
    pub high_range: SampleRange,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            regime_period: 60,
            switch_probability: 0.2,
            escalation_enabled: true,
            escalation_tick: 1200,
            low_range: SampleRange::new(0.0, 2.0),
            average_range: SampleRange::new(2.0, 10.0),
            high_range: SampleRange::new(10.0, 20.0),
        }
    }
}

impl TrendConfig {
    pub fn validate(&self, channel: Channel) -> Result<(), ConfigError> {
        if self.regime_period == 0 {
            return Err(ConfigError::ZeroRegimePeriod);
        }
        if !(0.0..=1.0).contains(&self.switch_probability) {
            return Err(ConfigError::InvalidSwitchProbability(self.switch_probability));
        }
        self.low_range.validate(channel)?;
        self.average_range.validate(channel)?;
        self.high_range.validate(channel)?;
        Ok(())
    }

    fn range_for(&self, state: TrendState) -> SampleRange {
        match state {
            TrendState::Low => self.low_range,
            TrendState::Average => self.average_range,
            TrendState::High => self.high_range,
        }
    }
}

/// Persistent trend state for one trended channel.
#[derive(Debug, Clone)]
pub struct TrendGenerator {
    channel: Channel,
    config: TrendConfig,
    state: TrendState,
    escalated: bool,
}

impl TrendGenerator {
    /// Create a generator starting in [`TrendState::Low`].
    pub fn new(channel: Channel, config: TrendConfig) -> Result<Self, ConfigError> {
        config.validate(channel)?;
        Ok(Self {
            channel,
            config,
            state: TrendState::Low,
            escalated: false,
        })
    }

    pub fn state(&self) -> TrendState {
        self.state
    }

    /// True once the escalation latch has fired.
    pub fn is_escalated(&self) -> bool {
        self.escalated
    }

    /// Apply the regime rules for `tick` without sampling.
    pub fn update_regime<R: Rng>(&mut self, tick: u64, rng: &mut R) {
        if tick % self.config.regime_period == 0 {
            let draw: f64 = rng.gen();
            if !self.escalated {
                let next = if draw < self.config.switch_probability {
                    TrendState::Average
                } else {
                    TrendState::Low
                };
                if next != self.state {
                    debug!(channel = %self.channel, tick, from = ?self.state, to = ?next, "regime switch");
                }
                self.state = next;
            }
        }

        if self.config.escalation_enabled && !self.escalated && tick >= self.config.escalation_tick {
            debug!(channel = %self.channel, tick, "trend escalated to high");
            self.escalated = true;
            self.state = TrendState::High;
        }
    }

    /// Draw a sample from the range of the current state.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> f64 {
        self.config.range_for(self.state).sample(rng)
    }

    /// Update the regime for `tick`, then sample.
    pub fn next_sample<R: Rng>(&mut self, tick: u64, rng: &mut R) -> f64 {
        self.update_regime(tick, rng);
        self.sample(rng)
    }
}

/// Per-channel sample source built from a [`ChannelSpec`].
#[derive(Debug, Clone)]
pub enum SampleSource {
    Uniform(SampleRange),
    Trended(TrendGenerator),
}

impl SampleSource {
    pub fn from_spec(spec: &ChannelSpec, trend: &TrendConfig) -> Result<Self, ConfigError> {
        match spec.source {
            ChannelSource::Uniform { low, high } => {
                let range = SampleRange::new(low, high);
                range.validate(spec.channel)?;
                Ok(SampleSource::Uniform(range))
            }
            ChannelSource::Trended => Ok(SampleSource::Trended(TrendGenerator::new(
                spec.channel,
                trend.clone(),
            )?)),
        }
    }

    /// Produce the sample for `tick`.
    pub fn next_sample<R: Rng>(&mut self, tick: u64, rng: &mut R) -> f64 {
        match self {
            SampleSource::Uniform(range) => range.sample(rng),
            SampleSource::Trended(generator) => generator.next_sample(tick, rng),
        }
    }

    /// Current trend state, if this source has one.
    pub fn trend_state(&self) -> Option<TrendState> {
        match self {
            SampleSource::Uniform(_) => None,
            SampleSource::Trended(generator) => Some(generator.state()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn generator() -> TrendGenerator {
        TrendGenerator::new(Channel::Acceleration, TrendConfig::default()).unwrap()
    }

    #[test]
    fn test_trend_config_default() {
        let config = TrendConfig::default();
        assert_eq!(config.regime_period, 60);
        assert!(config.escalation_enabled);
        assert_eq!(config.escalation_tick, 1200);
        assert!(config.validate(Channel::Acceleration).is_ok());
    }

    #[test]
    fn test_generator_starts_low() {
        let generator = generator();
        assert_eq!(generator.state(), TrendState::Low);
        assert!(!generator.is_escalated());
    }

    #[test]
    fn test_samples_stay_in_state_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut generator = generator();

        for tick in 0..1440 {
            let value = generator.next_sample(tick, &mut rng);
            let range = generator.config.range_for(generator.state());
            assert!(value >= range.low && value < range.high, "tick {tick}: {value}");
        }
    }

    #[test]
    fn test_escalation_latches_high() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut generator = generator();

        for tick in 0..3000 {
            generator.next_sample(tick, &mut rng);
            if tick >= 1200 {
                assert_eq!(generator.state(), TrendState::High, "tick {tick}");
                assert!(generator.is_escalated());
            } else {
                assert_ne!(generator.state(), TrendState::High, "tick {tick}");
            }
        }
    }

    #[test]
    fn test_escalation_applies_to_skipped_ticks() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut generator = generator();

        generator.next_sample(1500, &mut rng);
        assert_eq!(generator.state(), TrendState::High);
    }

    #[test]
    fn test_certain_switch_selects_average() {
        let config = TrendConfig {
            switch_probability: 1.0,
            escalation_enabled: false,
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(5);
        let mut generator = TrendGenerator::new(Channel::Acceleration, config).unwrap();

        generator.update_regime(0, &mut rng);
        assert_eq!(generator.state(), TrendState::Average);
        let value = generator.sample(&mut rng);
        assert!((2.0..10.0).contains(&value));
    }

    #[test]
    fn test_regime_only_rerolls_on_boundaries() {
        let config = TrendConfig {
            switch_probability: 1.0,
            escalation_enabled: false,
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(5);
        let mut generator = TrendGenerator::new(Channel::Acceleration, config).unwrap();

        // Tick 1 is not a boundary, so the initial Low survives.
        generator.update_regime(1, &mut rng);
        assert_eq!(generator.state(), TrendState::Low);
        generator.update_regime(60, &mut rng);
        assert_eq!(generator.state(), TrendState::Average);
    }

    #[test]
    fn test_seeded_sequences_are_reproducible() {
        let run = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut generator = generator();
            (0..60).map(|t| generator.next_sample(t, &mut rng)).collect::<Vec<_>>()
        };
        assert_eq!(run(42), run(42));
        assert_ne!(run(42), run(43));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let zero_period = TrendConfig {
            regime_period: 0,
            ..Default::default()
        };
        assert_eq!(
            TrendGenerator::new(Channel::Acceleration, zero_period).unwrap_err(),
            ConfigError::ZeroRegimePeriod
        );

        let bad_probability = TrendConfig {
            switch_probability: 1.5,
            ..Default::default()
        };
        assert!(TrendGenerator::new(Channel::Acceleration, bad_probability).is_err());

        let inverted = TrendConfig {
            high_range: SampleRange::new(20.0, 10.0),
            ..Default::default()
        };
        assert!(matches!(
            TrendGenerator::new(Channel::Acceleration, inverted),
            Err(ConfigError::InvalidRange { .. })
        ));
    }

    #[test]
    fn test_uniform_source_ignores_ticks() {
        let spec = ChannelSpec::uniform(Channel::X, 0.0, 1.0);
        let mut source = SampleSource::from_spec(&spec, &TrendConfig::default()).unwrap();
        let mut rng = StdRng::seed_from_u64(9);

        assert_eq!(source.trend_state(), None);
        for tick in [0, 60, 1200, 5000] {
            let value = source.next_sample(tick, &mut rng);
            assert!((0.0..1.0).contains(&value));
        }
    }

    #[test]
    fn test_constant_range() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(SampleRange::new(0.42, 0.42).sample(&mut rng), 0.42);
    }
}
