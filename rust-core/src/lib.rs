//! Landslide Sensing Engine Library
//!
//! A rolling-window stream state machine for simulated environmental
//! sensors. Each tick it generates one sample per channel, slides the
//! per-channel windows, clusters the joint window with k-means and maps the
//! window to a discrete hazard level.
//!
//! # Design Philosophy
//!
//! - **Explicit owned state**: all simulation state lives in one
//!   [`MonitorPipeline`] value passed to each tick. No globals, no timers.
//! - **Whole-window decisions**: hazard levels and clusters are recomputed
//!   from the current window every tick, never incrementally.
//! - **Pre-warm is data**: windows start zero-filled and are valid input
//!   from the first tick.
//! - **Reproducible**: a fixed seed reproduces a run value for value.
//!
//! Rendering, tick cadence and export belong to the caller.
//!
//! # Example
//!
//! ```ignore
//! use landslide_sensing::{MonitorPipeline, PipelineConfig};
//!
//! let mut pipeline = MonitorPipeline::new(PipelineConfig::default().with_seed(7))?;
//! for tick in 0..200 {
//!     let report = pipeline.step(tick)?;
//!     println!("{} -> {} (severity {})", tick, report.level(), report.severity);
//! }
//! ```

pub mod cluster;
pub mod error;
pub mod hazard;
pub mod pipeline;
pub mod recorder;
pub mod trend;
pub mod types;
pub mod window;

#[cfg(test)]
mod stress_tests;

// Re-export commonly used types
pub use cluster::{ClusterAssignment, ClusterConfig, ClusterEngine};
pub use error::{ConfigError, MonitorError};
pub use hazard::{HazardAssessment, HazardClassifier, HazardFinding, HazardThresholds};
pub use pipeline::{MonitorPipeline, PipelineConfig, TickReport};
pub use recorder::{PeakNeighborhood, RecordedTick, RunRecorder};
pub use trend::{SampleRange, SampleSource, TrendConfig, TrendGenerator};
pub use types::{Channel, ChannelSource, ChannelSpec, HazardLevel, SensorProfile, TrendState};
pub use window::{ChannelSeries, SlidingWindowBuffer, WindowSnapshot};
