//! K-means partitioning of the joint window.
//!
//! Input is one row per window index and one column per clustered channel.
//! Each call is independent: seeding, relabelling and recentering run from
//! scratch every tick, so label numbering can differ between ticks even when
//! the data barely moved.
//!
//! Algorithm (Lloyd's iteration with k-means++ seeding):
//! 1. Seed k centroids, each new one drawn with probability proportional to
//!    its squared distance from the nearest centroid chosen so far.
//! 2. Assign each row to its nearest centroid (ties go to the lower label).
//! 3. Move each centroid to the mean of its rows. A centroid with no rows
//!    stays where it was.
//! 4. Stop when total squared centroid movement drops to the tolerance or the
//!    iteration cap is reached, then run a final assignment.
//! Steps 1-4 are repeated `n_init` times and the lowest-inertia run wins.
//!
//! Distances use raw channel units. Channels with larger ranges dominate the
//! partition; no normalization is applied.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::ConfigError;

/// Parameters for the cluster engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Number of clusters. Typical: 3.
    pub k: usize,

    /// Iteration cap per restart. Typical: 300.
    pub max_iterations: usize,

    /// Convergence tolerance, relative to the mean per-column variance of
    /// the input. Typical: 1e-4.
    pub tolerance: f64,

    /// Independent seedings; the lowest-inertia result is kept. Typical: 10.
    pub n_init: usize,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            k: 3,
            max_iterations: 300,
            tolerance: 1e-4,
            n_init: 10,
        }
    }
}

impl ClusterConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.k == 0 {
            return Err(ConfigError::ZeroClusterCount);
        }
        if self.max_iterations == 0 {
            return Err(ConfigError::ZeroIterationCap);
        }
        if self.n_init == 0 {
            return Err(ConfigError::ZeroRestarts);
        }
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(ConfigError::InvalidTolerance(self.tolerance));
        }
        Ok(())
    }
}

/// Result of one clustering pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterAssignment {
    /// Label per input row, each in `0..k`.
    pub labels: Vec<usize>,
    /// Centroid per label, in input column order.
    pub centroids: Vec<Vec<f64>>,
    /// Sum of squared distances from rows to their centroid.
    pub inertia: f64,
    /// Lloyd iterations used by the winning restart.
    pub iterations: usize,
    /// Whether the winning restart met the tolerance before the cap.
    pub converged: bool,
}

impl ClusterAssignment {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn k(&self) -> usize {
        self.centroids.len()
    }

    /// Rows per label.
    pub fn sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.k()];
        for &label in &self.labels {
            sizes[label] += 1;
        }
        sizes
    }

    /// Row indices carrying `label`.
    pub fn members(&self, label: usize) -> Vec<usize> {
        self.labels
            .iter()
            .enumerate()
            .filter(|&(_, &l)| l == label)
            .map(|(i, _)| i)
            .collect()
    }
}

/// Stateless k-means engine.
#[derive(Debug, Clone)]
pub struct ClusterEngine {
    config: ClusterConfig,
}

impl ClusterEngine {
    pub fn new(config: ClusterConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ClusterConfig {
        &self.config
    }

    /// Partition `rows` into `k` clusters.
    ///
    /// Rows must share one width. Fewer distinct rows than `k` is fine; the
    /// surplus centroids coincide with existing points.
    pub fn fit<R: Rng>(&self, rows: &[Vec<f64>], rng: &mut R) -> ClusterAssignment {
        let k = self.config.k;
        let width = rows.first().map_or(0, Vec::len);

        if rows.is_empty() {
            return ClusterAssignment {
                labels: Vec::new(),
                centroids: vec![vec![0.0; width]; k],
                inertia: 0.0,
                iterations: 0,
                converged: true,
            };
        }

        let tolerance = self.config.tolerance * mean_column_variance(rows);

        let mut best: Option<ClusterAssignment> = None;
        for restart in 0..self.config.n_init {
            let candidate = self.lloyd(rows, seed_centroids(rows, k, rng), tolerance);
            trace!(restart, inertia = candidate.inertia, iterations = candidate.iterations, "k-means restart");
            if best.as_ref().map_or(true, |b| candidate.inertia < b.inertia) {
                best = Some(candidate);
            }
        }

        // n_init >= 1 is enforced at construction.
        best.unwrap_or_else(|| self.lloyd(rows, seed_centroids(rows, k, rng), tolerance))
    }

    fn lloyd(&self, rows: &[Vec<f64>], mut centroids: Vec<Vec<f64>>, tolerance: f64) -> ClusterAssignment {
        let mut labels = vec![0; rows.len()];
        let mut iterations = 0;
        let mut converged = false;

        for iteration in 1..=self.config.max_iterations {
            assign(rows, &centroids, &mut labels);
            let shift = recenter(rows, &labels, &mut centroids);
            iterations = iteration;
            if shift <= tolerance {
                converged = true;
                break;
            }
        }

        let inertia = assign(rows, &centroids, &mut labels);
        ClusterAssignment {
            labels,
            centroids,
            inertia,
            iterations,
            converged,
        }
    }
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

fn nearest(row: &[f64], centroids: &[Vec<f64>]) -> (usize, f64) {
    let mut best = (0, f64::INFINITY);
    for (label, centroid) in centroids.iter().enumerate() {
        let d = squared_distance(row, centroid);
        if d < best.1 {
            best = (label, d);
        }
    }
    best
}

/// Label every row with its nearest centroid. Returns the inertia.
fn assign(rows: &[Vec<f64>], centroids: &[Vec<f64>], labels: &mut [usize]) -> f64 {
    let mut inertia = 0.0;
    for (row, label) in rows.iter().zip(labels.iter_mut()) {
        let (nearest_label, d) = nearest(row, centroids);
        *label = nearest_label;
        inertia += d;
    }
    inertia
}

/// Move centroids to their members' mean. Returns total squared movement.
fn recenter(rows: &[Vec<f64>], labels: &[usize], centroids: &mut [Vec<f64>]) -> f64 {
    let width = centroids.first().map_or(0, Vec::len);
    let mut sums = vec![vec![0.0; width]; centroids.len()];
    let mut counts = vec![0usize; centroids.len()];

    for (row, &label) in rows.iter().zip(labels) {
        counts[label] += 1;
        for (sum, value) in sums[label].iter_mut().zip(row) {
            *sum += value;
        }
    }

    let mut shift = 0.0;
    for ((centroid, sum), count) in centroids.iter_mut().zip(sums).zip(counts) {
        if count == 0 {
            continue;
        }
        let mean: Vec<f64> = sum.iter().map(|s| s / count as f64).collect();
        shift += squared_distance(centroid, &mean);
        *centroid = mean;
    }
    shift
}

/// k-means++ seeding.
fn seed_centroids<R: Rng>(rows: &[Vec<f64>], k: usize, rng: &mut R) -> Vec<Vec<f64>> {
    let mut centroids = Vec::with_capacity(k);
    centroids.push(rows[rng.gen_range(0..rows.len())].clone());

    let mut distances: Vec<f64> = rows
        .iter()
        .map(|row| squared_distance(row, &centroids[0]))
        .collect();

    while centroids.len() < k {
        let total: f64 = distances.iter().sum();
        let chosen = if total > 0.0 {
            let mut target = rng.gen::<f64>() * total;
            let mut index = rows.len() - 1;
            for (i, &d) in distances.iter().enumerate() {
                if target < d {
                    index = i;
                    break;
                }
                target -= d;
            }
            index
        } else {
            // Every row coincides with a centroid already.
            rng.gen_range(0..rows.len())
        };

        let centroid = rows[chosen].clone();
        for (d, row) in distances.iter_mut().zip(rows) {
            *d = d.min(squared_distance(row, &centroid));
        }
        centroids.push(centroid);
    }
    centroids
}

fn mean_column_variance(rows: &[Vec<f64>]) -> f64 {
    let width = rows.first().map_or(0, Vec::len);
    if width == 0 {
        return 0.0;
    }
    let n = rows.len() as f64;

    let total: f64 = (0..width)
        .map(|col| {
            let mean = rows.iter().map(|r| r[col]).sum::<f64>() / n;
            rows.iter().map(|r| (r[col] - mean).powi(2)).sum::<f64>() / n
        })
        .sum();
    total / width as f64
}
