use crate::init::InitMethod;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default iteration cap for [`run_to_convergence`](crate::run_to_convergence).
pub const DEFAULT_MAX_ITERS: usize = 100;

/// Configuration for the batch k-means model
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct KMeansConfig {
    /// Number of clusters
    pub k: usize,

    /// Maximum number of iterations
    pub max_iters: usize,

    /// Convergence tolerance on the summed centroid shift.
    /// Zero (the default) only stops when an iteration leaves every centroid
    /// coordinate exactly unchanged.
    pub tol: f64,

    /// Random seed for centroid initialization and empty-cluster reseeding
    pub seed: u64,

    /// Centroid seeding strategy
    pub init: InitMethod,
}

impl Default for KMeansConfig {
    fn default() -> Self {
        Self {
            k: 8,
            max_iters: DEFAULT_MAX_ITERS,
            tol: 0.0,
            seed: 0,
            init: InitMethod::Random,
        }
    }
}

impl KMeansConfig {
    /// Create a new configuration with the specified number of clusters
    pub fn new(k: usize) -> Self {
        Self {
            k,
            ..Default::default()
        }
    }

    /// Set the maximum number of iterations
    pub fn with_max_iters(mut self, max_iters: usize) -> Self {
        self.max_iters = max_iters;
        self
    }

    /// Set the convergence tolerance
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    /// Set the random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the initialization method
    pub fn with_init(mut self, init: InitMethod) -> Self {
        self.init = init;
        self
    }
}

/// Shape of a uniformly random dataset
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GeneratorConfig {
    /// Number of points to draw
    pub count: usize,

    /// Half-open `[low, high)` sampling range for each dimension
    pub ranges: Vec<(f64, f64)>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            count: 50,
            ranges: vec![(0.0, 100.0), (0.0, 100.0)],
        }
    }
}

impl GeneratorConfig {
    /// Two-dimensional generator over `x_range` × `y_range`
    pub fn planar(count: usize, x_range: (f64, f64), y_range: (f64, f64)) -> Self {
        Self {
            count,
            ranges: vec![x_range, y_range],
        }
    }

    /// Set the number of points
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    /// Replace the per-dimension ranges
    pub fn with_ranges(mut self, ranges: Vec<(f64, f64)>) -> Self {
        self.ranges = ranges;
        self
    }

    /// Dimensionality of generated points
    pub fn dim(&self) -> usize {
        self.ranges.len()
    }
}
