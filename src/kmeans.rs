use crate::algorithm::{assign, run_to_convergence, ClusterAssignment, ConvergenceResult, Termination};
use crate::config::KMeansConfig;
use crate::dataset::Dataset;
use crate::error::{KMeansError, Result};
use crate::init::{initialize, InitMethod};
use ndarray::{Array2, ArrayView2};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Batch k-means: seed the centroids, then iterate to convergence in one call.
///
/// For step-by-step clustering use a [`Session`](crate::Session) instead.
///
/// # Example
///
/// ```
/// use stepkmeans::{Dataset, InitMethod, KMeans, KMeansConfig};
///
/// let dataset = Dataset::from_points(&[
///     vec![0.0, 0.0],
///     vec![0.0, 1.0],
///     vec![10.0, 0.0],
///     vec![10.0, 1.0],
/// ])
/// .unwrap();
///
/// let config = KMeansConfig::new(2)
///     .with_init(InitMethod::Farthest)
///     .with_seed(42);
/// let mut kmeans = KMeans::with_config(config);
/// kmeans.fit(&dataset).unwrap();
///
/// let labels = kmeans.predict(&dataset).unwrap();
/// assert_eq!(labels[0], labels[1]);
/// assert_ne!(labels[0], labels[2]);
/// ```
pub struct KMeans {
    /// Model configuration
    config: KMeansConfig,

    /// Number of features (dimensions), 0 until the first fit
    d: usize,

    /// Last fit result (None if not yet fitted)
    fitted: Option<ConvergenceResult>,
}

impl KMeans {
    /// Create a new KMeans instance with default configuration.
    ///
    /// # Panics
    ///
    /// Panics if `k` is 0.
    pub fn new(k: usize) -> Self {
        Self::with_config(KMeansConfig::new(k))
    }

    /// Create a new KMeans instance with custom configuration.
    ///
    /// # Panics
    ///
    /// Panics if `config.k` is 0.
    pub fn with_config(config: KMeansConfig) -> Self {
        assert!(config.k > 0, "k must be greater than 0");

        Self {
            config,
            d: 0,
            fitted: None,
        }
    }

    /// Seed centroids with `config.init` and iterate to convergence.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `config.init` is [`InitMethod::Manual`] (use [`fit_from`](Self::fit_from))
    /// - Seeding fails (see [`initialize`])
    /// - Data dimensions don't match an earlier fit
    pub fn fit(&mut self, dataset: &Dataset) -> Result<&mut Self> {
        self.check_dim(dataset.dim())?;

        if self.config.init == InitMethod::Manual {
            return Err(KMeansError::ManualCentroidCountMismatch {
                expected: self.config.k,
                found: 0,
            });
        }

        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        let initial = initialize(dataset, self.config.k, self.config.init, None, &mut rng)?;
        self.run(dataset, &initial.view(), &mut rng)
    }

    /// Iterate to convergence from caller-supplied initial centroids.
    pub fn fit_from(
        &mut self,
        dataset: &Dataset,
        initial_centroids: &ArrayView2<f64>,
    ) -> Result<&mut Self> {
        self.check_dim(dataset.dim())?;

        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        let initial = initialize(
            dataset,
            self.config.k,
            InitMethod::Manual,
            Some(initial_centroids.view()),
            &mut rng,
        )?;
        self.run(dataset, &initial.view(), &mut rng)
    }

    fn run(
        &mut self,
        dataset: &Dataset,
        initial: &ArrayView2<f64>,
        rng: &mut ChaCha8Rng,
    ) -> Result<&mut Self> {
        let result = run_to_convergence(
            dataset,
            self.config.k,
            initial,
            self.config.max_iters,
            self.config.tol,
            rng,
        )?;

        self.d = dataset.dim();
        self.fitted = Some(result);
        Ok(self)
    }

    fn check_dim(&self, n_features: usize) -> Result<()> {
        if self.d != 0 && n_features != self.d {
            return Err(KMeansError::DimensionMismatch(format!(
                "Expected {} features, got {}",
                self.d, n_features
            )));
        }
        Ok(())
    }

    /// Label each point with the index of its nearest fitted centroid.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The model has not been fitted yet
    /// - Data dimensions don't match the training data
    pub fn predict(&self, dataset: &Dataset) -> Result<Vec<usize>> {
        let fitted = self.fitted.as_ref().ok_or(KMeansError::NotFitted)?;
        self.check_dim(dataset.dim())?;

        let clusters = assign(dataset, &fitted.centroids.view())?;
        // assign() places every row, so no label is missing
        Ok(clusters
            .labels(dataset.len())
            .into_iter()
            .map(|label| label.unwrap_or_default())
            .collect())
    }

    /// Fit the model and predict cluster assignments in one call.
    pub fn fit_predict(&mut self, dataset: &Dataset) -> Result<Vec<usize>> {
        self.fit(dataset)?;
        self.predict(dataset)
    }

    /// Get the centroids of the fitted model.
    pub fn centroids(&self) -> Option<&Array2<f64>> {
        self.fitted.as_ref().map(|r| &r.centroids)
    }

    /// Cluster membership from the last fit
    pub fn clusters(&self) -> Option<&ClusterAssignment> {
        self.fitted.as_ref().map(|r| &r.clusters)
    }

    pub fn n_iterations(&self) -> Option<usize> {
        self.fitted.as_ref().map(|r| r.n_iterations)
    }

    pub fn termination(&self) -> Option<Termination> {
        self.fitted.as_ref().map(|r| r.termination)
    }

    /// Get the number of clusters.
    pub fn k(&self) -> usize {
        self.config.k
    }

    /// Get the number of features (dimensions).
    pub fn d(&self) -> usize {
        self.d
    }

    /// Get the configuration.
    pub fn config(&self) -> &KMeansConfig {
        &self.config
    }
}
