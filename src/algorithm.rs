use crate::dataset::Dataset;
use crate::distance::{compute_centroid_shift, nearest_centroid, squared_euclidean};
use crate::error::{KMeansError, Result};
use ndarray::{Array1, Array2, ArrayView2};
use rand::Rng;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Dataset row indices grouped by the centroid they were assigned to.
///
/// Always holds one entry per centroid; an entry may be empty.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ClusterAssignment {
    members: Vec<Vec<usize>>,
}

impl ClusterAssignment {
    /// `k` clusters with no members
    pub fn empty(k: usize) -> Self {
        Self {
            members: vec![Vec::new(); k],
        }
    }

    /// Wrap precomputed row groups. Rows are checked against a dataset only
    /// when the assignment is used with one.
    pub fn from_members(members: Vec<Vec<usize>>) -> Self {
        Self { members }
    }

    /// Fail if any member row is not a row of a dataset with `n_points` points.
    pub fn check_rows(&self, n_points: usize) -> Result<()> {
        match self.members.iter().flatten().find(|&&row| row >= n_points) {
            Some(&row) => Err(KMeansError::RowOutOfRange { row, n_points }),
            None => Ok(()),
        }
    }

    /// Number of clusters
    pub fn k(&self) -> usize {
        self.members.len()
    }

    /// Row indices assigned to cluster `idx`
    pub fn cluster(&self, idx: usize) -> &[usize] {
        &self.members[idx]
    }

    pub fn iter(&self) -> impl Iterator<Item = &[usize]> {
        self.members.iter().map(Vec::as_slice)
    }

    pub fn sizes(&self) -> Vec<usize> {
        self.members.iter().map(Vec::len).collect()
    }

    /// Total number of assigned points
    pub fn n_assigned(&self) -> usize {
        self.members.iter().map(Vec::len).sum()
    }

    /// Cluster label per dataset row, or `None` for rows not assigned.
    pub fn labels(&self, n_points: usize) -> Vec<Option<usize>> {
        let mut labels = vec![None; n_points];
        for (cluster_idx, rows) in self.members.iter().enumerate() {
            for &row in rows {
                if let Some(slot) = labels.get_mut(row) {
                    *slot = Some(cluster_idx);
                }
            }
        }
        labels
    }

    /// Materialize each cluster as the list of its points' coordinates.
    pub fn to_point_lists(&self, dataset: &Dataset) -> Result<Vec<Vec<Vec<f64>>>> {
        self.check_rows(dataset.len())?;
        Ok(self
            .members
            .iter()
            .map(|rows| rows.iter().map(|&row| dataset.point(row).to_vec()).collect())
            .collect())
    }

    pub fn into_members(self) -> Vec<Vec<usize>> {
        self.members
    }
}

/// Outcome of one assignment/update iteration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StepResult {
    /// Centroids recomputed from `clusters`
    pub centroids: Array2<f64>,

    /// Assignment against the centroids passed in, one iteration behind
    /// `centroids`
    pub clusters: ClusterAssignment,

    /// Cluster indices that received no points and were reseeded with a
    /// random dataset point
    pub reseeded: Vec<usize>,
}

impl StepResult {
    /// Centroids and clusters as plain coordinate lists.
    pub fn output(&self, dataset: &Dataset) -> Result<ClusteringOutput> {
        ClusteringOutput::new(dataset, &self.centroids, &self.clusters)
    }
}

/// Centroids as `k` coordinate lists and clusters as `k` lists of points.
///
/// This is the shape a client displays; [`StepResult`] and
/// [`ConvergenceResult`] keep row indices and an ndarray matrix instead.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ClusteringOutput {
    pub centroids: Vec<Vec<f64>>,
    pub clusters: Vec<Vec<Vec<f64>>>,
}

impl ClusteringOutput {
    pub fn new(
        dataset: &Dataset,
        centroids: &Array2<f64>,
        clusters: &ClusterAssignment,
    ) -> Result<Self> {
        Ok(Self {
            centroids: centroids.outer_iter().map(|c| c.to_vec()).collect(),
            clusters: clusters.to_point_lists(dataset)?,
        })
    }
}

/// Why [`run_to_convergence`] stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Termination {
    /// Two consecutive steps produced the same centroids
    Converged,
    /// The iteration limit was reached first
    Capped,
}

/// Result of the k-means algorithm
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ConvergenceResult {
    pub centroids: Array2<f64>,
    pub clusters: ClusterAssignment,
    /// Number of calls to [`step`], including the final confirming step
    pub n_iterations: usize,
    pub termination: Termination,
}

impl ConvergenceResult {
    pub fn converged(&self) -> bool {
        self.termination == Termination::Converged
    }

    /// Centroids and clusters as plain coordinate lists.
    pub fn output(&self, dataset: &Dataset) -> Result<ClusteringOutput> {
        ClusteringOutput::new(dataset, &self.centroids, &self.clusters)
    }
}

/// Check that `centroids` is a non-empty `(k, dataset.dim())` matrix.
fn validate_centroids(dataset: &Dataset, centroids: &ArrayView2<f64>) -> Result<()> {
    if centroids.nrows() == 0 {
        return Err(KMeansError::InvalidK(
            "k must be greater than 0".to_string(),
        ));
    }
    if centroids.ncols() != dataset.dim() {
        return Err(KMeansError::DimensionMismatch(format!(
            "Centroids have {} coordinates, dataset points have {}",
            centroids.ncols(),
            dataset.dim()
        )));
    }
    Ok(())
}

/// Assign every point to its nearest centroid without moving the centroids.
pub fn assign(dataset: &Dataset, centroids: &ArrayView2<f64>) -> Result<ClusterAssignment> {
    validate_centroids(dataset, centroids)?;

    let mut clusters = ClusterAssignment::empty(centroids.nrows());
    for (i, point) in dataset.view().outer_iter().enumerate() {
        let (idx, _) = nearest_centroid(&point, centroids);
        clusters.members[idx].push(i);
    }
    Ok(clusters)
}

/// Run one assignment/update iteration.
///
/// Each point goes to the nearest centroid (lowest index on ties). Each
/// cluster with members moves to the coordinate-wise mean of its points; a
/// cluster with none is reseeded with a point drawn uniformly from the whole
/// dataset, which may coincide with another centroid.
///
/// # Errors
///
/// - [`KMeansError::InvalidK`] if `centroids` has no rows
/// - [`KMeansError::DimensionMismatch`] if `centroids` and `dataset` differ in dimensionality
pub fn step<R: Rng + ?Sized>(
    dataset: &Dataset,
    centroids: &ArrayView2<f64>,
    rng: &mut R,
) -> Result<StepResult> {
    let clusters = assign(dataset, centroids)?;

    let k = centroids.nrows();
    let n_features = dataset.dim();
    let mut new_centroids = Array2::zeros((k, n_features));
    let mut reseeded = Vec::new();

    for (cluster_idx, rows) in clusters.iter().enumerate() {
        if rows.is_empty() {
            let data_idx = rng.gen_range(0..dataset.len());
            new_centroids
                .row_mut(cluster_idx)
                .assign(&dataset.point(data_idx));
            reseeded.push(cluster_idx);
            continue;
        }

        // Sum in dataset order, then divide once
        let mut sum = Array1::<f64>::zeros(n_features);
        for &row in rows {
            sum += &dataset.point(row);
        }
        sum /= rows.len() as f64;
        new_centroids.row_mut(cluster_idx).assign(&sum);
    }

    if !reseeded.is_empty() {
        tracing::warn!(
            clusters = ?reseeded,
            "Reinitialized empty clusters with random points"
        );
    }

    Ok(StepResult {
        centroids: new_centroids,
        clusters,
        reseeded,
    })
}

/// Whether `new` counts as unchanged from `old` under tolerance `tol`.
///
/// A positive `tol` bounds the summed centroid shift; otherwise every
/// coordinate must match exactly.
pub(crate) fn has_converged(old: &ArrayView2<f64>, new: &ArrayView2<f64>, tol: f64) -> bool {
    if tol > 0.0 {
        compute_centroid_shift(old, new) <= tol
    } else {
        old == new
    }
}

/// Iterate [`step`] until the centroids stop changing or `max_iters` steps
/// have run.
///
/// On convergence the returned centroids are the stable ones and the
/// clusters are the assignment against them. When capped, the centroids are
/// those produced by the last step and the clusters are the assignment that
/// produced them. With `max_iters == 0` no step runs and the initial
/// centroids come back with an empty assignment.
///
/// `tol` follows [`KMeansConfig::tol`](crate::KMeansConfig::tol): zero means
/// exact equality.
pub fn run_to_convergence<R: Rng + ?Sized>(
    dataset: &Dataset,
    k: usize,
    initial_centroids: &ArrayView2<f64>,
    max_iters: usize,
    tol: f64,
    rng: &mut R,
) -> Result<ConvergenceResult> {
    if k == 0 {
        return Err(KMeansError::InvalidK(
            "k must be greater than 0".to_string(),
        ));
    }
    if initial_centroids.nrows() != k {
        return Err(KMeansError::InvalidK(format!(
            "Expected {} initial centroids, got {}",
            k,
            initial_centroids.nrows()
        )));
    }
    validate_centroids(dataset, initial_centroids)?;

    let mut centroids = initial_centroids.to_owned();
    let mut clusters = ClusterAssignment::empty(k);
    let mut n_iterations = 0;
    let mut termination = Termination::Capped;

    for iteration in 0..max_iters {
        let result = step(dataset, &centroids.view(), rng)?;
        n_iterations = iteration + 1;
        clusters = result.clusters;

        let shift = compute_centroid_shift(&centroids.view(), &result.centroids.view());
        tracing::debug!(
            iteration = n_iterations,
            max_iters,
            shift,
            reseeded = result.reseeded.len(),
            "k-means iteration"
        );

        if has_converged(&centroids.view(), &result.centroids.view(), tol) {
            termination = Termination::Converged;
            // Under a tolerance keep the newest centroids; with exact
            // equality they are identical anyway
            centroids = result.centroids;
            break;
        }
        centroids = result.centroids;
    }

    match termination {
        Termination::Converged => {
            tracing::info!(iterations = n_iterations, "Converged")
        }
        Termination::Capped => {
            tracing::info!(iterations = n_iterations, max_iters, "Reached iteration limit")
        }
    }

    Ok(ConvergenceResult {
        centroids,
        clusters,
        n_iterations,
        termination,
    })
}

/// Sum of squared distances from each assigned point to its cluster centroid.
pub fn inertia(
    dataset: &Dataset,
    centroids: &ArrayView2<f64>,
    clusters: &ClusterAssignment,
) -> Result<f64> {
    validate_centroids(dataset, centroids)?;
    if clusters.k() != centroids.nrows() {
        return Err(KMeansError::InvalidK(format!(
            "Assignment has {} clusters, centroids have {}",
            clusters.k(),
            centroids.nrows()
        )));
    }
    clusters.check_rows(dataset.len())?;

    let total = clusters
        .iter()
        .zip(centroids.outer_iter())
        .map(|(rows, centroid)| {
            rows.iter()
                .map(|&row| squared_euclidean(&dataset.point(row), &centroid))
                .sum::<f64>()
        })
        .sum();
    Ok(total)
}
