//! Centroid seeding strategies.

use crate::dataset::Dataset;
use crate::distance::euclidean;
use crate::error::{KMeansError, Result};
use ndarray::{Array1, Array2, ArrayView2, Axis};
use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::SliceRandom;
use rand::Rng;
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How the first k centroids are chosen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum InitMethod {
    /// k distinct dataset points drawn uniformly without replacement
    #[default]
    #[cfg_attr(feature = "serde", serde(rename = "random"))]
    Random,

    /// One random seed point, then repeatedly the point farthest from all
    /// centroids chosen so far
    #[cfg_attr(feature = "serde", serde(rename = "farthest"))]
    Farthest,

    /// One random seed point, then points sampled with probability
    /// proportional to their distance to the nearest chosen centroid.
    ///
    /// The weight is the plain distance, not its square as in the usual
    /// k-means++ formulation.
    #[cfg_attr(feature = "serde", serde(rename = "kmeans++"))]
    KMeansPlusPlus,

    /// Caller-supplied coordinates
    #[cfg_attr(feature = "serde", serde(rename = "manual"))]
    Manual,
}

impl InitMethod {
    pub const ALL: [InitMethod; 4] = [
        InitMethod::Random,
        InitMethod::Farthest,
        InitMethod::KMeansPlusPlus,
        InitMethod::Manual,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InitMethod::Random => "random",
            InitMethod::Farthest => "farthest",
            InitMethod::KMeansPlusPlus => "kmeans++",
            InitMethod::Manual => "manual",
        }
    }
}

impl fmt::Display for InitMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InitMethod {
    type Err = KMeansError;

    fn from_str(s: &str) -> Result<Self> {
        InitMethod::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| KMeansError::UnknownInitMethod(s.to_string()))
    }
}

/// Produce `k` initial centroids for `dataset`.
///
/// `manual` is only consulted for [`InitMethod::Manual`]. The dataset is not
/// modified; every random choice is drawn from `rng`.
///
/// # Errors
///
/// - [`KMeansError::InvalidK`] if `k` is zero
/// - [`KMeansError::InsufficientData`] if `method` draws centroids from the
///   dataset and `k > dataset.len()`
/// - [`KMeansError::DegenerateInitialization`] if kmeans++ runs out of points
///   with non-zero weight
/// - [`KMeansError::ManualCentroidCountMismatch`] if `manual` is missing or
///   does not hold exactly `k` rows
/// - [`KMeansError::DimensionMismatch`] if the manual centroids have a
///   different dimensionality than the dataset
pub fn initialize<R: Rng + ?Sized>(
    dataset: &Dataset,
    k: usize,
    method: InitMethod,
    manual: Option<ArrayView2<'_, f64>>,
    rng: &mut R,
) -> Result<Array2<f64>> {
    if k == 0 {
        return Err(KMeansError::InvalidK(
            "k must be greater than 0".to_string(),
        ));
    }

    if method != InitMethod::Manual && k > dataset.len() {
        return Err(KMeansError::InsufficientData(format!(
            "Number of samples ({}) is less than k ({})",
            dataset.len(),
            k
        )));
    }

    let centroids = match method {
        InitMethod::Random => init_random(dataset, k, rng),
        InitMethod::Farthest => init_farthest(dataset, k, rng),
        InitMethod::KMeansPlusPlus => init_kmeans_plus_plus(dataset, k, rng)?,
        InitMethod::Manual => init_manual(dataset, k, manual)?,
    };

    tracing::debug!(%method, k, n_points = dataset.len(), "Initialized centroids");
    Ok(centroids)
}

/// Randomly select k distinct data points
fn init_random<R: Rng + ?Sized>(dataset: &Dataset, k: usize, rng: &mut R) -> Array2<f64> {
    let indices: Vec<usize> = (0..dataset.len()).collect();
    let selected: Vec<usize> = indices.choose_multiple(rng, k).cloned().collect();

    dataset.view().select(Axis(0), &selected)
}

fn init_farthest<R: Rng + ?Sized>(dataset: &Dataset, k: usize, rng: &mut R) -> Array2<f64> {
    let n_samples = dataset.len();
    let mut selected = Vec::with_capacity(k);
    selected.push(rng.gen_range(0..n_samples));

    let mut min_dists = distances_to(dataset, selected[0]);
    while selected.len() < k {
        // Strict comparison keeps the first point on ties
        let mut best = 0;
        for (i, &d) in min_dists.iter().enumerate() {
            if d > min_dists[best] {
                best = i;
            }
        }
        selected.push(best);
        tighten(&mut min_dists, &distances_to(dataset, best));
    }

    dataset.view().select(Axis(0), &selected)
}

fn init_kmeans_plus_plus<R: Rng + ?Sized>(
    dataset: &Dataset,
    k: usize,
    rng: &mut R,
) -> Result<Array2<f64>> {
    let n_samples = dataset.len();
    let mut selected = Vec::with_capacity(k);
    selected.push(rng.gen_range(0..n_samples));

    let mut min_dists = distances_to(dataset, selected[0]);
    while selected.len() < k {
        let total: f64 = min_dists.sum();
        if total <= 0.0 {
            return Err(KMeansError::DegenerateInitialization(format!(
                "All {} points coincide with the {} centroids chosen so far; cannot pick centroid {} of {}",
                n_samples,
                selected.len(),
                selected.len() + 1,
                k
            )));
        }

        let weights = WeightedIndex::<f64>::new(min_dists.iter())
            .map_err(|e| KMeansError::DegenerateInitialization(e.to_string()))?;
        let next = weights.sample(rng);
        selected.push(next);
        tighten(&mut min_dists, &distances_to(dataset, next));
    }

    Ok(dataset.view().select(Axis(0), &selected))
}

fn init_manual(dataset: &Dataset, k: usize, manual: Option<ArrayView2<'_, f64>>) -> Result<Array2<f64>> {
    let centroids = manual.ok_or(KMeansError::ManualCentroidCountMismatch {
        expected: k,
        found: 0,
    })?;

    if centroids.nrows() != k {
        return Err(KMeansError::ManualCentroidCountMismatch {
            expected: k,
            found: centroids.nrows(),
        });
    }
    if centroids.ncols() != dataset.dim() {
        return Err(KMeansError::DimensionMismatch(format!(
            "Manual centroids have {} coordinates, dataset points have {}",
            centroids.ncols(),
            dataset.dim()
        )));
    }
    if let Some(((point, dim), _)) = centroids.indexed_iter().find(|(_, v)| !v.is_finite()) {
        return Err(KMeansError::NonFiniteCoordinate { point, dim });
    }

    Ok(centroids.to_owned())
}

/// Distance from every dataset point to point `idx`
fn distances_to(dataset: &Dataset, idx: usize) -> Array1<f64> {
    let anchor = dataset.point(idx);
    dataset
        .view()
        .outer_iter()
        .map(|p| euclidean(&p, &anchor))
        .collect()
}

fn tighten(min_dists: &mut Array1<f64>, candidate: &Array1<f64>) {
    min_dists.zip_mut_with(candidate, |m, &c| {
        if c < *m {
            *m = c;
        }
    });
}
