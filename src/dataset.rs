use crate::config::GeneratorConfig;
use crate::error::{KMeansError, Result};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand::Rng;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A non-empty set of points sharing one dimensionality.
///
/// Stored row-major as an `(n_points, dim)` matrix. Every coordinate is
/// finite, so distances and means computed from a `Dataset` are finite too.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "Vec<Vec<f64>>", into = "Vec<Vec<f64>>")
)]
pub struct Dataset {
    points: Array2<f64>,
}

impl Dataset {
    /// Wrap an `(n_points, dim)` matrix.
    ///
    /// # Errors
    ///
    /// - [`KMeansError::EmptyDataset`] if there are no rows or no columns
    /// - [`KMeansError::NonFiniteCoordinate`] if any entry is NaN or infinite
    pub fn new(points: Array2<f64>) -> Result<Self> {
        if points.nrows() == 0 || points.ncols() == 0 {
            return Err(KMeansError::EmptyDataset);
        }
        if let Some(((point, dim), _)) = points.indexed_iter().find(|(_, v)| !v.is_finite()) {
            return Err(KMeansError::NonFiniteCoordinate { point, dim });
        }
        Ok(Self { points })
    }

    /// Build a dataset from a list of coordinate vectors.
    ///
    /// All points must have the same number of coordinates as the first one.
    pub fn from_points(points: &[Vec<f64>]) -> Result<Self> {
        let first = points.first().ok_or(KMeansError::EmptyDataset)?;
        let dim = first.len();

        let mut flat = Vec::with_capacity(points.len() * dim);
        for (i, p) in points.iter().enumerate() {
            if p.len() != dim {
                return Err(KMeansError::DimensionMismatch(format!(
                    "Point {} has {} coordinates, expected {}",
                    i,
                    p.len(),
                    dim
                )));
            }
            flat.extend_from_slice(p);
        }

        let array = Array2::from_shape_vec((points.len(), dim), flat)
            .map_err(|e| KMeansError::DimensionMismatch(e.to_string()))?;
        Self::new(array)
    }

    /// Number of points
    pub fn len(&self) -> usize {
        self.points.nrows()
    }

    /// Whether the dataset has no points.
    pub fn is_empty(&self) -> bool {
        self.points.nrows() == 0
    }

    /// Number of coordinates per point
    pub fn dim(&self) -> usize {
        self.points.ncols()
    }

    /// The `i`-th point. Panics if `i >= len()`.
    pub fn point(&self, i: usize) -> ArrayView1<'_, f64> {
        self.points.row(i)
    }

    pub fn view(&self) -> ArrayView2<'_, f64> {
        self.points.view()
    }

    pub fn as_array(&self) -> &Array2<f64> {
        &self.points
    }

    pub fn into_inner(self) -> Array2<f64> {
        self.points
    }

    /// Copy the points out as plain coordinate vectors.
    pub fn to_points(&self) -> Vec<Vec<f64>> {
        self.points.outer_iter().map(|row| row.to_vec()).collect()
    }
}

impl TryFrom<Vec<Vec<f64>>> for Dataset {
    type Error = KMeansError;

    fn try_from(points: Vec<Vec<f64>>) -> Result<Self> {
        Self::from_points(&points)
    }
}

impl TryFrom<Array2<f64>> for Dataset {
    type Error = KMeansError;

    fn try_from(points: Array2<f64>) -> Result<Self> {
        Self::new(points)
    }
}

impl From<Dataset> for Vec<Vec<f64>> {
    fn from(dataset: Dataset) -> Self {
        dataset.to_points()
    }
}

/// Draw `config.count` points uniformly from the per-dimension ranges.
///
/// # Errors
///
/// - [`KMeansError::EmptyDataset`] if `count` is zero or no ranges are given
/// - [`KMeansError::InvalidRange`] if a range is empty or not finite
pub fn generate_random_dataset<R: Rng + ?Sized>(
    config: &GeneratorConfig,
    rng: &mut R,
) -> Result<Dataset> {
    if config.count == 0 || config.ranges.is_empty() {
        return Err(KMeansError::EmptyDataset);
    }

    for (dim, &(low, high)) in config.ranges.iter().enumerate() {
        if !(low.is_finite() && high.is_finite() && (high - low).is_finite()) || low >= high {
            return Err(KMeansError::InvalidRange(format!(
                "Range for dimension {} must satisfy low < high with finite bounds, got [{}, {})",
                dim, low, high
            )));
        }
    }

    let mut points = Array2::zeros((config.count, config.dim()));
    for (dim, &(low, high)) in config.ranges.iter().enumerate() {
        let column = Array1::random_using(config.count, Uniform::new(low, high), rng);
        points.column_mut(dim).assign(&column);
    }

    tracing::debug!(
        count = config.count,
        dim = config.dim(),
        "Generated random dataset"
    );

    Dataset::new(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_from_points() {
        let dataset = Dataset::from_points(&[vec![0.0, 1.0], vec![2.0, 3.0], vec![4.0, 5.0]]).unwrap();
        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.dim(), 2);
        assert!(!dataset.is_empty());
        assert_eq!(dataset.point(1), array![2.0, 3.0].view());
    }

    #[test]
    fn test_from_points_ragged() {
        let result = Dataset::from_points(&[vec![0.0, 1.0], vec![2.0]]);
        assert!(matches!(result, Err(KMeansError::DimensionMismatch(_))));
    }

    #[test]
    fn test_empty_inputs() {
        assert_eq!(Dataset::from_points(&[]), Err(KMeansError::EmptyDataset));
        assert_eq!(
            Dataset::new(Array2::zeros((0, 2))),
            Err(KMeansError::EmptyDataset)
        );
        assert_eq!(
            Dataset::new(Array2::zeros((3, 0))),
            Err(KMeansError::EmptyDataset)
        );
    }

    #[test]
    fn test_non_finite_rejected() {
        let result = Dataset::new(array![[0.0, 1.0], [f64::NAN, 2.0]]);
        assert_eq!(
            result,
            Err(KMeansError::NonFiniteCoordinate { point: 1, dim: 0 })
        );
    }

    #[test]
    fn test_to_points_preserves_order() {
        let points = vec![vec![3.0, 1.0], vec![-1.0, 0.5]];
        let dataset = Dataset::from_points(&points).unwrap();
        assert_eq!(dataset.to_points(), points);
    }

    #[test]
    fn test_generate_within_ranges() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let config = GeneratorConfig::planar(200, (0.0, 100.0), (-5.0, 5.0));
        let dataset = generate_random_dataset(&config, &mut rng).unwrap();

        assert_eq!(dataset.len(), 200);
        assert_eq!(dataset.dim(), 2);
        for p in dataset.view().outer_iter() {
            assert!((0.0..100.0).contains(&p[0]));
            assert!((-5.0..5.0).contains(&p[1]));
        }
    }

    #[test]
    fn test_generate_is_reproducible() {
        let config = GeneratorConfig::default();
        let a = generate_random_dataset(&config, &mut ChaCha8Rng::seed_from_u64(1)).unwrap();
        let b = generate_random_dataset(&config, &mut ChaCha8Rng::seed_from_u64(1)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_generate_three_dimensions() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let config = GeneratorConfig::default()
            .with_count(10)
            .with_ranges(vec![(0.0, 1.0); 3]);
        let dataset = generate_random_dataset(&config, &mut rng).unwrap();
        assert_eq!(dataset.dim(), 3);
    }

    #[test]
    fn test_generate_invalid_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let config = GeneratorConfig::planar(10, (5.0, 5.0), (0.0, 1.0));
        let result = generate_random_dataset(&config, &mut rng);
        assert!(matches!(result, Err(KMeansError::InvalidRange(_))));

        let config = GeneratorConfig::planar(10, (0.0, f64::INFINITY), (0.0, 1.0));
        let result = generate_random_dataset(&config, &mut rng);
        assert!(matches!(result, Err(KMeansError::InvalidRange(_))));
    }

    #[test]
    fn test_generate_zero_count() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let config = GeneratorConfig::default().with_count(0);
        assert_eq!(
            generate_random_dataset(&config, &mut rng),
            Err(KMeansError::EmptyDataset)
        );
    }
}
