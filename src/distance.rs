use crate::error::{KMeansError, Result};
use ndarray::{ArrayView1, ArrayView2};

/// Euclidean distance between two points.
///
/// # Errors
///
/// Returns [`KMeansError::DimensionMismatch`] if the points have a different
/// number of coordinates.
pub fn distance(a: &ArrayView1<f64>, b: &ArrayView1<f64>) -> Result<f64> {
    if a.len() != b.len() {
        return Err(KMeansError::DimensionMismatch(format!(
            "Cannot compare a point with {} coordinates to one with {}",
            a.len(),
            b.len()
        )));
    }
    Ok(euclidean(a, b))
}

/// Euclidean distance without the length check. Callers validate shapes once
/// up front and then use this in the inner loops.
#[inline]
pub(crate) fn euclidean(a: &ArrayView1<f64>, b: &ArrayView1<f64>) -> f64 {
    squared_euclidean(a, b).sqrt()
}

#[inline]
pub(crate) fn squared_euclidean(a: &ArrayView1<f64>, b: &ArrayView1<f64>) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

/// Find the centroid closest to `point`.
///
/// Returns the index and distance of the first centroid achieving the
/// minimum, so ties resolve to the lowest index.
pub(crate) fn nearest_centroid(point: &ArrayView1<f64>, centroids: &ArrayView2<f64>) -> (usize, f64) {
    let mut best_idx = 0;
    let mut best_dist = f64::INFINITY;

    for (j, centroid) in centroids.outer_iter().enumerate() {
        let dist = euclidean(point, &centroid);
        if dist < best_dist {
            best_dist = dist;
            best_idx = j;
        }
    }

    (best_idx, best_dist)
}

/// Compute centroid shift (sum of L2 norms of centroid movements)
pub fn compute_centroid_shift(
    old_centroids: &ArrayView2<f64>,
    new_centroids: &ArrayView2<f64>,
) -> f64 {
    old_centroids
        .outer_iter()
        .zip(new_centroids.outer_iter())
        .map(|(old_c, new_c)| euclidean(&old_c, &new_c))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_distance_3_4_5() {
        let a = array![0.0, 0.0];
        let b = array![3.0, 4.0];
        assert_relative_eq!(distance(&a.view(), &b.view()).unwrap(), 5.0);
    }

    #[test]
    fn test_distance_to_self_is_zero() {
        let p = array![12.5, -3.25, 7.0];
        assert_eq!(distance(&p.view(), &p.view()).unwrap(), 0.0);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let a = array![1.5, 2.0];
        let b = array![-4.0, 9.75];
        assert_eq!(
            distance(&a.view(), &b.view()).unwrap(),
            distance(&b.view(), &a.view()).unwrap()
        );
    }

    #[test]
    fn test_distance_dimension_mismatch() {
        let a = array![1.0, 2.0];
        let b = array![1.0, 2.0, 3.0];
        let result = distance(&a.view(), &b.view());
        assert!(matches!(result, Err(KMeansError::DimensionMismatch(_))));
    }

    #[test]
    fn test_nearest_centroid() {
        let centroids = array![[0.0, 0.0], [10.0, 10.0]];

        let (idx, dist) = nearest_centroid(&array![9.0, 10.0].view(), &centroids.view());
        assert_eq!(idx, 1);
        assert_relative_eq!(dist, 1.0);

        // (5,5) is equidistant, the first centroid wins
        let (idx, _) = nearest_centroid(&array![5.0, 5.0].view(), &centroids.view());
        assert_eq!(idx, 0);
    }

    #[test]
    fn test_centroid_shift() {
        let old = array![[0.0, 0.0], [1.0, 1.0]];
        let new = array![[1.0, 0.0], [1.0, 1.0]];

        let shift = compute_centroid_shift(&old.view(), &new.view());
        assert_relative_eq!(shift, 1.0, epsilon = 1e-12);
    }
}
