//! Distance metrics over numeric feature vectors

use crate::error::{Error, Result};
use ndarray::{ArrayView1, ArrayView2};

/// Trait for computing distances between feature vectors
pub trait Metric {
    /// Compute distance between two points
    fn distance(&self, a: ArrayView1<f64>, b: ArrayView1<f64>) -> Result<f64>;

    /// Compute distances between a single point and multiple centroids
    fn distances_to_centroids(
        &self,
        point: ArrayView1<f64>,
        centroids: ArrayView2<f64>,
    ) -> Result<Vec<f64>> {
        if centroids.ncols() != point.len() {
            return Err(Error::DimensionMismatch {
                expected: centroids.ncols(),
                actual: point.len(),
            });
        }

        let mut distances = Vec::with_capacity(centroids.nrows());
        for centroid_row in centroids.rows() {
            distances.push(self.distance(point, centroid_row)?);
        }
        Ok(distances)
    }
}

/// Squared Euclidean distance, the objective k-means minimizes
#[derive(Debug, Clone, Copy, Default)]
pub struct SquaredEuclidean;

impl Metric for SquaredEuclidean {
    fn distance(&self, a: ArrayView1<f64>, b: ArrayView1<f64>) -> Result<f64> {
        check_lengths(a, b)?;
        Ok(squared_euclidean(a, b))
    }
}

/// Euclidean distance, used for silhouette widths
#[derive(Debug, Clone, Copy, Default)]
pub struct Euclidean;

impl Metric for Euclidean {
    fn distance(&self, a: ArrayView1<f64>, b: ArrayView1<f64>) -> Result<f64> {
        check_lengths(a, b)?;
        Ok(squared_euclidean(a, b).sqrt())
    }
}

fn check_lengths(a: ArrayView1<f64>, b: ArrayView1<f64>) -> Result<()> {
    if a.len() != b.len() {
        return Err(Error::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }
    Ok(())
}

/// Unchecked squared Euclidean distance; callers guarantee equal lengths
#[inline]
pub(crate) fn squared_euclidean(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}
