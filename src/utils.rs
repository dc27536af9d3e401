//! Utility functions for k-means clustering

use crate::distance::{squared_euclidean, Metric, SquaredEuclidean};
use crate::error::{Error, Result};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

/// Find the closest centroid for a given data point.
///
/// Exact ties resolve to the lowest cluster index. Returns the index and the
/// squared distance to that centroid.
pub fn find_closest_centroid(
    point: ArrayView1<f64>,
    centroids: ArrayView2<f64>,
) -> Result<(usize, f64)> {
    if centroids.nrows() == 0 {
        return Err(Error::invalid_data("No centroids provided"));
    }

    let distances = SquaredEuclidean.distances_to_centroids(point, centroids)?;

    let mut min_distance = f64::INFINITY;
    let mut closest_centroid = 0;

    for (i, &distance) in distances.iter().enumerate() {
        if distance < min_distance {
            min_distance = distance;
            closest_centroid = i;
        }
    }

    Ok((closest_centroid, min_distance))
}

/// Assign all data points to their closest centroids
pub fn assign_points_to_centroids(
    data: ArrayView2<f64>,
    centroids: ArrayView2<f64>,
) -> Result<Array1<usize>> {
    let mut assignments = Array1::zeros(data.nrows());

    for (i, point) in data.rows().into_iter().enumerate() {
        assignments[i] = find_closest_centroid(point, centroids)?.0;
    }

    Ok(assignments)
}

/// Calculate inertia: the sum of squared distances to the assigned centroid
pub fn calculate_inertia(
    data: ArrayView2<f64>,
    centroids: ArrayView2<f64>,
    assignments: ArrayView1<usize>,
) -> Result<f64> {
    if assignments.len() != data.nrows() {
        return Err(Error::DimensionMismatch {
            expected: data.nrows(),
            actual: assignments.len(),
        });
    }

    let mut total = 0.0;
    for (point, &cluster_id) in data.rows().into_iter().zip(assignments.iter()) {
        if cluster_id >= centroids.nrows() {
            return Err(Error::invalid_data("Invalid cluster assignment"));
        }
        total += squared_euclidean(point, centroids.row(cluster_id));
    }

    Ok(total)
}

/// Mean of the points assigned to each cluster. Empty clusters yield a zero row.
pub fn compute_means(
    data: ArrayView2<f64>,
    assignments: ArrayView1<usize>,
    n_clusters: usize,
) -> Array2<f64> {
    let mut sums = Array2::zeros((n_clusters, data.ncols()));
    let sizes = cluster_sizes(assignments, n_clusters);

    for (point, &cluster_id) in data.rows().into_iter().zip(assignments.iter()) {
        if cluster_id < n_clusters {
            let mut row = sums.row_mut(cluster_id);
            row += &point;
        }
    }

    for (mut row, &size) in sums.rows_mut().into_iter().zip(sizes.iter()) {
        if size > 0 {
            row /= size as f64;
        }
    }

    sums
}

/// Check if two assignment arrays are equal (for convergence testing)
pub fn assignments_equal(a: ArrayView1<usize>, b: ArrayView1<usize>) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.iter().zip(b.iter()).all(|(&x, &y)| x == y)
}

/// Calculate cluster sizes
pub fn cluster_sizes(assignments: ArrayView1<usize>, n_clusters: usize) -> Vec<usize> {
    let mut sizes = vec![0; n_clusters];

    for &cluster_id in assignments.iter() {
        if cluster_id < n_clusters {
            sizes[cluster_id] += 1;
        }
    }

    sizes
}

/// Validate clustering parameters
pub fn validate_parameters(n_clusters: usize, max_iter: usize, n_init: usize) -> Result<()> {
    if n_clusters == 0 {
        return Err(Error::InvalidK {
            k: 0,
            n_samples: 0,
        });
    }

    if max_iter == 0 {
        return Err(Error::invalid_parameter("max_iter must be > 0"));
    }

    if n_init == 0 {
        return Err(Error::invalid_parameter("n_init must be > 0"));
    }

    Ok(())
}

/// Validate input data
pub fn validate_data(data: ArrayView2<f64>) -> Result<()> {
    if data.nrows() == 0 {
        return Err(Error::invalid_data("Data cannot be empty"));
    }

    if data.ncols() == 0 {
        return Err(Error::invalid_data("Data must have at least one feature"));
    }

    if data.iter().any(|v| !v.is_finite()) {
        return Err(Error::invalid_data("Data contains non-finite values"));
    }

    Ok(())
}
