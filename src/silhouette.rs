//! Silhouette widths for cluster assignments

use crate::distance::{Euclidean, Metric};
use crate::error::{Error, Result};
use ndarray::{Array1, ArrayView1, ArrayView2};
use rayon::prelude::*;

/// Silhouette value of every point.
///
/// For point `i`, `a(i)` is the mean Euclidean distance to the other members
/// of its cluster and `b(i)` the smallest mean distance to the members of
/// any other non-empty cluster; `s(i) = (b - a) / max(a, b)`. Members of
/// singleton clusters get `0`.
pub fn silhouette_samples(
    data: ArrayView2<f64>,
    labels: ArrayView1<usize>,
    n_clusters: usize,
) -> Result<Array1<f64>> {
    if labels.len() != data.nrows() {
        return Err(Error::DimensionMismatch {
            expected: data.nrows(),
            actual: labels.len(),
        });
    }
    if labels.iter().any(|&l| l >= n_clusters) {
        return Err(Error::invalid_data("Invalid cluster assignment"));
    }

    let mut sizes = vec![0usize; n_clusters];
    for &l in labels.iter() {
        sizes[l] += 1;
    }
    let populated = sizes.iter().filter(|&&s| s > 0).count();
    if populated < 2 {
        return Err(Error::invalid_parameter(
            "silhouette requires at least two non-empty clusters",
        ));
    }

    let values: Vec<f64> = (0..data.nrows())
        .into_par_iter()
        .map(|i| -> Result<f64> {
            let own = labels[i];
            if sizes[own] == 1 {
                return Ok(0.0);
            }

            let mut sums = vec![0.0; n_clusters];
            let point = data.row(i);
            for (j, other) in data.rows().into_iter().enumerate() {
                if i != j {
                    sums[labels[j]] += Euclidean.distance(point, other)?;
                }
            }

            let a = sums[own] / (sizes[own] - 1) as f64;
            let b = (0..n_clusters)
                .filter(|&c| c != own && sizes[c] > 0)
                .map(|c| sums[c] / sizes[c] as f64)
                .fold(f64::INFINITY, f64::min);

            let denom = a.max(b);
            Ok(if denom > 0.0 { (b - a) / denom } else { 0.0 })
        })
        .collect::<Result<_>>()?;

    Ok(Array1::from_vec(values))
}

/// Mean silhouette over all points
pub fn silhouette_score(
    data: ArrayView2<f64>,
    labels: ArrayView1<usize>,
    n_clusters: usize,
) -> Result<f64> {
    let samples = silhouette_samples(data, labels, n_clusters)?;
    samples
        .mean()
        .ok_or_else(|| Error::invalid_data("Data cannot be empty"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr1, arr2};

    #[test]
    fn test_two_point_clusters() {
        let data = arr2(&[[0.0], [1.0], [10.0], [11.0]]);
        let labels = arr1(&[0, 0, 1, 1]);

        let samples = silhouette_samples(data.view(), labels.view(), 2).unwrap();
        // point 0: a = 1, b = (10 + 11) / 2 = 10.5
        assert!((samples[0] - (10.5 - 1.0) / 10.5).abs() < 1e-12);
        // point 1: a = 1, b = (9 + 10) / 2 = 9.5
        assert!((samples[1] - (9.5 - 1.0) / 9.5).abs() < 1e-12);
    }

    #[test]
    fn test_uses_plain_euclidean_distance() {
        let data = arr2(&[[0.0, 0.0], [3.0, 4.0], [0.0, 10.0], [0.0, 12.0]]);
        let labels = arr1(&[0, 0, 1, 1]);

        let samples = silhouette_samples(data.view(), labels.view(), 2).unwrap();
        // point 0: a = 5, b = (10 + 12) / 2 = 11
        assert!((samples[0] - 6.0 / 11.0).abs() < 1e-12);
    }

    #[test]
    fn test_singleton_cluster_scores_zero() {
        let data = arr2(&[[0.0], [1.0], [10.0]]);
        let labels = arr1(&[0, 0, 1]);

        let samples = silhouette_samples(data.view(), labels.view(), 2).unwrap();
        assert_eq!(samples[2], 0.0);
    }

    #[test]
    fn test_values_within_bounds() {
        let data = arr2(&[[0.0, 1.0], [2.0, 0.5], [1.0, 1.0], [3.0, 3.0], [0.2, 2.5]]);
        let labels = arr1(&[0, 1, 0, 1, 2]);

        let samples = silhouette_samples(data.view(), labels.view(), 3).unwrap();
        assert!(samples.iter().all(|&s| (-1.0..=1.0).contains(&s)));
    }

    #[test]
    fn test_misassigned_point_is_negative() {
        let data = arr2(&[[0.0], [0.1], [10.0], [10.1], [0.2]]);
        let labels = arr1(&[0, 0, 1, 1, 1]);

        let samples = silhouette_samples(data.view(), labels.view(), 2).unwrap();
        assert!(samples[4] < 0.0);
    }

    #[test]
    fn test_single_cluster_rejected() {
        let data = arr2(&[[0.0], [1.0]]);
        let labels = arr1(&[0, 0]);
        assert!(silhouette_score(data.view(), labels.view(), 1).is_err());
    }

    #[test]
    fn test_score_is_mean() {
        let data = arr2(&[[0.0], [1.0], [10.0], [11.0]]);
        let labels = arr1(&[0, 0, 1, 1]);

        let samples = silhouette_samples(data.view(), labels.view(), 2).unwrap();
        let score = silhouette_score(data.view(), labels.view(), 2).unwrap();
        assert!((score - samples.sum() / 4.0).abs() < 1e-12);
    }
}
