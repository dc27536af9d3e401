//! Initialization methods for k-means clustering

use crate::distance::squared_euclidean;
use crate::error::{Error, Result};
use ndarray::{Array2, ArrayView2};
use rand::prelude::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Initialization methods for the clustering engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum InitMethod {
    /// Sample k distinct rows without replacement as initial centroids
    #[default]
    Random,
    /// k-means++: spread seeds by sampling proportional to squared distance
    KMeansPlusPlus,
}

/// Initialize centroids for k-means clustering
pub fn initialize_centroids<R>(
    data: ArrayView2<f64>,
    n_clusters: usize,
    method: InitMethod,
    rng: &mut R,
) -> Result<Array2<f64>>
where
    R: Rng,
{
    if n_clusters == 0 || n_clusters > data.nrows() {
        return Err(Error::InvalidK {
            k: n_clusters,
            n_samples: data.nrows(),
        });
    }

    match method {
        InitMethod::Random => random_init(data, n_clusters, rng),
        InitMethod::KMeansPlusPlus => kmeans_plus_plus_init(data, n_clusters, rng),
    }
}

/// Random initialization: select k distinct rows
fn random_init<R>(data: ArrayView2<f64>, n_clusters: usize, rng: &mut R) -> Result<Array2<f64>>
where
    R: Rng,
{
    let indices = rand::seq::index::sample(rng, data.nrows(), n_clusters).into_vec();
    Ok(data.select(ndarray::Axis(0), &indices))
}

/// k-means++ initialization (Arthur & Vassilvitskii)
fn kmeans_plus_plus_init<R>(
    data: ArrayView2<f64>,
    n_clusters: usize,
    rng: &mut R,
) -> Result<Array2<f64>>
where
    R: Rng,
{
    let n_points = data.nrows();
    let mut chosen = Vec::with_capacity(n_clusters);
    chosen.push(rng.gen_range(0..n_points));

    let mut closest: Vec<f64> = data
        .rows()
        .into_iter()
        .map(|row| squared_euclidean(row, data.row(chosen[0])))
        .collect();

    while chosen.len() < n_clusters {
        let total: f64 = closest.iter().sum();

        let next = if total <= 0.0 {
            // Remaining points coincide with chosen seeds; take the first unused row
            (0..n_points)
                .find(|i| !chosen.contains(i))
                .ok_or_else(|| Error::invalid_data("Insufficient data points for k-means++"))?
        } else {
            let target = rng.gen::<f64>() * total;
            let mut cumulative = 0.0;
            let mut pick = n_points - 1;
            for (i, &d) in closest.iter().enumerate() {
                cumulative += d;
                if cumulative > target {
                    pick = i;
                    break;
                }
            }
            pick
        };

        chosen.push(next);
        for (i, row) in data.rows().into_iter().enumerate() {
            let d = squared_euclidean(row, data.row(next));
            if d < closest[i] {
                closest[i] = d;
            }
        }
    }

    Ok(data.select(ndarray::Axis(0), &chosen))
}
