//! Cluster-count diagnostics: inertia (elbow) and mean silhouette per k
//!
//! The selector never picks a k. It reports both curves and leaves the
//! decision to the analyst. Total inertia is expected to be non-increasing
//! in k, but restart variance can make it rise slightly between neighbours;
//! that is expected behavior, not a defect.

use crate::error::{Error, Result};
use crate::kmeans::KMeans;
use crate::silhouette::silhouette_score;
use ndarray::ArrayView2;
use rayon::prelude::*;
use std::ops::RangeInclusive;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One point of the diagnostic curve
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DiagnosticPoint {
    /// Number of clusters
    pub k: usize,
    /// Within-cluster sum of squares of the best restart
    pub inertia: f64,
    /// Mean silhouette width; `None` for `k = 1`, where it is undefined
    pub silhouette: Option<f64>,
}

/// Inertia and silhouette for a range of cluster counts
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DiagnosticCurve {
    /// Points in ascending k
    pub points: Vec<DiagnosticPoint>,
}

impl DiagnosticCurve {
    /// `(k, inertia)` pairs for an elbow plot
    pub fn inertias(&self) -> Vec<(usize, f64)> {
        self.points.iter().map(|p| (p.k, p.inertia)).collect()
    }

    /// `(k, mean silhouette)` pairs, skipping k values where it is undefined
    pub fn silhouettes(&self) -> Vec<(usize, f64)> {
        self.points
            .iter()
            .filter_map(|p| p.silhouette.map(|s| (p.k, s)))
            .collect()
    }

    /// Diagnostic point for a given k
    pub fn point(&self, k: usize) -> Option<&DiagnosticPoint> {
        self.points.iter().find(|p| p.k == k)
    }
}

/// Computes a [`DiagnosticCurve`] by running the clustering engine per k
#[derive(Debug, Clone)]
pub struct KSelector {
    engine: KMeans,
    parallel: bool,
}

impl KSelector {
    /// Use `engine`'s restarts, iteration cap, seed and init method for every k
    pub fn new(engine: KMeans) -> Self {
        Self {
            engine,
            parallel: true,
        }
    }

    /// Evaluate candidate k values concurrently (default `true`)
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Compute the curve for every k in `k_range`
    pub fn evaluate(
        &self,
        data: ArrayView2<f64>,
        k_range: RangeInclusive<usize>,
    ) -> Result<DiagnosticCurve> {
        let (start, end) = (*k_range.start(), *k_range.end());
        if start == 0 || start > end {
            return Err(Error::invalid_parameter(format!(
                "invalid k range {start}..={end}"
            )));
        }
        if end > data.nrows() {
            return Err(Error::InvalidK {
                k: end,
                n_samples: data.nrows(),
            });
        }

        let ks: Vec<usize> = k_range.collect();
        let results: Vec<Result<DiagnosticPoint>> = if self.parallel {
            ks.into_par_iter().map(|k| self.evaluate_k(data, k)).collect()
        } else {
            ks.into_iter().map(|k| self.evaluate_k(data, k)).collect()
        };

        let points = results.into_iter().collect::<Result<Vec<_>>>()?;
        Ok(DiagnosticCurve { points })
    }

    fn evaluate_k(&self, data: ArrayView2<f64>, k: usize) -> Result<DiagnosticPoint> {
        let mut engine = self.engine.clone();
        engine.n_clusters = k;
        let solution = engine.fit(data)?;

        let silhouette = if k >= 2 {
            Some(silhouette_score(data, solution.labels.view(), k)?)
        } else {
            None
        };

        tracing::debug!(k, inertia = solution.inertia, ?silhouette, "evaluated k");

        Ok(DiagnosticPoint {
            k,
            inertia: solution.inertia,
            silhouette,
        })
    }
}

/// Convenience wrapper: diagnostic curve with a default engine seeded by `seed`
pub fn diagnostic_curve(
    data: ArrayView2<f64>,
    k_range: RangeInclusive<usize>,
    seed: u64,
) -> Result<DiagnosticCurve> {
    KSelector::new(KMeans::default().random_state(seed)).evaluate(data, k_range)
}
