//! End-to-end segmentation: scale, diagnose, cluster, validate

use crate::data::{FeatureMatrix, Observation};
use crate::error::{Error, Result};
use crate::initialization::InitMethod;
use crate::kmeans::{ClusterSolution, KMeans};
use crate::scaling::{standardize, ScaledMatrix};
use crate::selection::{DiagnosticCurve, KSelector};
use crate::validation::{ValidationResult, Validator};
use ndarray::Array2;
use std::ops::RangeInclusive;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Parameters of a segmentation run
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PipelineConfig {
    /// Number of segments to build
    pub n_clusters: usize,
    /// Restarts per clustering run
    pub n_init: usize,
    /// Iteration cap per restart
    pub max_iter: usize,
    /// Base seed; restart `r` uses `seed + r`
    pub seed: u64,
    /// Significance level of the post-hoc comparison
    pub alpha: f64,
    /// Candidate k values for the diagnostic curve; skipped when `None`
    pub k_range: Option<RangeInclusive<usize>>,
    /// Centroid initialization
    pub init_method: InitMethod,
    /// Run restarts and candidate k values concurrently
    pub parallel: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            n_clusters: 3,
            n_init: 25,
            max_iter: 300,
            seed: 0,
            alpha: 0.05,
            k_range: None,
            init_method: InitMethod::Random,
            parallel: true,
        }
    }
}

/// All values produced by one run, in pipeline order
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SegmentationReport {
    /// Standardized attitude matrix
    pub scaled: ScaledMatrix,
    /// Inertia and silhouette per candidate k, if requested
    pub diagnostics: Option<DiagnosticCurve>,
    /// Best-of-restarts clustering in scaled space
    pub solution: ClusterSolution,
    /// Centroids mapped back to the original attitude scale
    pub centroids: Array2<f64>,
    /// Demographic validation of the segments
    pub validation: ValidationResult,
}

/// Runs the full segmentation for a fixed configuration
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a pipeline
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Configuration in use
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    fn engine(&self) -> KMeans {
        let engine = KMeans::new(self.config.n_clusters)
            .n_init(self.config.n_init)
            .max_iter(self.config.max_iter)
            .random_state(self.config.seed)
            .init_method(self.config.init_method);
        if self.config.parallel {
            engine
        } else {
            engine.n_jobs(1)
        }
    }

    /// Segment `observations`.
    ///
    /// Structural problems (a constant attitude column, an impossible k)
    /// abort the run. Statistical tests that cannot be computed are
    /// reported inside [`SegmentationReport::validation`].
    pub fn run(&self, observations: &[Observation]) -> Result<SegmentationReport> {
        if !(self.config.alpha > 0.0 && self.config.alpha < 1.0) {
            return Err(Error::invalid_parameter(format!(
                "alpha must be in (0, 1), got {}",
                self.config.alpha
            )));
        }

        let features = FeatureMatrix::from_observations(observations)?;
        let scaled = standardize(&features)?;
        tracing::info!(
            respondents = scaled.nrows(),
            features = scaled.ncols(),
            "standardized attitude scores"
        );

        let engine = self.engine();

        let diagnostics = match &self.config.k_range {
            Some(range) => Some(
                KSelector::new(engine.clone())
                    .parallel(self.config.parallel)
                    .evaluate(scaled.view(), range.clone())?,
            ),
            None => None,
        };

        let solution = engine.fit(scaled.view())?;
        tracing::info!(
            k = solution.n_clusters(),
            inertia = solution.inertia,
            restart = solution.restart,
            iterations = solution.n_iter,
            "selected best restart"
        );

        let centroids = scaled.scaler().inverse_transform(solution.centroids.view())?;
        let validation = Validator::new()
            .alpha(self.config.alpha)
            .validate(observations, &solution)?;

        Ok(SegmentationReport {
            scaled,
            diagnostics,
            solution,
            centroids,
            validation,
        })
    }
}
