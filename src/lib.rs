//! # Survey Respondent Segmentation
//!
//! This crate partitions survey respondents into segments from their
//! attitude scores and checks whether the segments differ on demographics.
//!
//! ## Features
//!
//! - **Standardization**: column-wise z-scores with sample standard deviation
//! - **K-means**: Lloyd's algorithm with seeded, parallel restarts
//! - **Diagnostics**: inertia (elbow) and mean silhouette over a range of k
//! - **Validation**: per-cluster profiles, one-way ANOVA with Tukey-Kramer
//!   post-hoc comparison, chi-square independence tests
//!
//! The number of segments is never chosen automatically; the diagnostic
//! curve is meant for an analyst.
//!
//! ## Example
//!
//! ```rust
//! use segmenta::{standardize, FeatureMatrix, KMeans};
//! use ndarray::array;
//!
//! let raw = array![
//!     [3.0, 2.0, 3.0],
//!     [2.0, 3.0, 3.0],
//!     [6.0, 6.0, 1.0],
//!     [5.0, 6.0, 2.0],
//! ];
//! let features = FeatureMatrix::from_array(raw).unwrap();
//! let scaled = standardize(&features).unwrap();
//!
//! let solution = KMeans::new(2)
//!     .n_init(10)
//!     .random_state(42)
//!     .fit(scaled.view())
//!     .unwrap();
//! assert_eq!(solution.labels[0], solution.labels[1]);
//! assert_ne!(solution.labels[0], solution.labels[2]);
//! ```

#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod anova;
pub mod contingency;
pub mod data;
pub mod distance;
pub mod error;
pub mod initialization;
pub mod kmeans;
pub mod pipeline;
pub mod scaling;
pub mod selection;
pub mod silhouette;
pub mod stats;
pub mod utils;
pub mod validation;

pub use anova::{one_way_anova, tukey_hsd, OneWayAnova, PairwiseComparison, TukeyHsd};
pub use contingency::{chi_square_test, ChiSquareTest, ContingencyTable, LowExpectedCount};
pub use data::{CategoricalAttribute, Demographics, FeatureMatrix, Observation};
pub use distance::{Euclidean, Metric, SquaredEuclidean};
pub use error::{Error, Result};
pub use initialization::InitMethod;
pub use kmeans::{ClusterSolution, KMeans};
pub use pipeline::{Pipeline, PipelineConfig, SegmentationReport};
pub use scaling::{standardize, ScaledMatrix, StandardScaler};
pub use selection::{diagnostic_curve, DiagnosticCurve, DiagnosticPoint, KSelector};
pub use silhouette::{silhouette_samples, silhouette_score};
pub use validation::{
    ClusterProfile, ClusterProfiles, IndependenceTest, ValidationResult, Validator,
};

/// Re-export commonly used types from ndarray
pub use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
