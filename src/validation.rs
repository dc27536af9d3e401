//! Statistical validation of a segmentation against respondent demographics.
//!
//! Each test is carried as its own `Result`, so a failed ANOVA (for example
//! because one cluster has a single member) does not hide the chi-square
//! tests on the categorical attributes.

use crate::anova::{one_way_anova, tukey_hsd, OneWayAnova, TukeyHsd};
use crate::contingency::{chi_square_test, ChiSquareTest, ContingencyTable};
use crate::data::{age_column, numeric_attribute_names, CategoricalAttribute, Observation};
use crate::error::{Error, Result};
use crate::kmeans::ClusterSolution;
use ndarray::{Array1, ArrayView1};
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Mean profile of one cluster over every numeric attribute
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ClusterProfile {
    /// Cluster with at least one member
    Populated {
        /// Cluster id
        cluster: usize,
        /// Number of members
        size: usize,
        /// Attribute means, aligned with [`ClusterProfiles::attributes`]
        means: Vec<f64>,
    },
    /// Cluster without members; it has no means
    Empty {
        /// Cluster id
        cluster: usize,
    },
}

impl ClusterProfile {
    /// Cluster id
    pub fn cluster(&self) -> usize {
        match self {
            Self::Populated { cluster, .. } | Self::Empty { cluster } => *cluster,
        }
    }

    /// Number of members
    pub fn size(&self) -> usize {
        match self {
            Self::Populated { size, .. } => *size,
            Self::Empty { .. } => 0,
        }
    }

    /// Attribute means, `None` for an empty cluster
    pub fn means(&self) -> Option<&[f64]> {
        match self {
            Self::Populated { means, .. } => Some(means),
            Self::Empty { .. } => None,
        }
    }
}

impl fmt::Display for ClusterProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Populated {
                cluster,
                size,
                means,
            } => {
                write!(f, "cluster {cluster} (n={size}):")?;
                for m in means {
                    write!(f, " {m:.3}")?;
                }
                Ok(())
            }
            Self::Empty { cluster } => write!(f, "cluster {cluster}: empty cluster"),
        }
    }
}

/// Per-cluster means table
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ClusterProfiles {
    /// Attribute names, attitudes first, then demographics
    pub attributes: Vec<String>,
    /// One profile per cluster id
    pub clusters: Vec<ClusterProfile>,
    /// Means over all respondents
    pub overall: Vec<f64>,
}

impl ClusterProfiles {
    /// Mean of `attribute` in `cluster`, `None` if either is unknown or the cluster is empty
    pub fn mean(&self, cluster: usize, attribute: &str) -> Option<f64> {
        let column = self.attributes.iter().position(|a| a == attribute)?;
        self.clusters.get(cluster)?.means().map(|m| m[column])
    }
}

/// Chi-square independence test of one categorical attribute against cluster id
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IndependenceTest {
    /// Attribute tested
    pub attribute: CategoricalAttribute,
    /// Test outcome
    pub outcome: Result<ChiSquareTest>,
}

/// Everything the validator computes; each test succeeds or fails on its own
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ValidationResult {
    /// Per-cluster attribute means
    pub profiles: ClusterProfiles,
    /// One-way ANOVA of age across clusters
    pub anova: Result<OneWayAnova>,
    /// Tukey-Kramer post-hoc comparison of age
    pub tukey: Result<TukeyHsd>,
    /// One independence test per categorical attribute
    pub independence: Vec<IndependenceTest>,
}

impl ValidationResult {
    /// Independence test for a specific attribute
    pub fn independence_test(
        &self,
        attribute: CategoricalAttribute,
    ) -> Option<&Result<ChiSquareTest>> {
        self.independence
            .iter()
            .find(|t| t.attribute == attribute)
            .map(|t| &t.outcome)
    }

    /// Number of tests that returned an error
    pub fn failed_tests(&self) -> usize {
        usize::from(self.anova.is_err())
            + usize::from(self.tukey.is_err())
            + self.independence.iter().filter(|t| t.outcome.is_err()).count()
    }
}

/// Validates cluster assignments against the unscaled observations
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Validator {
    /// Family-wise significance level for post-hoc comparisons
    pub alpha: f64,
}

impl Default for Validator {
    fn default() -> Self {
        Self { alpha: 0.05 }
    }
}

impl Validator {
    /// Validator with the default significance level (0.05)
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the significance level
    pub fn alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Validate a fitted solution
    pub fn validate(
        &self,
        observations: &[Observation],
        solution: &ClusterSolution,
    ) -> Result<ValidationResult> {
        self.validate_labels(observations, solution.labels.view(), solution.n_clusters())
    }

    /// Validate raw assignments (ids in `[0, n_clusters)`, one per observation)
    pub fn validate_labels(
        &self,
        observations: &[Observation],
        labels: ArrayView1<usize>,
        n_clusters: usize,
    ) -> Result<ValidationResult> {
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            return Err(Error::invalid_parameter(format!(
                "alpha must be in (0, 1), got {}",
                self.alpha
            )));
        }
        if observations.is_empty() {
            return Err(Error::invalid_data("Data cannot be empty"));
        }
        if labels.len() != observations.len() {
            return Err(Error::DimensionMismatch {
                expected: observations.len(),
                actual: labels.len(),
            });
        }
        if labels.iter().any(|&l| l >= n_clusters) {
            return Err(Error::invalid_data("Invalid cluster assignment"));
        }

        let profiles = profile_clusters(observations, labels, n_clusters);

        let ages = age_column(observations);
        let anova = one_way_anova(ages.view(), labels, n_clusters);
        let tukey = anova
            .as_ref()
            .map_err(Clone::clone)
            .and_then(|table| tukey_hsd(table, self.alpha));

        if let Err(e) = &anova {
            tracing::debug!(error = %e, "age ANOVA skipped");
        }

        let independence = CategoricalAttribute::ALL
            .iter()
            .map(|&attribute| IndependenceTest {
                attribute,
                outcome: independence_test(observations, labels, n_clusters, attribute),
            })
            .collect();

        Ok(ValidationResult {
            profiles,
            anova,
            tukey,
            independence,
        })
    }
}

fn profile_clusters(
    observations: &[Observation],
    labels: ArrayView1<usize>,
    n_clusters: usize,
) -> ClusterProfiles {
    let attributes: Vec<String> = numeric_attribute_names()
        .into_iter()
        .map(String::from)
        .collect();
    let width = attributes.len();

    let mut sums = vec![Array1::<f64>::zeros(width); n_clusters];
    let mut sizes = vec![0usize; n_clusters];
    let mut total = Array1::<f64>::zeros(width);

    for (obs, &label) in observations.iter().zip(labels.iter()) {
        let values = Array1::from_vec(obs.numeric_attributes());
        sums[label] += &values;
        total += &values;
        sizes[label] += 1;
    }

    let clusters = sums
        .into_iter()
        .zip(sizes)
        .enumerate()
        .map(|(cluster, (sum, size))| {
            if size == 0 {
                ClusterProfile::Empty { cluster }
            } else {
                ClusterProfile::Populated {
                    cluster,
                    size,
                    means: (sum / size as f64).to_vec(),
                }
            }
        })
        .collect();

    let overall = (total / observations.len() as f64).to_vec();

    ClusterProfiles {
        attributes,
        clusters,
        overall,
    }
}

fn independence_test(
    observations: &[Observation],
    labels: ArrayView1<usize>,
    n_clusters: usize,
    attribute: CategoricalAttribute,
) -> Result<ChiSquareTest> {
    let categories: Array1<u32> = observations.iter().map(|o| o.category(attribute)).collect();
    let table = ContingencyTable::from_labels(categories.view(), labels, n_clusters)?;
    let test = chi_square_test(table)?;

    if let Some(warning) = &test.warning {
        tracing::warn!(
            attribute = attribute.name(),
            cells = warning.cells,
            min_expected = warning.min_expected,
            "expected counts below 5; chi-square approximation is unreliable"
        );
    }

    Ok(test)
}
