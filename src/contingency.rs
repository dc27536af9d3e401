//! Contingency tables and chi-square tests of independence

use crate::error::{Error, Result};
use crate::stats::chi_square_p_value;
use ndarray::{Array2, ArrayView1, ArrayView2, Axis};
use std::collections::BTreeSet;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Expected cell count below which the chi-square approximation degrades
pub const MIN_EXPECTED_COUNT: f64 = 5.0;

/// Cross-tabulation of category levels (rows) against cluster ids (columns)
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ContingencyTable {
    /// Category level of each row, ascending
    pub levels: Vec<u32>,
    /// Cluster id of each column, ascending
    pub clusters: Vec<usize>,
    /// Observed counts, `levels x clusters`
    pub counts: Array2<f64>,
}

impl ContingencyTable {
    /// Cross-tabulate `categories` against `labels`.
    ///
    /// Only observed levels and non-empty clusters get a row or column.
    pub fn from_labels(
        categories: ArrayView1<u32>,
        labels: ArrayView1<usize>,
        n_clusters: usize,
    ) -> Result<Self> {
        if categories.len() != labels.len() {
            return Err(Error::DimensionMismatch {
                expected: labels.len(),
                actual: categories.len(),
            });
        }
        if labels.iter().any(|&l| l >= n_clusters) {
            return Err(Error::invalid_data("Invalid cluster assignment"));
        }

        let levels: Vec<u32> = categories
            .iter()
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let clusters: Vec<usize> = labels
            .iter()
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut counts = Array2::zeros((levels.len(), clusters.len()));
        for (category, label) in categories.iter().zip(labels.iter()) {
            // Both searches succeed: the vectors were built from these values
            if let (Ok(row), Ok(col)) =
                (levels.binary_search(category), clusters.binary_search(label))
            {
                counts[[row, col]] += 1.0;
            }
        }

        Ok(Self {
            levels,
            clusters,
            counts,
        })
    }

    /// Build a table directly from counts (rows = levels `0..r`, columns = clusters `0..c`)
    pub fn from_counts(counts: Array2<f64>) -> Result<Self> {
        if counts.iter().any(|&c| c < 0.0 || !c.is_finite()) {
            return Err(Error::invalid_data("counts must be finite and non-negative"));
        }
        let levels = (0..counts.nrows() as u32).collect();
        let clusters = (0..counts.ncols()).collect();
        Ok(Self {
            levels,
            clusters,
            counts,
        })
    }

    /// Counts expected under independence: `row total * column total / grand total`
    pub fn expected(&self) -> Array2<f64> {
        expected_counts(self.counts.view())
    }
}

/// Warning attached to a chi-square test whose expected counts are small
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LowExpectedCount {
    /// Number of cells with expected count below [`MIN_EXPECTED_COUNT`]
    pub cells: usize,
    /// Smallest expected count in the table
    pub min_expected: f64,
}

/// Result of a chi-square test of independence
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChiSquareTest {
    /// Observed table
    pub table: ContingencyTable,
    /// Expected counts under independence
    pub expected: Array2<f64>,
    /// Sum of `(observed - expected)^2 / expected`
    pub statistic: f64,
    /// `(rows - 1) * (columns - 1)`
    pub degrees_of_freedom: usize,
    /// Upper-tail probability under the chi-square distribution
    pub p_value: f64,
    /// Cramér's V effect size
    pub cramers_v: f64,
    /// Present when some expected counts fall below [`MIN_EXPECTED_COUNT`]
    pub warning: Option<LowExpectedCount>,
}

fn expected_counts(observed: ArrayView2<f64>) -> Array2<f64> {
    let row_totals = observed.sum_axis(Axis(1));
    let col_totals = observed.sum_axis(Axis(0));
    let total = observed.sum();

    Array2::from_shape_fn(observed.dim(), |(i, j)| row_totals[i] * col_totals[j] / total)
}

/// Pearson chi-square test of independence on a contingency table
pub fn chi_square_test(table: ContingencyTable) -> Result<ChiSquareTest> {
    let (rows, cols) = table.counts.dim();
    if rows < 2 || cols < 2 {
        return Err(Error::invalid_data(format!(
            "contingency table must be at least 2x2, got {rows}x{cols}"
        )));
    }

    let expected = table.expected();
    if expected.iter().any(|&e| e <= 0.0) {
        return Err(Error::invalid_data("contingency table has an empty row or column"));
    }

    let statistic: f64 = table
        .counts
        .iter()
        .zip(expected.iter())
        .map(|(o, e)| (o - e).powi(2) / e)
        .sum();
    let degrees_of_freedom = (rows - 1) * (cols - 1);
    let p_value = chi_square_p_value(statistic, degrees_of_freedom);

    let total = table.counts.sum();
    let min_dim = (rows.min(cols) - 1) as f64;
    let cramers_v = (statistic / (total * min_dim)).sqrt();

    let low_cells = expected.iter().filter(|&&e| e < MIN_EXPECTED_COUNT).count();
    let warning = (low_cells > 0).then(|| LowExpectedCount {
        cells: low_cells,
        min_expected: expected.iter().copied().fold(f64::INFINITY, f64::min),
    });

    Ok(ChiSquareTest {
        table,
        expected,
        statistic,
        degrees_of_freedom,
        p_value,
        cramers_v,
        warning,
    })
}
