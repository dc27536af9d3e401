//! One-way analysis of variance and Tukey-Kramer post-hoc comparison.

use crate::error::{Error, Result};
use crate::stats::{
    f_distribution_p_value, studentized_range_p_value, studentized_range_quantile,
};
use ndarray::ArrayView1;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One-way ANOVA table for a continuous variable across groups
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OneWayAnova {
    /// Members per group
    pub group_sizes: Vec<usize>,
    /// Mean of the variable within each group
    pub group_means: Vec<f64>,
    /// Mean over all observations
    pub grand_mean: f64,
    /// Between-group sum of squares
    pub ss_between: f64,
    /// Within-group sum of squares
    pub ss_within: f64,
    /// Total sum of squares
    pub ss_total: f64,
    /// Between-group degrees of freedom (`k - 1`)
    pub df_between: usize,
    /// Within-group degrees of freedom (`m - k`)
    pub df_within: usize,
    /// Between-group mean square
    pub ms_between: f64,
    /// Within-group mean square
    pub ms_within: f64,
    /// F statistic `ms_between / ms_within`
    pub f_statistic: f64,
    /// Upper-tail probability of `f_statistic` under F(df_between, df_within)
    pub p_value: f64,
    /// Share of total variance explained by group membership
    pub eta_squared: f64,
}

/// Run a one-way ANOVA of `values` grouped by `groups` (ids in `[0, n_groups)`).
///
/// Fails with [`Error::InsufficientGroups`] when any group has fewer than two
/// members.
pub fn one_way_anova(
    values: ArrayView1<f64>,
    groups: ArrayView1<usize>,
    n_groups: usize,
) -> Result<OneWayAnova> {
    if values.len() != groups.len() {
        return Err(Error::DimensionMismatch {
            expected: values.len(),
            actual: groups.len(),
        });
    }
    if n_groups < 2 {
        return Err(Error::invalid_parameter("ANOVA requires at least two groups"));
    }
    if groups.iter().any(|&g| g >= n_groups) {
        return Err(Error::invalid_data("Invalid group assignment"));
    }

    let mut sums = vec![0.0; n_groups];
    let mut sizes = vec![0usize; n_groups];
    for (&v, &g) in values.iter().zip(groups.iter()) {
        sums[g] += v;
        sizes[g] += 1;
    }

    if let Some((group, &size)) = sizes.iter().enumerate().find(|(_, &s)| s < 2) {
        return Err(Error::InsufficientGroups { group, size });
    }

    let n = values.len();
    let grand_mean = values.sum() / n as f64;
    let group_means: Vec<f64> = sums
        .iter()
        .zip(sizes.iter())
        .map(|(s, &c)| s / c as f64)
        .collect();

    let ss_between: f64 = group_means
        .iter()
        .zip(sizes.iter())
        .map(|(m, &c)| c as f64 * (m - grand_mean).powi(2))
        .sum();
    let ss_within: f64 = values
        .iter()
        .zip(groups.iter())
        .map(|(v, &g)| (v - group_means[g]).powi(2))
        .sum();
    let ss_total: f64 = values.iter().map(|v| (v - grand_mean).powi(2)).sum();

    let df_between = n_groups - 1;
    let df_within = n - n_groups;
    let ms_between = ss_between / df_between as f64;
    let ms_within = ss_within / df_within as f64;

    if ms_within <= 0.0 {
        return Err(Error::computation_error(
            "zero within-group variance; F statistic is undefined",
        ));
    }

    let f_statistic = ms_between / ms_within;
    let p_value = f_distribution_p_value(f_statistic, df_between, df_within);
    let eta_squared = if ss_total > 0.0 {
        ss_between / ss_total
    } else {
        0.0
    };

    Ok(OneWayAnova {
        group_sizes: sizes,
        group_means,
        grand_mean,
        ss_between,
        ss_within,
        ss_total,
        df_between,
        df_within,
        ms_between,
        ms_within,
        f_statistic,
        p_value,
        eta_squared,
    })
}

/// Tukey-Kramer comparison of one pair of groups
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PairwiseComparison {
    /// First group
    pub group_a: usize,
    /// Second group (`group_a < group_b`)
    pub group_b: usize,
    /// `mean(b) - mean(a)`
    pub mean_diff: f64,
    /// Standard error of the difference
    pub std_error: f64,
    /// Studentized range statistic `|mean_diff| / std_error`
    pub q_statistic: f64,
    /// Family-wise adjusted p-value
    pub p_adj: f64,
    /// Lower bound of the simultaneous confidence interval
    pub ci_lower: f64,
    /// Upper bound of the simultaneous confidence interval
    pub ci_upper: f64,
    /// `p_adj < alpha`
    pub significant: bool,
}

/// Tukey honestly-significant-difference table
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TukeyHsd {
    /// Family-wise significance level
    pub alpha: f64,
    /// Critical studentized range value at `1 - alpha`
    pub q_critical: f64,
    /// Error degrees of freedom
    pub df: usize,
    /// Every unordered pair of groups, in lexicographic order
    pub comparisons: Vec<PairwiseComparison>,
}

impl TukeyHsd {
    /// Pairs whose means differ at the family-wise level `alpha`
    pub fn distinguishable_pairs(&self) -> Vec<(usize, usize)> {
        self.comparisons
            .iter()
            .filter(|c| c.significant)
            .map(|c| (c.group_a, c.group_b))
            .collect()
    }

    /// Comparison for a specific pair, in either order
    pub fn pair(&self, a: usize, b: usize) -> Option<&PairwiseComparison> {
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        self.comparisons
            .iter()
            .find(|c| c.group_a == lo && c.group_b == hi)
    }
}

/// Tukey-Kramer pairwise comparison using the error term of `anova`
pub fn tukey_hsd(anova: &OneWayAnova, alpha: f64) -> Result<TukeyHsd> {
    if !(alpha > 0.0 && alpha < 1.0) {
        return Err(Error::invalid_parameter(format!(
            "alpha must be in (0, 1), got {alpha}"
        )));
    }

    let k = anova.group_means.len();
    let df = anova.df_within;
    let q_critical = studentized_range_quantile(1.0 - alpha, k, df as f64);
    if !q_critical.is_finite() {
        return Err(Error::computation_error(
            "studentized range quantile did not converge",
        ));
    }

    let mut comparisons = Vec::with_capacity(k * (k - 1) / 2);
    for a in 0..k {
        for b in (a + 1)..k {
            let n_a = anova.group_sizes[a] as f64;
            let n_b = anova.group_sizes[b] as f64;
            let mean_diff = anova.group_means[b] - anova.group_means[a];
            let std_error = (anova.ms_within / 2.0 * (1.0 / n_a + 1.0 / n_b)).sqrt();
            let q_statistic = mean_diff.abs() / std_error;
            let p_adj = studentized_range_p_value(q_statistic, k, df as f64);
            let margin = q_critical * std_error;

            comparisons.push(PairwiseComparison {
                group_a: a,
                group_b: b,
                mean_diff,
                std_error,
                q_statistic,
                p_adj,
                ci_lower: mean_diff - margin,
                ci_upper: mean_diff + margin,
                significant: p_adj < alpha,
            });
        }
    }

    Ok(TukeyHsd {
        alpha,
        q_critical,
        df,
        comparisons,
    })
}
