//! Column-wise z-score standardization

use crate::data::FeatureMatrix;
use crate::error::{Error, Result};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Fitted per-column mean and sample standard deviation
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StandardScaler {
    /// Column means
    pub means: Array1<f64>,
    /// Column sample standard deviations (denominator `m - 1`)
    pub std_devs: Array1<f64>,
}

impl StandardScaler {
    /// Fit the scaler to an `m x n` matrix with `m >= 2`.
    ///
    /// Fails with [`Error::DegenerateColumn`] for the first constant column.
    pub fn fit(data: ArrayView2<f64>) -> Result<Self> {
        let (n_rows, n_cols) = data.dim();
        if n_cols == 0 {
            return Err(Error::invalid_data("Data must have at least one feature"));
        }
        if n_rows < 2 {
            return Err(Error::invalid_data(
                "At least two rows are required to estimate a standard deviation",
            ));
        }

        let means = data
            .mean_axis(Axis(0))
            .ok_or_else(|| Error::invalid_data("Data cannot be empty"))?;

        let mut std_devs = Array1::zeros(n_cols);
        for (j, column) in data.axis_iter(Axis(1)).enumerate() {
            // Only an exactly constant column has zero variance
            if column.iter().all(|&v| v == column[0]) {
                return Err(Error::DegenerateColumn { column: j });
            }

            let mean = means[j];
            let ss: f64 = column.iter().map(|x| (x - mean).powi(2)).sum();
            std_devs[j] = (ss / (n_rows - 1) as f64).sqrt();
        }

        Ok(Self { means, std_devs })
    }

    /// Apply `(x - mean) / sd` to every column
    pub fn transform(&self, data: ArrayView2<f64>) -> Result<Array2<f64>> {
        self.check_width(data.ncols())?;
        let mut scaled = data.to_owned();
        for mut row in scaled.rows_mut() {
            row -= &self.means;
            row /= &self.std_devs;
        }
        Ok(scaled)
    }

    /// Scale a single row
    pub fn transform_row(&self, row: ArrayView1<f64>) -> Result<Array1<f64>> {
        self.check_width(row.len())?;
        Ok((&row - &self.means) / &self.std_devs)
    }

    /// Map scaled values back to original units
    pub fn inverse_transform(&self, scaled: ArrayView2<f64>) -> Result<Array2<f64>> {
        self.check_width(scaled.ncols())?;
        let mut original = scaled.to_owned();
        for mut row in original.rows_mut() {
            row *= &self.std_devs;
            row += &self.means;
        }
        Ok(original)
    }

    fn check_width(&self, width: usize) -> Result<()> {
        if width != self.means.len() {
            return Err(Error::DimensionMismatch {
                expected: self.means.len(),
                actual: width,
            });
        }
        Ok(())
    }
}

/// A feature matrix after per-column standardization.
///
/// Every column has mean ~0 and sample standard deviation ~1.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScaledMatrix {
    data: Array2<f64>,
    scaler: StandardScaler,
}

impl ScaledMatrix {
    /// Borrow the scaled values
    pub fn view(&self) -> ArrayView2<'_, f64> {
        self.data.view()
    }

    /// The scaler fitted on the source matrix
    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }

    /// Number of rows
    pub fn nrows(&self) -> usize {
        self.data.nrows()
    }

    /// Number of feature columns
    pub fn ncols(&self) -> usize {
        self.data.ncols()
    }
}

/// Standardize every column of a feature matrix.
///
/// Pure function of its input. Fails with [`Error::DegenerateColumn`] when
/// any column is constant.
pub fn standardize(features: &FeatureMatrix) -> Result<ScaledMatrix> {
    let scaler = StandardScaler::fit(features.view())?;
    let data = scaler.transform(features.view())?;
    tracing::debug!(
        rows = data.nrows(),
        cols = data.ncols(),
        "standardized feature matrix"
    );
    Ok(ScaledMatrix { data, scaler })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_standardize_zero_mean_unit_sd() {
        let data = array![
            [3.0, 2.0, 10.0],
            [6.0, 6.0, 20.0],
            [4.0, 3.0, 15.0],
            [5.0, 1.0, 40.0]
        ];
        let scaled = standardize(&FeatureMatrix::from_array(data).unwrap()).unwrap();
        let view = scaled.view();

        for column in view.axis_iter(Axis(1)) {
            let mean = column.sum() / column.len() as f64;
            let var = column.iter().map(|x| (x - mean).powi(2)).sum::<f64>()
                / (column.len() - 1) as f64;
            assert!(mean.abs() < 1e-9);
            assert!((var.sqrt() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_sample_standard_deviation_denominator() {
        let data = array![[1.0], [3.0]];
        let scaler = StandardScaler::fit(data.view()).unwrap();

        assert_eq!(scaler.means[0], 2.0);
        // sqrt(((1-2)^2 + (3-2)^2) / 1)
        assert!((scaler.std_devs[0] - 2.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_column_reported() {
        let data = array![[1.0, 5.0], [2.0, 5.0], [3.0, 5.0]];
        let err = StandardScaler::fit(data.view()).unwrap_err();
        assert_eq!(err, Error::DegenerateColumn { column: 1 });
    }

    #[test]
    fn test_constant_fraction_is_degenerate() {
        // 0.1 is inexact in binary; the column must still count as constant
        let data = array![[0.1], [0.1], [0.1]];
        assert_eq!(
            StandardScaler::fit(data.view()).unwrap_err(),
            Error::DegenerateColumn { column: 0 }
        );
    }

    #[test]
    fn test_small_scale_and_large_offset_columns() {
        let data = array![[1e-13, 1e12], [2e-13, 1e12 + 1.0], [3e-13, 1e12 + 2.0]];
        let scaler = StandardScaler::fit(data.view()).unwrap();
        assert!((scaler.std_devs[1] - 1.0).abs() < 1e-12);

        let scaled = scaler.transform(data.view()).unwrap();
        for column in scaled.axis_iter(Axis(1)) {
            assert!((column[0] + 1.0).abs() < 1e-9);
            assert!(column[1].abs() < 1e-9);
            assert!((column[2] - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_single_row_rejected() {
        let data = array![[1.0, 2.0]];
        assert!(matches!(
            StandardScaler::fit(data.view()),
            Err(Error::InvalidData { .. })
        ));
    }

    #[test]
    fn test_inverse_transform_restores_values() {
        let data = array![[3.0, 2.0], [6.0, 6.0], [1.0, 7.0]];
        let scaler = StandardScaler::fit(data.view()).unwrap();
        let scaled = scaler.transform(data.view()).unwrap();
        let restored = scaler.inverse_transform(scaled.view()).unwrap();

        for (a, b) in restored.iter().zip(data.iter()) {
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn test_width_mismatch() {
        let data = array![[3.0, 2.0], [6.0, 6.0]];
        let scaler = StandardScaler::fit(data.view()).unwrap();
        let row = array![1.0, 2.0, 3.0];
        assert_eq!(
            scaler.transform_row(row.view()),
            Err(Error::DimensionMismatch {
                expected: 2,
                actual: 3
            })
        );
    }
}
