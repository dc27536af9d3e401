//! Respondent observations and the feature matrix projected from them

use crate::error::{Error, Result};
use ndarray::{Array1, Array2, ArrayView2};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of attitude scores recorded per respondent
pub const N_ATTITUDES: usize = 7;

/// Names of the attitude scores, in column order
pub const ATTITUDE_NAMES: [&str; N_ATTITUDES] = [
    "ConstCom",
    "TimelyInf",
    "TaskMgm",
    "DeviceSt",
    "Wellness",
    "Athlete",
    "Style",
];

/// Names of the numeric demographic attributes, in column order
pub const DEMOGRAPHIC_NAMES: [&str; 4] = ["Gender", "Education", "Income", "Age"];

/// Demographic attributes of a single respondent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Demographics {
    /// Binary gender flag (0 or 1)
    pub gender: u8,
    /// Ordinal education level
    pub education: u8,
    /// Ordinal income bracket
    pub income: u8,
    /// Age in years
    pub age: u32,
}

/// Categorical demographic attributes tested for independence from clusters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CategoricalAttribute {
    /// Binary gender flag
    Gender,
    /// Ordinal income bracket
    Income,
    /// Ordinal education level
    Education,
}

impl CategoricalAttribute {
    /// All categorical attributes, in reporting order
    pub const ALL: [CategoricalAttribute; 3] = [Self::Gender, Self::Income, Self::Education];

    /// Column name of the attribute
    pub fn name(&self) -> &'static str {
        match self {
            Self::Gender => "Gender",
            Self::Income => "Income",
            Self::Education => "Education",
        }
    }
}

/// One survey respondent. Immutable once constructed.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Observation {
    attitudes: [f64; N_ATTITUDES],
    demographics: Demographics,
}

impl Observation {
    /// Create an observation from its attitude scores and demographics
    pub fn new(attitudes: [f64; N_ATTITUDES], demographics: Demographics) -> Self {
        Self {
            attitudes,
            demographics,
        }
    }

    /// Attitude scores in [`ATTITUDE_NAMES`] order
    pub fn attitudes(&self) -> &[f64; N_ATTITUDES] {
        &self.attitudes
    }

    /// Demographic attributes
    pub fn demographics(&self) -> &Demographics {
        &self.demographics
    }

    /// Level of a categorical demographic
    pub fn category(&self, attribute: CategoricalAttribute) -> u32 {
        match attribute {
            CategoricalAttribute::Gender => u32::from(self.demographics.gender),
            CategoricalAttribute::Income => u32::from(self.demographics.income),
            CategoricalAttribute::Education => u32::from(self.demographics.education),
        }
    }

    /// Every numeric attribute: attitudes followed by [`DEMOGRAPHIC_NAMES`]
    pub fn numeric_attributes(&self) -> Vec<f64> {
        let d = &self.demographics;
        let mut values = Vec::with_capacity(N_ATTITUDES + DEMOGRAPHIC_NAMES.len());
        values.extend_from_slice(&self.attitudes);
        values.extend_from_slice(&[
            f64::from(d.gender),
            f64::from(d.education),
            f64::from(d.income),
            f64::from(d.age),
        ]);
        values
    }
}

/// Names of every numeric attribute returned by [`Observation::numeric_attributes`]
pub fn numeric_attribute_names() -> Vec<&'static str> {
    ATTITUDE_NAMES
        .iter()
        .chain(DEMOGRAPHIC_NAMES.iter())
        .copied()
        .collect()
}

/// Rows of observations projected onto the attitude features.
///
/// Row order is insertion order, so row `i` always corresponds to the
/// `i`-th observation it was built from.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FeatureMatrix {
    data: Array2<f64>,
}

impl FeatureMatrix {
    /// Project observations onto their attitude scores
    pub fn from_observations(observations: &[Observation]) -> Result<Self> {
        if observations.is_empty() {
            return Err(Error::invalid_data("Data cannot be empty"));
        }

        let flat: Vec<f64> = observations
            .iter()
            .flat_map(|obs| obs.attitudes.iter().copied())
            .collect();
        let data = Array2::from_shape_vec((observations.len(), N_ATTITUDES), flat)
            .map_err(|e| Error::invalid_data(e.to_string()))?;

        Ok(Self { data })
    }

    /// Wrap an arbitrary numeric matrix (rows = respondents)
    pub fn from_array(data: Array2<f64>) -> Result<Self> {
        if data.nrows() == 0 {
            return Err(Error::invalid_data("Data cannot be empty"));
        }
        if data.ncols() == 0 {
            return Err(Error::invalid_data("Data must have at least one feature"));
        }
        if data.iter().any(|v| !v.is_finite()) {
            return Err(Error::invalid_data("Data contains non-finite values"));
        }
        Ok(Self { data })
    }

    /// Borrow the underlying matrix
    pub fn view(&self) -> ArrayView2<'_, f64> {
        self.data.view()
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

/// Column of a numeric demographic, aligned with the observations
pub fn age_column(observations: &[Observation]) -> Array1<f64> {
    observations
        .iter()
        .map(|obs| f64::from(obs.demographics.age))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(attitudes: [f64; 7], gender: u8, education: u8, income: u8, age: u32) -> Observation {
        Observation::new(
            attitudes,
            Demographics {
                gender,
                education,
                income,
                age,
            },
        )
    }

    #[test]
    fn test_feature_matrix_preserves_row_order() {
        let rows = vec![
            obs([3.0, 2.0, 3.0, 3.0, 2.0, 3.0, 3.0], 1, 2, 3, 30),
            obs([6.0, 6.0, 6.0, 6.0, 5.0, 3.0, 1.0], 0, 1, 2, 45),
        ];
        let matrix = FeatureMatrix::from_observations(&rows).unwrap();

        assert_eq!(matrix.view().dim(), (2, 7));
        assert_eq!(matrix.view()[[0, 0]], 3.0);
        assert_eq!(matrix.view()[[1, 4]], 5.0);
    }

    #[test]
    fn test_numeric_attributes_layout() {
        let o = obs([1.0; 7], 1, 4, 2, 52);
        let values = o.numeric_attributes();

        assert_eq!(values.len(), numeric_attribute_names().len());
        assert_eq!(&values[7..], &[1.0, 4.0, 2.0, 52.0]);
        assert_eq!(o.category(CategoricalAttribute::Income), 2);
    }

    #[test]
    fn test_empty_observations_rejected() {
        assert!(FeatureMatrix::from_observations(&[]).is_err());
        assert!(FeatureMatrix::from_array(Array2::zeros((0, 3))).is_err());
    }

    #[test]
    fn test_non_finite_rejected() {
        let data = Array2::from_shape_vec((2, 1), vec![1.0, f64::NAN]).unwrap();
        assert!(FeatureMatrix::from_array(data).is_err());
    }
}
