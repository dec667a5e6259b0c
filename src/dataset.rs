//! Dataset preparation: train/test splits and response discretization.

use rand::Rng;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    error::{Error, Result},
    utils::bernoulli
};

/// # Overview
///
/// One-hot row of length `classes` with a 1 at `class`.
///
/// # Panics
///
/// Panics if `class >= classes`.
#[must_use]
pub fn one_hot(class: usize, classes: usize) -> Vec<u8> {
    let mut row = vec![0; classes];
    row[class] = 1;
    row
}

/// # Overview
///
/// Converts sample-major rows to class-major 0/1 columns. Any value `> 0`
/// becomes 1.
///
/// # Panics
///
/// Panics if any row is shorter than `columns`.
#[must_use]
pub fn transpose(rows: &[Vec<u8>], columns: usize) -> Vec<Vec<u8>> {
    (0..columns)
        .map(|col| rows.iter().map(|row| u8::from(row[col] > 0)).collect())
        .collect()
}

/// # Overview
///
/// Cut points that split `values` into `classes` tiers of roughly equal
/// size. Returns `classes - 1` ascending thresholds.
///
/// # Examples
///
/// ```
/// use granular_tsetlin::fair_thresholds;
///
/// let cuts = fair_thresholds(&[0.9, 0.1, 0.5, 0.3, 0.7, 0.2], 3).unwrap();
/// assert_eq!(cuts, vec![0.3, 0.7]);
/// ```
pub fn fair_thresholds(values: &[f64], classes: usize) -> Result<Vec<f64>> {
    if values.is_empty() {
        return Err(Error::EmptyDataset);
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let n = sorted.len();
    Ok((1..classes).map(|i| sorted[i * n / classes]).collect())
}

/// # Overview
///
/// One-hot tier of `value` against ascending `thresholds`: tier `i` holds
/// values in `[thresholds[i - 1], thresholds[i])`.
///
/// ```
/// use granular_tsetlin::discretize;
///
/// assert_eq!(discretize(&[0.3, 0.7], 0.1), vec![1, 0, 0]);
/// assert_eq!(discretize(&[0.3, 0.7], 0.3), vec![0, 1, 0]);
/// assert_eq!(discretize(&[0.3, 0.7], 0.95), vec![0, 0, 1]);
/// ```
#[must_use]
pub fn discretize(thresholds: &[f64], value: f64) -> Vec<u8> {
    let tier = thresholds.iter().take_while(|&&t| value >= t).count();
    one_hot(tier, thresholds.len() + 1)
}

/// # Overview
///
/// Train and test partitions ready for [`Machine::load`](crate::Machine::load).
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Dataset {
    pub train_data:          Vec<Vec<u8>>,
    pub train_response:      Vec<Vec<u8>>,
    pub test_data:           Vec<Vec<u8>>,
    pub test_response:       Vec<Vec<u8>>,
    /// Cut points used to discretize a continuous response, if any.
    pub response_thresholds: Vec<f64>
}

impl Dataset {
    /// # Overview
    ///
    /// Sends each sample to the training set with probability `train_ratio`,
    /// otherwise to the test set. Sample order is preserved.
    pub fn split<R: Rng>(
        data: Vec<Vec<u8>>,
        response: Vec<Vec<u8>>,
        train_ratio: f64,
        rng: &mut R
    ) -> Result<Self> {
        if !(0.0..=1.0).contains(&train_ratio) {
            return Err(Error::InvalidRatio);
        }
        if data.len() != response.len() {
            return Err(Error::SampleCountMismatch {
                data:     data.len(),
                response: response.len()
            });
        }

        let mut dataset = Self::default();
        for (x, y) in data.into_iter().zip(response) {
            if bernoulli(rng, train_ratio) {
                dataset.train_data.push(x);
                dataset.train_response.push(y);
            } else {
                dataset.test_data.push(x);
                dataset.test_response.push(y);
            }
        }

        info!(
            train = dataset.train_size(),
            test = dataset.test_size(),
            "dataset split"
        );
        Ok(dataset)
    }

    /// # Overview
    ///
    /// Discretizes a continuous response into `classes` equally populated
    /// tiers, then splits as [`Dataset::split`] does.
    pub fn from_values<R: Rng>(
        data: Vec<Vec<u8>>,
        values: &[f64],
        classes: usize,
        train_ratio: f64,
        rng: &mut R
    ) -> Result<Self> {
        let thresholds = fair_thresholds(values, classes)?;
        let response = values.iter().map(|&v| discretize(&thresholds, v)).collect();

        let mut dataset = Self::split(data, response, train_ratio, rng)?;
        dataset.response_thresholds = thresholds;
        Ok(dataset)
    }

    #[inline]
    #[must_use]
    pub fn train_size(&self) -> usize {
        self.train_data.len()
    }

    #[inline]
    #[must_use]
    pub fn test_size(&self) -> usize {
        self.test_data.len()
    }
}
