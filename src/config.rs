//! Machine configuration and builder.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// # Overview
///
/// Hyperparameters of a [`Machine`](crate::Machine).
///
/// `clause_per_output` counts the clauses of one polarity: every class owns
/// `clause_per_output` positive and `clause_per_output` negative clauses.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MachineArgs {
    pub input_size:        usize,
    pub output_size:       usize,
    pub clause_per_output: usize,
    pub threshold:         i32,
    pub s_low:             f64,
    pub s_high:            f64,
    pub dropout_ratio:     f64,
    pub tier_tags:         Option<Vec<String>>
}

impl MachineArgs {
    /// # Overview
    ///
    /// Creates a new MachineArgsBuilder.
    #[inline]
    #[must_use]
    pub fn builder() -> MachineArgsBuilder {
        MachineArgsBuilder::default()
    }

    /// # Overview
    ///
    /// Validates configuration parameters.
    pub fn validate(&self) -> Result<()> {
        if self.input_size == 0 {
            return Err(Error::MissingInputSize);
        }
        if self.output_size == 0 {
            return Err(Error::MissingOutputSize);
        }
        if self.clause_per_output == 0 {
            return Err(Error::MissingClauses);
        }
        if self.threshold <= 0 {
            return Err(Error::InvalidThreshold);
        }
        for s in [self.s_low, self.s_high] {
            if !s.is_finite() || s < 1.0 {
                return Err(Error::InvalidSpecificity);
            }
        }
        if !(0.0..1.0).contains(&self.dropout_ratio) {
            return Err(Error::InvalidDropout);
        }
        match &self.tier_tags {
            Some(tags) if tags.len() != self.output_size => Err(Error::TierTagCount {
                expected: self.output_size,
                got:      tags.len()
            }),
            _ => Ok(())
        }
    }

    /// # Overview
    ///
    /// Specificity of clause `index`, interpolated linearly from `s_low`
    /// toward `s_high` across the clauses of one polarity.
    ///
    /// # Examples
    ///
    /// ```
    /// use granular_tsetlin::MachineArgs;
    ///
    /// let args = MachineArgs::builder()
    ///     .inputs(8)
    ///     .outputs(2)
    ///     .clauses(4)
    ///     .specificity(2.0, 6.0)
    ///     .build()
    ///     .unwrap();
    ///
    /// assert_eq!(args.specificity(0), 2.0);
    /// assert_eq!(args.specificity(2), 4.0);
    /// ```
    #[inline]
    #[must_use]
    pub fn specificity(&self, index: usize) -> f64 {
        self.s_low + index as f64 * (self.s_high - self.s_low) / self.clause_per_output as f64
    }

    /// # Overview
    ///
    /// Compares every hyperparameter except tier tags, which are labels
    /// and never affect learning.
    #[must_use]
    pub fn is_compatible(&self, other: &Self) -> bool {
        self.input_size == other.input_size
            && self.output_size == other.output_size
            && self.clause_per_output == other.clause_per_output
            && self.threshold == other.threshold
            && self.s_low == other.s_low
            && self.s_high == other.s_high
            && self.dropout_ratio == other.dropout_ratio
    }

    /// # Overview
    ///
    /// Human-readable label of class `class`, falling back to its index.
    #[must_use]
    pub fn tier_tag(&self, class: usize) -> String {
        self.tier_tags
            .as_ref()
            .and_then(|tags| tags.get(class).cloned())
            .unwrap_or_else(|| format!("class{class}"))
    }
}

/// # Overview
///
/// Builder for MachineArgs with validation.
///
/// Defaults: `threshold = 4`, `s_low = s_high = 4.0`, `dropout = 0.0`.
#[derive(Debug, Default)]
pub struct MachineArgsBuilder {
    input_size:        Option<usize>,
    output_size:       Option<usize>,
    clause_per_output: Option<usize>,
    threshold:         Option<i32>,
    specificity:       Option<(f64, f64)>,
    dropout_ratio:     Option<f64>,
    tier_tags:         Option<Vec<String>>
}

impl MachineArgsBuilder {
    /// # Overview
    ///
    /// Sets the number of binary input features.
    pub fn inputs(mut self, n: usize) -> Self {
        self.input_size = Some(n);
        self
    }

    /// # Overview
    ///
    /// Sets the number of output classes.
    pub fn outputs(mut self, n: usize) -> Self {
        self.output_size = Some(n);
        self
    }

    /// # Overview
    ///
    /// Sets clauses per polarity per class.
    pub fn clauses(mut self, n: usize) -> Self {
        self.clause_per_output = Some(n);
        self
    }

    /// # Overview
    ///
    /// Sets the feedback margin threshold T.
    pub fn threshold(mut self, t: i32) -> Self {
        self.threshold = Some(t);
        self
    }

    /// # Overview
    ///
    /// Sets the specificity range spread across each class's clauses.
    pub fn specificity(mut self, low: f64, high: f64) -> Self {
        self.specificity = Some((low, high));
        self
    }

    /// # Overview
    ///
    /// Sets the per-clause dropout probability.
    pub fn dropout(mut self, ratio: f64) -> Self {
        self.dropout_ratio = Some(ratio);
        self
    }

    /// # Overview
    ///
    /// Sets one human-readable tag per class.
    pub fn tier_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>
    {
        self.tier_tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    /// # Overview
    ///
    /// Builds and validates the MachineArgs.
    pub fn build(self) -> Result<MachineArgs> {
        let (s_low, s_high) = self.specificity.unwrap_or((4.0, 4.0));
        let args = MachineArgs {
            input_size: self.input_size.ok_or(Error::MissingInputSize)?,
            output_size: self.output_size.ok_or(Error::MissingOutputSize)?,
            clause_per_output: self.clause_per_output.ok_or(Error::MissingClauses)?,
            threshold: self.threshold.unwrap_or(4),
            s_low,
            s_high,
            dropout_ratio: self.dropout_ratio.unwrap_or(0.0),
            tier_tags: self.tier_tags
        };
        args.validate()?;
        Ok(args)
    }
}
