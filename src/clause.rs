//! Clause - a conjunction of literals stored as packed signed weights.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    block::{PackedSample, WeightBlock, block_count, pack_weights, unpack_weights, valid_mask},
    error::{Error, Result},
    feedback,
    model::ClauseModel,
    utils::{FastRng, prob_to_threshold}
};

/// # Overview
///
/// Whether a clause votes for or against its class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Polarity {
    Positive,
    Negative
}

impl Polarity {
    /// # Overview
    ///
    /// `+1` or `-1`.
    #[inline(always)]
    #[must_use]
    pub const fn sign(self) -> i32 {
        match self {
            Self::Positive => 1,
            Self::Negative => -1
        }
    }
}

/// # Overview
///
/// One clause of one polarity.
///
/// Holds a positive and a negative weight per input bit. Literal `x_k` is
/// included when `positive[k] >= 0`, literal `NOT x_k` when
/// `negative[k] >= 0`. Weights start at zero, so a fresh clause includes
/// every literal.
///
/// # Examples
///
/// ```
/// use granular_tsetlin::{Clause, PackedSample, Polarity, utils::rng_from_seed};
///
/// let clause = Clause::new(0, Polarity::Positive, 2, 4.0, rng_from_seed(1));
///
/// // x_k and NOT x_k are both included, so nothing satisfies it yet
/// assert!(!clause.evaluate(&PackedSample::pack(&[1, 1])));
/// ```
#[derive(Debug, Clone)]
pub struct Clause {
    no:                     usize,
    polarity:               Polarity,
    literal_count:          usize,
    specificity:            f64,
    radical_threshold:      u32,
    conservative_threshold: u32,
    positive_literals:      Vec<WeightBlock>,
    negative_literals:      Vec<WeightBlock>,
    rng:                    FastRng
}

impl Clause {
    /// # Overview
    ///
    /// Creates a zero-initialized clause over `literal_count` input bits.
    ///
    /// `specificity` must be `>= 1.0`.
    pub fn new(
        no: usize,
        polarity: Polarity,
        literal_count: usize,
        specificity: f64,
        rng: FastRng
    ) -> Self {
        debug_assert!(specificity >= 1.0);
        let inv = 1.0 / specificity;
        let blocks = block_count(literal_count);
        Self {
            no,
            polarity,
            literal_count,
            specificity,
            radical_threshold: prob_to_threshold(1.0 - inv),
            conservative_threshold: prob_to_threshold(inv),
            positive_literals: vec![WeightBlock::ZERO; blocks],
            negative_literals: vec![WeightBlock::ZERO; blocks],
            rng
        }
    }

    #[inline(always)]
    #[must_use]
    pub fn no(&self) -> usize {
        self.no
    }

    #[inline(always)]
    #[must_use]
    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    #[inline(always)]
    #[must_use]
    pub fn literal_count(&self) -> usize {
        self.literal_count
    }

    #[inline(always)]
    #[must_use]
    pub fn specificity(&self) -> f64 {
        self.specificity
    }

    /// Integer thresholds for the radical and conservative draws.
    #[inline(always)]
    pub(crate) fn thresholds(&self) -> (u32, u32) {
        (self.radical_threshold, self.conservative_threshold)
    }

    #[inline(always)]
    pub(crate) fn parts_mut(
        &mut self
    ) -> (&mut [WeightBlock], &mut [WeightBlock], &mut FastRng) {
        (
            self.positive_literals.as_mut_slice(),
            self.negative_literals.as_mut_slice(),
            &mut self.rng
        )
    }

    /// # Overview
    ///
    /// Positive literal weights, padding stripped.
    #[must_use]
    pub fn positive_weights(&self) -> Vec<i32> {
        unpack_weights(&self.positive_literals, self.literal_count)
    }

    /// # Overview
    ///
    /// Negative literal weights, padding stripped.
    #[must_use]
    pub fn negative_weights(&self) -> Vec<i32> {
        unpack_weights(&self.negative_literals, self.literal_count)
    }

    /// # Overview
    ///
    /// Whether `input` satisfies every included literal.
    ///
    /// Pure: depends only on current weights and `input`. Padding lanes of
    /// the last block are masked out before any comparison.
    #[inline]
    #[must_use]
    pub fn evaluate(&self, input: &PackedSample) -> bool {
        debug_assert_eq!(input.len(), self.literal_count);

        self.positive_literals
            .iter()
            .zip(&self.negative_literals)
            .zip(input.activations())
            .enumerate()
            .all(|(block, ((pos, neg), &act))| {
                let valid = valid_mask(self.literal_count, block);
                let active = act & valid;
                let inactive = !act & valid;
                ((pos.inclusion_mask() & inactive) | (neg.inclusion_mask() & active)) == 0
            })
    }

    /// # Overview
    ///
    /// Casts a vote on `input` and returns the ballot that carries it.
    ///
    /// Feedback for this input can only be given through the returned
    /// [`Ballot`], which holds the clause exclusively until consumed or
    /// dropped.
    #[inline]
    pub fn vote<'c, 'x>(&'c mut self, input: &'x PackedSample) -> Ballot<'c, 'x> {
        let fired = self.evaluate(input);
        Ballot {
            clause: self,
            input,
            fired
        }
    }

    /// # Overview
    ///
    /// Snapshot of this clause's weights.
    #[must_use]
    pub fn export_model(&self) -> ClauseModel {
        let mut literals = self.positive_weights();
        literals.extend(self.negative_weights());
        ClauseModel {
            no: self.no,
            literals
        }
    }

    /// # Overview
    ///
    /// Checks that `model` fits this clause without touching any weight.
    pub fn check_model(&self, model: &ClauseModel) -> Result<()> {
        if model.no != self.no {
            return Err(Error::ClauseTagMismatch {
                expected: self.no,
                got:      model.no
            });
        }
        if model.literals.len() != 2 * self.literal_count {
            return Err(Error::LiteralCountMismatch {
                clause:   self.no,
                expected: 2 * self.literal_count,
                got:      model.literals.len()
            });
        }
        Ok(())
    }

    /// # Overview
    ///
    /// Restores weights from a snapshot taken by [`Clause::export_model`].
    pub fn import_model(&mut self, model: &ClauseModel) -> Result<()> {
        self.check_model(model)?;
        let (positive, negative) = model.literals.split_at(self.literal_count);
        self.positive_literals = pack_weights(positive);
        self.negative_literals = pack_weights(negative);
        Ok(())
    }
}

/// # Overview
///
/// The outcome of one [`Clause::vote`], bound to the clause and input that
/// produced it.
///
/// Feedback consumes the ballot, so each vote drives at most one update and
/// no update can happen without a vote.
#[derive(Debug)]
#[must_use = "dropping a ballot discards the vote"]
pub struct Ballot<'c, 'x> {
    clause: &'c mut Clause,
    input:  &'x PackedSample,
    fired:  bool
}

impl Ballot<'_, '_> {
    #[inline(always)]
    #[must_use]
    pub fn fired(&self) -> bool {
        self.fired
    }

    /// # Overview
    ///
    /// `1` when the clause fired, `0` otherwise.
    #[inline(always)]
    #[must_use]
    pub fn value(&self) -> i32 {
        i32::from(self.fired)
    }

    #[inline(always)]
    #[must_use]
    pub fn clause(&self) -> &Clause {
        self.clause
    }

    /// # Overview
    ///
    /// Applies Type I feedback for the voted input.
    #[inline]
    pub fn type_i(self) {
        feedback::type_i(self.clause, self.input, self.fired);
    }

    /// # Overview
    ///
    /// Applies Type II feedback for the voted input.
    #[inline]
    pub fn type_ii(self) {
        feedback::type_ii(self.clause, self.input, self.fired);
    }
}
