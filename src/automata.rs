//! Automata - the per-class voting ensemble and its feedback routing.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    Clause, MachineArgs, Polarity,
    block::PackedSample,
    error::{Error, Result},
    feedback,
    model::AutomataModel,
    utils::{FastRng, bernoulli, fork}
};

/// # Overview
///
/// Read-only view of a training set for one class: the shared packed
/// samples and this class's 0/1 targets, in the same order.
#[derive(Debug, Clone, Copy)]
pub struct TrainingView<'a> {
    pub samples: &'a [PackedSample],
    pub targets: &'a [u8]
}

/// # Overview
///
/// One-class prediction for one sample.
///
/// `confidence` is the margin divided by the clause count of one polarity,
/// so it lies in `[-1, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Prediction {
    pub result:     u8,
    pub confidence: f64
}

/// # Overview
///
/// Feedback probabilities derived from one margin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeedbackOdds {
    /// Probability of feeding back on a class-present target.
    pub feedback0: f64,
    /// Probability of feeding back on a class-absent target.
    pub feedback1: f64,
    /// Probability that a clause survives dropout.
    pub survival:  f64
}

impl FeedbackOdds {
    /// # Overview
    ///
    /// Clamps `margin` to `[-T, T]` and rescales it to the two feedback
    /// probabilities.
    #[inline]
    #[must_use]
    pub fn new(margin: i32, threshold: i32, dropout_ratio: f64) -> Self {
        let clamped = margin.clamp(-threshold, threshold) as f64;
        let t = threshold as f64;
        let inv_2t = 1.0 / (2.0 * t);
        Self {
            feedback0: (t - clamped) * inv_2t,
            feedback1: (t + clamped) * inv_2t,
            survival:  1.0 - dropout_ratio
        }
    }
}

/// # Overview
///
/// Ensemble of `N` positive and `N` negative clauses for one class.
///
/// Clause `i` of each polarity gets specificity
/// `s_low + i * (s_high - s_low) / N`, so the ensemble spans coarse to fine
/// patterns.
///
/// # Examples
///
/// ```
/// use granular_tsetlin::{Automata, MachineArgs, PackedSample, utils::rng_from_seed};
///
/// let args = MachineArgs::builder().inputs(2).outputs(1).clauses(4).build().unwrap();
/// let automata = Automata::new(0, &args, rng_from_seed(7));
///
/// // every fresh clause is blocked, so the margin starts at zero
/// assert_eq!(automata.score(&PackedSample::pack(&[1, 0])), 0);
/// ```
#[derive(Debug, Clone)]
pub struct Automata {
    no:            usize,
    threshold:     i32,
    dropout_ratio: f64,
    rng:           FastRng,
    positive:      Vec<Clause>,
    negative:      Vec<Clause>,
    /// Votes of the last forward pass, positive clauses first.
    votes:         Vec<bool>
}

impl Automata {
    /// # Overview
    ///
    /// Creates the ensemble for class `no`. Every clause receives its own
    /// engine forked from `rng`.
    pub fn new(no: usize, args: &MachineArgs, mut rng: FastRng) -> Self {
        let n = args.clause_per_output;
        let mut positive = Vec::with_capacity(n);
        let mut negative = Vec::with_capacity(n);

        for i in 0..n {
            let s = args.specificity(i);
            positive.push(Clause::new(
                i,
                Polarity::Positive,
                args.input_size,
                s,
                fork(&mut rng)
            ));
            negative.push(Clause::new(
                i,
                Polarity::Negative,
                args.input_size,
                s,
                fork(&mut rng)
            ));
        }

        Self {
            no,
            threshold: args.threshold,
            dropout_ratio: args.dropout_ratio,
            rng,
            positive,
            negative,
            votes: vec![false; 2 * n]
        }
    }

    #[inline(always)]
    #[must_use]
    pub fn no(&self) -> usize {
        self.no
    }

    /// # Overview
    ///
    /// Clauses per polarity.
    #[inline(always)]
    #[must_use]
    pub fn clause_count(&self) -> usize {
        self.positive.len()
    }

    #[inline(always)]
    #[must_use]
    pub fn positive_clauses(&self) -> &[Clause] {
        &self.positive
    }

    #[inline(always)]
    #[must_use]
    pub fn negative_clauses(&self) -> &[Clause] {
        &self.negative
    }

    /// # Overview
    ///
    /// Margin for `input` without casting ballots: positive votes minus
    /// negative votes, in `[-N, N]`.
    #[inline]
    #[must_use]
    pub fn score(&self, input: &PackedSample) -> i32 {
        let pos = self.positive.iter().filter(|c| c.evaluate(input)).count() as i32;
        let neg = self.negative.iter().filter(|c| c.evaluate(input)).count() as i32;
        pos - neg
    }

    /// # Overview
    ///
    /// Every clause votes on `input`. The returned [`Forward`] holds the
    /// votes and the margin; call [`Forward::backward`] to route feedback.
    ///
    /// Votes go into a buffer owned by the automata, so a training pass does
    /// not allocate per sample.
    pub fn forward<'a, 'x>(&'a mut self, input: &'x PackedSample) -> Forward<'a, 'x> {
        let Self {
            threshold,
            dropout_ratio,
            rng,
            positive,
            negative,
            votes,
            ..
        } = self;

        let mut margin = 0;
        for (vote, clause) in votes.iter_mut().zip(positive.iter().chain(negative.iter())) {
            *vote = clause.evaluate(input);
            margin += clause.polarity().sign() * i32::from(*vote);
        }

        Forward {
            margin,
            threshold: *threshold,
            dropout_ratio: *dropout_ratio,
            rng,
            input,
            positive,
            negative,
            votes
        }
    }

    /// # Overview
    ///
    /// One pass over the view in dataset order: `forward` then `backward`
    /// per sample.
    pub fn learn(&mut self, view: TrainingView<'_>) {
        debug_assert_eq!(view.samples.len(), view.targets.len());
        for (sample, &target) in view.samples.iter().zip(view.targets) {
            self.forward(sample).backward(target);
        }
    }

    /// # Overview
    ///
    /// Predicts class membership for every sample of `batch`.
    #[must_use]
    pub fn predict(&self, batch: &[PackedSample]) -> Vec<Prediction> {
        let n = self.clause_count() as f64;
        batch
            .iter()
            .map(|sample| {
                let margin = self.score(sample);
                Prediction {
                    result:     u8::from(margin > 0),
                    confidence: margin as f64 / n
                }
            })
            .collect()
    }

    /// # Overview
    ///
    /// Snapshot of every clause.
    #[must_use]
    pub fn export_model(&self) -> AutomataModel {
        AutomataModel {
            no:               self.no,
            positive_clauses: self.positive.iter().map(Clause::export_model).collect(),
            negative_clauses: self.negative.iter().map(Clause::export_model).collect()
        }
    }

    /// # Overview
    ///
    /// Checks that `model` fits this automata without touching any weight.
    pub fn check_model(&self, model: &AutomataModel) -> Result<()> {
        if model.no != self.no {
            return Err(Error::AutomataTagMismatch {
                expected: self.no,
                got:      model.no
            });
        }
        for clauses in [&model.positive_clauses, &model.negative_clauses] {
            if clauses.len() != self.clause_count() {
                return Err(Error::ClauseCountMismatch {
                    automata: self.no,
                    expected: self.clause_count(),
                    got:      clauses.len()
                });
            }
        }
        let live = self.positive.iter().chain(&self.negative);
        let stored = model.positive_clauses.iter().chain(&model.negative_clauses);
        for (clause, clause_model) in live.zip(stored) {
            clause.check_model(clause_model)?;
        }
        Ok(())
    }

    /// # Overview
    ///
    /// Restores every clause. Nothing is written unless the whole model
    /// passes [`Automata::check_model`].
    pub fn import_model(&mut self, model: &AutomataModel) -> Result<()> {
        self.check_model(model)?;
        let live = self.positive.iter_mut().chain(self.negative.iter_mut());
        let stored = model.positive_clauses.iter().chain(&model.negative_clauses);
        for (clause, clause_model) in live.zip(stored) {
            clause.import_model(clause_model)?;
        }
        Ok(())
    }
}

/// # Overview
///
/// Votes of one forward pass, waiting for the target.
///
/// Holds the automata exclusively, so no other vote can intervene between
/// `forward` and `backward`.
#[derive(Debug)]
#[must_use = "call backward() to apply feedback"]
pub struct Forward<'a, 'x> {
    margin:        i32,
    threshold:     i32,
    dropout_ratio: f64,
    rng:           &'a mut FastRng,
    input:         &'x PackedSample,
    positive:      &'a mut [Clause],
    negative:      &'a mut [Clause],
    votes:         &'a [bool]
}

impl Forward<'_, '_> {
    /// # Overview
    ///
    /// Positive votes minus negative votes.
    #[inline(always)]
    #[must_use]
    pub fn margin(&self) -> i32 {
        self.margin
    }

    /// # Overview
    ///
    /// Routes stochastic feedback for target `target` (0 or 1).
    ///
    /// Per clause pair, three independent draws: action 0 with
    /// `feedback0`, action 1 with `feedback1`, survival with
    /// `1 - dropout`. A class-present target with action 0 gives Type I to
    /// the positive clause and Type II to the negative one; a class-absent
    /// target with action 1 swaps the roles.
    pub fn backward(self, target: u8) {
        let odds = FeedbackOdds::new(self.margin, self.threshold, self.dropout_ratio);
        let Self {
            rng,
            input,
            positive,
            negative,
            votes,
            ..
        } = self;
        let (pos_votes, neg_votes) = votes.split_at(positive.len());

        for ((pos, &pos_fired), (neg, &neg_fired)) in positive
            .iter_mut()
            .zip(pos_votes)
            .zip(negative.iter_mut().zip(neg_votes))
        {
            let action0 = bernoulli(rng, odds.feedback0);
            let action1 = bernoulli(rng, odds.feedback1);
            let survives = bernoulli(rng, odds.survival);

            if !survives {
                continue;
            }
            if target == 1 && action0 {
                feedback::type_i(pos, input, pos_fired);
                feedback::type_ii(neg, input, neg_fired);
            } else if target == 0 && action1 {
                feedback::type_ii(pos, input, pos_fired);
                feedback::type_i(neg, input, neg_fired);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{model::ClauseModel, utils::rng_from_seed};

    fn args(clauses: usize) -> MachineArgs {
        MachineArgs::builder()
            .inputs(2)
            .outputs(1)
            .clauses(clauses)
            .threshold(4)
            .build()
            .unwrap()
    }

    /// Sets every clause to `literals` (2 bits: [p0, p1, n0, n1]).
    fn set_all(automata: &mut Automata, positive: [i32; 4], negative: [i32; 4]) {
        let mut model = automata.export_model();
        for c in &mut model.positive_clauses {
            c.literals = positive.to_vec();
        }
        for c in &mut model.negative_clauses {
            c.literals = negative.to_vec();
        }
        automata.import_model(&model).unwrap();
    }

    #[test]
    fn odds_follow_margin() {
        let odds = FeedbackOdds::new(0, 4, 0.0);
        assert_eq!(odds.feedback0, 0.5);
        assert_eq!(odds.feedback1, 0.5);

        let confident = FeedbackOdds::new(9, 4, 0.25);
        assert_eq!(confident.feedback0, 0.0);
        assert_eq!(confident.feedback1, 1.0);
        assert_eq!(confident.survival, 0.75);

        let opposed = FeedbackOdds::new(-2, 4, 0.0);
        assert_eq!(opposed.feedback0, 0.75);
        assert_eq!(opposed.feedback1, 0.25);
    }

    #[test]
    fn multigranular_clauses() {
        let args = MachineArgs::builder()
            .inputs(2)
            .outputs(1)
            .clauses(5)
            .specificity(2.0, 7.0)
            .build()
            .unwrap();
        let automata = Automata::new(0, &args, rng_from_seed(1));

        let s: Vec<f64> = automata.positive_clauses().iter().map(Clause::specificity).collect();
        assert_eq!(s, vec![2.0, 3.0, 4.0, 5.0, 6.0]);
        for (p, n) in automata.positive_clauses().iter().zip(automata.negative_clauses()) {
            assert_eq!(p.specificity(), n.specificity());
            assert_eq!(n.polarity(), Polarity::Negative);
        }
    }

    #[test]
    fn margin_counts_both_polarities() {
        let mut automata = Automata::new(0, &args(3), rng_from_seed(1));
        // positive clauses: x0 AND x1; negative clauses: NOT x0
        set_all(&mut automata, [0, 0, -1, -1], [-1, -1, 0, -1]);

        assert_eq!(automata.score(&PackedSample::pack(&[1, 1])), 3);
        assert_eq!(automata.score(&PackedSample::pack(&[0, 1])), -3);
        assert_eq!(automata.score(&PackedSample::pack(&[1, 0])), 0);

        let x = PackedSample::pack(&[1, 1]);
        assert_eq!(automata.forward(&x).margin(), 3);
    }

    #[test]
    fn forward_margin_matches_score() {
        let mut automata = Automata::new(0, &args(3), rng_from_seed(2));
        set_all(&mut automata, [0, -1, -1, -1], [-1, 0, -1, -1]);

        for row in [[0, 0], [0, 1], [1, 0], [1, 1]] {
            let x = PackedSample::pack(&row);
            let score = automata.score(&x);
            let forward = automata.forward(&x);
            assert_eq!(forward.margin(), score);
            forward.backward(u8::from(score <= 0));
        }
        assert_eq!(automata.votes.len(), 6);
    }

    #[test]
    fn predict_normalizes_confidence() {
        let mut automata = Automata::new(0, &args(4), rng_from_seed(1));
        set_all(&mut automata, [0, 0, -1, -1], [-1, -1, 0, -1]);

        let batch = [PackedSample::pack(&[1, 1]), PackedSample::pack(&[0, 0])];
        let predictions = automata.predict(&batch);

        assert_eq!(
            predictions[0],
            Prediction {
                result:     1,
                confidence: 1.0
            }
        );
        assert_eq!(predictions[1].result, 0);
        assert_eq!(predictions[1].confidence, -1.0);
    }

    #[test]
    fn confident_target_gets_no_feedback() {
        let mut automata = Automata::new(0, &args(4), rng_from_seed(3));
        set_all(&mut automata, [0, 0, -1, -1], [-1, -1, 0, -1]);
        let before = automata.export_model();
        let x = PackedSample::pack(&[1, 1]);

        // margin 4 == T: feedback0 is exactly zero
        for _ in 0..50 {
            automata.forward(&x).backward(1);
        }
        assert_eq!(automata.export_model(), before);
    }

    #[test]
    fn dropout_suppresses_feedback() {
        let args = MachineArgs::builder()
            .inputs(2)
            .outputs(1)
            .clauses(2)
            .dropout(0.0)
            .build()
            .unwrap();
        let mut automata = Automata::new(0, &args, rng_from_seed(3));
        automata.dropout_ratio = 1.0;
        let before = automata.export_model();

        let x = PackedSample::pack(&[0, 1]);
        for _ in 0..50 {
            automata.forward(&x).backward(1);
        }
        assert_eq!(automata.export_model(), before);
    }

    #[test]
    fn learning_moves_weights() {
        let mut automata = Automata::new(0, &args(4), rng_from_seed(11));
        let samples = [PackedSample::pack(&[0, 1]), PackedSample::pack(&[1, 1])];
        let before = automata.export_model();

        automata.learn(TrainingView {
            samples: &samples,
            targets: &[1, 0]
        });
        assert_ne!(automata.export_model(), before);
    }

    #[test]
    fn learns_single_bit() {
        let mut automata = Automata::new(0, &args(6), rng_from_seed(5));
        let samples = [
            PackedSample::pack(&[0, 0]),
            PackedSample::pack(&[0, 1]),
            PackedSample::pack(&[1, 0]),
            PackedSample::pack(&[1, 1])
        ];
        let targets = [0, 0, 1, 1];

        for _ in 0..300 {
            automata.learn(TrainingView {
                samples: &samples,
                targets: &targets
            });
        }

        let predictions = automata.predict(&samples);
        let results: Vec<u8> = predictions.iter().map(|p| p.result).collect();
        assert_eq!(results, targets);
    }

    #[test]
    fn same_seed_same_weights() {
        let samples = [PackedSample::pack(&[0, 1]), PackedSample::pack(&[1, 0])];
        let view = TrainingView {
            samples: &samples,
            targets: &[1, 0]
        };
        let mut a = Automata::new(0, &args(4), rng_from_seed(9));
        let mut b = Automata::new(0, &args(4), rng_from_seed(9));

        for _ in 0..20 {
            a.learn(view);
            b.learn(view);
        }
        assert_eq!(a.export_model(), b.export_model());
    }

    #[test]
    fn import_checks_before_writing() {
        let mut automata = Automata::new(2, &args(2), rng_from_seed(1));
        let before = automata.export_model();

        let mut wrong_tag = before.clone();
        wrong_tag.no = 0;
        assert!(matches!(
            automata.import_model(&wrong_tag),
            Err(Error::AutomataTagMismatch {
                expected: 2,
                got:      0
            })
        ));

        let mut short = before.clone();
        short.negative_clauses.pop();
        assert!(matches!(
            automata.import_model(&short),
            Err(Error::ClauseCountMismatch { .. })
        ));

        // first clause valid, last one broken: nothing may change
        let mut partial = before.clone();
        partial.positive_clauses[0].literals = vec![-9; 4];
        partial.negative_clauses[1] = ClauseModel {
            no:       1,
            literals: vec![0; 3]
        };
        assert!(automata.import_model(&partial).is_err());
        assert_eq!(automata.export_model(), before);
    }
}
