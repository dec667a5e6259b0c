//! Property-based tests for the multigranular Tsetlin Machine.

use granular_tsetlin::{
    Clause, ClauseModel, FeedbackOdds, MachineArgs, PackedSample, Polarity, Rule, argmax,
    block::{LANES, block_count, boundary_mask, pack_weights, unpack_weights},
    discretize,
    utils::rng_from_seed
};
use proptest::prelude::*;

/// Input row plus clause weights (positive ++ negative) of matching length.
fn row_and_weights(max_len: usize) -> impl Strategy<Value = (Vec<u8>, Vec<i32>)> {
    (1..max_len).prop_flat_map(|len| {
        (
            prop::collection::vec(0u8..=1, len),
            prop::collection::vec(-3i32..3, 2 * len)
        )
    })
}

fn clause_with(weights: &[i32], seed: u64) -> Clause {
    let mut clause = Clause::new(
        0,
        Polarity::Positive,
        weights.len() / 2,
        4.0,
        rng_from_seed(seed)
    );
    clause
        .import_model(&ClauseModel {
            no:       0,
            literals: weights.to_vec()
        })
        .unwrap();
    clause
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Voting never changes weights, and evaluating twice agrees.
    #[test]
    fn vote_is_pure((x, weights) in row_and_weights(48), seed in any::<u64>()) {
        let mut clause = clause_with(&weights, seed);
        let input = PackedSample::pack(&x);

        let first = clause.evaluate(&input);
        let ballot = clause.vote(&input);
        prop_assert_eq!(ballot.fired(), first);
        drop(ballot);

        prop_assert_eq!(clause.evaluate(&input), first);
        prop_assert_eq!(clause.export_model().literals, weights);
    }

    /// Garbage in the padding lanes of the last block never changes a vote.
    #[test]
    fn padding_is_ignored((x, weights) in row_and_weights(40), noise in any::<u16>()) {
        let clause = clause_with(&weights, 1);
        let clean = PackedSample::pack(&x);

        let mut masks = clean.activations().to_vec();
        if let Some(last) = masks.last_mut() {
            *last |= noise & !boundary_mask(x.len());
        }
        let dirty = PackedSample::from_masks(masks, x.len());

        prop_assert_eq!(clause.evaluate(&dirty), clause.evaluate(&clean));
    }

    /// Packed evaluation agrees with the extracted rule on the unpacked row.
    #[test]
    fn evaluate_matches_rule((x, weights) in row_and_weights(40)) {
        let clause = clause_with(&weights, 2);
        let rule = Rule::from_model(&clause.export_model(), Polarity::Positive);

        prop_assert_eq!(clause.evaluate(&PackedSample::pack(&x)), rule.matches(&x));
    }

    /// Weights survive packing for any length.
    #[test]
    fn weights_pack_round_trip(weights in prop::collection::vec(any::<i32>(), 0..70)) {
        let blocks = pack_weights(&weights);
        prop_assert_eq!(blocks.len(), block_count(weights.len()));
        prop_assert_eq!(unpack_weights(&blocks, weights.len()), weights);
    }

    /// The boundary mask covers exactly the live lanes of the last block.
    #[test]
    fn boundary_mask_popcount(len in 1usize..200) {
        let live = match len % LANES {
            0 => LANES,
            r => r
        };
        prop_assert_eq!(boundary_mask(len).count_ones() as usize, live);
    }

    /// Clause specificities rise from s_low and stay below s_high.
    #[test]
    fn specificity_is_monotone(
        clauses in 1usize..64,
        low in 1.0f64..10.0,
        spread in 0.0f64..20.0
    ) {
        let args = MachineArgs::builder()
            .inputs(4)
            .outputs(1)
            .clauses(clauses)
            .specificity(low, low + spread)
            .build()
            .unwrap();

        prop_assert_eq!(args.specificity(0), low);
        for i in 1..clauses {
            prop_assert!(args.specificity(i) >= args.specificity(i - 1));
            prop_assert!(args.specificity(i) <= low + spread);
        }
    }

    /// Feedback probabilities are complementary for any margin.
    #[test]
    fn feedback_odds_complement(margin in -100i32..100, threshold in 1i32..50) {
        let odds = FeedbackOdds::new(margin, threshold, 0.0);

        prop_assert!((odds.feedback0 + odds.feedback1 - 1.0).abs() < 1e-12);
        prop_assert!((0.0..=1.0).contains(&odds.feedback0));
        prop_assert!((0.0..=1.0).contains(&odds.feedback1));
    }

    /// Argmax picks a maximum when one is positive, class 0 otherwise.
    #[test]
    fn argmax_picks_positive_maximum(conf in prop::collection::vec(-1.0f64..1.0, 1..10)) {
        let winner = argmax(&conf);
        let max = conf.iter().copied().fold(f64::MIN, f64::max);

        if max > 0.0 {
            prop_assert_eq!(conf[winner], max);
            prop_assert!(conf[..winner].iter().all(|&c| c < max));
        } else {
            prop_assert_eq!(winner, 0);
        }
    }

    /// Discretization always yields exactly one hot tier.
    #[test]
    fn discretize_is_one_hot(
        mut cuts in prop::collection::vec(-5.0f64..5.0, 0..6),
        value in -10.0f64..10.0
    ) {
        cuts.sort_by(f64::total_cmp);
        let row = discretize(&cuts, value);

        prop_assert_eq!(row.len(), cuts.len() + 1);
        prop_assert_eq!(row.iter().filter(|&&b| b == 1).count(), 1);
    }
}
