//! Type I and Type II feedback rules.
//!
//! Both rules work one block at a time. Every lane mask that reaches
//! [`WeightBlock::add_masked`] has already been restricted to the valid lanes
//! of its block, so padding weights stay at zero forever.
//!
//! These functions are reachable only through [`Ballot`](crate::Ballot),
//! which guarantees a vote was cast for the very input being fed back.

use crate::{
    Clause,
    block::{LaneMask, PackedSample, WeightBlock, valid_mask},
    utils::bernoulli_mask
};

/// # Overview
///
/// Type I update of one block.
///
/// `radical` lanes were drawn with probability `1 - 1/s`, `conservative`
/// lanes independently with probability `1/s`.
///
/// When the clause fired: active inputs strengthen the positive literal
/// radically and weaken the negative one conservatively; inactive inputs do
/// the mirror image. When it did not fire: positive literals decay where
/// conservative is set, negative literals where radical is clear.
#[inline]
pub(crate) fn type_i_block(
    positive: &mut WeightBlock,
    negative: &mut WeightBlock,
    activations: LaneMask,
    valid: LaneMask,
    fired: bool,
    radical: LaneMask,
    conservative: LaneMask
) {
    let radical = radical & valid;
    let conservative = conservative & valid;

    if fired {
        let active = activations & valid;
        let inactive = !activations & valid;

        positive.add_masked(radical & active, 1);
        negative.add_masked(conservative & active, -1);
        negative.add_masked(radical & inactive, 1);
        positive.add_masked(conservative & inactive, -1);
    } else {
        positive.add_masked(conservative, -1);
        negative.add_masked(!radical & valid, -1);
    }
}

/// # Overview
///
/// Type II update of one block: excluded literals that would have blocked
/// this input step one toward inclusion.
#[inline]
pub(crate) fn type_ii_block(
    positive: &mut WeightBlock,
    negative: &mut WeightBlock,
    activations: LaneMask,
    valid: LaneMask
) {
    let active = activations & valid;
    let inactive = !activations & valid;

    let grow_positive = !positive.inclusion_mask() & inactive;
    let grow_negative = !negative.inclusion_mask() & active;

    positive.add_masked(grow_positive, 1);
    negative.add_masked(grow_negative, 1);
}

/// # Overview
///
/// Type I feedback: reinforces literals consistent with the input when the
/// clause fired, decays all literals when it did not.
pub(crate) fn type_i(clause: &mut Clause, input: &PackedSample, fired: bool) {
    let len = clause.literal_count();
    let (radical_t, conservative_t) = clause.thresholds();
    let (positive, negative, rng) = clause.parts_mut();

    for (block, ((pos, neg), &act)) in positive
        .iter_mut()
        .zip(negative.iter_mut())
        .zip(input.activations())
        .enumerate()
    {
        let valid = valid_mask(len, block);
        let radical = bernoulli_mask(rng, radical_t, valid);
        let conservative = bernoulli_mask(rng, conservative_t, valid);
        type_i_block(pos, neg, act, valid, fired, radical, conservative);
    }
}

/// # Overview
///
/// Type II feedback: specializes a clause that fired. No-op otherwise.
pub(crate) fn type_ii(clause: &mut Clause, input: &PackedSample, fired: bool) {
    if !fired {
        return;
    }
    let len = clause.literal_count();
    let (positive, negative, _) = clause.parts_mut();

    for (block, ((pos, neg), &act)) in positive
        .iter_mut()
        .zip(negative.iter_mut())
        .zip(input.activations())
        .enumerate()
    {
        type_ii_block(pos, neg, act, valid_mask(len, block));
    }
}
