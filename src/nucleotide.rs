//! Nucleotide sequences as Tsetlin inputs.
//!
//! Every base becomes a 4-bit one-hot word, so a sequence of length `n`
//! occupies `4 * n` inputs:
//!
//! | Base    | Word      |
//! |---------|-----------|
//! | `A`     | `1 0 0 0` |
//! | `T`/`U` | `0 1 0 0` |
//! | `C`     | `0 0 1 0` |
//! | `G`     | `0 0 0 1` |
//!
//! Per-sequence features such as [`gc_content`] can be appended as extra
//! one-hot words with [`encode_with_features`]. Rules learned over such
//! inputs can be rendered back as motifs with [`motif`], and a whole model
//! summarized per base and position with [`word_stats`].

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    Rule,
    dataset::{discretize, fair_thresholds},
    error::{Error, Result},
    model::{ClauseModel, MachineModel}
};

/// Bits per encoded base.
pub const WORD_SIZE: usize = 4;

const BASES: [char; WORD_SIZE] = ['A', 'U', 'C', 'G'];

fn word(base: char) -> Option<usize> {
    match base.to_ascii_uppercase() {
        'A' => Some(0),
        'T' | 'U' => Some(1),
        'C' => Some(2),
        'G' => Some(3),
        _ => None
    }
}

fn encode_one(index: usize, sequence: &str) -> Result<Vec<u8>> {
    let mut bits = Vec::with_capacity(sequence.len() * WORD_SIZE);
    for (position, found) in sequence.chars().enumerate() {
        let hot = word(found).ok_or_else(|| Error::InvalidNucleotide {
            sequence: index,
            position,
            found
        })?;
        bits.extend((0..WORD_SIZE).map(|i| u8::from(i == hot)));
    }
    Ok(bits)
}

/// # Overview
///
/// Encodes a DNA or RNA sequence. Case is ignored.
///
/// # Examples
///
/// ```
/// use granular_tsetlin::nucleotide::encode_sequence;
///
/// assert_eq!(encode_sequence("Gu").unwrap(), vec![0, 0, 0, 1, 0, 1, 0, 0]);
/// assert!(encode_sequence("AXG").is_err());
/// ```
pub fn encode_sequence(sequence: &str) -> Result<Vec<u8>> {
    encode_one(0, sequence)
}

/// # Overview
///
/// Encodes many sequences; errors name the offending sequence index.
pub fn encode_batch<S: AsRef<str>>(sequences: &[S]) -> Result<Vec<Vec<u8>>> {
    sequences
        .iter()
        .enumerate()
        .map(|(i, s)| encode_one(i, s.as_ref()))
        .collect()
}

/// # Overview
///
/// Encodes `sequences` and appends one discretized word per feature.
///
/// `features[d][i]` is feature `d` of sequence `i`. Each feature is cut into
/// `bits_per_feature` equally populated tiers at [`fair_thresholds`], so a
/// row holds `4 * len + bits_per_feature * features.len()` bits. The cut
/// points of every feature are returned with the rows; pass them to
/// [`discretize`] to encode unseen sequences the same way.
///
/// # Errors
///
/// [`Error::InvalidFeatureBits`] for zero bits,
/// [`Error::FeatureLengthMismatch`] when a feature does not cover every
/// sequence, [`Error::EmptyDataset`] when features are given for no
/// sequences, and the errors of [`encode_batch`].
///
/// ```
/// use granular_tsetlin::nucleotide::{encode_with_features, gc_content};
///
/// let seqs = ["GGCA", "AUAU", "GCGC", "ACAU"];
/// let gc: Vec<f64> = seqs.iter().map(|s| gc_content(s)).collect();
/// let (rows, cuts) = encode_with_features(&seqs, &[gc], 2).unwrap();
///
/// assert_eq!(cuts, vec![vec![0.75]]);
/// assert_eq!(rows[0].len(), 4 * 4 + 2);
/// assert_eq!(rows[0][16..], [0, 1]);
/// ```
pub fn encode_with_features<S: AsRef<str>>(
    sequences: &[S],
    features: &[Vec<f64>],
    bits_per_feature: usize
) -> Result<(Vec<Vec<u8>>, Vec<Vec<f64>>)> {
    if bits_per_feature == 0 {
        return Err(Error::InvalidFeatureBits);
    }
    for (feature, values) in features.iter().enumerate() {
        if values.len() != sequences.len() {
            return Err(Error::FeatureLengthMismatch {
                feature,
                expected: sequences.len(),
                got: values.len()
            });
        }
    }

    let thresholds = features
        .iter()
        .map(|values| fair_thresholds(values, bits_per_feature))
        .collect::<Result<Vec<_>>>()?;

    let mut rows = encode_batch(sequences)?;
    for (i, row) in rows.iter_mut().enumerate() {
        for (values, cuts) in features.iter().zip(&thresholds) {
            row.extend(discretize(cuts, values[i]));
        }
    }
    Ok((rows, thresholds))
}

/// # Overview
///
/// Fraction of `G` and `C` bases. Empty sequences give 0.0.
#[must_use]
pub fn gc_content(sequence: &str) -> f64 {
    let total = sequence.chars().count();
    if total == 0 {
        return 0.0;
    }
    let gc = sequence
        .chars()
        .filter(|c| matches!(c.to_ascii_uppercase(), 'G' | 'C'))
        .count();
    gc as f64 / total as f64
}

/// # Overview
///
/// Renders the first `length` words of a rule as a motif.
///
/// Each position shows the base the rule requires (`A U C G`), the base it
/// forbids in lowercase (`a u c g` reads "anything but"), or `_` when the
/// position is unconstrained. Returns `None` when a position needs or
/// forbids more than one base, or both needs and forbids the same one,
/// since no single letter describes it.
///
/// ```
/// use granular_tsetlin::{Polarity, Rule, nucleotide::motif};
///
/// let rule = Rule {
///     no:       0,
///     included: vec![0, 11],
///     negated:  vec![6],
///     polarity: Polarity::Positive,
///     strength: 3
/// };
/// assert_eq!(motif(&rule, 4).as_deref(), Some("AcG_"));
/// ```
#[must_use]
pub fn motif(rule: &Rule, length: usize) -> Option<String> {
    let flags = |literals: &[usize]| {
        let mut words = vec![0u8; length];
        for &k in literals.iter().filter(|&&k| k < length * WORD_SIZE) {
            words[k / WORD_SIZE] |= 1 << (k % WORD_SIZE);
        }
        words
    };
    let required = flags(&rule.included);
    let forbidden = flags(&rule.negated);

    required
        .iter()
        .zip(&forbidden)
        .map(|(&need, &deny)| {
            if need != 0 && need == deny {
                return None;
            }
            match (single_base(need), single_base(deny)) {
                (Some(Some(base)), _) => Some(BASES[base]),
                (Some(None), Some(Some(base))) => Some(BASES[base].to_ascii_lowercase()),
                (Some(None), Some(None)) => Some('_'),
                _ => None
            }
        })
        .collect()
}

/// # Overview
///
/// Per-base averages over the clauses of one polarity.
///
/// Both matrices have `2 * WORD_SIZE` rows and one column per sequence
/// position. Rows `0..4` are the literals `A U C G`, rows `4..8` their
/// negations.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WordMatrix {
    /// Mean literal weight.
    pub mean_weight:    Vec<Vec<f64>>,
    /// Fraction of clauses that include the literal (`weight >= 0`).
    pub inclusion_rate: Vec<Vec<f64>>
}

impl WordMatrix {
    fn from_clauses(clauses: &[ClauseModel], length: usize) -> Self {
        let mut stats = Self {
            mean_weight:    vec![vec![0.0; length]; 2 * WORD_SIZE],
            inclusion_rate: vec![vec![0.0; length]; 2 * WORD_SIZE]
        };
        if clauses.is_empty() {
            return stats;
        }

        let share = 1.0 / clauses.len() as f64;
        for clause in clauses {
            for (half, weights) in [clause.positive(), clause.negative()].into_iter().enumerate() {
                for (k, &w) in weights.iter().take(length * WORD_SIZE).enumerate() {
                    let row = half * WORD_SIZE + k % WORD_SIZE;
                    let col = k / WORD_SIZE;
                    stats.mean_weight[row][col] += f64::from(w) * share;
                    if w >= 0 {
                        stats.inclusion_rate[row][col] += share;
                    }
                }
            }
        }
        stats
    }
}

/// # Overview
///
/// Word statistics of one class.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WordStats {
    pub class:    usize,
    pub tag:      String,
    pub positive: WordMatrix,
    pub negative: WordMatrix
}

/// # Overview
///
/// Summarizes every class of `model` over its first `length` bases.
///
/// `length` is capped at the number of whole words the model's inputs
/// hold, so appended feature bits beyond the last word are ignored.
#[must_use]
pub fn word_stats(model: &MachineModel, length: usize) -> Vec<WordStats> {
    let length = length.min(model.args.input_size / WORD_SIZE);
    model
        .automata
        .iter()
        .map(|a| WordStats {
            class:    a.no,
            tag:      model.args.tier_tag(a.no),
            positive: WordMatrix::from_clauses(&a.positive_clauses, length),
            negative: WordMatrix::from_clauses(&a.negative_clauses, length)
        })
        .collect()
}

/// `Some(None)` for an empty word, `Some(Some(i))` for a single bit,
/// `None` for several bits.
fn single_base(flags: u8) -> Option<Option<usize>> {
    match flags.count_ones() {
        0 => Some(None),
        1 => Some(Some(flags.trailing_zeros() as usize)),
        _ => None
    }
}
