//! Candidate evaluation for external hyperparameter optimizers.
//!
//! An optimizer proposes [`Hyperparameters`]; [`evaluate_candidate`] trains a
//! fresh machine with them and scores it on held-out data. The search itself
//! (swarm, arithmetic, predator-prey, ...) lives outside this crate.

use tracing::debug;

use crate::{Machine, MachineArgs, dataset::Dataset, error::Result, model::MachineModel};

/// # Overview
///
/// The two knobs an optimizer searches over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hyperparameters {
    pub clause_per_output: usize,
    pub threshold:         i32
}

impl Hyperparameters {
    /// # Overview
    ///
    /// Rounds a continuous search position `[clauses, threshold]` to valid
    /// hyperparameters; both are clamped to at least 1. Missing coordinates
    /// fall back to 1.
    ///
    /// ```
    /// use granular_tsetlin::Hyperparameters;
    ///
    /// let hp = Hyperparameters::from_position(&[19.6, 3.2]);
    /// assert_eq!((hp.clause_per_output, hp.threshold), (20, 3));
    /// ```
    #[must_use]
    pub fn from_position(position: &[f64]) -> Self {
        let coord = |i: usize| position.get(i).copied().unwrap_or(1.0).round().max(1.0);
        Self {
            clause_per_output: coord(0) as usize,
            threshold:         coord(1).min(f64::from(i32::MAX)) as i32
        }
    }

    /// # Overview
    ///
    /// `base` with this candidate's clause count and threshold.
    #[must_use]
    pub fn apply(&self, base: &MachineArgs) -> MachineArgs {
        MachineArgs {
            clause_per_output: self.clause_per_output,
            threshold: self.threshold,
            ..base.clone()
        }
    }
}

/// # Overview
///
/// Score of one candidate: the best test accuracy reached during training,
/// the epoch it was first reached at (0 for the untrained machine), and the
/// model snapshot from that epoch.
#[derive(Debug, Clone, PartialEq)]
pub struct Fitness {
    pub hyperparameters: Hyperparameters,
    pub value:           f64,
    pub epoch:           usize,
    pub model:           MachineModel
}

/// # Overview
///
/// Trains a fresh machine for `epochs` epochs on the dataset's training
/// split, scoring the test split before training and after every epoch.
///
/// Fails when the candidate yields invalid arguments or either split does
/// not fit them.
pub fn evaluate_candidate(
    base: &MachineArgs,
    candidate: Hyperparameters,
    dataset: &Dataset,
    epochs: usize,
    seed: u64
) -> Result<Fitness> {
    let args = candidate.apply(base);
    args.validate()?;

    let mut tm = Machine::with_seed(args, seed);
    tm.load(&dataset.train_data, &dataset.train_response)?;

    let mut best = Fitness {
        hyperparameters: candidate,
        value:           tm.accuracy(&dataset.test_data, &dataset.test_response)?,
        epoch:           0,
        model:           tm.export_model()
    };
    for epoch in 1..=epochs {
        tm.train_epoch();
        let value = tm.accuracy(&dataset.test_data, &dataset.test_response)?;
        if value > best.value {
            best.value = value;
            best.epoch = epoch;
            best.model = tm.export_model();
        }
    }

    debug!(
        clauses = candidate.clause_per_output,
        threshold = candidate.threshold,
        fitness = best.value,
        epoch = best.epoch,
        "candidate evaluated"
    );
    Ok(best)
}

/// # Overview
///
/// Evaluates every candidate with the same seed, in order.
pub fn evaluate_population(
    base: &MachineArgs,
    candidates: &[Hyperparameters],
    dataset: &Dataset,
    epochs: usize,
    seed: u64
) -> Vec<Result<Fitness>> {
    candidates
        .iter()
        .map(|&c| evaluate_candidate(base, c, dataset, epochs, seed))
        .collect()
}

/// # Overview
///
/// Index of the fittest successful evaluation.
#[must_use]
pub fn best_of(results: &[Result<Fitness>]) -> Option<usize> {
    results
        .iter()
        .enumerate()
        .filter_map(|(i, r)| r.as_ref().ok().map(|f| (i, f.value)))
        .fold(None, |best: Option<(usize, f64)>, (i, v)| match best {
            Some((_, bv)) if bv >= v => best,
            _ => Some((i, v))
        })
        .map(|(i, _)| i)
}
