//! Parallel training and candidate evaluation using rayon.

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::{
    Machine, MachineArgs, TrainingView,
    dataset::Dataset,
    error::Result,
    fitness::{Fitness, Hyperparameters, evaluate_candidate}
};

impl Machine {
    /// # Overview
    ///
    /// Same as [`Machine::train`], with the classes of each epoch learning
    /// concurrently.
    ///
    /// Every automata owns its engine and only reads the shared samples, so
    /// the resulting weights equal those of sequential training.
    pub fn train_parallel(&mut self, epochs: usize) {
        if self.samples.is_empty() {
            warn!("train called before load; nothing to learn from");
            return;
        }
        for epoch in 0..epochs {
            let samples = &self.samples;
            self.automata
                .par_iter_mut()
                .zip(self.targets.par_iter())
                .for_each(|(automata, targets)| automata.learn(TrainingView { samples, targets }));
            debug!(epoch = epoch + 1, "epoch finished");
        }
        info!(epochs, samples = self.samples.len(), "parallel training finished");
    }
}

/// # Overview
///
/// [`evaluate_population`](crate::fitness::evaluate_population) with one
/// candidate per rayon task. Results keep the candidate order.
pub fn evaluate_population_parallel(
    base: &MachineArgs,
    candidates: &[Hyperparameters],
    dataset: &Dataset,
    epochs: usize,
    seed: u64
) -> Vec<Result<Fitness>> {
    candidates
        .par_iter()
        .map(|&c| evaluate_candidate(base, c, dataset, epochs, seed))
        .collect()
}
