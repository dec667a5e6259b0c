//! Multi-class machine: one [`Automata`] per class over a shared packed
//! dataset.

use tracing::{debug, info, warn};

use crate::{
    Automata, MachineArgs, Prediction, TrainingView,
    block::{PackedSample, block_count, pack_batch},
    dataset::transpose,
    error::{Error, Result},
    model::MachineModel,
    rule::PatternReport,
    training::{EarlyStopTracker, TrainOptions, TrainReport},
    utils::{FastRng, fork, rng_from_entropy, rng_from_seed}
};

/// # Overview
///
/// Picks the class with the strictly greatest confidence.
///
/// The running maximum starts at zero, so when no class is above zero the
/// winner is class 0. Ties keep the earlier class.
///
/// # Examples
///
/// ```
/// use granular_tsetlin::argmax;
///
/// assert_eq!(argmax(&[0.4, -0.1]), 0);
/// assert_eq!(argmax(&[-0.5, 0.2, 0.2]), 1);
/// assert_eq!(argmax(&[-0.3, -0.1]), 0);
/// ```
#[must_use]
pub fn argmax(confidences: &[f64]) -> usize {
    let mut best = 0.0;
    let mut winner = 0;
    for (class, &confidence) in confidences.iter().enumerate() {
        if confidence > best {
            best = confidence;
            winner = class;
        }
    }
    winner
}

/// # Overview
///
/// Multi-class Tsetlin Machine.
///
/// Owns one [`Automata`] per class, the packed training samples, and the
/// per-class target columns. Automata only ever borrow the samples through
/// a [`TrainingView`].
///
/// # Examples
///
/// ```
/// use granular_tsetlin::{Machine, MachineArgs};
///
/// let args = MachineArgs::builder()
///     .inputs(2)
///     .outputs(2)
///     .clauses(10)
///     .threshold(4)
///     .build()
///     .unwrap();
/// let mut tm = Machine::with_seed(args, 42);
///
/// let x = vec![vec![0, 0], vec![0, 1], vec![1, 0], vec![1, 1]];
/// let y = vec![vec![1, 0], vec![0, 1], vec![0, 1], vec![1, 0]];
///
/// tm.load(&x, &y).unwrap();
/// tm.train(500);
///
/// let predictions = tm.load_and_predict(&x).unwrap();
/// assert_eq!(predictions.len(), 4);
/// assert!(predictions.iter().all(|row| row.iter().sum::<u8>() == 1));
/// ```
#[derive(Debug, Clone)]
pub struct Machine {
    pub(crate) args:     MachineArgs,
    pub(crate) automata: Vec<Automata>,
    pub(crate) samples:  Vec<PackedSample>,
    pub(crate) targets:  Vec<Vec<u8>>
}

impl Machine {
    /// # Overview
    ///
    /// Creates a machine seeded from entropy.
    #[must_use]
    pub fn new(args: MachineArgs) -> Self {
        Self::with_rng(args, rng_from_entropy())
    }

    /// # Overview
    ///
    /// Creates a reproducible machine: the same seed and data give the same
    /// weights.
    #[must_use]
    pub fn with_seed(args: MachineArgs, seed: u64) -> Self {
        Self::with_rng(args, rng_from_seed(seed))
    }

    /// # Overview
    ///
    /// Like [`Machine::with_seed`], but validates `args` first. Use this for
    /// arguments built by hand instead of through the builder.
    ///
    /// # Errors
    ///
    /// Returns the first error reported by [`MachineArgs::validate`].
    pub fn try_with_seed(args: MachineArgs, seed: u64) -> Result<Self> {
        args.validate()?;
        Ok(Self::with_seed(args, seed))
    }

    /// # Overview
    ///
    /// Creates a machine whose automata engines are forked from `rng`.
    ///
    /// # Panics
    ///
    /// `args` must pass [`MachineArgs::validate`]; this is only checked in
    /// debug builds. A non-positive threshold panics on the first training
    /// step.
    #[must_use]
    pub fn with_rng(args: MachineArgs, mut rng: FastRng) -> Self {
        debug_assert!(args.validate().is_ok(), "invalid machine arguments");
        let automata = (0..args.output_size)
            .map(|class| Automata::new(class, &args, fork(&mut rng)))
            .collect();
        Self {
            targets: vec![Vec::new(); args.output_size],
            args,
            automata,
            samples: Vec::new()
        }
    }

    #[inline(always)]
    #[must_use]
    pub fn args(&self) -> &MachineArgs {
        &self.args
    }

    #[inline(always)]
    #[must_use]
    pub fn automata(&self) -> &[Automata] {
        &self.automata
    }

    /// # Overview
    ///
    /// Number of loaded training samples.
    #[inline(always)]
    #[must_use]
    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    #[inline(always)]
    #[must_use]
    pub fn samples(&self) -> &[PackedSample] {
        &self.samples
    }

    /// # Overview
    ///
    /// 0/1 target column of `class`, one entry per loaded sample.
    #[inline]
    #[must_use]
    pub fn targets(&self, class: usize) -> &[u8] {
        &self.targets[class]
    }

    fn check_data(&self, data: &[Vec<u8>]) -> Result<()> {
        if data.is_empty() {
            return Err(Error::EmptyDataset);
        }
        if let Some((row, x)) = data
            .iter()
            .enumerate()
            .find(|(_, x)| x.len() != self.args.input_size)
        {
            return Err(Error::ShapeMismatch {
                row,
                expected: self.args.input_size,
                got: x.len()
            });
        }
        Ok(())
    }

    fn check_response(&self, data: &[Vec<u8>], response: &[Vec<u8>]) -> Result<()> {
        if response.len() != data.len() {
            return Err(Error::SampleCountMismatch {
                data:     data.len(),
                response: response.len()
            });
        }
        if let Some((row, y)) = response
            .iter()
            .enumerate()
            .find(|(_, y)| y.len() != self.args.output_size)
        {
            return Err(Error::ResponseShapeMismatch {
                row,
                expected: self.args.output_size,
                got: y.len()
            });
        }
        Ok(())
    }

    /// # Overview
    ///
    /// Validates and packs a training set, replacing any previous one.
    ///
    /// `data` is `[sample][input_size]` of 0/1, `response` is
    /// `[sample][output_size]` one-hot. One-hotness is the caller's
    /// responsibility; any value `> 0` counts as 1.
    pub fn load(&mut self, data: &[Vec<u8>], response: &[Vec<u8>]) -> Result<()> {
        self.check_data(data)?;
        self.check_response(data, response)?;

        self.targets = transpose(response, self.args.output_size);
        self.samples = pack_batch(data);

        info!(
            samples = self.samples.len(),
            blocks = block_count(self.args.input_size),
            "dataset loaded"
        );
        Ok(())
    }

    /// # Overview
    ///
    /// One epoch: every class runs a full `learn` pass, one class after
    /// another.
    pub(crate) fn train_epoch(&mut self) {
        let samples = &self.samples;
        for (automata, targets) in self.automata.iter_mut().zip(&self.targets) {
            automata.learn(TrainingView { samples, targets });
        }
    }

    /// # Overview
    ///
    /// Trains on the loaded dataset for `epochs` epochs.
    pub fn train(&mut self, epochs: usize) {
        if self.samples.is_empty() {
            warn!("train called before load; nothing to learn from");
            return;
        }
        for epoch in 0..epochs {
            self.train_epoch();
            debug!(epoch = epoch + 1, "epoch finished");
        }
        info!(epochs, samples = self.samples.len(), "training finished");
    }

    /// # Overview
    ///
    /// Trains with early stopping and a progress callback. Training accuracy
    /// on the loaded dataset is measured after every epoch.
    pub fn train_with_options(&mut self, mut opts: TrainOptions) -> TrainReport {
        if self.samples.is_empty() {
            warn!("train called before load; nothing to learn from");
            return TrainReport::new(0, 0.0, false);
        }

        let mut tracker = opts.early_stop.as_ref().map(EarlyStopTracker::new);
        let mut history = Vec::with_capacity(opts.epochs);
        let mut stopped = false;
        let mut epochs_run = 0;

        for epoch in 0..opts.epochs {
            self.train_epoch();
            epochs_run = epoch + 1;

            let accuracy = self.training_accuracy();
            history.push(accuracy);
            debug!(epoch = epochs_run, accuracy, "epoch finished");

            let keep_going = opts
                .callback
                .as_mut()
                .is_none_or(|callback| callback(epochs_run, accuracy));
            let plateaued = tracker.as_mut().is_some_and(|t| t.update(accuracy));
            if !keep_going || plateaued {
                stopped = true;
                break;
            }
        }

        let final_accuracy = history.last().copied().unwrap_or(0.0);
        info!(epochs_run, final_accuracy, stopped_early = stopped, "training finished");
        TrainReport::with_history(epochs_run, final_accuracy, stopped, history)
    }

    /// # Overview
    ///
    /// Per-class predictions for packed samples, class-major.
    #[must_use]
    pub fn predict_packed(&self, batch: &[PackedSample]) -> Vec<Vec<Prediction>> {
        self.automata.iter().map(|a| a.predict(batch)).collect()
    }

    /// # Overview
    ///
    /// Confidence of every class for every sample, sample-major.
    pub fn confidences(&self, data: &[Vec<u8>]) -> Result<Vec<Vec<f64>>> {
        self.check_data(data)?;
        let batch = pack_batch(data);
        Ok(self.confidences_packed(&batch))
    }

    fn confidences_packed(&self, batch: &[PackedSample]) -> Vec<Vec<f64>> {
        let per_class = self.predict_packed(batch);
        (0..batch.len())
            .map(|i| per_class.iter().map(|p| p[i].confidence).collect())
            .collect()
    }

    /// # Overview
    ///
    /// Winning class index per sample.
    pub fn predict_classes(&self, data: &[Vec<u8>]) -> Result<Vec<usize>> {
        Ok(self.confidences(data)?.iter().map(|c| argmax(c)).collect())
    }

    /// # Overview
    ///
    /// Packs `data` and returns one one-hot row per sample.
    pub fn load_and_predict(&self, data: &[Vec<u8>]) -> Result<Vec<Vec<u8>>> {
        let classes = self.predict_classes(data)?;
        Ok(classes
            .into_iter()
            .map(|winner| {
                let mut row = vec![0; self.args.output_size];
                row[winner] = 1;
                row
            })
            .collect())
    }

    /// # Overview
    ///
    /// Fraction of samples whose predicted class matches the one-hot
    /// response.
    pub fn accuracy(&self, data: &[Vec<u8>], response: &[Vec<u8>]) -> Result<f64> {
        self.check_response(data, response)?;
        let predicted = self.predict_classes(data)?;
        let correct = predicted
            .iter()
            .zip(response)
            .filter(|(p, y)| **p == expected_class(y))
            .count();
        Ok(correct as f64 / data.len() as f64)
    }

    /// # Overview
    ///
    /// Accuracy on the loaded training set; 0.0 when nothing is loaded.
    #[must_use]
    pub fn training_accuracy(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let confidences = self.confidences_packed(&self.samples);
        let correct = confidences
            .iter()
            .enumerate()
            .filter(|(i, c)| {
                let expected = self.targets.iter().position(|t| t[*i] > 0).unwrap_or(0);
                argmax(c) == expected
            })
            .count();
        correct as f64 / self.samples.len() as f64
    }

    /// # Overview
    ///
    /// Snapshot of the arguments and every automata.
    #[must_use]
    pub fn export_model(&self) -> MachineModel {
        MachineModel {
            args:     self.args.clone(),
            automata: self.automata.iter().map(Automata::export_model).collect()
        }
    }

    /// # Overview
    ///
    /// Restores weights from `model`.
    ///
    /// The model's arguments must be compatible with this machine's and it
    /// must hold one automata per class. Every automata and clause is
    /// checked before anything is written.
    pub fn import_model(&mut self, model: &MachineModel) -> Result<()> {
        if let Err(err) = self.check_model(model) {
            warn!(error = %err, "model import rejected");
            return Err(err);
        }
        for (automata, automata_model) in self.automata.iter_mut().zip(&model.automata) {
            automata.import_model(automata_model)?;
        }
        Ok(())
    }

    /// # Overview
    ///
    /// Human-readable rules of every class, labelled with its tier tag.
    #[must_use]
    pub fn patterns(&self) -> Vec<PatternReport> {
        self.automata
            .iter()
            .map(|a| PatternReport::from_model(&a.export_model(), self.args.tier_tag(a.no())))
            .collect()
    }

    fn check_model(&self, model: &MachineModel) -> Result<()> {
        if !model.args.is_compatible(&self.args) {
            return Err(Error::ConfigMismatch);
        }
        if model.automata.len() != self.automata.len() {
            return Err(Error::AutomataCountMismatch {
                expected: self.automata.len(),
                got:      model.automata.len()
            });
        }
        self.automata
            .iter()
            .zip(&model.automata)
            .try_for_each(|(a, m)| a.check_model(m))
    }
}

fn expected_class(row: &[u8]) -> usize {
    row.iter().position(|&v| v > 0).unwrap_or(0)
}
