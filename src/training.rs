//! Options and reports for [`Machine::train_with_options`](crate::Machine::train_with_options).

use std::fmt;

/// Called after each epoch with `(epoch, training_accuracy)`. Returning
/// `false` stops training.
pub type EpochCallback = Box<dyn FnMut(usize, f64) -> bool + Send>;

/// # Overview
///
/// How long to train and when to give up.
///
/// # Examples
///
/// ```
/// use granular_tsetlin::TrainOptions;
///
/// let opts = TrainOptions::new(500).with_early_stop(20, 0.0);
/// assert_eq!(opts.epochs, 500);
/// assert_eq!(opts.early_stop.unwrap().patience, 20);
/// ```
pub struct TrainOptions {
    pub epochs:     usize,
    pub early_stop: Option<EarlyStop>,
    pub callback:   Option<EpochCallback>
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self::new(100)
    }
}

impl fmt::Debug for TrainOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrainOptions")
            .field("epochs", &self.epochs)
            .field("early_stop", &self.early_stop)
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

impl TrainOptions {
    #[must_use]
    pub fn new(epochs: usize) -> Self {
        Self {
            epochs,
            early_stop: None,
            callback: None
        }
    }

    /// # Overview
    ///
    /// Stops once training accuracy has not beaten its best by more than
    /// `min_delta` for `patience` epochs in a row.
    #[must_use]
    pub fn with_early_stop(mut self, patience: usize, min_delta: f64) -> Self {
        self.early_stop = Some(EarlyStop {
            patience,
            min_delta
        });
        self
    }

    #[must_use]
    pub fn with_callback<F>(mut self, callback: F) -> Self
    where
        F: FnMut(usize, f64) -> bool + Send + 'static
    {
        self.callback = Some(Box::new(callback));
        self
    }
}

/// Plateau detection settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EarlyStop {
    pub patience:  usize,
    pub min_delta: f64
}

/// # Overview
///
/// Outcome of a [`Machine::train_with_options`](crate::Machine::train_with_options) run.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainReport {
    pub epochs_run:     usize,
    pub final_accuracy: f64,
    pub stopped_early:  bool,
    /// Training accuracy after every epoch.
    pub history:        Vec<f64>
}

impl TrainReport {
    #[must_use]
    pub fn new(epochs_run: usize, final_accuracy: f64, stopped_early: bool) -> Self {
        Self::with_history(epochs_run, final_accuracy, stopped_early, Vec::new())
    }

    #[must_use]
    pub fn with_history(
        epochs_run: usize,
        final_accuracy: f64,
        stopped_early: bool,
        history: Vec<f64>
    ) -> Self {
        Self {
            epochs_run,
            final_accuracy,
            stopped_early,
            history
        }
    }

    /// # Overview
    ///
    /// Best accuracy seen during the run.
    #[must_use]
    pub fn best_accuracy(&self) -> f64 {
        self.history.iter().copied().fold(0.0, f64::max)
    }
}

/// Counts epochs since the last improvement.
#[derive(Debug)]
pub struct EarlyStopTracker {
    patience:  usize,
    min_delta: f64,
    best:      f64,
    wait:      usize
}

impl EarlyStopTracker {
    #[must_use]
    pub fn new(config: &EarlyStop) -> Self {
        Self {
            patience:  config.patience,
            min_delta: config.min_delta,
            best:      0.0,
            wait:      0
        }
    }

    /// # Overview
    ///
    /// Records one epoch. Returns `true` when patience has run out.
    pub fn update(&mut self, accuracy: f64) -> bool {
        if accuracy > self.best + self.min_delta {
            self.best = accuracy;
            self.wait = 0;
            return false;
        }
        self.wait += 1;
        self.wait >= self.patience
    }
}
