//! # Granular Tsetlin
//!
//! Multigranular Tsetlin Machine classifier over bit-packed inputs.
//!
//! Every class owns an [`Automata`]: `N` positive and `N` negative clauses
//! whose specificities are spread from `s_low` to `s_high`, so one ensemble
//! learns coarse and fine patterns side by side. Inputs and literal weights
//! are packed into 16-lane blocks; see [`block`].
//!
//! # Features
//!
//! - `serde` (default): model persistence with bincode and JSON
//! - `parallel`: per-class training and population evaluation via rayon
//!
//! # Examples
//!
//! ```
//! use granular_tsetlin::{Machine, MachineArgs};
//!
//! let args = MachineArgs::builder()
//!     .inputs(2)
//!     .outputs(2)
//!     .clauses(10)
//!     .threshold(4)
//!     .build()
//!     .unwrap();
//! let mut tm = Machine::with_seed(args, 42);
//!
//! let x = vec![vec![0, 0], vec![0, 1], vec![1, 0], vec![1, 1]];
//! let y = vec![vec![1, 0], vec![0, 1], vec![0, 1], vec![1, 0]];
//!
//! tm.load(&x, &y).unwrap();
//! tm.train(200);
//!
//! let model = tm.export_model();
//! assert_eq!(model.automata.len(), 2);
//! ```

mod automata;
pub mod block;
mod clause;
mod config;
pub mod dataset;
pub mod error;
mod feedback;
pub mod fitness;
mod machine;
pub mod model;
pub mod nucleotide;
mod rule;
mod training;
pub mod utils;

#[cfg(feature = "parallel")]
pub mod parallel;

pub use automata::{Automata, FeedbackOdds, Forward, Prediction, TrainingView};
pub use block::{LANES, LaneMask, PackedSample, pack_batch, pack_input};
pub use clause::{Ballot, Clause, Polarity};
pub use config::{MachineArgs, MachineArgsBuilder};
pub use dataset::{Dataset, discretize, fair_thresholds, one_hot, transpose};
pub use error::{Error, Result};
pub use fitness::{Fitness, Hyperparameters, evaluate_candidate, evaluate_population};
pub use machine::{Machine, argmax};
pub use model::{AutomataModel, ClauseModel, MachineModel};
pub use rule::{PatternReport, Rule};
pub use training::{EarlyStop, EarlyStopTracker, EpochCallback, TrainOptions, TrainReport};
