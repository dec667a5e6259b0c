//! Error types for the Tsetlin Machine.

use thiserror::Error;

/// # Overview
///
/// Errors raised when building, loading, or restoring a machine.
///
/// Shape errors come from [`Machine::load`](crate::Machine::load) and
/// prediction entry points, model errors from
/// [`Machine::import_model`](crate::Machine::import_model). None of them
/// leave the machine partially modified.
#[derive(Debug, Error)]
pub enum Error {
    #[error("input_size is required and must be > 0")]
    MissingInputSize,

    #[error("output_size is required and must be > 0")]
    MissingOutputSize,

    #[error("clause_per_output is required and must be > 0")]
    MissingClauses,

    #[error("threshold T must be > 0")]
    InvalidThreshold,

    #[error("specificity must be finite and >= 1.0")]
    InvalidSpecificity,

    #[error("dropout ratio must be in [0, 1)")]
    InvalidDropout,

    #[error("expected {expected} tier tags, got {got}")]
    TierTagCount { expected: usize, got: usize },

    #[error("train ratio must be in [0, 1]")]
    InvalidRatio,

    #[error("dataset cannot be empty")]
    EmptyDataset,

    #[error("data row {row}: expected {expected} columns, got {got}")]
    ShapeMismatch { row: usize, expected: usize, got: usize },

    #[error("response row {row}: expected {expected} columns, got {got}")]
    ResponseShapeMismatch { row: usize, expected: usize, got: usize },

    #[error("data has {data} samples but response has {response}")]
    SampleCountMismatch { data: usize, response: usize },

    #[error("sequence {sequence}: unknown nucleotide {found:?} at position {position}")]
    InvalidNucleotide { sequence: usize, position: usize, found: char },

    #[error("feature {feature}: expected {expected} values, got {got}")]
    FeatureLengthMismatch { feature: usize, expected: usize, got: usize },

    #[error("bits per feature must be > 0")]
    InvalidFeatureBits,

    #[error("model arguments do not match this machine")]
    ConfigMismatch,

    #[error("model holds {got} automata, machine has {expected}")]
    AutomataCountMismatch { expected: usize, got: usize },

    #[error("automata slot {expected} received model tagged {got}")]
    AutomataTagMismatch { expected: usize, got: usize },

    #[error("automata {automata}: expected {expected} clauses per polarity, got {got}")]
    ClauseCountMismatch { automata: usize, expected: usize, got: usize },

    #[error("clause slot {expected} received model tagged {got}")]
    ClauseTagMismatch { expected: usize, got: usize },

    #[error("clause {clause}: expected {expected} literal weights, got {got}")]
    LiteralCountMismatch { clause: usize, expected: usize, got: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "serde")]
    #[error("binary encoding error: {0}")]
    Encode(#[from] bincode::Error),

    #[cfg(feature = "serde")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error)
}

impl Error {
    /// # Overview
    ///
    /// True for errors caused by a malformed dataset.
    #[must_use]
    pub fn is_shape_error(&self) -> bool {
        matches!(
            self,
            Self::EmptyDataset
                | Self::ShapeMismatch { .. }
                | Self::ResponseShapeMismatch { .. }
                | Self::SampleCountMismatch { .. }
                | Self::FeatureLengthMismatch { .. }
        )
    }

    /// # Overview
    ///
    /// True for errors caused by a model that does not fit the live machine.
    #[must_use]
    pub fn is_model_mismatch(&self) -> bool {
        matches!(
            self,
            Self::ConfigMismatch
                | Self::AutomataCountMismatch { .. }
                | Self::AutomataTagMismatch { .. }
                | Self::ClauseCountMismatch { .. }
                | Self::ClauseTagMismatch { .. }
                | Self::LiteralCountMismatch { .. }
        )
    }
}

/// # Overview
///
/// Result type for Tsetlin Machine operations.
pub type Result<T> = core::result::Result<T, Error>;
