//! Plain snapshots of trained weights.
//!
//! Models are what leaves the machine: persisted by the `serde` helpers
//! below, read by [`Rule`](crate::Rule) extraction, and fed back through
//! [`Machine::import_model`](crate::Machine::import_model).

#[cfg(feature = "serde")]
use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::MachineArgs;
#[cfg(feature = "serde")]
use crate::error::Result;

/// # Overview
///
/// Weights of one clause: `L` positive literal weights followed by `L`
/// negative literal weights.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ClauseModel {
    pub no:       usize,
    pub literals: Vec<i32>
}

impl ClauseModel {
    /// # Overview
    ///
    /// Number of input bits this clause covers.
    #[inline]
    #[must_use]
    pub fn literal_count(&self) -> usize {
        self.literals.len() / 2
    }

    #[inline]
    #[must_use]
    pub fn positive(&self) -> &[i32] {
        &self.literals[..self.literal_count()]
    }

    #[inline]
    #[must_use]
    pub fn negative(&self) -> &[i32] {
        &self.literals[self.literal_count()..]
    }
}

/// # Overview
///
/// Weights of every clause of one class.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AutomataModel {
    pub no:               usize,
    pub positive_clauses: Vec<ClauseModel>,
    pub negative_clauses: Vec<ClauseModel>
}

/// # Overview
///
/// Full snapshot of a machine: its arguments (tier tags included) and one
/// [`AutomataModel`] per class.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MachineModel {
    pub args:     MachineArgs,
    pub automata: Vec<AutomataModel>
}

impl MachineModel {
    /// # Overview
    ///
    /// Tier tags carried by this model, if any.
    #[must_use]
    pub fn tier_tags(&self) -> Option<&[String]> {
        self.args.tier_tags.as_deref()
    }
}

#[cfg(feature = "serde")]
impl MachineModel {
    /// # Overview
    ///
    /// Encodes to compact bincode bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    /// # Overview
    ///
    /// Decodes bytes written by [`MachineModel::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(bincode::deserialize(bytes)?)
    }

    /// # Overview
    ///
    /// Pretty-printed JSON, for inspection and diffing.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// # Overview
    ///
    /// Writes the bincode encoding to `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path.as_ref())?);
        bincode::serialize_into(&mut writer, self)?;
        writer.flush()?;
        tracing::debug!(path = %path.as_ref().display(), "model saved");
        Ok(())
    }

    /// # Overview
    ///
    /// Reads a model written by [`MachineModel::save`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let reader = BufReader::new(File::open(path.as_ref())?);
        Ok(bincode::deserialize_from(reader)?)
    }
}
