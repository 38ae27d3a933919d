//! Append-only synthesis ledger.
//!
//! Every shape the synthesis loop produces is recorded with its derivation and
//! latent code. The ledger is persisted whole after each append, through a
//! temporary file renamed over the previous one.

use std::fmt;
use std::path::{Path, PathBuf};

use sdf_dataset::codec;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Result, SynthesisError};
use crate::latent::LatentCode;

/// Magic bytes of a ledger file.
pub const LEDGER_MAGIC: [u8; 4] = *b"SDFL";

/// File name of the ledger inside the synthesis directory.
pub const LEDGER_FILE_NAME: &str = "infinite_synthesized_latent_codes.bin";

/// How a record came to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SynthesisKind {
    /// A trained latent code.
    Initial,
    /// Linear interpolation of two records.
    Interpolation,
    /// Sum of all but the last parent minus the last.
    Arithmetic,
}

impl SynthesisKind {
    /// Name used in serialized records.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Initial => "initial",
            Self::Interpolation => "interpolation",
            Self::Arithmetic => "arithmetic",
        }
    }
}

impl fmt::Display for SynthesisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One ledger entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisRecord {
    /// Artifact file name, or the decimal index for initial records.
    pub name: String,
    /// Position in the ledger.
    pub index: usize,
    /// Derivation kind.
    pub synthesis_type: SynthesisKind,
    /// Parent indices in derivation order; empty for initial records.
    pub parents: Vec<usize>,
    /// The code.
    pub latent_code: LatentCode,
}

impl SynthesisRecord {
    /// Whether this record is a trained code.
    #[must_use]
    pub fn is_initial(&self) -> bool {
        self.synthesis_type == SynthesisKind::Initial
    }
}

#[derive(Serialize, Deserialize)]
struct LedgerFile {
    synthesized_data: Vec<SynthesisRecord>,
}

/// Ordered, append-only list of [`SynthesisRecord`]s.
///
/// `records()[k].index == k` for every `k`, and every parent index is smaller
/// than the index of its child.
///
/// # Example
///
/// ```
/// use sdf_synthesis::{LatentCode, SynthesisKind, SynthesisLedger};
///
/// let mut ledger = SynthesisLedger::seed(vec![LatentCode::zeros(2), LatentCode::zeros(2)]);
/// let record = ledger
///     .append("0__1__0-5.obj", SynthesisKind::Interpolation, vec![0, 1], LatentCode::zeros(2))
///     .unwrap();
/// assert_eq!(record.index, 2);
/// assert_eq!(ledger.len(), 3);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisLedger {
    records: Vec<SynthesisRecord>,
    path: Option<PathBuf>,
}

impl SynthesisLedger {
    /// In-memory ledger with one initial record per trained code.
    #[must_use]
    pub fn seed(codes: impl IntoIterator<Item = LatentCode>) -> Self {
        let records = codes
            .into_iter()
            .enumerate()
            .map(|(index, latent_code)| SynthesisRecord {
                name: index.to_string(),
                index,
                synthesis_type: SynthesisKind::Initial,
                parents: Vec::new(),
                latent_code,
            })
            .collect();
        Self {
            records,
            path: None,
        }
    }

    /// Load the ledger at `path`, or seed a new one bound to `path`.
    ///
    /// A freshly seeded ledger is written on its first append.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file cannot be read or is corrupt.
    pub fn open_or_seed(path: &Path, codes: impl IntoIterator<Item = LatentCode>) -> Result<Self> {
        if path.exists() {
            return Self::load(path);
        }
        let mut ledger = Self::seed(codes);
        info!(records = ledger.len(), path = %path.display(), "seeded ledger");
        ledger.path = Some(path.to_path_buf());
        Ok(ledger)
    }

    /// Load a ledger and bind it to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or breaks the ledger
    /// invariants.
    pub fn load(path: &Path) -> Result<Self> {
        let file: LedgerFile = codec::load_framed(LEDGER_MAGIC, path)?;
        let ledger = Self {
            records: file.synthesized_data,
            path: Some(path.to_path_buf()),
        };
        ledger.validate()?;
        info!(records = ledger.len(), path = %path.display(), "loaded ledger");
        Ok(ledger)
    }

    /// Bind the ledger to a file; appends persist there from now on.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// File the ledger persists to.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// All records in index order.
    #[must_use]
    pub fn records(&self) -> &[SynthesisRecord] {
        &self.records
    }

    /// Record at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&SynthesisRecord> {
        self.records.get(index)
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the ledger is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Latent dimension of the recorded codes.
    #[must_use]
    pub fn latent_dim(&self) -> Option<usize> {
        self.records.first().map(|r| r.latent_code.dim())
    }

    /// Check that indices match positions and parents precede children.
    ///
    /// # Errors
    ///
    /// Returns [`SynthesisError::CorruptLedger`] describing the first violation.
    pub fn validate(&self) -> Result<()> {
        let dim = self.latent_dim();
        for (position, record) in self.records.iter().enumerate() {
            if record.index != position {
                return Err(SynthesisError::corrupt_ledger(format!(
                    "record at position {position} has index {}",
                    record.index
                )));
            }
            if let Some(parent) = record.parents.iter().find(|&&p| p >= position) {
                return Err(SynthesisError::corrupt_ledger(format!(
                    "record {position} names parent {parent}"
                )));
            }
            if record.is_initial() != record.parents.is_empty() {
                return Err(SynthesisError::corrupt_ledger(format!(
                    "record {position} of kind {} has {} parents",
                    record.synthesis_type,
                    record.parents.len()
                )));
            }
            if Some(record.latent_code.dim()) != dim {
                return Err(SynthesisError::corrupt_ledger(format!(
                    "record {position} has latent dimension {}",
                    record.latent_code.dim()
                )));
            }
        }
        Ok(())
    }

    /// Append a derived record with the next index and persist the ledger.
    ///
    /// If persisting fails the record is removed again, so memory and disk
    /// stay in step.
    ///
    /// # Errors
    ///
    /// Returns an error if a parent does not exist, the kind is
    /// [`SynthesisKind::Initial`], the code dimension differs from the
    /// ledger's, or the file cannot be written.
    pub fn append(
        &mut self,
        name: impl Into<String>,
        synthesis_type: SynthesisKind,
        parents: Vec<usize>,
        latent_code: LatentCode,
    ) -> Result<&SynthesisRecord> {
        let index = self.records.len();
        if synthesis_type == SynthesisKind::Initial || parents.is_empty() {
            return Err(SynthesisError::invalid_config(
                "appended records must be derived from existing records",
            ));
        }
        if let Some(&parent) = parents.iter().find(|&&p| p >= index) {
            return Err(SynthesisError::IndexOutOfRange { index: parent, len: index });
        }
        if let Some(dim) = self.latent_dim() {
            if latent_code.dim() != dim {
                return Err(SynthesisError::LatentDimensionMismatch {
                    expected: dim,
                    found: latent_code.dim(),
                });
            }
        }

        self.records.push(SynthesisRecord {
            name: name.into(),
            index,
            synthesis_type,
            parents,
            latent_code,
        });
        if let Err(err) = self.persist() {
            self.records.pop();
            return Err(err);
        }
        debug!(index, kind = %synthesis_type, "appended ledger record");
        Ok(&self.records[index])
    }

    /// Write the whole ledger to its path, if it has one.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn persist(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let file = LedgerFile {
            synthesized_data: self.records.clone(),
        };
        codec::save_framed(LEDGER_MAGIC, &file, path)?;
        Ok(())
    }
}
