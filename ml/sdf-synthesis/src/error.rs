//! Error types for sdf-synthesis crate.

use thiserror::Error;

/// Errors that can occur during latent synthesis.
#[derive(Debug, Error)]
pub enum SynthesisError {
    /// Configuration is unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Interpolation needs exactly one factor fewer than codes.
    #[error("interpolation of {codes} codes needs {} factors, got {factors}", .codes.saturating_sub(1))]
    FactorCountMismatch {
        /// Number of codes.
        codes: usize,
        /// Number of factors supplied.
        factors: usize,
    },

    /// Not enough ledger entries to draw from.
    #[error("need {required} candidate records, only {available} available")]
    InsufficientCandidates {
        /// Records the draw needs.
        required: usize,
        /// Records left after filtering.
        available: usize,
    },

    /// Two latent codes differ in length.
    #[error("latent dimension mismatch: expected {expected}, got {found}")]
    LatentDimensionMismatch {
        /// Expected dimension.
        expected: usize,
        /// Dimension found.
        found: usize,
    },

    /// A ledger index does not exist.
    #[error("ledger index {index} out of range (ledger has {len} records)")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Ledger length.
        len: usize,
    },

    /// Ledger content breaks its invariants.
    #[error("corrupt ledger: {0}")]
    CorruptLedger(String),

    /// The decoder failed.
    #[error("decoder error: {0}")]
    Decoder(String),

    /// Failed to load a decoder checkpoint.
    #[error("failed to load checkpoint from {path}: {reason}")]
    LoadCheckpoint {
        /// Path to the checkpoint file.
        path: String,
        /// Reason for failure.
        reason: String,
    },

    /// Failed to save a decoder checkpoint.
    #[error("failed to save checkpoint to {path}: {reason}")]
    SaveCheckpoint {
        /// Path to the checkpoint file.
        path: String,
        /// Reason for failure.
        reason: String,
    },

    /// Container encoding or decoding failed.
    #[error(transparent)]
    Dataset(#[from] sdf_dataset::DatasetError),

    /// Mesh export failed.
    #[error("mesh export failed: {0}")]
    MeshIo(#[from] mesh_io::IoError),

    /// Watertight repair failed.
    #[error("repair failed: {0}")]
    Repair(#[from] mesh_repair::RepairError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl SynthesisError {
    /// Creates an invalid configuration error.
    #[must_use]
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig(reason.into())
    }

    /// Creates a decoder error.
    #[must_use]
    pub fn decoder(reason: impl Into<String>) -> Self {
        Self::Decoder(reason.into())
    }

    /// Creates a corrupt ledger error.
    #[must_use]
    pub fn corrupt_ledger(reason: impl Into<String>) -> Self {
        Self::CorruptLedger(reason.into())
    }

    /// Creates a load checkpoint error.
    #[must_use]
    pub fn load_checkpoint(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::LoadCheckpoint {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Creates a save checkpoint error.
    #[must_use]
    pub fn save_checkpoint(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SaveCheckpoint {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Returns `true` for configuration errors, which are never worth retrying.
    #[must_use]
    pub const fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfig(_) | Self::FactorCountMismatch { .. }
        )
    }
}

impl From<serde_json::Error> for SynthesisError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result type for sdf-synthesis operations.
pub type Result<T> = std::result::Result<T, SynthesisError>;
