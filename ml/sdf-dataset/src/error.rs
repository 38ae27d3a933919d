//! Error types for sdf-dataset crate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while building SDF training data.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// Configuration is unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Translate mode name not recognized.
    #[error("invalid translate mode: {0} (expected min_bound, center or center_without_z)")]
    UnknownTranslateMode(String),

    /// A mesh file could not be loaded.
    #[error("failed to load mesh {path}: {source}")]
    MeshLoad {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O or parse error.
        #[source]
        source: mesh_io::IoError,
    },

    /// A mesh has no extent to normalize by.
    #[error("mesh {0} has zero extent")]
    DegenerateMesh(PathBuf),

    /// Raw directory holds no mesh with the configured extension.
    #[error("no '{extension}' meshes found in {dir}")]
    NoMeshes {
        /// Directory searched.
        dir: PathBuf,
        /// Extension searched for.
        extension: String,
    },

    /// Watertight repair failed.
    #[error("repair failed: {0}")]
    Repair(#[from] mesh_repair::RepairError),

    /// Sampling or signed distance evaluation failed.
    #[error("signed distance failed: {0}")]
    Sdf(#[from] mesh_sdf::SdfError),

    /// A stored file has the wrong magic bytes.
    #[error("bad magic bytes {found:?}, expected {expected:?}")]
    BadMagic {
        /// Magic found in the file.
        found: [u8; 4],
        /// Magic required.
        expected: [u8; 4],
    },

    /// A stored file has an unsupported format version.
    #[error("unsupported format version {0}")]
    UnsupportedVersion(u32),

    /// Archive content is inconsistent.
    #[error("invalid archive: {0}")]
    InvalidArchive(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl DatasetError {
    /// Creates an invalid configuration error.
    #[must_use]
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig(reason.into())
    }

    /// Creates an invalid archive error.
    #[must_use]
    pub fn invalid_archive(reason: impl Into<String>) -> Self {
        Self::InvalidArchive(reason.into())
    }

    /// Creates a serialization error.
    #[must_use]
    pub fn serialization(reason: impl Into<String>) -> Self {
        Self::Serialization(reason.into())
    }
}

impl From<bincode::Error> for DatasetError {
    fn from(err: bincode::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for DatasetError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<tempfile::PersistError> for DatasetError {
    fn from(err: tempfile::PersistError) -> Self {
        Self::Io(err.error)
    }
}

/// Result type for sdf-dataset operations.
pub type Result<T> = std::result::Result<T, DatasetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_invalid_config() {
        let err = DatasetError::invalid_config("sigma must be non-negative");
        assert!(err.to_string().contains("sigma"));
    }

    #[test]
    fn error_unknown_mode_lists_choices() {
        let err = DatasetError::UnknownTranslateMode("middle".into());
        let text = err.to_string();
        assert!(text.contains("middle"));
        assert!(text.contains("center_without_z"));
    }

    #[test]
    fn error_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "not found");
        let err: DatasetError = io_err.into();
        assert!(matches!(err, DatasetError::Io(_)));
    }

    #[test]
    fn error_from_serde_error() {
        let json_err = serde_json::from_str::<i32>("invalid").unwrap_err();
        let err: DatasetError = json_err.into();
        assert!(matches!(err, DatasetError::Serialization(_)));
    }
}
