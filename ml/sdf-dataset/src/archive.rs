//! Per-shape training archives.

use std::path::{Path, PathBuf};

use nalgebra::Point3;
use serde::{Deserialize, Serialize};

use crate::codec;
use crate::error::{DatasetError, Result};

/// Magic bytes of a training archive.
pub const ARCHIVE_MAGIC: [u8; 4] = *b"SDFA";

/// File extension of training archives.
pub const ARCHIVE_EXTENSION: &str = "bin";

/// Points and signed distances for one shape.
///
/// `sdf[i]` is the signed distance at `xyz[i]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingArchive {
    /// Sample positions.
    pub xyz: Vec<[f32; 3]>,
    /// Signed distance per sample.
    pub sdf: Vec<f32>,
    /// Class id (processing order within one build).
    pub cls: u32,
    /// Class name (source file name up to its first `.`).
    pub cls_name: String,
}

impl TrainingArchive {
    /// Build an archive from `f64` points and distances.
    ///
    /// # Errors
    ///
    /// Returns an error if the two sequences differ in length.
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_samples(
        points: &[Point3<f64>],
        distances: &[f64],
        cls: u32,
        cls_name: impl Into<String>,
    ) -> Result<Self> {
        let archive = Self {
            xyz: points
                .iter()
                .map(|p| [p.x as f32, p.y as f32, p.z as f32])
                .collect(),
            sdf: distances.iter().map(|&d| d as f32).collect(),
            cls,
            cls_name: cls_name.into(),
        };
        archive.validate()?;
        Ok(archive)
    }

    /// Number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.xyz.len()
    }

    /// Whether the archive holds no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.xyz.is_empty()
    }

    /// Check that points and distances align.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::InvalidArchive`] on a length mismatch.
    pub fn validate(&self) -> Result<()> {
        if self.xyz.len() != self.sdf.len() {
            return Err(DatasetError::invalid_archive(format!(
                "{} points but {} distances",
                self.xyz.len(),
                self.sdf.len()
            )));
        }
        Ok(())
    }

    /// Archive path for this shape inside `dir`.
    #[must_use]
    pub fn path_in(&self, dir: &Path) -> PathBuf {
        dir.join(format!("{}.{ARCHIVE_EXTENSION}", self.cls_name))
    }

    /// Write the archive to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the archive is inconsistent or cannot be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        self.validate()?;
        codec::save_framed(ARCHIVE_MAGIC, self, path)
    }

    /// Read an archive from `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, not an archive, or inconsistent.
    pub fn load(path: &Path) -> Result<Self> {
        let archive: Self = codec::load_framed(ARCHIVE_MAGIC, path)?;
        archive.validate()?;
        Ok(archive)
    }
}
