//! Decoder weight persistence.

use std::path::Path;

use burn::module::Module;
use burn::prelude::Backend;
use burn::record::{BinFileRecorder, FullPrecisionSettings, PrettyJsonFileRecorder, Recorder};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SynthesisError};
use crate::model::{LatentSdfDecoder, LatentSdfDecoderConfig};

/// Supported checkpoint file formats.
///
/// # Example
///
/// ```
/// use sdf_synthesis::CheckpointFormat;
///
/// assert_eq!(CheckpointFormat::from_extension("bin"), Some(CheckpointFormat::Binary));
/// assert_eq!(CheckpointFormat::from_extension("xml"), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CheckpointFormat {
    /// Burn's `BinFileRecorder` with full precision.
    #[default]
    Binary,

    /// Burn's `PrettyJsonFileRecorder`, for inspection.
    Json,
}

impl CheckpointFormat {
    /// Determines format from file extension.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "bin" => Some(Self::Binary),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    /// Determines format from file path.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// File extension written by this format.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Binary => "bin",
            Self::Json => "json",
        }
    }
}

impl std::fmt::Display for CheckpointFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Binary => "binary",
            Self::Json => "json",
        })
    }
}

/// Saves decoder weights.
///
/// `path` is given without extension; the format's extension is appended and
/// the full path returned.
///
/// # Errors
///
/// Returns [`SynthesisError::SaveCheckpoint`] if recording fails.
pub fn save_decoder<B: Backend>(
    model: &LatentSdfDecoder<B>,
    path: &Path,
    format: CheckpointFormat,
) -> Result<std::path::PathBuf> {
    let full_path = path.with_extension(format.extension());
    let record = model.clone().into_record();
    let shown = full_path.display().to_string();

    match format {
        CheckpointFormat::Binary => BinFileRecorder::<FullPrecisionSettings>::new()
            .record(record, full_path.clone())
            .map_err(|e| SynthesisError::save_checkpoint(&shown, e.to_string()))?,
        CheckpointFormat::Json => PrettyJsonFileRecorder::<FullPrecisionSettings>::new()
            .record(record, full_path.clone())
            .map_err(|e| SynthesisError::save_checkpoint(&shown, e.to_string()))?,
    }

    Ok(full_path)
}

/// Loads decoder weights into a decoder built from `config`.
///
/// # Errors
///
/// Returns [`SynthesisError::LoadCheckpoint`] if the file is missing, has an
/// unknown extension, or does not match the architecture.
pub fn load_decoder<B: Backend>(
    config: LatentSdfDecoderConfig,
    path: &Path,
    device: &B::Device,
) -> Result<LatentSdfDecoder<B>> {
    let shown = path.display().to_string();
    if !path.exists() {
        return Err(SynthesisError::load_checkpoint(&shown, "file not found"));
    }
    let format = CheckpointFormat::from_path(path)
        .ok_or_else(|| SynthesisError::load_checkpoint(&shown, "unsupported extension"))?;

    let model = LatentSdfDecoder::<B>::new(config, device);
    let loaded = match format {
        CheckpointFormat::Binary => model.load_file(
            path,
            &BinFileRecorder::<FullPrecisionSettings>::new(),
            device,
        ),
        CheckpointFormat::Json => model.load_file(
            path,
            &PrettyJsonFileRecorder::<FullPrecisionSettings>::new(),
            device,
        ),
    };
    loaded.map_err(|e| SynthesisError::load_checkpoint(&shown, e.to_string()))
}
