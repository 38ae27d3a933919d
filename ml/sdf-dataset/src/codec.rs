//! Framed binary container shared by training archives and the synthesis ledger.
//!
//! # File Format
//!
//! 1. **Magic bytes**: 4 bytes identifying the payload kind
//! 2. **Version**: `u32` little-endian (currently 1)
//! 3. **Flags**: `u32` little-endian, reserved
//! 4. **Payload**: bincode-encoded value
//!
//! Files are written to a temporary sibling and renamed over the target, so a
//! reader sees either the previous content or the new content.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tempfile::NamedTempFile;

use crate::error::{DatasetError, Result};

/// Current container version.
pub const FORMAT_VERSION: u32 = 1;

/// Header size in bytes (magic + version + flags).
pub const HEADER_SIZE: usize = 12;

/// Container header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHeader {
    /// Payload kind.
    pub magic: [u8; 4],
    /// Format version.
    pub version: u32,
    /// Reserved.
    pub flags: u32,
}

impl FileHeader {
    /// Header for the current version.
    #[must_use]
    pub const fn new(magic: [u8; 4]) -> Self {
        Self {
            magic,
            version: FORMAT_VERSION,
            flags: 0,
        }
    }

    fn write_to<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writer.write_all(&self.magic)?;
        writer.write_all(&self.version.to_le_bytes())?;
        writer.write_all(&self.flags.to_le_bytes())?;
        Ok(())
    }

    fn read_from<R: Read>(reader: &mut R) -> std::io::Result<Self> {
        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;

        let mut word = [0u8; 4];
        reader.read_exact(&mut word)?;
        let version = u32::from_le_bytes(word);
        reader.read_exact(&mut word)?;
        let flags = u32::from_le_bytes(word);

        Ok(Self {
            magic,
            version,
            flags,
        })
    }

    fn validate(&self, expected: [u8; 4]) -> Result<()> {
        if self.magic != expected {
            return Err(DatasetError::BadMagic {
                found: self.magic,
                expected,
            });
        }
        if self.version != FORMAT_VERSION {
            return Err(DatasetError::UnsupportedVersion(self.version));
        }
        Ok(())
    }
}

/// Write header and payload to `writer`.
///
/// # Errors
///
/// Returns an error if writing or serialization fails.
pub fn write_framed<T: Serialize, W: Write>(magic: [u8; 4], value: &T, writer: &mut W) -> Result<()> {
    FileHeader::new(magic).write_to(writer)?;
    bincode::serialize_into(writer, value)?;
    Ok(())
}

/// Read and validate a header, then decode the payload.
///
/// # Errors
///
/// Returns an error on bad magic, unknown version, truncation, or a payload
/// that does not decode as `T`.
pub fn read_framed<T: DeserializeOwned, R: Read>(magic: [u8; 4], reader: &mut R) -> Result<T> {
    let header = FileHeader::read_from(reader)?;
    header.validate(magic)?;
    Ok(bincode::deserialize_from(reader)?)
}

/// Atomically replace `path` with a framed encoding of `value`.
///
/// The parent directory must exist.
///
/// # Errors
///
/// Returns an error if the temporary file cannot be created, written, or
/// renamed over `path`.
pub fn save_framed<T: Serialize>(magic: [u8; 4], value: &T, path: &Path) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let tmp = NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(tmp.as_file());
        write_framed(magic, value, &mut writer)?;
        writer.flush()?;
    }
    tmp.as_file().sync_all()?;
    tmp.persist(path)?;
    Ok(())
}

/// Load a framed value from `path`.
///
/// # Errors
///
/// See [`read_framed`]; also fails if the file cannot be opened.
pub fn load_framed<T: DeserializeOwned>(magic: [u8; 4], path: &Path) -> Result<T> {
    let mut reader = BufReader::new(File::open(path)?);
    read_framed(magic, &mut reader)
}

/// Check whether `bytes` start with `magic`.
#[must_use]
pub fn has_magic(bytes: &[u8], magic: [u8; 4]) -> bool {
    bytes.len() >= HEADER_SIZE && bytes[..4] == magic
}
