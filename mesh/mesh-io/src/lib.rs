//! Mesh file I/O.
//!
//! Loading and saving of triangle meshes:
//!
//! - **OBJ** (Wavefront) - ASCII, with multi-object scenes
//! - **STL** (Stereolithography) - binary and ASCII in, binary out
//!
//! # Scenes
//!
//! Modeling tools often export one file per asset that still holds several
//! named objects. [`load_scene`] keeps them apart; [`load_mesh`] returns the
//! concatenation of all of them, which is what dataset building consumes.
//!
//! # Example
//!
//! ```no_run
//! use mesh_io::{load_mesh, save_mesh};
//!
//! // Format detected from the .obj extension
//! let mesh = load_mesh("model.obj").unwrap();
//!
//! // Save to a different format
//! save_mesh(&mesh, "model.stl").unwrap();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod error;
mod obj;
mod stl;

pub use error::{IoError, IoResult};
pub use obj::{SceneObject, load_obj, load_obj_scene, read_obj, save_obj, write_obj};
pub use stl::{load_stl, parse_stl, save_stl, write_stl};

use std::path::Path;

use mesh_types::IndexedMesh;

/// Supported mesh file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshFormat {
    /// Wavefront OBJ.
    Obj,
    /// STL, binary or ASCII.
    Stl,
}

impl MeshFormat {
    /// Detect format from file extension (case-insensitive).
    ///
    /// Returns `None` if the extension is missing or not recognized.
    #[must_use]
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "obj" => Some(Self::Obj),
            "stl" => Some(Self::Stl),
            _ => None,
        }
    }

    /// Canonical file extension for this format.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Obj => "obj",
            Self::Stl => "stl",
        }
    }
}

fn detect(path: &Path) -> IoResult<MeshFormat> {
    MeshFormat::from_path(path).ok_or_else(|| IoError::UnknownFormat {
        extension: path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("(none)")
            .to_string(),
    })
}

/// Load every geometry of a file, detecting format from extension.
///
/// STL files always yield a single unnamed object.
///
/// # Errors
///
/// Returns an error if the format is unknown, the file cannot be read, or
/// its content is invalid.
pub fn load_scene<P: AsRef<Path>>(path: P) -> IoResult<Vec<SceneObject>> {
    let path = path.as_ref();
    match detect(path)? {
        MeshFormat::Obj => load_obj_scene(path),
        MeshFormat::Stl => Ok(vec![SceneObject {
            name: String::new(),
            mesh: load_stl(path)?,
        }]),
    }
}

/// Load a mesh, detecting format from extension.
///
/// Multi-object files are concatenated into one mesh.
///
/// # Errors
///
/// See [`load_scene`].
pub fn load_mesh<P: AsRef<Path>>(path: P) -> IoResult<IndexedMesh> {
    let path = path.as_ref();
    match detect(path)? {
        MeshFormat::Obj => load_obj(path),
        MeshFormat::Stl => load_stl(path),
    }
}

/// Save a mesh, detecting format from extension.
///
/// # Errors
///
/// Returns an error if the format is unknown or the file cannot be written.
pub fn save_mesh<P: AsRef<Path>>(mesh: &IndexedMesh, path: P) -> IoResult<()> {
    let path = path.as_ref();
    match detect(path)? {
        MeshFormat::Obj => save_obj(mesh, path),
        MeshFormat::Stl => save_stl(mesh, path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_from_path() {
        assert_eq!(MeshFormat::from_path("model.obj"), Some(MeshFormat::Obj));
        assert_eq!(MeshFormat::from_path("model.OBJ"), Some(MeshFormat::Obj));
        assert_eq!(
            MeshFormat::from_path("/path/to/model.stl"),
            Some(MeshFormat::Stl)
        );
    }

    #[test]
    fn format_from_path_unknown() {
        assert_eq!(MeshFormat::from_path("model.ply"), None);
        assert_eq!(MeshFormat::from_path("model"), None);
        assert_eq!(MeshFormat::from_path(""), None);
    }

    #[test]
    fn unknown_extension_is_error() {
        let mesh = IndexedMesh::new();
        assert!(matches!(
            save_mesh(&mesh, "out.xyz"),
            Err(IoError::UnknownFormat { extension }) if extension == "xyz"
        ));
    }
}
