//! Mesh loading and normalization.
//!
//! Loading runs a fixed pipeline: read every object of the file and
//! concatenate them, orient each body outward, close the mesh if requested
//! and needed, optionally swap Y and Z, then translate by the configured
//! [`TranslateMode`]. Scaling is a separate step so that a whole corpus can
//! share one scale factor.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use mesh_repair::{HoleFillRepair, WatertightRepair, fix_normals, is_watertight};
use mesh_types::{IndexedMesh, MeshTopology};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{DatasetError, Result};
use crate::translate::TranslateMode;

/// A mesh together with where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedMesh {
    /// The geometry.
    pub mesh: IndexedMesh,
    /// File the mesh was read from.
    pub source: PathBuf,
    /// Whether the geometry passed the watertight check after loading.
    pub watertight: bool,
}

impl LoadedMesh {
    /// File name up to its first `.`, used as the class name of the shape.
    ///
    /// # Example
    ///
    /// ```
    /// use sdf_dataset::LoadedMesh;
    /// use mesh_types::IndexedMesh;
    ///
    /// let loaded = LoadedMesh {
    ///     mesh: IndexedMesh::new(),
    ///     source: "raw/chair.v2.obj".into(),
    ///     watertight: false,
    /// };
    /// assert_eq!(loaded.class_name(), "chair");
    /// ```
    #[must_use]
    pub fn class_name(&self) -> String {
        self.source
            .file_name()
            .map(|n| n.to_string_lossy())
            .and_then(|n| n.split('.').next().map(str::to_string))
            .unwrap_or_default()
    }

    /// Largest vertex norm of the geometry.
    #[must_use]
    pub fn max_norm(&self) -> f64 {
        self.mesh.max_vertex_norm()
    }
}

/// Flags of the loading pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadOptions {
    /// Swap Y and Z after loading (Z-up modeling frame to Y-up training frame).
    pub map_z_to_y: bool,
    /// Run watertight repair on meshes that fail the watertight check.
    pub check_watertight: bool,
    /// Reference point moved to the origin.
    pub translate_mode: TranslateMode,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            map_z_to_y: false,
            check_watertight: true,
            translate_mode: TranslateMode::default(),
        }
    }
}

impl LoadOptions {
    /// Sets axis remapping.
    #[must_use]
    pub const fn with_map_z_to_y(mut self, map: bool) -> Self {
        self.map_z_to_y = map;
        self
    }

    /// Sets the watertight check.
    #[must_use]
    pub const fn with_check_watertight(mut self, check: bool) -> Self {
        self.check_watertight = check;
        self
    }

    /// Sets the translate mode.
    #[must_use]
    pub const fn with_translate_mode(mut self, mode: TranslateMode) -> Self {
        self.translate_mode = mode;
        self
    }
}

/// Loads meshes through the fixed pipeline and normalizes their scale.
#[derive(Clone)]
pub struct MeshNormalizer {
    options: LoadOptions,
    repair: Arc<dyn WatertightRepair>,
}

impl std::fmt::Debug for MeshNormalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MeshNormalizer")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl MeshNormalizer {
    /// Create a normalizer using [`HoleFillRepair`] at its default resolution.
    #[must_use]
    pub fn new(options: LoadOptions) -> Self {
        Self::with_repair(options, Arc::new(HoleFillRepair::default()))
    }

    /// Create a normalizer with a custom watertight repair strategy.
    #[must_use]
    pub fn with_repair(options: LoadOptions, repair: Arc<dyn WatertightRepair>) -> Self {
        Self { options, repair }
    }

    /// The pipeline flags.
    #[must_use]
    pub const fn options(&self) -> &LoadOptions {
        &self.options
    }

    /// Load and translate a mesh without scaling it.
    ///
    /// A mesh that is still not watertight after repair is returned as is,
    /// with a warning and `watertight == false`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if the
    /// repair strategy rejects the mesh (for example because it is empty).
    pub fn load(&self, path: &Path) -> Result<LoadedMesh> {
        let scene = mesh_io::load_scene(path).map_err(|source| DatasetError::MeshLoad {
            path: path.to_path_buf(),
            source,
        })?;
        let mut mesh = IndexedMesh::concatenate(scene.iter().map(|o| &o.mesh));
        debug!(
            path = %path.display(),
            objects = scene.len(),
            vertices = mesh.vertex_count(),
            faces = mesh.face_count(),
            "loaded mesh"
        );

        fix_normals(&mut mesh);
        let mut watertight = is_watertight(&mesh);
        if self.options.check_watertight && !watertight {
            debug!(path = %path.display(), "repairing non-watertight mesh");
            mesh = self.repair.repair(&mesh)?;
            watertight = is_watertight(&mesh);
        }
        if !watertight {
            warn!(path = %path.display(), "mesh is not watertight");
        }

        if self.options.map_z_to_y {
            mesh.swap_yz();
        }
        self.options.translate_mode.apply(&mut mesh);

        Ok(LoadedMesh {
            mesh,
            source: path.to_path_buf(),
            watertight,
        })
    }

    /// Load, translate and scale a mesh.
    ///
    /// With `max_length == None` the mesh is scaled by its own largest vertex
    /// norm, so the result has max norm 1. A supplied corpus-wide length
    /// yields max norm at most 1.
    ///
    /// # Errors
    ///
    /// See [`MeshNormalizer::load`]; additionally fails with
    /// [`DatasetError::DegenerateMesh`] if the scale length is zero.
    pub fn load_normalized(&self, path: &Path, max_length: Option<f64>) -> Result<LoadedMesh> {
        let mut loaded = self.load(path)?;
        normalize(&mut loaded.mesh, max_length)
            .ok_or_else(|| DatasetError::DegenerateMesh(path.to_path_buf()))?;
        Ok(loaded)
    }

    /// Load and translate a mesh, returning it unscaled with its max vertex norm.
    ///
    /// # Errors
    ///
    /// See [`MeshNormalizer::load`].
    pub fn compute_max_norm(&self, path: &Path) -> Result<(LoadedMesh, f64)> {
        let loaded = self.load(path)?;
        let norm = loaded.max_norm();
        Ok((loaded, norm))
    }
}

/// Scale `mesh` by `1 / length`.
///
/// `length` is `max_length` if given, otherwise the mesh's own largest
/// vertex norm. Returns the length used, or `None` (leaving the mesh
/// untouched) if it is not a positive finite number.
///
/// # Example
///
/// ```
/// use sdf_dataset::normalize;
/// use mesh_types::unit_cube;
///
/// let mut cube = unit_cube();
/// let length = normalize(&mut cube, None).unwrap();
/// assert!((length - 3.0_f64.sqrt()).abs() < 1e-12);
/// assert!((cube.max_vertex_norm() - 1.0).abs() < 1e-12);
/// ```
pub fn normalize(mesh: &mut IndexedMesh, max_length: Option<f64>) -> Option<f64> {
    let length = max_length.unwrap_or_else(|| mesh.max_vertex_norm());
    if !(length.is_finite() && length > 0.0) {
        return None;
    }
    mesh.scale(1.0 / length);
    Some(length)
}
