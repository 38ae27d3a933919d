//! Watertight repair.
//!
//! [`WatertightRepair`] is the seam used by dataset building and mesh
//! extraction to close meshes before signed distances are computed.
//! [`HoleFillRepair`] is the default strategy: weld at a tolerance derived
//! from the requested resolution, drop degenerate and duplicate faces, fill
//! every boundary loop and re-orient each body outward.

use mesh_types::{IndexedMesh, MeshBounds};
use tracing::{debug, warn};

use crate::cleanup::{
    remove_degenerate_faces, remove_duplicate_faces, remove_unreferenced_vertices, weld_vertices,
};
use crate::error::{RepairError, RepairResult, check_indices};
use crate::holes::fill_holes;
use crate::validate::is_watertight;
use crate::winding::fix_normals;

/// Default repair resolution.
pub const DEFAULT_WATERTIGHT_RESOLUTION: u32 = 100_000;

/// A strategy that turns an arbitrary triangle mesh into a closed one.
pub trait WatertightRepair: Send + Sync {
    /// Produce a repaired copy of `mesh`.
    ///
    /// The result may still fail [`is_watertight`] when the input is too
    /// damaged; callers decide how to report that.
    ///
    /// # Errors
    ///
    /// Returns an error if the mesh is empty or has invalid indices.
    fn repair(&self, mesh: &IndexedMesh) -> RepairResult<IndexedMesh>;
}

/// Counts of what [`HoleFillRepair`] changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepairSummary {
    /// Vertices merged by welding.
    pub vertices_welded: usize,
    /// Degenerate faces dropped.
    pub degenerate_faces_removed: usize,
    /// Duplicate faces dropped.
    pub duplicate_faces_removed: usize,
    /// Boundary loops closed.
    pub holes_filled: usize,
    /// Faces re-oriented.
    pub faces_flipped: usize,
}

/// Weld, clean, fill holes, fix orientation.
///
/// # Example
///
/// ```
/// use mesh_repair::{HoleFillRepair, WatertightRepair, is_watertight};
/// use mesh_types::unit_cube;
///
/// let mut open = unit_cube();
/// open.faces.truncate(10);
/// let closed = HoleFillRepair::default().repair(&open).unwrap();
/// assert!(is_watertight(&closed));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoleFillRepair {
    /// Weld tolerance is the bounding box diagonal divided by this value.
    pub resolution: u32,
}

impl Default for HoleFillRepair {
    fn default() -> Self {
        Self::new(DEFAULT_WATERTIGHT_RESOLUTION)
    }
}

impl HoleFillRepair {
    /// Create a repair with the given resolution.
    #[must_use]
    pub const fn new(resolution: u32) -> Self {
        Self { resolution }
    }

    /// Repair `mesh` in place and report what changed.
    ///
    /// # Errors
    ///
    /// Returns an error if the resolution is zero, the mesh is empty or a face
    /// index is out of range.
    pub fn repair_in_place(&self, mesh: &mut IndexedMesh) -> RepairResult<RepairSummary> {
        if self.resolution == 0 {
            return Err(RepairError::InvalidParameter {
                reason: "resolution must be positive".to_string(),
            });
        }
        check_indices(mesh)?;

        let tolerance = mesh.bounds().diagonal() / f64::from(self.resolution);
        let mut summary = RepairSummary {
            vertices_welded: weld_vertices(mesh, tolerance),
            degenerate_faces_removed: remove_degenerate_faces(mesh, tolerance * tolerance),
            duplicate_faces_removed: remove_duplicate_faces(mesh),
            ..RepairSummary::default()
        };
        if mesh.faces.is_empty() {
            return Err(RepairError::EmptyMesh);
        }

        summary.faces_flipped += fix_normals(mesh).faces_flipped;
        summary.holes_filled = fill_holes(mesh, usize::MAX);
        if summary.holes_filled > 0 {
            summary.faces_flipped += fix_normals(mesh).faces_flipped;
        }
        remove_unreferenced_vertices(mesh);

        debug!(?summary, "watertight repair finished");
        Ok(summary)
    }
}

impl WatertightRepair for HoleFillRepair {
    fn repair(&self, mesh: &IndexedMesh) -> RepairResult<IndexedMesh> {
        let mut out = mesh.clone();
        self.repair_in_place(&mut out)?;
        if !is_watertight(&out) {
            warn!(
                faces = out.faces.len(),
                "mesh is still not watertight after hole filling"
            );
        }
        Ok(out)
    }
}
