//! Mesh validation and repair.
//!
//! This crate provides:
//! - Edge adjacency and watertightness checks
//! - Vertex welding, degenerate and duplicate face removal
//! - Per-body winding repair that orients closed bodies outward
//! - Hole detection and ear-clipping hole filling
//! - [`WatertightRepair`], the strategy used to close meshes before signed
//!   distances are evaluated, with [`HoleFillRepair`] as the default
//!
//! # Example
//!
//! ```
//! use mesh_repair::{fix_normals, validate_mesh};
//! use mesh_types::unit_cube;
//!
//! let mut mesh = unit_cube();
//! mesh.flip_normals();
//! assert!(validate_mesh(&mesh).is_inside_out());
//!
//! let report = fix_normals(&mut mesh);
//! assert_eq!(report.bodies_inverted, 1);
//! assert!(!validate_mesh(&mesh).is_inside_out());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod adjacency;
mod cleanup;
mod error;
mod holes;
mod validate;
mod watertight;
mod winding;

pub use adjacency::{EdgeKey, MeshAdjacency, face_edges, has_directed_edge};
pub use cleanup::{
    remove_degenerate_faces, remove_duplicate_faces, remove_unreferenced_vertices, weld_vertices,
};
pub use error::{RepairError, RepairResult, check_indices};
pub use holes::{BoundaryLoop, detect_holes, fill_hole, fill_holes};
pub use validate::{MeshReport, is_watertight, validate_mesh};
pub use watertight::{DEFAULT_WATERTIGHT_RESOLUTION, HoleFillRepair, RepairSummary, WatertightRepair};
pub use winding::{WindingReport, face_components, fix_normals, is_winding_consistent};
