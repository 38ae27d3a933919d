//! Signed distance to a triangle mesh.
//!
//! The magnitude is the Euclidean distance to the closest surface point. The
//! sign comes from the generalized winding number: points with winding
//! number above one half are inside and get a negative distance. This stays
//! well behaved on meshes with small cracks, where ray parity would flip.

use std::f64::consts::PI;

use mesh_types::{IndexedMesh, MeshTopology, Triangle};
use nalgebra::Point3;
use rayon::prelude::*;
use tracing::debug;

use crate::error::{SdfError, SdfResult};
use crate::query::{closest_point_on_triangle, solid_angle};

/// Distance queries against a fixed mesh.
///
/// # Example
///
/// ```
/// use mesh_sdf::MeshSdf;
/// use mesh_types::unit_cube;
/// use nalgebra::Point3;
///
/// let sdf = MeshSdf::new(&unit_cube()).unwrap();
/// assert!((sdf.signed_distance(Point3::new(0.5, 0.5, 0.5)) + 0.5).abs() < 1e-12);
/// assert!((sdf.signed_distance(Point3::new(2.0, 0.5, 0.5)) - 1.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct MeshSdf {
    triangles: Vec<Triangle>,
}

impl MeshSdf {
    /// Prepare queries against `mesh`.
    ///
    /// # Errors
    ///
    /// Returns [`SdfError::EmptyMesh`] for a mesh without faces and
    /// [`SdfError::InvalidIndex`] if a face index is out of range.
    pub fn new(mesh: &IndexedMesh) -> SdfResult<Self> {
        if mesh.faces.is_empty() {
            return Err(SdfError::EmptyMesh);
        }
        let vertex_count = mesh.vertex_count();
        let mut triangles = Vec::with_capacity(mesh.face_count());
        for (face, f) in mesh.faces.iter().enumerate() {
            if let Some(&index) = f.iter().find(|&&i| i as usize >= vertex_count) {
                return Err(SdfError::InvalidIndex {
                    face,
                    index,
                    vertex_count,
                });
            }
            triangles.extend(mesh.triangle(face));
        }
        Ok(Self { triangles })
    }

    /// Number of triangles queried.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Closest point on the surface to `p`.
    #[must_use]
    pub fn closest_point(&self, p: Point3<f64>) -> Point3<f64> {
        let mut best = p;
        let mut best_sq = f64::INFINITY;
        for t in &self.triangles {
            let q = closest_point_on_triangle(p, t.v0, t.v1, t.v2);
            let d = (q - p).norm_squared();
            if d < best_sq {
                best_sq = d;
                best = q;
            }
        }
        best
    }

    /// Distance from `p` to the surface.
    #[must_use]
    pub fn unsigned_distance(&self, p: Point3<f64>) -> f64 {
        (self.closest_point(p) - p).norm()
    }

    /// Generalized winding number of the surface around `p`.
    ///
    /// About 1 inside a closed outward-facing mesh, 0 outside.
    #[must_use]
    pub fn winding_number(&self, p: Point3<f64>) -> f64 {
        self.triangles
            .iter()
            .map(|t| solid_angle(p, t.v0, t.v1, t.v2))
            .sum::<f64>()
            / (4.0 * PI)
    }

    /// Whether `p` is inside the surface.
    #[must_use]
    pub fn is_inside(&self, p: Point3<f64>) -> bool {
        self.winding_number(p) > 0.5
    }

    /// Signed distance at `p`: negative inside, positive outside.
    #[must_use]
    pub fn signed_distance(&self, p: Point3<f64>) -> f64 {
        let d = self.unsigned_distance(p);
        if self.is_inside(p) { -d } else { d }
    }

    /// Signed distances for many points, evaluated in parallel.
    ///
    /// The output has the same length and order as `points`.
    #[must_use]
    pub fn signed_distances(&self, points: &[Point3<f64>]) -> Vec<f64> {
        let out: Vec<f64> = points.par_iter().map(|&p| self.signed_distance(p)).collect();
        debug!(
            points = points.len(),
            triangles = self.triangles.len(),
            "evaluated signed distances"
        );
        out
    }
}

/// Signed distance from each point to `mesh`, in input order.
///
/// # Errors
///
/// See [`MeshSdf::new`].
pub fn signed_distance_to_mesh(points: &[Point3<f64>], mesh: &IndexedMesh) -> SdfResult<Vec<f64>> {
    Ok(MeshSdf::new(mesh)?.signed_distances(points))
}
