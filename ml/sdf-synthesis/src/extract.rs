//! Isosurface extraction from sampled signed distances.
//!
//! [`SurfaceNets`] places one vertex per grid cell whose corners change sign
//! (at the mean of the edge crossings) and one quad per sign-changing grid
//! edge, oriented so normals point from negative to positive values.

use std::sync::Arc;

use hashbrown::HashMap;
use mesh_repair::{HoleFillRepair, WatertightRepair, is_watertight};
use mesh_types::{IndexedMesh, Vertex};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, SynthesisError};
use crate::grid::VolumeGrid;

/// Post-processing applied to an extracted mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractOptions {
    /// Scale the mesh so its largest vertex norm is 1.
    pub normalize: bool,
    /// Swap Y and Z.
    pub map_z_to_y: bool,
    /// Repair the mesh if it is not watertight.
    pub check_watertight: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            normalize: true,
            map_z_to_y: true,
            check_watertight: true,
        }
    }
}

/// Turns grid samples into a mesh.
pub trait MeshExtractor {
    /// Extract the zero level set.
    ///
    /// `values[grid.index(i, j, k)]` is the signed distance at lattice point
    /// `(i, j, k)`. Returns `None` when the values never change sign.
    ///
    /// # Errors
    ///
    /// Returns an error if `values` does not match the grid or repair fails.
    fn extract(
        &self,
        grid: &VolumeGrid,
        values: &[f32],
        options: ExtractOptions,
    ) -> Result<Option<IndexedMesh>>;
}

/// Naive surface nets with optional watertight repair.
#[derive(Clone)]
pub struct SurfaceNets {
    repair: Arc<dyn WatertightRepair>,
}

impl std::fmt::Debug for SurfaceNets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurfaceNets").finish_non_exhaustive()
    }
}

impl Default for SurfaceNets {
    fn default() -> Self {
        Self::new(Arc::new(HoleFillRepair::default()))
    }
}

/// Corner offsets of a cell, bit `a` of the index selects `+1` on axis `a`.
const CORNERS: [[usize; 3]; 8] = [
    [0, 0, 0],
    [1, 0, 0],
    [0, 1, 0],
    [1, 1, 0],
    [0, 0, 1],
    [1, 0, 1],
    [0, 1, 1],
    [1, 1, 1],
];

/// The 12 cell edges as corner pairs.
const EDGES: [[usize; 2]; 12] = [
    [0, 1],
    [2, 3],
    [4, 5],
    [6, 7],
    [0, 2],
    [1, 3],
    [4, 6],
    [5, 7],
    [0, 4],
    [1, 5],
    [2, 6],
    [3, 7],
];

impl SurfaceNets {
    /// Create an extractor with a custom repair strategy.
    #[must_use]
    pub fn new(repair: Arc<dyn WatertightRepair>) -> Self {
        Self { repair }
    }

    /// Raw surface without post-processing.
    ///
    /// # Errors
    ///
    /// Returns an error if `values.len()` differs from `grid.len()`.
    #[allow(clippy::cast_possible_truncation)]
    pub fn polygonize(grid: &VolumeGrid, values: &[f32]) -> Result<Option<IndexedMesh>> {
        if values.len() != grid.len() {
            return Err(SynthesisError::invalid_config(format!(
                "{} values for a grid of {} points",
                values.len(),
                grid.len()
            )));
        }
        let n = grid.resolution();
        let inside = |i: usize, j: usize, k: usize| values[grid.index(i, j, k)] < 0.0;

        let mut mesh = IndexedMesh::new();
        let mut cell_vertex: HashMap<[usize; 3], u32> = HashMap::new();

        for k in 0..n - 1 {
            for j in 0..n - 1 {
                for i in 0..n - 1 {
                    let corner = |c: usize| {
                        let [di, dj, dk] = CORNERS[c];
                        (i + di, j + dj, k + dk)
                    };
                    let mut sum = [0.0f64; 3];
                    let mut crossings = 0u32;
                    for [a, b] in EDGES {
                        let (ai, aj, ak) = corner(a);
                        let (bi, bj, bk) = corner(b);
                        let va = values[grid.index(ai, aj, ak)];
                        let vb = values[grid.index(bi, bj, bk)];
                        if (va < 0.0) == (vb < 0.0) {
                            continue;
                        }
                        let t = f64::from(va / (va - vb));
                        let pa = grid.point(ai, aj, ak);
                        let pb = grid.point(bi, bj, bk);
                        for axis in 0..3 {
                            let (a, b) = (f64::from(pa[axis]), f64::from(pb[axis]));
                            sum[axis] += (b - a).mul_add(t, a);
                        }
                        crossings += 1;
                    }
                    if crossings > 0 {
                        let c = f64::from(crossings);
                        cell_vertex.insert([i, j, k], mesh.vertices.len() as u32);
                        mesh.vertices
                            .push(Vertex::from_coords(sum[0] / c, sum[1] / c, sum[2] / c));
                    }
                }
            }
        }

        for k in 0..n {
            for j in 0..n {
                for i in 0..n {
                    let p = [i, j, k];
                    for d in 0..3 {
                        let u = (d + 1) % 3;
                        let v = (d + 2) % 3;
                        if p[d] + 1 >= n || p[u] == 0 || p[v] == 0 || p[u] + 1 >= n || p[v] + 1 >= n {
                            continue;
                        }
                        let mut q = p;
                        q[d] += 1;
                        let from_inside = inside(p[0], p[1], p[2]);
                        if from_inside == inside(q[0], q[1], q[2]) {
                            continue;
                        }
                        let cell = |du: usize, dv: usize| {
                            let mut c = p;
                            c[u] = c[u] + du - 1;
                            c[v] = c[v] + dv - 1;
                            cell_vertex.get(&c).copied()
                        };
                        let (Some(c00), Some(c10), Some(c11), Some(c01)) =
                            (cell(0, 0), cell(1, 0), cell(1, 1), cell(0, 1))
                        else {
                            continue;
                        };
                        if from_inside {
                            mesh.faces.push([c00, c10, c11]);
                            mesh.faces.push([c00, c11, c01]);
                        } else {
                            mesh.faces.push([c00, c11, c10]);
                            mesh.faces.push([c00, c01, c11]);
                        }
                    }
                }
            }
        }

        if mesh.faces.is_empty() {
            return Ok(None);
        }
        Ok(Some(mesh))
    }
}

impl MeshExtractor for SurfaceNets {
    fn extract(
        &self,
        grid: &VolumeGrid,
        values: &[f32],
        options: ExtractOptions,
    ) -> Result<Option<IndexedMesh>> {
        let Some(mut mesh) = Self::polygonize(grid, values)? else {
            return Ok(None);
        };
        debug!(
            vertices = mesh.vertices.len(),
            faces = mesh.faces.len(),
            "surface extracted"
        );

        if options.normalize {
            sdf_dataset::normalize(&mut mesh, None);
        }
        if options.map_z_to_y {
            mesh.swap_yz();
        }
        if options.check_watertight && !is_watertight(&mesh) {
            mesh = self.repair.repair(&mesh)?;
            if !is_watertight(&mesh) {
                warn!("extracted mesh is not watertight after repair");
            }
        }
        Ok(Some(mesh))
    }
}
