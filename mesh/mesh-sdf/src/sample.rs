//! Area-weighted surface sampling.

use mesh_types::{IndexedMesh, MeshTopology, Triangle};
use nalgebra::Point3;
use rand::Rng;
use rand::distributions::{Distribution, WeightedIndex};

use crate::error::{SdfError, SdfResult};

/// Draw `count` points uniformly distributed over the surface of `mesh`.
///
/// A face is chosen with probability proportional to its area, then a point
/// is drawn uniformly inside it.
///
/// # Errors
///
/// Returns [`SdfError::EmptyMesh`] or [`SdfError::ZeroArea`] when `count > 0`
/// and the mesh has nothing to sample from.
///
/// # Example
///
/// ```
/// use mesh_sdf::sample_surface;
/// use mesh_types::unit_cube;
/// use rand::SeedableRng;
/// use rand_chacha::ChaCha8Rng;
///
/// let mut rng = ChaCha8Rng::seed_from_u64(7);
/// let points = sample_surface(&unit_cube(), 100, &mut rng).unwrap();
/// assert_eq!(points.len(), 100);
/// ```
pub fn sample_surface<R: Rng + ?Sized>(
    mesh: &IndexedMesh,
    count: usize,
    rng: &mut R,
) -> SdfResult<Vec<Point3<f64>>> {
    if count == 0 {
        return Ok(Vec::new());
    }
    let triangles: Vec<Triangle> = mesh.triangles().collect();
    if triangles.is_empty() {
        return Err(SdfError::EmptyMesh);
    }
    let weights = WeightedIndex::new(triangles.iter().map(Triangle::area))
        .map_err(|_| SdfError::ZeroArea)?;

    Ok((0..count)
        .map(|_| {
            let tri = &triangles[weights.sample(rng)];
            tri.point_from_unit_square(rng.r#gen(), rng.r#gen())
        })
        .collect())
}
