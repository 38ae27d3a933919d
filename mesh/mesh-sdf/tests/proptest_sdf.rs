//! Property tests for signed distances on an axis-aligned box.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use mesh_sdf::MeshSdf;
use mesh_types::{Vector3, unit_cube};
use nalgebra::Point3;
use proptest::prelude::*;

/// Exact signed distance to the box `[0, 1]³`.
fn box_sdf(p: Point3<f64>) -> f64 {
    let q = Vector3::new(
        (p.x - 0.5).abs() - 0.5,
        (p.y - 0.5).abs() - 0.5,
        (p.z - 0.5).abs() - 0.5,
    );
    let outside = q.map(|c| c.max(0.0)).norm();
    let inside = q.x.max(q.y).max(q.z).min(0.0);
    outside + inside
}

proptest! {
    #[test]
    fn matches_analytic_box(x in -1.0..2.0f64, y in -1.0..2.0f64, z in -1.0..2.0f64) {
        let sdf = MeshSdf::new(&unit_cube()).unwrap();
        let p = Point3::new(x, y, z);
        let expected = box_sdf(p);
        // points too close to the surface have an ambiguous sign
        prop_assume!(expected.abs() > 1e-6);
        prop_assert!((sdf.signed_distance(p) - expected).abs() < 1e-9);
    }

    #[test]
    fn translation_invariant(dx in -5.0..5.0f64, dy in -5.0..5.0f64, dz in -5.0..5.0f64) {
        let mut moved = unit_cube();
        let offset = Vector3::new(dx, dy, dz);
        moved.translate(offset);
        let a = MeshSdf::new(&unit_cube()).unwrap();
        let b = MeshSdf::new(&moved).unwrap();
        let p = Point3::new(0.25, 0.7, 0.4);
        prop_assert!((a.signed_distance(p) - b.signed_distance(p + offset)).abs() < 1e-9);
    }
}
