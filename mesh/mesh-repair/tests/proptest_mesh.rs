//! Property-based tests for validation and repair.
//!
//! Run with: cargo test -p mesh-repair --test proptest_mesh

#![allow(clippy::unwrap_used, clippy::expect_used)]

use approx::assert_relative_eq;
use mesh_repair::{
    HoleFillRepair, WatertightRepair, fix_normals, is_watertight, validate_mesh, weld_vertices,
};
use mesh_types::{IndexedMesh, MeshTopology, Vector3, Vertex, unit_cube};
use proptest::prelude::*;

fn arb_vertex() -> impl Strategy<Value = Vertex> {
    prop::array::uniform3(-100.0..100.0f64).prop_map(Vertex::from)
}

/// Random triangle soup with valid indices.
fn arb_mesh(max_vertices: usize, max_faces: usize) -> impl Strategy<Value = IndexedMesh> {
    prop::collection::vec(arb_vertex(), 3..=max_vertices).prop_flat_map(move |verts| {
        let n = u32::try_from(verts.len()).unwrap_or(3);
        prop::collection::vec(prop::array::uniform3(0..n), 1..=max_faces).prop_map(move |faces| {
            IndexedMesh::from_parts(verts.clone(), faces)
        })
    })
}

/// Cube with a random subset of faces flipped and an offset.
fn arb_scrambled_cube() -> impl Strategy<Value = IndexedMesh> {
    (
        prop::collection::vec(any::<bool>(), 12),
        prop::array::uniform3(-10.0..10.0f64),
    )
        .prop_map(|(flips, [x, y, z])| {
            let mut cube = unit_cube();
            cube.translate(Vector3::new(x, y, z));
            for (face, flip) in cube.faces.iter_mut().zip(flips) {
                if flip {
                    face.swap(1, 2);
                }
            }
            cube
        })
}

proptest! {
    #[test]
    fn validation_is_deterministic(mesh in arb_mesh(30, 50)) {
        prop_assert_eq!(validate_mesh(&mesh), validate_mesh(&mesh));
    }

    #[test]
    fn weld_keeps_indices_valid(mesh in arb_mesh(30, 50)) {
        let mut welded = mesh.clone();
        weld_vertices(&mut welded, 0.01);
        prop_assert_eq!(welded.vertex_count(), mesh.vertex_count());
        prop_assert!(welded.indices_in_range());
        prop_assert!(welded.face_count() <= mesh.face_count());
    }

    #[test]
    fn repair_never_panics_and_keeps_indices_valid(mesh in arb_mesh(20, 40)) {
        if let Ok(repaired) = HoleFillRepair::default().repair(&mesh) {
            prop_assert!(repaired.indices_in_range());
        }
    }

    #[test]
    fn fix_normals_orients_any_scrambled_cube(cube in arb_scrambled_cube()) {
        let mut mesh = cube;
        fix_normals(&mut mesh);
        prop_assert!(is_watertight(&mesh));
        prop_assert!((mesh.signed_volume() - 1.0).abs() < 1e-9);
    }
}

#[test]
fn cube_repair_is_stable() {
    let cube = unit_cube();
    let repaired = HoleFillRepair::default().repair(&cube).expect("should repair");
    assert_eq!(repaired.vertex_count(), 8);
    assert_eq!(repaired.face_count(), 12);
    assert_relative_eq!(repaired.signed_volume(), 1.0, epsilon = 1e-12);
}
