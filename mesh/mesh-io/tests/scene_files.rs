//! File-level tests for scene loading and format dispatch.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use approx::assert_relative_eq;
use mesh_io::{load_mesh, load_scene, save_mesh};
use mesh_types::{MeshTopology, Vector3, unit_cube, IndexedMesh};
use tempfile::tempdir;

const TWO_OBJECTS: &str = "\
# two triangles in separate objects
o left
v 0 0 0
v 1 0 0
v 0 1 0
f 1 2 3
o right
v 5 0 0
v 6 0 0
v 5 1 0
f 4 5 6
";

#[test]
fn obj_scene_keeps_objects_and_mesh_concatenates() {
    let dir = tempdir().expect("should create temp dir");
    let path = dir.path().join("pair.obj");
    std::fs::write(&path, TWO_OBJECTS).expect("should write fixture");

    let scene = load_scene(&path).expect("should load scene");
    assert_eq!(scene.len(), 2);
    assert_eq!(scene[0].name, "left");

    let mesh = load_mesh(&path).expect("should load mesh");
    assert_eq!(mesh.face_count(), 2);
    assert_eq!(mesh.vertex_count(), 6);
    assert_eq!(mesh.faces[1], [3, 4, 5]);
}

#[test]
fn save_and_reload_across_formats() {
    let dir = tempdir().expect("should create temp dir");
    let mut a = unit_cube();
    let mut b = unit_cube();
    b.translate(Vector3::new(2.0, 0.0, 0.0));
    a.merge(&b);

    for name in ["two.obj", "two.stl"] {
        let path = dir.path().join(name);
        save_mesh(&a, &path).expect("should save");
        let loaded: IndexedMesh = load_mesh(&path).expect("should reload");
        assert_eq!(loaded.face_count(), 24);
        assert_relative_eq!(loaded.signed_volume(), 2.0, epsilon = 1e-5);
    }
}

#[test]
fn stl_scene_is_single_object() {
    let dir = tempdir().expect("should create temp dir");
    let path = dir.path().join("cube.stl");
    save_mesh(&unit_cube(), &path).expect("should save");
    let scene = load_scene(&path).expect("should load");
    assert_eq!(scene.len(), 1);
    assert!(scene[0].name.is_empty());
}
