//! Property tests for translation, normalization and sampling.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use mesh_types::{IndexedMesh, MeshBounds, Vector3, unit_cube};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use sdf_dataset::{PointSampler, SamplingBudget, TranslateMode, normalize};

fn arb_box() -> impl Strategy<Value = IndexedMesh> {
    (0.1..5.0f64, -10.0..10.0f64, -10.0..10.0f64, -10.0..10.0f64).prop_map(|(s, x, y, z)| {
        let mut cube = unit_cube();
        cube.scale(s);
        cube.translate(Vector3::new(x, y, z));
        cube
    })
}

proptest! {
    #[test]
    fn sampler_sizes_and_block_order(
        surface in 0usize..40,
        bbox in 0usize..40,
        volume in 0usize..40,
        seed in any::<u64>(),
    ) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut mesh = unit_cube();
        mesh.translate(Vector3::new(5.0, 5.0, 5.0));
        let set = PointSampler::new(0.0, false)
            .sample(&mesh, SamplingBudget::new(surface, bbox, volume), &mut rng)
            .unwrap();

        prop_assert_eq!(set.len(), surface + bbox + volume);
        prop_assert_eq!(set.surface().len(), surface);
        prop_assert_eq!(set.bbox().len(), bbox);
        prop_assert_eq!(set.volume().len(), volume);
        // the mesh sits in [5, 6]³, the unit cube block in [0, 1]³
        let far = |p: &nalgebra::Point3<f64>| p.x > 4.5 && p.y > 4.5 && p.z > 4.5;
        prop_assert!(set.surface().iter().all(far));
        prop_assert!(set.bbox().iter().all(far));
        prop_assert!(set.volume().iter().all(|p| p.x < 1.0 && p.y < 1.0 && p.z < 1.0));
    }

    #[test]
    fn translate_modes_hit_their_reference(mesh in arb_box()) {
        let mut a = mesh.clone();
        TranslateMode::MinBound.apply(&mut a);
        prop_assert!(a.bounds().min.coords.norm() < 1e-9);

        let mut b = mesh.clone();
        TranslateMode::Center.apply(&mut b);
        prop_assert!(b.vertex_centroid().unwrap().coords.norm() < 1e-9);

        let mut c = mesh;
        TranslateMode::CenterWithoutZ.apply(&mut c);
        let bounds = c.bounds();
        prop_assert!(bounds.center().x.abs() < 1e-9);
        prop_assert!(bounds.center().y.abs() < 1e-9);
        prop_assert!(bounds.min.z.abs() < 1e-9);
    }

    #[test]
    fn normalization_is_idempotent(mesh in arb_box()) {
        let mut once = mesh;
        let length = normalize(&mut once, None).unwrap();
        prop_assert!(length > 0.0);
        prop_assert!((once.max_vertex_norm() - 1.0).abs() < 1e-9);

        let mut twice = once.clone();
        normalize(&mut twice, Some(1.0)).unwrap();
        for (p, q) in once.positions().zip(twice.positions()) {
            prop_assert!((p - q).norm() < 1e-12);
        }
    }

    #[test]
    fn supplied_length_bounds_the_norm(mesh in arb_box(), extra in 1.0..3.0f64) {
        let mut scaled = mesh.clone();
        let corpus_length = mesh.max_vertex_norm() * extra;
        normalize(&mut scaled, Some(corpus_length)).unwrap();
        prop_assert!(scaled.max_vertex_norm() <= 1.0 + 1e-12);
    }
}
