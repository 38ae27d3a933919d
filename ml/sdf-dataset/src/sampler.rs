//! Stratified point sampling for SDF supervision.
//!
//! A [`SampledPointSet`] holds three consecutive blocks: points near the
//! surface, points uniform in the mesh bounding box, and points uniform in
//! the unit cube. Signed distances computed afterwards align index-wise with
//! this order.

use mesh_sdf::{SdfError, sample_surface};
use mesh_types::{IndexedMesh, MeshBounds};
use nalgebra::{Point3, Vector3};
use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::error::{DatasetError, Result};

/// Number of points per block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SamplingBudget {
    /// Points drawn on the surface (then jittered).
    pub surface: usize,
    /// Points uniform in the mesh bounding box.
    pub bbox: usize,
    /// Points uniform in the unit cube.
    pub volume: usize,
}

impl Default for SamplingBudget {
    fn default() -> Self {
        Self::new(32_768, 8_192, 8_192)
    }
}

impl SamplingBudget {
    /// Create a budget.
    #[must_use]
    pub const fn new(surface: usize, bbox: usize, volume: usize) -> Self {
        Self {
            surface,
            bbox,
            volume,
        }
    }

    /// Total number of points.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.surface + self.bbox + self.volume
    }

    /// Multiply every block by `factor`, saturating.
    #[must_use]
    pub const fn scaled(&self, factor: usize) -> Self {
        Self {
            surface: self.surface.saturating_mul(factor),
            bbox: self.bbox.saturating_mul(factor),
            volume: self.volume.saturating_mul(factor),
        }
    }
}

/// Vertex-count driven budget policy.
///
/// The base budget is multiplied by `1 + vertices / vertices_per_step`,
/// capped at `max_multiplier`. The result never decreases as the vertex count
/// grows and depends on nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DynamicSampling {
    /// Vertices per extra multiple of the base budget.
    pub vertices_per_step: usize,
    /// Upper bound of the multiplier.
    pub max_multiplier: usize,
}

impl Default for DynamicSampling {
    fn default() -> Self {
        Self {
            vertices_per_step: 10_000,
            max_multiplier: 4,
        }
    }
}

impl DynamicSampling {
    /// Multiplier for a mesh with `vertex_count` vertices.
    #[must_use]
    pub fn multiplier(&self, vertex_count: usize) -> usize {
        let step = self.vertices_per_step.max(1);
        (1 + vertex_count / step).min(self.max_multiplier.max(1))
    }

    /// Budget for a mesh with `vertex_count` vertices.
    ///
    /// # Example
    ///
    /// ```
    /// use sdf_dataset::{DynamicSampling, SamplingBudget};
    ///
    /// let policy = DynamicSampling { vertices_per_step: 100, max_multiplier: 3 };
    /// let base = SamplingBudget::new(10, 5, 5);
    /// assert_eq!(policy.budget_for(&base, 50).total(), 20);
    /// assert_eq!(policy.budget_for(&base, 150).total(), 40);
    /// assert_eq!(policy.budget_for(&base, 10_000).total(), 60);
    /// ```
    #[must_use]
    pub fn budget_for(&self, base: &SamplingBudget, vertex_count: usize) -> SamplingBudget {
        base.scaled(self.multiplier(vertex_count))
    }
}

/// Points in fixed block order: surface, bounding box, unit cube.
#[derive(Debug, Clone, PartialEq)]
pub struct SampledPointSet {
    points: Vec<Point3<f64>>,
    budget: SamplingBudget,
}

impl SampledPointSet {
    /// All points in block order.
    #[must_use]
    pub fn points(&self) -> &[Point3<f64>] {
        &self.points
    }

    /// Consume the set, returning the points.
    #[must_use]
    pub fn into_points(self) -> Vec<Point3<f64>> {
        self.points
    }

    /// Block sizes.
    #[must_use]
    pub const fn budget(&self) -> &SamplingBudget {
        &self.budget
    }

    /// Total point count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether no points were drawn.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Surface block.
    #[must_use]
    pub fn surface(&self) -> &[Point3<f64>] {
        &self.points[..self.budget.surface]
    }

    /// Bounding box block.
    #[must_use]
    pub fn bbox(&self) -> &[Point3<f64>] {
        let start = self.budget.surface;
        &self.points[start..start + self.budget.bbox]
    }

    /// Unit cube block.
    #[must_use]
    pub fn volume(&self) -> &[Point3<f64>] {
        &self.points[self.budget.surface + self.budget.bbox..]
    }
}

/// Draws stratified point sets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointSampler {
    /// Standard deviation of the per-axis surface jitter.
    pub sigma: f64,
    /// Jitter surface points; when false the effective sigma is zero.
    pub add_noise: bool,
}

impl Default for PointSampler {
    fn default() -> Self {
        Self {
            sigma: 0.01,
            add_noise: true,
        }
    }
}

impl PointSampler {
    /// Create a sampler.
    #[must_use]
    pub const fn new(sigma: f64, add_noise: bool) -> Self {
        Self { sigma, add_noise }
    }

    /// Standard deviation actually applied to surface points.
    #[must_use]
    pub const fn effective_sigma(&self) -> f64 {
        if self.add_noise { self.sigma } else { 0.0 }
    }

    /// Draw `budget.total()` points for `mesh`.
    ///
    /// # Errors
    ///
    /// Returns an error if sigma is negative or not finite, or if a non-empty
    /// surface or bounding box block is requested for an empty or zero-area
    /// mesh.
    pub fn sample<R: Rng + ?Sized>(
        &self,
        mesh: &IndexedMesh,
        budget: SamplingBudget,
        rng: &mut R,
    ) -> Result<SampledPointSet> {
        let sigma = self.effective_sigma();
        let noise = Normal::new(0.0, sigma)
            .map_err(|e| DatasetError::invalid_config(format!("sigma {sigma}: {e}")))?;

        let mut points = Vec::with_capacity(budget.total());

        let surface = sample_surface(mesh, budget.surface, rng)?;
        if sigma > 0.0 {
            points.extend(surface.into_iter().map(|p| {
                p + Vector3::new(noise.sample(rng), noise.sample(rng), noise.sample(rng))
            }));
        } else {
            points.extend(surface);
        }

        if budget.bbox > 0 {
            let bounds = mesh.bounds();
            if bounds.is_empty() {
                return Err(SdfError::EmptyMesh.into());
            }
            let size = bounds.size();
            points.extend((0..budget.bbox).map(|_| {
                bounds.min
                    + Vector3::new(
                        size.x * rng.r#gen::<f64>(),
                        size.y * rng.r#gen::<f64>(),
                        size.z * rng.r#gen::<f64>(),
                    )
            }));
        }

        points.extend(
            (0..budget.volume)
                .map(|_| Point3::new(rng.r#gen::<f64>(), rng.r#gen::<f64>(), rng.r#gen::<f64>())),
        );

        Ok(SampledPointSet { points, budget })
    }
}
