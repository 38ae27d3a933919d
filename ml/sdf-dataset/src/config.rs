//! Dataset build configuration.

use std::path::PathBuf;

use mesh_repair::DEFAULT_WATERTIGHT_RESOLUTION;
use serde::{Deserialize, Serialize};

use crate::error::{DatasetError, Result};
use crate::normalizer::LoadOptions;
use crate::sampler::{DynamicSampling, PointSampler, SamplingBudget};
use crate::translate::TranslateMode;

/// Configuration of a dataset build.
///
/// # Example
///
/// ```
/// use sdf_dataset::{DatasetConfig, TranslateMode};
///
/// let config = DatasetConfig::new("data/raw", "data/sdf")
///     .with_translate_mode(TranslateMode::Center)
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// assert_eq!(config.mesh_extension, "obj");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Directory searched for source meshes.
    pub raw_dir: PathBuf,

    /// Directory receiving one archive per mesh.
    pub save_dir: PathBuf,

    /// Translation convention used when loading.
    pub translate_mode: TranslateMode,

    /// Points per block when dynamic sampling is off, base budget otherwise.
    pub sampling: SamplingBudget,

    /// Vertex-count driven budget; `None` uses `sampling` for every mesh.
    pub dynamic_sampling: Option<DynamicSampling>,

    /// Standard deviation of the surface jitter.
    pub sigma: f64,

    /// Whether surface points are jittered.
    pub surface_noise: bool,

    /// Swap Y and Z when loading.
    pub map_z_to_y: bool,

    /// Repair meshes that are not watertight.
    pub check_watertight: bool,

    /// Extension of source meshes, without the dot.
    pub mesh_extension: String,

    /// Resolution handed to the watertight repair.
    pub watertight_resolution: u32,

    /// Seed for point sampling; `None` draws from entropy.
    pub seed: Option<u64>,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self::new("raw", "sdf")
    }
}

impl DatasetConfig {
    /// Creates a config with default sampling for the given directories.
    #[must_use]
    pub fn new(raw_dir: impl Into<PathBuf>, save_dir: impl Into<PathBuf>) -> Self {
        Self {
            raw_dir: raw_dir.into(),
            save_dir: save_dir.into(),
            translate_mode: TranslateMode::default(),
            sampling: SamplingBudget::default(),
            dynamic_sampling: None,
            sigma: 0.01,
            surface_noise: true,
            map_z_to_y: true,
            check_watertight: true,
            mesh_extension: "obj".to_string(),
            watertight_resolution: DEFAULT_WATERTIGHT_RESOLUTION,
            seed: None,
        }
    }

    /// Sets the translate mode.
    #[must_use]
    pub const fn with_translate_mode(mut self, mode: TranslateMode) -> Self {
        self.translate_mode = mode;
        self
    }

    /// Sets the base sampling budget.
    #[must_use]
    pub const fn with_sampling(mut self, sampling: SamplingBudget) -> Self {
        self.sampling = sampling;
        self
    }

    /// Enables dynamic sampling.
    #[must_use]
    pub const fn with_dynamic_sampling(mut self, policy: DynamicSampling) -> Self {
        self.dynamic_sampling = Some(policy);
        self
    }

    /// Sets the surface jitter.
    #[must_use]
    pub const fn with_noise(mut self, sigma: f64, enabled: bool) -> Self {
        self.sigma = sigma;
        self.surface_noise = enabled;
        self
    }

    /// Sets axis remapping.
    #[must_use]
    pub const fn with_map_z_to_y(mut self, map: bool) -> Self {
        self.map_z_to_y = map;
        self
    }

    /// Sets the watertight check.
    #[must_use]
    pub const fn with_check_watertight(mut self, check: bool) -> Self {
        self.check_watertight = check;
        self
    }

    /// Sets the source mesh extension.
    #[must_use]
    pub fn with_mesh_extension(mut self, extension: impl Into<String>) -> Self {
        self.mesh_extension = extension.into();
        self
    }

    /// Sets the seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Loading flags derived from this config.
    #[must_use]
    pub const fn load_options(&self) -> LoadOptions {
        LoadOptions {
            map_z_to_y: self.map_z_to_y,
            check_watertight: self.check_watertight,
            translate_mode: self.translate_mode,
        }
    }

    /// Point sampler derived from this config.
    #[must_use]
    pub const fn point_sampler(&self) -> PointSampler {
        PointSampler::new(self.sigma, self.surface_noise)
    }

    /// Budget for a mesh with `vertex_count` vertices.
    #[must_use]
    pub fn budget_for(&self, vertex_count: usize) -> SamplingBudget {
        self.dynamic_sampling.map_or(self.sampling, |policy| {
            policy.budget_for(&self.sampling, vertex_count)
        })
    }

    /// Checks the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::InvalidConfig`] describing the first problem.
    pub fn validate(&self) -> Result<()> {
        if !(self.sigma.is_finite() && self.sigma >= 0.0) {
            return Err(DatasetError::invalid_config(format!(
                "sigma must be a non-negative number, got {}",
                self.sigma
            )));
        }
        if self.sampling.total() == 0 {
            return Err(DatasetError::invalid_config("sampling budget is empty"));
        }
        if self.mesh_extension.is_empty() || self.mesh_extension.starts_with('.') {
            return Err(DatasetError::invalid_config(format!(
                "mesh extension '{}' must be non-empty and without a leading dot",
                self.mesh_extension
            )));
        }
        if self.watertight_resolution == 0 {
            return Err(DatasetError::invalid_config("watertight resolution must be positive"));
        }
        if let Some(policy) = self.dynamic_sampling {
            if policy.vertices_per_step == 0 || policy.max_multiplier == 0 {
                return Err(DatasetError::invalid_config(
                    "dynamic sampling needs a positive step and multiplier",
                ));
            }
        }
        Ok(())
    }

    /// Serializes the config to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(DatasetError::from)
    }

    /// Deserializes a config from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(DatasetError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_pipeline() {
        let config = DatasetConfig::default();
        assert!((config.sigma - 0.01).abs() < f64::EPSILON);
        assert!(config.surface_noise);
        assert!(config.map_z_to_y);
        assert!(config.check_watertight);
        assert_eq!(config.watertight_resolution, 100_000);
        assert_eq!(config.translate_mode, TranslateMode::CenterWithoutZ);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(DatasetConfig::default().with_noise(-0.1, true).validate().is_err());
        assert!(DatasetConfig::default().with_noise(f64::NAN, false).validate().is_err());
        assert!(
            DatasetConfig::default()
                .with_sampling(SamplingBudget::new(0, 0, 0))
                .validate()
                .is_err()
        );
        assert!(DatasetConfig::default().with_mesh_extension(".obj").validate().is_err());
        assert!(
            DatasetConfig::default()
                .with_dynamic_sampling(DynamicSampling {
                    vertices_per_step: 0,
                    max_multiplier: 2
                })
                .validate()
                .is_err()
        );
    }

    #[test]
    fn budget_follows_policy() {
        let base = SamplingBudget::new(100, 10, 10);
        let fixed = DatasetConfig::default().with_sampling(base);
        assert_eq!(fixed.budget_for(1_000_000), base);

        let dynamic = fixed.with_dynamic_sampling(DynamicSampling {
            vertices_per_step: 1_000,
            max_multiplier: 5,
        });
        assert_eq!(dynamic.budget_for(10), base);
        assert_eq!(dynamic.budget_for(2_500).total(), 360);
    }

    #[test]
    fn json_roundtrip() {
        let config = DatasetConfig::new("in", "out")
            .with_translate_mode(TranslateMode::MinBound)
            .with_dynamic_sampling(DynamicSampling::default())
            .with_seed(9);
        let json = config.to_json().unwrap();
        assert!(json.contains("min_bound"));
        assert_eq!(DatasetConfig::from_json(&json).unwrap(), config);
    }
}
