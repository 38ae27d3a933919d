//! Synthesis configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SynthesisError};
use crate::extract::ExtractOptions;
use crate::grid::VolumeGrid;

/// Configuration of the synthesis loop.
///
/// # Example
///
/// ```
/// use sdf_synthesis::SynthesisConfig;
///
/// let config = SynthesisConfig::new("out").with_resolution(64).with_seed(3);
/// assert!(config.validate().is_ok());
/// assert_eq!(config.batch_count, 1000);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisConfig {
    /// Directory receiving meshes and the ledger.
    pub save_dir: PathBuf,

    /// Grid samples per axis.
    pub resolution: usize,

    /// Lower grid corner.
    pub grid_min: [f32; 3],

    /// Upper grid corner.
    pub grid_max: [f32; 3],

    /// Approximate number of decoder batches per grid.
    pub batch_count: usize,

    /// Rescale extracted meshes into the unit ball.
    pub normalize: bool,

    /// Swap Y and Z on extracted meshes.
    pub map_z_to_y: bool,

    /// Repair extracted meshes that are not watertight.
    pub check_watertight: bool,

    /// Stop once the ledger holds this many records; `None` runs forever.
    pub target_count: Option<usize>,

    /// Probability of drawing only from the trained codes.
    pub trained_bias: f64,

    /// Interpolation factors are drawn uniformly from this range.
    pub interpolation_factor_range: [f64; 2],

    /// Seed for selection draws; `None` draws from entropy.
    pub seed: Option<u64>,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self::new("synthesized")
    }
}

impl SynthesisConfig {
    /// Creates a config with default grid and selection settings.
    #[must_use]
    pub fn new(save_dir: impl Into<PathBuf>) -> Self {
        Self {
            save_dir: save_dir.into(),
            resolution: 128,
            grid_min: [-1.0; 3],
            grid_max: [1.0; 3],
            batch_count: 1000,
            normalize: true,
            map_z_to_y: true,
            check_watertight: true,
            target_count: None,
            trained_bias: 0.5,
            interpolation_factor_range: [0.25, 0.75],
            seed: None,
        }
    }

    /// Sets the grid resolution.
    #[must_use]
    pub const fn with_resolution(mut self, resolution: usize) -> Self {
        self.resolution = resolution;
        self
    }

    /// Sets the grid bounds.
    #[must_use]
    pub const fn with_bounds(mut self, min: [f32; 3], max: [f32; 3]) -> Self {
        self.grid_min = min;
        self.grid_max = max;
        self
    }

    /// Sets the batch count.
    #[must_use]
    pub const fn with_batch_count(mut self, count: usize) -> Self {
        self.batch_count = count;
        self
    }

    /// Sets the post-extraction flags.
    #[must_use]
    pub const fn with_extract_options(mut self, options: ExtractOptions) -> Self {
        self.normalize = options.normalize;
        self.map_z_to_y = options.map_z_to_y;
        self.check_watertight = options.check_watertight;
        self
    }

    /// Stops the loop at `count` records.
    #[must_use]
    pub const fn with_target_count(mut self, count: usize) -> Self {
        self.target_count = Some(count);
        self
    }

    /// Sets the probability of restricting draws to trained codes.
    #[must_use]
    pub const fn with_trained_bias(mut self, bias: f64) -> Self {
        self.trained_bias = bias;
        self
    }

    /// Sets the interpolation factor range.
    #[must_use]
    pub const fn with_factor_range(mut self, low: f64, high: f64) -> Self {
        self.interpolation_factor_range = [low, high];
        self
    }

    /// Sets the seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// The evaluation grid.
    ///
    /// # Errors
    ///
    /// Returns an error if resolution or bounds are invalid.
    pub fn grid(&self) -> Result<VolumeGrid> {
        VolumeGrid::new(self.resolution, self.grid_min, self.grid_max)
    }

    /// Post-extraction flags.
    #[must_use]
    pub const fn extract_options(&self) -> ExtractOptions {
        ExtractOptions {
            normalize: self.normalize,
            map_z_to_y: self.map_z_to_y,
            check_watertight: self.check_watertight,
        }
    }

    /// Checks the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SynthesisError::InvalidConfig`] describing the first problem.
    pub fn validate(&self) -> Result<()> {
        self.grid()?;
        if self.batch_count == 0 {
            return Err(SynthesisError::invalid_config("batch count must be positive"));
        }
        if !(0.0..=1.0).contains(&self.trained_bias) {
            return Err(SynthesisError::invalid_config(format!(
                "trained bias must be a probability, got {}",
                self.trained_bias
            )));
        }
        let [low, high] = self.interpolation_factor_range;
        if !(low.is_finite() && high.is_finite() && low <= high) {
            return Err(SynthesisError::invalid_config(format!(
                "interpolation factor range [{low}, {high}] is not ordered"
            )));
        }
        Ok(())
    }

    /// Serializes the config to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(SynthesisError::from)
    }

    /// Deserializes a config from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(SynthesisError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = SynthesisConfig::default();
        assert_eq!(config.resolution, 128);
        assert_eq!(config.grid_min, [-1.0; 3]);
        assert_eq!(config.grid_max, [1.0; 3]);
        assert!(config.normalize && config.map_z_to_y && config.check_watertight);
        assert_eq!(config.target_count, None);
        assert_eq!(config.interpolation_factor_range, [0.25, 0.75]);
        assert!(config.validate().is_ok());
        assert_eq!(config.grid().unwrap().len(), 128 * 128 * 128);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(SynthesisConfig::default().with_resolution(1).validate().is_err());
        assert!(SynthesisConfig::default().with_batch_count(0).validate().is_err());
        assert!(SynthesisConfig::default().with_trained_bias(1.5).validate().is_err());
        assert!(SynthesisConfig::default().with_factor_range(0.8, 0.2).validate().is_err());
        assert!(
            SynthesisConfig::default()
                .with_bounds([1.0; 3], [-1.0; 3])
                .validate()
                .is_err()
        );
    }

    #[test]
    fn extract_options_roundtrip() {
        let options = ExtractOptions {
            normalize: false,
            map_z_to_y: true,
            check_watertight: false,
        };
        let config = SynthesisConfig::default().with_extract_options(options);
        assert_eq!(config.extract_options(), options);
    }

    #[test]
    fn json_roundtrip() {
        let config = SynthesisConfig::new("out")
            .with_target_count(10)
            .with_seed(5)
            .with_resolution(32);
        let json = config.to_json().unwrap();
        assert!(json.contains("\"target_count\": 10"));
        assert_eq!(SynthesisConfig::from_json(&json).unwrap(), config);
    }
}
