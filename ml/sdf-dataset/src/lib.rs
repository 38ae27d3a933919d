//! SDF training data from triangle meshes.
//!
//! Turns a directory of meshes into per-shape archives of sample points and
//! signed distances:
//!
//! # Loading
//!
//! - [`MeshNormalizer`] - load, close, remap axes, translate and scale meshes
//! - [`TranslateMode`] - which reference point moves to the origin
//!
//! # Sampling
//!
//! - [`PointSampler`] - surface, bounding box and unit cube point blocks
//! - [`SamplingBudget`] / [`DynamicSampling`] - how many points per block
//!
//! # Building
//!
//! - [`DatasetBuilder`] - parallel corpus load, shared scale, one archive per mesh
//! - [`TrainingArchive`] - the persisted `{xyz, sdf, cls, cls_name}` unit
//! - [`DatasetConfig`] - everything a build needs, JSON round-trippable
//!
//! # Example
//!
//! ```no_run
//! use sdf_dataset::{DatasetBuilder, DatasetConfig, TrainingArchive};
//!
//! let config = DatasetConfig::new("data/raw", "data/sdf").with_seed(42);
//! let summary = DatasetBuilder::new(config).unwrap().build().unwrap();
//!
//! let first = TrainingArchive::load(&summary.archives[0]).unwrap();
//! assert_eq!(first.cls, 0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod archive;
mod builder;
pub mod codec;
mod config;
mod error;
mod normalizer;
mod sampler;
mod translate;

pub use archive::{ARCHIVE_EXTENSION, ARCHIVE_MAGIC, TrainingArchive};
pub use builder::{BuildSummary, DatasetBuilder, SAMPLING_CUBE_OFFSET};
pub use config::DatasetConfig;
pub use error::{DatasetError, Result};
pub use normalizer::{LoadOptions, LoadedMesh, MeshNormalizer, normalize};
pub use sampler::{DynamicSampling, PointSampler, SampledPointSet, SamplingBudget};
pub use translate::TranslateMode;
