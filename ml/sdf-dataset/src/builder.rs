//! Corpus-level dataset building.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use mesh_repair::{HoleFillRepair, WatertightRepair};
use mesh_sdf::MeshSdf;
use mesh_types::{MeshTopology, Vector3};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::archive::TrainingArchive;
use crate::config::DatasetConfig;
use crate::error::{DatasetError, Result};
use crate::normalizer::{LoadedMesh, MeshNormalizer, normalize};

/// Offset applied after scaling so shapes sit in the sampling cube.
pub const SAMPLING_CUBE_OFFSET: [f64; 3] = [0.5, 0.5, 0.0];

/// Outcome of [`DatasetBuilder::build`].
#[derive(Debug, Clone, PartialEq)]
pub struct BuildSummary {
    /// Archives written, in class id order.
    pub archives: Vec<PathBuf>,
    /// Corpus-wide scale length.
    pub max_length: f64,
    /// Total samples written.
    pub sample_count: usize,
}

/// Turns a directory of meshes into one training archive per mesh.
///
/// # Example
///
/// ```no_run
/// use sdf_dataset::{DatasetBuilder, DatasetConfig};
///
/// let builder = DatasetBuilder::new(DatasetConfig::new("data/raw", "data/sdf")).unwrap();
/// let summary = builder.build().unwrap();
/// println!("wrote {} archives", summary.archives.len());
/// ```
#[derive(Debug, Clone)]
pub struct DatasetBuilder {
    config: DatasetConfig,
    normalizer: MeshNormalizer,
}

impl DatasetBuilder {
    /// Create a builder with the default watertight repair.
    ///
    /// # Errors
    ///
    /// Returns an error if the config is invalid.
    pub fn new(config: DatasetConfig) -> Result<Self> {
        let repair = Arc::new(HoleFillRepair::new(config.watertight_resolution));
        Self::with_repair(config, repair)
    }

    /// Create a builder with a custom watertight repair.
    ///
    /// # Errors
    ///
    /// Returns an error if the config is invalid.
    pub fn with_repair(config: DatasetConfig, repair: Arc<dyn WatertightRepair>) -> Result<Self> {
        config.validate()?;
        let normalizer = MeshNormalizer::with_repair(config.load_options(), repair);
        Ok(Self { config, normalizer })
    }

    /// The build configuration.
    #[must_use]
    pub const fn config(&self) -> &DatasetConfig {
        &self.config
    }

    /// Source meshes in `raw_dir`, sorted by path.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be read or holds no mesh with
    /// the configured extension.
    pub fn discover(&self) -> Result<Vec<PathBuf>> {
        let mut paths = Vec::new();
        for entry in fs::read_dir(&self.config.raw_dir)? {
            let path = entry?.path();
            let matches = path.is_file()
                && path
                    .extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| e.eq_ignore_ascii_case(&self.config.mesh_extension));
            if matches {
                paths.push(path);
            }
        }
        if paths.is_empty() {
            return Err(DatasetError::NoMeshes {
                dir: self.config.raw_dir.clone(),
                extension: self.config.mesh_extension.clone(),
            });
        }
        paths.sort();
        Ok(paths)
    }

    /// Load every mesh in parallel, returning them with the corpus max norm.
    ///
    /// # Errors
    ///
    /// Returns the first load or repair error.
    pub fn load_corpus(&self, paths: &[PathBuf]) -> Result<(Vec<LoadedMesh>, f64)> {
        let loaded: Vec<(LoadedMesh, f64)> = paths
            .par_iter()
            .map(|path| self.normalizer.compute_max_norm(path))
            .collect::<Result<_>>()?;
        let max_length = loaded.iter().map(|(_, norm)| *norm).fold(0.0, f64::max);
        Ok((loaded.into_iter().map(|(mesh, _)| mesh).collect(), max_length))
    }

    /// Scale, recenter, sample and evaluate one mesh.
    ///
    /// # Errors
    ///
    /// Returns an error if the mesh cannot be scaled, sampled or evaluated.
    pub fn process_mesh(
        &self,
        mut loaded: LoadedMesh,
        max_length: f64,
        class_id: u32,
    ) -> Result<TrainingArchive> {
        normalize(&mut loaded.mesh, Some(max_length))
            .ok_or_else(|| DatasetError::DegenerateMesh(loaded.source.clone()))?;
        loaded.mesh.translate(Vector3::from(SAMPLING_CUBE_OFFSET));

        let budget = self.config.budget_for(loaded.mesh.vertex_count());
        let class_name = loaded.class_name();
        debug!(
            class_name,
            class_id,
            surface = budget.surface,
            bbox = budget.bbox,
            volume = budget.volume,
            "sampling budget"
        );

        let mut rng = self.config.seed.map_or_else(ChaCha8Rng::from_entropy, |seed| {
            ChaCha8Rng::seed_from_u64(seed.wrapping_add(u64::from(class_id)))
        });
        let samples = self
            .config
            .point_sampler()
            .sample(&loaded.mesh, budget, &mut rng)?;

        let sdf = MeshSdf::new(&loaded.mesh)?;
        let distances = sdf.signed_distances(samples.points());
        TrainingArchive::from_samples(samples.points(), &distances, class_id, class_name)
    }

    /// Run the whole build.
    ///
    /// Any load, repair, sampling or write failure aborts the build.
    ///
    /// # Errors
    ///
    /// See [`DatasetBuilder::discover`], [`DatasetBuilder::load_corpus`] and
    /// [`DatasetBuilder::process_mesh`].
    pub fn build(&self) -> Result<BuildSummary> {
        let start = Instant::now();
        let paths = self.discover()?;
        let (meshes, max_length) = self.load_corpus(&paths)?;
        info!(meshes = meshes.len(), max_length, "corpus loaded");

        fs::create_dir_all(&self.config.save_dir)?;
        let mut archives = Vec::with_capacity(meshes.len());
        let mut sample_count = 0;
        for (class_id, loaded) in (0u32..).zip(meshes) {
            let archive = self.process_mesh(loaded, max_length, class_id)?;
            let path = archive.path_in(&self.config.save_dir);
            archive.save(&path)?;
            debug!(path = %path.display(), samples = archive.len(), "archive written");
            sample_count += archive.len();
            archives.push(path);
        }

        info!(
            archives = archives.len(),
            sample_count,
            elapsed_ms = start.elapsed().as_millis(),
            "dataset build finished"
        );
        Ok(BuildSummary {
            archives,
            max_length,
            sample_count,
        })
    }

    /// Save directory of the build.
    #[must_use]
    pub fn save_dir(&self) -> &Path {
        &self.config.save_dir
    }
}
