//! Open-ended synthesis driven by the ledger.
//!
//! Each iteration flips a fair coin between interpolation and arithmetic,
//! draws parents from the ledger, and names the output after them. If a
//! file with that name already exists in the save directory the iteration
//! is skipped without touching the decoder, which makes restarts resume
//! where they left off.

use std::fs;

use mesh_io::save_obj;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

use crate::config::SynthesisConfig;
use crate::decoder::SdfDecoder;
use crate::error::{Result, SynthesisError};
use crate::extract::MeshExtractor;
use crate::latent::LatentCode;
use crate::ledger::{LEDGER_FILE_NAME, SynthesisKind, SynthesisLedger};
use crate::synthesizer::{LatentSynthesizer, select_for_arithmetic, select_for_interpolation};

/// Result of one loop iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// A record was appended.
    Extended {
        /// Index of the new record.
        index: usize,
        /// Output file name.
        name: String,
        /// Whether a mesh was written.
        exported: bool,
    },
    /// The output already existed.
    Skipped {
        /// Output file name.
        name: String,
    },
}

impl StepOutcome {
    /// The output file name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Extended { name, .. } | Self::Skipped { name } => name,
        }
    }
}

/// The synthesis loop.
pub struct SynthesisLoop<D, E> {
    config: SynthesisConfig,
    decoder: D,
    extractor: E,
    ledger: SynthesisLedger,
    trained_count: usize,
    rng: ChaCha8Rng,
}

impl<D: SdfDecoder, E: MeshExtractor> SynthesisLoop<D, E> {
    /// Open the loop in `config.save_dir`, seeding from the decoder's codes.
    ///
    /// # Errors
    ///
    /// See [`SynthesisLoop::with_codes`].
    pub fn new(config: SynthesisConfig, decoder: D, extractor: E) -> Result<Self> {
        let codes = decoder.latent_codes();
        Self::with_codes(config, decoder, extractor, codes)
    }

    /// Open the loop in `config.save_dir`, seeding from `codes`.
    ///
    /// An existing ledger in the save directory takes precedence over
    /// `codes`.
    ///
    /// # Errors
    ///
    /// Returns an error if the config is invalid, the directory cannot be
    /// created, an existing ledger is corrupt, or the ledger's codes do not
    /// match the decoder.
    pub fn with_codes(
        config: SynthesisConfig,
        decoder: D,
        extractor: E,
        codes: Vec<LatentCode>,
    ) -> Result<Self> {
        config.validate()?;
        fs::create_dir_all(&config.save_dir)?;
        let ledger = SynthesisLedger::open_or_seed(&config.save_dir.join(LEDGER_FILE_NAME), codes)?;
        if let Some(dim) = ledger.latent_dim() {
            if dim != decoder.latent_dim() {
                return Err(SynthesisError::LatentDimensionMismatch {
                    expected: decoder.latent_dim(),
                    found: dim,
                });
            }
        }
        let trained_count = ledger
            .records()
            .iter()
            .take_while(|r| r.is_initial())
            .count();
        let rng = config
            .seed
            .map_or_else(ChaCha8Rng::from_entropy, ChaCha8Rng::seed_from_u64);
        info!(
            records = ledger.len(),
            trained = trained_count,
            save_dir = %config.save_dir.display(),
            "synthesis loop ready"
        );
        Ok(Self {
            config,
            decoder,
            extractor,
            ledger,
            trained_count,
            rng,
        })
    }

    /// The configuration.
    #[must_use]
    pub const fn config(&self) -> &SynthesisConfig {
        &self.config
    }

    /// The decoder.
    #[must_use]
    pub const fn decoder(&self) -> &D {
        &self.decoder
    }

    /// The ledger.
    #[must_use]
    pub const fn ledger(&self) -> &SynthesisLedger {
        &self.ledger
    }

    /// Number of trained codes at the front of the ledger.
    #[must_use]
    pub const fn trained_count(&self) -> usize {
        self.trained_count
    }

    /// Whether the target count has been reached.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.config
            .target_count
            .is_some_and(|target| self.ledger.len() >= target)
    }

    /// Run one iteration.
    ///
    /// # Errors
    ///
    /// Returns [`SynthesisError::InsufficientCandidates`] if the ledger is
    /// too small for the chosen operation, or any decoding, export or
    /// ledger error.
    pub fn step(&mut self) -> Result<StepOutcome> {
        let (name, kind, parents, code) = if self.rng.gen_bool(0.5) {
            let draw = select_for_arithmetic(
                &self.ledger,
                self.trained_count,
                self.config.trained_bias,
                &mut self.rng,
            )?;
            (draw.file_name(), SynthesisKind::Arithmetic, draw.parents, draw.code)
        } else {
            let draw = select_for_interpolation(
                &self.ledger,
                self.trained_count,
                self.config.trained_bias,
                self.config.interpolation_factor_range,
                &mut self.rng,
            )?;
            (
                draw.file_name(),
                SynthesisKind::Interpolation,
                draw.parents.to_vec(),
                draw.code,
            )
        };

        let path = self.config.save_dir.join(&name);
        if path.exists() {
            debug!(name = %name, "output exists, skipping");
            return Ok(StepOutcome::Skipped { name });
        }

        let synthesizer = LatentSynthesizer::new(&self.config, &self.decoder, &self.extractor);
        let exported = match synthesizer.synthesize_surface(&code)? {
            Some(mesh) => {
                save_obj(&mesh, &path)?;
                true
            }
            None => {
                warn!(name = %name, "no surface extracted, recording code without a mesh");
                false
            }
        };
        let index = self.ledger.append(name.clone(), kind, parents, code)?.index;
        info!(index, name = %name, kind = %kind, exported, "ledger extended");
        Ok(StepOutcome::Extended {
            index,
            name,
            exported,
        })
    }

    /// Iterate until the target count is reached, or forever without one.
    ///
    /// Returns the number of records appended.
    ///
    /// # Errors
    ///
    /// Stops at the first failing iteration.
    pub fn run(&mut self) -> Result<usize> {
        let mut appended = 0;
        while !self.is_done() {
            if matches!(self.step()?, StepOutcome::Extended { .. }) {
                appended += 1;
            }
        }
        Ok(appended)
    }

    /// Give back the ledger.
    #[must_use]
    pub fn into_ledger(self) -> SynthesisLedger {
        self.ledger
    }
}
