//! Shape synthesis in the latent space of an SDF decoder.
//!
//! Trained latent codes are combined into new ones, decoded over a volume
//! grid and turned into meshes. Every new code is appended to a ledger that
//! records how it was made, so any shape can be traced back to the trained
//! codes it came from.
//!
//! # Decoding
//!
//! - [`SdfDecoder`] - anything mapping `[latent, xyz]` rows to distances
//! - [`LatentSdfDecoder`] - Burn MLP with an embedded table of trained codes
//! - [`VolumeGrid`] / [`SurfaceNets`] - evaluation lattice and isosurface
//!
//! # Synthesis
//!
//! - [`interpolate`] / [`combine_arithmetic`] - latent code combination
//! - [`LatentSynthesizer`] - batched grid evaluation and extraction
//! - [`SynthesisLoop`] - draw, skip-if-exists, decode, export, append
//!
//! # Provenance
//!
//! - [`SynthesisLedger`] - append-only, persisted after every append
//! - [`trace_to_origin`] / [`DerivationGraph`] - derivation history and DOT output
//!
//! # Example
//!
//! ```no_run
//! use burn_ndarray::NdArray;
//! use sdf_synthesis::{
//!     LatentSdfDecoder, LatentSdfDecoderConfig, SurfaceNets, SynthesisConfig, SynthesisLoop,
//!     load_decoder,
//! };
//!
//! let device = Default::default();
//! let decoder: LatentSdfDecoder<NdArray> =
//!     load_decoder(LatentSdfDecoderConfig::new(256), "decoder.bin".as_ref(), &device).unwrap();
//!
//! let config = SynthesisConfig::new("synthesized").with_target_count(1000);
//! let mut synthesis = SynthesisLoop::new(config, decoder, SurfaceNets::default()).unwrap();
//! synthesis.run().unwrap();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod checkpoint;
mod config;
mod decoder;
mod error;
mod extract;
mod grid;
mod latent;
mod ledger;
mod model;
mod provenance;
mod synthesis_loop;
mod synthesizer;

pub use checkpoint::{CheckpointFormat, load_decoder, save_decoder};
pub use config::SynthesisConfig;
pub use decoder::{DecoderBatch, SdfDecoder};
pub use error::{Result, SynthesisError};
pub use extract::{ExtractOptions, MeshExtractor, SurfaceNets};
pub use grid::VolumeGrid;
pub use latent::LatentCode;
pub use ledger::{LEDGER_FILE_NAME, LEDGER_MAGIC, SynthesisKind, SynthesisLedger, SynthesisRecord};
pub use model::{LatentSdfDecoder, LatentSdfDecoderConfig, inference_decoder};
pub use provenance::{DerivationGraph, GraphNode, trace_to_origin};
pub use synthesis_loop::{StepOutcome, SynthesisLoop};
pub use synthesizer::{
    ArithmeticDraw, InterpolationDraw, LatentSynthesizer, candidates, combine_arithmetic,
    interpolate, select_for_arithmetic, select_for_interpolation,
};
