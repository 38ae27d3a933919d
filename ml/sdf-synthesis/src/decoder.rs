//! The decoder seam.
//!
//! A decoder maps rows of `[latent code, x, y, z]` to one signed distance per
//! row. Evaluation is inference only; implementations must not track
//! gradients.

use crate::error::{Result, SynthesisError};
use crate::latent::LatentCode;

/// Row-major `[latent, xyz]` input for a decoder.
#[derive(Debug, Clone, PartialEq)]
pub struct DecoderBatch {
    data: Vec<f32>,
    rows: usize,
    width: usize,
}

impl DecoderBatch {
    /// Repeat `code` once per point and append the point coordinates.
    ///
    /// # Example
    ///
    /// ```
    /// use sdf_synthesis::{DecoderBatch, LatentCode};
    ///
    /// let code = LatentCode::new(vec![7.0]);
    /// let batch = DecoderBatch::broadcast(&code, &[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
    /// assert_eq!(batch.width(), 4);
    /// assert_eq!(batch.row(1), &[7.0, 4.0, 5.0, 6.0]);
    /// ```
    #[must_use]
    pub fn broadcast(code: &LatentCode, points: &[[f32; 3]]) -> Self {
        let width = code.dim() + 3;
        let mut data = Vec::with_capacity(points.len() * width);
        for p in points {
            data.extend_from_slice(code.as_slice());
            data.extend_from_slice(p);
        }
        Self {
            data,
            rows: points.len(),
            width,
        }
    }

    /// Number of rows.
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Values per row (latent dimension + 3).
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Whether the batch has no rows.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// One row.
    ///
    /// # Panics
    ///
    /// Panics if `index >= rows()`.
    #[must_use]
    pub fn row(&self, index: usize) -> &[f32] {
        &self.data[index * self.width..(index + 1) * self.width]
    }

    /// Iterate over rows.
    pub fn iter_rows(&self) -> impl Iterator<Item = &[f32]> {
        self.data.chunks_exact(self.width.max(1))
    }

    /// Flat row-major data.
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }
}

/// A model mapping `[latent, xyz]` rows to signed distances.
pub trait SdfDecoder {
    /// Latent dimension the decoder expects.
    fn latent_dim(&self) -> usize;

    /// Evaluate one batch, returning one value per row in row order.
    ///
    /// # Errors
    ///
    /// Returns [`SynthesisError::Decoder`] if evaluation fails.
    fn predict(&self, batch: &DecoderBatch) -> Result<Vec<f32>>;

    /// Latent codes of the training shapes, in training order.
    fn latent_codes(&self) -> Vec<LatentCode> {
        Vec::new()
    }

    /// Evaluate `code` at `points`.
    ///
    /// # Errors
    ///
    /// Returns an error if the code has the wrong dimension, the decoder
    /// fails, or it returns the wrong number of values.
    fn evaluate(&self, code: &LatentCode, points: &[[f32; 3]]) -> Result<Vec<f32>> {
        if code.dim() != self.latent_dim() {
            return Err(SynthesisError::LatentDimensionMismatch {
                expected: self.latent_dim(),
                found: code.dim(),
            });
        }
        let batch = DecoderBatch::broadcast(code, points);
        let values = self.predict(&batch)?;
        if values.len() != batch.rows() {
            return Err(SynthesisError::decoder(format!(
                "decoder returned {} values for {} rows",
                values.len(),
                batch.rows()
            )));
        }
        Ok(values)
    }
}

impl<D: SdfDecoder + ?Sized> SdfDecoder for &D {
    fn latent_dim(&self) -> usize {
        (**self).latent_dim()
    }

    fn predict(&self, batch: &DecoderBatch) -> Result<Vec<f32>> {
        (**self).predict(batch)
    }

    fn latent_codes(&self) -> Vec<LatentCode> {
        (**self).latent_codes()
    }
}
