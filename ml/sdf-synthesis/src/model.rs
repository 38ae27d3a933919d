//! Burn reference decoder.

use burn::module::{AutodiffModule, Module, Param};
use burn::nn;
use burn::prelude::Backend;
use burn::tensor::activation::{relu, tanh};
use burn::tensor::backend::AutodiffBackend;
use burn::tensor::{Tensor, TensorData};
use serde::{Deserialize, Serialize};

use crate::decoder::{DecoderBatch, SdfDecoder};
use crate::error::{Result, SynthesisError};
use crate::latent::LatentCode;

/// Configuration for [`LatentSdfDecoder`].
///
/// # Example
///
/// ```
/// use sdf_synthesis::LatentSdfDecoderConfig;
///
/// let config = LatentSdfDecoderConfig::default().with_shape_count(15);
/// assert_eq!(config.input_dim(), config.latent_dim + 3);
/// assert!(config.is_valid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatentSdfDecoderConfig {
    /// Latent code length.
    pub latent_dim: usize,

    /// Units per hidden layer.
    pub hidden: usize,

    /// Number of hidden layers.
    pub hidden_layers: usize,

    /// Number of training shapes (rows of the latent table).
    pub shape_count: usize,
}

impl Default for LatentSdfDecoderConfig {
    fn default() -> Self {
        Self {
            latent_dim: 128,
            hidden: 256,
            hidden_layers: 4,
            shape_count: 1,
        }
    }
}

impl LatentSdfDecoderConfig {
    /// Creates a config with the given latent dimension.
    #[must_use]
    pub const fn new(latent_dim: usize) -> Self {
        Self {
            latent_dim,
            hidden: 256,
            hidden_layers: 4,
            shape_count: 1,
        }
    }

    /// Sets the hidden layer width.
    #[must_use]
    pub const fn with_hidden(mut self, hidden: usize) -> Self {
        self.hidden = hidden;
        self
    }

    /// Sets the number of hidden layers.
    #[must_use]
    pub const fn with_hidden_layers(mut self, layers: usize) -> Self {
        self.hidden_layers = layers;
        self
    }

    /// Sets the number of training shapes.
    #[must_use]
    pub const fn with_shape_count(mut self, count: usize) -> Self {
        self.shape_count = count;
        self
    }

    /// Width of one input row.
    #[must_use]
    pub const fn input_dim(&self) -> usize {
        self.latent_dim + 3
    }

    /// Returns `true` if all sizes are positive.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.latent_dim > 0 && self.hidden > 0 && self.shape_count > 0
    }
}

/// Auto-decoder MLP with a per-shape latent table.
///
/// Architecture: `[latent, xyz]` -> (Linear -> `ReLU`) x N -> Linear -> `tanh`
///
/// The latent table is an [`nn::Embedding`] with one row per training shape.
/// For inference on an autodiff backend, convert with [`inference_decoder`].
#[derive(Debug, Module)]
pub struct LatentSdfDecoder<B: Backend> {
    hidden: Vec<nn::Linear<B>>,
    output: nn::Linear<B>,
    latent: nn::Embedding<B>,
}

impl<B: Backend> LatentSdfDecoder<B> {
    /// Creates a randomly initialised decoder.
    #[must_use]
    pub fn new(config: LatentSdfDecoderConfig, device: &B::Device) -> Self {
        let mut hidden = Vec::with_capacity(config.hidden_layers);
        let mut width = config.input_dim();
        for _ in 0..config.hidden_layers {
            hidden.push(nn::LinearConfig::new(width, config.hidden).init(device));
            width = config.hidden;
        }
        let output = nn::LinearConfig::new(width, 1).init(device);
        let latent = nn::EmbeddingConfig::new(config.shape_count, config.latent_dim).init(device);
        Self {
            hidden,
            output,
            latent,
        }
    }

    /// Replace the latent table with `codes`.
    ///
    /// # Errors
    ///
    /// Returns an error if `codes` is empty or a code does not match the
    /// decoder's latent dimension.
    pub fn with_latent_codes(mut self, codes: &[LatentCode]) -> Result<Self> {
        if codes.is_empty() {
            return Err(SynthesisError::invalid_config("latent table needs at least one code"));
        }
        let dim = self.latent_dim();
        let mut flat = Vec::with_capacity(codes.len() * dim);
        for code in codes {
            if code.dim() != dim {
                return Err(SynthesisError::LatentDimensionMismatch {
                    expected: dim,
                    found: code.dim(),
                });
            }
            flat.extend_from_slice(code.as_slice());
        }
        let device = self.latent.weight.val().device();
        let table = Tensor::<B, 2>::from_data(TensorData::new(flat, [codes.len(), dim]), &device);
        self.latent.weight = Param::from_tensor(table);
        Ok(self)
    }

    /// Runs the forward pass.
    ///
    /// # Arguments
    ///
    /// - `input`: tensor of shape `[rows, latent_dim + 3]`
    ///
    /// # Returns
    ///
    /// Tensor of shape `[rows, 1]` with values in `(-1, 1)`.
    pub fn forward(&self, input: Tensor<B, 2>) -> Tensor<B, 2> {
        let mut x = input;
        for layer in &self.hidden {
            x = relu(layer.forward(x));
        }
        tanh(self.output.forward(x))
    }

    /// Number of training shapes.
    #[must_use]
    pub fn shape_count(&self) -> usize {
        self.latent.weight.val().dims()[0]
    }
}

impl<B: Backend> SdfDecoder for LatentSdfDecoder<B> {
    fn latent_dim(&self) -> usize {
        self.latent.weight.val().dims()[1]
    }

    fn predict(&self, batch: &DecoderBatch) -> Result<Vec<f32>> {
        if batch.is_empty() {
            return Ok(Vec::new());
        }
        let expected = self.latent_dim() + 3;
        if batch.width() != expected {
            return Err(SynthesisError::decoder(format!(
                "row width {} does not match decoder input {expected}",
                batch.width()
            )));
        }
        let device = self.output.weight.val().device();
        let input = Tensor::<B, 2>::from_data(
            TensorData::new(batch.as_slice().to_vec(), [batch.rows(), batch.width()]),
            &device,
        );
        self.forward(input)
            .into_data()
            .convert::<f32>()
            .to_vec::<f32>()
            .map_err(|e| SynthesisError::decoder(format!("{e:?}")))
    }

    fn latent_codes(&self) -> Vec<LatentCode> {
        let dim = self.latent_dim().max(1);
        self.latent
            .weight
            .val()
            .into_data()
            .convert::<f32>()
            .to_vec::<f32>()
            .map(|values| {
                values
                    .chunks_exact(dim)
                    .map(|c| LatentCode::new(c.to_vec()))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Strip autodiff from a trained decoder so evaluation records no graph.
#[must_use]
pub fn inference_decoder<B: AutodiffBackend>(
    model: &LatentSdfDecoder<B>,
) -> LatentSdfDecoder<B::InnerBackend> {
    model.valid()
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn_ndarray::NdArray;

    type TestBackend = NdArray<f32>;

    fn small() -> LatentSdfDecoderConfig {
        LatentSdfDecoderConfig::new(4)
            .with_hidden(16)
            .with_hidden_layers(2)
            .with_shape_count(3)
    }

    #[test]
    fn config_default() {
        let config = LatentSdfDecoderConfig::default();
        assert_eq!(config.latent_dim, 128);
        assert_eq!(config.input_dim(), 131);
        assert!(config.is_valid());
        assert!(!LatentSdfDecoderConfig::new(0).is_valid());
    }

    #[test]
    fn config_serialization() {
        let config = small();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: LatentSdfDecoderConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn forward_shape_and_range() {
        let device = <TestBackend as Backend>::Device::default();
        let model = LatentSdfDecoder::<TestBackend>::new(small(), &device);
        let input = Tensor::<TestBackend, 2>::ones([5, 7], &device);
        let output = model.forward(input);
        assert_eq!(output.dims(), [5, 1]);
        let values = output.into_data().to_vec::<f32>().unwrap();
        assert!(values.iter().all(|v| v.abs() < 1.0));
    }

    #[test]
    fn latent_table_shape() {
        let device = <TestBackend as Backend>::Device::default();
        let model = LatentSdfDecoder::<TestBackend>::new(small(), &device);
        assert_eq!(model.shape_count(), 3);
        assert_eq!(model.latent_dim(), 4);
        let codes = model.latent_codes();
        assert_eq!(codes.len(), 3);
        assert!(codes.iter().all(|c| c.dim() == 4));
    }

    #[test]
    fn latent_codes_can_be_replaced() {
        let device = <TestBackend as Backend>::Device::default();
        let codes = vec![
            LatentCode::new(vec![0.0, 1.0, 2.0, 3.0]),
            LatentCode::new(vec![4.0, 5.0, 6.0, 7.0]),
        ];
        let model = LatentSdfDecoder::<TestBackend>::new(small(), &device)
            .with_latent_codes(&codes)
            .unwrap();
        assert_eq!(model.latent_codes(), codes);
        assert_eq!(model.shape_count(), 2);

        let err = LatentSdfDecoder::<TestBackend>::new(small(), &device)
            .with_latent_codes(&[LatentCode::zeros(2)])
            .unwrap_err();
        assert!(matches!(
            err,
            SynthesisError::LatentDimensionMismatch { expected: 4, found: 2 }
        ));
    }

    #[test]
    fn mixed_code_dimensions_are_rejected() {
        let device = <TestBackend as Backend>::Device::default();
        let codes = vec![LatentCode::zeros(2), LatentCode::zeros(3)];
        let result = LatentSdfDecoder::<TestBackend>::new(small(), &device).with_latent_codes(&codes);
        assert!(result.is_err());
    }

    #[test]
    fn predict_matches_row_count() {
        let device = <TestBackend as Backend>::Device::default();
        let model = LatentSdfDecoder::<TestBackend>::new(small(), &device);
        let code = LatentCode::zeros(4);
        let values = model
            .evaluate(&code, &[[0.0, 0.0, 0.0], [0.5, 0.5, 0.5], [1.0, 1.0, 1.0]])
            .unwrap();
        assert_eq!(values.len(), 3);
    }

    #[test]
    fn predict_rejects_wrong_width() {
        let device = <TestBackend as Backend>::Device::default();
        let model = LatentSdfDecoder::<TestBackend>::new(small(), &device);
        let batch = DecoderBatch::broadcast(&LatentCode::zeros(2), &[[0.0; 3]]);
        assert!(matches!(model.predict(&batch), Err(SynthesisError::Decoder(_))));
    }
}
