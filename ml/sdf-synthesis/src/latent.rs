//! Latent codes.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SynthesisError};

/// A fixed-length latent vector describing one shape.
///
/// Codes are values: every operation returns a new code.
///
/// # Example
///
/// ```
/// use sdf_synthesis::LatentCode;
///
/// let a = LatentCode::new(vec![0.0, 0.0]);
/// let b = LatentCode::new(vec![2.0, 2.0]);
/// let mid = a.lerp(&b, 0.5).unwrap();
/// assert_eq!(mid.as_slice(), &[1.0, 1.0]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LatentCode(Vec<f32>);

impl LatentCode {
    /// Wrap a vector.
    #[must_use]
    pub const fn new(values: Vec<f32>) -> Self {
        Self(values)
    }

    /// All-zero code of the given dimension.
    #[must_use]
    pub fn zeros(dim: usize) -> Self {
        Self(vec![0.0; dim])
    }

    /// Dimension.
    #[must_use]
    pub fn dim(&self) -> usize {
        self.0.len()
    }

    /// Values.
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    /// Consume the code, returning its values.
    #[must_use]
    pub fn into_vec(self) -> Vec<f32> {
        self.0
    }

    fn check_dim(&self, other: &Self) -> Result<()> {
        if self.dim() == other.dim() {
            Ok(())
        } else {
            Err(SynthesisError::LatentDimensionMismatch {
                expected: self.dim(),
                found: other.dim(),
            })
        }
    }

    fn zip_with(&self, other: &Self, f: impl Fn(f32, f32) -> f32) -> Result<Self> {
        self.check_dim(other)?;
        Ok(Self(
            self.0.iter().zip(&other.0).map(|(&a, &b)| f(a, b)).collect(),
        ))
    }

    /// `self * (1 - t) + other * t`.
    ///
    /// # Errors
    ///
    /// Returns an error if the dimensions differ.
    pub fn lerp(&self, other: &Self, t: f32) -> Result<Self> {
        self.zip_with(other, |a, b| a * (1.0 - t) + b * t)
    }

    /// Element-wise sum.
    ///
    /// # Errors
    ///
    /// Returns an error if the dimensions differ.
    pub fn checked_add(&self, other: &Self) -> Result<Self> {
        self.zip_with(other, |a, b| a + b)
    }

    /// Element-wise difference.
    ///
    /// # Errors
    ///
    /// Returns an error if the dimensions differ.
    pub fn checked_sub(&self, other: &Self) -> Result<Self> {
        self.zip_with(other, |a, b| a - b)
    }
}

impl From<Vec<f32>> for LatentCode {
    fn from(values: Vec<f32>) -> Self {
        Self(values)
    }
}

impl AsRef<[f32]> for LatentCode {
    fn as_ref(&self) -> &[f32] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn lerp_endpoints() {
        let a = LatentCode::new(vec![1.0, -1.0, 3.0]);
        let b = LatentCode::new(vec![0.0, 5.0, 3.0]);
        assert_eq!(a.lerp(&b, 0.0).unwrap(), a);
        assert_eq!(a.lerp(&b, 1.0).unwrap(), b);
        let q = a.lerp(&b, 0.25).unwrap();
        assert_relative_eq!(q.as_slice()[1], 0.5);
    }

    #[test]
    fn add_and_sub() {
        let a = LatentCode::new(vec![1.0, 2.0]);
        let b = LatentCode::new(vec![0.5, 0.5]);
        assert_eq!(a.checked_add(&b).unwrap().as_slice(), &[1.5, 2.5]);
        assert_eq!(a.checked_sub(&b).unwrap().as_slice(), &[0.5, 1.5]);
    }

    #[test]
    fn dimension_mismatch() {
        let a = LatentCode::zeros(2);
        let b = LatentCode::zeros(3);
        assert!(matches!(
            a.checked_add(&b),
            Err(SynthesisError::LatentDimensionMismatch {
                expected: 2,
                found: 3
            })
        ));
    }

    #[test]
    fn serializes_as_plain_list() {
        let json = serde_json::to_string(&LatentCode::new(vec![0.5, 1.0])).unwrap();
        assert_eq!(json, "[0.5,1.0]");
    }
}
