//! Latent code combination and surface synthesis.

use std::time::Instant;

use mesh_types::IndexedMesh;
use rand::Rng;
use rand::seq::index;
use tracing::{debug, info, warn};

use crate::config::SynthesisConfig;
use crate::decoder::SdfDecoder;
use crate::error::{Result, SynthesisError};
use crate::extract::MeshExtractor;
use crate::grid::VolumeGrid;
use crate::latent::LatentCode;
use crate::ledger::{SynthesisKind, SynthesisLedger, SynthesisRecord};

/// Left fold of linear interpolations.
///
/// Starting from `codes[0]`, each step mixes in the next code:
/// `acc = acc * (1 - f_i) + codes[i + 1] * f_i`. The result depends on order.
///
/// # Errors
///
/// Returns [`SynthesisError::FactorCountMismatch`] unless
/// `factors.len() + 1 == codes.len()`, and a dimension error if the codes
/// differ in length.
///
/// # Example
///
/// ```
/// use sdf_synthesis::{LatentCode, interpolate};
///
/// let a = LatentCode::new(vec![0.0, 0.0]);
/// let b = LatentCode::new(vec![2.0, 2.0]);
/// assert_eq!(interpolate(&[a.clone(), b], &[0.5]).unwrap().as_slice(), &[1.0, 1.0]);
/// assert_eq!(interpolate(&[a.clone()], &[]).unwrap(), a);
/// ```
pub fn interpolate(codes: &[LatentCode], factors: &[f32]) -> Result<LatentCode> {
    let Some((first, rest)) = codes.split_first() else {
        return Err(SynthesisError::FactorCountMismatch {
            codes: 0,
            factors: factors.len(),
        });
    };
    if rest.len() != factors.len() {
        return Err(SynthesisError::FactorCountMismatch {
            codes: codes.len(),
            factors: factors.len(),
        });
    }
    rest.iter()
        .zip(factors)
        .try_fold(first.clone(), |acc, (next, &f)| acc.lerp(next, f))
}

/// Sum all codes but the last, then subtract the last.
///
/// # Errors
///
/// Returns an error for fewer than two codes or mismatched dimensions.
pub fn combine_arithmetic(codes: &[&LatentCode]) -> Result<LatentCode> {
    let [first, middle @ .., last] = codes else {
        return Err(SynthesisError::InsufficientCandidates {
            required: 2,
            available: codes.len(),
        });
    };
    let sum = middle
        .iter()
        .try_fold((*first).clone(), |acc, code| acc.checked_add(code))?;
    sum.checked_sub(last)
}

/// An interpolation drawn from the ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct InterpolationDraw {
    /// Parent indices in draw order.
    pub parents: [usize; 2],
    /// Mixing factor, rounded to three decimals.
    pub factor: f64,
    /// Resulting code.
    pub code: LatentCode,
}

impl InterpolationDraw {
    /// `"{i1}__{i2}"`.
    #[must_use]
    pub fn id(&self) -> String {
        format!("{}__{}", self.parents[0], self.parents[1])
    }

    /// `"{i1}__{i2}__{factor}.obj"` with the factor's `.` written as `-`.
    ///
    /// # Example
    ///
    /// ```
    /// use sdf_synthesis::{InterpolationDraw, LatentCode};
    ///
    /// let draw = InterpolationDraw { parents: [3, 1], factor: 0.25, code: LatentCode::zeros(1) };
    /// assert_eq!(draw.file_name(), "3__1__0-25.obj");
    /// ```
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{}__{}.obj", self.id(), self.factor.to_string().replace('.', "-"))
    }
}

/// An arithmetic combination drawn from the ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct ArithmeticDraw {
    /// Parent indices in draw order; the last one is subtracted.
    pub parents: Vec<usize>,
    /// Resulting code.
    pub code: LatentCode,
}

impl ArithmeticDraw {
    /// Parent indices joined by `__`.
    #[must_use]
    pub fn id(&self) -> String {
        self.parents
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("__")
    }

    /// `"{id}.obj"`.
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{}.obj", self.id())
    }
}

/// Records eligible for a draw.
///
/// With `restrict_to_trained` only the first `trained_count` records are
/// considered; records of kind `exclude` are always dropped.
#[must_use]
pub fn candidates(
    ledger: &SynthesisLedger,
    trained_count: usize,
    restrict_to_trained: bool,
    exclude: SynthesisKind,
) -> Vec<&SynthesisRecord> {
    let pool = if restrict_to_trained {
        &ledger.records()[..trained_count.min(ledger.len())]
    } else {
        ledger.records()
    };
    pool.iter().filter(|r| r.synthesis_type != exclude).collect()
}

fn draw<'a, R: Rng + ?Sized>(
    pool: &[&'a SynthesisRecord],
    amount: usize,
    rng: &mut R,
) -> Result<Vec<&'a SynthesisRecord>> {
    if pool.len() < amount {
        return Err(SynthesisError::InsufficientCandidates {
            required: amount,
            available: pool.len(),
        });
    }
    Ok(index::sample(rng, pool.len(), amount)
        .into_iter()
        .map(|i| pool[i])
        .collect())
}

/// Round to three decimals.
fn round3(x: f64) -> f64 {
    (x * 1000.0).round() / 1000.0
}

/// Pick two non-arithmetic records and a factor from `factor_range`.
///
/// With probability `trained_bias` the pool is restricted to the first
/// `trained_count` records.
///
/// # Errors
///
/// Returns [`SynthesisError::InsufficientCandidates`] if fewer than two
/// records remain.
#[allow(clippy::cast_possible_truncation)]
pub fn select_for_interpolation<R: Rng + ?Sized>(
    ledger: &SynthesisLedger,
    trained_count: usize,
    trained_bias: f64,
    factor_range: [f64; 2],
    rng: &mut R,
) -> Result<InterpolationDraw> {
    let restrict = rng.gen_bool(trained_bias.clamp(0.0, 1.0));
    let pool = candidates(ledger, trained_count, restrict, SynthesisKind::Arithmetic);
    let picked = draw(&pool, 2, rng)?;
    let [lo, hi] = factor_range;
    let factor = round3((hi - lo).mul_add(rng.r#gen::<f64>(), lo));
    let code = interpolate(
        &[picked[0].latent_code.clone(), picked[1].latent_code.clone()],
        &[factor as f32],
    )?;
    Ok(InterpolationDraw {
        parents: [picked[0].index, picked[1].index],
        factor,
        code,
    })
}

/// Pick three non-interpolation records and combine them as
/// `first + second - third`.
///
/// # Errors
///
/// Returns [`SynthesisError::InsufficientCandidates`] if fewer than three
/// records remain.
pub fn select_for_arithmetic<R: Rng + ?Sized>(
    ledger: &SynthesisLedger,
    trained_count: usize,
    trained_bias: f64,
    rng: &mut R,
) -> Result<ArithmeticDraw> {
    let restrict = rng.gen_bool(trained_bias.clamp(0.0, 1.0));
    let pool = candidates(ledger, trained_count, restrict, SynthesisKind::Interpolation);
    let picked = draw(&pool, 3, rng)?;
    let codes: Vec<&LatentCode> = picked.iter().map(|r| &r.latent_code).collect();
    Ok(ArithmeticDraw {
        parents: picked.iter().map(|r| r.index).collect(),
        code: combine_arithmetic(&codes)?,
    })
}

/// Evaluates a decoder over a grid and extracts the surface.
pub struct LatentSynthesizer<'a, D: ?Sized, E: ?Sized> {
    config: &'a SynthesisConfig,
    decoder: &'a D,
    extractor: &'a E,
}

impl<'a, D, E> LatentSynthesizer<'a, D, E>
where
    D: SdfDecoder + ?Sized,
    E: MeshExtractor + ?Sized,
{
    /// Create a synthesizer.
    #[must_use]
    pub const fn new(config: &'a SynthesisConfig, decoder: &'a D, extractor: &'a E) -> Self {
        Self {
            config,
            decoder,
            extractor,
        }
    }

    /// The configuration.
    #[must_use]
    pub const fn config(&self) -> &SynthesisConfig {
        self.config
    }

    /// The decoder.
    #[must_use]
    pub const fn decoder(&self) -> &D {
        self.decoder
    }

    /// Evaluate `code` at every grid point, in grid order.
    ///
    /// Points are split into about `batch_count` sequential batches.
    ///
    /// # Errors
    ///
    /// Returns an error if the grid is invalid or the decoder fails.
    pub fn evaluate_grid(&self, code: &LatentCode) -> Result<(VolumeGrid, Vec<f32>)> {
        let grid = self.config.grid()?;
        let points = grid.points();
        let chunk = (points.len() / self.config.batch_count.max(1)).max(1);
        let mut values = Vec::with_capacity(points.len());
        for batch in points.chunks(chunk) {
            values.extend(self.decoder.evaluate(code, batch)?);
        }
        Ok((grid, values))
    }

    /// Decode `code` into a mesh, or `None` if the field has no zero crossing.
    ///
    /// # Errors
    ///
    /// Returns an error if evaluation or extraction fails.
    pub fn synthesize_surface(&self, code: &LatentCode) -> Result<Option<IndexedMesh>> {
        let start = Instant::now();
        let (grid, values) = self.evaluate_grid(code)?;
        let mesh = self
            .extractor
            .extract(&grid, &values, self.config.extract_options())?;
        match &mesh {
            Some(m) => debug!(
                vertices = m.vertices.len(),
                faces = m.faces.len(),
                "synthesized surface"
            ),
            None => warn!("decoded field has no surface"),
        }
        info!(
            resolution = grid.resolution(),
            elapsed_ms = start.elapsed().as_millis(),
            "surface synthesis finished"
        );
        Ok(mesh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn code(values: &[f32]) -> LatentCode {
        LatentCode::new(values.to_vec())
    }

    fn mixed_ledger() -> SynthesisLedger {
        let mut ledger = SynthesisLedger::seed((0..4).map(|i| code(&[i as f32, 0.0])));
        ledger
            .append("0__1__0-5.obj", SynthesisKind::Interpolation, vec![0, 1], code(&[0.5, 0.0]))
            .unwrap();
        ledger
            .append("0__1__2.obj", SynthesisKind::Arithmetic, vec![0, 1, 2], code(&[-1.0, 0.0]))
            .unwrap();
        ledger
    }

    #[test]
    fn interpolate_scenarios() {
        let a = code(&[0.0, 0.0]);
        let b = code(&[2.0, 2.0]);
        assert_eq!(interpolate(&[a.clone(), b.clone()], &[0.5]).unwrap(), code(&[1.0, 1.0]));
        assert_eq!(interpolate(&[a.clone(), b.clone()], &[0.0]).unwrap(), a);
        assert_eq!(interpolate(&[a.clone(), b.clone()], &[1.0]).unwrap(), b);
        assert_eq!(interpolate(&[a.clone()], &[]).unwrap(), a);
    }

    #[test]
    fn interpolate_is_a_left_fold() {
        let a = code(&[0.0]);
        let b = code(&[4.0]);
        let c = code(&[8.0]);
        // (0 * 0.5 + 4 * 0.5) * 0.75 + 8 * 0.25 = 3.5
        let r = interpolate(&[a.clone(), b.clone(), c.clone()], &[0.5, 0.25]).unwrap();
        assert_relative_eq!(r.as_slice()[0], 3.5);
        let swapped = interpolate(&[c, b, a], &[0.5, 0.25]).unwrap();
        assert_relative_eq!(swapped.as_slice()[0], 4.5);
    }

    #[test]
    fn interpolate_factor_count() {
        let a = code(&[0.0]);
        let err = interpolate(&[a.clone(), a.clone()], &[]).unwrap_err();
        assert!(err.is_config_error());
        assert!(interpolate(&[], &[]).is_err());
    }

    #[test]
    fn arithmetic_rule() {
        let a = code(&[1.0, 1.0]);
        let b = code(&[2.0, 0.0]);
        let c = code(&[0.5, 3.0]);
        assert_eq!(combine_arithmetic(&[&a, &b, &c]).unwrap(), code(&[2.5, -2.0]));
        assert_eq!(combine_arithmetic(&[&a, &b]).unwrap(), code(&[-1.0, 1.0]));
        assert!(combine_arithmetic(&[&a]).is_err());
    }

    #[test]
    fn candidates_filter_kind_and_prefix() {
        let ledger = mixed_ledger();
        let all: Vec<usize> = candidates(&ledger, 4, false, SynthesisKind::Arithmetic)
            .iter()
            .map(|r| r.index)
            .collect();
        assert_eq!(all, vec![0, 1, 2, 3, 4]);
        let trained: Vec<usize> = candidates(&ledger, 4, true, SynthesisKind::Interpolation)
            .iter()
            .map(|r| r.index)
            .collect();
        assert_eq!(trained, vec![0, 1, 2, 3]);
        let arith: Vec<usize> = candidates(&ledger, 4, false, SynthesisKind::Interpolation)
            .iter()
            .map(|r| r.index)
            .collect();
        assert_eq!(arith, vec![0, 1, 2, 3, 5]);
    }

    #[test]
    fn interpolation_draw_is_distinct_and_in_range() {
        let ledger = mixed_ledger();
        let mut rng = ChaCha8Rng::seed_from_u64(17);
        for _ in 0..50 {
            let draw = select_for_interpolation(&ledger, 4, 0.5, [0.25, 0.75], &mut rng).unwrap();
            assert_ne!(draw.parents[0], draw.parents[1]);
            assert!(draw.parents.iter().all(|&p| p != 5));
            assert!((0.25..=0.75).contains(&draw.factor));
            assert_relative_eq!(draw.factor, round3(draw.factor));
        }
    }

    #[test]
    fn arithmetic_draw_ids() {
        let ledger = SynthesisLedger::seed((0..3).map(|_| LatentCode::zeros(4)));
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let draw = select_for_arithmetic(&ledger, 3, 0.5, &mut rng).unwrap();
        assert_eq!(draw.code, LatentCode::zeros(4));
        let mut sorted = draw.parents.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![0, 1, 2]);
        let expected = format!("{}__{}__{}", draw.parents[0], draw.parents[1], draw.parents[2]);
        assert_eq!(draw.id(), expected);
        assert_eq!(draw.file_name(), format!("{expected}.obj"));
    }

    #[test]
    fn too_few_candidates() {
        let ledger = SynthesisLedger::seed([LatentCode::zeros(2), LatentCode::zeros(2)]);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let err = select_for_arithmetic(&ledger, 2, 0.5, &mut rng).unwrap_err();
        assert!(matches!(
            err,
            SynthesisError::InsufficientCandidates {
                required: 3,
                available: 2
            }
        ));
    }

    #[test]
    fn factor_file_names() {
        let draw = |factor| InterpolationDraw {
            parents: [0, 1],
            factor,
            code: LatentCode::zeros(1),
        };
        assert_eq!(draw(0.5).file_name(), "0__1__0-5.obj");
        assert_eq!(draw(0.613).file_name(), "0__1__0-613.obj");
        assert_eq!(draw(0.7).id(), "0__1");
    }
}
