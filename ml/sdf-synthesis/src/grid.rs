//! Regular evaluation grids.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SynthesisError};

/// A cubic lattice of `resolution³` sample points spanning `[min, max]`.
///
/// Points are ordered with X varying fastest, then Y, then Z.
///
/// # Example
///
/// ```
/// use sdf_synthesis::VolumeGrid;
///
/// let grid = VolumeGrid::new(3, [-1.0; 3], [1.0; 3]).unwrap();
/// assert_eq!(grid.len(), 27);
/// assert_eq!(grid.point(1, 0, 2), [0.0, -1.0, 1.0]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolumeGrid {
    resolution: usize,
    min: [f32; 3],
    max: [f32; 3],
}

impl VolumeGrid {
    /// Create a grid.
    ///
    /// # Errors
    ///
    /// Returns an error if `resolution < 2` or `min` is not below `max` on
    /// every axis.
    pub fn new(resolution: usize, min: [f32; 3], max: [f32; 3]) -> Result<Self> {
        if resolution < 2 {
            return Err(SynthesisError::invalid_config(format!(
                "grid resolution must be at least 2, got {resolution}"
            )));
        }
        if (0..3).any(|a| !(min[a] < max[a])) {
            return Err(SynthesisError::invalid_config(format!(
                "grid bounds {min:?}..{max:?} are empty"
            )));
        }
        Ok(Self {
            resolution,
            min,
            max,
        })
    }

    /// Points per axis.
    #[must_use]
    pub const fn resolution(&self) -> usize {
        self.resolution
    }

    /// Lower corner.
    #[must_use]
    pub const fn min(&self) -> [f32; 3] {
        self.min
    }

    /// Upper corner.
    #[must_use]
    pub const fn max(&self) -> [f32; 3] {
        self.max
    }

    /// Total number of points.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.resolution * self.resolution * self.resolution
    }

    /// Always false; a grid has at least 8 points.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Distance between neighbouring points along each axis.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn spacing(&self) -> [f32; 3] {
        let steps = (self.resolution - 1) as f32;
        [
            (self.max[0] - self.min[0]) / steps,
            (self.max[1] - self.min[1]) / steps,
            (self.max[2] - self.min[2]) / steps,
        ]
    }

    /// Flat index of lattice point `(i, j, k)`.
    #[must_use]
    pub const fn index(&self, i: usize, j: usize, k: usize) -> usize {
        i + self.resolution * (j + self.resolution * k)
    }

    /// Position of lattice point `(i, j, k)`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn point(&self, i: usize, j: usize, k: usize) -> [f32; 3] {
        let s = self.spacing();
        [
            (i as f32).mul_add(s[0], self.min[0]),
            (j as f32).mul_add(s[1], self.min[1]),
            (k as f32).mul_add(s[2], self.min[2]),
        ]
    }

    /// Every point in index order.
    #[must_use]
    pub fn points(&self) -> Vec<[f32; 3]> {
        let n = self.resolution;
        let mut out = Vec::with_capacity(self.len());
        for k in 0..n {
            for j in 0..n {
                for i in 0..n {
                    out.push(self.point(i, j, k));
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn rejects_bad_grids() {
        assert!(VolumeGrid::new(1, [0.0; 3], [1.0; 3]).is_err());
        assert!(VolumeGrid::new(4, [0.0, 0.0, 1.0], [1.0; 3]).is_err());
        assert!(VolumeGrid::new(4, [0.0; 3], [f32::NAN, 1.0, 1.0]).is_err());
    }

    #[test]
    fn points_follow_index_order() {
        let grid = VolumeGrid::new(4, [0.0; 3], [3.0, 6.0, 9.0]).unwrap();
        let points = grid.points();
        assert_eq!(points.len(), 64);
        assert_eq!(points[grid.index(2, 1, 3)], [2.0, 2.0, 9.0]);
        assert_eq!(points[0], [0.0; 3]);
        assert_eq!(points[63], [3.0, 6.0, 9.0]);
        assert_relative_eq!(grid.spacing()[1], 2.0);
    }
}
