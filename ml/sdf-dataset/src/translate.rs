//! Translation conventions applied when a mesh is loaded.

use std::fmt;
use std::str::FromStr;

use mesh_types::{IndexedMesh, MeshBounds, Vector3};
use serde::{Deserialize, Serialize};

use crate::error::DatasetError;

/// Which reference point of a mesh is moved to the origin.
///
/// # Example
///
/// ```
/// use sdf_dataset::TranslateMode;
///
/// let mode: TranslateMode = "center_without_z".parse().unwrap();
/// assert_eq!(mode, TranslateMode::CenterWithoutZ);
/// assert!("middle".parse::<TranslateMode>().is_err());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranslateMode {
    /// Bounding box minimum corner goes to the origin.
    MinBound,
    /// Vertex mean goes to the origin.
    Center,
    /// Bounding box centre in X and Y, bounding box minimum in Z.
    ///
    /// The shape ends up standing on the `z = 0` plane, centred horizontally.
    #[default]
    CenterWithoutZ,
}

impl TranslateMode {
    /// All modes, in declaration order.
    pub const ALL: [Self; 3] = [Self::MinBound, Self::Center, Self::CenterWithoutZ];

    /// Name used in configuration files.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MinBound => "min_bound",
            Self::Center => "center",
            Self::CenterWithoutZ => "center_without_z",
        }
    }

    /// The point of `mesh` that this mode moves to the origin.
    ///
    /// Returns zero for a mesh without vertices.
    #[must_use]
    pub fn reference_point(self, mesh: &IndexedMesh) -> Vector3<f64> {
        if mesh.vertices.is_empty() {
            return Vector3::zeros();
        }
        let bounds = mesh.bounds();
        match self {
            Self::MinBound => bounds.min.coords,
            Self::Center => mesh
                .vertex_centroid()
                .map_or_else(Vector3::zeros, |c| c.coords),
            Self::CenterWithoutZ => {
                let c = bounds.center();
                Vector3::new(c.x, c.y, bounds.min.z)
            }
        }
    }

    /// Subtract this mode's reference point from every vertex.
    ///
    /// Returns the offset that was subtracted.
    pub fn apply(self, mesh: &mut IndexedMesh) -> Vector3<f64> {
        let offset = self.reference_point(mesh);
        mesh.translate(-offset);
        offset
    }
}

impl fmt::Display for TranslateMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TranslateMode {
    type Err = DatasetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| DatasetError::UnknownTranslateMode(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use mesh_types::unit_cube;

    fn lopsided() -> IndexedMesh {
        // extra vertex pulls the mean away from the bbox centre
        let mut mesh = unit_cube();
        mesh.vertices.push(mesh_types::Vertex::from_coords(1.0, 1.0, 1.0));
        mesh.vertices.push(mesh_types::Vertex::from_coords(1.0, 1.0, 1.0));
        mesh.translate(Vector3::new(3.0, -2.0, 5.0));
        mesh
    }

    #[test]
    fn min_bound_moves_min_corner_to_origin() {
        let mut mesh = lopsided();
        TranslateMode::MinBound.apply(&mut mesh);
        let b = mesh.bounds();
        assert_relative_eq!(b.min.coords.norm(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn center_uses_vertex_mean() {
        let mut mesh = lopsided();
        TranslateMode::Center.apply(&mut mesh);
        let c = mesh.vertex_centroid().expect("has vertices");
        assert_relative_eq!(c.coords.norm(), 0.0, epsilon = 1e-12);
        // bbox centre is not at the origin for this mesh
        assert!(mesh.bounds().center().coords.norm() > 0.1);
    }

    #[test]
    fn center_without_z_stands_on_floor() {
        let mut mesh = lopsided();
        TranslateMode::CenterWithoutZ.apply(&mut mesh);
        let b = mesh.bounds();
        assert_relative_eq!(b.center().x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(b.center().y, 0.0, epsilon = 1e-12);
        assert_relative_eq!(b.min.z, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn parse_and_display_roundtrip() {
        for mode in TranslateMode::ALL {
            assert_eq!(mode.to_string().parse::<TranslateMode>().ok(), Some(mode));
        }
        assert_eq!(TranslateMode::default(), TranslateMode::CenterWithoutZ);
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&TranslateMode::MinBound).expect("serialize");
        assert_eq!(json, "\"min_bound\"");
    }
}
