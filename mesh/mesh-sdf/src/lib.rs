//! Signed distance queries for triangle meshes.
//!
//! - [`MeshSdf`] answers closest-point, winding-number and signed-distance
//!   queries against one mesh; batches run in parallel with rayon and keep
//!   input order.
//! - [`sample_surface`] draws area-weighted points on a mesh surface.
//!
//! Signed distances are negative inside and positive outside. The inside test
//! uses the generalized winding number, so the mesh should be closed and
//! oriented outward for the sign to be meaningful.
//!
//! # Example
//!
//! ```
//! use mesh_sdf::signed_distance_to_mesh;
//! use mesh_types::unit_cube;
//! use nalgebra::Point3;
//!
//! let points = [Point3::new(0.5, 0.5, 0.5), Point3::new(0.5, 0.5, 3.0)];
//! let sdf = signed_distance_to_mesh(&points, &unit_cube()).unwrap();
//! assert!(sdf[0] < 0.0);
//! assert!(sdf[1] > 0.0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod distance;
mod error;
mod query;
mod sample;

pub use distance::{MeshSdf, signed_distance_to_mesh};
pub use error::{SdfError, SdfResult};
pub use query::{closest_point_on_triangle, solid_angle};
pub use sample::sample_surface;
