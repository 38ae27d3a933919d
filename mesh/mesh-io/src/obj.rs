//! Wavefront OBJ support.
//!
//! Only geometry is read: `v` and `f` records plus the `o`/`g` records that
//! split a file into separate objects. Texture coordinates, normals and
//! materials are skipped.
//!
//! # Faces
//!
//! Face entries may use any of the `v`, `v/vt`, `v//vn` and `v/vt/vn` forms.
//! Indices are 1-based; negative indices count back from the most recently
//! defined vertex. Polygons with more than three corners are fan-triangulated.
//!
//! # Scenes
//!
//! A file with several `o`/`g` groups is returned by [`load_obj_scene`] as one
//! [`SceneObject`] per non-empty group, each with its own compact vertex list.
//! [`load_obj`] concatenates them into a single mesh.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use hashbrown::HashMap;
use mesh_types::{IndexedMesh, Point3, Vertex};
use tracing::debug;

use crate::error::{IoError, IoResult};

/// One named geometry of an OBJ scene.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    /// Group or object name, empty for faces before any `o`/`g` record.
    pub name: String,
    /// Geometry of this object with locally renumbered vertices.
    pub mesh: IndexedMesh,
}

/// Load every object of an OBJ file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, a record is malformed or a
/// face references a vertex that does not exist.
pub fn load_obj_scene<P: AsRef<Path>>(path: P) -> IoResult<Vec<SceneObject>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| IoError::from_open(path, e))?;
    let objects = read_obj(BufReader::new(file))?;
    debug!(
        path = %path.display(),
        objects = objects.len(),
        "loaded OBJ scene"
    );
    Ok(objects)
}

/// Load an OBJ file as a single mesh, concatenating all objects.
///
/// # Errors
///
/// See [`load_obj_scene`].
///
/// # Example
///
/// ```no_run
/// use mesh_io::load_obj;
///
/// let mesh = load_obj("chair.obj").unwrap();
/// println!("{} faces", mesh.faces.len());
/// ```
pub fn load_obj<P: AsRef<Path>>(path: P) -> IoResult<IndexedMesh> {
    let objects = load_obj_scene(path)?;
    Ok(IndexedMesh::concatenate(objects.iter().map(|o| &o.mesh)))
}

/// Parse OBJ records from a reader.
///
/// # Errors
///
/// See [`load_obj_scene`].
pub fn read_obj<R: BufRead>(reader: R) -> IoResult<Vec<SceneObject>> {
    let mut positions: Vec<Point3<f64>> = Vec::new();
    let mut objects = Vec::new();
    let mut current = ObjectBuilder::new(String::new());

    for (line_idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = line_idx + 1;
        let record = line.split('#').next().unwrap_or_default().trim();
        let mut parts = record.split_whitespace();
        let Some(keyword) = parts.next() else {
            continue;
        };

        match keyword {
            "v" => {
                let mut coords = [0.0_f64; 3];
                for c in &mut coords {
                    let token = parts
                        .next()
                        .ok_or_else(|| IoError::invalid_line(line_no, "vertex needs 3 coordinates"))?;
                    *c = token
                        .parse()
                        .map_err(|_| IoError::invalid_line(line_no, format!("bad coordinate '{token}'")))?;
                }
                positions.push(Point3::new(coords[0], coords[1], coords[2]));
            }
            "f" => {
                let mut corners = Vec::with_capacity(4);
                for token in parts {
                    corners.push(resolve_index(token, positions.len(), line_no)?);
                }
                if corners.len() < 3 {
                    return Err(IoError::invalid_line(line_no, "face needs at least 3 vertices"));
                }
                for k in 1..corners.len() - 1 {
                    current.push_face([corners[0], corners[k], corners[k + 1]], &positions);
                }
            }
            "o" | "g" => {
                let name = parts.collect::<Vec<_>>().join(" ");
                let finished = std::mem::replace(&mut current, ObjectBuilder::new(name));
                if let Some(object) = finished.finish() {
                    objects.push(object);
                }
            }
            _ => {}
        }
    }

    if let Some(object) = current.finish() {
        objects.push(object);
    }
    Ok(objects)
}

/// Resolve a face corner token (`v`, `v/vt`, `v//vn`, `v/vt/vn`) to a 0-based index.
fn resolve_index(token: &str, defined: usize, line_no: usize) -> IoResult<usize> {
    let head = token.split('/').next().unwrap_or_default();
    let raw: i64 = head
        .parse()
        .map_err(|_| IoError::invalid_line(line_no, format!("bad face index '{token}'")))?;
    #[allow(clippy::cast_possible_wrap)]
    let resolved = match raw {
        0 => return Err(IoError::invalid_line(line_no, "face index 0 is not valid")),
        r if r > 0 => r - 1,
        r => defined as i64 + r,
    };
    match usize::try_from(resolved) {
        Ok(index) if index < defined => Ok(index),
        _ => Err(IoError::IndexOutOfRange {
            index: resolved,
            vertex_count: defined,
        }),
    }
}

/// Accumulates one object, renumbering global vertex indices locally.
struct ObjectBuilder {
    name: String,
    remap: HashMap<usize, u32>,
    mesh: IndexedMesh,
}

impl ObjectBuilder {
    fn new(name: String) -> Self {
        Self {
            name,
            remap: HashMap::new(),
            mesh: IndexedMesh::new(),
        }
    }

    fn push_face(&mut self, corners: [usize; 3], positions: &[Point3<f64>]) {
        let face = corners.map(|global| {
            *self.remap.entry(global).or_insert_with(|| {
                #[allow(clippy::cast_possible_truncation)]
                let local = self.mesh.vertices.len() as u32;
                self.mesh.vertices.push(Vertex::new(positions[global]));
                local
            })
        });
        self.mesh.faces.push(face);
    }

    fn finish(self) -> Option<SceneObject> {
        if self.mesh.faces.is_empty() {
            None
        } else {
            Some(SceneObject {
                name: self.name,
                mesh: self.mesh,
            })
        }
    }
}

/// Save a mesh as an OBJ file.
///
/// Coordinates are written with the shortest representation that reads back
/// to the same `f64`.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn save_obj<P: AsRef<Path>>(mesh: &IndexedMesh, path: P) -> IoResult<()> {
    let file = File::create(path)?;
    write_obj(mesh, BufWriter::new(file))
}

/// Write a mesh as OBJ text.
///
/// # Errors
///
/// Returns an error if the writer fails.
pub fn write_obj<W: Write>(mesh: &IndexedMesh, mut writer: W) -> IoResult<()> {
    for v in &mesh.vertices {
        let p = v.position;
        writeln!(writer, "v {} {} {}", p.x, p.y, p.z)?;
    }
    for f in &mesh.faces {
        writeln!(writer, "f {} {} {}", f[0] + 1, f[1] + 1, f[2] + 1)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use mesh_types::{MeshTopology, unit_cube};

    fn parse(text: &str) -> IoResult<Vec<SceneObject>> {
        read_obj(BufReader::new(text.as_bytes()))
    }

    #[test]
    fn single_triangle() {
        let objects = parse("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();
        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0].mesh.face_count(), 1);
        assert_eq!(objects[0].name, "");
    }

    #[test]
    fn quad_is_fan_triangulated() {
        let objects = parse("v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n").unwrap();
        assert_eq!(objects[0].mesh.faces, vec![[0, 1, 2], [0, 2, 3]]);
    }

    #[test]
    fn slash_forms_and_negative_indices() {
        let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0 0\nvn 0 0 1\nf -3/1/1 -2//1 -1/1\n";
        let objects = parse(text).unwrap();
        assert_eq!(objects[0].mesh.faces, vec![[0, 1, 2]]);
    }

    #[test]
    fn groups_become_objects() {
        let text = "\
o first
v 0 0 0
v 1 0 0
v 0 1 0
f 1 2 3
g second
v 0 0 1
v 1 0 1
v 0 1 1
f 4 5 6
g empty
";
        let objects = parse(text).unwrap();
        assert_eq!(objects.len(), 2);
        assert_eq!(objects[0].name, "first");
        assert_eq!(objects[1].name, "second");
        assert_eq!(objects[1].mesh.faces, vec![[0, 1, 2]]);
        assert_relative_eq!(objects[1].mesh.vertices[0].position.z, 1.0);
    }

    #[test]
    fn out_of_range_index_is_error() {
        let err = parse("v 0 0 0\nf 1 2 3\n").unwrap_err();
        assert!(matches!(err, IoError::IndexOutOfRange { index: 1, .. }));
    }

    #[test]
    fn malformed_vertex_reports_line() {
        let err = parse("v 0 0 0\nv 1 x 0\n").unwrap_err();
        assert!(matches!(err, IoError::InvalidContent { line: 2, .. }));
    }

    #[test]
    fn roundtrip_preserves_geometry() {
        let cube = unit_cube();
        let mut buf = Vec::new();
        write_obj(&cube, &mut buf).unwrap();
        let objects = parse(std::str::from_utf8(&buf).unwrap()).unwrap();
        assert_eq!(objects.len(), 1);
        let loaded = &objects[0].mesh;
        assert_eq!(loaded.face_count(), 12);
        assert_relative_eq!(loaded.signed_volume(), 1.0, epsilon = 1e-12);
    }
}
