//! STL support.
//!
//! Both encodings are read. A file is treated as binary when its length
//! matches the triangle count stored after the 80-byte header exactly,
//! otherwise it must be ASCII starting with `solid`. STL stores a triangle
//! soup, so every face gets its own three vertices.
//!
//! Only binary STL is written.

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use mesh_types::{IndexedMesh, MeshTopology, Vector3, Vertex};

use crate::error::{IoError, IoResult};

const HEADER_SIZE: usize = 80;
const TRIANGLE_SIZE: usize = 50;

/// Load a mesh from an STL file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid STL.
pub fn load_stl<P: AsRef<Path>>(path: P) -> IoResult<IndexedMesh> {
    let path = path.as_ref();
    let mut file = File::open(path).map_err(|e| IoError::from_open(path, e))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;
    parse_stl(&bytes)
}

/// Parse STL content held in memory.
///
/// # Errors
///
/// Returns an error if the bytes are neither binary nor ASCII STL.
pub fn parse_stl(bytes: &[u8]) -> IoResult<IndexedMesh> {
    if let Some(count) = binary_triangle_count(bytes) {
        return parse_binary(bytes, count);
    }
    let text = std::str::from_utf8(bytes)
        .map_err(|_| IoError::invalid_content("STL is neither binary nor UTF-8 text"))?;
    if !text.trim_start().starts_with("solid") {
        return Err(IoError::invalid_content("ASCII STL must start with 'solid'"));
    }
    parse_ascii(text)
}

/// Declared triangle count, if the byte length is consistent with it.
fn binary_triangle_count(bytes: &[u8]) -> Option<u32> {
    let count_bytes: [u8; 4] = bytes.get(HEADER_SIZE..HEADER_SIZE + 4)?.try_into().ok()?;
    let count = u32::from_le_bytes(count_bytes);
    let expected = HEADER_SIZE + 4 + count as usize * TRIANGLE_SIZE;
    (bytes.len() == expected).then_some(count)
}

fn parse_binary(bytes: &[u8], count: u32) -> IoResult<IndexedMesh> {
    let mut mesh = IndexedMesh::with_capacity(count as usize * 3, count as usize);
    let body = &bytes[HEADER_SIZE + 4..];
    for (i, record) in body.chunks_exact(TRIANGLE_SIZE).enumerate() {
        // bytes 0..12 hold the stored normal, which is recomputed from winding instead
        for corner in 0..3 {
            let start = 12 + corner * 12;
            mesh.vertices.push(read_vertex(&record[start..start + 12]));
        }
        #[allow(clippy::cast_possible_truncation)]
        let base = (i * 3) as u32;
        mesh.faces.push([base, base + 1, base + 2]);
    }
    #[allow(clippy::cast_possible_truncation)]
    let got = mesh.face_count() as u32;
    if got != count {
        return Err(IoError::Truncated {
            expected: count,
            got,
        });
    }
    Ok(mesh)
}

fn read_vertex(buf: &[u8]) -> Vertex {
    let coord = |o: usize| f64::from(f32::from_le_bytes([buf[o], buf[o + 1], buf[o + 2], buf[o + 3]]));
    Vertex::from_coords(coord(0), coord(4), coord(8))
}

fn parse_ascii(text: &str) -> IoResult<IndexedMesh> {
    let mut mesh = IndexedMesh::new();
    let mut corners: Vec<Vertex> = Vec::with_capacity(3);

    for (idx, line) in text.lines().enumerate() {
        let mut parts = line.split_whitespace();
        match parts.next() {
            Some("vertex") => {
                let mut coords = [0.0_f64; 3];
                for c in &mut coords {
                    *c = parts
                        .next()
                        .and_then(|t| t.parse().ok())
                        .ok_or_else(|| IoError::invalid_line(idx + 1, "malformed vertex"))?;
                }
                corners.push(Vertex::from_coords(coords[0], coords[1], coords[2]));
            }
            Some("endloop") => {
                if corners.len() != 3 {
                    return Err(IoError::invalid_line(
                        idx + 1,
                        format!("facet has {} vertices, expected 3", corners.len()),
                    ));
                }
                #[allow(clippy::cast_possible_truncation)]
                let base = mesh.vertices.len() as u32;
                mesh.vertices.append(&mut corners);
                mesh.faces.push([base, base + 1, base + 2]);
            }
            Some("endsolid") => break,
            _ => {}
        }
    }
    Ok(mesh)
}

/// Save a mesh as binary STL.
///
/// # Errors
///
/// Returns an error if the file cannot be written or a face index is out of
/// range.
pub fn save_stl<P: AsRef<Path>>(mesh: &IndexedMesh, path: P) -> IoResult<()> {
    let file = File::create(path)?;
    write_stl(mesh, BufWriter::new(file))
}

/// Write a mesh as binary STL.
///
/// # Errors
///
/// See [`save_stl`].
pub fn write_stl<W: Write>(mesh: &IndexedMesh, mut writer: W) -> IoResult<()> {
    let mut header = [b' '; HEADER_SIZE];
    let text = b"binary STL written by mesh-io";
    header[..text.len()].copy_from_slice(text);
    writer.write_all(&header)?;

    #[allow(clippy::cast_possible_truncation)]
    let count = mesh.face_count() as u32;
    writer.write_all(&count.to_le_bytes())?;

    for face_index in 0..mesh.face_count() {
        let tri = mesh.triangle(face_index).ok_or_else(|| {
            IoError::invalid_content(format!("face {face_index} references a missing vertex"))
        })?;
        let normal = tri.normal().unwrap_or_else(Vector3::zeros);
        for v in [normal.x, normal.y, normal.z] {
            write_f32(&mut writer, v)?;
        }
        for p in [tri.v0, tri.v1, tri.v2] {
            for v in [p.x, p.y, p.z] {
                write_f32(&mut writer, v)?;
            }
        }
        writer.write_all(&0u16.to_le_bytes())?;
    }
    writer.flush()?;
    Ok(())
}

#[allow(clippy::cast_possible_truncation)]
fn write_f32<W: Write>(writer: &mut W, value: f64) -> IoResult<()> {
    writer.write_all(&(value as f32).to_le_bytes())?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use mesh_types::unit_cube;

    #[test]
    fn binary_roundtrip() {
        let cube = unit_cube();
        let mut buf = Vec::new();
        write_stl(&cube, &mut buf).unwrap();
        assert_eq!(buf.len(), 84 + 12 * 50);

        let loaded = parse_stl(&buf).unwrap();
        assert_eq!(loaded.face_count(), 12);
        assert_eq!(loaded.vertex_count(), 36);
        assert_relative_eq!(loaded.signed_volume(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn ascii_parsing() {
        let text = b"solid test
  facet normal 0 0 1
    outer loop
      vertex 0 0 0
      vertex 1 0 0
      vertex 0 1 0
    endloop
  endfacet
endsolid test";
        let mesh = parse_stl(text).unwrap();
        assert_eq!(mesh.face_count(), 1);
        assert_relative_eq!(mesh.vertices[1].position.x, 1.0);
    }

    #[test]
    fn ascii_facet_with_two_vertices_is_error() {
        let text = b"solid t\nfacet\nouter loop\nvertex 0 0 0\nvertex 1 0 0\nendloop\nendfacet\nendsolid";
        assert!(matches!(
            parse_stl(text),
            Err(IoError::InvalidContent { line: 6, .. })
        ));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(parse_stl(&[0xff; 10]).is_err());
    }

    #[test]
    fn missing_file() {
        let err = load_stl("definitely_missing_4242.stl").unwrap_err();
        assert!(matches!(err, IoError::FileNotFound { .. }));
    }
}
