//! MEDIT (`.mesh`) format support.
//!
//! Text format with 1-based vertex indices and a trailing reference field on
//! every entry. Only the volume sections are kept on load; surface sections
//! are read and dropped.
//!
//! ```text
//! MeshVersionFormatted 1
//! Dimension
//! 3
//! Vertices
//! 8
//! 0 0 0 0
//! ...
//! Hexahedra
//! 1
//! 1 2 3 4 5 6 7 8 0
//! End
//! ```

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use log::{debug, warn};
use nalgebra::Point3;

use super::Tokens;
use crate::error::Result;
use crate::mesh::{FlatMesh, HexConvention};

/// Load a flat mesh from a MEDIT file.
///
/// Hexahedra are returned in [`HexConvention::Medit`] order and indices are
/// shifted to 0-based.
///
/// # Example
///
/// ```no_run
/// use volmesh_convert::io::medit;
///
/// let flat = medit::load("model.mesh").unwrap();
/// println!("{} tetrahedra", flat.tetrahedra.len());
/// ```
pub fn load<P: AsRef<Path>>(path: P) -> Result<FlatMesh> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    parse(path, &text)
}

/// Parse MEDIT text. `path` is only used in error messages.
pub fn parse(path: &Path, text: &str) -> Result<FlatMesh> {
    let mut tokens = Tokens::new(path, text);
    let mut flat = FlatMesh::new(HexConvention::Medit);

    match tokens.take() {
        Some("MeshVersionFormatted") => {
            let version = tokens.usize("format version")?;
            if version != 1 && version != 2 {
                warn!("{}: unknown MeshVersionFormatted {}", path.display(), version);
            }
        }
        Some(other) => return Err(tokens.error(format!("expected MeshVersionFormatted, found '{}'", other))),
        None => return Err(tokens.error("empty file")),
    }

    while let Some(keyword) = tokens.take() {
        match keyword {
            "Dimension" => {
                let dim = tokens.usize("dimension")?;
                if dim != 3 {
                    return Err(tokens.error(format!("only 3D meshes are supported, found dimension {}", dim)));
                }
            }
            "Vertices" => {
                let n = tokens.count("vertex count", 4)?;
                flat.vertices.reserve(n);
                for _ in 0..n {
                    let x = tokens.f64("x coordinate")?;
                    let y = tokens.f64("y coordinate")?;
                    let z = tokens.f64("z coordinate")?;
                    tokens.usize("vertex reference")?;
                    flat.vertices.push(Point3::new(x, y, z));
                }
            }
            "Tetrahedra" => {
                let n = tokens.count("tetrahedron count", 5)?;
                flat.tetrahedra.reserve(n);
                for _ in 0..n {
                    flat.tetrahedra.push(read_row(&mut tokens)?);
                }
            }
            "Hexahedra" => {
                let n = tokens.count("hexahedron count", 9)?;
                flat.hexahedra.reserve(n);
                for _ in 0..n {
                    flat.hexahedra.push(read_row(&mut tokens)?);
                }
            }
            "Edges" | "Triangles" | "Quadrilaterals" => {
                let arity = match keyword {
                    "Edges" => 2,
                    "Triangles" => 3,
                    _ => 4,
                };
                let n = tokens.count("element count", arity + 1)?;
                for _ in 0..n {
                    for _ in 0..=arity {
                        tokens.usize("element index")?;
                    }
                }
                debug!("skipped {} {}", n, keyword);
            }
            "Corners" | "Ridges" | "RequiredVertices" => {
                let n = tokens.count("entry count", 1)?;
                for _ in 0..n {
                    tokens.usize("entry index")?;
                }
                debug!("skipped {} {}", n, keyword);
            }
            "End" => break,
            other => return Err(tokens.error(format!("unknown section '{}'", other))),
        }
    }

    debug!(
        "read {}: {} vertices, {} tetrahedra, {} hexahedra",
        path.display(),
        flat.vertices.len(),
        flat.tetrahedra.len(),
        flat.hexahedra.len()
    );
    Ok(flat)
}

/// Read `K` 1-based indices plus the reference field.
fn read_row<const K: usize>(tokens: &mut Tokens<'_>) -> Result<[usize; K]> {
    let mut row = [0; K];
    for slot in row.iter_mut() {
        let index = tokens.usize("vertex index")?;
        if index == 0 {
            return Err(tokens.error("vertex indices are 1-based, found 0"));
        }
        *slot = index - 1;
    }
    tokens.usize("cell reference")?;
    Ok(row)
}

/// Save a flat mesh to a MEDIT file.
///
/// # Example
///
/// ```no_run
/// use volmesh_convert::io::medit;
/// use volmesh_convert::mesh::{FlatMesh, HexConvention};
///
/// let flat = FlatMesh::new(HexConvention::Medit);
/// medit::save(&flat, "output.mesh").unwrap();
/// ```
pub fn save<P: AsRef<Path>>(flat: &FlatMesh, path: P) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write(flat, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Write a flat mesh as MEDIT text.
///
/// Every index is written 1-based and every entry gets reference `0`.
/// Hexahedra are reordered to [`HexConvention::Medit`] first. Cell sections
/// with no entries are left out.
pub fn write<W: Write>(flat: &FlatMesh, writer: &mut W) -> Result<()> {
    writeln!(writer, "MeshVersionFormatted 1")?;
    writeln!(writer, "Dimension")?;
    writeln!(writer, "3")?;

    writeln!(writer, "Vertices")?;
    writeln!(writer, "{}", flat.vertices.len())?;
    for p in &flat.vertices {
        writeln!(writer, "{} {} {} 0", p.x, p.y, p.z)?;
    }

    if !flat.tetrahedra.is_empty() {
        writeln!(writer, "Tetrahedra")?;
        writeln!(writer, "{}", flat.tetrahedra.len())?;
        for row in &flat.tetrahedra {
            write_row(writer, row)?;
        }
    }

    if !flat.hexahedra.is_empty() {
        writeln!(writer, "Hexahedra")?;
        writeln!(writer, "{}", flat.hexahedra.len())?;
        for row in flat.hexahedra_as(HexConvention::Medit) {
            write_row(writer, &row)?;
        }
    }

    writeln!(writer, "End")?;
    Ok(())
}

fn write_row<W: Write>(writer: &mut W, row: &[usize]) -> Result<()> {
    for &v in row {
        write!(writer, "{} ", v + 1)?;
    }
    writeln!(writer, "0")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MeshError;
    use crate::convert::{hexahedral_to_flat, hexahedra_to_polyhedral, ConvertOptions};
    use crate::mesh::PolyhedralMesh;

    fn unit_cube() -> Vec<Point3<f64>> {
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(0.0, 1.0, 1.0),
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(1.0, 0.0, 1.0),
        ]
    }

    fn to_text(flat: &FlatMesh) -> String {
        let mut out = Vec::new();
        write(flat, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_single_hex_is_one_based() {
        let mut flat = FlatMesh::new(HexConvention::Medit);
        flat.vertices = unit_cube();
        flat.hexahedra.push([0, 1, 2, 3, 4, 5, 6, 7]);

        let expected = "MeshVersionFormatted 1\nDimension\n3\nVertices\n8\n\
            0 0 0 0\n1 0 0 0\n1 1 0 0\n0 1 0 0\n0 0 1 0\n0 1 1 0\n1 1 1 0\n1 0 1 0\n\
            Hexahedra\n1\n1 2 3 4 5 6 7 8 0\nEnd\n";
        assert_eq!(to_text(&flat), expected);
    }

    #[test]
    fn test_converted_cube_line() {
        let mut source = FlatMesh::new(HexConvention::Ovm);
        source.vertices = unit_cube();
        source.hexahedra.push([0, 1, 2, 3, 4, 5, 6, 7]);
        let options = ConvertOptions::default();
        let mesh: PolyhedralMesh = hexahedra_to_polyhedral(&source, &options).unwrap();
        let flat = hexahedral_to_flat(&mesh, &options).unwrap();

        let text = to_text(&flat);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[lines.len() - 2], "1 4 3 2 5 6 7 8 0");
        assert!(!text.contains("Tetrahedra"));
    }

    #[test]
    fn test_tetrahedra_section() {
        let mut flat = FlatMesh::new(HexConvention::Medit);
        flat.vertices = unit_cube()[..4].to_vec();
        flat.vertices[3] = Point3::new(0.0, 0.0, 1.5);
        flat.tetrahedra.push([0, 1, 3, 2]);

        let text = to_text(&flat);
        assert!(text.contains("0 0 1.5 0\n"));
        assert!(text.ends_with("Tetrahedra\n1\n1 2 4 3 0\nEnd\n"));
        assert!(!text.contains("Hexahedra"));
    }

    #[test]
    fn test_parse_roundtrip() {
        let mut flat = FlatMesh::new(HexConvention::Medit);
        flat.vertices = unit_cube();
        flat.vertices[6] = Point3::new(1.25, 0.1, -3e-7);
        flat.hexahedra.push([0, 3, 2, 1, 4, 5, 6, 7]);

        let back = parse(Path::new("cube.mesh"), &to_text(&flat)).unwrap();
        assert_eq!(back, flat);
    }

    #[test]
    fn test_parse_skips_surface_sections() {
        let text = "\
# exported by a mesher
MeshVersionFormatted 2
Dimension 3
Vertices
4
0 0 0 1
1 0 0 1
0 1 0 1
0 0 1 1
Triangles
1
1 2 3 7
Corners 1 1
Tetrahedra 1
1 2 3 4 2
End
ignored trailing text";
        let flat = parse(Path::new("t.mesh"), text).unwrap();
        assert_eq!(flat.vertices.len(), 4);
        assert_eq!(flat.tetrahedra, vec![[0, 1, 2, 3]]);
        assert!(flat.hexahedra.is_empty());
    }

    #[test]
    fn test_parse_errors() {
        let zero = "MeshVersionFormatted 1\nDimension 3\nVertices 0\nTetrahedra 1\n0 1 2 3 0\nEnd\n";
        assert!(matches!(
            parse(Path::new("z.mesh"), zero),
            Err(MeshError::LoadError { .. })
        ));

        let two_d = "MeshVersionFormatted 1\nDimension 2\nEnd\n";
        assert!(parse(Path::new("d.mesh"), two_d).is_err());

        let truncated = "MeshVersionFormatted 1\nVertices 2\n0 0 0 0\n";
        assert!(parse(Path::new("t.mesh"), truncated).is_err());

        let unknown = "MeshVersionFormatted 1\nPrisms 0\nEnd\n";
        assert!(parse(Path::new("u.mesh"), unknown).is_err());

        assert!(parse(Path::new("e.mesh"), "").is_err());
    }

    #[test]
    fn test_oversized_counts_are_load_errors() {
        let texts = [
            "MeshVersionFormatted 1\nDimension 3\nVertices 18446744073709551615\nEnd\n",
            "MeshVersionFormatted 1\nDimension 3\nVertices 100000000000\n0 0 0 0\nEnd\n",
            "MeshVersionFormatted 1\nTetrahedra 4611686018427387904\n1 2 3 4 0\nEnd\n",
            "MeshVersionFormatted 1\nHexahedra 18446744073709551615\nEnd\n",
            "MeshVersionFormatted 1\nTriangles 9223372036854775807\nEnd\n",
            "MeshVersionFormatted 1\nEdges 6148914691236517206\n1 2 0\nEnd\n",
            "MeshVersionFormatted 1\nCorners 2\n1\n",
        ];
        for text in texts {
            assert!(
                matches!(parse(Path::new("big.mesh"), text), Err(MeshError::LoadError { .. })),
                "{:?}",
                text
            );
        }
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cube.mesh");

        let mut flat = FlatMesh::new(HexConvention::Medit);
        flat.vertices = unit_cube();
        flat.hexahedra.push([0, 1, 2, 3, 4, 5, 6, 7]);
        save(&flat, &path).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), to_text(&flat));
        assert_eq!(load(&path).unwrap(), flat);
    }
}
