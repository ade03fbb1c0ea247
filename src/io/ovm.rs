//! OpenVolumeMesh ASCII (`.ovm`) format support.
//!
//! Half-edges and half-faces are numbered `2 * id + orientation`, the same
//! encoding [`HalfEdgeId`](crate::mesh::HalfEdgeId) and
//! [`HalfFaceId`](crate::mesh::HalfFaceId) use, so ids are written as-is.
//!
//! ```text
//! OVM ASCII
//! Vertices
//! 4
//! 0 0 0
//! ...
//! Edges
//! 6
//! 0 1
//! ...
//! Faces
//! 4
//! 3 2 4 6
//! ...
//! Polyhedra
//! 1
//! 4 0 2 4 6
//! ```

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use log::{debug, warn};
use nalgebra::Point3;

use super::Tokens;
use crate::error::{MeshError, Result};
use crate::mesh::{HalfEdgeId, HalfFaceId, MeshIndex, PolyhedralMesh, VertexId};

/// Load a half-face mesh from an OVM ASCII file.
///
/// Every edge, face and cell goes through the validating
/// [`PolyhedralMesh`] constructors, so a file with open cells or faces used
/// twice in the same orientation is rejected.
///
/// # Example
///
/// ```no_run
/// use volmesh_convert::io::ovm;
/// use volmesh_convert::mesh::PolyhedralMesh;
///
/// let mesh: PolyhedralMesh = ovm::load("model.ovm").unwrap();
/// println!("{} cells", mesh.num_cells());
/// ```
pub fn load<P: AsRef<Path>, I: MeshIndex>(path: P) -> Result<PolyhedralMesh<I>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    parse(path, &text)
}

/// Parse OVM ASCII text. `path` is only used in error messages.
pub fn parse<I: MeshIndex>(path: &Path, text: &str) -> Result<PolyhedralMesh<I>> {
    let mut tokens = Tokens::new(path, text);

    let magic = tokens.expect("OVM header")?;
    let encoding = tokens.expect("OVM header")?;
    if !magic.eq_ignore_ascii_case("OVM") {
        return Err(tokens.error(format!("not an OVM file (header '{}')", magic)));
    }
    if !encoding.eq_ignore_ascii_case("ASCII") {
        return Err(tokens.error(format!("unsupported OVM encoding '{}'", encoding)));
    }

    section(&mut tokens, "Vertices")?;
    let n = tokens.count("vertex count", 3)?;
    let mut mesh = PolyhedralMesh::with_capacity(n, 0);
    for _ in 0..n {
        let x = tokens.f64("x coordinate")?;
        let y = tokens.f64("y coordinate")?;
        let z = tokens.f64("z coordinate")?;
        mesh.add_vertex(Point3::new(x, y, z))?;
    }

    section(&mut tokens, "Edges")?;
    let n = tokens.count("edge count", 2)?;
    for _ in 0..n {
        let a = bounded(&mut tokens, "edge vertex", mesh.num_vertices())?;
        let b = bounded(&mut tokens, "edge vertex", mesh.num_vertices())?;
        mesh.add_edge(VertexId::new(a), VertexId::new(b))
            .map_err(|e| located(&tokens, e))?;
    }

    section(&mut tokens, "Faces")?;
    let n = tokens.count("face count", 4)?;
    for _ in 0..n {
        let valence = tokens.count("face valence", 1)?;
        let halfedges = (0..valence)
            .map(|_| bounded(&mut tokens, "half-edge index", 2 * mesh.num_edges()).map(HalfEdgeId::new))
            .collect::<Result<Vec<_>>>()?;
        mesh.add_face(halfedges).map_err(|e| located(&tokens, e))?;
    }

    section(&mut tokens, "Polyhedra")?;
    let n = tokens.count("polyhedron count", 5)?;
    for _ in 0..n {
        let valence = tokens.count("polyhedron valence", 1)?;
        let halffaces = (0..valence)
            .map(|_| bounded(&mut tokens, "half-face index", mesh.num_halffaces()).map(HalfFaceId::new))
            .collect::<Result<Vec<_>>>()?;
        mesh.add_cell(halffaces).map_err(|e| located(&tokens, e))?;
    }

    if let Some(next) = tokens.peek() {
        warn!("{}: ignoring property data starting at '{}'", path.display(), next);
    }

    debug!(
        "read {}: {} vertices, {} edges, {} faces, {} cells",
        path.display(),
        mesh.num_vertices(),
        mesh.num_edges(),
        mesh.num_faces(),
        mesh.num_cells()
    );
    Ok(mesh)
}

/// Turn a topology error into a load error at the current line. Orientation
/// conflicts and index overflow keep their own variants.
fn located(tokens: &Tokens<'_>, e: MeshError) -> MeshError {
    match e {
        MeshError::InvalidTopology(message) => tokens.error(message),
        other => other,
    }
}

/// Read an index that must be below `bound`.
fn bounded(tokens: &mut Tokens<'_>, what: &str, bound: usize) -> Result<usize> {
    let index = tokens.usize(what)?;
    if index < bound {
        Ok(index)
    } else {
        Err(tokens.error(format!("{} {} out of range (< {})", what, index, bound)))
    }
}

fn section(tokens: &mut Tokens<'_>, name: &str) -> Result<()> {
    let found = tokens.expect(name)?;
    if found.eq_ignore_ascii_case(name) {
        Ok(())
    } else {
        Err(tokens.error(format!("expected section {}, found '{}'", name, found)))
    }
}

/// Save a half-face mesh to an OVM ASCII file.
///
/// # Example
///
/// ```no_run
/// use volmesh_convert::io::ovm;
/// use volmesh_convert::mesh::PolyhedralMesh;
///
/// let mesh: PolyhedralMesh = PolyhedralMesh::new();
/// ovm::save(&mesh, "output.ovm").unwrap();
/// ```
pub fn save<P: AsRef<Path>, I: MeshIndex>(mesh: &PolyhedralMesh<I>, path: P) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write(mesh, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Write a half-face mesh as OVM ASCII text.
pub fn write<W: Write, I: MeshIndex>(mesh: &PolyhedralMesh<I>, writer: &mut W) -> Result<()> {
    writeln!(writer, "OVM ASCII")?;

    writeln!(writer, "Vertices")?;
    writeln!(writer, "{}", mesh.num_vertices())?;
    for p in mesh.positions() {
        writeln!(writer, "{} {} {}", p.x, p.y, p.z)?;
    }

    writeln!(writer, "Edges")?;
    writeln!(writer, "{}", mesh.num_edges())?;
    for e in mesh.edge_ids() {
        let [a, b] = mesh.edge_vertices(e);
        writeln!(writer, "{} {}", a.index(), b.index())?;
    }

    writeln!(writer, "Faces")?;
    writeln!(writer, "{}", mesh.num_faces())?;
    for f in mesh.face_ids() {
        let halfedges = &mesh.face(f).halfedges;
        write!(writer, "{}", halfedges.len())?;
        for he in halfedges {
            write!(writer, " {}", he.index())?;
        }
        writeln!(writer)?;
    }

    writeln!(writer, "Polyhedra")?;
    writeln!(writer, "{}", mesh.num_cells())?;
    for c in mesh.cell_ids() {
        let halffaces = mesh.cell_halffaces(c);
        write!(writer, "{}", halffaces.len())?;
        for hf in halffaces {
            write!(writer, " {}", hf.index())?;
        }
        writeln!(writer)?;
    }
    Ok(())
}
