//! Hexahedral cell transfer.
//!
//! Forward: each half-face cell is read in convention-A order and permuted
//! into the flat mesh's corner convention. Reverse: each flat row is permuted
//! back to convention A and its six quads are synthesized as outward half-faces.

use log::debug;
use nalgebra::Point3;

use super::vertices::{transfer_to_flat, transfer_to_polyhedral};
use super::{check_face_usage, orientation_fix, ConvertOptions};
use crate::error::{MeshError, Result};
use crate::mesh::{
    signed_volume, FlatMesh, MeshIndex, PolyhedralBuilder, PolyhedralMesh, HEX_FACES,
};

/// Signed volume of a convention-A hexahedron.
///
/// Each face is split into four triangles around its centroid and coned to the
/// cell centroid, so non-planar faces are handled consistently.
pub fn hex_signed_volume(p: &[Point3<f64>; 8]) -> f64 {
    let center = Point3::from(p.iter().map(|q| q.coords).sum::<nalgebra::Vector3<f64>>() / 8.0);

    let mut volume = 0.0;
    for face in HEX_FACES {
        let face_center = Point3::from(face.iter().map(|&i| p[i].coords).sum::<nalgebra::Vector3<f64>>() / 4.0);
        for k in 0..4 {
            let a = &p[face[k]];
            let b = &p[face[(k + 1) % 4]];
            volume += signed_volume(&center, &face_center, a, b);
        }
    }
    volume
}

/// Mirror a convention-A hexahedron by swapping corners 1<->3 and 5<->7.
fn mirror_hex<T>(row: &mut [T; 8]) {
    row.swap(1, 3);
    row.swap(5, 7);
}

/// Convert a hexahedral half-face mesh to flat rows.
///
/// Row `i` of the result is the `i`-th cell of `mesh`, in
/// `options.hex_convention` order. Any cell that is not a hexahedron aborts
/// the whole conversion.
///
/// # Example
///
/// ```no_run
/// use volmesh_convert::convert::{hexahedral_to_flat, ConvertOptions};
/// use volmesh_convert::mesh::PolyhedralMesh;
///
/// let mesh: PolyhedralMesh = volmesh_convert::io::ovm::load("cube.ovm").unwrap();
/// let flat = hexahedral_to_flat(&mesh, &ConvertOptions::default()).unwrap();
/// assert_eq!(flat.hexahedra.len(), mesh.num_cells());
/// ```
pub fn hexahedral_to_flat<I: MeshIndex>(
    mesh: &PolyhedralMesh<I>,
    options: &ConvertOptions,
) -> Result<FlatMesh> {
    if mesh.num_cells() == 0 {
        return Err(MeshError::EmptyMesh);
    }

    let mut flat = FlatMesh::new(options.hex_convention);
    let map = transfer_to_flat(mesh, &mut flat.vertices, options.check_finite)?;

    flat.hexahedra.reserve(mesh.num_cells());
    for c in mesh.cell_ids() {
        let native = mesh.hex_vertices(c)?;
        let row = map.map_row(&native.map(|v| v.index()));
        flat.hexahedra.push(options.hex_convention.from_ovm(&row));
    }

    debug!(
        "converted {} hexahedra to flat rows ({:?} order)",
        flat.hexahedra.len(),
        options.hex_convention
    );
    Ok(flat)
}

/// Convert flat hexahedra to a half-face mesh.
///
/// Rows are read in `flat.hex_convention` order. Faces shared by two cells are
/// stored once, and each cell references the half that points out of it.
pub fn hexahedra_to_polyhedral<I: MeshIndex>(
    flat: &FlatMesh,
    options: &ConvertOptions,
) -> Result<PolyhedralMesh<I>> {
    if flat.hexahedra.is_empty() {
        return Err(MeshError::EmptyMesh);
    }
    if !flat.tetrahedra.is_empty() {
        return Err(MeshError::not_hex(0, "tetrahedron in a hexahedral mesh"));
    }
    flat.validate()?;

    let mut mesh = PolyhedralMesh::with_capacity(flat.num_vertices(), flat.num_cells());
    let map = transfer_to_polyhedral(&flat.vertices, &mut mesh, options.check_finite)?;
    let mut builder = PolyhedralBuilder::from_mesh(mesh);

    for (cell, row) in flat.hexahedra.iter().enumerate() {
        let mut native = flat.hex_convention.to_ovm(row);
        let points = native.map(|v| flat.vertices[v]);
        if orientation_fix(options.orientation, cell, hex_signed_volume(&points))? {
            mirror_hex(&mut native);
        }

        let ids = map.map_row(&native);
        let mut halffaces = Vec::with_capacity(HEX_FACES.len());
        for face in HEX_FACES {
            halffaces.push(builder.halfface(&face.map(|i| ids[i]))?);
        }
        builder.add_cell(halffaces)?;
    }

    let mesh = builder.finish();
    let boundary = check_face_usage(&mesh)?;
    debug!(
        "built {} hexahedral cells, {} faces ({} boundary)",
        mesh.num_cells(),
        mesh.num_faces(),
        boundary
    );
    Ok(mesh)
}
