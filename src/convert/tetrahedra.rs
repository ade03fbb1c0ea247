//! Tetrahedral cell transfer.
//!
//! The reverse direction is the interesting one. A flat tetrahedron only
//! knows its four corners; its facets are implied by [`TET_FACES`], which
//! winds each facet outward for a positively oriented row. For every facet the
//! cell looks up the shared face by vertex set and takes the half-face whose
//! cycle matches its own winding. A neighbour with consistent orientation sees
//! the same facet reversed and therefore gets the other half; a neighbour that
//! asks for the same half is rejected.

use log::debug;

use super::vertices::{transfer_to_flat, transfer_to_polyhedral};
use super::{check_face_usage, orientation_fix, ConvertOptions};
use crate::error::{MeshError, Result};
use crate::mesh::{signed_volume, FlatMesh, MeshIndex, PolyhedralBuilder, PolyhedralMesh, TET_FACES};

/// Convert flat tetrahedra to a half-face mesh.
///
/// Every cell must be a tetrahedron; a hexahedron anywhere in `flat` aborts
/// the conversion before anything is built. Orientation is checked according
/// to `options.orientation`.
///
/// # Example
///
/// ```
/// use volmesh_convert::convert::{tetrahedra_to_polyhedral, ConvertOptions};
/// use volmesh_convert::mesh::{FlatMesh, HexConvention, PolyhedralMesh};
/// use nalgebra::Point3;
///
/// let mut flat = FlatMesh::new(HexConvention::Medit);
/// flat.vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
///     Point3::new(0.0, 0.0, 1.0),
/// ];
/// flat.tetrahedra.push([0, 1, 2, 3]);
///
/// let mesh: PolyhedralMesh = tetrahedra_to_polyhedral(&flat, &ConvertOptions::default()).unwrap();
/// assert_eq!(mesh.num_cells(), 1);
/// assert_eq!(mesh.num_faces(), 4);
/// ```
pub fn tetrahedra_to_polyhedral<I: MeshIndex>(
    flat: &FlatMesh,
    options: &ConvertOptions,
) -> Result<PolyhedralMesh<I>> {
    if flat.num_cells() == 0 {
        return Err(MeshError::EmptyMesh);
    }
    if !flat.hexahedra.is_empty() {
        return Err(MeshError::NotTetrahedral {
            cell: flat.tetrahedra.len(),
            vertices: 8,
        });
    }
    flat.validate()?;

    let mut mesh = PolyhedralMesh::with_capacity(flat.num_vertices(), flat.num_cells());
    let map = transfer_to_polyhedral(&flat.vertices, &mut mesh, options.check_finite)?;
    let mut builder = PolyhedralBuilder::from_mesh(mesh);

    for (cell, row) in flat.tetrahedra.iter().enumerate() {
        let mut local = *row;
        let [a, b, c, d] = local.map(|v| flat.vertices[v]);
        if orientation_fix(options.orientation, cell, signed_volume(&a, &b, &c, &d))? {
            local.swap(2, 3);
        }

        let ids = map.map_row(&local);
        let mut halffaces = Vec::with_capacity(TET_FACES.len());
        for facet in TET_FACES {
            halffaces.push(builder.halfface(&facet.map(|i| ids[i]))?);
        }
        builder.add_cell(halffaces)?;
    }

    let mesh = builder.finish();
    let boundary = check_face_usage(&mesh)?;
    debug!(
        "built {} tetrahedral cells, {} faces ({} boundary, {} interior)",
        mesh.num_cells(),
        mesh.num_faces(),
        boundary,
        mesh.num_faces() - boundary
    );
    Ok(mesh)
}

/// Convert a tetrahedral half-face mesh to flat rows.
///
/// Row `i` is the `i`-th cell of `mesh`; any non-tetrahedral cell aborts.
pub fn tetrahedral_to_flat<I: MeshIndex>(
    mesh: &PolyhedralMesh<I>,
    options: &ConvertOptions,
) -> Result<FlatMesh> {
    if mesh.num_cells() == 0 {
        return Err(MeshError::EmptyMesh);
    }

    let mut flat = FlatMesh::new(options.hex_convention);
    let map = transfer_to_flat(mesh, &mut flat.vertices, options.check_finite)?;

    flat.tetrahedra.reserve(mesh.num_cells());
    for c in mesh.cell_ids() {
        let vertices = mesh.tet_vertices(c)?;
        flat.tetrahedra.push(map.map_row(&vertices.map(|v| v.index())));
    }

    debug!("converted {} tetrahedra to flat rows", flat.tetrahedra.len());
    Ok(flat)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::OrientationCheck;
    use crate::mesh::{CellId, FaceId, HexConvention};
    use nalgebra::Point3;
    use std::collections::HashSet;

    /// Two tetrahedra glued along the facet {1, 2, 3}.
    fn glued_pair(second: [usize; 4]) -> FlatMesh {
        let mut flat = FlatMesh::new(HexConvention::Medit);
        flat.vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(2.0, 2.0, 2.0),
        ];
        flat.tetrahedra.push([0, 1, 2, 3]);
        flat.tetrahedra.push(second);
        flat
    }

    /// Unit cube split into six tetrahedra around its main diagonal.
    /// Corner `i` sits at `(i & 1, (i >> 1) & 1, (i >> 2) & 1)`.
    fn kuhn_cube() -> FlatMesh {
        let mut flat = FlatMesh::new(HexConvention::Medit);
        flat.vertices = (0..8)
            .map(|i| Point3::new((i & 1) as f64, ((i >> 1) & 1) as f64, ((i >> 2) & 1) as f64))
            .collect();
        for [a, b] in [[1, 2], [1, 4], [2, 1], [2, 4], [4, 1], [4, 2]] {
            let mut tet = [0, a, a + b, 7];
            let [p, q, r, s] = tet.map(|v| flat.vertices[v]);
            if signed_volume(&p, &q, &r, &s) < 0.0 {
                tet.swap(2, 3);
            }
            flat.tetrahedra.push(tet);
        }
        flat
    }

    #[test]
    fn test_shared_facet_gets_both_orientations() {
        // Facet 0 of the second cell is [1, 3, 2], the reverse of the first's [1, 2, 3].
        let flat = glued_pair([4, 1, 3, 2]);
        let mesh: PolyhedralMesh = tetrahedra_to_polyhedral(&flat, &ConvertOptions::default()).unwrap();

        assert_eq!(mesh.num_cells(), 2);
        assert_eq!(mesh.num_faces(), 7);
        assert_eq!(mesh.num_edges(), 9);

        let shared = FaceId::new(0);
        assert!(!mesh.is_boundary_face(shared));
        assert_eq!(mesh.halfface_cell(shared.halfface(false)), Some(CellId::new(0)));
        assert_eq!(mesh.halfface_cell(shared.halfface(true)), Some(CellId::new(1)));

        let first = mesh.cell_halffaces(CellId::new(0));
        let second = mesh.cell_halffaces(CellId::new(1));
        assert_eq!(first[0], shared.halfface(false));
        assert_eq!(second[0], shared.halfface(true));

        let boundary = mesh.face_ids().filter(|&f| mesh.is_boundary_face(f)).count();
        assert_eq!(boundary, 6);
    }

    #[test]
    fn test_same_winding_twice_is_fatal() {
        // [4, 1, 2, 3] winds the shared facet like the first cell does.
        let flat = glued_pair([4, 1, 2, 3]);
        let trust = ConvertOptions::default().with_orientation(OrientationCheck::Trust);
        let result: Result<PolyhedralMesh> = tetrahedra_to_polyhedral(&flat, &trust);
        assert!(matches!(
            result,
            Err(MeshError::InconsistentWinding { face: 0, cells: [0, 1] })
        ));

        let verify = ConvertOptions::default();
        let result: Result<PolyhedralMesh> = tetrahedra_to_polyhedral(&flat, &verify);
        assert!(matches!(result, Err(MeshError::InvertedCell { cell: 1, .. })));
    }

    #[test]
    fn test_repair_flips_inverted_cell() {
        let flat = glued_pair([4, 1, 2, 3]);
        let repair = ConvertOptions::default().with_orientation(OrientationCheck::Repair);
        let mesh: PolyhedralMesh = tetrahedra_to_polyhedral(&flat, &repair).unwrap();

        let shared = FaceId::new(0);
        assert_eq!(mesh.halfface_cell(shared.halfface(true)), Some(CellId::new(1)));
    }

    #[test]
    fn test_third_cell_on_face_is_non_manifold() {
        let mut flat = glued_pair([4, 1, 3, 2]);
        flat.tetrahedra.push([5, 1, 3, 2]);
        let result: Result<PolyhedralMesh> = tetrahedra_to_polyhedral(&flat, &ConvertOptions::default());
        assert!(matches!(result, Err(MeshError::NonManifoldFace { face: 0 })));
    }

    #[test]
    fn test_degenerate_cells_rejected() {
        let mut flat = glued_pair([4, 1, 3, 2]);
        flat.tetrahedra[1] = [4, 1, 1, 2];
        assert!(matches!(
            tetrahedra_to_polyhedral::<u32>(&flat, &ConvertOptions::default()),
            Err(MeshError::DegenerateCell { cell: 1 })
        ));

        // Flat tetrahedron: zero volume
        let mut flat = glued_pair([4, 1, 3, 2]);
        flat.vertices[4] = Point3::new(0.5, 0.5, 0.0);
        flat.vertices[3] = Point3::new(0.25, 0.25, 0.0);
        assert!(matches!(
            tetrahedra_to_polyhedral::<u32>(&flat, &ConvertOptions::default()),
            Err(MeshError::DegenerateCell { .. })
        ));
    }

    #[test]
    fn test_hexahedron_in_input_is_fatal() {
        let mut flat = glued_pair([4, 1, 3, 2]);
        flat.hexahedra.push([0, 1, 2, 3, 4, 5, 0, 1]);
        let result: Result<PolyhedralMesh> = tetrahedra_to_polyhedral(&flat, &ConvertOptions::default());
        assert!(matches!(result, Err(MeshError::NotTetrahedral { cell: 2, vertices: 8 })));

        let empty = FlatMesh::new(HexConvention::Medit);
        assert!(matches!(
            tetrahedra_to_polyhedral::<u32>(&empty, &ConvertOptions::default()),
            Err(MeshError::EmptyMesh)
        ));
    }

    /// `n^3` unit cubes, each split into 6 tetrahedra around its diagonal.
    fn kuhn_grid(n: usize) -> FlatMesh {
        let at = |i: usize, j: usize, k: usize| (k * (n + 1) + j) * (n + 1) + i;
        let mut flat = FlatMesh::new(HexConvention::Medit);
        for k in 0..=n {
            for j in 0..=n {
                for i in 0..=n {
                    flat.vertices.push(Point3::new(i as f64, j as f64, k as f64));
                }
            }
        }
        for k in 0..n {
            for j in 0..n {
                for i in 0..n {
                    let c = |bits: usize| at(i + (bits & 1), j + ((bits >> 1) & 1), k + (bits >> 2));
                    for [a, b] in [[1, 2], [1, 4], [2, 1], [2, 4], [4, 1], [4, 2]] {
                        let mut tet = [c(0), c(a), c(a + b), c(7)];
                        let [p, q, r, s] = tet.map(|v| flat.vertices[v]);
                        if signed_volume(&p, &q, &r, &s) < 0.0 {
                            tet.swap(2, 3);
                        }
                        flat.tetrahedra.push(tet);
                    }
                }
            }
        }
        flat
    }

    #[test]
    fn test_u16_mesh_reports_face_overflow() {
        // 16464 cells and 34104 faces: more half-faces than u16 can number.
        let flat = kuhn_grid(14);
        let options = ConvertOptions::default();

        let wide: PolyhedralMesh<u32> = tetrahedra_to_polyhedral(&flat, &options).unwrap();
        assert_eq!(wide.num_cells(), 16464);
        assert_eq!(wide.num_faces(), 34104);

        let narrow = tetrahedra_to_polyhedral::<u16>(&flat, &options);
        assert!(matches!(
            narrow,
            Err(MeshError::TooManyElements { kind: "faces", .. })
        ));
    }

    #[test]
    fn test_kuhn_cube_topology() {
        let flat = kuhn_cube();
        let mesh: PolyhedralMesh = tetrahedra_to_polyhedral(&flat, &ConvertOptions::default()).unwrap();

        assert_eq!(mesh.num_vertices(), 8);
        assert_eq!(mesh.num_edges(), 19);
        assert_eq!(mesh.num_faces(), 18);
        assert_eq!(mesh.num_cells(), 6);
        assert_eq!(mesh.face_ids().filter(|&f| mesh.is_boundary_face(f)).count(), 12);
    }

    #[test]
    fn test_winding_match_agrees_with_geometry() {
        // Every selected half-face must point out of its cell.
        let mesh: PolyhedralMesh = tetrahedra_to_polyhedral(&kuhn_cube(), &ConvertOptions::default()).unwrap();
        for c in mesh.cell_ids() {
            let center = mesh.cell_centroid(c);
            for &hf in mesh.cell_halffaces(c) {
                let outward = mesh.face_centroid(hf.face()) - center;
                assert!(mesh.halfface_normal(hf).dot(&outward) > 0.0, "{:?} in {:?}", hf, c);
            }
        }
    }

    #[test]
    fn test_roundtrip_preserves_cells() {
        let flat = kuhn_cube();
        let options = ConvertOptions::default();
        let mesh: PolyhedralMesh = tetrahedra_to_polyhedral(&flat, &options).unwrap();
        let back = tetrahedral_to_flat(&mesh, &options).unwrap();

        assert_eq!(back.vertices, flat.vertices);
        assert_eq!(back.tetrahedra.len(), flat.tetrahedra.len());
        assert!(back.hexahedra.is_empty());

        for (a, b) in back.tetrahedra.iter().zip(&flat.tetrahedra) {
            let sa: HashSet<_> = a.iter().collect();
            let sb: HashSet<_> = b.iter().collect();
            assert_eq!(sa, sb);

            let [p, q, r, s] = a.map(|v| back.vertices[v]);
            assert!(signed_volume(&p, &q, &r, &s) > 0.0);
        }
    }

    #[test]
    fn test_single_tet_exact_roundtrip() {
        let mut flat = glued_pair([4, 1, 3, 2]);
        flat.tetrahedra.truncate(1);
        let options = ConvertOptions::default();
        let mesh: PolyhedralMesh = tetrahedra_to_polyhedral(&flat, &options).unwrap();
        let back = tetrahedral_to_flat(&mesh, &options).unwrap();
        assert_eq!(back.tetrahedra, vec![[0, 1, 2, 3]]);
    }
}
