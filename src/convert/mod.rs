//! Conversion between half-face and flat volumetric meshes.
//!
//! A conversion is three stages run in one pass: vertex transfer (exact
//! coordinate copy plus an [`IndexCorrespondence`]), then cell topology
//! transfer in the requested direction. Nothing is shared between calls.
//!
//! | Direction | Cells | Function |
//! |-----------|-------|----------|
//! | half-face -> flat | hexahedra | [`hexahedral_to_flat`] |
//! | half-face -> flat | tetrahedra | [`tetrahedral_to_flat`] |
//! | flat -> half-face | tetrahedra | [`tetrahedra_to_polyhedral`] |
//! | flat -> half-face | hexahedra | [`hexahedra_to_polyhedral`] |
//!
//! [`polyhedral_to_flat`] and [`flat_to_polyhedral`] pick the path from the
//! cells present, and [`convert_file`] runs load, convert and save.
//!
//! # Example
//!
//! ```no_run
//! use volmesh_convert::convert::{convert_file, ConvertOptions, OrientationCheck};
//!
//! let options = ConvertOptions::default().with_orientation(OrientationCheck::Repair);
//! convert_file("tets.mesh", "tets.ovm", &options).unwrap();
//! ```

mod hexahedra;
mod tetrahedra;
mod vertices;

pub use hexahedra::{hex_signed_volume, hexahedra_to_polyhedral, hexahedral_to_flat};
pub use tetrahedra::{tetrahedra_to_polyhedral, tetrahedral_to_flat};
pub use vertices::{transfer_to_flat, transfer_to_polyhedral, IndexCorrespondence};

use std::path::Path;

use log::{info, warn};

use crate::error::{MeshError, Result};
use crate::io::{medit, ovm, Format};
use crate::mesh::{CellKind, FlatMesh, HexConvention, MeshIndex, PolyhedralMesh};

/// How cell orientation is checked when building half-faces from flat rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrientationCheck {
    /// Use the row order as given. Inconsistent neighbours are still caught
    /// when they claim the same half-face.
    Trust,
    /// Reject cells with non-positive signed volume.
    #[default]
    Verify,
    /// Mirror cells with negative signed volume; reject zero volume.
    Repair,
}

/// Options for mesh conversion.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Corner order of hexahedra produced by half-face -> flat conversion.
    pub hex_convention: HexConvention,

    /// Orientation policy for flat -> half-face conversion.
    pub orientation: OrientationCheck,

    /// Reject NaN or infinite coordinates during vertex transfer.
    pub check_finite: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            hex_convention: HexConvention::Medit,
            orientation: OrientationCheck::Verify,
            check_finite: false,
        }
    }
}

impl ConvertOptions {
    /// Set the hexahedron corner order of flat output.
    pub fn with_hex_convention(mut self, convention: HexConvention) -> Self {
        self.hex_convention = convention;
        self
    }

    /// Set the orientation policy.
    pub fn with_orientation(mut self, orientation: OrientationCheck) -> Self {
        self.orientation = orientation;
        self
    }

    /// Set whether non-finite coordinates are rejected.
    pub fn with_check_finite(mut self, check: bool) -> Self {
        self.check_finite = check;
        self
    }
}

/// Apply the orientation policy to one cell. Returns `true` if the cell
/// must be mirrored.
pub(crate) fn orientation_fix(policy: OrientationCheck, cell: usize, volume: f64) -> Result<bool> {
    match policy {
        OrientationCheck::Trust => Ok(false),
        _ if volume == 0.0 => Err(MeshError::DegenerateCell { cell }),
        OrientationCheck::Verify if volume < 0.0 => Err(MeshError::InvertedCell { cell, volume }),
        OrientationCheck::Repair if volume < 0.0 => {
            warn!("cell {} is inverted (signed volume {}), mirroring it", cell, volume);
            Ok(true)
        }
        _ => Ok(false),
    }
}

/// Check that every face is used by one or two cells. Returns the number of
/// boundary faces.
///
/// Two cells on the same half-face are already refused by
/// [`PolyhedralMesh::add_cell`]; this catches faces no cell kept.
pub(crate) fn check_face_usage<I: MeshIndex>(mesh: &PolyhedralMesh<I>) -> Result<usize> {
    let mut boundary = 0;
    for f in mesh.face_ids() {
        let used = [f.halfface(false), f.halfface(true)]
            .iter()
            .filter(|&&hf| mesh.halfface_cell(hf).is_some())
            .count();
        match used {
            0 => {
                return Err(MeshError::InvalidTopology(format!(
                    "face {} is not used by any cell",
                    f.index()
                )))
            }
            1 => boundary += 1,
            _ => {}
        }
    }
    Ok(boundary)
}

/// Convert a half-face mesh to flat rows.
///
/// Uses the tetrahedral path if every cell is a tetrahedron, the hexahedral
/// path otherwise (which rejects anything that is not a hexahedron).
pub fn polyhedral_to_flat<I: MeshIndex>(
    mesh: &PolyhedralMesh<I>,
    options: &ConvertOptions,
) -> Result<FlatMesh> {
    let all_tets = mesh.num_cells() > 0
        && mesh.cell_ids().all(|c| mesh.cell_kind(c) == CellKind::Tetrahedron);
    if all_tets {
        tetrahedral_to_flat(mesh, options)
    } else {
        hexahedral_to_flat(mesh, options)
    }
}

/// Convert flat rows to a half-face mesh.
///
/// Uses the hexahedral path for purely hexahedral meshes and the tetrahedral
/// path otherwise (which rejects any hexahedron).
pub fn flat_to_polyhedral<I: MeshIndex>(
    flat: &FlatMesh,
    options: &ConvertOptions,
) -> Result<PolyhedralMesh<I>> {
    if flat.is_hexahedral() {
        hexahedra_to_polyhedral(flat, options)
    } else {
        tetrahedra_to_polyhedral(flat, options)
    }
}

/// Load `input`, convert it to the representation of `output`, and save it.
///
/// Formats are chosen by extension (`.ovm` half-face, `.mesh` flat). The
/// output file is only created once conversion has succeeded.
pub fn convert_file<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    options: &ConvertOptions,
) -> Result<()> {
    let input = input.as_ref();
    let output = output.as_ref();
    let input_format = Format::detect(input)?;
    let output_format = Format::detect(output)?;

    let flat = match input_format {
        Format::Ovm => {
            let mesh: PolyhedralMesh = ovm::load(input)?;
            polyhedral_to_flat(&mesh, options)?
        }
        Format::Medit => medit::load(input)?,
    };

    match output_format {
        Format::Ovm => {
            let mesh: PolyhedralMesh = flat_to_polyhedral(&flat, options)?;
            ovm::save(&mesh, output)?;
        }
        Format::Medit => medit::save(&flat, output)?,
    }

    info!(
        "converted {} ({:?}) to {} ({:?}): {} vertices, {} cells",
        input.display(),
        input_format,
        output.display(),
        output_format,
        flat.num_vertices(),
        flat.num_cells()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn one_tet() -> FlatMesh {
        let mut flat = FlatMesh::new(HexConvention::Medit);
        flat.vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
        ];
        flat.tetrahedra.push([0, 1, 2, 3]);
        flat
    }

    fn one_hex() -> FlatMesh {
        let mut flat = FlatMesh::new(HexConvention::Ovm);
        flat.vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(0.0, 1.0, 1.0),
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(1.0, 0.0, 1.0),
        ];
        flat.hexahedra.push([0, 1, 2, 3, 4, 5, 6, 7]);
        flat
    }

    #[test]
    fn test_orientation_fix_policies() {
        assert!(!orientation_fix(OrientationCheck::Trust, 0, -1.0).unwrap());
        assert!(!orientation_fix(OrientationCheck::Trust, 0, 0.0).unwrap());
        assert!(!orientation_fix(OrientationCheck::Verify, 0, 1.0).unwrap());
        assert!(orientation_fix(OrientationCheck::Verify, 3, -1.0).is_err());
        assert!(orientation_fix(OrientationCheck::Repair, 0, -1.0).unwrap());
        assert!(matches!(
            orientation_fix(OrientationCheck::Repair, 2, 0.0),
            Err(MeshError::DegenerateCell { cell: 2 })
        ));
    }

    #[test]
    fn test_dispatch_by_cell_kind() {
        let options = ConvertOptions::default();

        let tets: PolyhedralMesh = flat_to_polyhedral(&one_tet(), &options).unwrap();
        assert_eq!(tets.num_faces(), 4);
        let back = polyhedral_to_flat(&tets, &options).unwrap();
        assert_eq!(back.tetrahedra.len(), 1);
        assert!(back.hexahedra.is_empty());

        let hexes: PolyhedralMesh = flat_to_polyhedral(&one_hex(), &options).unwrap();
        assert_eq!(hexes.num_faces(), 6);
        let back = polyhedral_to_flat(&hexes, &options).unwrap();
        assert_eq!(back.hexahedra, vec![[0, 3, 2, 1, 4, 5, 6, 7]]);
        assert_eq!(back.hex_convention, HexConvention::Medit);
    }

    #[test]
    fn test_mixed_flat_mesh_takes_tet_path() {
        let mut mixed = one_hex();
        mixed.tetrahedra.push([0, 1, 3, 4]);
        let result: Result<PolyhedralMesh> = flat_to_polyhedral(&mixed, &ConvertOptions::default());
        assert!(matches!(result, Err(MeshError::NotTetrahedral { .. })));
    }

    #[test]
    fn test_counts_preserved() {
        let options = ConvertOptions::default();
        for flat in [one_tet(), one_hex()] {
            let mesh: PolyhedralMesh = flat_to_polyhedral(&flat, &options).unwrap();
            assert_eq!(mesh.num_vertices(), flat.num_vertices());
            assert_eq!(mesh.num_cells(), flat.num_cells());
            let back = polyhedral_to_flat(&mesh, &options).unwrap();
            assert_eq!(back.num_vertices(), flat.num_vertices());
            assert_eq!(back.num_cells(), flat.num_cells());
        }
    }

    #[test]
    fn test_convert_file_both_directions() {
        let dir = tempfile::tempdir().unwrap();
        let mesh_in = dir.path().join("cube.mesh");
        let ovm_out = dir.path().join("cube.ovm");
        let mesh_out = dir.path().join("back.mesh");

        let mut flat = one_hex();
        flat.hexahedra = flat.hexahedra_as(HexConvention::Medit);
        flat.hex_convention = HexConvention::Medit;
        medit::save(&flat, &mesh_in).unwrap();

        let options = ConvertOptions::default();
        convert_file(&mesh_in, &ovm_out, &options).unwrap();
        let mesh: PolyhedralMesh = ovm::load(&ovm_out).unwrap();
        assert_eq!(mesh.num_cells(), 1);
        assert_eq!(mesh.num_faces(), 6);

        convert_file(&ovm_out, &mesh_out, &options).unwrap();
        assert_eq!(
            std::fs::read_to_string(&mesh_out).unwrap(),
            std::fs::read_to_string(&mesh_in).unwrap()
        );
    }

    #[test]
    fn test_failed_conversion_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("mixed.mesh");
        let output = dir.path().join("mixed.ovm");

        let mut mixed = one_hex();
        mixed.hex_convention = HexConvention::Medit;
        mixed.tetrahedra.push([0, 1, 3, 4]);
        medit::save(&mixed, &input).unwrap();

        let result = convert_file(&input, &output, &ConvertOptions::default());
        assert!(matches!(result, Err(MeshError::NotTetrahedral { .. })));
        assert!(!output.exists());
    }

    #[test]
    fn test_unknown_extension_fails_before_reading() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.vtk");
        let result = convert_file(dir.path().join("missing.mesh"), &output, &ConvertOptions::default());
        assert!(matches!(result, Err(MeshError::UnsupportedFormat { .. })));
        assert!(!output.exists());
    }

    #[test]
    fn test_options_builder() {
        let options = ConvertOptions::default()
            .with_hex_convention(HexConvention::Geogram)
            .with_orientation(OrientationCheck::Trust)
            .with_check_finite(true);
        assert_eq!(options.hex_convention, HexConvention::Geogram);
        assert_eq!(options.orientation, OrientationCheck::Trust);
        assert!(options.check_finite);
    }
}
