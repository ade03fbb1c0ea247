//! Flat indexed cell meshes.
//!
//! A [`FlatMesh`] is what solid-mesh file formats store: a vertex array and
//! fixed-arity rows of 0-based vertex indices. There are no faces; a cell's
//! facets are implied by its row order and the local tables in
//! [`convention`](super::convention).

use nalgebra::Point3;

use super::convention::HexConvention;
use crate::error::{MeshError, Result};

/// A fixed-size row of vertex indices (`K = 4` for tetrahedra, `K = 8` for hexahedra).
pub type FlatCell<const K: usize> = [usize; K];

/// A vertex array plus tetrahedron and hexahedron rows.
///
/// Cells are numbered tetrahedra first, then hexahedra, when reported in errors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatMesh {
    /// Vertex positions.
    pub vertices: Vec<Point3<f64>>,
    /// Tetrahedra as 4 vertex indices.
    pub tetrahedra: Vec<FlatCell<4>>,
    /// Hexahedra as 8 vertex indices in `hex_convention` order.
    pub hexahedra: Vec<FlatCell<8>>,
    /// Corner numbering of the rows in `hexahedra`.
    pub hex_convention: HexConvention,
}

impl FlatMesh {
    /// Create a new empty mesh whose hexahedra follow `hex_convention`.
    pub fn new(hex_convention: HexConvention) -> Self {
        Self {
            hex_convention,
            ..Default::default()
        }
    }

    /// Get the number of vertices.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Get the total number of cells.
    #[inline]
    pub fn num_cells(&self) -> usize {
        self.tetrahedra.len() + self.hexahedra.len()
    }

    /// True if the mesh has cells and all of them are tetrahedra.
    pub fn is_tetrahedral(&self) -> bool {
        !self.tetrahedra.is_empty() && self.hexahedra.is_empty()
    }

    /// True if the mesh has cells and all of them are hexahedra.
    pub fn is_hexahedral(&self) -> bool {
        !self.hexahedra.is_empty() && self.tetrahedra.is_empty()
    }

    /// The hexahedra reordered into another corner convention.
    pub fn hexahedra_as(&self, target: HexConvention) -> Vec<FlatCell<8>> {
        self.hexahedra
            .iter()
            .map(|hex| self.hex_convention.convert(target, hex))
            .collect()
    }

    /// Check that every cell references existing, distinct vertices.
    pub fn validate(&self) -> Result<()> {
        let rows = self
            .tetrahedra
            .iter()
            .map(|t| t.as_slice())
            .chain(self.hexahedra.iter().map(|h| h.as_slice()));

        for (cell, row) in rows.enumerate() {
            if let Some(&vertex) = row.iter().find(|&&v| v >= self.vertices.len()) {
                return Err(MeshError::InvalidVertexIndex { cell, vertex });
            }
            for (i, v) in row.iter().enumerate() {
                if row[..i].contains(v) {
                    return Err(MeshError::DegenerateCell { cell });
                }
            }
        }
        Ok(())
    }
}
