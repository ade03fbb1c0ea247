//! Vertex transfer between representations.
//!
//! Coordinates are copied exactly, one destination vertex per source vertex,
//! and the resulting [`IndexCorrespondence`] is used to rewrite cell rows.

use log::debug;
use nalgebra::Point3;

use crate::error::{MeshError, Result};
use crate::mesh::{MeshIndex, PolyhedralMesh, VertexId};

/// Mapping from contiguous source vertex indices to destination vertex ids.
///
/// Built once per conversion and read-only afterwards. It is total over the
/// source vertices and injective, since every source vertex gets its own
/// destination vertex.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexCorrespondence<T> {
    targets: Vec<T>,
}

impl<T: Copy> IndexCorrespondence<T> {
    /// Number of mapped source vertices.
    #[inline]
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// True if no vertices were mapped.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Destination of a source vertex, if it exists.
    #[inline]
    pub fn get(&self, source: usize) -> Option<T> {
        self.targets.get(source).copied()
    }

    /// Rewrite a row of source indices into destination ids.
    ///
    /// Rows must be validated against the source vertex count beforehand.
    #[inline]
    pub fn map_row<const K: usize>(&self, row: &[usize; K]) -> [T; K] {
        std::array::from_fn(|i| self.targets[row[i]])
    }
}

fn check_finite(index: usize, p: &Point3<f64>) -> Result<()> {
    if p.coords.iter().all(|c| c.is_finite()) {
        Ok(())
    } else {
        Err(MeshError::NonFiniteCoordinate { vertex: index })
    }
}

/// Copy flat vertex positions into a half-face mesh.
///
/// Returns the map from flat index to the new [`VertexId`].
pub fn transfer_to_polyhedral<I: MeshIndex>(
    points: &[Point3<f64>],
    mesh: &mut PolyhedralMesh<I>,
    require_finite: bool,
) -> Result<IndexCorrespondence<VertexId<I>>> {
    let mut targets = Vec::with_capacity(points.len());
    for (i, p) in points.iter().enumerate() {
        if require_finite {
            check_finite(i, p)?;
        }
        targets.push(mesh.add_vertex(*p)?);
    }
    debug!("transferred {} vertices to half-face mesh", targets.len());
    Ok(IndexCorrespondence { targets })
}

/// Copy half-face mesh vertex positions into a flat vertex array.
///
/// Returns the map from vertex id index to flat index.
pub fn transfer_to_flat<I: MeshIndex>(
    mesh: &PolyhedralMesh<I>,
    points: &mut Vec<Point3<f64>>,
    require_finite: bool,
) -> Result<IndexCorrespondence<usize>> {
    points.reserve(mesh.num_vertices());
    let mut targets = Vec::with_capacity(mesh.num_vertices());
    for v in mesh.vertex_ids() {
        let p = mesh.position(v);
        if require_finite {
            check_finite(v.index(), p)?;
        }
        targets.push(points.len());
        points.push(*p);
    }
    debug!("transferred {} vertices to flat mesh", targets.len());
    Ok(IndexCorrespondence { targets })
}
