//! Mesh construction utilities.
//!
//! This module builds half-face meshes from cells given as vertex cycles, the
//! way flat mesh formats describe them. Edges and faces are shared between
//! cells through lookup tables keyed on their vertex sets, and each cell gets
//! the half-face whose winding matches its own view of the face.

use std::collections::HashMap;

use nalgebra::Point3;

use super::index::{CellId, EdgeId, FaceId, HalfEdgeId, HalfFaceId, MeshIndex, VertexId};
use super::polyhedral::PolyhedralMesh;
use crate::error::{MeshError, Result};

/// Decide which half of a registered face a winding refers to.
///
/// Returns `Some(false)` if `winding` is a cyclic rotation of `registered`,
/// `Some(true)` if it is a rotation of the reversed cycle, and `None` if the
/// two are not the same polygon.
///
/// # Example
/// ```
/// use volmesh_convert::mesh::match_cycle;
///
/// assert_eq!(match_cycle(&[1, 2, 3], &[3, 1, 2]), Some(false));
/// assert_eq!(match_cycle(&[1, 2, 3], &[1, 3, 2]), Some(true));
/// assert_eq!(match_cycle(&[1, 2, 3, 4], &[1, 3, 2, 4]), None);
/// ```
pub fn match_cycle<T: PartialEq>(registered: &[T], winding: &[T]) -> Option<bool> {
    let n = registered.len();
    if n == 0 || winding.len() != n {
        return None;
    }
    let start = registered.iter().position(|v| *v == winding[0])?;

    let forward = (0..n).all(|k| registered[(start + k) % n] == winding[k]);
    if forward {
        return Some(false);
    }
    let backward = (0..n).all(|k| registered[(start + n - k) % n] == winding[k]);
    if backward {
        return Some(true);
    }
    None
}

/// Incremental builder for [`PolyhedralMesh`].
///
/// # Example
/// ```
/// use volmesh_convert::mesh::{PolyhedralBuilder, PolyhedralMesh, TET_FACES};
/// use nalgebra::Point3;
///
/// let mut builder = PolyhedralBuilder::new();
/// let v: Vec<_> = [
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
///     Point3::new(0.0, 0.0, 1.0),
/// ]
/// .into_iter()
/// .map(|p| builder.add_vertex(p).unwrap())
/// .collect();
///
/// let mut halffaces = Vec::new();
/// for facet in TET_FACES {
///     halffaces.push(builder.halfface(&[v[facet[0]], v[facet[1]], v[facet[2]]]).unwrap());
/// }
/// builder.add_cell(halffaces).unwrap();
///
/// let mesh: PolyhedralMesh = builder.finish();
/// assert_eq!(mesh.num_faces(), 4);
/// assert_eq!(mesh.num_edges(), 6);
/// ```
#[derive(Debug, Clone)]
pub struct PolyhedralBuilder<I: MeshIndex = u32> {
    mesh: PolyhedralMesh<I>,

    /// Edge lookup keyed by (smaller, larger) vertex.
    edge_map: HashMap<(VertexId<I>, VertexId<I>), EdgeId<I>>,

    /// Face lookup keyed by sorted vertex set.
    face_map: HashMap<Vec<VertexId<I>>, FaceId<I>>,
}

impl<I: MeshIndex> Default for PolyhedralBuilder<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: MeshIndex> PolyhedralBuilder<I> {
    /// Create a builder for an empty mesh.
    pub fn new() -> Self {
        Self::from_mesh(PolyhedralMesh::new())
    }

    /// Create a builder with pre-allocated capacity.
    pub fn with_capacity(num_vertices: usize, num_cells: usize) -> Self {
        Self::from_mesh(PolyhedralMesh::with_capacity(num_vertices, num_cells))
    }

    /// Continue building on a mesh that holds vertices but no faces yet.
    pub fn from_mesh(mesh: PolyhedralMesh<I>) -> Self {
        debug_assert!(mesh.num_faces() == 0, "builder expects a mesh without faces");
        Self {
            mesh,
            edge_map: HashMap::new(),
            face_map: HashMap::new(),
        }
    }

    /// The mesh built so far.
    pub fn mesh(&self) -> &PolyhedralMesh<I> {
        &self.mesh
    }

    /// Add a vertex.
    pub fn add_vertex(&mut self, position: Point3<f64>) -> Result<VertexId<I>> {
        self.mesh.add_vertex(position)
    }

    /// Find or create the half-edge running `from -> to`.
    pub fn halfedge(&mut self, from: VertexId<I>, to: VertexId<I>) -> Result<HalfEdgeId<I>> {
        let key = if from < to { (from, to) } else { (to, from) };
        let edge = match self.edge_map.get(&key) {
            Some(&e) => e,
            None => {
                let e = self.mesh.add_edge(from, to)?;
                self.edge_map.insert(key, e);
                e
            }
        };
        let [a, _] = self.mesh.edge_vertices(edge);
        Ok(edge.halfedge(a != from))
    }

    /// Find or create the half-face traversing `cycle`.
    ///
    /// A new face is registered with `cycle` as its stored orientation, so the
    /// first cell to mention a face gets the unflipped half. Later mentions are
    /// matched against the registered cycle.
    pub fn halfface(&mut self, cycle: &[VertexId<I>]) -> Result<HalfFaceId<I>> {
        let mut key = cycle.to_vec();
        key.sort_unstable();
        if key.windows(2).any(|w| w[0] == w[1]) {
            return Err(MeshError::InvalidTopology(format!(
                "face {:?} repeats a vertex",
                cycle
            )));
        }

        if let Some(&face) = self.face_map.get(&key) {
            let registered = self.mesh.face_vertices(face);
            let flipped = match_cycle(&registered, cycle).ok_or_else(|| {
                MeshError::InvalidTopology(format!(
                    "cycle {:?} does not traverse face {} ({:?})",
                    cycle,
                    face.index(),
                    registered
                ))
            })?;
            return Ok(face.halfface(flipped));
        }

        let n = cycle.len();
        let mut halfedges = Vec::with_capacity(n);
        for i in 0..n {
            halfedges.push(self.halfedge(cycle[i], cycle[(i + 1) % n])?);
        }
        let face = self.mesh.add_face(halfedges)?;
        self.face_map.insert(key, face);
        Ok(face.halfface(false))
    }

    /// Add a cell from its outward half-faces.
    pub fn add_cell(&mut self, halffaces: Vec<HalfFaceId<I>>) -> Result<CellId<I>> {
        self.mesh.add_cell(halffaces)
    }

    /// Finish construction and return the mesh.
    pub fn finish(self) -> PolyhedralMesh<I> {
        self.mesh
    }
}
