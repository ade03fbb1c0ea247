//! Half-face volumetric mesh data structure.
//!
//! This module provides an arena-based half-face representation for
//! polyhedral meshes, following the OpenVolumeMesh topology model.
//!
//! # Structure
//!
//! - Each **edge** stores its two vertices; its two **half-edges** are the two
//!   directions along it
//! - Each **face** stores a closed cycle of half-edges; its two **half-faces**
//!   are the two traversal directions of that cycle
//! - Each **cell** stores the half-faces bounding it, all pointing out of the cell
//! - Each half-face records the (at most one) cell that uses it
//!
//! Elements reference each other only by index, so the shared-face graph has no
//! ownership cycles. Construction is append-only.
//!
//! # Boundary Handling
//!
//! A face is on the boundary when one of its half-faces has no incident cell.

use std::collections::{HashMap, HashSet};

use nalgebra::{Point3, Vector3};

use super::index::{CellId, EdgeId, FaceId, HalfEdgeId, HalfFaceId, MeshIndex, VertexId};
use crate::error::{MeshError, Result};

/// A face: a closed cycle of half-edges.
#[derive(Debug, Clone)]
pub struct Face<I: MeshIndex = u32> {
    /// Half-edges around the face, in stored orientation.
    pub halfedges: Vec<HalfEdgeId<I>>,
}

/// A cell: the half-faces that bound it.
#[derive(Debug, Clone)]
pub struct Cell<I: MeshIndex = u32> {
    /// Outward-oriented half-faces of the cell.
    pub halffaces: Vec<HalfFaceId<I>>,
}

/// Shape of a cell as seen from its half-faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    /// Four triangular half-faces over four vertices.
    Tetrahedron,
    /// Six quadrilateral half-faces over eight vertices.
    Hexahedron,
    /// Anything else.
    Polyhedron,
}

/// An arena half-face mesh for volumetric cells.
#[derive(Debug, Clone)]
pub struct PolyhedralMesh<I: MeshIndex = u32> {
    pub(crate) vertices: Vec<Point3<f64>>,
    pub(crate) edges: Vec<[VertexId<I>; 2]>,
    pub(crate) faces: Vec<Face<I>>,
    pub(crate) cells: Vec<Cell<I>>,

    /// Cell using each half-face, indexed by half-face id. Invalid if unused.
    pub(crate) incident_cells: Vec<CellId<I>>,
}

impl<I: MeshIndex> Default for PolyhedralMesh<I> {
    fn default() -> Self {
        Self::new()
    }
}

/// Signed volume of the tetrahedron `(a, b, c, d)`.
///
/// Positive when `(b - a, c - a, d - a)` is right-handed.
pub fn signed_volume(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>, d: &Point3<f64>) -> f64 {
    (b - a).dot(&(c - a).cross(&(d - a))) / 6.0
}

impl<I: MeshIndex> PolyhedralMesh<I> {
    /// Create a new empty mesh.
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            edges: Vec::new(),
            faces: Vec::new(),
            cells: Vec::new(),
            incident_cells: Vec::new(),
        }
    }

    /// Create a mesh with pre-allocated capacity.
    pub fn with_capacity(num_vertices: usize, num_cells: usize) -> Self {
        // Interior faces are shared: tet meshes have about 2 faces and 1.2 edges
        // per cell, hex meshes about 3 of each. Reserve for the larger.
        let num_faces = num_cells * 3;
        Self {
            vertices: Vec::with_capacity(num_vertices),
            edges: Vec::with_capacity(num_faces),
            faces: Vec::with_capacity(num_faces),
            cells: Vec::with_capacity(num_cells),
            incident_cells: Vec::with_capacity(num_faces * 2),
        }
    }

    // ==================== Accessors ====================

    /// Get the number of vertices.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of edges.
    #[inline]
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Get the number of faces.
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Get the number of half-faces (always twice the face count).
    #[inline]
    pub fn num_halffaces(&self) -> usize {
        self.incident_cells.len()
    }

    /// Get the number of cells.
    #[inline]
    pub fn num_cells(&self) -> usize {
        self.cells.len()
    }

    /// Get the position of a vertex.
    #[inline]
    pub fn position(&self, v: VertexId<I>) -> &Point3<f64> {
        &self.vertices[v.index()]
    }

    /// All vertex positions, indexed by vertex id.
    #[inline]
    pub fn positions(&self) -> &[Point3<f64>] {
        &self.vertices
    }

    /// Get the two vertices of an edge, in stored order.
    #[inline]
    pub fn edge_vertices(&self, e: EdgeId<I>) -> [VertexId<I>; 2] {
        self.edges[e.index()]
    }

    /// Get the `(from, to)` vertices of a half-edge.
    #[inline]
    pub fn halfedge_vertices(&self, he: HalfEdgeId<I>) -> (VertexId<I>, VertexId<I>) {
        let [a, b] = self.edge_vertices(he.edge());
        if he.is_flipped() {
            (b, a)
        } else {
            (a, b)
        }
    }

    /// Get a face by ID.
    #[inline]
    pub fn face(&self, f: FaceId<I>) -> &Face<I> {
        &self.faces[f.index()]
    }

    /// Get the half-faces bounding a cell.
    #[inline]
    pub fn cell_halffaces(&self, c: CellId<I>) -> &[HalfFaceId<I>] {
        &self.cells[c.index()].halffaces
    }

    /// Get the cell using a half-face, if any.
    #[inline]
    pub fn halfface_cell(&self, hf: HalfFaceId<I>) -> Option<CellId<I>> {
        let c = self.incident_cells[hf.index()];
        if c.is_valid() {
            Some(c)
        } else {
            None
        }
    }

    /// Check if a face is on the boundary (used by at most one cell).
    pub fn is_boundary_face(&self, f: FaceId<I>) -> bool {
        self.halfface_cell(f.halfface(false)).is_none() || self.halfface_cell(f.halfface(true)).is_none()
    }

    // ==================== Construction ====================

    /// Add a vertex and return its ID.
    pub fn add_vertex(&mut self, position: Point3<f64>) -> Result<VertexId<I>> {
        check_room::<I>("vertices", self.vertices.len(), 1)?;
        let id = VertexId::new(self.vertices.len());
        self.vertices.push(position);
        Ok(id)
    }

    /// Add an edge between two existing, distinct vertices.
    pub fn add_edge(&mut self, a: VertexId<I>, b: VertexId<I>) -> Result<EdgeId<I>> {
        for v in [a, b] {
            if !v.is_valid() || v.index() >= self.vertices.len() {
                return Err(MeshError::InvalidTopology(format!(
                    "edge references missing vertex {:?}",
                    v
                )));
            }
        }
        if a == b {
            return Err(MeshError::InvalidTopology(format!("edge is a loop at {:?}", a)));
        }

        check_room::<I>("edges", self.edges.len(), 2)?;
        let id = EdgeId::new(self.edges.len());
        self.edges.push([a, b]);
        Ok(id)
    }

    /// Add a face from a closed cycle of half-edges.
    pub fn add_face(&mut self, halfedges: Vec<HalfEdgeId<I>>) -> Result<FaceId<I>> {
        check_room::<I>("faces", self.faces.len(), 2)?;
        let id = FaceId::new(self.faces.len());
        if halfedges.len() < 3 {
            return Err(MeshError::InvalidTopology(format!(
                "face {} has {} half-edges",
                id.index(),
                halfedges.len()
            )));
        }
        if let Some(he) = halfedges.iter().find(|he| he.edge().index() >= self.edges.len()) {
            return Err(MeshError::InvalidTopology(format!(
                "face {} references missing half-edge {:?}",
                id.index(),
                he
            )));
        }

        let n = halfedges.len();
        for i in 0..n {
            let (_, to) = self.halfedge_vertices(halfedges[i]);
            let (from, _) = self.halfedge_vertices(halfedges[(i + 1) % n]);
            if to != from {
                return Err(MeshError::InvalidTopology(format!(
                    "face {} half-edges {:?} and {:?} are not connected",
                    id.index(),
                    halfedges[i],
                    halfedges[(i + 1) % n]
                )));
            }
        }

        self.faces.push(Face { halfedges });
        self.incident_cells.push(CellId::invalid());
        self.incident_cells.push(CellId::invalid());
        Ok(id)
    }

    /// Add a cell from its outward half-faces.
    ///
    /// Fails if a half-face is already used by another cell (the neighbour
    /// was wound the same way) or if the half-faces do not enclose a volume.
    pub fn add_cell(&mut self, halffaces: Vec<HalfFaceId<I>>) -> Result<CellId<I>> {
        check_room::<I>("cells", self.cells.len(), 1)?;
        let id = CellId::new(self.cells.len());
        if halffaces.len() < 4 {
            return Err(MeshError::InvalidTopology(format!(
                "cell {} has only {} half-faces",
                id.index(),
                halffaces.len()
            )));
        }

        let mut seen = HashSet::with_capacity(halffaces.len());
        for &hf in &halffaces {
            let face = hf.face();
            if face.index() >= self.faces.len() {
                return Err(MeshError::InvalidTopology(format!(
                    "cell {} references missing face {}",
                    id.index(),
                    face.index()
                )));
            }
            if !seen.insert(face) {
                return Err(MeshError::InvalidTopology(format!(
                    "cell {} uses face {} twice",
                    id.index(),
                    face.index()
                )));
            }
            if let Some(owner) = self.halfface_cell(hf) {
                if self.halfface_cell(hf.opposite()).is_some() {
                    return Err(MeshError::NonManifoldFace { face: face.index() });
                }
                return Err(MeshError::InconsistentWinding {
                    face: face.index(),
                    cells: [owner.index(), id.index()],
                });
            }
        }

        self.check_closed(id, &halffaces)?;

        for &hf in &halffaces {
            self.incident_cells[hf.index()] = id;
        }
        self.cells.push(Cell { halffaces });
        Ok(id)
    }

    /// Every half-edge of a closed cell is matched by its opposite exactly once.
    fn check_closed(&self, id: CellId<I>, halffaces: &[HalfFaceId<I>]) -> Result<()> {
        let mut counts: HashMap<HalfEdgeId<I>, usize> = HashMap::new();
        for &hf in halffaces {
            for he in self.halfface_halfedges(hf) {
                *counts.entry(he).or_insert(0) += 1;
            }
        }

        for (&he, &n) in &counts {
            if n != 1 || counts.get(&he.opposite()) != Some(&1) {
                let (a, b) = self.halfedge_vertices(he);
                return Err(MeshError::InvalidTopology(format!(
                    "cell {} is not closed along edge {:?}-{:?}",
                    id.index(),
                    a,
                    b
                )));
            }
        }
        Ok(())
    }

    // ==================== Topology Queries ====================

    /// Get the half-edges of a half-face, in its own orientation.
    pub fn halfface_halfedges(&self, hf: HalfFaceId<I>) -> Vec<HalfEdgeId<I>> {
        let halfedges = &self.face(hf.face()).halfedges;
        if hf.is_flipped() {
            halfedges.iter().rev().map(|he| he.opposite()).collect()
        } else {
            halfedges.clone()
        }
    }

    /// Get the vertices of a face in stored order.
    pub fn face_vertices(&self, f: FaceId<I>) -> Vec<VertexId<I>> {
        self.face(f)
            .halfedges
            .iter()
            .map(|&he| self.halfedge_vertices(he).0)
            .collect()
    }

    /// Get the vertices of a half-face.
    ///
    /// A flipped half-face keeps the start vertex of its face:
    /// `[v0, v1, v2, v3]` becomes `[v0, v3, v2, v1]`.
    pub fn halfface_vertices(&self, hf: HalfFaceId<I>) -> Vec<VertexId<I>> {
        let mut vertices = self.face_vertices(hf.face());
        if hf.is_flipped() {
            vertices[1..].reverse();
        }
        vertices
    }

    /// Get the distinct vertices of a cell, in order of first appearance.
    pub fn cell_vertices(&self, c: CellId<I>) -> Vec<VertexId<I>> {
        let mut seen = HashSet::new();
        let mut vertices = Vec::new();
        for &hf in self.cell_halffaces(c) {
            for v in self.halfface_vertices(hf) {
                if seen.insert(v) {
                    vertices.push(v);
                }
            }
        }
        vertices
    }

    /// Classify a cell by its face and vertex counts.
    pub fn cell_kind(&self, c: CellId<I>) -> CellKind {
        let halffaces = self.cell_halffaces(c);
        let sides = |hf: &HalfFaceId<I>| self.face(hf.face()).halfedges.len();
        let num_vertices = self.cell_vertices(c).len();

        if halffaces.len() == 4 && num_vertices == 4 && halffaces.iter().all(|hf| sides(hf) == 3) {
            CellKind::Tetrahedron
        } else if halffaces.len() == 6 && num_vertices == 8 && halffaces.iter().all(|hf| sides(hf) == 4) {
            CellKind::Hexahedron
        } else {
            CellKind::Polyhedron
        }
    }

    /// The 8 vertices of a hexahedral cell in convention-A order.
    ///
    /// The first half-face, reversed, gives the `0, 1, 2, 3` quad; vertices
    /// 4 to 7 are the far ends of the edges leaving 0, 3, 2 and 1.
    pub fn hex_vertices(&self, c: CellId<I>) -> Result<[VertexId<I>; 8]> {
        let cell = c.index();
        let halffaces = self.cell_halffaces(c);
        if halffaces.len() != 6 {
            return Err(MeshError::not_hex(cell, format!("{} faces", halffaces.len())));
        }

        let quads: Vec<Vec<VertexId<I>>> = halffaces.iter().map(|&hf| self.halfface_vertices(hf)).collect();
        if let Some(q) = quads.iter().find(|q| q.len() != 4) {
            return Err(MeshError::not_hex(cell, format!("face with {} vertices", q.len())));
        }

        let outer = &quads[0];
        let bottom = [outer[0], outer[3], outer[2], outer[1]];

        let mut top = [VertexId::invalid(); 4];
        for (slot, &v) in bottom.iter().enumerate() {
            let mut above = None;
            for quad in &quads[1..] {
                for k in 0..4 {
                    let (a, b) = (quad[k], quad[(k + 1) % 4]);
                    let other = if a == v {
                        b
                    } else if b == v {
                        a
                    } else {
                        continue;
                    };
                    if bottom.contains(&other) {
                        continue;
                    }
                    match above {
                        None => above = Some(other),
                        Some(u) if u == other => {}
                        Some(_) => {
                            return Err(MeshError::not_hex(
                                cell,
                                format!("{:?} has more than one edge leaving the base quad", v),
                            ))
                        }
                    }
                }
            }
            top[slot] = above.ok_or_else(|| {
                MeshError::not_hex(cell, format!("{:?} has no edge leaving the base quad", v))
            })?;
        }

        let vertices = [
            bottom[0], bottom[1], bottom[2], bottom[3], top[0], top[3], top[2], top[1],
        ];
        let distinct: HashSet<_> = vertices.iter().collect();
        if distinct.len() != 8 || self.cell_vertices(c).len() != 8 {
            return Err(MeshError::not_hex(cell, "expected 8 distinct vertices"));
        }
        Ok(vertices)
    }

    /// The 4 vertices of a tetrahedral cell.
    ///
    /// The first half-face gives vertices 1, 2, 3 and the remaining vertex
    /// is 0, so a cell built from positively oriented facets reads back with
    /// positive volume.
    pub fn tet_vertices(&self, c: CellId<I>) -> Result<[VertexId<I>; 4]> {
        let vertices = self.cell_vertices(c);
        let not_tet = || MeshError::NotTetrahedral {
            cell: c.index(),
            vertices: vertices.len(),
        };
        if self.cell_kind(c) != CellKind::Tetrahedron {
            return Err(not_tet());
        }

        let first = self.halfface_vertices(self.cell_halffaces(c)[0]);
        let apex = vertices
            .iter()
            .copied()
            .find(|v| !first.contains(v))
            .ok_or_else(not_tet)?;
        Ok([apex, first[0], first[1], first[2]])
    }

    // ==================== Iteration ====================

    /// Iterate over all vertex IDs.
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId<I>> + '_ {
        (0..self.vertices.len()).map(VertexId::new)
    }

    /// Iterate over all edge IDs.
    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId<I>> + '_ {
        (0..self.edges.len()).map(EdgeId::new)
    }

    /// Iterate over all face IDs.
    pub fn face_ids(&self) -> impl Iterator<Item = FaceId<I>> + '_ {
        (0..self.faces.len()).map(FaceId::new)
    }

    /// Iterate over all cell IDs, in insertion order.
    pub fn cell_ids(&self) -> impl Iterator<Item = CellId<I>> + '_ {
        (0..self.cells.len()).map(CellId::new)
    }

    // ==================== Geometry ====================

    /// Compute the centroid of a face.
    pub fn face_centroid(&self, f: FaceId<I>) -> Point3<f64> {
        centroid(self.face_vertices(f).iter().map(|&v| self.position(v)))
    }

    /// Compute the centroid of a cell's vertices.
    pub fn cell_centroid(&self, c: CellId<I>) -> Point3<f64> {
        centroid(self.cell_vertices(c).iter().map(|&v| self.position(v)))
    }

    /// Compute the unit normal of a half-face (right-hand rule over its cycle).
    ///
    /// Returns the zero vector for degenerate faces.
    pub fn halfface_normal(&self, hf: HalfFaceId<I>) -> Vector3<f64> {
        let vertices = self.halfface_vertices(hf);
        let c = self.face_centroid(hf.face());
        let n = vertices.len();

        let mut normal = Vector3::zeros();
        for i in 0..n {
            let a = self.position(vertices[i]) - c;
            let b = self.position(vertices[(i + 1) % n]) - c;
            normal += a.cross(&b);
        }
        normal.try_normalize(0.0).unwrap_or_else(Vector3::zeros)
    }
}

/// Fail unless element number `len` and its oriented halves (`per_element`
/// ids each) fit below the index sentinel.
fn check_room<I: MeshIndex>(kind: &'static str, len: usize, per_element: usize) -> Result<()> {
    let max = I::MAX.to_usize();
    let last = len
        .checked_mul(per_element)
        .and_then(|first| first.checked_add(per_element - 1));
    match last {
        Some(last) if last <= max => Ok(()),
        _ => Err(MeshError::TooManyElements {
            kind,
            limit: max / per_element + usize::from(per_element == 1),
        }),
    }
}

fn centroid<'a>(points: impl Iterator<Item = &'a Point3<f64>>) -> Point3<f64> {
    let mut sum = Vector3::zeros();
    let mut count = 0usize;
    for p in points {
        sum += p.coords;
        count += 1;
    }
    if count == 0 {
        return Point3::origin();
    }
    Point3::from(sum / count as f64)
}
