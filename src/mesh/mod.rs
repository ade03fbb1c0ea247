//! Core mesh data structures.
//!
//! This module provides the two volumetric mesh representations the crate
//! converts between.
//!
//! # Overview
//!
//! [`PolyhedralMesh`] is a half-face mesh in the OpenVolumeMesh model: vertices,
//! edges, faces with two oriented half-faces each, and cells that reference
//! their outward half-faces. It is stored as flat arenas linked by index.
//!
//! [`FlatMesh`] is the representation of solid-mesh file formats: a vertex
//! array plus fixed-arity cell rows (`[usize; 4]` tetrahedra, `[usize; 8]`
//! hexahedra).
//!
//! # Index Types
//!
//! Elements of a [`PolyhedralMesh`] are identified by type-safe index wrappers
//! ([`VertexId`], [`EdgeId`], [`HalfEdgeId`], [`FaceId`], [`HalfFaceId`],
//! [`CellId`]), generic over the underlying integer type ([`MeshIndex`]).
//!
//! # Construction
//!
//! Half-face meshes are built with [`PolyhedralBuilder`], which shares edges
//! and faces between cells and picks the half-face that matches each cell's
//! winding.

mod builder;
mod convention;
mod flat;
mod index;
mod polyhedral;

pub use builder::{match_cycle, PolyhedralBuilder};
pub use convention::{HexConvention, HEX_FACES, OVM_TO_GEOGRAM_HEX, OVM_TO_MEDIT_HEX, TET_FACES};
pub use flat::{FlatCell, FlatMesh};
pub use index::{CellId, EdgeId, FaceId, HalfEdgeId, HalfFaceId, MeshIndex, VertexId};
pub use polyhedral::{signed_volume, Cell, CellKind, Face, PolyhedralMesh};
