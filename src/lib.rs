//! # volmesh-convert
//!
//! Conversion between half-face volumetric meshes and flat indexed cell meshes.
//!
//! A [`PolyhedralMesh`](mesh::PolyhedralMesh) stores vertices, edges, faces and
//! cells the way OpenVolumeMesh does: every face has two oriented half-faces
//! and every cell lists the half-faces that point out of it. A
//! [`FlatMesh`](mesh::FlatMesh) is what solid-mesh formats such as MEDIT
//! store: a vertex array and one row of vertex indices per cell.
//!
//! ## Features
//!
//! - **Forward conversion**: hexahedra are read off their half-faces and
//!   reordered into the geogram or MEDIT corner convention
//! - **Reverse conversion**: tetrahedra and hexahedra get shared faces and
//!   outward half-faces, chosen by matching each cell's facet winding
//! - **Orientation checks**: inverted cells are rejected or mirrored using
//!   their signed volume
//! - **File formats**: OVM ASCII and MEDIT `.mesh`
//!
//! ## Quick Start
//!
//! ```no_run
//! use volmesh_convert::convert::{convert_file, ConvertOptions};
//!
//! convert_file("model.ovm", "model.mesh", &ConvertOptions::default()).unwrap();
//! ```
//!
//! ## In-Memory Conversion
//!
//! ```
//! use volmesh_convert::prelude::*;
//! use nalgebra::Point3;
//!
//! let mut flat = FlatMesh::new(HexConvention::Medit);
//! flat.vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//!     Point3::new(0.0, 0.0, 1.0),
//!     Point3::new(1.0, 1.0, 1.0),
//! ];
//! flat.tetrahedra = vec![[0, 1, 2, 3], [4, 1, 3, 2]];
//!
//! let options = ConvertOptions::default();
//! let mesh: PolyhedralMesh = flat_to_polyhedral(&flat, &options).unwrap();
//! assert_eq!(mesh.num_faces(), 7);
//!
//! let back = polyhedral_to_flat(&mesh, &options).unwrap();
//! assert_eq!(back.tetrahedra.len(), 2);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod convert;
pub mod error;
pub mod io;
pub mod mesh;

/// Prelude module for convenient imports.
///
/// This module re-exports the most commonly used types and functions:
///
/// ```
/// use volmesh_convert::prelude::*;
/// ```
pub mod prelude {
    pub use crate::convert::{
        convert_file, flat_to_polyhedral, polyhedral_to_flat, ConvertOptions, OrientationCheck,
    };
    pub use crate::error::{MeshError, Result};
    pub use crate::mesh::{
        CellId, CellKind, FaceId, FlatMesh, HalfFaceId, HexConvention, MeshIndex,
        PolyhedralBuilder, PolyhedralMesh, VertexId,
    };
}

// Re-export nalgebra types for convenience
pub use nalgebra;
