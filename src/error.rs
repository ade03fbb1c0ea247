//! Error types for volmesh-convert.
//!
//! Every failure is fatal for the conversion that hit it: there is no
//! per-cell recovery, so callers either get a complete mesh or an error.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`MeshError`].
pub type Result<T> = std::result::Result<T, MeshError>;

/// Errors that can occur while building, converting, reading or writing meshes.
#[derive(Error, Debug)]
pub enum MeshError {
    /// The mesh has no cells.
    #[error("mesh has no cells (not a volume mesh)")]
    EmptyMesh,

    /// A cell references an invalid vertex index.
    #[error("cell {cell} references invalid vertex index {vertex}")]
    InvalidVertexIndex {
        /// The cell index.
        cell: usize,
        /// The invalid vertex index.
        vertex: usize,
    },

    /// A cell repeats a vertex or has zero volume.
    #[error("cell {cell} is degenerate")]
    DegenerateCell {
        /// The cell index.
        cell: usize,
    },

    /// A cell has negative signed volume.
    #[error("cell {cell} is inverted (signed volume {volume})")]
    InvertedCell {
        /// The cell index.
        cell: usize,
        /// The signed volume that was measured.
        volume: f64,
    },

    /// A cell on the hexahedral path is not a hexahedron.
    #[error("cell {cell} is not a hexahedron: {reason}")]
    NotHexahedral {
        /// The cell index.
        cell: usize,
        /// What made the cell unusable.
        reason: String,
    },

    /// A cell on the tetrahedral path is not a tetrahedron.
    #[error("cell {cell} is not a tetrahedron ({vertices} vertices)")]
    NotTetrahedral {
        /// The cell index.
        cell: usize,
        /// Number of vertices the cell has.
        vertices: usize,
    },

    /// Two cells use the same half-face of a shared face.
    #[error("face {face} is used with the same orientation by cells {} and {}", cells[0], cells[1])]
    InconsistentWinding {
        /// The shared face index.
        face: usize,
        /// The two cells that claimed the same half-face.
        cells: [usize; 2],
    },

    /// A face is incident to more than two cells.
    #[error("face {face} is shared by more than two cells")]
    NonManifoldFace {
        /// The face index.
        face: usize,
    },

    /// Broken half-edge or half-face connectivity.
    #[error("invalid topology: {0}")]
    InvalidTopology(String),

    /// A vertex coordinate is NaN or infinite.
    #[error("vertex {vertex} has a non-finite coordinate")]
    NonFiniteCoordinate {
        /// The vertex index.
        vertex: usize,
    },

    /// The mesh outgrew its index type.
    #[error("too many {kind} for the mesh index type (limit {limit})")]
    TooManyElements {
        /// Element kind that overflowed.
        kind: &'static str,
        /// Largest number of elements of this kind that fits.
        limit: usize,
    },

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error loading mesh from file.
    #[error("failed to load mesh from {path}: {message}")]
    LoadError {
        /// The file path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Error saving mesh to file.
    #[error("failed to save mesh to {path}: {message}")]
    SaveError {
        /// The file path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Unsupported file format.
    #[error("unsupported file format: {extension}")]
    UnsupportedFormat {
        /// The file extension.
        extension: String,
    },
}

impl MeshError {
    /// Create a hexahedral structure error.
    pub fn not_hex<S: Into<String>>(cell: usize, reason: S) -> Self {
        MeshError::NotHexahedral {
            cell,
            reason: reason.into(),
        }
    }
}
