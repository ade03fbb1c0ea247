//! Index types for mesh elements.
//!
//! This module provides type-safe index wrappers for vertices, edges, faces and
//! cells, plus their oriented halves. Oriented ids are packed the way
//! OpenVolumeMesh packs them: half-edge `2e + o` and half-face `2f + o`, where
//! `o = 1` marks the reversed traversal.
//!
//! The indices are generic over the underlying integer type to support meshes of
//! different sizes (u16 for small meshes, u32 for typical meshes, u64 for massive meshes).

use std::fmt::{self, Debug};
use std::hash::Hash;

/// Trait for types that can be used as mesh indices.
///
/// This trait is implemented for `u16`, `u32`, and `u64`, allowing users to choose
/// the appropriate index size for their mesh.
pub trait MeshIndex: Copy + Clone + Eq + PartialEq + Ord + PartialOrd + Hash + Debug + Send + Sync + 'static {
    /// The maximum valid index value.
    const MAX: Self;

    /// A sentinel value representing an invalid/null index.
    const INVALID: Self;

    /// Convert from usize to this index type.
    ///
    /// # Panics
    /// Panics in debug builds if the value is too large for this index type.
    fn from_usize(v: usize) -> Self;

    /// Convert to usize.
    fn to_usize(self) -> usize;

    /// Check if this is a valid (non-sentinel) index.
    fn is_valid(self) -> bool {
        self != Self::INVALID
    }
}

impl MeshIndex for u16 {
    const MAX: Self = u16::MAX - 1;
    const INVALID: Self = u16::MAX;

    #[inline]
    fn from_usize(v: usize) -> Self {
        debug_assert!(v <= Self::MAX as usize, "index {} too large for u16", v);
        v as u16
    }

    #[inline]
    fn to_usize(self) -> usize {
        self as usize
    }
}

impl MeshIndex for u32 {
    const MAX: Self = u32::MAX - 1;
    const INVALID: Self = u32::MAX;

    #[inline]
    fn from_usize(v: usize) -> Self {
        debug_assert!(v <= Self::MAX as usize, "index {} too large for u32", v);
        v as u32
    }

    #[inline]
    fn to_usize(self) -> usize {
        self as usize
    }
}

impl MeshIndex for u64 {
    const MAX: Self = u64::MAX - 1;
    const INVALID: Self = u64::MAX;

    #[inline]
    fn from_usize(v: usize) -> Self {
        v as u64
    }

    #[inline]
    fn to_usize(self) -> usize {
        self as usize
    }
}

/// A type-safe vertex index.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct VertexId<I: MeshIndex = u32>(I);

/// A type-safe edge index (unoriented).
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct EdgeId<I: MeshIndex = u32>(I);

/// A type-safe half-edge index (an edge plus a direction bit).
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct HalfEdgeId<I: MeshIndex = u32>(I);

/// A type-safe face index (unoriented).
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct FaceId<I: MeshIndex = u32>(I);

/// A type-safe half-face index (a face plus an orientation bit).
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct HalfFaceId<I: MeshIndex = u32>(I);

/// A type-safe cell index.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct CellId<I: MeshIndex = u32>(I);

macro_rules! impl_index_type {
    ($name:ident, $display:literal) => {
        impl<I: MeshIndex> $name<I> {
            /// Create a new index from a raw value.
            #[inline]
            pub fn new(index: usize) -> Self {
                Self(I::from_usize(index))
            }

            /// Create an invalid/null index.
            #[inline]
            pub fn invalid() -> Self {
                Self(I::INVALID)
            }

            /// Get the raw index value.
            #[inline]
            pub fn index(self) -> usize {
                self.0.to_usize()
            }

            /// Check if this is a valid (non-null) index.
            #[inline]
            pub fn is_valid(self) -> bool {
                self.0.is_valid()
            }
        }

        impl<I: MeshIndex> Debug for $name<I> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.is_valid() {
                    write!(f, "{}({})", $display, self.index())
                } else {
                    write!(f, "{}(INVALID)", $display)
                }
            }
        }

        impl<I: MeshIndex> Default for $name<I> {
            fn default() -> Self {
                Self::invalid()
            }
        }

        impl<I: MeshIndex> From<usize> for $name<I> {
            fn from(v: usize) -> Self {
                Self::new(v)
            }
        }
    };
}

impl_index_type!(VertexId, "V");
impl_index_type!(EdgeId, "E");
impl_index_type!(HalfEdgeId, "HE");
impl_index_type!(FaceId, "F");
impl_index_type!(HalfFaceId, "HF");
impl_index_type!(CellId, "C");

/// Packs an unoriented id and an orientation bit into one oriented id, and back.
macro_rules! impl_oriented_pair {
    ($full:ident, $half:ident, $to_half:ident, $to_full:ident) => {
        impl<I: MeshIndex> $full<I> {
            /// The oriented half of this element. `flipped = false` is the
            /// stored orientation.
            #[inline]
            pub fn $to_half(self, flipped: bool) -> $half<I> {
                $half::new(2 * self.index() + flipped as usize)
            }
        }

        impl<I: MeshIndex> $half<I> {
            /// The unoriented element this half belongs to.
            #[inline]
            pub fn $to_full(self) -> $full<I> {
                $full::new(self.index() / 2)
            }

            /// Whether this half runs against the stored orientation.
            #[inline]
            pub fn is_flipped(self) -> bool {
                self.index() % 2 == 1
            }

            /// The other half of the same element.
            #[inline]
            pub fn opposite(self) -> Self {
                Self::new(self.index() ^ 1)
            }
        }
    };
}

impl_oriented_pair!(EdgeId, HalfEdgeId, halfedge, edge);
impl_oriented_pair!(FaceId, HalfFaceId, halfface, face);
