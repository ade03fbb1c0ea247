//! Local vertex numbering conventions.
//!
//! Volumetric cells are stored as small ordered vertex tuples, and every mesh
//! library numbers the corners of a hexahedron differently. The tables here
//! are the only place those numberings are written down; everything else goes
//! through [`HexConvention`].
//!
//! The native (OpenVolumeMesh) hexahedron, called convention A elsewhere in
//! this crate:
//!
//! ```text
//!       5-------6
//!      /|      /|
//!     / |     / |
//!    3-------2  |
//!    |  4----|--7
//!    | /     | /
//!    |/      |/
//!    0-------1
//! ```
//!
//! Vertex 0 is adjacent to 1, 3 and 4, and `(p1 - p0, p3 - p0, p4 - p0)` is a
//! right-handed frame for a positively oriented cell.

/// Faces of a convention-A hexahedron, each wound so that its normal points
/// out of a positively oriented cell.
///
/// The first face is the bottom quad seen from outside; reversing it gives the
/// `0, 1, 2, 3` cycle that cell traversal starts from.
pub const HEX_FACES: [[usize; 4]; 6] = [
    [0, 3, 2, 1],
    [4, 7, 6, 5],
    [0, 1, 7, 4],
    [3, 5, 6, 2],
    [0, 4, 5, 3],
    [1, 2, 6, 7],
];

/// Facets of a tetrahedron. Facet `i` omits local vertex `i`, and is wound so
/// that its normal points out of a cell with positive signed volume
/// `(p1 - p0) . ((p2 - p0) x (p3 - p0))`.
pub const TET_FACES: [[usize; 3]; 4] = [
    [1, 2, 3],
    [0, 3, 2],
    [0, 1, 3],
    [0, 2, 1],
];

/// Destination slot -> convention-A slot, geogram's in-memory hexahedron.
///
/// ```text
///        4-------6
///       /|      /|
///      / |     / |
///     0-------2  |
///     |  5----|--7
///     | /     | /
///     |/      |/
///     1-------3
/// ```
pub const OVM_TO_GEOGRAM_HEX: [usize; 8] = [3, 0, 2, 1, 5, 4, 6, 7];

/// Destination slot -> convention-A slot, MEDIT `.mesh` hexahedron.
pub const OVM_TO_MEDIT_HEX: [usize; 8] = [0, 3, 2, 1, 4, 5, 6, 7];

const IDENTITY_HEX: [usize; 8] = [0, 1, 2, 3, 4, 5, 6, 7];

const fn invert(p: [usize; 8]) -> [usize; 8] {
    let mut inv = [0; 8];
    let mut i = 0;
    while i < 8 {
        inv[p[i]] = i;
        i += 1;
    }
    inv
}

const GEOGRAM_TO_OVM_HEX: [usize; 8] = invert(OVM_TO_GEOGRAM_HEX);
const MEDIT_TO_OVM_HEX: [usize; 8] = invert(OVM_TO_MEDIT_HEX);

/// Corner numbering of a flat hexahedron row.
///
/// The two non-native conventions are not interchangeable: applying the wrong
/// one yields inverted or self-intersecting cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HexConvention {
    /// Convention A, identical to half-face traversal order.
    Ovm,
    /// Geogram solid-mesh order (`dest = src[3,0,2,1,5,4,6,7]`).
    Geogram,
    /// MEDIT order (`dest = src[0,3,2,1,4,5,6,7]`).
    #[default]
    Medit,
}

impl HexConvention {
    /// Destination slot -> convention-A slot.
    pub const fn permutation(self) -> [usize; 8] {
        match self {
            HexConvention::Ovm => IDENTITY_HEX,
            HexConvention::Geogram => OVM_TO_GEOGRAM_HEX,
            HexConvention::Medit => OVM_TO_MEDIT_HEX,
        }
    }

    /// Convention slot -> convention-A slot of the inverse mapping.
    pub const fn inverse(self) -> [usize; 8] {
        match self {
            HexConvention::Ovm => IDENTITY_HEX,
            HexConvention::Geogram => GEOGRAM_TO_OVM_HEX,
            HexConvention::Medit => MEDIT_TO_OVM_HEX,
        }
    }

    /// Reorder a convention-A row into this convention.
    #[inline]
    pub fn from_ovm<T: Copy>(self, v: &[T; 8]) -> [T; 8] {
        let p = self.permutation();
        std::array::from_fn(|slot| v[p[slot]])
    }

    /// Reorder a row in this convention back to convention A.
    #[inline]
    pub fn to_ovm<T: Copy>(self, v: &[T; 8]) -> [T; 8] {
        let p = self.inverse();
        std::array::from_fn(|slot| v[p[slot]])
    }

    /// Reorder a row in this convention into `target`.
    pub fn convert<T: Copy>(self, target: HexConvention, v: &[T; 8]) -> [T; 8] {
        if self == target {
            return *v;
        }
        target.from_ovm(&self.to_ovm(v))
    }
}
