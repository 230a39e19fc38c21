//! Edge index arithmetic.
//!
//! Purpose
//! - Every half-edge has a stable, non-negative integer index; the pair
//!   `(base, dual)` differs only in the least-significant bit. Keeping that
//!   arithmetic in one place means the rest of the crate never hand-rolls an
//!   XOR on a raw `u32`.

use crate::vertex::SiteId;

/// Index of one directed half-edge. `EdgeId(2k)` and `EdgeId(2k+1)` are the
/// two sides of the same undirected edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(pub u32);

impl EdgeId {
    #[inline]
    pub fn dual(self) -> EdgeId {
        EdgeId(self.0 ^ 1)
    }

    #[inline]
    pub fn is_base(self) -> bool {
        self.0 & 1 == 0
    }

    #[inline]
    pub fn base(self) -> EdgeId {
        EdgeId(self.0 & !1)
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A directed half-edge's mutable state: its origin site (`None` for the
/// null vertex, i.e. a ghost edge) and the next half-edge around the same
/// face (`forward`, a.k.a. `Lnext`). The previous-in-face edge
/// (`reverse`) is never stored: for any edge of a triangular face,
/// `reverse(e) == forward(forward(e))`.
#[derive(Clone, Copy, Debug)]
pub(crate) struct HalfEdgeSlot {
    pub origin: Option<SiteId>,
    pub forward: EdgeId,
}

impl HalfEdgeSlot {
    pub(crate) const EMPTY: HalfEdgeSlot = HalfEdgeSlot {
        origin: None,
        forward: EdgeId(0),
    };
}
