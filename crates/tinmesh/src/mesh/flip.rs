//! Diagonal edge flip: replace a shared edge between two triangles with
//! the other diagonal of their union quadrilateral.
//!
//! Purpose
//! - Constraint installation forces a segment into the triangulation by
//!   repeatedly flipping away the edges it crosses; this is the single
//!   primitive that operation is built from.

use super::Mesh;
use crate::edgepool::EdgeId;

impl Mesh {
    /// Flips `e` in place: the undirected edge `e`/`dual(e)` is repurposed
    /// to connect the two triangles' apexes instead of their shared
    /// endpoints. Returns the (same) edge id, now oriented apex-to-apex.
    pub(crate) fn flip_edge(&mut self, e: EdgeId) -> EdgeId {
        let d = self.pool().dual(e);
        let f = self.pool().forward(e);
        let r = self.pool().reverse(e);
        let fd = self.pool().forward(d);
        let rd = self.pool().reverse(d);
        let c = self.pool().origin(r);
        let a = self.pool().origin(rd);

        self.pool_mut().set_origin(e, c);
        self.pool_mut().set_origin(d, a);

        self.pool_mut().set_forward(fd, d);
        self.pool_mut().set_forward(d, r);
        self.pool_mut().set_forward(r, fd);

        self.pool_mut().set_forward(f, e);
        self.pool_mut().set_forward(e, rd);
        self.pool_mut().set_forward(rd, f);

        self.set_search_edge(e);
        e
    }
}
