//! Forcing a constraint edge into the triangulation by flipping away
//! whatever edges it crosses.
//!
//! Purpose
//! - A constraint segment between two sites that are not yet mesh
//!   neighbors must be carved in without disturbing either endpoint: the
//!   standard technique is to find the chain of edges the segment crosses
//!   and flip each one, which always produces a valid diagonal because the
//!   two triangles sharing a crossed edge have vertices on opposite sides
//!   of the segment by construction.

use super::Mesh;
use crate::edgepool::EdgeId;
use crate::error::MeshError;
use crate::vertex::SiteId;
use nalgebra::Point2;

impl Mesh {
    /// Ensures an edge directly connects `a` and `b`, flipping crossing
    /// edges as needed. Fails if a crossing edge already belongs to a
    /// different installed constraint.
    pub(crate) fn force_edge_between(&mut self, a: SiteId, b: SiteId, constraint_index: u32) -> Result<EdgeId, MeshError> {
        if let Some(e) = self.find_edge_between(a, b) {
            return Ok(e);
        }
        let pa = self.site(a).point().expect("constraint endpoint has a real site");
        let pb = self.site(b).point().expect("constraint endpoint has a real site");

        let budget = self.pool().allocated_edge_count() + 64;
        for _ in 0..budget {
            if let Some(e) = self.find_edge_between(a, b) {
                return Ok(e);
            }
            let chain = self.crossing_chain(a, b, pa, pb);
            let Some(&first) = chain.first() else {
                return Err(MeshError::InvalidConstraintGeometry {
                    reason: "no triangulated path between constraint endpoints".into(),
                });
            };
            if self.is_edge_constrained(first) {
                return Err(MeshError::CrossingConstraints { constraint_index });
            }
            self.flip_edge(first);
        }
        Err(MeshError::InvalidConstraintGeometry {
            reason: "constraint edge insertion did not converge".into(),
        })
    }

    /// The ordered chain of edges segment `(pa, pb)` crosses, starting from
    /// the one edge in `a`'s fan it enters through.
    fn crossing_chain(&mut self, a: SiteId, b: SiteId, pa: Point2<f64>, pb: Point2<f64>) -> Vec<EdgeId> {
        let mut chain = Vec::new();
        let Some(first) = self.find_first_crossing(a, pa, pb) else {
            return chain;
        };
        chain.push(first);
        let mut current = first;
        let guard = self.pool().allocated_edge_count() + 16;
        for _ in 0..guard {
            let d = self.pool().dual(current);
            let apex = self.pool().origin(self.pool().forward(d));
            if apex == Some(b) {
                break;
            }
            let Some(apex_site) = apex else {
                // Reached the hull before reaching `b`: the constraint
                // segment runs outside the current triangulated region.
                break;
            };
            let p_apex = self.site(apex_site).point().expect("apex has a real site");
            let next = if self.orientation(pa, pb, p_apex) > 0.0 {
                self.pool().reverse(d)
            } else {
                self.pool().forward(d)
            };
            chain.push(next);
            current = next;
        }
        chain
    }

    /// The far edge of the first triangle in `a`'s fan whose two non-`a`
    /// corners straddle the line through `pa`/`pb`.
    fn find_first_crossing(&mut self, a: SiteId, pa: Point2<f64>, pb: Point2<f64>) -> Option<EdgeId> {
        let e0 = self.find_any_edge_from(a)?;
        let mut spoke = e0;
        loop {
            let far = self.pool().forward(spoke);
            let x = self.pool().origin(far);
            let y = self.pool().origin(self.pool().forward(far));
            if let (Some(xs), Some(ys)) = (x, y) {
                let px = self.site(xs).point().expect("fan corner has a real site");
                let py = self.site(ys).point().expect("fan corner has a real site");
                let sx = self.orientation(pa, pb, px);
                let sy = self.orientation(pa, pb, py);
                if (sx > 0.0 && sy < 0.0) || (sx < 0.0 && sy > 0.0) {
                    return Some(far);
                }
            }
            spoke = self.pool().pinwheel_next(spoke);
            if spoke == e0 {
                return None;
            }
        }
    }

    pub(crate) fn is_edge_constrained(&self, e: EdgeId) -> bool {
        self.constrained_edges.contains_key(&e.base().0)
    }

    pub(crate) fn mark_edge_constrained(&mut self, e: EdgeId, constraint_index: u32) {
        self.constrained_edges.insert(e.base().0, constraint_index);
    }

    /// The constraint index that forced `e` in as a linear-constraint or
    /// polygon-boundary segment, if any.
    pub(crate) fn linear_constraint_of(&self, e: EdgeId) -> Option<u32> {
        self.constrained_edges.get(&e.base().0).copied()
    }

    /// The polygon constraint index whose interior flood-fill covers `e`, if
    /// any. Distinct from [`Mesh::linear_constraint_of`]: a boundary edge is
    /// both constrained and region-marked, but an interior edge is only
    /// region-marked.
    pub(crate) fn region_constraint_of(&self, e: EdgeId) -> Option<u32> {
        self.region_edges.get(&e.base().0).copied()
    }

    pub(crate) fn mark_region_edge(&mut self, e: EdgeId, region_id: u32) {
        self.region_edges.insert(e.base().0, region_id);
    }
}
