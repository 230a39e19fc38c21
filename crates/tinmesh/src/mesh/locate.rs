//! Stochastic Lawson walk: find the triangle (or hull-boundary ghost edge)
//! containing a query point, starting from a cached search edge.
//!
//! Purpose
//! - Every insertion, removal, and nearest-feature query needs "which
//!   triangle is this point in". Walking from a recently-used edge instead
//!   of scanning every triangle keeps point location near O(sqrt(n)) for
//!   spatially coherent input, which is the common case (batches of nearby
//!   points, or points streamed in scan order).

use super::Mesh;
use crate::edgepool::EdgeId;
use nalgebra::Point2;

impl Mesh {
    /// Returns an edge `e` such that `query` lies in the (possibly ghost)
    /// triangle to the left of `e`, i.e. `orientation(origin(e),
    /// origin(forward(e)), query) >= 0` for every edge bounding that
    /// triangle (ghost triangles only constrain the one real hull edge).
    pub(crate) fn locate(&mut self, query: Point2<f64>) -> EdgeId {
        let mut e = self.search_edge().unwrap_or_else(|| self.pool().iter_base_edges().next().expect("mesh is bootstrapped"));
        // Cycle guard: a correctly linked mesh never needs more than a few
        // hops per doubling of triangle count; this bound exists only to
        // keep a pathological input from looping forever.
        let max_steps = 8 * (self.pool().allocated_edge_count() + 16);
        for _ in 0..max_steps {
            if self.is_ghost_triangle_left_of(e) {
                let hull_edge = self.hull_edge_of_ghost(e);
                let h0 = self.origin_point(hull_edge).expect("hull edge has a real origin");
                let h1 = self.origin_point(self.pool().forward(hull_edge)).expect("hull edge has a real destination");
                let o = self.orientation(h0, h1, query);
                if o <= self.thresholds().precision {
                    self.set_search_edge(hull_edge.dual());
                    return hull_edge.dual();
                }
                e = self.pool().dual(hull_edge);
                continue;
            }

            let edges = [e, self.pool().forward(e), self.pool().reverse(e)];
            let mut crossing: Option<EdgeId> = None;
            let mut second_crossing: Option<EdgeId> = None;
            for &d in &edges {
                let p0 = self.origin_point(d).expect("interior triangle has real vertices");
                let p1 = self.origin_point(self.pool().forward(d)).expect("interior triangle has real vertices");
                let o = self.orientation(p0, p1, query);
                if o < -self.thresholds().precision {
                    if crossing.is_none() {
                        crossing = Some(d);
                    } else {
                        second_crossing = Some(d);
                    }
                }
            }
            let Some(cross) = crossing else {
                self.set_search_edge(e);
                return e;
            };
            // Break ties between two candidate exits (common when the query
            // lies beyond a triangle's corner) with a biased coin flip
            // rather than always preferring the first, so adversarial
            // inputs cannot force a deterministic cycle.
            let chosen = match second_crossing {
                Some(other) if self.rng().biased_bool(0.5) => other,
                _ => cross,
            };
            e = self.pool().dual(chosen);
        }
        // Exhausted the step budget (only reachable on a malformed mesh or
        // truly pathological input): fall back to a linear scan.
        self.locate_by_scan(query)
    }

    fn locate_by_scan(&mut self, query: Point2<f64>) -> EdgeId {
        for edge in self.pool().iter_base_edges().collect::<Vec<_>>() {
            for &candidate in &[edge, edge.dual()] {
                if self.triangle_contains(candidate, query) {
                    self.set_search_edge(candidate);
                    return candidate;
                }
            }
        }
        self.search_edge().expect("mesh is bootstrapped")
    }

    fn triangle_contains(&mut self, e: EdgeId, query: Point2<f64>) -> bool {
        if self.is_ghost_triangle_left_of(e) {
            let hull_edge = self.hull_edge_of_ghost(e);
            let h0 = match self.origin_point(hull_edge) {
                Some(p) => p,
                None => return false,
            };
            let h1 = match self.origin_point(self.pool().forward(hull_edge)) {
                Some(p) => p,
                None => return false,
            };
            return self.orientation(h0, h1, query) <= self.thresholds().precision;
        }
        let edges = [e, self.pool().forward(e), self.pool().reverse(e)];
        edges.iter().all(|&d| {
            let p0 = self.origin_point(d).unwrap();
            let p1 = self.origin_point(self.pool().forward(d)).unwrap();
            self.orientation(p0, p1, query) >= -self.thresholds().precision
        })
    }

    /// A triangle is a ghost triangle iff at least one of its three corners
    /// is the null vertex.
    pub(crate) fn is_ghost_triangle_left_of(&self, e: EdgeId) -> bool {
        let f = self.pool().forward(e);
        self.pool().origin(e).is_none() || self.pool().origin(f).is_none() || self.pool().origin(self.pool().forward(f)).is_none()
    }

    /// For a ghost triangle, the one edge among `{e, forward(e), reverse(e)}`
    /// whose endpoints are both real (the hull edge it shadows).
    pub(crate) fn hull_edge_of_ghost(&self, e: EdgeId) -> EdgeId {
        let f = self.pool().forward(e);
        let r = self.pool().reverse(e);
        for d in [e, f, r] {
            let fd = self.pool().forward(d);
            if self.pool().origin(d).is_some() && self.pool().origin(fd).is_some() {
                return d;
            }
        }
        unreachable!("a ghost triangle has exactly one edge with two real endpoints")
    }

    pub(crate) fn orientation(&mut self, a: Point2<f64>, b: Point2<f64>, c: Point2<f64>) -> f64 {
        let t = *self.thresholds();
        crate::kernel::orientation(a, b, c, &t, &mut self.stats_mut().predicates)
    }

    pub(crate) fn in_circle(&mut self, a: Point2<f64>, b: Point2<f64>, c: Point2<f64>, d: Point2<f64>) -> f64 {
        let t = *self.thresholds();
        crate::kernel::in_circle(a, b, c, d, &t, &mut self.stats_mut().predicates)
    }
}
