//! Bowyer/Watson insertion: locate, carve the conflicting cavity, and
//! star-connect the new vertex to the cavity's boundary.
//!
//! Purpose
//! - Treats the hull as a fan of ghost triangles around a single null
//!   vertex "at infinity" (see `bootstrap::link_initial_triangle`), which
//!   lets insertion be one uniform algorithm regardless of whether the new
//!   point lands inside the current hull or outside it: a conflicting
//!   ghost triangle is just a triangle whose `ghost_in_circle` test fails,
//!   exactly like an interior triangle's `in_circle` test failing. Hull
//!   expansion falls out of star-connect for free instead of needing its
//!   own case.

use super::Mesh;
use crate::edgepool::EdgeId;
use crate::vertex::{Site, SiteId, Vertex, VertexMergerGroup};
use std::collections::{HashMap, HashSet};

/// What happened to a vertex passed to [`Mesh::insert_vertex`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The vertex became its own new site.
    Inserted(SiteId),
    /// The vertex was folded into an existing site within vertex tolerance.
    Merged(SiteId),
}

impl Mesh {
    pub(crate) fn insert_vertex(&mut self, vertex: Vertex) -> InsertOutcome {
        let query = vertex.point();
        let start = self.locate(query);

        if let Some(existing) = self.find_coincident_site(start, query) {
            self.merge_into(existing, vertex);
            return InsertOutcome::Merged(existing);
        }

        let (bad_edges, boundary) = self.find_conflict_region(start, query);
        for &edge in &bad_edges {
            if bad_edges.contains(&edge.dual()) && edge.is_base() {
                self.free_edge(edge);
            }
        }

        let sv = self.alloc_site(Site::Vertex(vertex));
        self.star_connect(sv, &boundary);
        InsertOutcome::Inserted(sv)
    }

    /// If `query` coincides (within vertex tolerance) with one of the real
    /// corners of the triangle located by `start`, returns that corner's
    /// site.
    fn find_coincident_site(&self, start: EdgeId, query: nalgebra::Point2<f64>) -> Option<SiteId> {
        let tol_sq = self.thresholds().vertex_tolerance_sq;
        let candidates = [start, self.pool().forward(start), self.pool().reverse(start)];
        for d in candidates {
            if let Some(site) = self.pool().origin(d) {
                if let Some(p) = self.site(site).point() {
                    let dx = p.x - query.x;
                    let dy = p.y - query.y;
                    if dx * dx + dy * dy <= tol_sq {
                        return Some(site);
                    }
                }
            }
        }
        None
    }

    fn merge_into(&mut self, site: SiteId, vertex: Vertex) {
        let rule = self.merge_rule();
        match self.site_mut(site) {
            Site::Vertex(existing) => {
                let mut group = VertexMergerGroup::new(*existing, rule);
                group.push(vertex);
                *self.site_mut(site) = Site::Group(group);
            }
            Site::Group(group) => group.push(vertex),
            Site::Free { .. } => unreachable!("coincident site cannot be free"),
        }
        self.reindex_site(site);
    }

    /// Flood-fills outward from `start` collecting every triangle whose
    /// circumcircle (or, for a ghost triangle, hull-expansion half-plane)
    /// contains `query`. Returns the full set of directed edges bounding a
    /// bad triangle, plus the ordered ring of boundary edges (bad triangle
    /// on the left, good triangle or mesh edge on the right) that the new
    /// vertex will star-connect to.
    fn find_conflict_region(&mut self, start: EdgeId, query: nalgebra::Point2<f64>) -> (HashSet<EdgeId>, Vec<EdgeId>) {
        let mut bad: HashSet<EdgeId> = HashSet::new();
        let mut classified: HashSet<EdgeId> = HashSet::new();
        let mut queue = vec![start];
        self.mark_triangle_bad(start, &mut bad, &mut classified);

        while let Some(e) = queue.pop() {
            for d in [e, self.pool().forward(e), self.pool().reverse(e)] {
                let neighbor = self.pool().dual(d);
                if classified.contains(&neighbor) {
                    continue;
                }
                if self.triangle_conflicts(neighbor, query) {
                    self.mark_triangle_bad(neighbor, &mut bad, &mut classified);
                    queue.push(neighbor);
                } else {
                    classified.insert(neighbor);
                    classified.insert(self.pool().forward(neighbor));
                    classified.insert(self.pool().reverse(neighbor));
                }
            }
        }

        let boundary = self.order_boundary_ring(&bad);
        (bad, boundary)
    }

    fn mark_triangle_bad(&self, e: EdgeId, bad: &mut HashSet<EdgeId>, classified: &mut HashSet<EdgeId>) {
        let f = self.pool().forward(e);
        let r = self.pool().reverse(e);
        for d in [e, f, r] {
            bad.insert(d);
            classified.insert(d);
        }
    }

    fn triangle_conflicts(&mut self, e: EdgeId, query: nalgebra::Point2<f64>) -> bool {
        if self.is_ghost_triangle_left_of(e) {
            let hull_edge = self.hull_edge_of_ghost(e);
            let h0 = self.origin_point(hull_edge).expect("hull edge has a real origin");
            let h1 = self.origin_point(self.pool().forward(hull_edge)).expect("hull edge has a real destination");
            let t = *self.thresholds();
            let fast = crate::kernel::ghost_in_circle(h0, h1, query);
            if fast.abs() < t.half_plane {
                return crate::kernel::ghost_in_circle_extended(h0, h1, query) > 0.0;
            }
            fast > 0.0
        } else {
            let f = self.pool().forward(e);
            let r = self.pool().reverse(e);
            let a = self.origin_point(e).expect("interior triangle");
            let b = self.origin_point(f).expect("interior triangle");
            let c = self.origin_point(r).expect("interior triangle");
            self.in_circle(a, b, c, query) > 0.0
        }
    }

    /// Reconstructs the boundary ring in cyclic order by chaining edges on
    /// `origin(b_i) == origin(forward(b_{i-1}))`.
    fn order_boundary_ring(&self, bad: &HashSet<EdgeId>) -> Vec<EdgeId> {
        let boundary: Vec<EdgeId> = bad
            .iter()
            .copied()
            .filter(|&e| !bad.contains(&self.pool().dual(e)))
            .collect();
        if boundary.is_empty() {
            return boundary;
        }
        let mut by_origin: HashMap<Option<SiteId>, EdgeId> = HashMap::new();
        for &e in &boundary {
            by_origin.insert(self.pool().origin(e), e);
        }
        let mut ring = Vec::with_capacity(boundary.len());
        let mut current = boundary[0];
        for _ in 0..boundary.len() {
            ring.push(current);
            let dest = self.pool().origin(self.pool().forward(current));
            current = *by_origin
                .get(&dest)
                .expect("boundary ring must close: each vertex starts exactly one boundary edge");
        }
        ring
    }

    /// Connects `sv` to every vertex on the ordered boundary ring, forming
    /// one new triangle per boundary edge.
    fn star_connect(&mut self, sv: SiteId, boundary: &[EdgeId]) {
        let k = boundary.len();
        let mut radial = Vec::with_capacity(k);
        for &b in boundary {
            let p = self.pool().origin(b);
            radial.push(self.allocate_edge(Some(sv), p));
        }
        for i in 0..k {
            let next = (i + 1) % k;
            let inward = radial[i];
            let b = boundary[i];
            let outward_dual = radial[next].dual();
            self.pool_mut().set_forward(inward, b);
            self.pool_mut().set_forward(b, outward_dual);
            self.pool_mut().set_forward(outward_dual, inward);
        }
        if let Some(&b0) = boundary.first() {
            self.set_search_edge(b0);
        }
    }
}
