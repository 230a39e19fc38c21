//! Devillers-style vertex removal: cavitate the star around a vertex, then
//! retriangulate the resulting polygon with a scored ear queue.
//!
//! Purpose
//! - Removing a vertex by re-running bootstrap+insertion on every other
//!   vertex would be correct but O(n). Instead, only the hole left behind
//!   (the union of triangles incident to the removed vertex) needs
//!   retriangulating, which is local work proportional to the removed
//!   vertex's degree.

use super::Mesh;
use crate::edgepool::EdgeId;
use crate::vertex::{Site, SiteId, VertexId};
use nalgebra::Point2;

impl Mesh {
    pub(super) fn remove_vertex_impl(&mut self, id: VertexId) -> bool {
        let Some(site) = self.site_of(id) else {
            return false;
        };
        let group_len = match self.site(site) {
            Site::Group(g) => Some(g.len()),
            Site::Vertex(_) => None,
            Site::Free { .. } => return false,
        };
        if let Some(len) = group_len {
            if len > 1 {
                // Several vertices still share this site: shrinking the
                // group is an O(1) arena mutation, no retriangulation
                // needed (see `Site`'s doc comment for why the indexed
                // model makes this cheap).
                if let Site::Group(g) = self.site_mut(site) {
                    g.remove(id);
                }
                self.vertex_index.remove(&id);
                let collapse_to_single = matches!(self.site(site), Site::Group(g) if g.len() == 1);
                if collapse_to_single {
                    if let Site::Group(g) = self.site(site) {
                        let remaining = g.members[0];
                        *self.site_mut(site) = Site::Vertex(remaining);
                    }
                    self.reindex_site(site);
                }
                return true;
            }
        }
        self.remove_site_cavity(site)
    }

    fn remove_site_cavity(&mut self, site: SiteId) -> bool {
        let Some(e0) = self.find_any_edge_from(site) else {
            return false;
        };
        let removed_point = self.site(site).point().expect("cavity site has a real point");

        let mut spoke = e0;
        let mut spokes = Vec::new();
        let mut ring_edges = Vec::new();
        let mut ring_vertices = Vec::new();
        loop {
            spokes.push(spoke);
            let far = self.pool().forward(spoke);
            ring_edges.push(far);
            ring_vertices.push(self.pool().origin(far));
            spoke = self.pool().pinwheel_next(spoke);
            if spoke == e0 {
                break;
            }
        }

        for s in spokes {
            self.free_edge(s);
        }
        self.free_site(site);

        if ring_vertices.len() < 3 {
            return true;
        }
        self.retriangulate_hole(ring_vertices, ring_edges, removed_point);
        true
    }

    /// Repeatedly closes the best-scoring ear (preferring ears touching the
    /// null vertex, then the ear whose in-circle value against the removed
    /// vertex is most negative) until three vertices remain, then links the
    /// final triangle directly from the surviving ring edges.
    fn retriangulate_hole(&mut self, mut ring_vertices: Vec<Option<SiteId>>, mut ring_edges: Vec<EdgeId>, removed_point: Point2<f64>) {
        while ring_vertices.len() > 3 {
            let k = ring_vertices.len();
            let mut best_i = 0usize;
            let mut best_score = f64::INFINITY;
            for i in 0..k {
                let prev = ring_vertices[(i + k - 1) % k];
                let cur = ring_vertices[i];
                let next = ring_vertices[(i + 1) % k];
                let score = self.ear_score(prev, cur, next, removed_point);
                if score < best_score {
                    best_score = score;
                    best_i = i;
                }
            }
            self.close_ear(&mut ring_vertices, &mut ring_edges, best_i);
        }
        self.link_final_triangle(&ring_edges);
    }

    /// Lower is better. Ears touching the null vertex always win (closing
    /// them just shrinks the hull by one position); otherwise the ear
    /// scores by `inCircle(prior, this, next, v)` where `v` is the removed
    /// vertex's point (spec §4.3): a more negative value means `v` sits
    /// further outside the candidate triangle's circumcircle, i.e. closing
    /// this ear first is least likely to need a later flip.
    fn ear_score(&mut self, prev: Option<SiteId>, cur: Option<SiteId>, next: Option<SiteId>, removed_point: Point2<f64>) -> f64 {
        let (Some(ps), Some(cs), Some(ns)) = (prev, cur, next) else {
            return f64::NEG_INFINITY;
        };
        let pp = self.site(ps).point().expect("ring vertex has a real site");
        let pc = self.site(cs).point().expect("ring vertex has a real site");
        let pn = self.site(ns).point().expect("ring vertex has a real site");
        self.in_circle(pp, pc, pn, removed_point)
    }

    fn close_ear(&mut self, ring_vertices: &mut Vec<Option<SiteId>>, ring_edges: &mut Vec<EdgeId>, i: usize) {
        let k = ring_vertices.len();
        let prev_i = (i + k - 1) % k;
        let next_i = (i + 1) % k;
        let prev_site = ring_vertices[prev_i];
        let next_site = ring_vertices[next_i];
        let e_prev_cur = ring_edges[prev_i];
        let e_cur_next = ring_edges[i];

        // base: next -> prev, dual: prev -> next.
        let new_edge = self.allocate_edge(next_site, prev_site);
        self.pool_mut().set_forward(e_prev_cur, e_cur_next);
        self.pool_mut().set_forward(e_cur_next, new_edge);
        self.pool_mut().set_forward(new_edge, e_prev_cur);

        ring_edges[prev_i] = new_edge.dual();
        ring_vertices.remove(i);
        ring_edges.remove(i);
    }

    fn link_final_triangle(&mut self, ring_edges: &[EdgeId]) {
        debug_assert_eq!(ring_edges.len(), 3);
        self.pool_mut().set_forward(ring_edges[0], ring_edges[1]);
        self.pool_mut().set_forward(ring_edges[1], ring_edges[2]);
        self.pool_mut().set_forward(ring_edges[2], ring_edges[0]);
        self.set_search_edge(ring_edges[0]);
    }
}
