//! Edge splitting: insert a new vertex at an edge's midpoint.
//!
//! Purpose
//! - Behaviour is identical to an ordinary insertion at the computed
//!   coordinate (same cavity-carve/star-connect machinery as
//!   [`super::insert`]); this module only computes the midpoint and chosen
//!   `z`, then defers to [`Mesh::insert_vertex`].

use super::Mesh;
use crate::edgepool::EdgeId;
use crate::vertex::VertexId;

impl Mesh {
    /// Inserts a new vertex at the midpoint of `edge`, with `z` linearly
    /// interpolated between its two endpoints. `restore_conformity` is
    /// accepted for API symmetry with [`crate::constraints::add_constraints`]
    /// but is currently a no-op here, same as in the source system this
    /// crate's contract is drawn from.
    pub fn split_edge(&mut self, edge: EdgeId, _restore_conformity: bool) -> Option<VertexId> {
        let a = self.pool().origin(edge)?;
        let b = self.pool().origin(self.pool().forward(edge))?;
        let (pa, za) = {
            let site = self.site(a);
            (site.point()?, self.resolved_z(a))
        };
        let (pb, zb) = {
            let site = self.site(b);
            (site.point()?, self.resolved_z(b))
        };
        let mx = (pa.x + pb.x) / 2.0;
        let my = (pa.y + pb.y) / 2.0;
        let mz = match (za.is_nan(), zb.is_nan()) {
            (false, false) => (za + zb) / 2.0,
            (false, true) => za,
            (true, false) => zb,
            (true, true) => f64::NAN,
        };
        let id = self.add_vertex(mx, my, mz);
        self.mark_vertex_synthetic(id);
        Some(id)
    }

    fn resolved_z(&self, site: crate::vertex::SiteId) -> f64 {
        use crate::vertex::Site;
        match self.site(site) {
            Site::Vertex(v) => v.z,
            Site::Group(g) => g.resolved_z(),
            Site::Free { .. } => f64::NAN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MeshConfig;

    #[test]
    fn splits_edge_at_midpoint_with_interpolated_z() {
        let mut mesh = Mesh::new(MeshConfig::default());
        mesh.add_vertex(0.0, 0.0, 0.0);
        mesh.add_vertex(10.0, 0.0, 10.0);
        mesh.add_vertex(0.0, 10.0, 0.0);
        let triangle = crate::query::triangles(&mesh).next().expect("bootstrapped triangle exists");
        let edge = triangle.edges[0];
        let before = mesh.statistics().vertex_count;
        let new_id = mesh.split_edge(edge, false);
        assert!(new_id.is_some());
        assert_eq!(mesh.statistics().vertex_count, before + 1);
        assert_eq!(mesh.statistics().synthetic_vertex_count, 1);
    }
}
