//! Incremental 2D constrained Delaunay triangulation core.
//!
//! `Mesh` is the single entry point: build it up with [`Mesh::add_vertex`]
//! / [`Mesh::add_vertices`], force in constraint edges with
//! [`constraints::add_constraints`], then read back triangles, the hull,
//! and nearest-feature queries through the [`query`] module. [`integrity`]
//! offers a whole-mesh self-check for callers that want to verify
//! invariants after a long batch of mutation.

pub mod bitset;
pub mod bounds;
pub mod config;
pub mod constraints;
pub mod edgepool;
pub mod error;
pub mod integrity;
pub mod kernel;
pub mod mesh;
pub mod monitor;
pub mod query;
pub mod rand_source;
pub mod stats;
pub mod vertex;

pub mod prelude {
    pub use crate::bounds::Aabb;
    pub use crate::config::MeshConfig;
    pub use crate::constraints::{
        add_constraints, add_constraints_uncancellable, densify_mesh_edges, densify_polyline, is_point_inside_constraint, triangles_inside, Constraint,
        ConstraintDef, ConstraintKind,
    };
    pub use crate::error::MeshError;
    pub use crate::integrity::{self, IntegrityReport};
    pub use crate::mesh::{BootstrapFailure, InsertOutcome, Mesh};
    pub use crate::monitor::{Monitor, NullMonitor};
    pub use crate::query;
    pub use crate::stats::MeshStatistics;
    pub use crate::vertex::{MergeRule, SiteId, VertexId};
}

/// End-to-end scenarios exercising the public API the way a caller would:
/// build a mesh, mutate it, and check the resulting topology/queries.
/// Per-module unit tests live next to the code they exercise; these cover
/// whole-mesh behaviour no single module owns.
#[cfg(test)]
mod scenario_tests {
    use crate::config::MeshConfig;
    use crate::constraints::{add_constraints_uncancellable, ConstraintDef};
    use crate::mesh::Mesh;
    use crate::query;
    use nalgebra::Point2;

    fn mesh(spacing: f64) -> Mesh {
        Mesh::new(MeshConfig::new(spacing))
    }

    #[test]
    fn unit_square_triangulates_with_two_triangles() {
        let mut m = mesh(1.0);
        m.add_vertex(0.0, 0.0, 0.0);
        m.add_vertex(1.0, 0.0, 0.0);
        m.add_vertex(1.0, 1.0, 0.0);
        m.add_vertex(0.0, 1.0, 0.0);

        assert!(m.is_bootstrapped());
        assert_eq!(query::triangles(&m).count(), 2);
        assert_eq!(query::perimeter(&m).len(), 4);
        let ghost_edges = m.pool().iter_base_edges().filter(|&e| m.pool().origin(e).is_none() || m.pool().origin(e.dual()).is_none()).count();
        assert_eq!(ghost_edges, 4);
        let b = m.bounds().unwrap();
        assert!((b.width() * b.height() - 1.0).abs() < 1e-9);

        let report = crate::integrity::check(&mut m);
        assert!(report.is_clean(), "{report:?}");
    }

    #[test]
    fn collinear_trio_then_offset_bootstraps() {
        let mut m = mesh(1.0);
        m.add_vertex(0.0, 0.0, 0.0);
        m.add_vertex(1.0, 0.0, 0.0);
        m.add_vertex(2.0, 0.0, 0.0);
        assert!(!m.is_bootstrapped());
        assert_eq!(query::triangles(&m).count(), 0);

        m.add_vertex(1.0, 1.0, 0.0);
        assert!(m.is_bootstrapped());
        assert_eq!(query::triangles(&m).count(), 2);
        let b = m.bounds().unwrap();
        assert!((b.width() * b.height() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn too_few_vertices_reports_not_bootstrapped() {
        let mut m = mesh(1.0);
        m.add_vertex(0.0, 0.0, 0.0);
        m.add_vertex(1.0, 0.0, 0.0);
        assert!(!m.is_bootstrapped());
        assert_eq!(query::triangles(&m).count(), 0);
        assert!(query::nearest_edge(&mut m, Point2::new(0.5, 0.5)).is_none());
        assert!(!query::is_inside_hull(&mut m, Point2::new(0.5, 0.5)));
    }

    #[test]
    fn square_with_center_flips_to_four_triangles_around_it() {
        let mut m = mesh(5.0);
        m.add_vertex(0.0, 0.0, 0.0);
        m.add_vertex(10.0, 0.0, 0.0);
        m.add_vertex(10.0, 10.0, 0.0);
        m.add_vertex(0.0, 10.0, 0.0);
        m.add_vertex(5.0, 5.0, 0.0);

        assert_eq!(query::triangles(&m).count(), 4);
        let report = crate::integrity::check(&mut m);
        assert!(report.is_clean(), "{report:?}");

        // The long diagonal (0,0)-(10,10) must have been flipped away: no
        // triangle should span it without the center vertex as its apex.
        for tri in query::triangles(&m) {
            let pts: Vec<_> = tri.edges.iter().filter_map(|&e| m.origin_point(e)).collect();
            let has_center = pts.iter().any(|p| (p.x - 5.0).abs() < 1e-9 && (p.y - 5.0).abs() < 1e-9);
            assert!(has_center, "every triangle of this configuration must touch the center vertex");
        }
    }

    #[test]
    fn near_coincident_vertices_merge_into_one_group() {
        let mut m = mesh(1.0);
        let a = m.add_vertex(0.0, 0.0, 0.0);
        let b = m.add_vertex(1e-12, 1e-12, 1.0);
        assert_ne!(a, b);
        // Two points alone (merged) are not enough to bootstrap: they
        // collapse to a single effective site.
        assert!(!m.is_bootstrapped());

        m.add_vertex(1.0, 0.0, 0.0);
        m.add_vertex(1.0, 1.0, 0.0);
        assert!(m.is_bootstrapped());

        let stats = m.statistics();
        assert_eq!(stats.merger_group_count, 1);
    }

    #[test]
    fn polygon_constraint_marks_interior_and_answers_point_queries() {
        let mut m = mesh(1.0);
        for gx in 0..5 {
            for gy in 0..5 {
                m.add_vertex(gx as f64, gy as f64, 0.0);
            }
        }
        assert!(m.is_bootstrapped());

        let poly = ConstraintDef::polygon(vec![(1.0, 1.0, 0.0), (3.0, 1.0, 0.0), (3.0, 3.0, 0.0), (1.0, 3.0, 0.0)]);
        add_constraints_uncancellable(&mut m, vec![poly], false).unwrap();

        let constraint = &m.constraints()[0];
        assert_eq!(constraint.region_id, Some(0));

        let marked = query::edges(&m).filter(|&e| query::region_constraint(&m, e) == Some(0)).count();
        assert!(marked > 0, "polygon interior edges must be marked with its region id");

        assert!(query::is_inside_hull(&mut m, Point2::new(2.0, 2.0)));
        assert!(crate::constraints::is_point_inside_constraint(&m, constraint, Point2::new(2.0, 2.0)));
        assert!(!crate::constraints::is_point_inside_constraint(&m, constraint, Point2::new(0.5, 0.5)));
    }

    #[test]
    fn removing_center_vertex_restores_two_triangle_square() {
        let mut m = mesh(5.0);
        m.add_vertex(0.0, 0.0, 0.0);
        m.add_vertex(10.0, 0.0, 0.0);
        m.add_vertex(10.0, 10.0, 0.0);
        m.add_vertex(0.0, 10.0, 0.0);
        let center = m.add_vertex(5.0, 5.0, 0.0);
        assert_eq!(query::triangles(&m).count(), 4);

        assert!(m.remove_vertex(center));
        assert_eq!(query::triangles(&m).count(), 2);

        let report = crate::integrity::check(&mut m);
        assert!(report.is_clean(), "{report:?}");
    }

    #[test]
    fn clear_then_reinsert_same_points_reproduces_triangle_count() {
        let mut m = mesh(1.0);
        let pts = [(0.0, 0.0, 0.0), (1.0, 0.0, 0.0), (1.0, 1.0, 0.0), (0.0, 1.0, 0.0)];
        for &(x, y, z) in pts.iter() {
            m.add_vertex(x, y, z);
        }
        let before = query::triangles(&m).count();

        m.clear();
        assert!(!m.is_bootstrapped());
        for &(x, y, z) in pts.iter() {
            m.add_vertex(x, y, z);
        }
        assert_eq!(query::triangles(&m).count(), before);
    }
}
