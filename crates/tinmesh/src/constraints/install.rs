//! `add_constraints`: inject constraint vertices, force each constraint
//! edge into the triangulation, then label the regions the polygons cut
//! out.

use super::region;
use super::types::{Constraint, ConstraintDef, ConstraintKind};
use crate::error::MeshError;
use crate::mesh::Mesh;
use crate::monitor::{poll_interval, Monitor, NullMonitor};
use crate::vertex::VertexId;

/// Installs every constraint in `defs`, in order. A mesh only accepts one
/// round of constraints: the convergence arguments `force_edge_between`
/// relies on assume the constrained-edge set only grows monotonically
/// within a single call.
///
/// When `restore_conformity` is set, every constraint segment that fails
/// the local in-circle test against its own neighbouring triangles is
/// recursively midpoint-split after installation until no such violation
/// remains along the constraint (see [`super::densify::restore_conformity`]).
///
/// `monitor` is polled at the cadence described by [`poll_interval`] across
/// the constraint list; installation stops early (leaving the mesh with
/// whichever prefix of constraints already succeeded) if it reports
/// cancellation. Pass [`NullMonitor`] when no cancellation/progress hook is
/// needed.
pub fn add_constraints(mesh: &mut Mesh, defs: Vec<ConstraintDef>, restore_conformity: bool, monitor: &dyn Monitor) -> Result<(), MeshError> {
    if mesh.constraints_installed() {
        return Err(MeshError::ConstraintAlreadyInstalled);
    }
    if !mesh.is_bootstrapped() {
        let total_points: usize = defs.iter().map(|d| d.points.len()).sum();
        if total_points < 3 {
            return Err(MeshError::InsufficientConstraintGeometry { needed: 3, found: total_points });
        }
    }

    let total = defs.len();
    let interval = poll_interval(total);
    let mut installed = Vec::with_capacity(total);
    let mut cancelled = false;
    for (i, def) in defs.into_iter().enumerate() {
        if i % interval == 0 {
            if monitor.is_cancelled() {
                cancelled = true;
                break;
            }
            monitor.report_progress(i, total);
        }
        installed.push(install_one(mesh, i as u32, def)?);
    }
    monitor.report_progress(installed.len(), total);

    mesh.constraints_mut().extend(installed);
    if cancelled {
        // Constraints already forced in stay forced (undoing a flip chain
        // mid-installation is not supported), but the gate stays open so a
        // caller can retry with the remaining defs.
        return Ok(());
    }
    mesh.set_constraints_installed(true);
    region::assign_regions(mesh);

    if restore_conformity {
        super::densify::restore_conformity(mesh);
    }
    Ok(())
}

/// Convenience wrapper for callers that have no cancellation/progress needs.
pub fn add_constraints_uncancellable(mesh: &mut Mesh, defs: Vec<ConstraintDef>, restore_conformity: bool) -> Result<(), MeshError> {
    add_constraints(mesh, defs, restore_conformity, &NullMonitor)
}

fn install_one(mesh: &mut Mesh, index: u32, def: ConstraintDef) -> Result<Constraint, MeshError> {
    let min_needed = match def.kind {
        ConstraintKind::Linear => 2,
        ConstraintKind::Polygon => 3,
    };
    if def.points.len() < min_needed {
        return Err(MeshError::InsufficientConstraintGeometry { needed: min_needed, found: def.points.len() });
    }
    if matches!(def.kind, ConstraintKind::Polygon) && self_intersects(&def.points) {
        return Err(MeshError::InvalidConstraintGeometry {
            reason: "polygon constraint boundary crosses itself".into(),
        });
    }

    let mut vertices: Vec<VertexId> = Vec::with_capacity(def.points.len());
    for &(x, y, z) in &def.points {
        let id = mesh.add_vertex(x, y, z);
        mesh.mark_vertex_constraint_member(id);
        vertices.push(id);
    }

    let constraint = Constraint { index, kind: def.kind, vertices, region_id: None };
    for (va, vb) in constraint.edges() {
        force_one_edge(mesh, va, vb, index)?;
    }
    Ok(constraint)
}

fn force_one_edge(mesh: &mut Mesh, a: VertexId, b: VertexId, constraint_index: u32) -> Result<(), MeshError> {
    let (Some(sa), Some(sb)) = (mesh.site_of(a), mesh.site_of(b)) else {
        return Err(MeshError::InvalidConstraintGeometry {
            reason: "constraint vertex not present in the mesh".into(),
        });
    };
    if sa == sb {
        // Two constraint points merged into the same site (within vertex
        // tolerance): the edge between them is degenerate, not crossable.
        return Err(MeshError::InvalidConstraintGeometry {
            reason: "constraint edge collapsed to a single point".into(),
        });
    }
    let edge = mesh.force_edge_between(sa, sb, constraint_index)?;
    mesh.mark_edge_constrained(edge, constraint_index);
    Ok(())
}

fn self_intersects(points: &[(f64, f64, f64)]) -> bool {
    let n = points.len();
    for i in 0..n {
        let a1 = (points[i].0, points[i].1);
        let a2 = (points[(i + 1) % n].0, points[(i + 1) % n].1);
        for j in (i + 1)..n {
            if j == i || (j + 1) % n == i {
                continue;
            }
            let b1 = (points[j].0, points[j].1);
            let b2 = (points[(j + 1) % n].0, points[(j + 1) % n].1);
            if segments_cross(a1, a2, b1, b2) {
                return true;
            }
        }
    }
    false
}

fn segments_cross(p1: (f64, f64), p2: (f64, f64), p3: (f64, f64), p4: (f64, f64)) -> bool {
    fn cross(o: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
        (a.0 - o.0) * (b.1 - o.1) - (a.1 - o.1) * (b.0 - o.0)
    }
    let d1 = cross(p3, p4, p1);
    let d2 = cross(p3, p4, p2);
    let d3 = cross(p1, p2, p3);
    let d4 = cross(p1, p2, p4);
    (d1 > 0.0) != (d2 > 0.0) && (d3 > 0.0) != (d4 > 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MeshConfig;
    use crate::mesh::Mesh;
    use crate::monitor::Monitor;
    use crate::query;

    #[test]
    fn detects_self_intersecting_quad() {
        // A bowtie: edges (0,1) and (2,3) cross.
        let pts = [(0.0, 0.0, 0.0), (1.0, 1.0, 0.0), (1.0, 0.0, 0.0), (0.0, 1.0, 0.0)];
        assert!(self_intersects(&pts));
    }

    #[test]
    fn accepts_simple_quad() {
        let pts = [(0.0, 0.0, 0.0), (1.0, 0.0, 0.0), (1.0, 1.0, 0.0), (0.0, 1.0, 0.0)];
        assert!(!self_intersects(&pts));
    }

    fn grid_mesh() -> Mesh {
        let mut mesh = Mesh::new(MeshConfig::default());
        for x in 0..5 {
            for y in 0..5 {
                mesh.add_vertex(x as f64, y as f64, 0.0);
            }
        }
        mesh
    }

    /// Scenario 5: a square polygon constraint over a 5x5 grid must flood-mark
    /// every interior edge with its constraint index, and `is_point_inside`
    /// must agree with the boundary.
    #[test]
    fn polygon_constraint_marks_interior_region() {
        let mut mesh = grid_mesh();
        let def = ConstraintDef::polygon(vec![(1.0, 1.0, 0.0), (3.0, 1.0, 0.0), (3.0, 3.0, 0.0), (1.0, 3.0, 0.0)]);
        add_constraints_uncancellable(&mut mesh, vec![def], false).unwrap();

        let constraint = &mesh.constraints()[0];
        assert_eq!(constraint.region_id, Some(0));

        let marked = query::edges(&mesh).filter(|&e| query::region_constraint(&mesh, e) == Some(0)).count();
        assert!(marked > 0, "flood-fill must mark at least the boundary edges");

        assert!(is_point_inside_constraint(&mesh, constraint, nalgebra::Point2::new(2.0, 2.0)));
        assert!(!is_point_inside_constraint(&mesh, constraint, nalgebra::Point2::new(0.5, 0.5)));
    }

    /// A clockwise polygon is a hole: its boundary is still forced in, but it
    /// gets no region id and no interior flood-fill.
    #[test]
    fn clockwise_polygon_gets_no_region_marking() {
        let mut mesh = grid_mesh();
        let def = ConstraintDef::polygon(vec![(1.0, 1.0, 0.0), (1.0, 3.0, 0.0), (3.0, 3.0, 0.0), (3.0, 1.0, 0.0)]);
        add_constraints_uncancellable(&mut mesh, vec![def], false).unwrap();

        assert_eq!(mesh.constraints()[0].region_id, None);
        assert_eq!(query::edges(&mesh).filter(|&e| query::region_constraint(&mesh, e).is_some()).count(), 0);
    }

    #[test]
    fn forced_edges_report_their_constraint_index_via_linear_constraint() {
        let mut mesh = grid_mesh();
        let def = ConstraintDef::linear(vec![(0.0, 0.0, 0.0), (4.0, 4.0, 0.0)]);
        add_constraints_uncancellable(&mut mesh, vec![def], false).unwrap();

        let marked = query::edges(&mesh).filter(|&e| query::linear_constraint(&mesh, e) == Some(0)).count();
        assert!(marked > 0);
    }

    struct CancelAfterFirst;
    impl Monitor for CancelAfterFirst {
        fn is_cancelled(&self) -> bool {
            true
        }
    }

    #[test]
    fn cancellation_stops_before_installing_further_constraints() {
        let mut mesh = grid_mesh();
        let defs = vec![
            ConstraintDef::linear(vec![(0.0, 0.0, 0.0), (1.0, 1.0, 0.0)]),
            ConstraintDef::linear(vec![(0.0, 4.0, 0.0), (4.0, 0.0, 0.0)]),
        ];
        add_constraints(&mut mesh, defs, false, &CancelAfterFirst).unwrap();
        assert!(!mesh.constraints_installed());
    }

    #[test]
    fn second_call_to_add_constraints_is_rejected() {
        let mut mesh = grid_mesh();
        let first = vec![ConstraintDef::linear(vec![(0.0, 0.0, 0.0), (1.0, 1.0, 0.0)])];
        add_constraints_uncancellable(&mut mesh, first, false).unwrap();

        let second = vec![ConstraintDef::linear(vec![(0.0, 4.0, 0.0), (4.0, 0.0, 0.0)])];
        let err = add_constraints_uncancellable(&mut mesh, second, false).unwrap_err();
        assert_eq!(err, crate::error::MeshError::ConstraintAlreadyInstalled);
    }

    #[test]
    fn single_point_linear_constraint_is_rejected() {
        let mut mesh = grid_mesh();
        let defs = vec![ConstraintDef::linear(vec![(1.0, 1.0, 0.0)])];
        let err = add_constraints_uncancellable(&mut mesh, defs, false).unwrap_err();
        assert_eq!(err, crate::error::MeshError::InsufficientConstraintGeometry { needed: 2, found: 1 });
    }

    #[test]
    fn two_point_polygon_constraint_is_rejected() {
        let mut mesh = grid_mesh();
        let defs = vec![ConstraintDef::polygon(vec![(1.0, 1.0, 0.0), (3.0, 3.0, 0.0)])];
        let err = add_constraints_uncancellable(&mut mesh, defs, false).unwrap_err();
        assert_eq!(err, crate::error::MeshError::InsufficientConstraintGeometry { needed: 3, found: 2 });
    }

    #[test]
    fn constraint_point_coincident_with_another_vertex_collapses_edge() {
        let mut mesh = grid_mesh();
        // (1,1) already exists as a grid vertex; pairing it with a point
        // within vertex tolerance merges the two into one site, so the
        // "edge" between them has zero length and must be rejected.
        let defs = vec![ConstraintDef::linear(vec![(1.0, 1.0, 0.0), (1.0 + 1e-12, 1.0 + 1e-12, 0.0)])];
        let err = add_constraints_uncancellable(&mut mesh, defs, false).unwrap_err();
        assert!(matches!(err, crate::error::MeshError::InvalidConstraintGeometry { .. }));
    }

    #[test]
    fn self_intersecting_polygon_def_is_rejected() {
        let mut mesh = grid_mesh();
        let defs = vec![ConstraintDef::polygon(vec![(0.0, 0.0, 0.0), (1.0, 1.0, 0.0), (1.0, 0.0, 0.0), (0.0, 1.0, 0.0)])];
        let err = add_constraints_uncancellable(&mut mesh, defs, false).unwrap_err();
        assert!(matches!(err, crate::error::MeshError::InvalidConstraintGeometry { .. }));
    }

    #[test]
    fn crossing_diagonal_constraint_is_rejected() {
        // A non-square rectangle's two diagonals always cross in its
        // interior; forcing one in first must block the other.
        let mut mesh = Mesh::new(MeshConfig::default());
        mesh.add_vertex(0.0, 0.0, 0.0);
        mesh.add_vertex(2.0, 0.0, 0.0);
        mesh.add_vertex(2.0, 1.0, 0.0);
        mesh.add_vertex(0.0, 1.0, 0.0);

        let first = vec![ConstraintDef::linear(vec![(0.0, 0.0, 0.0), (2.0, 1.0, 0.0)])];
        add_constraints_uncancellable(&mut mesh, first, false).unwrap();

        // A second `addConstraints` call is itself disallowed once
        // installed, so exercise the crossing check through the
        // lower-level per-edge forcing path directly instead.
        let a = mesh.site_of(crate::vertex::VertexId(2)).unwrap();
        let b = mesh.site_of(crate::vertex::VertexId(4)).unwrap();
        let err = mesh.force_edge_between(a, b, 1).unwrap_err();
        assert_eq!(err, crate::error::MeshError::CrossingConstraints { constraint_index: 1 });
    }

    #[test]
    fn unbootstrapped_mesh_with_too_few_constraint_points_is_rejected() {
        let mut mesh = Mesh::new(MeshConfig::default());
        let defs = vec![ConstraintDef::linear(vec![(0.0, 0.0, 0.0), (1.0, 1.0, 0.0)])];
        let err = add_constraints_uncancellable(&mut mesh, defs, false).unwrap_err();
        assert_eq!(err, crate::error::MeshError::InsufficientConstraintGeometry { needed: 3, found: 2 });
    }
}
