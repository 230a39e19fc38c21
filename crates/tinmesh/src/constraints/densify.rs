//! Two distinct densification operations: a standalone polyline subdivision
//! (no mesh involved) and mesh-edge subdivision used to restore conformance
//! after constraint installation.

use crate::edgepool::EdgeId;
use crate::mesh::Mesh;
use crate::vertex::VertexId;
use nalgebra::{distance, Point2};

/// Standalone operation on a constraint polyline, independent of any mesh:
/// walks `points` and inserts equally spaced synthetic midpoints wherever
/// adjacent spacing exceeds `max_spacing`, so every output segment is
/// `<= max_spacing`. `z` is linearly interpolated along each inserted run.
/// `closed` treats the last point as wrapping back to the first (polygon
/// constraints); otherwise the list is an open polyline.
///
/// This is the "Densification" operation of the constraint engine: it never
/// touches a [`Mesh`], unlike [`densify_mesh_edges`], which restores
/// Delaunay conformance against a live triangulation's own edges.
pub fn densify_polyline(points: &[(f64, f64, f64)], max_spacing: f64, closed: bool) -> Vec<(f64, f64, f64)> {
    if points.len() < 2 || max_spacing <= 0.0 {
        return points.to_vec();
    }
    let n = points.len();
    let last = if closed { n } else { n - 1 };
    let mut out = Vec::with_capacity(points.len());
    for i in 0..last {
        let a = points[i];
        let b = points[(i + 1) % n];
        out.push(a);
        let dx = b.0 - a.0;
        let dy = b.1 - a.1;
        let len = (dx * dx + dy * dy).sqrt();
        if len > max_spacing {
            let segments = (len / max_spacing).ceil() as usize;
            for s in 1..segments {
                let t = s as f64 / segments as f64;
                out.push((a.0 + t * dx, a.1 + t * dy, a.2 + t * (b.2 - a.2)));
            }
        }
    }
    if !closed {
        out.push(points[n - 1]);
    }
    out
}

/// Splits mesh edges longer than `max_length` at their midpoint until every
/// live edge is within tolerance, inserting a synthetic vertex per split.
/// Returns the number of vertices inserted.
///
/// Only the single longest offending edge is found per pass rather than
/// batching every over-length edge at once, since splitting one edge can
/// shorten or lengthen its neighbors' effective role in the retriangulated
/// cavity; re-scanning after each split keeps the result exact rather than
/// approximate.
pub fn densify_mesh_edges(mesh: &mut Mesh, max_length: f64) -> usize {
    if !mesh.is_bootstrapped() || max_length <= 0.0 {
        return 0;
    }
    let mut inserted = 0usize;
    let budget = 64 * (mesh.statistics().edge_count + 16);
    for _ in 0..budget {
        let Some((a, b)) = longest_over_threshold(mesh, max_length) else {
            break;
        };
        let mx = (a.x + b.x) / 2.0;
        let my = (a.y + b.y) / 2.0;
        let id = mesh.add_vertex(mx, my, f64::NAN);
        mesh.mark_vertex_synthetic(id);
        inserted += 1;
    }
    inserted
}

/// Restores Delaunay conformance along every installed constraint (spec
/// §4.4 step 5): walks each constraint segment, and wherever it fails the
/// local in-circle test against its own two neighbouring triangles, splits
/// it at the midpoint (a synthetic vertex, `z` linearly interpolated) and
/// re-checks each half, recursing until no violation remains along the
/// constraint. Splitting re-uses [`Mesh::split_edge`]'s ordinary-insertion
/// machinery, so the surrounding cavity is re-triangulated for free; only
/// the two new half-edges need re-marking with the owning constraint's
/// index, since the new midpoint site breaks the old forced edge in two.
pub(super) fn restore_conformity(mesh: &mut Mesh) {
    let mut queue: Vec<(VertexId, VertexId, u32)> = mesh.constraints().iter().flat_map(|c| c.edges().map(move |(a, b)| (a, b, c.index))).collect();

    let budget = 64 * (mesh.statistics().edge_count + queue.len() + 16);
    let mut steps = 0usize;
    while let Some((a, b, constraint_index)) = queue.pop() {
        steps += 1;
        if steps > budget {
            break;
        }
        let (Some(sa), Some(sb)) = (mesh.site_of(a), mesh.site_of(b)) else { continue };
        let Some(edge) = mesh.find_edge_between(sa, sb) else { continue };
        if !edge_violates_delaunay(mesh, edge) {
            continue;
        }

        let Some(mid) = mesh.split_edge(edge, false) else { continue };
        mesh.mark_vertex_constraint_member(mid);
        let Some(site_mid) = mesh.site_of(mid) else { continue };
        if let Some(e1) = mesh.find_edge_between(sa, site_mid) {
            mesh.mark_edge_constrained(e1, constraint_index);
        }
        if let Some(e2) = mesh.find_edge_between(site_mid, sb) {
            mesh.mark_edge_constrained(e2, constraint_index);
        }
        queue.push((a, mid, constraint_index));
        queue.push((mid, b, constraint_index));
    }
}

/// Whether the (non-ghost) triangle pair sharing `edge` violates the
/// Delaunay inequality: the apex of one triangle lies inside the other's
/// circumcircle. Mirrors [`crate::integrity::check`]'s own per-edge check.
/// An edge on the hull boundary (either side a ghost triangle) is never a
/// violation — there is nothing to flip it against.
fn edge_violates_delaunay(mesh: &mut Mesh, edge: EdgeId) -> bool {
    let base = edge.base();
    if mesh.pool().is_ghost(base) {
        return false;
    }
    let dual = mesh.pool().dual(base);
    if mesh.is_ghost_triangle_left_of(base) || mesh.is_ghost_triangle_left_of(dual) {
        return false;
    }
    let a = mesh.origin_point(base).expect("non-ghost edge has a real origin");
    let b = mesh.origin_point(mesh.pool().forward(base)).expect("non-ghost edge has a real origin");
    let c = mesh.origin_point(mesh.pool().reverse(base)).expect("non-ghost edge has a real origin");
    let d = mesh.origin_point(mesh.pool().reverse(dual)).expect("non-ghost edge has a real origin");
    let threshold = mesh.thresholds().delaunay;
    mesh.in_circle(a, b, c, d) > threshold
}

fn longest_over_threshold(mesh: &Mesh, max_length: f64) -> Option<(Point2<f64>, Point2<f64>)> {
    let mut longest = max_length;
    let mut found = None;
    for base in mesh.pool().iter_base_edges() {
        if mesh.pool().is_ghost(base) {
            continue;
        }
        let (Some(a), Some(b)) = (mesh.origin_point(base), mesh.origin_point(mesh.pool().forward(base))) else {
            continue;
        };
        let len = distance(&a, &b);
        if len > longest {
            longest = len;
            found = Some((a, b));
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MeshConfig;

    #[test]
    fn splits_until_no_edge_exceeds_threshold() {
        let mut mesh = Mesh::new(MeshConfig::default());
        mesh.add_vertex(0.0, 0.0, 0.0);
        mesh.add_vertex(20.0, 0.0, 0.0);
        mesh.add_vertex(0.0, 20.0, 0.0);
        let inserted = densify_mesh_edges(&mut mesh, 5.0);
        assert!(inserted > 0);
        assert!(longest_over_threshold(&mesh, 5.0).is_none());
    }

    #[test]
    fn no_op_before_bootstrap() {
        let mut mesh = Mesh::new(MeshConfig::default());
        assert_eq!(densify_mesh_edges(&mut mesh, 1.0), 0);
    }

    #[test]
    fn polyline_densify_respects_max_spacing() {
        let pts = vec![(0.0, 0.0, 0.0), (10.0, 0.0, 10.0)];
        let out = densify_polyline(&pts, 3.0, false);
        assert_eq!(out.first(), Some(&(0.0, 0.0, 0.0)));
        assert_eq!(out.last(), Some(&(10.0, 0.0, 10.0)));
        for w in out.windows(2) {
            let (a, b) = (w[0], w[1]);
            let len = ((b.0 - a.0).powi(2) + (b.1 - a.1).powi(2)).sqrt();
            assert!(len <= 3.0 + 1e-9);
        }
    }

    #[test]
    fn polyline_densify_interpolates_z_linearly() {
        let pts = vec![(0.0, 0.0, 0.0), (4.0, 0.0, 8.0)];
        let out = densify_polyline(&pts, 1.0, false);
        for p in &out {
            assert!((p.2 - p.0 * 2.0).abs() < 1e-9);
        }
    }

    #[test]
    fn polyline_densify_preserves_total_length() {
        let pts = vec![(0.0, 0.0, 0.0), (5.0, 0.0, 0.0), (5.0, 5.0, 0.0)];
        let original_len: f64 = pts.windows(2).map(|w| ((w[1].0 - w[0].0).powi(2) + (w[1].1 - w[0].1).powi(2)).sqrt()).sum();
        let out = densify_polyline(&pts, 1.0, false);
        let new_len: f64 = out.windows(2).map(|w| ((w[1].0 - w[0].0).powi(2) + (w[1].1 - w[0].1).powi(2)).sqrt()).sum();
        assert!((new_len - original_len).abs() < 1e-9);
    }

    #[test]
    fn closed_polyline_densify_wraps_last_segment() {
        let pts = vec![(0.0, 0.0, 0.0), (10.0, 0.0, 0.0), (10.0, 10.0, 0.0), (0.0, 10.0, 0.0)];
        let out = densify_polyline(&pts, 4.0, true);
        // closed means the segment from the last point back to the first is
        // also subject to subdivision, and no trailing duplicate of point 0.
        assert_ne!(out.last(), Some(&(0.0, 0.0, 0.0)));
    }
}
