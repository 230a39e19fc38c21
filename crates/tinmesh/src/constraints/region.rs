//! Region labelling for polygon constraints: which triangles lie inside a
//! constraint's closed boundary, and point-in-polygon membership.

use crate::edgepool::EdgeId;
use crate::mesh::Mesh;
use crate::query::{self, TriangleEdges};
use nalgebra::Point2;
use std::collections::HashSet;

use super::types::{Constraint, ConstraintKind};

/// Assigns each installed polygon constraint its own index as region id,
/// then flood-fills that id onto every mesh edge (boundary and interior)
/// enclosed by the polygon. Linear constraints have no interior and are
/// left unlabeled. A clockwise polygon is treated as a hole in whatever
/// encloses it: its boundary is still forced into the mesh by
/// [`super::install`], but it gets no region id and no interior flood-fill,
/// since a hole has no "inside" of its own to label. Where two polygons'
/// interiors overlap, the later constraint's flood-fill simply overwrites
/// the earlier one's id on the shared edges — last polygon installed wins.
pub(super) fn assign_regions(mesh: &mut Mesh) {
    let polygon_indices: Vec<usize> = mesh
        .constraints()
        .iter()
        .enumerate()
        .filter(|(_, c)| matches!(c.kind, ConstraintKind::Polygon))
        .map(|(i, _)| i)
        .collect();
    for i in polygon_indices {
        let constraint = mesh.constraints()[i].clone();
        if !is_ccw(mesh, &constraint) {
            continue;
        }
        let region_id = constraint.index;
        mesh.constraints_mut()[i].region_id = Some(region_id);
        flood_mark_region(mesh, &constraint, region_id);
    }
}

/// Whether `constraint`'s vertex chain winds counter-clockwise, by the sign
/// of its shoelace area. A clockwise chain (negative area) is a hole.
fn is_ccw(mesh: &Mesh, constraint: &Constraint) -> bool {
    let points: Vec<Point2<f64>> = constraint.vertices.iter().filter_map(|&v| mesh.site_of(v).and_then(|s| mesh.site(s).point())).collect();
    if points.len() < 3 {
        return false;
    }
    let n = points.len();
    let mut area = 0.0;
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        area += a.x * b.y - b.x * a.y;
    }
    area > 0.0
}

/// Breadth-first flood-fill from the polygon's boundary spokes inward,
/// labelling every edge reached with `region_id`. Stops at any edge already
/// part of the polygon's own boundary, since the boundary is the fill's
/// containing wall; for an edge belonging to some *other* constraint's
/// boundary, the walk still crosses it (regions can be adjacent) but does
/// not walk past a ghost (hull) triangle, since the mesh's exterior is never
/// part of any polygon's interior.
fn flood_mark_region(mesh: &mut Mesh, constraint: &Constraint, region_id: u32) {
    let mut boundary_set: HashSet<u32> = HashSet::new();
    let mut spokes: Vec<EdgeId> = Vec::with_capacity(constraint.vertices.len());
    for (a, b) in constraint.edges() {
        let (Some(sa), Some(sb)) = (mesh.site_of(a), mesh.site_of(b)) else {
            continue;
        };
        let Some(edge) = mesh.find_edge_between(sa, sb) else {
            continue;
        };
        boundary_set.insert(edge.base().0);
        spokes.push(edge);
    }
    if spokes.is_empty() {
        return;
    }

    let mut visited: HashSet<u32> = HashSet::new();
    let mut queue: Vec<EdgeId> = Vec::new();
    for &spoke in &spokes {
        mark_triangle(mesh, spoke, region_id, &mut visited, &mut queue);
    }

    while let Some(e) = queue.pop() {
        let f = mesh.pool().forward(e);
        let r = mesh.pool().reverse(e);
        for d in [e, f, r] {
            if boundary_set.contains(&d.base().0) {
                continue;
            }
            let neighbor = d.dual();
            if visited.contains(&neighbor.base().0) {
                continue;
            }
            if mesh.is_ghost_triangle_left_of(neighbor) {
                continue;
            }
            mark_triangle(mesh, neighbor, region_id, &mut visited, &mut queue);
        }
    }
}

/// Marks all three edges of the triangle with leading edge `e` as belonging
/// to `region_id`, records them visited, and queues `e` for its neighbors
/// to be explored.
fn mark_triangle(mesh: &mut Mesh, e: EdgeId, region_id: u32, visited: &mut HashSet<u32>, queue: &mut Vec<EdgeId>) {
    if !visited.insert(e.base().0) {
        return;
    }
    let f = mesh.pool().forward(e);
    let r = mesh.pool().reverse(e);
    visited.insert(f.base().0);
    visited.insert(r.base().0);
    mesh.mark_region_edge(e, region_id);
    mesh.mark_region_edge(f, region_id);
    mesh.mark_region_edge(r, region_id);
    queue.push(e);
}

/// The triangles whose centroid lies inside `constraint`'s polygon
/// boundary. Centroid-membership rather than a true flood-fill: cheap and
/// exact except for the zero-measure case of a triangle centroid landing
/// exactly on the boundary, which this crate treats as outside.
pub fn triangles_inside(mesh: &mut Mesh, constraint: &Constraint) -> Vec<TriangleEdges> {
    if !matches!(constraint.kind, ConstraintKind::Polygon) {
        return Vec::new();
    }
    query::triangles(mesh)
        .filter(|t| {
            triangle_centroid(mesh, t)
                .map(|c| is_point_inside_constraint(mesh, constraint, c))
                .unwrap_or(false)
        })
        .collect()
}

fn triangle_centroid(mesh: &Mesh, t: &TriangleEdges) -> Option<Point2<f64>> {
    let [e0, e1, e2] = t.edges;
    let a = mesh.origin_point(e0)?;
    let b = mesh.origin_point(e1)?;
    let c = mesh.origin_point(e2)?;
    Some(Point2::new((a.x + b.x + c.x) / 3.0, (a.y + b.y + c.y) / 3.0))
}

/// Crossing-number point-in-polygon test against `constraint`'s boundary.
/// A point exactly on the boundary is reported as outside.
pub fn is_point_inside_constraint(mesh: &Mesh, constraint: &Constraint, query: Point2<f64>) -> bool {
    if !matches!(constraint.kind, ConstraintKind::Polygon) {
        return false;
    }
    let points: Vec<Point2<f64>> = constraint
        .vertices
        .iter()
        .filter_map(|&v| mesh.site_of(v).and_then(|s| mesh.site(s).point()))
        .collect();
    if points.len() < 3 {
        return false;
    }
    let n = points.len();
    let mut crossings = 0u32;
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        if on_segment(a, b, query) {
            return false;
        }
        if (a.y > query.y) != (b.y > query.y) {
            let t = (query.y - a.y) / (b.y - a.y);
            let x_at_y = a.x + t * (b.x - a.x);
            if x_at_y > query.x {
                crossings += 1;
            }
        }
    }
    crossings % 2 == 1
}

fn on_segment(a: Point2<f64>, b: Point2<f64>, p: Point2<f64>) -> bool {
    let cross = (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x);
    if cross.abs() > 1e-9 {
        return false;
    }
    let dot = (p.x - a.x) * (b.x - a.x) + (p.y - a.y) * (b.y - a.y);
    let len2 = (b.x - a.x).powi(2) + (b.y - a.y).powi(2);
    (0.0..=len2).contains(&dot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MeshConfig;
    use crate::mesh::Mesh;

    #[test]
    fn on_segment_detects_endpoint_and_midpoint() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(2.0, 0.0);
        assert!(on_segment(a, b, Point2::new(1.0, 0.0)));
        assert!(on_segment(a, b, a));
        assert!(!on_segment(a, b, Point2::new(1.0, 1.0)));
    }

    #[test]
    fn square_polygon_contains_center_not_corner_neighborhood() {
        let mut mesh = Mesh::new(MeshConfig::default());
        let ids = [
            mesh.add_vertex(0.0, 0.0, 0.0),
            mesh.add_vertex(4.0, 0.0, 0.0),
            mesh.add_vertex(4.0, 4.0, 0.0),
            mesh.add_vertex(0.0, 4.0, 0.0),
        ];
        let constraint = Constraint {
            index: 0,
            kind: ConstraintKind::Polygon,
            vertices: ids.to_vec(),
            region_id: None,
        };
        assert!(is_point_inside_constraint(&mesh, &constraint, Point2::new(2.0, 2.0)));
        assert!(!is_point_inside_constraint(&mesh, &constraint, Point2::new(10.0, 10.0)));
        assert!(!is_point_inside_constraint(&mesh, &constraint, Point2::new(0.0, 0.0)));
    }

    #[test]
    fn linear_constraint_has_no_interior() {
        let mesh = Mesh::new(MeshConfig::default());
        let c = Constraint {
            index: 0,
            kind: ConstraintKind::Linear,
            vertices: Vec::new(),
            region_id: None,
        };
        assert!(!is_point_inside_constraint(&mesh, &c, Point2::new(0.0, 0.0)));
    }
}
