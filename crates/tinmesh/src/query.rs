//! Read-only traversal and nearest-feature queries over a built mesh.
//!
//! Purpose
//! - Every iterator here visits each face/vertex exactly once by marking
//!   edges in a [`BitSet`] sized from [`EdgePool::max_allocated_index`],
//!   the same visited-flag idiom the edge pool itself uses internally.

use crate::bitset::BitSet;
use crate::edgepool::EdgeId;
use crate::mesh::Mesh;
use crate::vertex::SiteId;
use nalgebra::Point2;

/// The three directed edges bounding one triangular face, real or ghost.
#[derive(Clone, Copy, Debug)]
pub struct TriangleEdges {
    pub edges: [EdgeId; 3],
}

/// Visits every face with three real (non-null) corners exactly once.
pub fn triangles(mesh: &Mesh) -> impl Iterator<Item = TriangleEdges> + '_ {
    let mut visited = BitSet::with_capacity(mesh.pool().max_allocated_index());
    mesh.pool().iter_base_edges().flat_map(move |base| {
        [base, base.dual()]
            .into_iter()
            .filter_map(|e| {
                if visited.set_get(e.index()) {
                    return None;
                }
                let f = mesh.pool().forward(e);
                let r = mesh.pool().reverse(e);
                visited.set_get(f.index());
                visited.set_get(r.index());
                if mesh.pool().origin(e).is_some() && mesh.pool().origin(f).is_some() && mesh.pool().origin(r).is_some() {
                    Some(TriangleEdges { edges: [e, f, r] })
                } else {
                    None
                }
            })
            .collect::<Vec<_>>()
    })
}

/// Visits every undirected edge with at least one real endpoint exactly
/// once, returning its base [`EdgeId`] (use [`crate::Mesh::origin_point`] on
/// it and its dual for the two endpoints; a ghost edge has one endpoint
/// `None`).
pub fn edges(mesh: &Mesh) -> impl Iterator<Item = EdgeId> + '_ {
    mesh.pool().iter_base_edges().filter(|&e| mesh.pool().origin(e).is_some() || mesh.pool().origin(e.dual()).is_some())
}

/// The linear-constraint or polygon-boundary index that forced `edge` in,
/// if any. `edge` may be given as either directed side of the underlying
/// undirected edge.
pub fn linear_constraint(mesh: &Mesh, edge: EdgeId) -> Option<u32> {
    mesh.linear_constraint_of(edge)
}

/// The polygon constraint whose interior flood-fill covers `edge`, if any.
/// `edge` may be given as either directed side of the underlying undirected
/// edge.
pub fn region_constraint(mesh: &Mesh, edge: EdgeId) -> Option<u32> {
    mesh.region_constraint_of(edge)
}

/// Visits every real vertex's site exactly once, by marking every outgoing
/// spoke around it during a pinwheel walk the first time it is seen.
pub fn vertex_sites(mesh: &Mesh) -> impl Iterator<Item = SiteId> + '_ {
    let mut visited = BitSet::with_capacity(mesh.pool().max_allocated_index());
    mesh.pool().iter_base_edges().flat_map(move |base| {
        [base, base.dual()]
            .into_iter()
            .filter_map(|e| {
                let Some(site) = mesh.pool().origin(e) else {
                    return None;
                };
                if visited.set_get(e.index()) {
                    return None;
                }
                let mut spoke = e;
                loop {
                    visited.set_get(spoke.index());
                    spoke = mesh.pool().pinwheel_next(spoke);
                    if spoke == e {
                        break;
                    }
                }
                Some(site)
            })
            .collect::<Vec<_>>()
    })
}

/// Walks the hull boundary starting from any ghost edge, advancing with
/// `forward; forward; dual; reverse` at each step (see the bootstrap ghost
/// ring's doc comment for why this combinator steps exactly one hull edge
/// at a time). Returns one ghost edge per hull edge, in CCW order.
pub fn perimeter(mesh: &Mesh) -> Vec<EdgeId> {
    let Some(mut start) = first_ghost_edge(mesh) else {
        return Vec::new();
    };
    let mut result = vec![start];
    loop {
        let f1 = mesh.pool().forward(start);
        let f2 = mesh.pool().forward(f1);
        let d = mesh.pool().dual(f2);
        let next = mesh.pool().reverse(d);
        if next == result[0] {
            break;
        }
        result.push(next);
        start = next;
        if result.len() > mesh.pool().allocated_edge_count() {
            // Malformed mesh guard: the ring cannot legitimately be longer
            // than the number of live edges.
            break;
        }
    }
    result
}

fn first_ghost_edge(mesh: &Mesh) -> Option<EdgeId> {
    mesh.pool().iter_base_edges().find_map(|e| {
        if mesh.pool().origin(e).is_none() {
            Some(e)
        } else if mesh.pool().origin(e.dual()).is_none() {
            Some(e.dual())
        } else {
            None
        }
    })
}

/// Returns the edge of the triangle nearest `query`, the perpendicular
/// distance to it, and whether `query` lies within the current hull.
pub struct NearestEdge {
    pub edge: EdgeId,
    pub distance: f64,
    pub inside_hull: bool,
}

pub fn nearest_edge(mesh: &mut Mesh, query: Point2<f64>) -> Option<NearestEdge> {
    if !mesh.is_bootstrapped() {
        return None;
    }
    let located = mesh.locate(query);
    let inside_hull = !mesh.is_ghost_triangle_left_of(located);
    let candidates: Vec<EdgeId> = if inside_hull {
        vec![located, mesh.pool().forward(located), mesh.pool().reverse(located)]
    } else {
        vec![mesh.hull_edge_of_ghost(located)]
    };
    let mut best: Option<(EdgeId, f64)> = None;
    for e in candidates {
        let (Some(a), Some(b)) = (mesh.origin_point(e), mesh.origin_point(mesh.pool().forward(e))) else {
            continue;
        };
        let d = perpendicular_distance(a, b, query);
        if best.map(|(_, bd)| d < bd).unwrap_or(true) {
            best = Some((e, d));
        }
    }
    best.map(|(edge, distance)| NearestEdge { edge, distance, inside_hull })
}

fn perpendicular_distance(a: Point2<f64>, b: Point2<f64>, p: Point2<f64>) -> f64 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len_sq = dx * dx + dy * dy;
    if len_sq <= 0.0 {
        return ((p.x - a.x).powi(2) + (p.y - a.y).powi(2)).sqrt();
    }
    let t = ((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq;
    let t = t.clamp(0.0, 1.0);
    let (cx, cy) = (a.x + t * dx, a.y + t * dy);
    ((p.x - cx).powi(2) + (p.y - cy).powi(2)).sqrt()
}

/// Returns the site of the vertex nearest `query`: starts from the nearest
/// edge's triangle corners, then expands outward one ring at a time via the
/// pinwheel around the current-best vertex, stopping once a full ring
/// around it turns up nothing closer.
pub fn nearest_vertex(mesh: &mut Mesh, query: Point2<f64>) -> Option<SiteId> {
    let nearest = nearest_edge(mesh, query)?;
    let edge = nearest.edge;
    let corners = [edge, mesh.pool().forward(edge), mesh.pool().reverse(edge)];

    let mut best: Option<(SiteId, f64, EdgeId)> = None;
    for &candidate in &corners {
        if let Some(site) = mesh.pool().origin(candidate) {
            if let Some(p) = mesh.origin_point(candidate) {
                let d = (p.x - query.x).powi(2) + (p.y - query.y).powi(2);
                if best.map(|(_, bd, _)| d < bd).unwrap_or(true) {
                    best = Some((site, d, candidate));
                }
            }
        }
    }
    let (mut best_site, mut best_dist, mut best_edge) = best?;

    loop {
        let start = best_edge;
        let mut spoke = mesh.pool().pinwheel_next(start);
        let mut improved: Option<(SiteId, f64, EdgeId)> = None;
        while spoke != start {
            let far = mesh.pool().forward(spoke);
            if let Some(site) = mesh.pool().origin(far) {
                if let Some(p) = mesh.origin_point(far) {
                    let d = (p.x - query.x).powi(2) + (p.y - query.y).powi(2);
                    if d < improved.map(|(_, bd, _)| bd).unwrap_or(best_dist) {
                        improved = Some((site, d, far));
                    }
                }
            }
            spoke = mesh.pool().pinwheel_next(spoke);
        }
        match improved {
            Some((site, d, e)) => {
                best_site = site;
                best_dist = d;
                best_edge = e;
            }
            None => break,
        }
    }
    Some(best_site)
}

/// Whether `query` lies within the current convex hull (ghost boundary).
pub fn is_inside_hull(mesh: &mut Mesh, query: Point2<f64>) -> bool {
    if !mesh.is_bootstrapped() {
        return false;
    }
    let located = mesh.locate(query);
    !mesh.is_ghost_triangle_left_of(located)
}
