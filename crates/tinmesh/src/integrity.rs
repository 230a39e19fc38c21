//! Whole-mesh consistency checker.
//!
//! Purpose
//! - A thorough self-check a caller can run after a long batch of
//!   insertions, removals, or constraint installation: every face is a
//!   genuine triangle, the hull is a single positively-oriented cycle, and
//!   every interior edge still satisfies the Delaunay inequality.

use crate::bitset::BitSet;
use crate::edgepool::EdgeId;
use crate::mesh::Mesh;
use crate::query;

#[derive(Clone, Debug, Default)]
pub struct IntegrityReport {
    pub broken_face_circuits: Vec<EdgeId>,
    pub non_triangular_hull: bool,
    pub hull_area_non_positive: bool,
    pub degenerate_triangles: Vec<EdgeId>,
    pub delaunay_violations: Vec<EdgeId>,
}

impl IntegrityReport {
    pub fn is_clean(&self) -> bool {
        self.broken_face_circuits.is_empty()
            && !self.non_triangular_hull
            && !self.hull_area_non_positive
            && self.degenerate_triangles.is_empty()
            && self.delaunay_violations.is_empty()
    }
}

/// Runs the four-step check described in the module doc comment. A mesh
/// that has not yet bootstrapped passes trivially (there is nothing to
/// check).
pub fn check(mesh: &mut Mesh) -> IntegrityReport {
    let mut report = IntegrityReport::default();
    if !mesh.is_bootstrapped() {
        return report;
    }

    check_face_circuits(mesh, &mut report);
    check_hull(mesh, &mut report);
    check_triangle_orientation(mesh, &mut report);
    check_delaunay_inequality(mesh, &mut report);
    report
}

/// Every edge must return to itself after three `forward` steps.
fn check_face_circuits(mesh: &Mesh, report: &mut IntegrityReport) {
    for base in mesh.pool().iter_base_edges() {
        for e in [base, base.dual()] {
            let f1 = mesh.pool().forward(e);
            let f2 = mesh.pool().forward(f1);
            let f3 = mesh.pool().forward(f2);
            if f3 != e {
                report.broken_face_circuits.push(e);
            }
        }
    }
}

fn check_hull(mesh: &Mesh, report: &mut IntegrityReport) {
    let ring = query::perimeter(mesh);
    if ring.is_empty() {
        report.non_triangular_hull = true;
        return;
    }
    let mut visited = BitSet::with_capacity(mesh.pool().max_allocated_index());
    for &e in &ring {
        if visited.set_get(e.index()) {
            report.non_triangular_hull = true;
        }
    }

    let points: Vec<_> = ring.iter().filter_map(|&e| mesh.origin_point(e)).collect();
    if points.len() != ring.len() {
        report.non_triangular_hull = true;
        return;
    }
    let mut area2 = 0.0;
    for i in 0..points.len() {
        let a = points[i];
        let b = points[(i + 1) % points.len()];
        area2 += a.x * b.y - b.x * a.y;
    }
    if area2 <= 0.0 {
        report.hull_area_non_positive = true;
    }
}

fn check_triangle_orientation(mesh: &mut Mesh, report: &mut IntegrityReport) {
    let triangles: Vec<_> = query::triangles(mesh).collect();
    for t in triangles {
        let [e, f, _] = t.edges;
        let a = mesh.origin_point(e).expect("triangle has real corners");
        let b = mesh.origin_point(f).expect("triangle has real corners");
        let c = mesh.origin_point(mesh.pool().forward(f)).expect("triangle has real corners");
        if mesh.orientation(a, b, c) <= 0.0 {
            report.degenerate_triangles.push(e);
        }
    }
}

/// For every shared interior edge, the opposite vertex of one triangle
/// must not lie inside the circumcircle of the other.
fn check_delaunay_inequality(mesh: &mut Mesh, report: &mut IntegrityReport) {
    let delaunay_threshold = mesh.thresholds().delaunay;
    for base in mesh.pool().iter_base_edges().collect::<Vec<_>>() {
        if mesh.pool().is_ghost(base) {
            continue;
        }
        let dual = mesh.pool().dual(base);
        if mesh.is_ghost_triangle_left_of(base) || mesh.is_ghost_triangle_left_of(dual) {
            continue;
        }
        let a = mesh.origin_point(base).unwrap();
        let b = mesh.origin_point(mesh.pool().forward(base)).unwrap();
        let c = mesh.origin_point(mesh.pool().reverse(base)).unwrap();
        let d = mesh.origin_point(mesh.pool().reverse(dual)).unwrap();
        if mesh.in_circle(a, b, c, d) > delaunay_threshold {
            report.delaunay_violations.push(base);
        }
    }
}
