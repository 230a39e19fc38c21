//! Finding the first non-degenerate triangle among the pending vertices.
//!
//! Purpose
//! - Every other mesh operation needs at least one real triangle to walk
//!   and carve. Until three (or more) pending vertices span a
//!   non-negligible area, the mesh has no topology at all — just a list of
//!   points waiting for one.

use super::Mesh;
use crate::edgepool::EdgeId;
use crate::kernel::area;
use crate::vertex::{Site, Vertex};
use nalgebra::Point2;

/// Why bootstrap could not (yet) find a usable triangle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BootstrapFailure {
    /// Fewer than three vertices are pending.
    TooFewVertices,
    /// Every pending vertex lies within vertex tolerance of the others.
    TrivialPointSet,
    /// Every pending vertex lies on (or within tolerance of) a single line.
    CollinearPointSet,
}

impl Mesh {
    /// Attempts bootstrap against the current pending list; on success,
    /// links the chosen triangle plus its ghost ring and replays every
    /// other pending vertex through ordinary insertion.
    pub(super) fn try_bootstrap_pending(&mut self) {
        if self.bootstrapped {
            return;
        }
        let Ok(triple) = self.find_bootstrap_triple() else {
            return;
        };
        let pending = std::mem::take(&mut self.pending);
        let (ia, ib, ic) = triple;
        let a = pending[ia];
        let b = pending[ib];
        let c = pending[ic];
        self.link_initial_triangle(a, b, c);
        self.bootstrapped = true;
        for (i, v) in pending.into_iter().enumerate() {
            if i != ia && i != ib && i != ic {
                self.insert_vertex(v);
            }
        }
    }

    fn find_bootstrap_triple(&mut self) -> Result<(usize, usize, usize), BootstrapFailure> {
        let n = self.pending.len();
        if n < 3 {
            return Err(BootstrapFailure::TooFewVertices);
        }
        let points: Vec<Point2<f64>> = self.pending.iter().map(Vertex::point).collect();
        let s = self.nominal_point_spacing();
        // 1/64 the area of an equilateral triangle of side `s` (spec §4.3).
        let area_floor = s * s * (3f64.sqrt() / 4.0) / 64.0;

        if let Some(triple) = self.probe_random_triples(&points, area_floor) {
            return Ok(triple);
        }
        if let Some(triple) = self.probe_principal_axis(&points)? {
            return Ok(triple);
        }
        self.exhaustive_search(&points, area_floor).ok_or(BootstrapFailure::CollinearPointSet)
    }

    /// Tier 1: try `k = clamp(floor(n^(1/3)), 3, 16)` random triples, keeping
    /// the one with the largest absolute area.
    fn probe_random_triples(&mut self, points: &[Point2<f64>], area_floor: f64) -> Option<(usize, usize, usize)> {
        let n = points.len();
        let k = ((n as f64).cbrt().floor() as usize).clamp(3, 16);
        let mut best: Option<(usize, usize, usize)> = None;
        let mut best_area = 0.0f64;
        for _ in 0..k {
            let picks = self.rng().sample_distinct(n, 3);
            self.stats_mut().bootstrap_random_triples_tried += 1;
            if picks.len() < 3 {
                continue;
            }
            let a = area(points[picks[0]], points[picks[1]], points[picks[2]]).abs();
            if a > best_area {
                best_area = a;
                best = Some((picks[0], picks[1], picks[2]));
            }
        }
        if best_area > area_floor {
            best
        } else {
            None
        }
    }

    /// Tier 2: principal-axis probe. Detects trivial (all-coincident) and
    /// collinear point sets outright; otherwise proposes the farthest-apart
    /// pair along the axis plus the point farthest from it as a candidate
    /// triangle.
    fn probe_principal_axis(&mut self, points: &[Point2<f64>]) -> Result<Option<(usize, usize, usize)>, BootstrapFailure> {
        let n = points.len();
        let t = *self.thresholds();
        let (mx, my) = {
            let sum = points.iter().fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
            (sum.0 / n as f64, sum.1 / n as f64)
        };
        let (sxx, syy, sxy) = points.iter().fold((0.0, 0.0, 0.0), |(xx, yy, xy), p| {
            let (dx, dy) = (p.x - mx, p.y - my);
            (xx + dx * dx, yy + dy * dy, xy + dx * dy)
        });

        if sxx < t.vertex_tolerance_sq && syy < t.vertex_tolerance_sq {
            return Err(BootstrapFailure::TrivialPointSet);
        }

        let theta = 0.5 * (2.0 * sxy).atan2(sxx - syy);
        let axis = Point2::new(theta.cos(), theta.sin());
        let max_deviation = points
            .iter()
            .map(|p| ((p.x - mx) * -axis.y + (p.y - my) * axis.x).abs())
            .fold(0.0, f64::max);
        if max_deviation < t.half_plane {
            return Err(BootstrapFailure::CollinearPointSet);
        }

        let projections: Vec<f64> = points.iter().map(|p| (p.x - mx) * axis.x + (p.y - my) * axis.y).collect();
        let (mut lo, mut hi) = (0usize, 0usize);
        for i in 1..n {
            if projections[i] < projections[lo] {
                lo = i;
            }
            if projections[i] > projections[hi] {
                hi = i;
            }
        }
        if lo == hi {
            return Err(BootstrapFailure::CollinearPointSet);
        }

        // Probe a handful of candidate apexes among the points farthest from
        // the axis, keeping the one that maximizes triangle area with the
        // two axis extrema.
        let mut by_deviation: Vec<usize> = (0..n).collect();
        by_deviation.sort_by(|&i, &j| {
            let di = ((points[i].x - mx) * -axis.y + (points[i].y - my) * axis.x).abs();
            let dj = ((points[j].x - mx) * -axis.y + (points[j].y - my) * axis.x).abs();
            dj.partial_cmp(&di).unwrap_or(std::cmp::Ordering::Equal)
        });
        let probe_count = by_deviation.len().min(8);
        let mut best: Option<(usize, usize, usize)> = None;
        let mut best_area = 0.0f64;
        for &apex in by_deviation.iter().take(probe_count) {
            if apex == lo || apex == hi {
                continue;
            }
            let a = area(points[apex], points[lo], points[hi]).abs();
            if a > best_area {
                best_area = a;
                best = Some((apex, lo, hi));
            }
        }
        Ok(best.filter(|_| best_area > t.half_plane))
    }

    /// Tier 3: exhaustive search over every triple, last resort for
    /// pathologically clustered inputs that defeat random and
    /// principal-axis sampling.
    fn exhaustive_search(&mut self, points: &[Point2<f64>], area_floor: f64) -> Option<(usize, usize, usize)> {
        self.stats_mut().bootstrap_used_exhaustive_search = true;
        let n = points.len();
        let mut best: Option<(usize, usize, usize)> = None;
        let mut best_area = area_floor;
        for i in 0..n {
            for j in (i + 1)..n {
                for k in (j + 1)..n {
                    let a = area(points[i], points[j], points[k]).abs();
                    if a > best_area {
                        best_area = a;
                        best = Some((i, j, k));
                    }
                }
            }
        }
        best
    }

    /// Builds the initial triangle (reordered CCW if necessary) plus its
    /// ghost ring: one spoke edge per hull vertex to the null vertex, and
    /// one ghost edge per hull edge, linked so that `forward` traversal
    /// around each ghost face closes into a triangle and the perimeter
    /// traversal (`forward; forward; dual; reverse`) steps around the hull.
    fn link_initial_triangle(&mut self, mut a: Vertex, mut b: Vertex, mut c: Vertex) {
        let mut stats = self.stats.predicates;
        if crate::kernel::orientation(a.point(), b.point(), c.point(), &self.thresholds, &mut stats) < 0.0 {
            std::mem::swap(&mut b, &mut c);
        }
        self.stats.predicates = stats;

        let sa = self.alloc_site(Site::Vertex(a));
        let sb = self.alloc_site(Site::Vertex(b));
        let sc = self.alloc_site(Site::Vertex(c));

        let e_ab = self.allocate_edge(Some(sa), Some(sb));
        let e_bc = self.allocate_edge(Some(sb), Some(sc));
        let e_ca = self.allocate_edge(Some(sc), Some(sa));
        self.pool_mut().set_forward(e_ab, e_bc);
        self.pool_mut().set_forward(e_bc, e_ca);
        self.pool_mut().set_forward(e_ca, e_ab);

        let spoke_a = self.allocate_edge(Some(sa), None);
        let spoke_b = self.allocate_edge(Some(sb), None);
        let spoke_c = self.allocate_edge(Some(sc), None);

        self.link_ghost_face(e_ab.dual(), spoke_a, spoke_b.dual());
        self.link_ghost_face(e_bc.dual(), spoke_b, spoke_c.dual());
        self.link_ghost_face(e_ca.dual(), spoke_c, spoke_a.dual());

        self.set_search_edge(e_ab);
    }

    fn link_ghost_face(&mut self, hull_dual: EdgeId, spoke_out: EdgeId, spoke_in_dual: EdgeId) {
        self.pool_mut().set_forward(hull_dual, spoke_out);
        self.pool_mut().set_forward(spoke_out, spoke_in_dual);
        self.pool_mut().set_forward(spoke_in_dual, hull_dual);
    }
}
