//! Orientation and in-circle predicates, with compensated-precision fallback.
//!
//! Purpose
//! - `orientation` and `in_circle` are the only two primitives the mesh core
//!   needs to reason about geometry. Both are plain determinants; both are
//!   numerically fragile near zero, which is exactly where the triangulation
//!   has to make a topological decision (collinear? cocircular?). The naive
//!   `f64` evaluation is used as a fast path; when its magnitude falls under
//!   the relevant [`Thresholds`] entry, a compensated (double-double)
//!   re-evaluation of the same determinant is used instead.
//!
//! Why double-double and not full arbitrary-precision expansions
//! - A full Shewchuk-style adaptive expansion is the textbook answer, but a
//!   two-word (head, tail) compensated sum built from error-free
//!   transformations (`two_sum`, `two_product`) already recovers correctness
//!   at every scale this crate's thresholds are tuned for (they are derived
//!   from `ulp(nominal_spacing)`, not from the hardware epsilon), at a
//!   fraction of the code. Callers that need bit-exact robustness for
//!   adversarial inputs beyond that should use `in_circle`'s conflict
//!   counter ([`PredicateStats`]) as a signal to re-derive `nominal_spacing`.

use super::thresholds::Thresholds;
use nalgebra::Point2;

/// Running counters of how often a predicate needed its extended-precision
/// fallback, and how often that fallback actually flipped the sign the fast
/// path would have returned. Exposed to callers via `MeshStatistics`.
#[derive(Clone, Copy, Debug, Default)]
pub struct PredicateStats {
    pub orientation_fallbacks: u64,
    pub orientation_sign_conflicts: u64,
    pub in_circle_fallbacks: u64,
    pub in_circle_sign_conflicts: u64,
}

/// Returns positive if `c` is strictly left of the ray `a -> b`, negative if
/// strictly right, zero if collinear (within `thresholds.precision`).
pub fn orientation(
    a: Point2<f64>,
    b: Point2<f64>,
    c: Point2<f64>,
    thresholds: &Thresholds,
    stats: &mut PredicateStats,
) -> f64 {
    let fast = orientation_fast(a, b, c);
    if fast.abs() >= thresholds.half_plane {
        return fast;
    }
    stats.orientation_fallbacks += 1;
    let exact = orientation_extended(a, b, c);
    if exact.signum() != 0.0 && fast.signum() != 0.0 && exact.signum() != fast.signum() {
        stats.orientation_sign_conflicts += 1;
    }
    exact
}

/// Half the signed orientation determinant: the signed area of triangle (a,b,c).
#[inline]
pub fn area(a: Point2<f64>, b: Point2<f64>, c: Point2<f64>) -> f64 {
    orientation_fast(a, b, c) * 0.5
}

/// Positive if `d` lies strictly inside the circle through the
/// counter-clockwise triangle `(a, b, c)`.
pub fn in_circle(
    a: Point2<f64>,
    b: Point2<f64>,
    c: Point2<f64>,
    d: Point2<f64>,
    thresholds: &Thresholds,
    stats: &mut PredicateStats,
) -> f64 {
    let fast = in_circle_fast(a, b, c, d);
    if fast.abs() >= thresholds.in_circle {
        return fast;
    }
    stats.in_circle_fallbacks += 1;
    let exact = in_circle_extended(a, b, c, d);
    if exact.signum() != 0.0 && fast.signum() != 0.0 && exact.signum() != fast.signum() {
        stats.in_circle_sign_conflicts += 1;
    }
    exact
}

/// Signed distance-like value used to generalize the in-circle test across a
/// ghost (hull boundary) edge `(a, b)`: positive when `v` is on the side that
/// would expand the hull.
///
/// When `|h|` falls under `thresholds.half_plane` the caller should recompute
/// with [`ghost_in_circle_extended`] and, on an exact zero, disambiguate with
/// the segment projection parameter (handled by the mesh core, not here,
/// since it needs `a`/`b` again).
#[inline]
pub fn ghost_in_circle(a: Point2<f64>, b: Point2<f64>, v: Point2<f64>) -> f64 {
    (v.x - a.x) * (a.y - b.y) + (v.y - a.y) * (b.x - a.x)
}

/// Extended-precision re-evaluation of [`ghost_in_circle`].
pub fn ghost_in_circle_extended(a: Point2<f64>, b: Point2<f64>, v: Point2<f64>) -> f64 {
    let t1 = two_product(v.x - a.x, a.y - b.y);
    let t2 = two_product(v.y - a.y, b.x - a.x);
    compensated_sum2(t1, t2)
}

#[inline]
fn orientation_fast(a: Point2<f64>, b: Point2<f64>, c: Point2<f64>) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

fn orientation_extended(a: Point2<f64>, b: Point2<f64>, c: Point2<f64>) -> f64 {
    let t1 = two_product(b.x - a.x, c.y - a.y);
    let t2 = two_product(b.y - a.y, c.x - a.x);
    compensated_sum2(t1, (-t2.0, -t2.1))
}

fn in_circle_fast(a: Point2<f64>, b: Point2<f64>, c: Point2<f64>, d: Point2<f64>) -> f64 {
    let (ax, ay) = (a.x - d.x, a.y - d.y);
    let (bx, by) = (b.x - d.x, b.y - d.y);
    let (cx, cy) = (c.x - d.x, c.y - d.y);
    let a2 = ax * ax + ay * ay;
    let b2 = bx * bx + by * by;
    let c2 = cx * cx + cy * cy;
    ax * (by * c2 - b2 * cy) - ay * (bx * c2 - b2 * cx) + a2 * (bx * cy - by * cx)
}

/// Double-double re-evaluation of the 3x3 in-circle determinant, expanded
/// along the first row so every product is tracked as a (head, tail) pair.
fn in_circle_extended(a: Point2<f64>, b: Point2<f64>, c: Point2<f64>, d: Point2<f64>) -> f64 {
    let (ax, ay) = (a.x - d.x, a.y - d.y);
    let (bx, by) = (b.x - d.x, b.y - d.y);
    let (cx, cy) = (c.x - d.x, c.y - d.y);
    let a2 = ax * ax + ay * ay;
    let b2 = bx * bx + by * by;
    let c2 = cx * cx + cy * cy;

    // M11 = by*c2 - b2*cy
    let m11 = compensated_sum2(two_product(by, c2), negate(two_product(b2, cy)));
    // M12 = bx*c2 - b2*cx
    let m12 = compensated_sum2(two_product(bx, c2), negate(two_product(b2, cx)));
    // M13 = bx*cy - by*cx
    let m13 = compensated_sum2(two_product(bx, cy), negate(two_product(by, cx)));

    let term_ax = two_product(ax, m11);
    let term_ay = negate(two_product(ay, m12));
    let term_a2 = two_product(a2, m13);

    let partial = compensated_sum2(term_ax, term_ay);
    compensated_sum2(partial, term_a2)
}

#[inline]
fn negate((h, t): (f64, f64)) -> (f64, f64) {
    (-h, -t)
}

/// Error-free product: `a*b == hi+lo` exactly, computed via FMA.
#[inline]
fn two_product(a: f64, b: f64) -> (f64, f64) {
    let hi = a * b;
    let lo = a.mul_add(b, -hi);
    (hi, lo)
}

/// Error-free sum: `a+b == hi+lo` exactly.
#[inline]
fn two_sum(a: f64, b: f64) -> (f64, f64) {
    let hi = a + b;
    let bb = hi - a;
    let lo = (a - (hi - bb)) + (b - bb);
    (hi, lo)
}

/// Compensated sum of two (head, tail) double-double values, collapsed back
/// to a single `f64` head plus residual tail folded in.
fn compensated_sum2(x: (f64, f64), y: (f64, f64)) -> f64 {
    let (s, e1) = two_sum(x.0, y.0);
    let e2 = x.1 + y.1;
    let (result, _residual) = two_sum(s, e1 + e2);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::point;

    fn stats() -> PredicateStats {
        PredicateStats::default()
    }
    fn thresholds() -> Thresholds {
        Thresholds::from_nominal_spacing(1.0)
    }

    #[test]
    fn orientation_sign_matches_geometry() {
        let t = thresholds();
        let mut s = stats();
        let a = point![0.0, 0.0];
        let b = point![1.0, 0.0];
        let left = point![0.0, 1.0];
        let right = point![0.0, -1.0];
        assert!(orientation(a, b, left, &t, &mut s) > 0.0);
        assert!(orientation(a, b, right, &t, &mut s) < 0.0);
        assert!(orientation(a, b, point![2.0, 0.0], &t, &mut s).abs() < 1e-9);
    }

    #[test]
    fn in_circle_detects_unit_circle_membership() {
        let t = thresholds();
        let mut s = stats();
        let a = point![1.0, 0.0];
        let b = point![0.0, 1.0];
        let c = point![-1.0, 0.0];
        let inside = point![0.0, 0.0];
        let outside = point![0.0, 10.0];
        assert!(in_circle(a, b, c, inside, &t, &mut s) > 0.0);
        assert!(in_circle(a, b, c, outside, &t, &mut s) < 0.0);
    }

    #[test]
    fn near_collinear_points_trigger_extended_fallback() {
        let t = thresholds();
        let mut s = stats();
        let a = point![0.0, 0.0];
        let b = point![1.0, 0.0];
        // c is collinear to within a few ulps of the fast path's threshold.
        let c = point![0.5, 1e-20];
        let _ = orientation(a, b, c, &t, &mut s);
        assert!(s.orientation_fallbacks >= 1);
    }

    #[test]
    fn area_is_half_orientation() {
        let a = point![0.0, 0.0];
        let b = point![4.0, 0.0];
        let c = point![0.0, 3.0];
        assert!((area(a, b, c) - 6.0).abs() < 1e-9);
    }
}
