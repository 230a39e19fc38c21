//! Threshold derivation from nominal point spacing.
//!
//! Purpose
//! - Centralize every epsilon the geometry kernel and mesh core use, all
//!   derived from a single scale parameter so callers cannot accidentally
//!   mix tolerances computed from different assumptions.
//!
//! Why this design
//! - Mirrors `GeomCfg` in spirit: one small `Copy` struct, built once, shared
//!   read-only. Unlike `GeomCfg` the values here are not independent knobs —
//!   they are all powers-of-two multiples of a single `precision` floor, so
//!   the struct is built through `Thresholds::from_nominal_spacing` rather
//!   than through field literals.

/// Immutable, `Copy` bundle of every epsilon derived from nominal point
/// spacing. Built once per [`crate::Mesh`] and never mutated afterward.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Thresholds {
    /// Floor precision: `256 * ulp(nominal_spacing)`.
    pub precision: f64,
    /// Orientation / half-plane decision threshold: `256 * precision`.
    pub half_plane: f64,
    /// Delaunay inequality tolerance used by the integrity checker: `256 * precision`.
    pub delaunay: f64,
    /// In-circle decision threshold: `2^20 * precision`.
    pub in_circle: f64,
    /// Distance below which two vertices are considered coincident.
    pub vertex_tolerance: f64,
    /// Cached square of `vertex_tolerance`, for squared-distance comparisons.
    pub vertex_tolerance_sq: f64,
}

impl Thresholds {
    pub fn from_nominal_spacing(nominal_spacing: f64) -> Self {
        debug_assert!(
            nominal_spacing.is_finite() && nominal_spacing > 0.0,
            "nominal point spacing must be a positive finite number"
        );
        let precision = 256.0 * ulp(nominal_spacing);
        let half_plane = 256.0 * precision;
        let delaunay = 256.0 * precision;
        let in_circle = (1u64 << 20) as f64 * precision;
        let vertex_tolerance = nominal_spacing / 1.0e5;
        Self {
            precision,
            half_plane,
            delaunay,
            in_circle,
            vertex_tolerance,
            vertex_tolerance_sq: vertex_tolerance * vertex_tolerance,
        }
    }
}

/// Unit in the last place of `x`, for `x > 0`.
fn ulp(x: f64) -> f64 {
    let next = f64::from_bits(x.to_bits() + 1);
    next - x
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_scale_with_spacing() {
        let small = Thresholds::from_nominal_spacing(1.0);
        let large = Thresholds::from_nominal_spacing(1.0e6);
        assert!(large.precision > small.precision);
        assert!((small.half_plane - 256.0 * small.precision).abs() < 1e-30);
        assert!((small.delaunay - 256.0 * small.precision).abs() < 1e-30);
    }

    #[test]
    fn vertex_tolerance_is_spacing_over_1e5() {
        let t = Thresholds::from_nominal_spacing(2.0);
        assert!((t.vertex_tolerance - 2.0e-5).abs() < 1e-18);
        assert!((t.vertex_tolerance_sq - t.vertex_tolerance * t.vertex_tolerance).abs() < 1e-30);
    }
}
