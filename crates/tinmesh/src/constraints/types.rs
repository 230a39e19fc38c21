//! Constraint definitions: what a caller hands in, and what the mesh
//! remembers after installation.

use crate::vertex::VertexId;

/// Whether a constraint's vertex chain is an open polyline or a closed
/// polygon boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConstraintKind {
    Linear,
    Polygon,
}

/// One constraint as the caller supplies it: a kind plus the ordered
/// `(x, y, z)` points of its boundary.
#[derive(Clone, Debug)]
pub struct ConstraintDef {
    pub kind: ConstraintKind,
    pub points: Vec<(f64, f64, f64)>,
}

impl ConstraintDef {
    pub fn linear(points: Vec<(f64, f64, f64)>) -> Self {
        Self { kind: ConstraintKind::Linear, points }
    }

    pub fn polygon(points: Vec<(f64, f64, f64)>) -> Self {
        Self { kind: ConstraintKind::Polygon, points }
    }
}

/// A constraint as installed: the vertex ids now standing in for its input
/// points, and (for polygons) the region id assigned to its interior.
#[derive(Clone, Debug)]
pub struct Constraint {
    pub index: u32,
    pub kind: ConstraintKind,
    pub vertices: Vec<VertexId>,
    pub region_id: Option<u32>,
}

impl Constraint {
    /// The constraint's edges as `(from, to)` vertex id pairs: `n - 1` edges
    /// for a linear constraint, `n` (wrapping) for a polygon.
    pub fn edges(&self) -> impl Iterator<Item = (VertexId, VertexId)> + '_ {
        let n = self.vertices.len();
        let closed = matches!(self.kind, ConstraintKind::Polygon);
        let last = if closed { n } else { n.saturating_sub(1) };
        (0..last).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }
}
