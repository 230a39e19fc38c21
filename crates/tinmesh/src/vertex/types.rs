//! Vertex, merger groups, and the site arena that holds both.
//!
//! Purpose
//! - A "site" is whatever an edge's origin slot points at: either a single
//!   input vertex, or a [`VertexMergerGroup`] standing in for several
//!   coincident ones. Representing both as variants of one arena-indexed
//!   `Site` enum means merging two vertices is an in-place rewrite of one
//!   arena slot rather than a walk over every incident edge — see
//!   `Mesh::merge_into` for why that is sound under the indexed quad-edge
//!   model.

use nalgebra::Point2;
use smallvec::SmallVec;

/// Stable identifier assigned once per input vertex and never reused, even
/// if the vertex is later removed or merged away. Distinct from [`SiteId`],
/// which names the (reusable) arena slot a vertex currently occupies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexId(pub u64);

/// Index into [`crate::mesh::Mesh`]'s site arena. May be reused after a
/// vertex is removed and its slot recycled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SiteId(pub u32);

/// Status flags carried by a vertex. `synthetic` marks vertices the core
/// introduced itself (densification, conformance restoration);
/// `constraint_member` marks vertices that participate in an installed
/// constraint's vertex list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VertexFlags {
    pub synthetic: bool,
    pub constraint_member: bool,
}

/// An immutable 2D point with a scalar attribute, a stable identity, and
/// status flags. `z` may be `NaN` when the caller has no attribute for this
/// vertex.
#[derive(Clone, Copy, Debug)]
pub struct Vertex {
    pub id: VertexId,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub flags: VertexFlags,
}

impl Vertex {
    pub fn new(id: VertexId, x: f64, y: f64, z: f64) -> Self {
        Self {
            id,
            x,
            y,
            z,
            flags: VertexFlags::default(),
        }
    }

    #[inline]
    pub fn point(&self) -> Point2<f64> {
        Point2::new(self.x, self.y)
    }

    #[inline]
    pub fn is_synthetic(&self) -> bool {
        self.flags.synthetic
    }

}

/// How a [`VertexMergerGroup`] resolves its `z` attribute across coincident
/// members.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MergeRule {
    #[default]
    First,
    Last,
    Min,
    Max,
    Mean,
}

impl MergeRule {
    /// Resolves `z` over `members` in first-seen order. Returns `NaN` if
    /// every member's `z` is `NaN` (mirrors `f64::NaN` propagation rather
    /// than silently substituting zero).
    pub fn resolve(&self, members: &[Vertex]) -> f64 {
        match self {
            MergeRule::First => members.first().map(|v| v.z).unwrap_or(f64::NAN),
            MergeRule::Last => members.last().map(|v| v.z).unwrap_or(f64::NAN),
            MergeRule::Min => members
                .iter()
                .map(|v| v.z)
                .filter(|z| !z.is_nan())
                .fold(f64::NAN, |acc, z| if acc.is_nan() { z } else { acc.min(z) }),
            MergeRule::Max => members
                .iter()
                .map(|v| v.z)
                .filter(|z| !z.is_nan())
                .fold(f64::NAN, |acc, z| if acc.is_nan() { z } else { acc.max(z) }),
            MergeRule::Mean => {
                let (sum, count) = members
                    .iter()
                    .map(|v| v.z)
                    .filter(|z| !z.is_nan())
                    .fold((0.0, 0usize), |(s, c), z| (s + z, c + 1));
                if count == 0 {
                    f64::NAN
                } else {
                    sum / count as f64
                }
            }
        }
    }
}

/// A surrogate vertex representing two or more input vertices that lie
/// within vertex tolerance of each other. The group's coordinates are the
/// first-seen member's; `z` is resolved on demand by `merge_rule`.
#[derive(Clone, Debug)]
pub struct VertexMergerGroup {
    pub representative: Vertex,
    pub members: SmallVec<[Vertex; 4]>,
    pub merge_rule: MergeRule,
}

impl VertexMergerGroup {
    pub fn new(first: Vertex, merge_rule: MergeRule) -> Self {
        let mut members = SmallVec::new();
        members.push(first);
        Self {
            representative: first,
            members,
            merge_rule,
        }
    }

    pub fn push(&mut self, member: Vertex) {
        self.members.push(member);
    }

    #[inline]
    pub fn point(&self) -> Point2<f64> {
        self.representative.point()
    }

    #[inline]
    pub fn resolved_z(&self) -> f64 {
        self.merge_rule.resolve(&self.members)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Removes `id` from the group; returns `true` if the group is now empty.
    pub fn remove(&mut self, id: VertexId) -> bool {
        if let Some(pos) = self.members.iter().position(|v| v.id == id) {
            self.members.remove(pos);
        }
        if self.members.is_empty() {
            return true;
        }
        if self.representative.id == id {
            self.representative = self.members[0];
        }
        false
    }
}

/// What a mesh's vertex arena slot currently holds.
#[derive(Clone, Debug)]
pub enum Site {
    /// Slot has been removed and is on the free list; `next_free` chains to
    /// the next free slot (or `None` at the end of the chain).
    Free { next_free: Option<u32> },
    Vertex(Vertex),
    Group(VertexMergerGroup),
}

impl Site {
    #[inline]
    pub fn point(&self) -> Option<Point2<f64>> {
        match self {
            Site::Vertex(v) => Some(v.point()),
            Site::Group(g) => Some(g.point()),
            Site::Free { .. } => None,
        }
    }

    pub fn contains(&self, id: VertexId) -> bool {
        match self {
            Site::Vertex(v) => v.id == id,
            Site::Group(g) => g.members.iter().any(|v| v.id == id),
            Site::Free { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(id: u64, x: f64, y: f64, z: f64) -> Vertex {
        Vertex::new(VertexId(id), x, y, z)
    }

    #[test]
    fn merge_rule_first_last_min_max_mean() {
        let members = [v(1, 0.0, 0.0, 3.0), v(2, 0.0, 0.0, 1.0), v(3, 0.0, 0.0, 5.0)];
        assert_eq!(MergeRule::First.resolve(&members), 3.0);
        assert_eq!(MergeRule::Last.resolve(&members), 5.0);
        assert_eq!(MergeRule::Min.resolve(&members), 1.0);
        assert_eq!(MergeRule::Max.resolve(&members), 5.0);
        assert!((MergeRule::Mean.resolve(&members) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn merger_group_remove_updates_representative() {
        let mut g = VertexMergerGroup::new(v(1, 0.0, 0.0, 1.0), MergeRule::First);
        g.push(v(2, 0.0, 0.0, 2.0));
        assert!(!g.remove(VertexId(1)));
        assert_eq!(g.representative.id, VertexId(2));
        assert!(g.remove(VertexId(2)));
    }
}
