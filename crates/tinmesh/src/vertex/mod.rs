//! Vertex model: immutable points, merger groups, and the site arena.

mod types;

pub use types::{MergeRule, Site, SiteId, Vertex, VertexFlags, VertexId, VertexMergerGroup};
