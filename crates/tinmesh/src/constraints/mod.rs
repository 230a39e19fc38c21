//! Constraint edges and polygon regions layered on top of the Delaunay
//! core.
//!
//! Purpose
//! - A plain Delaunay mesh has no notion of "this edge must exist" or
//!   "this area is inside a boundary"; this module adds both without
//!   touching the quad-edge representation itself, the same way the
//!   kernels this crate descends from layer optional passes on top of a
//!   core traversal rather than folding every feature into it.

mod densify;
mod install;
mod region;
mod types;

pub use densify::{densify_mesh_edges, densify_polyline};
pub use install::{add_constraints, add_constraints_uncancellable};
pub use region::{is_point_inside_constraint, triangles_inside};
pub use types::{Constraint, ConstraintDef, ConstraintKind};
