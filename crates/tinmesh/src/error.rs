//! Public error taxonomy.
//!
//! Purpose
//! - Every contract violation a caller can trigger gets a typed variant.
//!   `NotBootstrapped` deliberately has no variant here: per §7 it is a
//!   degraded-but-explicit state, not an error, so queries on an
//!   unbootstrapped mesh return `None`/empty iterators instead of `Err`.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MeshError {
    #[error("constraints require at least {needed} vertices to bootstrap the mesh, found {found}")]
    InsufficientConstraintGeometry { needed: usize, found: usize },

    #[error("addConstraints was already called on this mesh")]
    ConstraintAlreadyInstalled,

    #[error("constraint segment crosses an already-forced edge of constraint {constraint_index}")]
    CrossingConstraints { constraint_index: u32 },

    #[error("invalid constraint geometry: {reason}")]
    InvalidConstraintGeometry { reason: String },
}
