//! Geometry kernel: orientation/in-circle predicates and their thresholds.
//!
//! Purpose
//! - Provide the handful of robust primitives every other module builds on,
//!   isolated so the rest of the mesh core never touches raw `f64`
//!   comparisons against zero.

mod predicates;
mod thresholds;

pub use predicates::{area, ghost_in_circle, ghost_in_circle_extended, in_circle, orientation, PredicateStats};
pub use thresholds::Thresholds;
