//! Mesh configuration.
//!
//! Purpose
//! - A plain, `Copy`-able settings struct threaded explicitly into
//!   `Mesh::new`, in the same spirit as `GeomCfg`/`SearchCfg` in the
//!   geometry kernels this crate descends from: no environment variables,
//!   no ambient global state (per §6, the core has neither).

use crate::vertex::MergeRule;

/// Half-edges per edge-pool page. Must be even; rounded up if not.
pub const DEFAULT_EDGE_POOL_PAGE_SIZE: usize = 1024;

#[derive(Clone, Copy, Debug)]
pub struct MeshConfig {
    /// Positive scale parameter controlling every derived threshold.
    pub nominal_point_spacing: f64,
    /// Rule used to resolve `z` when vertices coincide within tolerance.
    pub merge_rule: MergeRule,
    /// Half-edges allocated per edge-pool page.
    pub edge_pool_page_size: usize,
    /// Deterministic seed for the mesh's RNG (bootstrap triple sampling,
    /// Lawson-walk stochastic tie-break).
    pub random_seed: u64,
}

impl MeshConfig {
    pub fn new(nominal_point_spacing: f64) -> Self {
        Self {
            nominal_point_spacing,
            ..Self::default()
        }
    }
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            nominal_point_spacing: 1.0,
            merge_rule: MergeRule::First,
            edge_pool_page_size: DEFAULT_EDGE_POOL_PAGE_SIZE,
            random_seed: 0x5EED_u64,
        }
    }
}
