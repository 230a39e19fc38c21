//! Cooperative cancellation and progress reporting for batch operations.
//!
//! Purpose
//! - §5 requires batch insertion and constraint installation to accept an
//!   optional cancellation/progress callback polled at a coarse cadence.
//!   Modeling it as a trait (rather than a concrete closure type) lets a
//!   caller plug in whatever progress UI it has without this crate
//!   depending on one — the out-of-scope list explicitly excludes progress
//!   monitors as a concrete feature, but the hook itself is part of the
//!   contract.

/// Polled during long-running batch operations. `is_cancelled` is checked at
/// the cadence described in §5 (roughly every 1% of completion, or every
/// 10,000 inserts, whichever is larger); `report_progress` is called at the
/// same cadence.
pub trait Monitor {
    fn is_cancelled(&self) -> bool {
        false
    }
    fn report_progress(&self, _completed: usize, _total: usize) {}
}

/// No-op monitor used when the caller does not supply one.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullMonitor;

impl Monitor for NullMonitor {}

/// Polling cadence per §5: once per 1% of `total`, or every 10,000 items,
/// whichever is larger (i.e. the coarser, less frequent cadence).
pub(crate) fn poll_interval(total: usize) -> usize {
    (total / 100).max(10_000)
}
