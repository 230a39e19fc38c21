//! The mesh's private, deterministic random source.
//!
//! Purpose
//! - Bootstrap triple sampling and the Lawson walk's stochastic tie-break
//!   both need randomness, but per §5 "a single global random source
//!   (deterministic per-mesh seed) ... is not a shared resource": each mesh
//!   owns one `StdRng`, seeded once from `MeshConfig::random_seed`, and
//!   nothing outside the mesh ever touches it. Mirrors the teacher
//!   geometry kernels' `StdRng`/`SeedableRng` usage for reproducible
//!   sampling, without the replay-token indirection those kernels need for
//!   an external benchmark harness — this crate only ever needs "the next
//!   draw", not "redraw sample #k".

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub(crate) struct MeshRng {
    inner: StdRng,
}

impl MeshRng {
    pub(crate) fn from_seed(seed: u64) -> Self {
        Self {
            inner: StdRng::seed_from_u64(seed),
        }
    }

    /// Biased coin flip used to break ties during the stochastic Lawson
    /// walk: `true` with probability `bias`.
    #[inline]
    pub(crate) fn biased_bool(&mut self, bias: f64) -> bool {
        self.inner.gen_range(0.0..1.0) < bias
    }

    /// Draws `count` distinct indices in `0..n` without replacement, for
    /// bootstrap's random-triple sampling. Returns fewer than `count` only
    /// if `n < count`.
    pub(crate) fn sample_distinct(&mut self, n: usize, count: usize) -> Vec<usize> {
        let count = count.min(n);
        let mut pool: Vec<usize> = (0..n).collect();
        let mut out = Vec::with_capacity(count);
        for _ in 0..count {
            let remaining = pool.len();
            let pick = self.inner.gen_range(0..remaining);
            out.push(pool.swap_remove(pick));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_distinct_never_repeats_and_respects_bounds() {
        let mut rng = MeshRng::from_seed(42);
        let picks = rng.sample_distinct(10, 4);
        assert_eq!(picks.len(), 4);
        let mut sorted = picks.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), 4);
        assert!(picks.iter().all(|&i| i < 10));
    }

    #[test]
    fn sample_distinct_clamps_to_population_size() {
        let mut rng = MeshRng::from_seed(7);
        let picks = rng.sample_distinct(2, 5);
        assert_eq!(picks.len(), 2);
    }
}
