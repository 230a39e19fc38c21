//! A small growable bitset used for allocation bitmaps and visited-flags.
//!
//! Purpose
//! - The edge pool needs an O(1) "is this pair free" bitmap per page; the
//!   mesh iterators need a "have I visited this edge" bitmap sized from
//!   `EdgePool::max_allocated_index`. Both are plain fixed-size bit vectors,
//!   so one small hand-rolled type covers both rather than pulling in a
//!   bitset crate for two call sites.

const WORD_BITS: usize = u64::BITS as usize;

#[derive(Clone, Debug, Default)]
pub(crate) struct BitSet {
    words: Vec<u64>,
}

impl BitSet {
    pub(crate) fn with_capacity(bits: usize) -> Self {
        Self {
            words: vec![0u64; bits.div_ceil(WORD_BITS)],
        }
    }

    #[inline]
    pub(crate) fn get(&self, index: usize) -> bool {
        let word = index / WORD_BITS;
        match self.words.get(word) {
            Some(w) => (w >> (index % WORD_BITS)) & 1 != 0,
            None => false,
        }
    }

    #[inline]
    pub(crate) fn set(&mut self, index: usize) {
        let word = index / WORD_BITS;
        if word >= self.words.len() {
            self.words.resize(word + 1, 0);
        }
        self.words[word] |= 1u64 << (index % WORD_BITS);
    }

    #[inline]
    pub(crate) fn clear(&mut self, index: usize) {
        let word = index / WORD_BITS;
        if let Some(w) = self.words.get_mut(word) {
            *w &= !(1u64 << (index % WORD_BITS));
        }
    }

    /// Sets `index` and reports whether it was already set.
    #[inline]
    pub(crate) fn set_get(&mut self, index: usize) -> bool {
        let was_set = self.get(index);
        self.set(index);
        was_set
    }

    /// Clears every bit, keeping the allocated word capacity.
    #[inline]
    pub(crate) fn clear_all(&mut self) {
        for w in self.words.iter_mut() {
            *w = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grows_on_demand_and_round_trips() {
        let mut bits = BitSet::with_capacity(4);
        assert!(!bits.get(100));
        bits.set(100);
        assert!(bits.get(100));
        bits.clear(100);
        assert!(!bits.get(100));
    }

    #[test]
    fn set_get_reports_prior_state() {
        let mut bits = BitSet::with_capacity(8);
        assert!(!bits.set_get(3));
        assert!(bits.set_get(3));
    }
}
