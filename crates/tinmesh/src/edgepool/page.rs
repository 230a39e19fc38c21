//! A single fixed-capacity page of half-edge slots.
//!
//! Purpose
//! - Own a contiguous `Vec` of half-edge slots plus an intrusive free list
//!   over undirected-edge *pairs* (allocation/deallocation always moves a
//!   base edge and its dual together, so the free list is threaded at pair
//!   granularity, not per half-edge).

use super::types::HalfEdgeSlot;
use crate::bitset::BitSet;

pub(crate) struct Page {
    /// `half_edges.len() == page_size` (even); slot `2k`/`2k+1` form pair `k`.
    half_edges: Vec<HalfEdgeSlot>,
    /// Intrusive singly-linked free list over pair indices `0..pairs()`.
    free_pair_next: Vec<Option<u32>>,
    free_pair_head: Option<u32>,
    /// `true` at pair index `k` iff pair `k` is currently allocated (ghost
    /// edges legitimately have `origin == None`, so allocation state cannot
    /// be inferred from slot contents alone).
    allocated: BitSet,
    allocated_pairs: u32,
    /// Threads this page into `EdgePool`'s list of pages with free slots.
    pub(crate) next_with_space: Option<u32>,
    pub(crate) in_free_list: bool,
}

impl Page {
    pub(crate) fn new(page_size: usize) -> Self {
        debug_assert!(
            page_size >= 2 && page_size % 2 == 0,
            "page size must be a positive even number"
        );
        let pairs = page_size / 2;
        let mut free_pair_next = Vec::with_capacity(pairs);
        for k in 0..pairs {
            free_pair_next.push(if k + 1 < pairs { Some((k + 1) as u32) } else { None });
        }
        Self {
            half_edges: vec![HalfEdgeSlot::EMPTY; page_size],
            free_pair_next,
            free_pair_head: Some(0),
            allocated: BitSet::with_capacity(pairs),
            allocated_pairs: 0,
            next_with_space: None,
            in_free_list: false,
        }
    }

    #[inline]
    pub(crate) fn page_size(&self) -> usize {
        self.half_edges.len()
    }

    #[inline]
    pub(crate) fn has_space(&self) -> bool {
        self.free_pair_head.is_some()
    }

    #[inline]
    pub(crate) fn slot(&self, local: usize) -> &HalfEdgeSlot {
        &self.half_edges[local]
    }

    #[inline]
    pub(crate) fn slot_mut(&mut self, local: usize) -> &mut HalfEdgeSlot {
        &mut self.half_edges[local]
    }

    #[inline]
    pub(crate) fn is_pair_allocated(&self, pair: usize) -> bool {
        self.allocated.get(pair)
    }

    /// Returns the local pair index of a newly allocated pair, or `None` if
    /// this page is full.
    pub(crate) fn allocate_pair(&mut self) -> Option<u32> {
        let pair = self.free_pair_head?;
        self.free_pair_head = self.free_pair_next[pair as usize];
        self.allocated.set(pair as usize);
        self.allocated_pairs += 1;
        Some(pair)
    }

    /// Returns the pair to the free list. Reports whether the page was full
    /// immediately before this call (so the pool can re-thread it).
    pub(crate) fn deallocate_pair(&mut self, pair: u32) -> bool {
        let was_full = !self.has_space();
        self.allocated.clear(pair as usize);
        self.free_pair_next[pair as usize] = self.free_pair_head;
        self.free_pair_head = Some(pair);
        self.allocated_pairs -= 1;
        was_full
    }

    #[inline]
    pub(crate) fn pairs(&self) -> usize {
        self.free_pair_next.len()
    }

    #[inline]
    pub(crate) fn allocated_pairs(&self) -> u32 {
        self.allocated_pairs
    }

    /// Reinitializes this page to a fresh empty state in place, keeping its
    /// already-provisioned `Vec` capacity.
    pub(crate) fn reset(&mut self) {
        let pairs = self.pairs();
        for slot in self.half_edges.iter_mut() {
            *slot = HalfEdgeSlot::EMPTY;
        }
        for k in 0..pairs {
            self.free_pair_next[k] = if k + 1 < pairs { Some((k + 1) as u32) } else { None };
        }
        self.free_pair_head = Some(0);
        self.allocated.clear_all();
        self.allocated_pairs = 0;
    }
}
