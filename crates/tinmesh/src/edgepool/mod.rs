//! Page-allocated arena of quad-edges.
//!
//! Purpose
//! - Own every half-edge slot the mesh ever allocates. `Mesh` never stores
//!   edges directly; it only ever holds [`EdgeId`]s and asks the pool to
//!   dereference, allocate, or free them. This is the "cyclic reference
//!   between edges" problem dissolved into integer indices, per the design
//!   notes: forward/reverse/dual are all index arithmetic, not pointers.
//!
//! Invariant
//! - After every public operation, at least one page has at least one free
//!   pair: a new page is pushed eagerly the moment the last page with space
//!   becomes full.

mod page;
mod types;

use crate::vertex::SiteId;
use page::Page;
pub use types::EdgeId;
use types::HalfEdgeSlot;

pub struct EdgePool {
    pages: Vec<Page>,
    page_size: usize,
    /// Head of the singly-linked list (via `Page::next_with_space`) of pages
    /// known to have at least one free pair.
    free_page_head: Option<u32>,
}

impl EdgePool {
    pub fn new(page_size: usize) -> Self {
        let page_size = page_size.next_multiple_of(2).max(2);
        let mut pool = Self {
            pages: Vec::new(),
            page_size,
            free_page_head: None,
        };
        pool.push_page();
        pool
    }

    fn push_page(&mut self) {
        let index = self.pages.len() as u32;
        let mut page = Page::new(self.page_size);
        page.next_with_space = self.free_page_head;
        page.in_free_list = true;
        self.pages.push(page);
        self.free_page_head = Some(index);
    }

    /// Allocates a fresh undirected edge with the given origins, returning
    /// its base (even) [`EdgeId`]. `forward` on both sides is initialized to
    /// the edge's own dual — a placeholder two-cycle, per §4.2, until the
    /// caller splices it into a real triangle.
    pub fn allocate(&mut self, origin_a: Option<SiteId>, origin_b: Option<SiteId>) -> EdgeId {
        let page_index = self.free_page_head.expect("invariant: a page with space always exists");
        let page = &mut self.pages[page_index as usize];
        let pair = page.allocate_pair().expect("page on the free list must have space");
        if !page.has_space() {
            self.free_page_head = page.next_with_space;
            page.in_free_list = false;
            page.next_with_space = None;
        }

        let local_a = (pair as usize) * 2;
        let local_b = local_a + 1;
        let base = EdgeId((page_index as usize * self.page_size + local_a) as u32);
        let dual = base.dual();

        let page = &mut self.pages[page_index as usize];
        *page.slot_mut(local_a) = HalfEdgeSlot {
            origin: origin_a,
            forward: dual,
        };
        *page.slot_mut(local_b) = HalfEdgeSlot {
            origin: origin_b,
            forward: base,
        };

        if self.free_page_head.is_none() {
            self.push_page();
        }
        base
    }

    /// Returns an undirected edge's slots to the pool. `edge` may be either
    /// side; both sides are freed together.
    pub fn deallocate(&mut self, edge: EdgeId) {
        let base = edge.base();
        let (page_index, local, pair) = self.locate(base);
        let page = &mut self.pages[page_index];
        *page.slot_mut(local) = HalfEdgeSlot::EMPTY;
        *page.slot_mut(local + 1) = HalfEdgeSlot::EMPTY;
        let was_full = page.deallocate_pair(pair as u32);
        if was_full && !page.in_free_list {
            page.next_with_space = self.free_page_head;
            page.in_free_list = true;
            self.free_page_head = Some(page_index as u32);
        }
        if self.free_page_head.is_none() {
            self.push_page();
        }
    }

    #[inline]
    pub fn origin(&self, edge: EdgeId) -> Option<SiteId> {
        let (page_index, local, _) = self.locate(edge);
        self.pages[page_index].slot(local).origin
    }

    pub fn set_origin(&mut self, edge: EdgeId, origin: Option<SiteId>) {
        let (page_index, local, _) = self.locate(edge);
        self.pages[page_index].slot_mut(local).origin = origin;
    }

    #[inline]
    pub fn forward(&self, edge: EdgeId) -> EdgeId {
        let (page_index, local, _) = self.locate(edge);
        self.pages[page_index].slot(local).forward
    }

    pub fn set_forward(&mut self, edge: EdgeId, forward: EdgeId) {
        let (page_index, local, _) = self.locate(edge);
        self.pages[page_index].slot_mut(local).forward = forward;
    }

    /// `reverse(e) == forward(forward(e))` for any edge bounding a
    /// triangular face; every face in this mesh (interior or ghost) is
    /// triangular, so this holds universally once the mesh is linked.
    #[inline]
    pub fn reverse(&self, edge: EdgeId) -> EdgeId {
        self.forward(self.forward(edge))
    }

    #[inline]
    pub fn dual(&self, edge: EdgeId) -> EdgeId {
        edge.dual()
    }

    /// Next outgoing edge around `origin(edge)`, in the direction opposite
    /// to face traversal (the usual `twin . prev` trick for a half-edge mesh
    /// with only `Lnext` stored explicitly).
    #[inline]
    pub fn pinwheel_next(&self, edge: EdgeId) -> EdgeId {
        self.dual(self.reverse(edge))
    }

    #[inline]
    pub fn is_ghost(&self, edge: EdgeId) -> bool {
        self.origin(edge).is_none() || self.origin(edge.dual()).is_none()
    }

    fn locate(&self, edge: EdgeId) -> (usize, usize, usize) {
        let page_index = edge.index() / self.page_size;
        let local = edge.index() % self.page_size;
        (page_index, local, local / 2)
    }

    /// Visits every currently allocated base edge exactly once, in
    /// page/slot layout order.
    pub fn iter_base_edges(&self) -> impl Iterator<Item = EdgeId> + '_ {
        let page_size = self.page_size;
        self.pages.iter().enumerate().flat_map(move |(page_index, page)| {
            (0..page.pairs()).filter_map(move |pair| {
                if page.is_pair_allocated(pair) {
                    Some(EdgeId((page_index * page_size + pair * 2) as u32))
                } else {
                    None
                }
            })
        })
    }

    /// Upper bound on any currently-valid `EdgeId`, for sizing visited-flag
    /// bitsets. Not a tight bound: it is total provisioned capacity, not the
    /// highest allocated index.
    pub fn max_allocated_index(&self) -> usize {
        self.pages.len() * self.page_size
    }

    pub fn allocated_edge_count(&self) -> usize {
        self.pages.iter().map(|p| p.allocated_pairs() as usize).sum()
    }

    /// Reinitializes every already-provisioned page to a fresh empty state,
    /// keeping their capacity. Used by `Mesh::clear`.
    pub fn reset(&mut self) {
        for (index, page) in self.pages.iter_mut().enumerate() {
            page.reset();
            page.next_with_space = if index + 1 < self.pages.len() {
                Some((index + 1) as u32)
            } else {
                None
            };
            page.in_free_list = true;
        }
        self.free_page_head = if self.pages.is_empty() { None } else { Some(0) };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site(n: u32) -> Option<SiteId> {
        Some(SiteId(n))
    }

    #[test]
    fn allocate_sets_origins_and_placeholder_forward() {
        let mut pool = EdgePool::new(8);
        let e = pool.allocate(site(1), site(2));
        assert_eq!(pool.origin(e), site(1));
        assert_eq!(pool.origin(e.dual()), site(2));
        assert_eq!(pool.forward(e), e.dual());
        assert_eq!(pool.forward(e.dual()), e);
    }

    #[test]
    fn dual_is_involutive_and_differs_by_one_bit() {
        let mut pool = EdgePool::new(8);
        let e = pool.allocate(site(1), site(2));
        assert_eq!(pool.dual(pool.dual(e)), e);
        assert_eq!(e.0 ^ pool.dual(e).0, 1);
    }

    #[test]
    fn deallocate_then_reallocate_reuses_slot() {
        let mut pool = EdgePool::new(4); // 2 pairs per page
        let e1 = pool.allocate(site(1), site(2));
        let before = pool.allocated_edge_count();
        pool.deallocate(e1);
        assert_eq!(pool.allocated_edge_count(), before - 1);
        let e2 = pool.allocate(site(3), site(4));
        assert_eq!(pool.allocated_edge_count(), before);
        assert_eq!(pool.origin(e2), site(3));
    }

    #[test]
    fn grows_pages_eagerly_and_keeps_one_with_space() {
        let mut pool = EdgePool::new(4); // 2 pairs per page
        let _a = pool.allocate(site(1), site(2));
        let _b = pool.allocate(site(3), site(4));
        // Page is now full; a new page must already exist.
        assert!(pool.free_page_head.is_some());
        let _c = pool.allocate(site(5), site(6));
        assert_eq!(pool.allocated_edge_count(), 3);
    }

    #[test]
    fn iterate_visits_each_live_base_edge_once() {
        let mut pool = EdgePool::new(4);
        let edges: Vec<_> = (0..5).map(|i| pool.allocate(site(i), site(i + 100))).collect();
        pool.deallocate(edges[2]);
        let visited: Vec<_> = pool.iter_base_edges().collect();
        assert_eq!(visited.len(), 4);
        for e in &visited {
            assert!(e.is_base());
        }
        assert!(!visited.contains(&edges[2]));
    }
}
