//! The triangulated mesh: site arena, edge pool, and the operations wired
//! on top of them.
//!
//! Purpose
//! - `Mesh` is the single owner of every allocation a triangulation needs.
//!   Submodules each carry one concern (bootstrap, point location,
//!   insertion, removal) as `impl Mesh` blocks, the way the geometry
//!   kernels this crate descends from split a large type's behavior across
//!   `build.rs` / `dfs.rs` rather than one monolithic file.

mod bootstrap;
mod constrain;
mod flip;
mod insert;
mod locate;
mod remove;
mod split;

use crate::bounds::Aabb;
use crate::config::MeshConfig;
use crate::constraints::Constraint;
use crate::edgepool::{EdgeId, EdgePool};
use crate::kernel::Thresholds;
use crate::monitor::{poll_interval, Monitor};
use crate::rand_source::MeshRng;
use crate::stats::MeshStatistics;
use crate::vertex::{MergeRule, Site, SiteId, Vertex, VertexId};
use nalgebra::Point2;
use smallvec::SmallVec;
use std::collections::HashMap;

pub use bootstrap::BootstrapFailure;
pub use insert::InsertOutcome;

/// Owns a triangulation's entire state: the vertex/site arena, the
/// quad-edge pool, and the bookkeeping (hull bounds, RNG, statistics) the
/// incremental algorithms need.
pub struct Mesh {
    config: MeshConfig,
    thresholds: Thresholds,
    sites: Vec<Site>,
    free_site_head: Option<u32>,
    pool: EdgePool,
    /// A recently-touched edge, used as the starting point for the next
    /// Lawson walk. Any live edge works; this is purely a locality hint.
    search_edge: Option<EdgeId>,
    bounds: Option<Aabb>,
    bootstrapped: bool,
    /// Vertices accumulated before bootstrap succeeds. Drained (and
    /// inserted one at a time) the moment bootstrap finds a non-degenerate
    /// triangle.
    pending: Vec<Vertex>,
    next_vertex_id: u64,
    rng: MeshRng,
    stats: MeshStatistics,
    /// A handful of edge ids freed by the most recent mutation, reused
    /// before falling back to the pool's own free list. Keeps bursts of
    /// star-connect / ear-closing churn from bouncing through the pool's
    /// page search on every single edge.
    recently_freed_edges: SmallVec<[EdgeId; 8]>,
    disposed: bool,
    /// Maps a vertex's stable id to the site currently holding it, so
    /// removal and constraint installation don't need a linear scan over
    /// the site arena.
    vertex_index: HashMap<VertexId, SiteId>,
    /// Base-edge index -> owning constraint index, for every edge forced in
    /// as a linear-constraint or polygon-boundary segment. Also the set that
    /// blocks a later constraint's edge-forcing from flipping these away.
    constrained_edges: HashMap<u32, u32>,
    /// Base-edge index -> polygon constraint index, for every edge (boundary
    /// or interior) flood-marked as belonging to that polygon's region.
    region_edges: HashMap<u32, u32>,
    constraints: Vec<Constraint>,
    constraints_installed: bool,
}

impl Mesh {
    pub fn new(config: MeshConfig) -> Self {
        let thresholds = Thresholds::from_nominal_spacing(config.nominal_point_spacing);
        let rng = MeshRng::from_seed(config.random_seed);
        let pool = EdgePool::new(config.edge_pool_page_size);
        Self {
            config,
            thresholds,
            sites: Vec::new(),
            free_site_head: None,
            pool,
            search_edge: None,
            bounds: None,
            bootstrapped: false,
            pending: Vec::new(),
            next_vertex_id: 1,
            rng,
            stats: MeshStatistics::default(),
            recently_freed_edges: SmallVec::new(),
            disposed: false,
            vertex_index: HashMap::new(),
            constrained_edges: HashMap::new(),
            region_edges: HashMap::new(),
            constraints: Vec::new(),
            constraints_installed: false,
        }
    }

    #[inline]
    pub fn nominal_point_spacing(&self) -> f64 {
        self.config.nominal_point_spacing
    }

    #[inline]
    pub fn merge_rule(&self) -> MergeRule {
        self.config.merge_rule
    }

    #[inline]
    pub fn is_bootstrapped(&self) -> bool {
        self.bootstrapped
    }

    #[inline]
    pub fn bounds(&self) -> Option<Aabb> {
        self.bounds
    }

    #[inline]
    pub(crate) fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// Adds one vertex, returning its stable identifier. If this call
    /// causes the mesh to bootstrap, every previously pending vertex is
    /// folded in before returning.
    pub fn add_vertex(&mut self, x: f64, y: f64, z: f64) -> VertexId {
        debug_assert!(!self.disposed, "add_vertex called on a disposed mesh");
        let id = self.next_vertex_id();
        let vertex = Vertex::new(id, x, y, z);
        self.expand_bounds(vertex.point());
        if self.bootstrapped {
            self.insert_vertex(vertex);
        } else {
            self.pending.push(vertex);
            self.try_bootstrap_pending();
        }
        id
    }

    /// Adds a batch of vertices, polling `monitor` at the cadence described
    /// by [`poll_interval`]. Stops early (returning only the ids assigned so
    /// far) if `monitor` reports cancellation.
    pub fn add_vertices(&mut self, points: &[(f64, f64, f64)], monitor: &dyn Monitor) -> Vec<VertexId> {
        debug_assert!(!self.disposed, "add_vertices called on a disposed mesh");
        let total = points.len();
        let interval = poll_interval(total);
        let mut ids = Vec::with_capacity(total);
        for (i, &(x, y, z)) in points.iter().enumerate() {
            if i % interval == 0 && monitor.is_cancelled() {
                break;
            }
            ids.push(self.add_vertex(x, y, z));
            if i % interval == 0 {
                monitor.report_progress(i, total);
            }
        }
        monitor.report_progress(total, total);
        ids
    }

    /// Removes the vertex with `id`, restoring the Delaunay property of the
    /// surrounding cavity. Returns `false` if `id` is not currently present
    /// (including: mesh not yet bootstrapped, or the vertex was only ever
    /// pending and never incorporated into the topology).
    pub fn remove_vertex(&mut self, id: VertexId) -> bool {
        debug_assert!(!self.disposed, "remove_vertex called on a disposed mesh");
        if !self.bootstrapped {
            if let Some(pos) = self.pending.iter().position(|v| v.id == id) {
                self.pending.remove(pos);
                return true;
            }
            return false;
        }
        self.remove_vertex_impl(id)
    }

    /// Returns the mesh to an unbootstrapped, empty state while keeping the
    /// edge pool's already-provisioned pages (avoids re-growing the pool on
    /// the next round of insertions into the same `Mesh`).
    pub fn clear(&mut self) {
        self.sites.clear();
        self.free_site_head = None;
        self.pool.reset();
        self.search_edge = None;
        self.bounds = None;
        self.bootstrapped = false;
        self.pending.clear();
        self.stats = MeshStatistics::default();
        self.recently_freed_edges.clear();
        self.vertex_index.clear();
        self.constrained_edges.clear();
        self.region_edges.clear();
        self.constraints.clear();
        self.constraints_installed = false;
    }

    /// Releases the mesh's resources and marks it unusable. Subsequent
    /// mutating calls are no-ops; this mirrors the explicit dispose/cleanup
    /// lifecycle the original library exposes for callers that pool and
    /// reuse large objects outside Rust's ownership model.
    pub fn dispose(&mut self) {
        self.sites = Vec::new();
        self.pool = EdgePool::new(self.config.edge_pool_page_size);
        self.pending = Vec::new();
        self.bootstrapped = false;
        self.bounds = None;
        self.vertex_index.clear();
        self.constrained_edges.clear();
        self.region_edges.clear();
        self.constraints.clear();
        self.constraints_installed = false;
        self.disposed = true;
    }

    /// Constraints installed so far, in installation order.
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn statistics(&self) -> MeshStatistics {
        let mut stats = self.stats;
        stats.vertex_count = self
            .sites
            .iter()
            .map(|s| match s {
                Site::Vertex(_) => 1,
                Site::Group(g) => g.len(),
                Site::Free { .. } => 0,
            })
            .sum::<usize>()
            + self.pending.len();
        stats.synthetic_vertex_count = self
            .sites
            .iter()
            .flat_map(|s| match s {
                Site::Vertex(v) => {
                    if v.is_synthetic() {
                        1
                    } else {
                        0
                    }
                }
                _ => 0,
            })
            .sum();
        stats.merger_group_count = self.sites.iter().filter(|s| matches!(s, Site::Group(_))).count();
        stats.edge_count = self.pool.allocated_edge_count();
        stats.triangle_count = self.triangle_count();
        stats.constraint_count = self.constraints.len();
        stats
    }

    fn triangle_count(&self) -> usize {
        crate::query::triangles(self).count()
    }

    fn next_vertex_id(&mut self) -> VertexId {
        let id = VertexId(self.next_vertex_id);
        self.next_vertex_id += 1;
        id
    }

    fn expand_bounds(&mut self, p: Point2<f64>) {
        match &mut self.bounds {
            Some(b) => b.expand(p),
            None => self.bounds = Some(Aabb::singleton(p)),
        }
    }

    pub(crate) fn alloc_site(&mut self, site: Site) -> SiteId {
        let id = if let Some(free) = self.free_site_head {
            let next = match &self.sites[free as usize] {
                Site::Free { next_free } => *next_free,
                _ => unreachable!("free list pointed at an occupied slot"),
            };
            self.free_site_head = next;
            self.sites[free as usize] = site;
            SiteId(free)
        } else {
            let id = self.sites.len() as u32;
            self.sites.push(site);
            SiteId(id)
        };
        self.reindex_site(id);
        id
    }

    pub(crate) fn free_site(&mut self, site: SiteId) {
        match &self.sites[site.0 as usize] {
            Site::Vertex(v) => {
                self.vertex_index.remove(&v.id);
            }
            Site::Group(g) => {
                for m in g.members.iter() {
                    self.vertex_index.remove(&m.id);
                }
            }
            Site::Free { .. } => {}
        }
        self.sites[site.0 as usize] = Site::Free { next_free: self.free_site_head };
        self.free_site_head = Some(site.0);
    }

    /// Re-registers every vertex id currently held at `site` in the lookup
    /// index. Called after `alloc_site` and whenever a site's contents
    /// change shape (merge, group shrink).
    pub(crate) fn reindex_site(&mut self, site: SiteId) {
        match &self.sites[site.0 as usize] {
            Site::Vertex(v) => {
                self.vertex_index.insert(v.id, site);
            }
            Site::Group(g) => {
                for m in g.members.iter() {
                    self.vertex_index.insert(m.id, site);
                }
            }
            Site::Free { .. } => {}
        }
    }

    /// Site currently holding `id`, if the vertex is still present.
    pub(crate) fn site_of(&self, id: VertexId) -> Option<SiteId> {
        self.vertex_index.get(&id).copied()
    }

    /// Any one directed edge with origin `site`, found by scanning live
    /// edges. Used by removal and constraint edge-forcing, both of which
    /// are local-degree operations where this scan is not the bottleneck.
    pub(crate) fn find_any_edge_from(&self, site: SiteId) -> Option<EdgeId> {
        for e in self.pool.iter_base_edges() {
            if self.pool.origin(e) == Some(site) {
                return Some(e);
            }
            if self.pool.origin(e.dual()) == Some(site) {
                return Some(e.dual());
            }
        }
        None
    }

    /// The edge `site -> other`, if one currently exists, found by
    /// pinwheeling around `site`.
    pub(crate) fn find_edge_between(&self, site: SiteId, other: SiteId) -> Option<EdgeId> {
        let e0 = self.find_any_edge_from(site)?;
        let mut spoke = e0;
        loop {
            if self.pool.origin(self.pool.forward(spoke)) == Some(other) {
                return Some(spoke);
            }
            spoke = self.pool.pinwheel_next(spoke);
            if spoke == e0 {
                return None;
            }
        }
    }

    #[inline]
    pub(crate) fn site(&self, id: SiteId) -> &Site {
        &self.sites[id.0 as usize]
    }

    #[inline]
    pub(crate) fn site_mut(&mut self, id: SiteId) -> &mut Site {
        &mut self.sites[id.0 as usize]
    }

    /// Point carried by an edge's origin slot; `None` for a ghost endpoint.
    pub(crate) fn origin_point(&self, edge: EdgeId) -> Option<Point2<f64>> {
        self.pool.origin(edge).and_then(|s| self.site(s).point())
    }

    #[inline]
    pub(crate) fn pool(&self) -> &EdgePool {
        &self.pool
    }

    #[inline]
    pub(crate) fn pool_mut(&mut self) -> &mut EdgePool {
        &mut self.pool
    }

    pub(crate) fn rng(&mut self) -> &mut MeshRng {
        &mut self.rng
    }

    pub(crate) fn stats_mut(&mut self) -> &mut MeshStatistics {
        &mut self.stats
    }

    pub(crate) fn set_search_edge(&mut self, edge: EdgeId) {
        self.search_edge = Some(edge);
    }

    pub(crate) fn search_edge(&self) -> Option<EdgeId> {
        self.search_edge
    }

    /// Allocates an undirected edge, preferring a recently freed slot over
    /// asking the pool for a fresh one.
    pub(crate) fn allocate_edge(&mut self, a: Option<SiteId>, b: Option<SiteId>) -> EdgeId {
        if let Some(reused) = self.recently_freed_edges.pop() {
            self.pool.set_origin(reused, a);
            self.pool.set_origin(reused.dual(), b);
            self.pool.set_forward(reused, reused.dual());
            self.pool.set_forward(reused.dual(), reused);
            return reused;
        }
        self.pool.allocate(a, b)
    }

    pub(crate) fn free_edge(&mut self, edge: EdgeId) {
        if self.recently_freed_edges.len() < self.recently_freed_edges.capacity() {
            self.recently_freed_edges.push(edge.base());
        } else {
            self.pool.deallocate(edge);
        }
    }

    /// Flags `id` as participating in an installed constraint's vertex
    /// list, wherever it currently lives in the site arena.
    pub(crate) fn mark_vertex_constraint_member(&mut self, id: VertexId) {
        let Some(site) = self.site_of(id) else { return };
        match self.site_mut(site) {
            Site::Vertex(v) => v.flags.constraint_member = true,
            Site::Group(g) => {
                for m in g.members.iter_mut() {
                    if m.id == id {
                        m.flags.constraint_member = true;
                    }
                }
                if g.representative.id == id {
                    g.representative.flags.constraint_member = true;
                }
            }
            Site::Free { .. } => {}
        }
    }

    /// Flags `id` as a core-introduced vertex (densification, conformance
    /// restoration) rather than one the caller supplied.
    pub(crate) fn mark_vertex_synthetic(&mut self, id: VertexId) {
        let Some(site) = self.site_of(id) else { return };
        match self.site_mut(site) {
            Site::Vertex(v) => v.flags.synthetic = true,
            Site::Group(g) => {
                for m in g.members.iter_mut() {
                    if m.id == id {
                        m.flags.synthetic = true;
                    }
                }
                if g.representative.id == id {
                    g.representative.flags.synthetic = true;
                }
            }
            Site::Free { .. } => {}
        }
    }

    pub(crate) fn constraints_mut(&mut self) -> &mut Vec<Constraint> {
        &mut self.constraints
    }

    pub(crate) fn constraints_installed(&self) -> bool {
        self.constraints_installed
    }

    pub(crate) fn set_constraints_installed(&mut self, installed: bool) {
        self.constraints_installed = installed;
    }
}
