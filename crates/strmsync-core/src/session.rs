// ── Selection session ──
//
// One explicit value per operator session: the current catalog index,
// the live allow-list, and the last-saved snapshot. Callers serialize
// access; nothing in here is shared between sessions.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::allow::AllowList;
use crate::allow::mutate::{self, Mutation, Pruned};
use crate::allow::state::{ContainerSelection, SelectionState};
use crate::catalog::CatalogIndex;
use crate::filter::FilterMode;
use crate::model::ContentKind;
use crate::pending::SnapshotTracker;

// ── Display rows ─────────────────────────────────────────────────

/// Everything a consumer needs to render one container row.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContainerView {
    pub kind: ContentKind,
    pub key: String,
    pub total: usize,
    pub selected: usize,
    pub state: SelectionState,
    pub sticky_full: bool,
    pub checked: bool,
    pub indeterminate: bool,
    pub pending: bool,
}

/// One leaf row under a container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeafView {
    pub kind: ContentKind,
    pub container: String,
    pub leaf: String,
    pub checked: bool,
    pub pending: bool,
}

/// Number of pending containers per kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PendingSummary {
    pub livetv: usize,
    pub movies: usize,
    pub series: usize,
    pub total: usize,
}

impl PendingSummary {
    pub fn get(&self, kind: ContentKind) -> usize {
        match kind {
            ContentKind::LiveTv => self.livetv,
            ContentKind::Movies => self.movies,
            ContentKind::Series => self.series,
        }
    }
}

// ── SelectionSession ─────────────────────────────────────────────

/// The engine's single entry point.
///
/// Construction is the initial-load checkpoint. Mutations never touch the
/// snapshot; only [`checkpoint`](Self::checkpoint) does, which callers
/// invoke after every successful save.
#[derive(Debug, Clone)]
pub struct SelectionSession {
    catalog: Arc<CatalogIndex>,
    allow: AllowList,
    tracker: SnapshotTracker,
}

impl SelectionSession {
    pub fn new(catalog: impl Into<Arc<CatalogIndex>>, allow: AllowList) -> Self {
        let mut session = Self {
            catalog: catalog.into(),
            allow,
            tracker: SnapshotTracker::new(),
        };
        session.checkpoint();
        session
    }

    /// Swap in a previously stored, unsaved allow-list. The snapshot stays
    /// at the saved state, so the draft's changes read as pending.
    pub fn resume(&mut self, draft: AllowList) {
        debug!("resuming unsaved selection draft");
        self.allow = draft;
    }

    /// Replace the catalog wholesale (playlist refresh). Selections for
    /// content that vanished are kept as-is.
    pub fn replace_catalog(&mut self, catalog: impl Into<Arc<CatalogIndex>>) {
        self.catalog = catalog.into();
        info!("catalog replaced");
    }

    pub fn checkpoint(&mut self) {
        self.tracker.checkpoint(&self.allow);
    }

    pub fn catalog(&self) -> &Arc<CatalogIndex> {
        &self.catalog
    }

    pub fn allow(&self) -> &AllowList {
        &self.allow
    }

    pub fn into_allow(self) -> AllowList {
        self.allow
    }

    pub fn tracker(&self) -> &SnapshotTracker {
        &self.tracker
    }

    /// `true` when the live allow-list differs from the snapshot in any
    /// way, including entries for content no longer in the catalog.
    pub fn is_dirty(&self) -> bool {
        self.tracker.snapshot().is_some_and(|saved| *saved != self.allow)
    }

    // ── Catalog lookups ──────────────────────────────────────────

    pub fn leaves_of(&self, kind: ContentKind, container: &str) -> &[String] {
        self.catalog.leaves_of(kind, container)
    }

    pub fn total_leaves(&self, kind: ContentKind, container: &str) -> usize {
        self.catalog.total_leaves(kind, container)
    }

    // ── Derivation ───────────────────────────────────────────────

    pub fn container_selection(&self, kind: ContentKind, container: &str) -> ContainerSelection {
        ContainerSelection::of(&self.allow, &self.catalog, kind, container)
    }

    pub fn container_state(&self, kind: ContentKind, container: &str) -> SelectionState {
        self.container_selection(kind, container).state()
    }

    pub fn sticky_full(&self, kind: ContentKind, container: &str) -> bool {
        self.allow.is_sticky_full(kind, container)
    }

    pub fn effective_checked(&self, kind: ContentKind, container: &str) -> bool {
        self.container_selection(kind, container).checked()
    }

    pub fn effective_indeterminate(&self, kind: ContentKind, container: &str) -> bool {
        self.container_selection(kind, container).indeterminate()
    }

    pub fn leaf_checked(&self, kind: ContentKind, container: &str, leaf: &str) -> bool {
        self.allow.group(kind).leaf_checked(container, leaf)
    }

    // ── Pending ──────────────────────────────────────────────────

    pub fn pending_leaf(&self, kind: ContentKind, container: &str, leaf: &str) -> bool {
        self.tracker.pending_leaf(&self.allow, kind, container, leaf)
    }

    pub fn pending_container(&self, kind: ContentKind, container: &str) -> bool {
        self.tracker
            .pending_container(&self.allow, &self.catalog, kind, container)
    }

    pub fn pending_show(&self, show: &str) -> bool {
        self.tracker.pending_show(&self.allow, &self.catalog, show)
    }

    pub fn pending_summary(&self) -> PendingSummary {
        let count = |kind: ContentKind| {
            self.catalog
                .containers(kind)
                .filter(|c| self.pending_container(kind, c))
                .count()
        };
        let livetv = count(ContentKind::LiveTv);
        let movies = count(ContentKind::Movies);
        let series = count(ContentKind::Series);
        PendingSummary {
            livetv,
            movies,
            series,
            total: livetv + movies + series,
        }
    }

    // ── Display rows ─────────────────────────────────────────────

    pub fn container_view(&self, kind: ContentKind, container: &str) -> ContainerView {
        let sel = self.container_selection(kind, container);
        ContainerView {
            kind,
            key: container.to_owned(),
            total: sel.total,
            selected: sel.selected,
            state: sel.state(),
            sticky_full: sel.sticky_full,
            checked: sel.checked(),
            indeterminate: sel.indeterminate(),
            pending: self.pending_container(kind, container),
        }
    }

    /// Container rows of `kind` in catalog order, narrowed by `filter`.
    pub fn containers(&self, kind: ContentKind, filter: FilterMode) -> Vec<ContainerView> {
        self.catalog
            .containers(kind)
            .map(|c| self.container_view(kind, c))
            .filter(|v| filter.matches(v.checked, v.indeterminate, v.pending))
            .collect()
    }

    /// Leaf rows of one container, narrowed by `filter`. Empty for an
    /// unknown container.
    pub fn leaves(&self, kind: ContentKind, container: &str, filter: FilterMode) -> Vec<LeafView> {
        self.catalog
            .leaves_of(kind, container)
            .iter()
            .map(|leaf| LeafView {
                kind,
                container: container.to_owned(),
                leaf: leaf.clone(),
                checked: self.leaf_checked(kind, container, leaf),
                pending: self.pending_leaf(kind, container, leaf),
            })
            .filter(|v| filter.matches(v.checked, false, v.pending))
            .collect()
    }

    // ── Mutations ────────────────────────────────────────────────

    pub fn set_container(&mut self, kind: ContentKind, container: &str, enabled: bool) -> Mutation {
        mutate::set_container(&mut self.allow, &self.catalog, kind, container, enabled)
    }

    pub fn set_leaf(
        &mut self,
        kind: ContentKind,
        container: &str,
        leaf: &str,
        enabled: bool,
    ) -> Mutation {
        mutate::set_leaf(&mut self.allow, &self.catalog, kind, container, leaf, enabled)
    }

    pub fn set_all_containers(&mut self, kind: ContentKind, enabled: bool) -> Mutation {
        mutate::set_all_containers(&mut self.allow, &self.catalog, kind, enabled)
    }

    pub fn set_all_leaves_of_container(
        &mut self,
        kind: ContentKind,
        container: &str,
        enabled: bool,
    ) -> Mutation {
        mutate::set_all_leaves_of_container(&mut self.allow, &self.catalog, kind, container, enabled)
    }

    /// Forget selections the current catalog no longer lists.
    pub fn prune_stale(&mut self, kind: ContentKind) -> Pruned {
        mutate::prune_stale(&mut self.allow, &self.catalog, kind)
    }
}
