// ── Snapshot & pending tracker ──
//
// Holds one deep copy of the allow-list taken at the last checkpoint
// (initial load or successful save). Pending is never stored: every query
// diffs the live allow-list against that copy on effective membership.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::allow::AllowList;
use crate::catalog::CatalogIndex;
use crate::model::ContentKind;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Checkpoint {
    allow: AllowList,
    taken_at: DateTime<Utc>,
}

/// Last-saved baseline for pending comparisons. Before the first
/// checkpoint every query reports "not pending".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotTracker {
    snapshot: Option<Checkpoint>,
}

impl SnapshotTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the baseline with a copy of `current`.
    pub fn checkpoint(&mut self, current: &AllowList) {
        let taken_at = Utc::now();
        self.snapshot = Some(Checkpoint {
            allow: current.clone(),
            taken_at,
        });
        debug!(%taken_at, "selection checkpoint taken");
    }

    pub fn snapshot(&self) -> Option<&AllowList> {
        self.snapshot.as_ref().map(|c| &c.allow)
    }

    pub fn taken_at(&self) -> Option<DateTime<Utc>> {
        self.snapshot.as_ref().map(|c| c.taken_at)
    }

    /// Effective leaf membership differs from the baseline. Sticky-full
    /// counts as membership, so toggling a container's flag alone makes
    /// all of its leaves pending.
    pub fn pending_leaf(
        &self,
        current: &AllowList,
        kind: ContentKind,
        container: &str,
        leaf: &str,
    ) -> bool {
        let Some(saved) = self.snapshot() else {
            return false;
        };
        current.group(kind).leaf_checked(container, leaf)
            != saved.group(kind).leaf_checked(container, leaf)
    }

    /// Sticky flag changed, or any current leaf is pending. For series the
    /// non-empty `shows` marker is compared as well.
    pub fn pending_container(
        &self,
        current: &AllowList,
        index: &CatalogIndex,
        kind: ContentKind,
        container: &str,
    ) -> bool {
        let Some(saved) = self.snapshot() else {
            return false;
        };
        let now = current.group(kind);
        let then = saved.group(kind);

        if now.is_sticky_full(container) != then.is_sticky_full(container) {
            return true;
        }
        if kind.is_show_based() && now.has_show(container) != then.has_show(container) {
            return true;
        }
        index
            .leaves_of(kind, container)
            .iter()
            .any(|leaf| now.leaf_checked(container, leaf) != then.leaf_checked(container, leaf))
    }

    pub fn pending_show(&self, current: &AllowList, index: &CatalogIndex, show: &str) -> bool {
        self.pending_container(current, index, ContentKind::Series, show)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::allow::mutate::{set_container, set_leaf};
    use crate::model::{Catalog, CatalogItem, Episode};

    fn item(group: &str, name: &str) -> CatalogItem {
        CatalogItem {
            group: group.into(),
            tvg_name: name.into(),
            title: name.into(),
            url: format!("http://example.invalid/{name}"),
            logo: String::new(),
        }
    }

    fn index() -> CatalogIndex {
        let mut catalog = Catalog::default();
        catalog.livetv.push(item("News", "Channel1"));
        catalog.livetv.push(item("News", "Channel2"));
        catalog.livetv.push(item("Kids", "Cartoons"));
        for (n, name) in ["E1", "E2", "E3"].into_iter().enumerate() {
            catalog.series.push(Episode {
                item: item("Series", name),
                show: "Show A".into(),
                season: 1,
                episode: u32::try_from(n + 1).unwrap(),
                ep_title: None,
            });
        }
        CatalogIndex::new(&catalog)
    }

    const LIVE: ContentKind = ContentKind::LiveTv;

    #[test]
    fn nothing_is_pending_without_snapshot() {
        let index = index();
        let tracker = SnapshotTracker::new();
        let mut allow = AllowList::default();
        set_container(&mut allow, &index, LIVE, "News", true);

        assert!(tracker.snapshot().is_none());
        assert!(tracker.taken_at().is_none());
        assert!(!tracker.pending_leaf(&allow, LIVE, "News", "Channel1"));
        assert!(!tracker.pending_container(&allow, &index, LIVE, "News"));
    }

    #[test]
    fn checkpoint_clears_pending() {
        let index = index();
        let mut tracker = SnapshotTracker::new();
        let mut allow = AllowList::default();
        set_container(&mut allow, &index, LIVE, "News", true);
        set_leaf(&mut allow, &index, ContentKind::Series, "Show A", "E2", true);

        tracker.checkpoint(&allow);
        assert!(tracker.taken_at().is_some());
        for kind in [LIVE, ContentKind::Series] {
            for container in index.containers(kind) {
                assert!(!tracker.pending_container(&allow, &index, kind, container));
                for leaf in index.leaves_of(kind, container) {
                    assert!(!tracker.pending_leaf(&allow, kind, container, leaf));
                }
            }
        }
    }

    #[test]
    fn sticky_flag_alone_marks_every_leaf_pending() {
        let index = index();
        let mut tracker = SnapshotTracker::new();
        let mut allow = AllowList::default();
        tracker.checkpoint(&allow);

        // Raise the flag without listing titles: effective membership changes.
        allow.livetv.full_categories.insert("News".into());
        assert!(tracker.pending_container(&allow, &index, LIVE, "News"));
        assert!(tracker.pending_leaf(&allow, LIVE, "News", "Channel1"));
        assert!(tracker.pending_leaf(&allow, LIVE, "News", "Channel2"));
        assert!(!tracker.pending_container(&allow, &index, LIVE, "Kids"));
    }

    #[test]
    fn pending_propagates_from_container_enable() {
        let index = index();
        let mut tracker = SnapshotTracker::new();
        let mut allow = AllowList::default();
        tracker.checkpoint(&allow);

        set_container(&mut allow, &index, LIVE, "News", true);
        assert!(tracker.pending_container(&allow, &index, LIVE, "News"));
        assert!(tracker.pending_leaf(&allow, LIVE, "News", "Channel1"));
        assert!(tracker.pending_leaf(&allow, LIVE, "News", "Channel2"));
    }

    #[test]
    fn reverting_a_change_clears_pending() {
        let index = index();
        let mut tracker = SnapshotTracker::new();
        let mut allow = AllowList::default();
        tracker.checkpoint(&allow);

        set_leaf(&mut allow, &index, LIVE, "Kids", "Cartoons", true);
        assert!(tracker.pending_container(&allow, &index, LIVE, "Kids"));
        set_leaf(&mut allow, &index, LIVE, "Kids", "Cartoons", false);
        assert!(!tracker.pending_container(&allow, &index, LIVE, "Kids"));
    }

    #[test]
    fn removing_last_episode_makes_show_pending() {
        let index = index();
        let mut tracker = SnapshotTracker::new();
        let mut allow = AllowList::default();
        set_leaf(&mut allow, &index, ContentKind::Series, "Show A", "E1", true);
        tracker.checkpoint(&allow);
        assert!(tracker.snapshot().unwrap().series.shows.contains("Show A"));

        set_leaf(&mut allow, &index, ContentKind::Series, "Show A", "E1", false);
        assert!(!allow.series.shows.contains("Show A"));
        assert!(tracker.pending_show(&allow, &index, "Show A"));
    }

    #[test]
    fn shows_marker_difference_alone_is_pending() {
        let index = index();
        let mut tracker = SnapshotTracker::new();
        let mut allow = AllowList::default();
        tracker.checkpoint(&allow);

        allow.series.shows.insert("Show A".into());
        assert!(tracker.pending_show(&allow, &index, "Show A"));
        assert!(!tracker.pending_leaf(&allow, ContentKind::Series, "Show A", "E1"));
    }
}
