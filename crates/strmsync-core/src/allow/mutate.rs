// ── Mutation operations ──
//
// Every operation leaves the allow-set with:
//   - sticky-full containers fully materialized in `titles`
//   - the sticky flag set exactly when selected == total (total > 0),
//     unless the operation is an explicit container clear
//   - for series, `shows` listing exactly the shows with a selected episode
//
// A leaf name listed under several containers is one entry in `titles`, so
// toggling it re-derives every container that lists it.
//
// References to containers or leaves missing from the current catalog are
// no-ops. Stale entries already in the allow-list are left untouched so
// re-appearing content resumes its prior selection.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::debug;

use super::{AllowGroupMut, AllowList, LeafSet};
use crate::catalog::CatalogIndex;
use crate::model::ContentKind;

/// Outcome of a mutation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mutation {
    Applied,
    /// The container or leaf is not in the current catalog; nothing changed.
    Stale,
}

impl Mutation {
    pub fn is_applied(self) -> bool {
        self == Self::Applied
    }
}

impl AllowGroupMut<'_> {
    /// Reassert or clear the sticky flag from the selected count, and keep
    /// the series non-empty marker in step.
    fn resync(&mut self, container: &str, leaves: &[String]) {
        let selected = leaves.iter().filter(|l| self.titles.contains(*l)).count();

        if !leaves.is_empty() && selected == leaves.len() {
            self.full.insert(container.to_owned());
        } else {
            self.full.remove(container);
        }

        if let Some(shows) = self.shows.as_deref_mut() {
            if selected > 0 {
                shows.insert(container.to_owned());
            } else {
                shows.remove(container);
            }
        }
    }

    /// Re-derive the other containers listing any of `changed` after those
    /// names went in or out of `titles` on behalf of `origin`. Losing a name
    /// downgrades a sticky container the same way unchecking it there would.
    fn propagate(
        &mut self,
        index: &CatalogIndex,
        kind: ContentKind,
        origin: &str,
        changed: &[String],
        enabled: bool,
    ) {
        let others: BTreeSet<&str> = changed
            .iter()
            .flat_map(|leaf| index.containers_of_leaf(kind, leaf))
            .map(String::as_str)
            .filter(|c| *c != origin)
            .collect();

        for container in others {
            let leaves = index.leaves_of(kind, container);
            if enabled {
                // Sticky containers keep their flag; complete ones gain it.
                if !self.full.contains(container) {
                    self.resync(container, leaves);
                }
                continue;
            }
            if self.full.remove(container) {
                self.titles
                    .extend(leaves.iter().filter(|l| !changed.contains(*l)).cloned());
            }
            self.resync(container, leaves);
            debug!(%kind, container, origin, "shared leaf change re-derived");
        }
    }

    fn enable_all(&mut self, container: &str, leaves: &[String]) {
        self.full.insert(container.to_owned());
        self.titles.extend(leaves.iter().cloned());
        if let Some(shows) = self.shows.as_deref_mut() {
            shows.insert(container.to_owned());
        }
    }

    fn clear_all(&mut self, container: &str, leaves: &[String]) {
        self.full.remove(container);
        for leaf in leaves {
            self.titles.remove(leaf);
        }
        if let Some(shows) = self.shows.as_deref_mut() {
            shows.remove(container);
        }
    }
}

/// Select or clear a whole container. Enabling marks it sticky-full and
/// materializes every current leaf; disabling clears flag and leaves
/// unconditionally.
pub fn set_container(
    allow: &mut AllowList,
    index: &CatalogIndex,
    kind: ContentKind,
    container: &str,
    enabled: bool,
) -> Mutation {
    if !index.contains_container(kind, container) {
        debug!(%kind, container, "set_container on unknown container ignored");
        return Mutation::Stale;
    }

    let leaves = index.leaves_of(kind, container);
    let mut group = allow.group_mut(kind);
    if enabled {
        group.enable_all(container, leaves);
    } else {
        group.clear_all(container, leaves);
    }
    group.propagate(index, kind, container, leaves, enabled);

    debug!(%kind, container, enabled, leaves = leaves.len(), "container toggled");
    Mutation::Applied
}

/// Toggle one leaf. Unchecking a leaf of a sticky-full container first
/// lists every sibling explicitly, so only the targeted leaf drops out.
pub fn set_leaf(
    allow: &mut AllowList,
    index: &CatalogIndex,
    kind: ContentKind,
    container: &str,
    leaf: &str,
    enabled: bool,
) -> Mutation {
    if !index.contains_leaf(kind, container, leaf) {
        debug!(%kind, container, leaf, "set_leaf on unknown leaf ignored");
        return Mutation::Stale;
    }

    let leaves = index.leaves_of(kind, container);
    let mut group = allow.group_mut(kind);

    if !enabled && group.full.remove(container) {
        group
            .titles
            .extend(leaves.iter().filter(|l| l.as_str() != leaf).cloned());
    }

    if enabled {
        group.titles.insert(leaf.to_owned());
    } else {
        group.titles.remove(leaf);
    }

    group.resync(container, leaves);
    group.propagate(index, kind, container, &[leaf.to_owned()], enabled);

    debug!(%kind, container, leaf, enabled, "leaf toggled");
    Mutation::Applied
}

/// Apply [`set_container`] to every container of `kind` in the catalog.
/// Stale when the kind has no containers at all.
pub fn set_all_containers(
    allow: &mut AllowList,
    index: &CatalogIndex,
    kind: ContentKind,
    enabled: bool,
) -> Mutation {
    let mut outcome = Mutation::Stale;
    for container in index.containers(kind) {
        if set_container(allow, index, kind, container, enabled).is_applied() {
            outcome = Mutation::Applied;
        }
    }
    debug!(%kind, enabled, containers = index.container_count(kind), "all containers toggled");
    outcome
}

/// Select or clear every leaf of one container ("all episodes of this show").
pub fn set_all_leaves_of_container(
    allow: &mut AllowList,
    index: &CatalogIndex,
    kind: ContentKind,
    container: &str,
    enabled: bool,
) -> Mutation {
    set_container(allow, index, kind, container, enabled)
}

/// What [`prune_stale`] dropped from one kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Pruned {
    pub titles: usize,
    pub containers: usize,
}

impl Pruned {
    pub fn is_empty(self) -> bool {
        self.titles == 0 && self.containers == 0
    }
}

/// Explicitly forget selections the catalog no longer resolves: titles no
/// container lists, plus sticky flags and show markers of absent
/// containers. The legacy `categories` list is kept.
///
/// A kind without any container in the catalog is left alone, so an empty
/// or failed playlist never wipes a selection.
pub fn prune_stale(allow: &mut AllowList, index: &CatalogIndex, kind: ContentKind) -> Pruned {
    if index.container_count(kind) == 0 {
        debug!(%kind, "prune skipped, kind has no containers");
        return Pruned::default();
    }

    let group = allow.group_mut(kind);
    let mut pruned = Pruned::default();

    let before = group.titles.len();
    group
        .titles
        .retain(|leaf| !index.containers_of_leaf(kind, leaf).is_empty());
    pruned.titles = before - group.titles.len();

    let mut forgotten = BTreeSet::new();
    let mut forget = |set: &mut LeafSet| {
        set.retain(|c| {
            let keep = index.contains_container(kind, c);
            if !keep {
                forgotten.insert(c.clone());
            }
            keep
        });
    };
    forget(group.full);
    if let Some(shows) = group.shows {
        forget(shows);
    }
    pruned.containers = forgotten.len();

    debug!(%kind, titles = pruned.titles, containers = pruned.containers, "stale selections pruned");
    pruned
}
