// ── Selection state derivation ──
//
// Pure functions over (AllowList, CatalogIndex). Nothing here is cached;
// every query recomputes from the current sets.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::AllowList;
use crate::catalog::CatalogIndex;
use crate::model::ContentKind;

/// Tri-state status of a container derived from its leaf membership.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SelectionState {
    #[default]
    None,
    Partial,
    All,
}

/// Per-container record: raw selected count, catalog total, and the
/// durable sticky-full intent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerSelection {
    pub selected: usize,
    pub total: usize,
    pub sticky_full: bool,
}

impl ContainerSelection {
    /// Build the record for one container. An absent container yields a
    /// zero total, which always derives to [`SelectionState::None`].
    pub fn of(
        allow: &AllowList,
        index: &CatalogIndex,
        kind: ContentKind,
        container: &str,
    ) -> Self {
        let group = allow.group(kind);
        let leaves = index.leaves_of(kind, container);
        Self {
            selected: leaves.iter().filter(|l| group.titles.contains(*l)).count(),
            total: leaves.len(),
            sticky_full: group.is_sticky_full(container),
        }
    }

    pub fn state(&self) -> SelectionState {
        if self.total == 0 || self.selected == 0 {
            SelectionState::None
        } else if self.selected == self.total {
            SelectionState::All
        } else {
            SelectionState::Partial
        }
    }

    pub fn checked(&self) -> bool {
        self.sticky_full || self.state() == SelectionState::All
    }

    pub fn indeterminate(&self) -> bool {
        !self.checked() && self.state() == SelectionState::Partial
    }
}

pub fn container_state(
    allow: &AllowList,
    index: &CatalogIndex,
    kind: ContentKind,
    container: &str,
) -> SelectionState {
    ContainerSelection::of(allow, index, kind, container).state()
}

pub fn effective_checked(
    allow: &AllowList,
    index: &CatalogIndex,
    kind: ContentKind,
    container: &str,
) -> bool {
    ContainerSelection::of(allow, index, kind, container).checked()
}

pub fn effective_indeterminate(
    allow: &AllowList,
    index: &CatalogIndex,
    kind: ContentKind,
    container: &str,
) -> bool {
    ContainerSelection::of(allow, index, kind, container).indeterminate()
}

/// Leaf display state: sticky-full shows every leaf as checked even when
/// it is not individually listed.
pub fn leaf_checked(allow: &AllowList, kind: ContentKind, container: &str, leaf: &str) -> bool {
    allow.group(kind).leaf_checked(container, leaf)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{Catalog, CatalogItem};
    use pretty_assertions::assert_eq;

    fn five_channel_index() -> CatalogIndex {
        let mut catalog = Catalog::default();
        for n in 1..=5 {
            catalog.livetv.push(CatalogItem {
                group: "Sports".into(),
                tvg_name: format!("S{n}"),
                title: format!("S{n}"),
                url: format!("http://example.invalid/{n}.ts"),
                logo: String::new(),
            });
        }
        CatalogIndex::new(&catalog)
    }

    fn select(allow: &mut AllowList, names: &[&str]) {
        allow.livetv.titles.extend(names.iter().map(|s| (*s).to_owned()));
    }

    #[test]
    fn tri_state_follows_selected_count() {
        let index = five_channel_index();
        let mut allow = AllowList::default();
        let kind = ContentKind::LiveTv;

        assert_eq!(container_state(&allow, &index, kind, "Sports"), SelectionState::None);

        select(&mut allow, &["S1", "S2", "S3"]);
        assert_eq!(container_state(&allow, &index, kind, "Sports"), SelectionState::Partial);
        assert!(effective_indeterminate(&allow, &index, kind, "Sports"));
        assert!(!effective_checked(&allow, &index, kind, "Sports"));

        select(&mut allow, &["S4", "S5"]);
        assert_eq!(container_state(&allow, &index, kind, "Sports"), SelectionState::All);
        assert!(effective_checked(&allow, &index, kind, "Sports"));
        assert!(!effective_indeterminate(&allow, &index, kind, "Sports"));
    }

    #[test]
    fn empty_or_absent_container_is_none() {
        let index = five_channel_index();
        let mut allow = AllowList::default();
        allow.livetv.full_categories.insert("Gone".into());

        let sel = ContainerSelection::of(&allow, &index, ContentKind::LiveTv, "Gone");
        assert_eq!(sel.total, 0);
        assert_eq!(sel.state(), SelectionState::None);
        // The sticky flag alone still reads as checked.
        assert!(sel.checked());
        assert!(!sel.indeterminate());
    }

    #[test]
    fn sticky_full_overrides_partial_state() {
        let index = five_channel_index();
        let mut allow = AllowList::default();
        select(&mut allow, &["S1"]);
        allow.livetv.full_categories.insert("Sports".into());

        let kind = ContentKind::LiveTv;
        assert_eq!(container_state(&allow, &index, kind, "Sports"), SelectionState::Partial);
        assert!(effective_checked(&allow, &index, kind, "Sports"));
        assert!(!effective_indeterminate(&allow, &index, kind, "Sports"));
        assert!(leaf_checked(&allow, kind, "Sports", "S5"));
    }

    #[test]
    fn leaf_checked_uses_titles_without_sticky() {
        let mut allow = AllowList::default();
        select(&mut allow, &["S2"]);
        assert!(leaf_checked(&allow, ContentKind::LiveTv, "Sports", "S2"));
        assert!(!leaf_checked(&allow, ContentKind::LiveTv, "Sports", "S3"));
    }

    #[test]
    fn state_parses_and_displays_lowercase() {
        assert_eq!(SelectionState::Partial.to_string(), "partial");
        assert_eq!("ALL".parse::<SelectionState>().unwrap(), SelectionState::All);
    }
}
