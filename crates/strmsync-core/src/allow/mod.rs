// ── Allow-list store ──
//
// The persisted selection: per kind, the explicit leaf titles and the
// sticky-full containers. Field names match the configuration document
// (`full_categories` for livetv/movies, `full_shows` + `shows` for series).
//
// Missing or null collections deserialize as empty, so a partial or
// hand-edited document always loads.

pub mod mutate;
pub mod state;

use std::collections::BTreeSet;

use serde::{Deserialize, Deserializer, Serialize};

use crate::model::ContentKind;

/// A set of leaf identifiers or container keys. Ordered for stable output.
pub type LeafSet = BTreeSet<String>;

/// Treat an explicit `null` like a missing field.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Allow-set of a category-based kind (`livetv`, `movies`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryAllow {
    /// Legacy whole-category grants. Never written by the engine, kept
    /// verbatim so older documents survive a round trip.
    #[serde(default, deserialize_with = "nullable")]
    pub categories: LeafSet,

    #[serde(default, deserialize_with = "nullable")]
    pub titles: LeafSet,

    #[serde(default, deserialize_with = "nullable")]
    pub full_categories: LeafSet,
}

/// Allow-set of the show-based kind (`series`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesAllow {
    /// Shows with at least one selected episode.
    #[serde(default, deserialize_with = "nullable")]
    pub shows: LeafSet,

    #[serde(default, deserialize_with = "nullable")]
    pub titles: LeafSet,

    #[serde(default, deserialize_with = "nullable")]
    pub full_shows: LeafSet,
}

/// The complete allow-list across all kinds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowList {
    #[serde(default, deserialize_with = "nullable")]
    pub livetv: CategoryAllow,

    #[serde(default, deserialize_with = "nullable")]
    pub movies: CategoryAllow,

    #[serde(default, deserialize_with = "nullable")]
    pub series: SeriesAllow,
}

/// Uniform read view of one kind's allow-set.
#[derive(Debug, Clone, Copy)]
pub struct AllowGroup<'a> {
    pub titles: &'a LeafSet,
    /// Sticky-full container keys.
    pub full: &'a LeafSet,
    /// Non-empty marker set, series only.
    pub shows: Option<&'a LeafSet>,
}

impl AllowGroup<'_> {
    pub fn is_sticky_full(&self, container: &str) -> bool {
        self.full.contains(container)
    }

    /// Effective leaf membership: sticky-full implies every leaf.
    pub fn leaf_checked(&self, container: &str, leaf: &str) -> bool {
        self.is_sticky_full(container) || self.titles.contains(leaf)
    }

    pub fn has_show(&self, container: &str) -> bool {
        self.shows.is_some_and(|s| s.contains(container))
    }
}

/// Uniform write view of one kind's allow-set.
pub(crate) struct AllowGroupMut<'a> {
    pub(crate) titles: &'a mut LeafSet,
    pub(crate) full: &'a mut LeafSet,
    pub(crate) shows: Option<&'a mut LeafSet>,
}

impl AllowList {
    pub fn group(&self, kind: ContentKind) -> AllowGroup<'_> {
        match kind {
            ContentKind::LiveTv => AllowGroup {
                titles: &self.livetv.titles,
                full: &self.livetv.full_categories,
                shows: None,
            },
            ContentKind::Movies => AllowGroup {
                titles: &self.movies.titles,
                full: &self.movies.full_categories,
                shows: None,
            },
            ContentKind::Series => AllowGroup {
                titles: &self.series.titles,
                full: &self.series.full_shows,
                shows: Some(&self.series.shows),
            },
        }
    }

    pub(crate) fn group_mut(&mut self, kind: ContentKind) -> AllowGroupMut<'_> {
        match kind {
            ContentKind::LiveTv => AllowGroupMut {
                titles: &mut self.livetv.titles,
                full: &mut self.livetv.full_categories,
                shows: None,
            },
            ContentKind::Movies => AllowGroupMut {
                titles: &mut self.movies.titles,
                full: &mut self.movies.full_categories,
                shows: None,
            },
            ContentKind::Series => AllowGroupMut {
                titles: &mut self.series.titles,
                full: &mut self.series.full_shows,
                shows: Some(&mut self.series.shows),
            },
        }
    }

    pub fn is_sticky_full(&self, kind: ContentKind, container: &str) -> bool {
        self.group(kind).is_sticky_full(container)
    }

    /// `true` when nothing is selected in any kind.
    pub fn is_empty(&self) -> bool {
        self.livetv == CategoryAllow::default()
            && self.movies == CategoryAllow::default()
            && self.series == SeriesAllow::default()
    }
}
