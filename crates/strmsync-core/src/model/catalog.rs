// ── Catalog tree ──
//
// Containers keep playlist order (`IndexMap`); seasons sort by their
// zero-padded key.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::ContentKind;

/// One playable playlist entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    /// `group-title` attribute, `"Ungrouped"` when absent.
    pub group: String,
    /// `tvg-name` attribute, falling back to the display title.
    pub tvg_name: String,
    /// Display title after the `#EXTINF` comma.
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub logo: String,
}

impl CatalogItem {
    /// The leaf identifier used in allow-lists: the alternate display name
    /// if present, else the primary title. `None` excludes the item from
    /// every selection set.
    pub fn leaf_id(&self) -> Option<&str> {
        if !self.tvg_name.is_empty() {
            Some(&self.tvg_name)
        } else if !self.title.is_empty() {
            Some(&self.title)
        } else {
            None
        }
    }
}

/// A series episode: the playlist entry plus its parsed position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Episode {
    #[serde(flatten)]
    pub item: CatalogItem,
    pub show: String,
    pub season: u32,
    pub episode: u32,
    #[serde(default)]
    pub ep_title: Option<String>,
}

impl Episode {
    pub fn leaf_id(&self) -> Option<&str> {
        self.item.leaf_id()
    }
}

/// Category-based section (`livetv`, `movies`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTree {
    #[serde(default)]
    pub categories: IndexMap<String, Vec<CatalogItem>>,
    #[serde(default)]
    pub total: usize,
}

impl CategoryTree {
    pub fn push(&mut self, item: CatalogItem) {
        self.categories
            .entry(item.group.clone())
            .or_default()
            .push(item);
        self.total += 1;
    }
}

/// One show with its seasons keyed `"00"`, `"01"`, ...
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Show {
    #[serde(default)]
    pub seasons: BTreeMap<String, Vec<Episode>>,
    #[serde(default)]
    pub total: usize,
}

impl Show {
    /// Episodes across all seasons, season order then playlist order.
    pub fn episodes(&self) -> impl Iterator<Item = &Episode> {
        self.seasons.values().flatten()
    }
}

/// Show-based section (`series`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowTree {
    #[serde(default)]
    pub shows: IndexMap<String, Show>,
    #[serde(default)]
    pub total: usize,
}

impl ShowTree {
    pub fn push(&mut self, episode: Episode) {
        let show = self.shows.entry(episode.show.clone()).or_default();
        show.seasons
            .entry(format!("{:02}", episode.season))
            .or_default()
            .push(episode);
        show.total += 1;
        self.total += 1;
    }
}

/// The full content tree for one playlist.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub livetv: CategoryTree,
    #[serde(default)]
    pub movies: CategoryTree,
    #[serde(default)]
    pub series: ShowTree,
}

impl Catalog {
    /// Total entry count for one kind.
    pub fn total(&self, kind: ContentKind) -> usize {
        match kind {
            ContentKind::LiveTv => self.livetv.total,
            ContentKind::Movies => self.movies.total,
            ContentKind::Series => self.series.total,
        }
    }
}
