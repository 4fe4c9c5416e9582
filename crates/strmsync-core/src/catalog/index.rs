// ── Catalog index ──
//
// Immutable leaf lookup built once per catalog. A refresh builds a new
// index and swaps the whole value, so derivation never observes a
// half-updated tree.

use indexmap::IndexMap;

use crate::model::{Catalog, ContentKind};

type Containers = IndexMap<String, Vec<String>>;

/// One kind's containers plus the reverse leaf → containers lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Section {
    containers: Containers,
    owners: IndexMap<String, Vec<String>>,
}

impl Section {
    fn new(containers: Containers) -> Self {
        let mut owners: IndexMap<String, Vec<String>> = IndexMap::new();
        for (container, leaves) in &containers {
            for leaf in leaves {
                let list = owners.entry(leaf.clone()).or_default();
                if list.last() != Some(container) {
                    list.push(container.clone());
                }
            }
        }
        Self { containers, owners }
    }
}

/// Read-only accessors over a catalog: container key → ordered leaf identifiers.
///
/// Leaves without a resolvable name are dropped at build time. Duplicate
/// names within a container are kept, matching what the playlist lists.
/// The same name may also appear under several containers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogIndex {
    livetv: Section,
    movies: Section,
    series: Section,
}

impl CatalogIndex {
    pub fn new(catalog: &Catalog) -> Self {
        let categories = |tree: &crate::model::CategoryTree| -> Containers {
            tree.categories
                .iter()
                .map(|(group, items)| {
                    let leaves: Vec<String> = items
                        .iter()
                        .filter_map(|it| it.leaf_id().map(str::to_owned))
                        .collect();
                    (group.clone(), leaves)
                })
                .collect()
        };

        let series = catalog
            .series
            .shows
            .iter()
            .map(|(name, show)| {
                let leaves: Vec<String> = show
                    .episodes()
                    .filter_map(|ep| ep.leaf_id().map(str::to_owned))
                    .collect();
                (name.clone(), leaves)
            })
            .collect();

        Self {
            livetv: Section::new(categories(&catalog.livetv)),
            movies: Section::new(categories(&catalog.movies)),
            series: Section::new(series),
        }
    }

    fn section(&self, kind: ContentKind) -> &Section {
        match kind {
            ContentKind::LiveTv => &self.livetv,
            ContentKind::Movies => &self.movies,
            ContentKind::Series => &self.series,
        }
    }

    /// Ordered leaf identifiers of one container; empty when the container
    /// is absent (the catalog may have changed since the allow-list was built).
    pub fn leaves_of(&self, kind: ContentKind, container: &str) -> &[String] {
        self.section(kind)
            .containers
            .get(container)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn total_leaves(&self, kind: ContentKind, container: &str) -> usize {
        self.leaves_of(kind, container).len()
    }

    pub fn contains_container(&self, kind: ContentKind, container: &str) -> bool {
        self.section(kind).containers.contains_key(container)
    }

    pub fn contains_leaf(&self, kind: ContentKind, container: &str, leaf: &str) -> bool {
        self.leaves_of(kind, container).iter().any(|l| l == leaf)
    }

    /// Every container of `kind` listing `leaf`, in catalog order.
    pub fn containers_of_leaf(&self, kind: ContentKind, leaf: &str) -> &[String] {
        self.section(kind)
            .owners
            .get(leaf)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Container keys in catalog order.
    pub fn containers(&self, kind: ContentKind) -> impl Iterator<Item = &str> {
        self.section(kind).containers.keys().map(String::as_str)
    }

    pub fn container_count(&self, kind: ContentKind) -> usize {
        self.section(kind).containers.len()
    }
}

impl From<&Catalog> for CatalogIndex {
    fn from(catalog: &Catalog) -> Self {
        Self::new(catalog)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{CatalogItem, Episode};

    fn channel(group: &str, name: &str) -> CatalogItem {
        CatalogItem {
            group: group.into(),
            tvg_name: name.into(),
            title: name.into(),
            url: format!("http://example.invalid/{name}.ts"),
            logo: String::new(),
        }
    }

    fn episode(show: &str, season: u32, number: u32) -> Episode {
        Episode {
            item: channel("Series", &format!("{show} S{season:02}E{number:02}")),
            show: show.into(),
            season,
            episode: number,
            ep_title: None,
        }
    }

    #[test]
    fn resolves_category_leaves_in_order() {
        let mut catalog = Catalog::default();
        catalog.livetv.push(channel("News", "Channel2"));
        catalog.livetv.push(channel("News", "Channel1"));
        catalog.livetv.push(channel("Sport", "Arena"));

        let index = CatalogIndex::new(&catalog);
        assert_eq!(index.leaves_of(ContentKind::LiveTv, "News"), ["Channel2", "Channel1"]);
        assert_eq!(index.total_leaves(ContentKind::LiveTv, "Sport"), 1);
        assert_eq!(
            index.containers(ContentKind::LiveTv).collect::<Vec<_>>(),
            ["News", "Sport"]
        );
    }

    #[test]
    fn flattens_show_seasons() {
        let mut catalog = Catalog::default();
        catalog.series.push(episode("Show A", 2, 1));
        catalog.series.push(episode("Show A", 1, 1));
        catalog.series.push(episode("Show A", 1, 2));

        let index = CatalogIndex::from(&catalog);
        assert_eq!(
            index.leaves_of(ContentKind::Series, "Show A"),
            ["Show A S01E01", "Show A S01E02", "Show A S02E01"]
        );
    }

    #[test]
    fn absent_container_is_empty_not_an_error() {
        let index = CatalogIndex::default();
        assert!(index.leaves_of(ContentKind::Movies, "Gone").is_empty());
        assert_eq!(index.total_leaves(ContentKind::Movies, "Gone"), 0);
        assert!(!index.contains_container(ContentKind::Movies, "Gone"));
        assert!(!index.contains_leaf(ContentKind::Movies, "Gone", "x"));
    }

    #[test]
    fn maps_shared_names_back_to_every_container() {
        let mut catalog = Catalog::default();
        catalog.livetv.push(channel("News", "Shared"));
        catalog.livetv.push(channel("News", "Shared"));
        catalog.livetv.push(channel("Kids", "Shared"));
        catalog.livetv.push(channel("Kids", "Toons"));

        let index = CatalogIndex::new(&catalog);
        assert_eq!(index.containers_of_leaf(ContentKind::LiveTv, "Shared"), ["News", "Kids"]);
        assert_eq!(index.containers_of_leaf(ContentKind::LiveTv, "Toons"), ["Kids"]);
        assert!(index.containers_of_leaf(ContentKind::Movies, "Shared").is_empty());
    }

    #[test]
    fn skips_unnamed_leaves_but_keeps_container() {
        let mut catalog = Catalog::default();
        catalog.movies.push(CatalogItem {
            group: "Empty".into(),
            ..CatalogItem::default()
        });

        let index = CatalogIndex::new(&catalog);
        assert!(index.contains_container(ContentKind::Movies, "Empty"));
        assert_eq!(index.total_leaves(ContentKind::Movies, "Empty"), 0);
    }
}
