// ── Content model ──
//
// The catalog tree as delivered by the playlist provider. Everything here
// is read-only input to the selection engine; the engine never mutates it.

pub mod catalog;
pub mod kind;

pub use catalog::{Catalog, CatalogItem, CategoryTree, Episode, Show, ShowTree};
pub use kind::ContentKind;
