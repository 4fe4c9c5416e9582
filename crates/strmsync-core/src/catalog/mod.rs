// ── Catalog provider and index ──
//
// `m3u` turns playlist text into a `Catalog`; `index` flattens that tree
// into the per-container leaf lists the selection engine queries.

mod index;
pub mod m3u;

pub use index::CatalogIndex;
pub use m3u::build_catalog;
