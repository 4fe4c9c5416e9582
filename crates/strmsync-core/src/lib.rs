//! Allow-list selection and pending-change engine for strmsync.
//!
//! The operator curates which items of a remote IPTV catalog (live
//! channels, movies, series episodes) get synchronized to disk. This crate
//! owns everything between the catalog and the persisted allow-list:
//!
//! - **[`Catalog`]** / **[`CatalogIndex`]**: the content tree built from an
//!   M3U playlist ([`build_catalog`]) and its read-only leaf index. The index
//!   is replaced wholesale on refresh, never patched in place.
//!
//! - **[`AllowList`]**: per content kind, the explicitly selected leaf
//!   titles plus the "sticky full" containers whose every current and future
//!   leaf counts as selected.
//!
//! - **[`allow::state`]**: pure tri-state derivation (`none` / `partial` /
//!   `all`) and the effective checked / indeterminate flags.
//!
//! - **[`allow::mutate`]**: the toggle and bulk operations that keep the
//!   sticky-full flags consistent with the leaf sets.
//!
//! - **[`SnapshotTracker`]**: the last-saved copy of the allow-list and the
//!   per-node pending (dirty) comparison against it.
//!
//! - **[`SelectionSession`]**: façade bundling all of the above into one
//!   explicit value per operator session.
//!
//! - **[`sync`]**: writes the allowed entries as `.strm` files and removes
//!   the ones that lost their allowance. The only part that touches disk.

pub mod allow;
pub mod catalog;
pub mod error;
pub mod filter;
pub mod model;
pub mod pending;
pub mod session;
pub mod sync;

// ── Primary re-exports ──────────────────────────────────────────────
pub use allow::mutate::{Mutation, Pruned};
pub use allow::state::{ContainerSelection, SelectionState};
pub use allow::{AllowList, CategoryAllow, LeafSet, SeriesAllow};
pub use catalog::{CatalogIndex, build_catalog};
pub use error::{CoreError, SyncError};
pub use filter::FilterMode;
pub use pending::SnapshotTracker;
pub use session::{ContainerView, LeafView, PendingSummary, SelectionSession};
pub use sync::{SyncPolicy, SyncReport, run_sync};

pub use model::{Catalog, CatalogItem, CategoryTree, ContentKind, Episode, Show, ShowTree};
