// ── Core error types ──
//
// The selection engine itself never fails: stale references degrade to
// no-ops and missing snapshots report "not pending". The fallible surfaces
// are parsing operator input into typed values and writing `.strm` files.

use std::path::PathBuf;

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Unknown content kind '{value}' (expected livetv, movies, or series)")]
    UnknownKind { value: String },

    #[error(
        "Unknown filter mode '{value}' (expected all, selected, unselected, pending, or unselected_or_pending)"
    )]
    UnknownFilter { value: String },
}

/// Failure while materializing the allow-list on disk.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("failed to {action} {}: {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode sync manifest: {0}")]
    Manifest(#[from] serde_json::Error),
}
