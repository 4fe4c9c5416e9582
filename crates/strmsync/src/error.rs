//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError`, `SyncError`, `ConfigError` and download failures
//! into user-facing errors with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use strmsync_config::ConfigError;
use strmsync_core::{CoreError, SyncError};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Catalog ──────────────────────────────────────────────────────

    #[error("Playlist not found at {path}")]
    #[diagnostic(
        code(strmsync::no_playlist),
        help(
            "Point --playlist (or STRMSYNC_PLAYLIST) at a downloaded M3U file,\n\
             or set paths.playlist in the config file."
        )
    )]
    NoPlaylist { path: String },

    #[error("{noun} '{identifier}' not found in {kind}")]
    #[diagnostic(
        code(strmsync::not_found),
        help("Run: strmsync list {kind} to see available entries")
    )]
    NotFound {
        kind: String,
        noun: String,
        identifier: String,
    },

    // ── Provider ─────────────────────────────────────────────────────

    #[error("No provider account configured")]
    #[diagnostic(
        code(strmsync::not_configured),
        help(
            "Set xtream.base_url and xtream.username (run: strmsync config init),\n\
             or place a downloaded playlist at paths.playlist."
        )
    )]
    NotConfigured,

    #[error("Playlist download failed: {0}")]
    #[diagnostic(
        code(strmsync::download),
        help("Check xtream.base_url and the account credentials in the config file.")
    )]
    Download(#[source] reqwest::Error),

    // ── Sync ─────────────────────────────────────────────────────────

    #[error(transparent)]
    #[diagnostic(code(strmsync::sync), help("Check that paths.out_dir is writable."))]
    Sync(#[from] SyncError),

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(strmsync::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error(transparent)]
    #[diagnostic(code(strmsync::config))]
    Config(#[from] ConfigError),

    // ── Interactive ──────────────────────────────────────────────────

    #[error("Operation '{action}' requires confirmation")]
    #[diagnostic(
        code(strmsync::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("failed to render TOML: {0}")]
    #[diagnostic(code(strmsync::toml))]
    Toml(#[from] toml::ser::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NotFound { .. } | Self::NoPlaylist { .. } => exit_code::NOT_FOUND,
            Self::NotConfigured => exit_code::AUTH,
            Self::Download(e) if e.is_timeout() => exit_code::TIMEOUT,
            Self::Download(e)
                if matches!(
                    e.status(),
                    Some(reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN)
                ) =>
            {
                exit_code::AUTH
            }
            Self::Download(_) => exit_code::CONNECTION,
            Self::Validation { .. }
            | Self::NonInteractiveRequiresYes { .. }
            | Self::Config(ConfigError::Validation { .. }) => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::UnknownKind { value } => CliError::Validation {
                field: "kind".into(),
                reason: format!("unknown content kind '{value}'"),
            },
            CoreError::UnknownFilter { value } => CliError::Validation {
                field: "filter".into(),
                reason: format!("unknown filter mode '{value}'"),
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_error_class() {
        let not_found = CliError::NotFound {
            kind: "livetv".into(),
            noun: "category".into(),
            identifier: "News".into(),
        };
        assert_eq!(not_found.exit_code(), exit_code::NOT_FOUND);

        let usage: CliError = CoreError::UnknownKind { value: "radio".into() }.into();
        assert_eq!(usage.exit_code(), exit_code::USAGE);

        let config: CliError = ConfigError::Validation {
            field: "schedule.daily_time".into(),
            reason: "bad".into(),
        }
        .into();
        assert_eq!(config.exit_code(), exit_code::USAGE);

        let io: CliError = std::io::Error::other("disk").into();
        assert_eq!(io.exit_code(), exit_code::GENERAL);

        assert_eq!(CliError::NotConfigured.exit_code(), exit_code::AUTH);

        let sync: CliError = SyncError::Io {
            action: "write",
            path: "/srv/library/x.strm".into(),
            source: std::io::Error::other("read-only"),
        }
        .into();
        assert_eq!(sync.exit_code(), exit_code::GENERAL);
        assert!(sync.to_string().contains("/srv/library/x.strm"));
    }
}
