//! CLI configuration: thin wrapper around `strmsync_config`.
//!
//! Resolves the config, draft, and playlist paths from `GlobalOpts`
//! overrides and opens a selection session over them.

use std::path::{Path, PathBuf};

use strum::IntoEnumIterator;
use tracing::{debug, info};

use strmsync_core::{AllowList, Catalog, CatalogIndex, ContentKind, SelectionSession, build_catalog};

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use strmsync_config::{
    Config, LastRun, RunReason, clear_draft, load_config, load_draft, load_last_run, save_config,
    save_draft, save_last_run,
};

// ── Paths ───────────────────────────────────────────────────────────

/// Config file path: `--config` / `STRMSYNC_CONFIG`, else the platform default.
pub fn config_path(global: &GlobalOpts) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(strmsync_config::config_path)
}

pub fn draft_path(global: &GlobalOpts) -> PathBuf {
    strmsync_config::draft_path(&config_path(global))
}

pub fn last_run_path(global: &GlobalOpts) -> PathBuf {
    strmsync_config::last_run_path(&config_path(global))
}

/// Playlist path: `--playlist` / `STRMSYNC_PLAYLIST`, else `paths.playlist`.
pub fn playlist_path(global: &GlobalOpts, cfg: &Config) -> PathBuf {
    global
        .playlist
        .clone()
        .unwrap_or_else(|| cfg.paths.playlist.clone())
}

// ── Workspace ───────────────────────────────────────────────────────

/// Everything a selection command works on.
pub struct Workspace {
    pub draft_path: PathBuf,
    pub session: SelectionSession,
}

impl Workspace {
    /// Load config and playlist, then resume the draft if one exists.
    ///
    /// The saved allow-list is the checkpoint; a draft on top of it reads
    /// as pending.
    pub fn open(global: &GlobalOpts) -> Result<Self, CliError> {
        let config_path = config_path(global);
        let draft_path = strmsync_config::draft_path(&config_path);
        let config = load_config(&config_path)?;

        let playlist = playlist_path(global, &config);
        let index = load_index(&playlist)?;

        let mut session = SelectionSession::new(index, config.allow);
        if let Some(draft) = load_draft(&draft_path)? {
            session.resume(draft);
        }

        Ok(Self {
            draft_path,
            session,
        })
    }

    /// Persist the live allow-list as the draft. A draft identical to the
    /// saved state is removed instead.
    pub fn store_draft(&self) -> Result<(), CliError> {
        if self.session.is_dirty() {
            save_draft(&self.draft_path, self.session.allow())?;
        } else {
            clear_draft(&self.draft_path)?;
        }
        Ok(())
    }
}

/// Playlist text, or `None` when the file does not exist.
pub fn read_playlist(path: &Path) -> Result<Option<String>, CliError> {
    let text = match std::fs::read(path) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    debug!(path = %path.display(), bytes = text.len(), "playlist read");
    Ok(Some(text))
}

pub fn parse_catalog(text: &str) -> Catalog {
    let catalog = build_catalog(text);
    let totals: Vec<String> = ContentKind::iter()
        .map(|kind| format!("{kind}={}", catalog.total(kind)))
        .collect();
    info!(totals = %totals.join(" "), "catalog built");
    catalog
}

fn load_index(path: &Path) -> Result<CatalogIndex, CliError> {
    let text = read_playlist(path)?.ok_or_else(|| CliError::NoPlaylist {
        path: path.display().to_string(),
    })?;
    Ok(CatalogIndex::new(&parse_catalog(&text)))
}

/// The selection to save: the draft if present, else the saved state.
pub fn current_allow(global: &GlobalOpts, cfg: &Config) -> Result<AllowList, CliError> {
    Ok(load_draft(&draft_path(global))?.unwrap_or_else(|| cfg.allow.clone()))
}
