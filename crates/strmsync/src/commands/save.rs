//! `save` and `discard`: the two ways out of an unsaved draft.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use strmsync_core::{CatalogIndex, SelectionSession};

use crate::cli::GlobalOpts;
use crate::config::{self, Config, clear_draft, load_config, save_config};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Serialize)]
struct SaveReport {
    config: PathBuf,
    changed: bool,
    saved_at: Option<DateTime<Utc>>,
}

/// Write the draft (if any) into `cfg` and the config file at `path`, then
/// clear the draft. The written allow-list becomes the new baseline for
/// pending comparisons. Returns the checkpoint time when something was
/// written.
pub fn commit_draft(
    global: &GlobalOpts,
    path: &Path,
    cfg: &mut Config,
) -> Result<Option<DateTime<Utc>>, CliError> {
    // Pending is judged on the whole document here, so no playlist is needed.
    let mut session = SelectionSession::new(CatalogIndex::default(), cfg.allow.clone());
    session.resume(config::current_allow(global, cfg)?);

    let changed = session.is_dirty() || !path.exists();
    if changed {
        cfg.allow = session.allow().clone();
        save_config(path, cfg)?;
        session.checkpoint();
        info!(path = %path.display(), "selection saved");
    }
    clear_draft(&config::draft_path(global))?;

    Ok(changed.then(|| session.tracker().taken_at()).flatten())
}

pub fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let path = config::config_path(global);
    let mut cfg = load_config(&path)?;
    let saved_at = commit_draft(global, &path, &mut cfg)?;

    let report = SaveReport {
        config: path,
        changed: saved_at.is_some(),
        saved_at,
    };
    let out = output::render_single(
        &global.output,
        &report,
        |r| {
            if r.changed {
                format!("Selection saved to {}", r.config.display())
            } else {
                "Nothing to save".into()
            }
        },
        |r| r.config.display().to_string(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

/// Drop the draft after confirmation.
pub fn discard(global: &GlobalOpts) -> Result<(), CliError> {
    let draft = config::draft_path(global);
    if !draft.exists() {
        output::notice("No unsaved changes", global.quiet);
        return Ok(());
    }
    if !util::confirm("Discard unsaved selection changes?", "discard", global.yes)? {
        return Ok(());
    }
    clear_draft(&draft)?;
    output::notice("Unsaved changes discarded", global.quiet);
    Ok(())
}
