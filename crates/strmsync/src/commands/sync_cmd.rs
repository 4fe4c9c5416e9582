//! `sync` command: write `.strm` files for the saved selection, once or
//! daily on the configured schedule.

use std::time::Duration;

use chrono::{Local, Utc};
use tracing::{debug, error, info};

use strmsync_core::{SyncReport, run_sync};

use crate::cli::{GlobalOpts, SyncArgs};
use crate::config::{self, Config, LastRun, RunReason, load_config, save_last_run};
use crate::error::CliError;
use crate::output;

use super::{refresh, save};

pub async fn handle(args: &SyncArgs, global: &GlobalOpts) -> Result<(), CliError> {
    if args.watch {
        return watch(args, global).await;
    }
    let run = run_once(args, global, RunReason::Manual).await?;
    print_run(&run, global);
    Ok(())
}

/// Playlist text for a run: a fresh download when auto-refresh applies,
/// else the local file, downloading only when it is missing.
async fn playlist_text(args: &SyncArgs, global: &GlobalOpts, cfg: &Config) -> Result<String, CliError> {
    let path = config::playlist_path(global, cfg);
    let configured = cfg.xtream.is_configured();

    if configured && cfg.sync.auto_refresh_playlist && !args.no_refresh {
        return refresh::download_playlist(cfg, &path).await;
    }
    match config::read_playlist(&path)? {
        Some(text) => Ok(text),
        None if configured => {
            debug!(path = %path.display(), "no local playlist, downloading");
            refresh::download_playlist(cfg, &path).await
        }
        None => Err(CliError::NoPlaylist {
            path: path.display().to_string(),
        }),
    }
}

async fn run_once(
    args: &SyncArgs,
    global: &GlobalOpts,
    reason: RunReason,
) -> Result<LastRun, CliError> {
    let config_path = config::config_path(global);
    let mut cfg = load_config(&config_path)?;

    // Runs read the saved allow-list. Saving first makes the draft part of it.
    if config::draft_path(global).exists() {
        if args.save {
            save::commit_draft(global, &config_path, &mut cfg)?;
        } else {
            output::notice(
                "warning: unsaved selection changes are not synced (run `strmsync save` or pass --save)",
                global.quiet,
            );
        }
    }

    let text = playlist_text(args, global, &cfg).await?;
    let catalog = config::parse_catalog(&text);
    let out_dir = cfg.paths.out_dir.clone();
    let policy = cfg.sync.policy();
    let allow = cfg.allow;

    info!(out_dir = %out_dir.display(), ?reason, "sync started");
    let result = tokio::task::spawn_blocking(move || run_sync(&catalog, &allow, &out_dir, policy))
        .await
        .map_err(|e| CliError::Io(std::io::Error::other(e)))??;

    let run = LastRun {
        time: Utc::now(),
        reason,
        result,
    };
    save_last_run(&config::last_run_path(global), &run)?;
    Ok(run)
}

async fn watch(args: &SyncArgs, global: &GlobalOpts) -> Result<(), CliError> {
    loop {
        // Re-read each round so schedule edits apply without a restart.
        let cfg = load_config(&config::config_path(global))?;
        let now = Local::now().naive_local();
        let Some(next) = cfg.schedule.next_run_after(now)? else {
            return Err(CliError::Validation {
                field: "schedule.enabled".into(),
                reason: "the daily schedule is disabled; enable it to use --watch".into(),
            });
        };

        let wait = (next - now).to_std().unwrap_or(Duration::ZERO);
        output::notice(
            &format!("Next sync at {}", next.format("%Y-%m-%d %H:%M")),
            global.quiet,
        );
        tokio::select! {
            () = tokio::time::sleep(wait) => {}
            _ = tokio::signal::ctrl_c() => {
                info!("watch stopped");
                return Ok(());
            }
        }

        match run_once(args, global, RunReason::Scheduled).await {
            Ok(run) => print_run(&run, global),
            Err(err) => error!(error = %err, "scheduled sync failed"),
        }
    }
}

pub(crate) fn summary(r: &SyncReport) -> String {
    format!(
        "{} created, {} updated, {} unchanged, {} deleted ({} sidecars), {} not selected",
        r.created, r.updated, r.unchanged, r.deleted, r.sidecars_deleted, r.skipped_not_allowed
    )
}

fn print_run(run: &LastRun, global: &GlobalOpts) {
    let out = output::render_single(
        &global.output,
        run,
        |r| format!("Synced: {}", summary(&r.result)),
        |r| r.time.to_rfc3339(),
    );
    output::print_output(&out, global.quiet);
}
