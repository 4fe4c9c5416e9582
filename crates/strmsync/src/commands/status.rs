//! `status` command: where things live, the schedule, and the last run.

use std::path::PathBuf;

use chrono::{Local, NaiveDateTime};
use serde::Serialize;

use crate::cli::GlobalOpts;
use crate::config::{self, LastRun, load_config, load_last_run};
use crate::error::CliError;
use crate::output;

use super::sync_cmd;

#[derive(Serialize)]
struct StatusReport {
    config: PathBuf,
    playlist: PathBuf,
    playlist_present: bool,
    out_dir: PathBuf,
    provider_configured: bool,
    unsaved_changes: bool,
    schedule_enabled: bool,
    daily_time: String,
    next_run: Option<NaiveDateTime>,
    last_run: Option<LastRun>,
}

fn detail(r: &StatusReport) -> String {
    let presence = |present: bool| if present { "" } else { " (missing)" };
    let schedule = match r.next_run {
        Some(next) => format!("daily at {}, next {}", r.daily_time, next.format("%Y-%m-%d %H:%M")),
        None => "disabled".into(),
    };
    let last_run = r.last_run.as_ref().map_or_else(
        || "never".into(),
        |run| {
            format!(
                "{} ({}): {}",
                run.time.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
                run.reason,
                sync_cmd::summary(&run.result)
            )
        },
    );

    [
        format!("Config:    {}", r.config.display()),
        format!("Playlist:  {}{}", r.playlist.display(), presence(r.playlist_present)),
        format!("Output:    {}", r.out_dir.display()),
        format!(
            "Provider:  {}",
            if r.provider_configured { "configured" } else { "not configured" }
        ),
        format!(
            "Draft:     {}",
            if r.unsaved_changes { "unsaved changes" } else { "none" }
        ),
        format!("Schedule:  {schedule}"),
        format!("Last run:  {last_run}"),
    ]
    .join("\n")
}

pub fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let config_path = config::config_path(global);
    let cfg = load_config(&config_path)?;
    let playlist = config::playlist_path(global, &cfg);

    let report = StatusReport {
        playlist_present: playlist.is_file(),
        playlist,
        out_dir: cfg.paths.out_dir.clone(),
        provider_configured: cfg.xtream.is_configured(),
        unsaved_changes: config::draft_path(global).exists(),
        schedule_enabled: cfg.schedule.enabled,
        daily_time: cfg.schedule.daily_time.clone(),
        next_run: cfg.schedule.next_run_after(Local::now().naive_local())?,
        last_run: load_last_run(&config::last_run_path(global)),
        config: config_path,
    };

    let out = output::render_single(&global.output, &report, detail, detail);
    output::print_output(&out, global.quiet);
    Ok(())
}
