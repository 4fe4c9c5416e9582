//! Config subcommand handlers.

use std::io::IsTerminal;
use std::path::PathBuf;

use dialoguer::{Input, Password, Select};
use serde::Serialize;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, load_config, save_config};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Helpers ─────────────────────────────────────────────────────────

/// Copy of the config with the provider password masked.
fn redacted(cfg: &Config) -> Config {
    let mut cfg = cfg.clone();
    if !cfg.xtream.password.is_empty() {
        cfg.xtream.password = "****".into();
    }
    cfg
}

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

/// Ask for the provider account and paths, starting from `cfg`.
fn prompt_setup(mut cfg: Config) -> Result<Config, CliError> {
    cfg.xtream.base_url = Input::new()
        .with_prompt("Provider URL")
        .with_initial_text(cfg.xtream.base_url.clone())
        .interact_text()
        .map_err(prompt_err)?;

    cfg.xtream.username = Input::new()
        .with_prompt("Username")
        .with_initial_text(cfg.xtream.username.clone())
        .interact_text()
        .map_err(prompt_err)?;

    cfg.xtream.password = Password::new()
        .with_prompt("Password")
        .allow_empty_password(true)
        .interact()
        .map_err(prompt_err)?;

    let outputs = ["ts", "m3u8"];
    let current = usize::from(cfg.xtream.stream_output()? == "m3u8");
    let choice = Select::new()
        .with_prompt("Stream output")
        .items(&outputs)
        .default(current)
        .interact()
        .map_err(prompt_err)?;
    cfg.xtream.output = outputs.get(choice).copied().unwrap_or("ts").into();

    let playlist: String = Input::new()
        .with_prompt("Playlist file")
        .with_initial_text(cfg.paths.playlist.display().to_string())
        .interact_text()
        .map_err(prompt_err)?;
    cfg.paths.playlist = PathBuf::from(playlist);

    let out_dir: String = Input::new()
        .with_prompt("Output directory")
        .with_initial_text(cfg.paths.out_dir.display().to_string())
        .interact_text()
        .map_err(prompt_err)?;
    cfg.paths.out_dir = PathBuf::from(out_dir);

    Ok(cfg)
}

#[derive(Serialize)]
struct ConfigPaths {
    config: PathBuf,
    draft: PathBuf,
    draft_exists: bool,
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: &ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let path = config::config_path(global);

    match args.command {
        ConfigCommand::Path => {
            let draft = config::draft_path(global);
            let paths = ConfigPaths {
                config: path,
                draft_exists: draft.exists(),
                draft,
            };
            let out = output::render_single(
                &global.output,
                &paths,
                |p| {
                    let marker = if p.draft_exists { "" } else { " (none)" };
                    format!(
                        "config: {}\ndraft:  {}{marker}",
                        p.config.display(),
                        p.draft.display()
                    )
                },
                |p| p.config.display().to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = redacted(&load_config(&path)?);
            let toml_str = toml::to_string_pretty(&cfg)?;
            let out = output::render_single(
                &global.output,
                &cfg,
                |_| toml_str.trim_end().to_owned(),
                |_| toml_str.trim_end().to_owned(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Init => {
            if path.exists()
                && !util::confirm(
                    &format!("Overwrite existing config at {}?", path.display()),
                    "config init",
                    global.yes,
                )?
            {
                return Ok(());
            }

            // Keep any existing values (and env overrides) as the starting point.
            let base = load_config(&path)?;
            let cfg = if std::io::stdin().is_terminal() {
                prompt_setup(base)?
            } else {
                base
            };

            save_config(&path, &cfg)?;
            output::notice(&format!("Config written to {}", path.display()), global.quiet);
            Ok(())
        }
    }
}
