//! `refresh` command: download the provider playlist.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;
use tracing::info;

use strmsync_core::ContentKind;

use crate::cli::GlobalOpts;
use crate::config::{self, Config, load_config};
use crate::error::CliError;
use crate::output;

/// Some providers reject clients that do not look like a browser.
const USER_AGENT: &str = concat!("Mozilla/5.0 (compatible; strmsync/", env!("CARGO_PKG_VERSION"), ")");

const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(90);

#[derive(Serialize)]
struct RefreshReport {
    playlist: PathBuf,
    bytes: usize,
    livetv: usize,
    movies: usize,
    series: usize,
}

/// Fetch the `m3u_plus` playlist of the configured account, store it at
/// `dest`, and return its text.
pub async fn download_playlist(cfg: &Config, dest: &Path) -> Result<String, CliError> {
    if !cfg.xtream.is_configured() {
        return Err(CliError::NotConfigured);
    }
    let url = cfg.xtream.playlist_url()?;

    let client = reqwest::Client::builder()
        .timeout(DOWNLOAD_TIMEOUT)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| CliError::Download(e.without_url()))?;

    // The query carries the password; log the host only.
    info!(host = url.host_str().unwrap_or_default(), "downloading playlist");
    let response = client
        .get(url)
        .send()
        .await
        .and_then(reqwest::Response::error_for_status)
        .map_err(|e| CliError::Download(e.without_url()))?;
    let bytes = response
        .bytes()
        .await
        .map_err(|e| CliError::Download(e.without_url()))?;

    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(dest, &bytes).await?;
    info!(path = %dest.display(), bytes = bytes.len(), "playlist stored");

    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

pub async fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = load_config(&config::config_path(global))?;
    let dest = config::playlist_path(global, &cfg);

    let text = download_playlist(&cfg, &dest).await?;
    let catalog = config::parse_catalog(&text);
    let report = RefreshReport {
        playlist: dest,
        bytes: text.len(),
        livetv: catalog.total(ContentKind::LiveTv),
        movies: catalog.total(ContentKind::Movies),
        series: catalog.total(ContentKind::Series),
    };
    let out = output::render_single(
        &global.output,
        &report,
        |r| {
            format!(
                "Playlist saved to {} (livetv {}, movies {}, series {})",
                r.playlist.display(),
                r.livetv,
                r.movies,
                r.series
            )
        },
        |r| r.playlist.display().to_string(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
