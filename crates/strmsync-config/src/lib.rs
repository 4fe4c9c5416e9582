//! Configuration document for strmsync.
//!
//! One TOML file holds the provider credentials, output paths, sync and
//! schedule options, and the persisted allow-list. Loading layers
//! defaults, the file, and `STRMSYNC_*` environment variables. Unsaved
//! selection edits live in a separate draft file next to the config, as
//! does the record of the last sync run.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Days, NaiveDateTime, NaiveTime, Utc};
use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use strmsync_core::{AllowList, SyncPolicy, SyncReport};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("failed to parse {}: {source}", path.display())]
    Deserialization {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to encode {}: {source}", path.display())]
    Record {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level configuration document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub xtream: Xtream,

    #[serde(default)]
    pub paths: Paths,

    #[serde(default)]
    pub sync: SyncOptions,

    #[serde(default)]
    pub schedule: Schedule,

    /// The persisted selection. Saving this section is a checkpoint.
    #[serde(default)]
    pub allow: AllowList,
}

/// Xtream Codes provider account.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Xtream {
    #[serde(default)]
    pub base_url: String,

    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: String,

    /// Stream container requested from the provider: "ts" or "m3u8".
    #[serde(default = "default_output")]
    pub output: String,
}

impl Default for Xtream {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            username: String::new(),
            password: String::new(),
            output: default_output(),
        }
    }
}

fn default_output() -> String {
    "ts".into()
}

impl Xtream {
    /// Normalized stream output. Legacy "m3u" means "ts".
    pub fn stream_output(&self) -> Result<&'static str, ConfigError> {
        match self.output.trim().to_ascii_lowercase().as_str() {
            "ts" | "m3u" | "" => Ok("ts"),
            "m3u8" => Ok("m3u8"),
            other => Err(ConfigError::Validation {
                field: "xtream.output".into(),
                reason: format!("expected 'ts' or 'm3u8', got '{other}'"),
            }),
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.base_url.trim().is_empty() && !self.username.is_empty()
    }

    /// The `m3u_plus` playlist download URL for this account.
    pub fn playlist_url(&self) -> Result<url::Url, ConfigError> {
        let base = self.base_url.trim().trim_end_matches('/');
        let mut url: url::Url =
            format!("{base}/get.php").parse().map_err(|_| ConfigError::Validation {
                field: "xtream.base_url".into(),
                reason: format!("invalid URL: {}", self.base_url),
            })?;
        url.query_pairs_mut()
            .append_pair("username", &self.username)
            .append_pair("password", &self.password)
            .append_pair("type", "m3u_plus")
            .append_pair("output", self.stream_output()?);
        Ok(url)
    }
}

/// Where generated files and the cached playlist live.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Paths {
    #[serde(default = "default_out_dir")]
    pub out_dir: PathBuf,

    #[serde(default = "default_playlist")]
    pub playlist: PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        Self {
            out_dir: default_out_dir(),
            playlist: default_playlist(),
        }
    }
}

fn default_out_dir() -> PathBuf {
    data_dir().join("output")
}

fn default_playlist() -> PathBuf {
    data_dir().join("playlist.m3u")
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct SyncOptions {
    /// Remove files for content that is no longer allowed.
    #[serde(default = "default_true")]
    pub sync_delete: bool,

    /// Also remove sidecar files (`.nfo`, artwork) next to deleted entries.
    #[serde(default)]
    pub prune_sidecars: bool,

    /// Download a fresh playlist before each run.
    #[serde(default = "default_true")]
    pub auto_refresh_playlist: bool,
}

impl SyncOptions {
    pub fn policy(&self) -> SyncPolicy {
        SyncPolicy {
            delete: self.sync_delete,
            prune_sidecars: self.prune_sidecars,
        }
    }
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            sync_delete: true,
            prune_sidecars: false,
            auto_refresh_playlist: true,
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Schedule {
    #[serde(default)]
    pub enabled: bool,

    /// Local time of the daily run, "HH:MM".
    #[serde(default = "default_daily_time")]
    pub daily_time: String,
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            enabled: false,
            daily_time: default_daily_time(),
        }
    }
}

fn default_daily_time() -> String {
    "03:30".into()
}

impl Schedule {
    pub fn time(&self) -> Result<NaiveTime, ConfigError> {
        let invalid = || ConfigError::Validation {
            field: "schedule.daily_time".into(),
            reason: format!("expected HH:MM, got '{}'", self.daily_time),
        };
        let (hh, mm) = self.daily_time.trim().split_once(':').ok_or_else(invalid)?;
        if hh.len() != 2 || mm.len() != 2 {
            return Err(invalid());
        }
        let hour = hh.parse().map_err(|_| invalid())?;
        let minute = mm.parse().map_err(|_| invalid())?;
        NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(invalid)
    }

    /// The first scheduled run strictly after `now`, or `None` when the
    /// schedule is disabled.
    pub fn next_run_after(&self, now: NaiveDateTime) -> Result<Option<NaiveDateTime>, ConfigError> {
        if !self.enabled {
            return Ok(None);
        }
        let today = now.date().and_time(self.time()?);
        if today > now {
            return Ok(Some(today));
        }
        Ok(today.checked_add_days(Days::new(1)))
    }
}

impl Config {
    /// Check the fields that have a constrained format.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.xtream.stream_output()?;
        self.schedule.time()?;
        Ok(())
    }
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("org", "strmsync", "strmsync")
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("strmsync");
    p
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback().join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn data_dir() -> PathBuf {
    project_dirs().map_or_else(dirs_fallback, |dirs| dirs.data_dir().to_path_buf())
}

/// The draft file belonging to a config file: same directory, `draft.toml`.
pub fn draft_path(config_path: &Path) -> PathBuf {
    config_path.with_file_name("draft.toml")
}

pub fn last_run_path(config_path: &Path) -> PathBuf {
    config_path.with_file_name("last_run.json")
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the config from defaults, the TOML file at `path` (if present),
/// and `STRMSYNC_` environment variables (`STRMSYNC_XTREAM__USERNAME`).
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading config");

    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("STRMSYNC_").split("__"));

    let config: Config = figment.extract()?;
    config.validate()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`, creating parents.
pub fn save_config(path: &Path, cfg: &Config) -> Result<(), ConfigError> {
    cfg.validate()?;
    write_toml(path, cfg)?;
    debug!(path = %path.display(), "config saved");
    Ok(())
}

fn write_toml<T: Serialize>(path: &Path, value: &T) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(value)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Draft store ─────────────────────────────────────────────────────

/// Read the unsaved allow-list, if one exists.
pub fn load_draft(path: &Path) -> Result<Option<AllowList>, ConfigError> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let allow = toml::from_str(&raw).map_err(|source| ConfigError::Deserialization {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), "draft loaded");
    Ok(Some(allow))
}

pub fn save_draft(path: &Path, allow: &AllowList) -> Result<(), ConfigError> {
    write_toml(path, allow)?;
    debug!(path = %path.display(), "draft saved");
    Ok(())
}

/// Remove the draft. Returns whether a draft existed.
pub fn clear_draft(path: &Path) -> Result<bool, ConfigError> {
    match std::fs::remove_file(path) {
        Ok(()) => {
            debug!(path = %path.display(), "draft cleared");
            Ok(true)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

// ── Last run ────────────────────────────────────────────────────────

/// What started a sync run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunReason {
    Manual,
    Scheduled,
}

impl std::fmt::Display for RunReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Manual => "manual",
            Self::Scheduled => "scheduled",
        })
    }
}

/// Outcome of the most recent sync run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LastRun {
    pub time: DateTime<Utc>,
    pub reason: RunReason,
    pub result: SyncReport,
}

pub fn save_last_run(path: &Path, run: &LastRun) -> Result<(), ConfigError> {
    let json = serde_json::to_vec_pretty(run).map_err(|source| ConfigError::Record {
        path: path.to_path_buf(),
        source,
    })?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, json)?;
    debug!(path = %path.display(), "last run recorded");
    Ok(())
}

/// The last run, if one was recorded. An unreadable record counts as none.
pub fn load_last_run(path: &Path) -> Option<LastRun> {
    let raw = std::fs::read(path).ok()?;
    match serde_json::from_slice(&raw) {
        Ok(run) => Some(run),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "ignoring unreadable last run record");
            None
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> Config {
        let mut cfg = Config::default();
        cfg.xtream.base_url = "http://provider.invalid:8080/".into();
        cfg.xtream.username = "user".into();
        cfg.xtream.password = "p&ss".into();
        cfg.allow.livetv.titles.insert("Channel1".into());
        cfg.allow.livetv.full_categories.insert("News".into());
        cfg.allow.series.shows.insert("Show A".into());
        cfg.allow.series.titles.insert("Show A S01E01".into());
        cfg
    }

    #[test]
    fn save_then_load_preserves_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let cfg = sample();

        save_config(&path, &cfg).unwrap();
        let loaded = load_config(&path).unwrap();
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.xtream.output, "ts");
        assert_eq!(cfg.schedule.daily_time, "03:30");
        assert!(cfg.sync.sync_delete);
        assert!(cfg.sync.auto_refresh_playlist);
        assert!(!cfg.sync.prune_sidecars);
        assert!(cfg.allow.is_empty());
    }

    #[test]
    fn partial_allow_section_normalizes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[allow.livetv]
categories = ["Legacy"]
titles = ["A"]

[allow.series]
shows = ["Show A"]
"#,
        )
        .unwrap();

        let cfg = load_config(&path).unwrap();
        assert!(cfg.allow.livetv.full_categories.is_empty());
        assert!(cfg.allow.livetv.categories.contains("Legacy"));
        assert!(cfg.allow.series.full_shows.is_empty());
        assert!(cfg.allow.movies.titles.is_empty());
    }

    #[test]
    fn invalid_daily_time_is_rejected() {
        let mut cfg = Config::default();
        for bad in ["3:30", "24:00", "12-00", "ab:cd"] {
            cfg.schedule.daily_time = bad.into();
            assert!(
                matches!(cfg.validate(), Err(ConfigError::Validation { .. })),
                "{bad} should be rejected"
            );
        }
        cfg.schedule.daily_time = "23:59".into();
        assert_eq!(
            cfg.schedule.time().unwrap(),
            NaiveTime::from_hms_opt(23, 59, 0).unwrap()
        );
    }

    #[test]
    fn next_run_is_today_or_tomorrow() {
        let at = |d: u32, h: u32, m: u32| {
            chrono::NaiveDate::from_ymd_opt(2026, 3, d)
                .unwrap()
                .and_hms_opt(h, m, 0)
                .unwrap()
        };
        let mut schedule = Schedule::default();
        assert_eq!(schedule.next_run_after(at(10, 1, 0)).unwrap(), None);

        schedule.enabled = true;
        assert_eq!(schedule.next_run_after(at(10, 1, 0)).unwrap(), Some(at(10, 3, 30)));
        assert_eq!(schedule.next_run_after(at(10, 3, 30)).unwrap(), Some(at(11, 3, 30)));
        let april_first = chrono::NaiveDate::from_ymd_opt(2026, 4, 1)
            .unwrap()
            .and_hms_opt(3, 30, 0)
            .unwrap();
        assert_eq!(schedule.next_run_after(at(31, 23, 0)).unwrap(), Some(april_first));

        schedule.daily_time = "7:00".into();
        assert!(schedule.next_run_after(at(10, 1, 0)).is_err());
    }

    #[test]
    fn sync_options_map_to_policy() {
        let options = SyncOptions {
            sync_delete: false,
            prune_sidecars: true,
            ..SyncOptions::default()
        };
        assert_eq!(
            options.policy(),
            SyncPolicy {
                delete: false,
                prune_sidecars: true,
            }
        );
    }

    #[test]
    fn last_run_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = last_run_path(&dir.path().join("config.toml"));
        assert_eq!(path.file_name().unwrap(), "last_run.json");
        assert_eq!(load_last_run(&path), None);

        let run = LastRun {
            time: Utc::now(),
            reason: RunReason::Scheduled,
            result: SyncReport {
                created: 3,
                deleted: 1,
                ..SyncReport::default()
            },
        };
        save_last_run(&path, &run).unwrap();
        assert_eq!(load_last_run(&path), Some(run));

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"reason\": \"scheduled\""));
        assert_eq!(RunReason::Scheduled.to_string(), "scheduled");

        std::fs::write(&path, "{").unwrap();
        assert_eq!(load_last_run(&path), None);
    }

    #[test]
    fn legacy_m3u_output_means_ts() {
        let mut xtream = Xtream {
            output: "M3U".into(),
            ..Xtream::default()
        };
        assert_eq!(xtream.stream_output().unwrap(), "ts");
        xtream.output = "m3u8".into();
        assert_eq!(xtream.stream_output().unwrap(), "m3u8");
        xtream.output = "mp4".into();
        assert!(xtream.stream_output().is_err());
    }

    #[test]
    fn playlist_url_encodes_credentials() {
        let url = sample().xtream.playlist_url().unwrap();
        assert_eq!(
            url.as_str(),
            "http://provider.invalid:8080/get.php?username=user&password=p%26ss&type=m3u_plus&output=ts"
        );
    }

    #[test]
    fn draft_round_trip_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let path = draft_path(&dir.path().join("config.toml"));
        assert_eq!(path.file_name().unwrap(), "draft.toml");

        assert_eq!(load_draft(&path).unwrap(), None);
        assert!(!clear_draft(&path).unwrap());

        let allow = sample().allow;
        save_draft(&path, &allow).unwrap();
        assert_eq!(load_draft(&path).unwrap(), Some(allow));

        assert!(clear_draft(&path).unwrap());
        assert_eq!(load_draft(&path).unwrap(), None);
    }

    #[test]
    fn corrupt_draft_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("draft.toml");
        std::fs::write(&path, "livetv = [").unwrap();
        let err = load_draft(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Deserialization { .. }));
        assert!(err.to_string().contains("draft.toml"));
    }
}
