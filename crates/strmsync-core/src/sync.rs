// ── Library sync ──
//
// Writes the allowed part of a catalog as `.strm` files under an output
// directory:
//
//   LiveTV/<group>/<name>.strm
//   Movies/<group>/<name>.strm
//   Series/<show>/Season NN/<show> - SxxEyy.strm
//
// A manifest under `.xtream_state/` records what the previous run wrote,
// so entries that lost their allowance can be removed on the next run.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::allow::AllowList;
use crate::catalog::m3u::clean_lang_tags;
use crate::error::SyncError;
use crate::model::{Catalog, CatalogItem, ContentKind};

/// Bookkeeping directory inside the output directory.
pub const STATE_DIR: &str = ".xtream_state";

const MANIFEST_FILE: &str = "manifest.json";

const MAX_NAME_CHARS: usize = 180;

const NAME_TRIM: [char; 3] = [' ', '.', '_'];

/// Files next to a `.strm` that media servers generate or download.
const SIDECAR_EXTENSIONS: [&str; 8] = ["nfo", "jpg", "jpeg", "png", "webp", "srt", "ass", "sub"];

/// What a run may remove.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncPolicy {
    /// Remove `.strm` files from earlier runs that are no longer allowed.
    pub delete: bool,
    /// With `delete`, also remove sidecars sharing a removed file's stem.
    pub prune_sidecars: bool,
}

/// Per-run counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub skipped_not_allowed: usize,
    pub deleted: usize,
    pub sidecars_deleted: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ManifestEntry {
    kind: ContentKind,
    container: String,
    name: String,
    url: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Manifest {
    #[serde(default)]
    generated_at: Option<DateTime<Utc>>,
    /// Output-relative path with `/` separators.
    #[serde(default)]
    items: BTreeMap<String, ManifestEntry>,
}

impl Manifest {
    /// A missing or unreadable manifest reads as empty, so the run only adds.
    fn load(path: &Path) -> Self {
        let raw = match fs::read(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Self::default(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "sync manifest unreadable, starting fresh");
                return Self::default();
            }
        };
        serde_json::from_slice(&raw).unwrap_or_else(|e| {
            warn!(path = %path.display(), error = %e, "sync manifest malformed, starting fresh");
            Self::default()
        })
    }

    fn save(&self, path: &Path) -> Result<(), SyncError> {
        let json = serde_json::to_vec_pretty(self)?;
        fs::write(path, json).map_err(io_error("write", path))
    }
}

fn io_error<'a>(action: &'static str, path: &'a Path) -> impl FnOnce(io::Error) -> SyncError + 'a {
    move |source| SyncError::Io {
        action,
        path: path.to_path_buf(),
        source,
    }
}

/// File-system safe form of a display name.
///
/// Collapses whitespace, drops bidi marks, replaces `/\:*?"<>|` with `_`,
/// trims ` ._` from both ends and caps the length at 180 characters. A
/// name with nothing left becomes `Unknown`.
pub fn safe_name(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    let replaced: String = collapsed
        .chars()
        .filter(|c| !matches!(c, '\u{200e}' | '\u{200f}'))
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            other => other,
        })
        .collect();

    let trimmed = replaced.trim_matches(NAME_TRIM);
    if trimmed.is_empty() {
        return "Unknown".into();
    }
    let capped: String = trimmed.chars().take(MAX_NAME_CHARS).collect();
    capped.trim_end_matches(NAME_TRIM).to_owned()
}

/// Whether one catalog entry is written by a sync run.
///
/// A sticky-full container allows every leaf, including ones added after
/// the selection was made. The legacy `categories` grant does the same for
/// livetv and movies. Otherwise the leaf must be listed in `titles`.
pub fn is_allowed(allow: &AllowList, kind: ContentKind, container: &str, leaf: Option<&str>) -> bool {
    let group = allow.group(kind);
    let legacy = match kind {
        ContentKind::LiveTv => allow.livetv.categories.contains(container),
        ContentKind::Movies => allow.movies.categories.contains(container),
        ContentKind::Series => false,
    };
    group.is_sticky_full(container) || legacy || leaf.is_some_and(|l| group.titles.contains(l))
}

/// One catalog entry and the output-relative path it would be written to.
struct Planned<'a> {
    kind: ContentKind,
    container: &'a str,
    item: &'a CatalogItem,
    segments: Vec<String>,
}

impl Planned<'_> {
    fn key(&self) -> String {
        self.segments.join("/")
    }

    fn target(&self, out_dir: &Path) -> PathBuf {
        self.segments.iter().fold(out_dir.to_path_buf(), |path, s| path.join(s))
    }
}

fn strm_file(name: &str) -> String {
    format!("{}.strm", safe_name(name))
}

fn plan(catalog: &Catalog) -> Vec<Planned<'_>> {
    let capacity = [ContentKind::LiveTv, ContentKind::Movies, ContentKind::Series]
        .into_iter()
        .map(|kind| catalog.total(kind))
        .sum();
    let mut planned = Vec::with_capacity(capacity);

    for (group, items) in &catalog.livetv.categories {
        for item in items {
            planned.push(Planned {
                kind: ContentKind::LiveTv,
                container: group,
                item,
                segments: vec![
                    "LiveTV".into(),
                    safe_name(group),
                    strm_file(item.leaf_id().unwrap_or_default()),
                ],
            });
        }
    }

    for (group, items) in &catalog.movies.categories {
        for item in items {
            let name = clean_lang_tags(item.leaf_id().unwrap_or_default());
            planned.push(Planned {
                kind: ContentKind::Movies,
                container: group,
                item,
                segments: vec!["Movies".into(), safe_name(group), strm_file(&name)],
            });
        }
    }

    for (show, entry) in &catalog.series.shows {
        for ep in entry.episodes() {
            let base = format!("{show} - S{:02}E{:02}", ep.season, ep.episode);
            planned.push(Planned {
                kind: ContentKind::Series,
                container: show,
                item: &ep.item,
                segments: vec![
                    "Series".into(),
                    safe_name(show),
                    format!("Season {:02}", ep.season),
                    strm_file(&base),
                ],
            });
        }
    }

    planned
}

/// Write `url` to `path` unless the file already holds it. Returns
/// whether the file was written.
fn write_strm(path: &Path, url: &str) -> Result<bool, SyncError> {
    let content = format!("{}\n", url.trim());
    if fs::read_to_string(path).is_ok_and(|existing| existing == content) {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_error("create", parent))?;
    }
    fs::write(path, content).map_err(io_error("write", path))?;
    Ok(true)
}

/// Resolve a manifest key to a `.strm` path inside `out_dir`. Keys that
/// would escape the output directory resolve to `None`.
fn confined_strm(out_dir: &Path, key: &str) -> Option<PathBuf> {
    let rel = Path::new(key);
    let confined = rel.components().all(|c| matches!(c, Component::Normal(_)));
    let is_strm = rel.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("strm"));
    (confined && is_strm).then(|| out_dir.join(rel))
}

fn remove_sidecars(strm: &Path) -> usize {
    SIDECAR_EXTENSIONS
        .iter()
        .map(|ext| strm.with_extension(ext))
        .filter(|side| side.is_file() && fs::remove_file(side).is_ok())
        .count()
}

/// Remove `start` and its ancestors while they are empty, stopping at `stop`.
fn remove_empty_dirs(start: &Path, stop: &Path) {
    let mut current = start;
    while current != stop && current.starts_with(stop) {
        if fs::remove_dir(current).is_err() {
            return;
        }
        let Some(parent) = current.parent() else {
            return;
        };
        current = parent;
    }
}

fn remove_stale(
    out_dir: &Path,
    previous: &Manifest,
    next: &Manifest,
    policy: SyncPolicy,
    report: &mut SyncReport,
) {
    for key in previous.items.keys().filter(|k| !next.items.contains_key(*k)) {
        let Some(path) = confined_strm(out_dir, key) else {
            warn!(key = %key, "ignoring manifest entry outside the output directory");
            continue;
        };
        if !path.is_file() {
            continue;
        }
        if let Err(e) = fs::remove_file(&path) {
            warn!(path = %path.display(), error = %e, "could not remove stale entry");
            continue;
        }
        debug!(key = %key, "removed stale entry");
        report.deleted += 1;

        if policy.prune_sidecars {
            report.sidecars_deleted += remove_sidecars(&path);
        }
        if let Some(parent) = path.parent() {
            remove_empty_dirs(parent, out_dir);
        }
    }
}

/// Bring `out_dir` in line with what `allow` admits from `catalog`.
///
/// Entries are written only when their content changed. With
/// `policy.delete`, files recorded by the previous run and not wanted any
/// more are removed, along with directories left empty.
pub fn run_sync(
    catalog: &Catalog,
    allow: &AllowList,
    out_dir: &Path,
    policy: SyncPolicy,
) -> Result<SyncReport, SyncError> {
    let state_dir = out_dir.join(STATE_DIR);
    fs::create_dir_all(&state_dir).map_err(io_error("create", &state_dir))?;
    let manifest_path = state_dir.join(MANIFEST_FILE);

    let previous = Manifest::load(&manifest_path);
    let mut next = Manifest {
        generated_at: Some(Utc::now()),
        items: BTreeMap::new(),
    };
    let mut report = SyncReport::default();

    for entry in plan(catalog) {
        let leaf = entry.item.leaf_id();
        if !is_allowed(allow, entry.kind, entry.container, leaf) {
            report.skipped_not_allowed += 1;
            continue;
        }

        let key = entry.key();
        if write_strm(&entry.target(out_dir), &entry.item.url)? {
            if previous.items.contains_key(&key) || next.items.contains_key(&key) {
                report.updated += 1;
            } else {
                report.created += 1;
            }
        } else {
            report.unchanged += 1;
        }

        next.items.insert(
            key,
            ManifestEntry {
                kind: entry.kind,
                container: entry.container.to_owned(),
                name: leaf.unwrap_or_default().to_owned(),
                url: entry.item.url.clone(),
            },
        );
    }

    if policy.delete {
        remove_stale(out_dir, &previous, &next, policy, &mut report);
    }
    next.save(&manifest_path)?;

    info!(
        out_dir = %out_dir.display(),
        created = report.created,
        updated = report.updated,
        deleted = report.deleted,
        "sync finished"
    );
    Ok(report)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::build_catalog;
    use pretty_assertions::assert_eq;

    const PLAYLIST: &str = r#"#EXTM3U
#EXTINF:-1 tvg-name="Channel1" group-title="News",Channel 1
http://host/live/1.ts
#EXTINF:-1 tvg-name="Channel2" group-title="News",Channel 2
http://host/live/2.ts
#EXTINF:-1 tvg-name="Toons" group-title="Kids",Toons
http://host/live/3.ts
#EXTINF:-1 tvg-name="Heat (DE)" group-title="Action/Crime",Heat
http://host/movie/4.mkv
#EXTINF:-1 tvg-name="Show A S01E01" group-title="Series",Show A S01E01
http://host/series/5.mkv
#EXTINF:-1 tvg-name="Show A S01E02" group-title="Series",Show A S01E02
http://host/series/6.mkv
"#;

    fn selection() -> AllowList {
        let mut allow = AllowList::default();
        allow.livetv.full_categories.insert("News".into());
        allow.movies.titles.insert("Heat (DE)".into());
        allow.series.titles.insert("Show A S01E02".into());
        allow.series.shows.insert("Show A".into());
        allow
    }

    const KEEP: SyncPolicy = SyncPolicy {
        delete: false,
        prune_sidecars: false,
    };

    const DELETE: SyncPolicy = SyncPolicy {
        delete: true,
        prune_sidecars: true,
    };

    #[test]
    fn safe_name_cleans_display_names() {
        assert_eq!(safe_name("  News \t  HD  "), "News HD");
        assert_eq!(safe_name("What? Now: Live"), "What_ Now_ Live");
        assert_eq!(safe_name("\u{200e}Arabic\u{200f}"), "Arabic");
        assert_eq!(safe_name(".hidden."), "hidden");
        assert_eq!(safe_name(".."), "Unknown");
        assert_eq!(safe_name("a/b"), "a_b");
        assert_eq!(safe_name(&"x".repeat(200)).chars().count(), 180);
    }

    #[test]
    fn allowance_follows_effective_membership() {
        let mut allow = selection();
        allow.movies.categories.insert("Legacy".into());

        assert!(is_allowed(&allow, ContentKind::LiveTv, "News", Some("Brand New")));
        assert!(!is_allowed(&allow, ContentKind::LiveTv, "Kids", Some("Toons")));
        assert!(is_allowed(&allow, ContentKind::Movies, "Legacy", None));
        assert!(is_allowed(&allow, ContentKind::Movies, "Action", Some("Heat (DE)")));
        // The `shows` marker alone does not admit every episode.
        assert!(!is_allowed(&allow, ContentKind::Series, "Show A", Some("Show A S01E01")));
        assert!(is_allowed(&allow, ContentKind::Series, "Show A", Some("Show A S01E02")));
    }

    #[test]
    fn writes_allowed_entries_into_the_library_layout() {
        let out = tempfile::tempdir().unwrap();
        let catalog = build_catalog(PLAYLIST);

        let report = run_sync(&catalog, &selection(), out.path(), KEEP).unwrap();
        assert_eq!(
            report,
            SyncReport {
                created: 4,
                skipped_not_allowed: 2,
                ..SyncReport::default()
            }
        );

        let read = |rel: &str| fs::read_to_string(out.path().join(rel)).unwrap();
        assert_eq!(read("LiveTV/News/Channel1.strm"), "http://host/live/1.ts\n");
        assert_eq!(read("LiveTV/News/Channel2.strm"), "http://host/live/2.ts\n");
        assert_eq!(read("Movies/Action_Crime/Heat.strm"), "http://host/movie/4.mkv\n");
        assert_eq!(
            read("Series/Show A/Season 01/Show A - S01E02.strm"),
            "http://host/series/6.mkv\n"
        );
        assert!(!out.path().join("LiveTV/Kids").exists());
        assert!(out.path().join(STATE_DIR).join(MANIFEST_FILE).is_file());
    }

    #[test]
    fn second_run_only_rewrites_changed_urls() {
        let out = tempfile::tempdir().unwrap();
        let allow = selection();
        run_sync(&build_catalog(PLAYLIST), &allow, out.path(), KEEP).unwrap();

        let moved = PLAYLIST.replace("http://host/live/1.ts", "http://mirror/live/1.ts");
        let report = run_sync(&build_catalog(&moved), &allow, out.path(), KEEP).unwrap();
        assert_eq!(report.created, 0);
        assert_eq!(report.updated, 1);
        assert_eq!(report.unchanged, 3);
        assert_eq!(
            fs::read_to_string(out.path().join("LiveTV/News/Channel1.strm")).unwrap(),
            "http://mirror/live/1.ts\n"
        );
    }

    #[test]
    fn deselected_entries_are_removed_with_sidecars_and_empty_dirs() {
        let out = tempfile::tempdir().unwrap();
        let catalog = build_catalog(PLAYLIST);
        run_sync(&catalog, &selection(), out.path(), DELETE).unwrap();
        fs::write(out.path().join("LiveTV/News/Channel1.nfo"), "<nfo/>").unwrap();
        fs::write(out.path().join("LiveTV/News/Channel1.jpg"), "jpg").unwrap();

        let mut narrowed = selection();
        narrowed.livetv.full_categories.clear();
        let report = run_sync(&catalog, &narrowed, out.path(), DELETE).unwrap();

        assert_eq!(report.deleted, 2);
        assert_eq!(report.sidecars_deleted, 2);
        assert!(!out.path().join("LiveTV").exists());
        assert!(out.path().join("Movies/Action_Crime/Heat.strm").is_file());
    }

    #[test]
    fn without_delete_policy_stale_files_stay() {
        let out = tempfile::tempdir().unwrap();
        let catalog = build_catalog(PLAYLIST);
        run_sync(&catalog, &selection(), out.path(), KEEP).unwrap();

        let report = run_sync(&catalog, &AllowList::default(), out.path(), KEEP).unwrap();
        assert_eq!(report.deleted, 0);
        assert_eq!(report.skipped_not_allowed, 6);
        assert!(out.path().join("LiveTV/News/Channel1.strm").is_file());
    }

    #[test]
    fn manifest_entries_outside_the_output_dir_are_never_deleted() {
        let root = tempfile::tempdir().unwrap();
        let out = root.path().join("library");
        let outside = root.path().join("precious.strm");
        fs::write(&outside, "keep me\n").unwrap();

        fs::create_dir_all(out.join(STATE_DIR)).unwrap();
        fs::write(
            out.join(STATE_DIR).join(MANIFEST_FILE),
            r#"{"items": {"../precious.strm": {"kind": "livetv", "container": "x", "name": "x", "url": "u"}}}"#,
        )
        .unwrap();

        let report = run_sync(&Catalog::default(), &AllowList::default(), &out, DELETE).unwrap();
        assert_eq!(report.deleted, 0);
        assert!(outside.is_file());
    }

    #[test]
    fn malformed_manifest_starts_fresh() {
        let out = tempfile::tempdir().unwrap();
        fs::create_dir_all(out.path().join(STATE_DIR)).unwrap();
        fs::write(out.path().join(STATE_DIR).join(MANIFEST_FILE), "{not json").unwrap();

        let report = run_sync(&build_catalog(PLAYLIST), &selection(), out.path(), DELETE).unwrap();
        assert_eq!(report.created, 4);
        let manifest: Manifest =
            serde_json::from_slice(&fs::read(out.path().join(STATE_DIR).join(MANIFEST_FILE)).unwrap())
                .unwrap();
        assert_eq!(manifest.items.len(), 4);
        assert!(manifest.generated_at.is_some());
    }
}
