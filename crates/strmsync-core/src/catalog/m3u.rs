// ── M3U playlist → Catalog ──
//
// Xtream `m3u_plus` playlists carry everything in `#EXTINF` attributes.
// Classification is heuristic: a series hint in the group title or an
// episode marker in the name wins, then a movie container extension,
// everything else is live TV.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::model::{Catalog, CatalogItem, ContentKind, Episode};

/// Group-title substrings that mark a series category.
const SERIES_GROUP_HINTS: [&str; 4] = ["series", "serien", "tv shows", "shows"];

/// URL extensions classified as movies.
const MOVIE_EXTENSIONS: [&str; 2] = ["mkv", "mp4"];

const DEFAULT_GROUP: &str = "Ungrouped";

/// Separator characters stripped around show names and episode titles.
const SEPARATORS: &str = " -_:|.";

static EXTINF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#EXTINF:(?P<dur>-?\d+)\s*(?P<attrs>[^,]*),(?P<title>.*)$")
        .expect("EXTINF pattern is valid")
});

static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([A-Za-z0-9\-_]+)="([^"]*)""#).expect("attribute pattern is valid")
});

static EPISODE_HINT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(s\s*\d{1,2}\s*e\s*\d{1,2}|s\d{1,2}e\d{1,2}|\d{1,2}\s*x\s*\d{1,2})")
        .expect("episode hint pattern is valid")
});

static LANG_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\((DE|GER|DEU|EN|ENG|FR|ES|IT|TR|AR|RU|PL|NL)\)")
        .expect("language tag pattern is valid")
});

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Episode patterns, tried in order: `S01 E06`, `S01E06`, `1x06`.
static EPISODE_PATTERNS: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        r"(?i)^(?P<show>.*?)[\s\-_:|.]*S\s*(?P<s>\d{1,2})\s*E\s*(?P<e>\d{1,2})[\s\-_:|.]*?(?P<ep>.*)$",
        r"(?i)^(?P<show>.*?)[\s\-_:|.]*S(?P<s>\d{1,2})E(?P<e>\d{1,2})[\s\-_:|.]*?(?P<ep>.*)$",
        r"(?i)^(?P<show>.*?)[\s\-_:|.]*?(?P<s>\d{1,2})\s*x\s*(?P<e>\d{1,2})[\s\-_:|.]*?(?P<ep>.*)$",
    ]
    .map(|pattern| Regex::new(pattern).expect("episode pattern is valid"))
});

/// One `#EXTINF` entry with its stream URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistEntry {
    pub title: String,
    pub attrs: BTreeMap<String, String>,
    pub url: String,
}

/// Show / season / episode split of a series name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeParts {
    pub show: String,
    pub season: u32,
    pub episode: u32,
    pub title: Option<String>,
}

/// Parse playlist text into entries.
///
/// The URL of an entry is the next line that is not a `#` directive.
/// Malformed `#EXTINF` lines and entries without a URL are skipped.
pub fn parse_m3u(text: &str) -> Vec<PlaylistEntry> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    let mut entries = Vec::new();
    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];
        if !line.starts_with("#EXTINF") {
            i += 1;
            continue;
        }
        let Some(caps) = EXTINF_RE.captures(line) else {
            i += 1;
            continue;
        };

        let attrs = parse_attrs(caps.name("attrs").map_or("", |m| m.as_str()));
        let title = caps.name("title").map_or("", |m| m.as_str()).trim();

        let url_at = lines[i + 1..]
            .iter()
            .position(|l| !l.starts_with('#'))
            .map(|offset| i + 1 + offset);

        match url_at {
            Some(j) => {
                entries.push(PlaylistEntry {
                    title: title.to_owned(),
                    attrs,
                    url: lines[j].to_owned(),
                });
                i = j + 1;
            }
            None => break,
        }
    }
    entries
}

/// `key="value"` pairs from the attribute section of an `#EXTINF` line.
pub fn parse_attrs(raw: &str) -> BTreeMap<String, String> {
    ATTR_RE
        .captures_iter(raw)
        .map(|c| (c[1].to_owned(), c[2].to_owned()))
        .collect()
}

pub fn has_episode_pattern(name: &str) -> bool {
    EPISODE_HINT_RE.is_match(&name.to_lowercase())
}

fn is_series_group(group: &str) -> bool {
    let group = group.to_lowercase();
    SERIES_GROUP_HINTS.iter().any(|hint| group.contains(hint))
}

/// Lowercased extension of the URL path, or empty. Relative references
/// and bare file paths use the text before any query or fragment.
fn url_extension(raw: &str) -> String {
    let path = match url::Url::parse(raw) {
        Ok(url) => url.path().to_lowercase(),
        Err(_) => raw
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_lowercase(),
    };
    path.rsplit_once('.')
        .map(|(_, ext)| ext.to_owned())
        .unwrap_or_default()
}

/// Remove language tags like `(DE)` and collapse whitespace.
pub fn clean_lang_tags(name: &str) -> String {
    let stripped = LANG_TAG_RE.replace_all(name.trim(), "");
    WHITESPACE_RE.replace_all(&stripped, " ").trim().to_owned()
}

fn trim_separators(s: &str) -> &str {
    s.trim_matches(|c: char| SEPARATORS.contains(c))
}

/// Split a series name into show, season, episode and episode title.
pub fn extract_show_season_episode(raw: &str) -> Option<EpisodeParts> {
    let name = raw.trim();
    EPISODE_PATTERNS.iter().find_map(|re| {
        let caps = re.captures(name)?;
        let show = clean_lang_tags(trim_separators(&caps["show"]));
        let title = trim_separators(&caps["ep"]);
        Some(EpisodeParts {
            show,
            season: caps["s"].parse().unwrap_or(0),
            episode: caps["e"].parse().unwrap_or(0),
            title: (!title.is_empty()).then(|| title.to_owned()),
        })
    })
}

/// Decide which section an entry belongs to.
pub fn classify(url: &str, group: &str, tvg_name: &str, title: &str) -> ContentKind {
    if is_series_group(group) || has_episode_pattern(tvg_name) || has_episode_pattern(title) {
        return ContentKind::Series;
    }
    if MOVIE_EXTENSIONS.contains(&url_extension(url).as_str()) {
        return ContentKind::Movies;
    }
    ContentKind::LiveTv
}

fn non_empty<'a>(value: Option<&'a String>, fallback: &'a str) -> &'a str {
    value.map(String::as_str).filter(|v| !v.is_empty()).unwrap_or(fallback)
}

/// Build the full catalog tree from playlist text.
pub fn build_catalog(text: &str) -> Catalog {
    let mut catalog = Catalog::default();

    for entry in parse_m3u(text) {
        let group = non_empty(entry.attrs.get("group-title"), DEFAULT_GROUP);
        let tvg_name = non_empty(entry.attrs.get("tvg-name"), &entry.title);
        let logo = non_empty(entry.attrs.get("tvg-logo"), "");
        let kind = classify(&entry.url, group, tvg_name, &entry.title);

        let item = CatalogItem {
            group: group.to_owned(),
            tvg_name: tvg_name.to_owned(),
            title: entry.title.clone(),
            url: entry.url.clone(),
            logo: logo.to_owned(),
        };

        match kind {
            ContentKind::LiveTv => catalog.livetv.push(item),
            ContentKind::Movies => catalog.movies.push(item),
            ContentKind::Series => {
                let parts = extract_show_season_episode(tvg_name).unwrap_or_else(|| EpisodeParts {
                    show: clean_lang_tags(tvg_name),
                    season: 0,
                    episode: 0,
                    title: None,
                });
                catalog.series.push(Episode {
                    item,
                    show: parts.show,
                    season: parts.season,
                    episode: parts.episode,
                    ep_title: parts.title,
                });
            }
        }
    }

    debug!(
        livetv = catalog.livetv.total,
        movies = catalog.movies.total,
        series = catalog.series.total,
        "built catalog from playlist"
    );
    catalog
}
