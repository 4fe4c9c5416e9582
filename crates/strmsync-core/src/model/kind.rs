// ── Content kinds ──

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::error::CoreError;

/// The three top-level sections of a catalog.
///
/// `livetv` and `movies` are category-based (category → item); `series`
/// is show-based (show → season → episode), where seasons only group
/// episodes for display and are never selectable on their own.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, EnumIter,
)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    #[strum(to_string = "livetv")]
    LiveTv,
    #[strum(to_string = "movies")]
    Movies,
    #[strum(to_string = "series")]
    Series,
}

impl ContentKind {
    /// `true` for the show-based kind, which carries the extra `shows` marker set.
    pub const fn is_show_based(self) -> bool {
        matches!(self, Self::Series)
    }

    /// Human noun for a container of this kind.
    pub const fn container_noun(self) -> &'static str {
        match self {
            Self::LiveTv | Self::Movies => "category",
            Self::Series => "show",
        }
    }

    /// Human noun for a leaf of this kind.
    pub const fn leaf_noun(self) -> &'static str {
        match self {
            Self::LiveTv => "channel",
            Self::Movies => "movie",
            Self::Series => "episode",
        }
    }
}

impl FromStr for ContentKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "livetv" | "live" | "live-tv" | "live_tv" => Ok(Self::LiveTv),
            "movies" | "movie" | "vod" => Ok(Self::Movies),
            "series" | "shows" => Ok(Self::Series),
            _ => Err(CoreError::UnknownKind { value: s.into() }),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn display_matches_config_keys() {
        let names: Vec<String> = ContentKind::iter().map(|k| k.to_string()).collect();
        assert_eq!(names, ["livetv", "movies", "series"]);
    }

    #[test]
    fn parses_aliases_case_insensitively() {
        assert_eq!("LiveTV".parse::<ContentKind>().unwrap(), ContentKind::LiveTv);
        assert_eq!("movie".parse::<ContentKind>().unwrap(), ContentKind::Movies);
        assert_eq!(" Series ".parse::<ContentKind>().unwrap(), ContentKind::Series);
    }

    #[test]
    fn rejects_unknown_kind() {
        let err = "radio".parse::<ContentKind>().unwrap_err();
        assert_eq!(
            err,
            CoreError::UnknownKind {
                value: "radio".into()
            }
        );
    }

    #[test]
    fn serde_uses_lowercase_names() {
        let json = serde_json::to_string(&ContentKind::LiveTv).unwrap();
        assert_eq!(json, "\"livetv\"");
        let back: ContentKind = serde_json::from_str("\"series\"").unwrap();
        assert_eq!(back, ContentKind::Series);
    }
}
