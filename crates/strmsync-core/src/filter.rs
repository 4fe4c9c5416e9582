// ── Display filter predicate ──

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::error::CoreError;

/// Narrows which rows a consumer renders. Stateless: it only sees the
/// three display flags of a node, never kinds or containers.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FilterMode {
    #[default]
    All,
    Selected,
    Unselected,
    Pending,
    UnselectedOrPending,
}

impl FilterMode {
    /// `selected` means checked or indeterminate.
    pub fn matches(self, checked: bool, indeterminate: bool, pending: bool) -> bool {
        let selected = checked || indeterminate;
        match self {
            Self::All => true,
            Self::Selected => selected,
            Self::Unselected => !selected,
            Self::Pending => pending,
            Self::UnselectedOrPending => !selected || pending,
        }
    }
}

impl FromStr for FilterMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "all" => Ok(Self::All),
            "selected" => Ok(Self::Selected),
            "unselected" => Ok(Self::Unselected),
            "pending" => Ok(Self::Pending),
            "unselected_or_pending" => Ok(Self::UnselectedOrPending),
            _ => Err(CoreError::UnknownFilter { value: s.into() }),
        }
    }
}
