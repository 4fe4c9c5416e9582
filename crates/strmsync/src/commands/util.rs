//! Shared helpers for command handlers.

use std::io::IsTerminal;

use strum::IntoEnumIterator;

use strmsync_core::{ContentKind, FilterMode, SelectionSession};

use crate::error::CliError;

/// Parse a catalog section name (`livetv`, `movies`, `series`, or an alias).
pub fn parse_kind(raw: &str) -> Result<ContentKind, CliError> {
    Ok(raw.parse::<ContentKind>()?)
}

/// One named section, or every section in catalog order.
pub fn parse_kinds(raw: Option<&str>) -> Result<Vec<ContentKind>, CliError> {
    match raw {
        Some(raw) => Ok(vec![parse_kind(raw)?]),
        None => Ok(ContentKind::iter().collect()),
    }
}

pub fn parse_filter(raw: &str) -> Result<FilterMode, CliError> {
    Ok(raw.parse::<FilterMode>()?)
}

/// Case-insensitive substring match; no needle matches everything.
pub fn matches_search(name: &str, needle: Option<&str>) -> bool {
    needle.is_none_or(|n| name.to_lowercase().contains(&n.to_lowercase()))
}

/// Fail with a not-found error when `container` is not in the catalog.
pub fn require_container(
    session: &SelectionSession,
    kind: ContentKind,
    container: &str,
) -> Result<(), CliError> {
    if session.catalog().contains_container(kind, container) {
        return Ok(());
    }
    Err(CliError::NotFound {
        kind: kind.to_string(),
        noun: kind.container_noun().into(),
        identifier: container.into(),
    })
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, action: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}
