//! `prune` command: forget saved entries the current playlist no longer lists.

use serde::Serialize;
use tabled::Tabled;

use strmsync_core::{ContentKind, Pruned};

use crate::cli::{GlobalOpts, PruneArgs};
use crate::config::Workspace;
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Serialize)]
struct PruneReport {
    kind: ContentKind,
    #[serde(flatten)]
    pruned: Pruned,
}

#[derive(Tabled)]
struct PruneRow {
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Titles")]
    titles: usize,
    #[tabled(rename = "Containers")]
    containers: usize,
}

impl PruneRow {
    fn new(r: &PruneReport) -> Self {
        Self {
            kind: r.kind.to_string(),
            titles: r.pruned.titles,
            containers: r.pruned.containers,
        }
    }
}

/// Drop unresolvable titles and containers. The result goes to the draft
/// like any other selection edit.
pub fn handle(args: &PruneArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let kinds = util::parse_kinds(args.kind.as_deref())?;
    let mut ws = Workspace::open(global)?;

    let reports: Vec<PruneReport> = kinds
        .into_iter()
        .map(|kind| PruneReport {
            kind,
            pruned: ws.session.prune_stale(kind),
        })
        .filter(|r| !r.pruned.is_empty())
        .collect();

    if reports.is_empty() {
        output::notice("Nothing to prune", global.quiet);
        return Ok(());
    }
    ws.store_draft()?;

    let out = output::render_list(&global.output, &reports, PruneRow::new, |r| {
        format!("{}\t{}\t{}", r.kind, r.pruned.titles, r.pruned.containers)
    });
    output::print_output(&out, global.quiet);
    output::notice("Run `strmsync save` to keep the cleanup", global.quiet);
    Ok(())
}
