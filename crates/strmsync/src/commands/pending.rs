//! `pending` command: what changed since the last save.

use tabled::Tabled;

use strmsync_core::{ContainerView, ContentKind, FilterMode};

use crate::cli::{GlobalOpts, PendingArgs};
use crate::config::Workspace;
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct PendingRow {
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "")]
    check: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Selected")]
    selected: String,
    #[tabled(rename = "State")]
    state: String,
}

impl PendingRow {
    fn new(v: &ContainerView, color: bool) -> Self {
        Self {
            kind: v.kind.to_string(),
            check: output::checkbox(v.checked, v.indeterminate, color),
            name: v.key.clone(),
            selected: format!("{}/{}", v.selected, v.total),
            state: v.state.to_string(),
        }
    }
}

pub fn handle(args: &PendingArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let kinds = util::parse_kinds(args.kind.as_deref())?;

    let ws = Workspace::open(global)?;
    let session = &ws.session;

    let rows: Vec<ContainerView> = kinds
        .iter()
        .flat_map(|&kind| session.containers(kind, FilterMode::Pending))
        .collect();

    let color = output::should_color(&global.color);
    let out = output::render_list(
        &global.output,
        &rows,
        |v| PendingRow::new(v, color),
        |v| format!("{}/{}", v.kind, v.key),
    );
    output::print_output(&out, global.quiet);

    let summary = session.pending_summary();
    let counts: Vec<(ContentKind, usize)> =
        kinds.iter().map(|&kind| (kind, summary.get(kind))).collect();
    let total: usize = counts.iter().map(|(_, n)| n).sum();
    if total > 0 {
        let parts: Vec<String> = counts.iter().map(|(kind, n)| format!("{kind} {n}")).collect();
        output::notice(
            &format!(
                "{total} pending: {} (run `strmsync save` to keep them)",
                parts.join(", ")
            ),
            global.quiet,
        );
    } else if session.is_dirty() && args.kind.is_none() {
        output::notice(
            "Unsaved changes only touch entries missing from the current playlist",
            global.quiet,
        );
    } else {
        output::notice("No pending changes", global.quiet);
    }
    Ok(())
}
