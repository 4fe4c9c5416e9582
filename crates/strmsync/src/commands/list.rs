//! `list` command: containers of a section, or the entries of one container.

use tabled::Tabled;

use strmsync_core::{ContainerView, LeafView};

use crate::cli::{GlobalOpts, ListArgs};
use crate::config::Workspace;
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
pub(crate) struct ContainerRow {
    #[tabled(rename = "")]
    check: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Selected")]
    selected: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Full")]
    full: String,
    #[tabled(rename = "Pending")]
    pending: String,
}

impl ContainerRow {
    pub(crate) fn new(v: &ContainerView, color: bool) -> Self {
        Self {
            check: output::checkbox(v.checked, v.indeterminate, color),
            name: v.key.clone(),
            selected: format!("{}/{}", v.selected, v.total),
            state: v.state.to_string(),
            full: if v.sticky_full { "sticky".into() } else { String::new() },
            pending: output::pending_marker(v.pending, color),
        }
    }
}

#[derive(Tabled)]
struct LeafRow {
    #[tabled(rename = "")]
    check: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Pending")]
    pending: String,
}

impl LeafRow {
    fn new(v: &LeafView, color: bool) -> Self {
        Self {
            check: output::checkbox(v.checked, false, color),
            name: v.leaf.clone(),
            pending: output::pending_marker(v.pending, color),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: &ListArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let kind = util::parse_kind(&args.kind)?;
    let filter = util::parse_filter(&args.filter)?;
    let search = args.search.as_deref();
    let color = output::should_color(&global.color);

    let ws = Workspace::open(global)?;
    let session = &ws.session;

    let out = if let Some(ref container) = args.container {
        util::require_container(session, kind, container)?;
        let rows: Vec<LeafView> = session
            .leaves(kind, container, filter)
            .into_iter()
            .filter(|v| util::matches_search(&v.leaf, search))
            .collect();
        output::render_list(
            &global.output,
            &rows,
            |v| LeafRow::new(v, color),
            |v| v.leaf.clone(),
        )
    } else {
        let rows: Vec<ContainerView> = session
            .containers(kind, filter)
            .into_iter()
            .filter(|v| util::matches_search(&v.key, search))
            .collect();
        output::render_list(
            &global.output,
            &rows,
            |v| ContainerRow::new(v, color),
            |v| v.key.clone(),
        )
    };

    output::print_output(&out, global.quiet);
    Ok(())
}
