//! `select` / `deselect` commands. Results go to the draft, not the config.

use tracing::debug;

use strmsync_core::{ContainerView, Mutation};

use crate::cli::{GlobalOpts, SelectArgs};
use crate::config::Workspace;
use crate::error::CliError;
use crate::output;

use super::list::ContainerRow;
use super::util;

pub fn handle(args: &SelectArgs, enabled: bool, global: &GlobalOpts) -> Result<(), CliError> {
    let kind = util::parse_kind(&args.kind)?;
    let mut ws = Workspace::open(global)?;
    let session = &mut ws.session;

    let (touched, stale): (Vec<String>, Vec<String>) = if args.all {
        let outcome = session.set_all_containers(kind, enabled);
        let touched = session.catalog().containers(kind).map(str::to_owned).collect();
        let stale = match outcome {
            Mutation::Applied => Vec::new(),
            Mutation::Stale => vec![format!("every {}", kind.container_noun())],
        };
        (touched, stale)
    } else {
        let container = args.container.as_deref().ok_or_else(|| CliError::Validation {
            field: "container".into(),
            reason: "a category or show is required unless --all is given".into(),
        })?;

        let mut stale = Vec::new();
        if args.leaves.is_empty() {
            if session.set_container(kind, container, enabled) == Mutation::Stale {
                stale.push(format!("{} {container}", kind.container_noun()));
            }
        } else {
            for leaf in &args.leaves {
                if session.set_leaf(kind, container, leaf, enabled) == Mutation::Stale {
                    stale.push(format!("{} {leaf} in {container}", kind.leaf_noun()));
                }
            }
        }
        (vec![container.to_owned()], stale)
    };

    for name in &stale {
        debug!(%kind, name, "stale reference");
        output::notice(
            &format!("warning: {name} is not in the current {kind} catalog; nothing changed"),
            global.quiet,
        );
    }

    ws.store_draft()?;

    let views: Vec<ContainerView> = touched
        .iter()
        .filter(|c| ws.session.catalog().contains_container(kind, c))
        .map(|c| ws.session.container_view(kind, c))
        .collect();
    let color = output::should_color(&global.color);
    let out = output::render_list(
        &global.output,
        &views,
        |v| ContainerRow::new(v, color),
        |v| v.key.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
