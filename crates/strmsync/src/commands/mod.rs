//! Command dispatch: bridges CLI args -> selection session / sync -> output formatting.

pub mod config_cmd;
pub mod list;
pub mod pending;
pub mod prune;
pub mod refresh;
pub mod save;
pub mod select;
pub mod status;
pub mod sync_cmd;
pub mod util;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a command to its handler.
pub async fn dispatch(cmd: Command, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::List(args) => list::handle(&args, global),
        Command::Select(args) => select::handle(&args, true, global),
        Command::Deselect(args) => select::handle(&args, false, global),
        Command::Pending(args) => pending::handle(&args, global),
        Command::Save => save::handle(global),
        Command::Discard => save::discard(global),
        Command::Prune(args) => prune::handle(&args, global),
        Command::Refresh => refresh::handle(global).await,
        Command::Sync(args) => sync_cmd::handle(&args, global).await,
        Command::Status => status::handle(global),
        Command::Config(args) => config_cmd::handle(&args, global),
        // Completions are handled before dispatch
        Command::Completions(_) => unreachable!(),
    }
}
