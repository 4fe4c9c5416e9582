//! Clap derive structures for the `strmsync` CLI.
//!
//! Defines the command tree, global flags, and shared value enums. Only
//! clap types are used here so `build.rs` can include this file as-is;
//! catalog kinds and filter modes are parsed by the handlers.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// strmsync -- curate which IPTV catalog entries are synchronized to disk
#[derive(Debug, Parser)]
#[command(
    name = "strmsync",
    version,
    about = "Curate the strmsync allow-list from the command line",
    long_about = "Browse an IPTV playlist as categories and shows, select what gets\n\
        synchronized, and review pending changes before saving them.\n\n\
        Edits go to a draft next to the config file until `strmsync save`;\n\
        `strmsync sync` writes .strm files for the saved selection.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config file path
    #[arg(long, env = "STRMSYNC_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Playlist file (overrides paths.playlist)
    #[arg(long, env = "STRMSYNC_PLAYLIST", global = true)]
    pub playlist: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "STRMSYNC_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List categories / shows, or the entries of one of them
    #[command(alias = "ls")]
    List(ListArgs),

    /// Add categories, shows, or single entries to the selection
    #[command(alias = "add")]
    Select(SelectArgs),

    /// Remove categories, shows, or single entries from the selection
    #[command(alias = "rm")]
    Deselect(SelectArgs),

    /// Show what changed since the last save
    #[command(alias = "diff")]
    Pending(PendingArgs),

    /// Write the selection into the config file
    Save,

    /// Throw away unsaved selection changes
    Discard,

    /// Drop saved entries that no longer exist in the playlist
    Prune(PruneArgs),

    /// Download a fresh playlist from the provider
    Refresh,

    /// Write .strm files for the saved selection
    Sync(SyncArgs),

    /// Show schedule, last run, and file locations
    Status,

    /// Manage the configuration file
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  SELECTION
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Catalog section: livetv, movies, or series
    pub kind: String,

    /// Category or show to list entries of
    pub container: Option<String>,

    /// Only show rows in this state: all, selected, unselected, pending,
    /// or unselected_or_pending
    #[arg(long, short = 'f', default_value = "all")]
    pub filter: String,

    /// Case-insensitive substring match on names
    #[arg(long, short = 's')]
    pub search: Option<String>,
}

#[derive(Debug, Args)]
pub struct SelectArgs {
    /// Catalog section: livetv, movies, or series
    pub kind: String,

    /// Category or show
    #[arg(required_unless_present = "all")]
    pub container: Option<String>,

    /// Single entries within the category or show
    #[arg(requires = "container")]
    pub leaves: Vec<String>,

    /// Apply to every category or show of the section
    #[arg(long, conflicts_with_all = ["container", "leaves"])]
    pub all: bool,
}

#[derive(Debug, Args)]
pub struct PendingArgs {
    /// Limit to one catalog section
    pub kind: Option<String>,
}

#[derive(Debug, Args)]
pub struct PruneArgs {
    /// Limit to one catalog section
    pub kind: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  SYNC
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct SyncArgs {
    /// Use the local playlist even when auto-refresh is enabled
    #[arg(long)]
    pub no_refresh: bool,

    /// Save unsaved selection changes before syncing
    #[arg(long)]
    pub save: bool,

    /// Keep running and sync every day at schedule.daily_time
    #[arg(long)]
    pub watch: bool,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG / COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create the config file with guided setup
    Init,

    /// Display the resolved configuration (password masked)
    Show,

    /// Print the config and draft file locations
    Path,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
