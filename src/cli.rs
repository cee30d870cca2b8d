//! CLI argument parsing for the reference allocator.
//!
//! The CLI stays thin: it parses input, resolves the store location, and
//! calls the allocator, so the same core can sit behind a chat command
//! layer unchanged.
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Environment variable naming the store file location.
pub const STORE_ENV_VAR: &str = "REFCLERK_STORE";

/// Root CLI entrypoint for the reference allocator.
#[derive(Parser, Debug)]
#[command(
    name = "refclerk",
    version,
    about = "Durable per-category reference-number allocator",
    after_help = "Examples:\n  refclerk allocate hr\n  refclerk override hr 100\n  refclerk raise s 40\n  refclerk query hr --json\n  refclerk list\n  refclerk history --category hr\n\nThe store location comes from --store, then $REFCLERK_STORE, then the\nplatform data directory.",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    /// Path to the reference store file (overrides $REFCLERK_STORE)
    #[arg(long, global = true, value_name = "PATH")]
    pub store: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level allocator commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Issue the next reference number for a category
    Allocate(AllocateArgs),
    /// Administratively set a category's counter (may move it backward)
    Override(OverrideArgs),
    /// Raise a category's counter to at least the given number
    Raise(RaiseArgs),
    /// Show the current record for a category
    Query(QueryArgs),
    /// Show every category's current record
    List(ListArgs),
    /// Show the audit trail of allocations and overrides
    History(HistoryArgs),
}

#[derive(Parser, Debug)]
pub struct AllocateArgs {
    /// Category name, e.g. hr, s, hres
    pub category: String,

    /// Emit the record as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
pub struct OverrideArgs {
    /// Category name, e.g. hr, s, hres
    pub category: String,

    /// New counter value
    pub number: u64,

    /// Emit the record as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
pub struct RaiseArgs {
    /// Category name, e.g. hr, s, hres
    pub category: String,

    /// Floor the counter must reach
    pub number: u64,

    /// Emit the record as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
pub struct QueryArgs {
    /// Category name, e.g. hr, s, hres
    pub category: String,

    /// Emit the record as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Emit the records as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
pub struct HistoryArgs {
    /// Only show entries for this category
    #[arg(long, value_name = "CATEGORY")]
    pub category: Option<String>,

    /// Emit the entries as JSON
    #[arg(long)]
    pub json: bool,
}
