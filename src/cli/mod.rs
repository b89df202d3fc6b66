pub mod commands;

use clap::Parser;

pub use commands::{Commands, ScanArgs};

/// repoprobe — remote repository security scanner
///
/// Scans a GitHub repository at a commit for insecure coding patterns.
/// Results are cached per (repo, commit): rescanning the same commit is free.
#[derive(Parser, Debug)]
#[command(
    name = "repoprobe",
    version,
    about = "🔍 repoprobe — scan a remote repository for insecure patterns",
    long_about = "repoprobe resolves a repository ref to a commit, walks the tree under\nstrict file and byte budgets, and runs a registry of pattern rules over\nthe content. One scan per commit: repeated runs hit the cache."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}
