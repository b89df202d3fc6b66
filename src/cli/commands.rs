use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan a remote repository for security issues
    Scan(ScanArgs),

    /// Print the raw content of one file at a commit
    File(FileArgs),

    /// List all registered security rules
    ListRules,
}

#[derive(clap::Args, Debug)]
pub struct ScanArgs {
    /// Repository as "owner/name"
    pub repo: String,

    /// Branch, tag, or commit to scan (defaults to the repository HEAD)
    #[arg(long = "ref", default_value = "HEAD")]
    pub git_ref: String,

    /// Output format: "terminal" or "json"
    #[arg(short, long, default_value = "terminal")]
    pub format: String,

    /// Write the JSON result to a file
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Fail (exit code 1) if findings at or above this severity are found.
    /// Values: critical, high, medium, low
    #[arg(long)]
    pub fail_on: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct FileArgs {
    /// Repository as "owner/name"
    pub repo: String,

    /// Commit hash the file is read at
    pub commit: String,

    /// Path of the file within the repository
    pub path: String,
}
