use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use repoprobe::cache::MemoryStore;
use repoprobe::cli::{Cli, Commands};
use repoprobe::config::Config;
use repoprobe::github::GitHubClient;
use repoprobe::report;
use repoprobe::report::finding::Severity;
use repoprobe::rules;
use repoprobe::service::ScanService;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("repoprobe=debug")
    } else if cli.quiet {
        EnvFilter::new("repoprobe=error")
    } else {
        EnvFilter::new("repoprobe=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    match &cli.command {
        Commands::Scan(args) => {
            let config = Config::from_env()?;
            let host = Arc::new(GitHubClient::new(&config)?);
            let store = Arc::new(MemoryStore::new());
            let service = ScanService::new(host, store, config);

            let ticket = service.start_scan(&args.repo, Some(&args.git_ref)).await?;
            let polled = service.poll_scan(&ticket.key).await;
            let result = polled
                .data
                .ok_or_else(|| anyhow::anyhow!("scan {} completed without a result", ticket.key))?;

            match args.format.as_str() {
                "json" => {
                    let output = report::json::render(&result)?;
                    if let Some(ref path) = args.out {
                        std::fs::write(path, &output)?;
                        info!("Result written to {}", path.display());
                    } else {
                        println!("{}", output);
                    }
                }
                _ => {
                    report::terminal::render(&result);
                    if let Some(ref path) = args.out {
                        let json_output = report::json::render(&result)?;
                        std::fs::write(path, &json_output)?;
                        info!("JSON result also written to {}", path.display());
                    }
                }
            }

            if let Some(ref fail_on) = args.fail_on {
                let threshold = Severity::from_str(fail_on);
                if result.has_findings_at_or_above(threshold) {
                    std::process::exit(1);
                }
            }
        }
        Commands::File(args) => {
            let config = Config::from_env()?;
            let host = Arc::new(GitHubClient::new(&config)?);
            let store = Arc::new(MemoryStore::new());
            let service = ScanService::new(host, store, config);

            let text = service
                .fetch_file(&args.repo, &args.commit, &args.path)
                .await?;
            print!("{}", text);
        }
        Commands::ListRules => {
            list_rules();
        }
    }

    Ok(())
}

fn list_rules() {
    println!();
    println!("🔍 repoprobe — Registered Rules");
    println!("{}", "━".repeat(55));
    println!();

    let all = rules::all_rules();
    for rule in &all {
        println!("  📋 {}", rule.id());
        println!("     {}", rule.describe());
        println!();
    }

    println!("{}", "━".repeat(55));
    println!("  {} rules loaded", all.len());
    println!();
    println!("  Run `repoprobe scan owner/name` to scan a repository");
    println!();
}
