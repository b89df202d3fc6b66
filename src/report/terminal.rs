use comfy_table::{presets::UTF8_BORDERS_ONLY, Table};
use owo_colors::OwoColorize;

use crate::report::finding::{ScanResult, Severity};

/// Render a scan result to the terminal with colors
pub fn render(result: &ScanResult) {
    println!();
    println!(
        "{}  repoprobe v{} — {} @ {}",
        "🔍".bold(),
        env!("CARGO_PKG_VERSION"),
        result.repo.bold(),
        short_commit(&result.commit).dimmed(),
    );
    println!();

    if result.findings.is_empty() {
        println!("  {}  No security issues found!", "✅".bold());
    }

    for finding in &result.findings {
        let severity_display = format!(" {} ", finding.severity);
        let severity_colored = match finding.severity {
            Severity::Critical => severity_display.on_red().white().bold().to_string(),
            Severity::High => severity_display.on_yellow().black().bold().to_string(),
            Severity::Medium => severity_display.on_blue().white().bold().to_string(),
            Severity::Low => severity_display.on_white().black().to_string(),
        };

        let location = if finding.start_line == finding.end_line {
            format!("{}:{}", finding.file_path, finding.start_line)
        } else {
            format!(
                "{}:{}-{}",
                finding.file_path, finding.start_line, finding.end_line
            )
        };

        println!("  {}  {}", severity_colored, location.dimmed());
        println!("           {} {}", finding.title.bold(), format!("[{}]", finding.rule).dimmed());
        println!("           {}", finding.description);
        println!("           {} {}", "⮕".green(), finding.recommendation.green());
        println!();
    }

    // Pipeline counters
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["enumerated", "considered", "scanned", "bytes", "errors"]);
    table.add_row(vec![
        result.summary.files_enumerated.to_string(),
        result.summary.files_considered.to_string(),
        result.summary.files_scanned.to_string(),
        result.summary.bytes_scanned.to_string(),
        result.summary.errors.to_string(),
    ]);
    println!("{table}");

    let total = result.findings.len();
    if total > 0 {
        println!(
            "  {} finding{} ({})",
            total.to_string().bold(),
            if total == 1 { "" } else { "s" },
            severity_breakdown(result),
        );
    }
    println!();
}

fn short_commit(commit: &str) -> &str {
    if commit.len() > 12 {
        &commit[..12]
    } else {
        commit
    }
}

fn severity_breakdown(result: &ScanResult) -> String {
    let mut parts = Vec::new();
    for severity in [
        Severity::Critical,
        Severity::High,
        Severity::Medium,
        Severity::Low,
    ] {
        let n = result
            .findings
            .iter()
            .filter(|f| f.severity == severity)
            .count();
        if n > 0 {
            parts.push(format!("{} {}", n, severity));
        }
    }
    parts.join(", ")
}
