use anyhow::Result;

use crate::report::finding::ScanResult;

/// Render a scan result as pretty-printed JSON
pub fn render(result: &ScanResult) -> Result<String> {
    let json = serde_json::to_string_pretty(result)?;
    Ok(json)
}
