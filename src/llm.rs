use serde_json::Value;
use tracing::{info, warn};

use crate::config::{Config, FindingSource};
use crate::engine::Chunk;
use crate::error::ScanError;
use crate::report::finding::Finding;
use crate::rules;

/// Evaluate the chunk batch with the configured finding source.
///
/// The hosted-model source is best-effort only: missing credentials,
/// transport failures, and unparseable output all fall back to the local
/// rule registry. A finding-source problem must never fail the scan.
pub async fn analyze_chunks(
    config: &Config,
    repo: &str,
    commit: &str,
    chunks: &[Chunk],
) -> Vec<Finding> {
    match config.finding_source {
        FindingSource::Rules => rules::evaluate(repo, commit, chunks),
        FindingSource::HuggingFace => match hf_analyze(config, repo, commit, chunks).await {
            Ok(findings) => {
                info!(findings = findings.len(), "hosted model returned findings");
                findings
            }
            Err(e) => {
                warn!(error = %e, "hosted model unavailable, falling back to rule registry");
                rules::evaluate(repo, commit, chunks)
            }
        },
    }
}

async fn hf_analyze(
    config: &Config,
    repo: &str,
    commit: &str,
    chunks: &[Chunk],
) -> Result<Vec<Finding>, ScanError> {
    let Some(api_key) = &config.hf_api_key else {
        return Err(ScanError::Config(
            "HUGGINGFACE_API_KEY not set".to_string(),
        ));
    };

    let payload = serde_json::json!({
        "repo": repo,
        "commit": commit,
        "files": chunks,
    });
    let body = serde_json::json!({
        "inputs": format!(
            "Return JSON strictly as {{\"findings\":[...]}}. {}",
            payload
        ),
    });

    let url = format!(
        "https://api-inference.huggingface.co/models/{}",
        config.hf_model
    );

    let client = reqwest::Client::new();
    let response = client
        .post(&url)
        .bearer_auth(api_key)
        .json(&body)
        .send()
        .await
        .map_err(|e| ScanError::fetch(&config.hf_model, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(ScanError::fetch(
            &config.hf_model,
            format!("HTTP {status}"),
        ));
    }

    let text = response
        .text()
        .await
        .map_err(|e| ScanError::fetch(&config.hf_model, e))?;

    parse_model_findings(&text)
        .ok_or_else(|| ScanError::fetch(&config.hf_model, "unparseable model output"))
}

/// Best-effort extraction of `{"findings": [...]}` from a model response.
/// Some endpoints wrap the output in `[{"generated_text": "..."}]`.
fn parse_model_findings(raw: &str) -> Option<Vec<Finding>> {
    let value: Value = serde_json::from_str(raw).ok()?;

    let content = match &value {
        Value::Array(items) => {
            let first = items.first()?;
            first
                .get("generated_text")
                .or_else(|| first.get("output_text"))
                .cloned()
                .unwrap_or_else(|| value.clone())
        }
        _ => value,
    };

    let parsed: Value = match content {
        Value::String(s) => serde_json::from_str(&s).ok()?,
        other => other,
    };

    let findings = parsed.get("findings")?.clone();
    serde_json::from_value(findings).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::finding::Severity;

    #[test]
    fn parses_plain_findings_object() {
        let raw = r#"{"findings":[{"id":"x","rule":"eval","severity":"high","title":"t","description":"d","filePath":"src/a.js","startLine":3,"endLine":3,"recommendation":"r"}]}"#;
        let findings = parse_model_findings(raw).unwrap();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::High);
        assert_eq!(findings[0].start_line, 3);
    }

    #[test]
    fn parses_generated_text_wrapper() {
        let inner = r#"{\"findings\":[]}"#;
        let raw = format!(r#"[{{"generated_text":"{inner}"}}]"#);
        let findings = parse_model_findings(&raw).unwrap();
        assert!(findings.is_empty());
    }

    #[test]
    fn garbage_output_is_none() {
        assert!(parse_model_findings("not json at all").is_none());
        assert!(parse_model_findings(r#"{"other":1}"#).is_none());
    }

    #[tokio::test]
    async fn missing_key_falls_back_to_rules() {
        let config = Config {
            finding_source: FindingSource::HuggingFace,
            hf_api_key: None,
            ..Config::default()
        };
        let chunks = vec![Chunk {
            path: "src/x.js".to_string(),
            text: "eval(userInput)\n".to_string(),
        }];
        let findings = analyze_chunks(&config, "o/r", "abc", &chunks).await;
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].rule, "eval");
    }
}
