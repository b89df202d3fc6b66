use crate::error::ScanError;
use crate::report::finding::ScanResult;

/// Output contract boundary for the pipeline.
///
/// A result that fails here indicates an internal bug (or a misbehaving
/// remote finding source), never a user input problem. It must not reach
/// the cache.
pub fn check(result: &ScanResult) -> Result<(), ScanError> {
    if result.repo.is_empty() || !result.repo.contains('/') {
        return Err(ScanError::Validation(format!(
            "repo must be owner/name, got {:?}",
            result.repo
        )));
    }
    if result.commit.is_empty() {
        return Err(ScanError::Validation("commit hash is empty".to_string()));
    }

    for f in &result.findings {
        if f.id.is_empty() || f.rule.is_empty() {
            return Err(ScanError::Validation(format!(
                "finding in {} has empty id or rule",
                f.file_path
            )));
        }
        if f.file_path.is_empty() {
            return Err(ScanError::Validation(format!(
                "finding {} has empty file path",
                f.id
            )));
        }
        if f.start_line < 1 {
            return Err(ScanError::Validation(format!(
                "finding {} has non-positive start line",
                f.id
            )));
        }
        if f.end_line < f.start_line {
            return Err(ScanError::Validation(format!(
                "finding {} has end line {} before start line {}",
                f.id, f.end_line, f.start_line
            )));
        }
    }

    let s = &result.summary;
    if s.files_considered > s.files_enumerated {
        return Err(ScanError::Validation(format!(
            "filesConsidered {} exceeds filesEnumerated {}",
            s.files_considered, s.files_enumerated
        )));
    }
    if s.files_scanned > s.files_considered {
        return Err(ScanError::Validation(format!(
            "filesScanned {} exceeds filesConsidered {}",
            s.files_scanned, s.files_considered
        )));
    }

    Ok(())
}
