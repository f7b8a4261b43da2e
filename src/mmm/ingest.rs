use crate::errors::{AppResult, MmmError};
use crate::mmm::assembler::ResultAssembler;
use crate::mmm::catalog::{self, ScenarioConfig};
use crate::mmm::types::MmmResult;
use crate::mmm::Estimator;
use std::path::{Path, PathBuf};

/// What the core learned from reading an uploaded file.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadSummary {
    pub path: PathBuf,
    pub bytes: usize,
    /// Header cells of the first non-blank line
    pub columns: Vec<String>,
    /// Non-blank lines after the header
    pub data_rows: usize,
}

/// Stand-in until a real fit exists: ignores the data and returns the
/// fixed four-channel upload baseline.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderEstimator;

impl Estimator for PlaceholderEstimator {
    fn name(&self) -> &'static str {
        "placeholder"
    }

    fn estimate(&self, _upload: &UploadSummary) -> AppResult<ScenarioConfig> {
        Ok(catalog::upload_baseline().clone())
    }
}

/// Read and sanity-check an uploaded file. Unreadable, non-text, or empty
/// files are processing failures.
pub fn read_upload(path: &Path) -> AppResult<UploadSummary> {
    let raw = std::fs::read(path).map_err(|e| {
        MmmError::ProcessingFailure(format!("cannot read upload {}: {e}", path.display()))
    })?;
    let bytes = raw.len();
    let text = String::from_utf8(raw)
        .map_err(|_| MmmError::ProcessingFailure("upload is not valid UTF-8 text".into()))?;

    let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());
    let header = lines
        .next()
        .ok_or_else(|| MmmError::ProcessingFailure("upload is empty".into()))?;
    let columns = header
        .split(',')
        .map(|c| c.trim().trim_matches('"').to_string())
        .collect();
    let data_rows = lines.count();

    Ok(UploadSummary {
        path: path.to_path_buf(),
        bytes,
        columns,
        data_rows,
    })
}

/// Full upload path: read, estimate, assemble.
pub fn process_upload(
    assembler: &ResultAssembler,
    estimator: &dyn Estimator,
    path: &Path,
) -> AppResult<MmmResult> {
    let summary = read_upload(path)?;
    tracing::info!(
        path = %summary.path.display(),
        bytes = summary.bytes,
        columns = summary.columns.len(),
        rows = summary.data_rows,
        estimator = estimator.name(),
        "processing upload"
    );
    let cfg = estimator.estimate(&summary)?;
    assembler.assemble_config(&cfg)
}
