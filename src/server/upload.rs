use crate::errors::{AppResult, MmmError};
use crate::mmm::ingest;
use crate::mmm::types::MmmResult;
use crate::server::routes::track;
use crate::state::{AppState, PerfCounters};
use axum::extract::{Multipart, State};
use axum::response::Json;
use std::path::PathBuf;
use std::sync::Arc;

/// POST /api/upload -- store the multipart `file` field, then run the core on it
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> AppResult<Json<MmmResult>> {
    let result = track(&state, handle_upload(&state, multipart).await)?;
    PerfCounters::bump(&state.counters.uploads_processed);
    Ok(Json(result))
}

async fn handle_upload(state: &Arc<AppState>, mut multipart: Multipart) -> AppResult<MmmResult> {
    let path = store_file_field(&state.config.upload_dir, &mut multipart).await?;

    // The core reads the file synchronously; keep it off the async workers.
    let assembler = state.assembler;
    let estimator = state.estimator.clone();
    tokio::task::spawn_blocking(move || ingest::process_upload(&assembler, estimator.as_ref(), &path))
        .await
        .map_err(|e| MmmError::ProcessingFailure(format!("upload task failed: {e}")))?
}

async fn store_file_field(dir: &std::path::Path, multipart: &mut Multipart) -> AppResult<PathBuf> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| MmmError::ProcessingFailure(format!("multipart: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let name = sanitize_file_name(field.file_name().unwrap_or_default());
        let data = field
            .bytes()
            .await
            .map_err(|e| MmmError::ProcessingFailure(format!("multipart: {e}")))?;

        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(format!("{}-{name}", uuid::Uuid::new_v4()));
        tokio::fs::write(&path, &data).await?;
        tracing::info!(path = %path.display(), bytes = data.len(), "upload stored");
        return Ok(path);
    }
    Err(MmmError::InvalidInput("missing multipart field `file`".into()))
}

/// Keep only the final path component and a conservative character set.
pub fn sanitize_file_name(raw: &str) -> String {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "upload.csv".to_string()
    } else {
        cleaned.to_string()
    }
}
