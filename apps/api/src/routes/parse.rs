//! POST /api/v1/resumes/parse — multipart upload in, structured résumé out.

use axum::extract::{Multipart, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, Instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::extraction::cascade::ExtractionAttempt;
use crate::formatter::format_resume;
use crate::models::resume::NormalizedResume;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ParseResponse {
    pub request_id: Uuid,
    pub resume: NormalizedResume,
    /// Stable plain-text rendition of the entity.
    pub canonical_text: String,
    /// Strategy that produced the accepted extraction.
    pub provenance: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_count: Option<usize>,
    pub warnings: Vec<String>,
    pub attempts: Vec<ExtractionAttempt>,
    pub cached: bool,
    pub parsed_at: DateTime<Utc>,
}

pub async fn parse_resume_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ParseResponse>, AppError> {
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("parse_resume", %request_id);

    async move {
        let (filename, bytes) = read_upload(multipart).await?;
        info!(filename, bytes = bytes.len(), "received resume upload");

        let output = state.pipeline.ingest(bytes).await?;
        info!(
            provenance = output.provenance,
            warnings = output.warnings.len(),
            cached = output.cached,
            "resume parsed"
        );

        let canonical_text = format_resume(&output.resume);
        Ok(Json(ParseResponse {
            request_id,
            resume: output.resume,
            canonical_text,
            provenance: output.provenance,
            page_count: output.page_count,
            warnings: output.warnings,
            attempts: output.attempts,
            cached: output.cached,
            parsed_at: Utc::now(),
        }))
    }
    .instrument(span)
    .await
}

/// Pulls the first file-bearing part out of the multipart body.
async fn read_upload(mut multipart: Multipart) -> Result<(String, bytes::Bytes), AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        let is_file = field.file_name().is_some() || field.name() == Some("file");
        if !is_file {
            continue;
        }
        let filename = field.file_name().unwrap_or("upload").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Could not read upload: {e}")))?;
        return Ok((filename, bytes));
    }
    Err(AppError::Validation(
        "Multipart body contained no file field".to_string(),
    ))
}
