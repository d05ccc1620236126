use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::pipeline::ExtractError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match &self {
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone(), None)
            }
            AppError::Extraction(err) => extraction_response(err),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                    None,
                )
            }
        };

        let mut error = json!({
            "code": code,
            "message": message
        });
        if let Some(details) = details {
            error["details"] = details;
        }
        (status, Json(json!({ "error": error }))).into_response()
    }
}

/// Maps pipeline failures to responses a person uploading their résumé can
/// act on. The raw attempt trail rides along under `details` for clients
/// that want it.
fn extraction_response(
    err: &ExtractError,
) -> (StatusCode, &'static str, String, Option<serde_json::Value>) {
    match err {
        ExtractError::InvalidInput(msg) => (
            StatusCode::BAD_REQUEST,
            "INVALID_INPUT",
            msg.clone(),
            None,
        ),
        ExtractError::UnsupportedFormat => (
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "UNSUPPORTED_FORMAT",
            "This file type is not supported. Please upload a PDF, Word document, or image."
                .to_string(),
            None,
        ),
        ExtractError::AllStrategiesFailed { attempts } => {
            tracing::error!(attempts = attempts.len(), "all extraction strategies failed");
            let reasons = attempt_reasons(attempts);
            let (status, message) = if reasons.iter().any(|r| r.contains("unavailable") || r.contains("quota")) {
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "The parsing service is temporarily unavailable. Please try again in a few minutes.",
                )
            } else if reasons.iter().any(|r| r.contains("scanned")) {
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "This looks like a scanned PDF and the scan could not be read. A text-based export of the document will work better.",
                )
            } else {
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "The document could not be read at all. Please check that the file is not corrupted.",
                )
            };
            (
                status,
                "EXTRACTION_FAILED",
                message.to_string(),
                serde_json::to_value(attempts).ok(),
            )
        }
        ExtractError::Timeout { seconds } => (
            StatusCode::GATEWAY_TIMEOUT,
            "TIMEOUT",
            format!("Processing took longer than {seconds}s and was cancelled. Please try a smaller document."),
            None,
        ),
    }
}

fn attempt_reasons(attempts: &[crate::extraction::cascade::ExtractionAttempt]) -> Vec<String> {
    use crate::extraction::cascade::AttemptOutcome;
    attempts
        .iter()
        .filter_map(|a| match &a.outcome {
            AttemptOutcome::Rejected { reason } => Some(reason.to_lowercase()),
            AttemptOutcome::Accepted { .. } => None,
        })
        .collect()
}
