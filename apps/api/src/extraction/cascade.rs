//! Extraction cascade — an ordered list of strategies of decreasing
//! reliability, tried until one produces gate-accepted output.
//!
//! Each strategy converts its own failures into a typed `StrategyError`;
//! nothing strategy-local escapes the cascade. The driver is a fold over the
//! strategy list that short-circuits on the first accepted result while
//! retaining every attempt for the final diagnostic report.

use async_trait::async_trait;
use bytes::Bytes;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::extraction::quality::{self, QualityThresholds};
use crate::extraction::sniff::{sniff_format, DocumentFormat};
use crate::models::resume::NormalizedResume;

/// Immutable uploaded document plus its sniffed format.
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub bytes: Bytes,
    pub format: DocumentFormat,
}

impl RawDocument {
    /// Builds a document from raw bytes, re-deriving the format from content
    /// regardless of any declared content type.
    pub fn sniff(bytes: Bytes) -> Self {
        let format = sniff_format(&bytes);
        Self { bytes, format }
    }
}

/// A failure local to one strategy. Never fatal until every strategy has
/// been exhausted.
#[derive(Debug, Error)]
pub enum StrategyError {
    /// Output existed but failed the quality gate.
    #[error("low-confidence output: {0}")]
    LowConfidence(String),

    /// An external collaborator (OCR engine, AI service) failed after its
    /// own bounded retries.
    #[error("external service error: {0}")]
    External(String),

    /// The strategy cannot run at all in this environment (missing tools or
    /// credentials, unsupported format).
    #[error("strategy unavailable: {0}")]
    Unavailable(String),

    /// The input was malformed for this strategy. Not retried; falls
    /// through to the next strategy.
    #[error("parse failure: {0}")]
    Parse(String),
}

/// What a strategy produced. The vision strategy emits structured output
/// directly and bypasses line-based parsing downstream.
#[derive(Debug, Clone)]
pub enum ExtractedPayload {
    Text { text: String, page_count: usize },
    Structured(NormalizedResume),
}

/// The accepted output of the cascade plus its provenance.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    pub payload: ExtractedPayload,
    /// Name of the strategy that produced the accepted payload.
    pub provenance: &'static str,
}

/// Record of one strategy attempt, kept for diagnostics even on success.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionAttempt {
    pub strategy: &'static str,
    pub confidence_weight: f32,
    pub outcome: AttemptOutcome,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AttemptOutcome {
    Accepted { chars: usize, pages: usize },
    Rejected { reason: String },
}

/// One extraction technique. Implementations catch their own errors and map
/// them to `StrategyError`; they never panic on hostile input.
#[async_trait]
pub trait ExtractionStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Relative reliability of this strategy's accepted output, used only
    /// for diagnostics and ordering sanity checks.
    fn confidence_weight(&self) -> f32;

    async fn extract(&self, doc: &RawDocument) -> Result<ExtractedPayload, StrategyError>;
}

/// Runs the strategies strictly in order, gating each output, and returns
/// the first accepted result together with the full attempt trail. When
/// every strategy fails the trail is the error value.
pub async fn run_cascade(
    strategies: &[Box<dyn ExtractionStrategy>],
    doc: &RawDocument,
    thresholds: &QualityThresholds,
) -> Result<(ExtractionResult, Vec<ExtractionAttempt>), Vec<ExtractionAttempt>> {
    let mut attempts: Vec<ExtractionAttempt> = Vec::with_capacity(strategies.len());

    for strategy in strategies {
        debug!(strategy = strategy.name(), "trying extraction strategy");
        match strategy.extract(doc).await {
            Ok(payload) => match gate_payload(&payload, thresholds) {
                Ok((chars, pages)) => {
                    attempts.push(ExtractionAttempt {
                        strategy: strategy.name(),
                        confidence_weight: strategy.confidence_weight(),
                        outcome: AttemptOutcome::Accepted { chars, pages },
                    });
                    info!(
                        strategy = strategy.name(),
                        chars, pages, "extraction accepted"
                    );
                    return Ok((
                        ExtractionResult { payload, provenance: strategy.name() },
                        attempts,
                    ));
                }
                Err(reason) => {
                    warn!(strategy = strategy.name(), %reason, "quality gate rejected output");
                    attempts.push(ExtractionAttempt {
                        strategy: strategy.name(),
                        confidence_weight: strategy.confidence_weight(),
                        outcome: AttemptOutcome::Rejected { reason },
                    });
                }
            },
            Err(err) => {
                warn!(strategy = strategy.name(), error = %err, "extraction strategy failed");
                attempts.push(ExtractionAttempt {
                    strategy: strategy.name(),
                    confidence_weight: strategy.confidence_weight(),
                    outcome: AttemptOutcome::Rejected { reason: err.to_string() },
                });
            }
        }
    }

    Err(attempts)
}

/// Applies the quality gate to a payload. Structured payloads carry no text
/// to score; they pass when non-empty.
fn gate_payload(
    payload: &ExtractedPayload,
    thresholds: &QualityThresholds,
) -> Result<(usize, usize), String> {
    match payload {
        ExtractedPayload::Text { text, page_count } => {
            let assessment = quality::assess(text, thresholds);
            if assessment.accept {
                Ok((text.len(), *page_count))
            } else {
                Err(assessment
                    .reason
                    .unwrap_or_else(|| "rejected by quality gate".to_string()))
            }
        }
        ExtractedPayload::Structured(resume) => {
            if resume.is_empty() {
                Err("structured output contained no recovered fields".to_string())
            } else {
                Ok((0, 0))
            }
        }
    }
}
