//! End-to-end ingestion pipeline: bytes in, normalized résumé out.
//!
//! The pipeline owns validation, the strategy cascade, text repair,
//! parsing, and the fingerprint cache. Every run is bounded by a single
//! wall-clock timeout so a hostile document cannot hold a worker hostage.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use thiserror::Error;
use tracing::{debug, info};

use crate::cache::{fingerprint, FingerprintCache};
use crate::extraction::cascade::{
    run_cascade, ExtractedPayload, ExtractionAttempt, ExtractionResult, ExtractionStrategy,
    RawDocument,
};
use crate::extraction::embedded::EmbeddedTextStrategy;
use crate::extraction::ocr::{OcrSettings, OcrStrategy};
use crate::extraction::office::OfficeTextStrategy;
use crate::extraction::quality::{self, QualityThresholds};
use crate::extraction::sniff::DocumentFormat;
use crate::extraction::vision::VisionStrategy;
use crate::llm_client::LlmClient;
use crate::models::resume::NormalizedResume;
use crate::parsing::builder::{coverage_warnings, ResumeBuilder};
use crate::parsing::lexicon::{Lexicon, LOCATIONS};
use crate::repair::TextRepair;

const DEFAULT_TIMEOUT_SECS: u64 = 45;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ExtractError {
    /// The upload itself is unusable: empty or over the size cap.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The magic bytes match no supported document family. Failing here
    /// is deliberate: running OCR on arbitrary bytes wastes minutes to
    /// produce garbage.
    #[error("unsupported document format")]
    UnsupportedFormat,

    /// Every strategy ran and none produced acceptable output. The full
    /// attempt trail explains what each one saw.
    #[error("no extraction strategy produced usable output")]
    AllStrategiesFailed { attempts: Vec<ExtractionAttempt> },

    #[error("processing timed out after {seconds}s")]
    Timeout { seconds: u64 },
}

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub timeout: Duration,
    pub max_upload_bytes: usize,
    pub thresholds: QualityThresholds,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            thresholds: QualityThresholds::default(),
        }
    }
}

/// Everything a caller gets back from one ingestion run.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub resume: NormalizedResume,
    /// Strategy that produced the accepted extraction.
    pub provenance: &'static str,
    pub page_count: Option<usize>,
    pub warnings: Vec<String>,
    pub attempts: Vec<ExtractionAttempt>,
    pub cached: bool,
}

pub struct ResumePipeline {
    strategies: Vec<Box<dyn ExtractionStrategy>>,
    cache: Arc<dyn FingerprintCache>,
    settings: PipelineSettings,
    lexicon: Lexicon,
    repair: TextRepair,
    builder: ResumeBuilder,
}

impl ResumePipeline {
    pub fn new(
        strategies: Vec<Box<dyn ExtractionStrategy>>,
        cache: Arc<dyn FingerprintCache>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            strategies,
            cache,
            settings,
            lexicon: Lexicon::default(),
            repair: TextRepair::new(LOCATIONS),
            builder: ResumeBuilder::new(),
        }
    }

    /// Production strategy order, cheapest and most reliable first. The
    /// vision strategy only joins the cascade when an LLM client is
    /// configured.
    pub fn with_default_strategies(
        llm: Option<LlmClient>,
        ocr: OcrSettings,
        cache: Arc<dyn FingerprintCache>,
        settings: PipelineSettings,
    ) -> Self {
        let ocr_lang = ocr.lang.clone();
        let mut strategies: Vec<Box<dyn ExtractionStrategy>> = vec![
            Box::new(EmbeddedTextStrategy),
            Box::new(OfficeTextStrategy),
            Box::new(OcrStrategy::new(ocr)),
        ];
        if let Some(llm) = llm {
            strategies.push(Box::new(VisionStrategy::new(llm, ocr_lang)));
        }
        Self::new(strategies, cache, settings)
    }

    /// Runs the full pipeline over one uploaded document.
    pub async fn ingest(&self, bytes: Bytes) -> Result<PipelineOutput, ExtractError> {
        if bytes.is_empty() {
            return Err(ExtractError::InvalidInput("empty upload".to_string()));
        }
        if bytes.len() > self.settings.max_upload_bytes {
            return Err(ExtractError::InvalidInput(format!(
                "upload of {} bytes exceeds the {} byte limit",
                bytes.len(),
                self.settings.max_upload_bytes
            )));
        }

        let doc = RawDocument::sniff(bytes);
        if doc.format == DocumentFormat::Unknown {
            return Err(ExtractError::UnsupportedFormat);
        }
        debug!(format = doc.format.as_str(), bytes = doc.bytes.len(), "ingesting document");

        let seconds = self.settings.timeout.as_secs();
        tokio::time::timeout(self.settings.timeout, self.run(doc))
            .await
            .map_err(|_| ExtractError::Timeout { seconds })?
    }

    async fn run(&self, doc: RawDocument) -> Result<PipelineOutput, ExtractError> {
        let key = fingerprint(&doc.bytes);
        if let Some(hit) = self.cache.get(key) {
            // Cached output is re-gated with the current thresholds, so a
            // policy tightened after the entry was written still applies.
            if self.regate(&hit) {
                info!(fingerprint = key, "serving re-gated cache hit");
                return Ok(self.assemble(hit, Vec::new(), true));
            }
            debug!(fingerprint = key, "cache hit failed re-gating, extracting fresh");
        }

        match run_cascade(&self.strategies, &doc, &self.settings.thresholds).await {
            Ok((result, attempts)) => {
                self.cache.put(key, result.clone());
                Ok(self.assemble(result, attempts, false))
            }
            Err(attempts) => Err(ExtractError::AllStrategiesFailed { attempts }),
        }
    }

    fn regate(&self, result: &ExtractionResult) -> bool {
        match &result.payload {
            ExtractedPayload::Text { text, .. } => {
                quality::assess(text, &self.settings.thresholds).accept
            }
            ExtractedPayload::Structured(resume) => !resume.is_empty(),
        }
    }

    /// Text payloads go through repair, segmentation, and the builder.
    /// Structured payloads already carry the entity and skip all of it.
    fn assemble(
        &self,
        result: ExtractionResult,
        attempts: Vec<ExtractionAttempt>,
        cached: bool,
    ) -> PipelineOutput {
        match result.payload {
            ExtractedPayload::Text { text, page_count } => {
                let repaired = self.repair.repair(&text);
                let (resume, warnings) = self.builder.build(&repaired, &self.lexicon);
                PipelineOutput {
                    resume,
                    provenance: result.provenance,
                    page_count: Some(page_count),
                    warnings,
                    attempts,
                    cached,
                }
            }
            ExtractedPayload::Structured(resume) => {
                let warnings = coverage_warnings(&resume);
                PipelineOutput {
                    resume,
                    provenance: result.provenance,
                    page_count: None,
                    warnings,
                    attempts,
                    cached,
                }
            }
        }
    }
}
