//! Vision-assisted multimodal strategy — the last resort for hostile
//! layouts. Sends page raster images together with whatever the cheaper
//! layers produced (embedded text, OCR text) and asks the model to
//! cross-reference all three and emit the canonical structured schema
//! directly, bypassing line-based section parsing entirely.

use async_trait::async_trait;
use base64::Engine as _;
use tracing::{debug, warn};

use crate::extraction::cascade::{
    ExtractedPayload, ExtractionStrategy, RawDocument, StrategyError,
};
use crate::extraction::ocr::{self, OcrSettings};
use crate::extraction::sniff::DocumentFormat;
use crate::llm_client::prompts::{JSON_ONLY_SYSTEM, VERBATIM_INSTRUCTION};
use crate::llm_client::{GenerationParams, InlineImage, LlmClient, LlmError};
use crate::models::resume::NormalizedResume;

/// Pages sent to the model. Kept lower than the OCR bound: image tokens are
/// expensive and résumés rarely exceed a few pages.
const MAX_VISION_PAGES: usize = 4;
/// Render resolution for vision input; the model does not need 300dpi.
const VISION_DPI: u32 = 150;
/// Truncation bound for each auxiliary text layer in the prompt.
const MAX_LAYER_CHARS: usize = 12_000;

const VISION_SYSTEM: &str = "You extract structured resume data from documents. \
    You receive up to three layers of the same document: page images, the \
    embedded PDF text layer, and OCR output. The text layers may be corrupted \
    (characters separated by spaces, broken tokens); cross-reference them \
    against the images to recover the true content.";

const VISION_PROMPT_TEMPLATE: &str = r#"Extract the resume in this document as JSON with this exact shape (omit unknown fields):
{
  "name": "...", "email": "...", "phone": "...", "location": "...",
  "links": {"linkedin": "...", "github": "...", "website": "..."},
  "professional_summary": "...",
  "experience": [{"title": "...", "company": "...", "location": "...", "duration": "...", "description": ["..."]}],
  "education": [{"institution": "...", "degree": "...", "field": "...", "graduation_date": "...", "gpa": "...", "details": ["..."]}],
  "skills": ["..."],
  "certifications": ["..."],
  "projects": [{"name": "...", "description": "...", "technologies": ["..."]}],
  "unclassified_content": ["..."]
}

EMBEDDED TEXT LAYER (may be empty or corrupted):
{embedded_text}

OCR TEXT LAYER (may be empty or corrupted):
{ocr_text}
"#;

pub struct VisionStrategy {
    llm: LlmClient,
    ocr_lang: String,
}

impl VisionStrategy {
    pub fn new(llm: LlmClient, ocr_lang: String) -> Self {
        Self { llm, ocr_lang }
    }
}

#[async_trait]
impl ExtractionStrategy for VisionStrategy {
    fn name(&self) -> &'static str {
        "vision_synthesis"
    }

    fn confidence_weight(&self) -> f32 {
        0.5
    }

    async fn extract(&self, doc: &RawDocument) -> Result<ExtractedPayload, StrategyError> {
        let layers = self.gather_layers(doc).await?;
        if layers.images.is_empty() {
            return Err(StrategyError::Unavailable(
                "no page images could be produced for the vision call".to_string(),
            ));
        }

        let prompt = VISION_PROMPT_TEMPLATE
            .replace("{embedded_text}", truncate(&layers.embedded_text, MAX_LAYER_CHARS))
            .replace("{ocr_text}", truncate(&layers.ocr_text, MAX_LAYER_CHARS));
        let system = format!("{VISION_SYSTEM} {JSON_ONLY_SYSTEM} {VERBATIM_INSTRUCTION}");

        let resume: NormalizedResume = self
            .llm
            .call_json_with_images(&prompt, &system, &layers.images, GenerationParams::default())
            .await
            .map_err(map_llm_error)?;

        Ok(ExtractedPayload::Structured(resume))
    }
}

struct DocumentLayers {
    images: Vec<InlineImage>,
    embedded_text: String,
    ocr_text: String,
}

impl VisionStrategy {
    /// Collects the three input layers. The auxiliary text layers are
    /// best-effort: their absence degrades the prompt, not the strategy.
    async fn gather_layers(&self, doc: &RawDocument) -> Result<DocumentLayers, StrategyError> {
        match doc.format {
            DocumentFormat::Pdf => {
                let workspace = tempfile::tempdir()
                    .map_err(|e| StrategyError::External(format!("tempdir: {e}")))?;
                let settings = OcrSettings {
                    dpi: VISION_DPI,
                    max_pages: MAX_VISION_PAGES,
                    lang: self.ocr_lang.clone(),
                };
                let pages = ocr::rasterize_pdf(&doc.bytes, &settings, workspace.path()).await?;

                let mut images = Vec::with_capacity(pages.len());
                let mut ocr_text = String::new();
                for (idx, page) in pages.iter().enumerate() {
                    let png = tokio::fs::read(page)
                        .await
                        .map_err(|e| StrategyError::External(format!("reading page image: {e}")))?;
                    images.push(InlineImage {
                        media_type: "image/png",
                        data_base64: base64::engine::general_purpose::STANDARD.encode(&png),
                    });
                    match ocr::recognize_page(page, idx + 1, &self.ocr_lang).await {
                        Ok(text) => ocr_text.push_str(&text),
                        Err(e) => warn!(page = idx + 1, error = %e, "OCR layer unavailable"),
                    }
                }

                let bytes = doc.bytes.clone();
                let embedded_text = tokio::task::spawn_blocking(move || {
                    pdf_extract::extract_text_from_mem(&bytes).unwrap_or_default()
                })
                .await
                .unwrap_or_default();

                debug!(
                    pages = images.len(),
                    embedded_chars = embedded_text.len(),
                    ocr_chars = ocr_text.len(),
                    "assembled vision layers"
                );
                Ok(DocumentLayers { images, embedded_text, ocr_text })
            }
            DocumentFormat::Image => {
                let media_type = match doc.bytes.first() {
                    Some(0xFF) => "image/jpeg",
                    Some(0x89) => "image/png",
                    Some(b'G') => "image/gif",
                    _ => "image/webp",
                };
                let images = vec![InlineImage {
                    media_type,
                    data_base64: base64::engine::general_purpose::STANDARD.encode(&doc.bytes),
                }];
                Ok(DocumentLayers {
                    images,
                    embedded_text: String::new(),
                    ocr_text: String::new(),
                })
            }
            _ => Err(StrategyError::Unavailable(
                "vision synthesis supports only PDF and raster image inputs".to_string(),
            )),
        }
    }
}

fn map_llm_error(err: LlmError) -> StrategyError {
    match err {
        LlmError::Parse(e) => StrategyError::Parse(format!("model emitted invalid JSON: {e}")),
        LlmError::EmptyContent => StrategyError::LowConfidence("model returned no content".into()),
        other => StrategyError::External(other.to_string()),
    }
}

fn truncate(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    // Back off to a char boundary.
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
