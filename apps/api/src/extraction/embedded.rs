//! Embedded text-layer strategy — reads the PDF text layer directly with no
//! rendering. Cheapest and highest-confidence extraction when a text layer
//! exists; near-empty output signals a scanned/image-based PDF rather than
//! an error, and the cascade moves on to OCR.

use async_trait::async_trait;

use crate::extraction::cascade::{
    ExtractedPayload, ExtractionStrategy, RawDocument, StrategyError,
};
use crate::extraction::sniff::DocumentFormat;

/// Below this the "text layer" is almost certainly just metadata remnants of
/// a scanned document.
const MIN_EMBEDDED_CHARS: usize = 50;

pub struct EmbeddedTextStrategy;

#[async_trait]
impl ExtractionStrategy for EmbeddedTextStrategy {
    fn name(&self) -> &'static str {
        "embedded_text"
    }

    fn confidence_weight(&self) -> f32 {
        1.0
    }

    async fn extract(&self, doc: &RawDocument) -> Result<ExtractedPayload, StrategyError> {
        if doc.format != DocumentFormat::Pdf {
            return Err(StrategyError::Unavailable(
                "embedded text layer only exists in PDF documents".to_string(),
            ));
        }

        let bytes = doc.bytes.clone();
        // pdf-extract is synchronous; run it off the async worker. A panic
        // inside the decoder surfaces as a join error and is treated as a
        // parse failure of this strategy only.
        let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
            .await
            .map_err(|e| StrategyError::Parse(format!("pdf decoder aborted: {e}")))?
            .map_err(|e| StrategyError::Parse(format!("failed to read text layer: {e}")))?;

        let trimmed = text.trim();
        if trimmed.len() < MIN_EMBEDDED_CHARS {
            return Err(StrategyError::LowConfidence(format!(
                "text layer nearly empty ({} chars); document may be scanned",
                trimmed.len()
            )));
        }

        let page_count = text.matches('\u{c}').count().max(1);
        Ok(ExtractedPayload::Text { text, page_count })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[tokio::test]
    async fn test_non_pdf_is_unavailable() {
        let doc = RawDocument::sniff(Bytes::from_static(&[0x89, 0x50, 0x4E, 0x47]));
        let err = EmbeddedTextStrategy.extract(&doc).await.unwrap_err();
        assert!(matches!(err, StrategyError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_malformed_pdf_is_parse_failure_not_panic() {
        // Starts with the PDF magic but carries no valid structure.
        let doc = RawDocument::sniff(Bytes::from_static(b"%PDF-1.4 not actually a pdf"));
        let err = EmbeddedTextStrategy.extract(&doc).await.unwrap_err();
        assert!(matches!(
            err,
            StrategyError::Parse(_) | StrategyError::LowConfidence(_)
        ));
    }
}
