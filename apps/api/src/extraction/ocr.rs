//! Raster + OCR strategy — renders pages with `pdftoppm` and recognizes
//! each page with `tesseract`, both invoked as per-call scoped
//! subprocesses. Used when the embedded text layer is absent or rejected by
//! the quality gate. Significantly slower than a text-layer read, so it sits
//! second in the cascade. The rasterize/recognize helpers are shared with
//! the vision strategy, which needs the same page images.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::extraction::cascade::{
    ExtractedPayload, ExtractionStrategy, RawDocument, StrategyError,
};
use crate::extraction::sniff::DocumentFormat;

/// OCR tunables, injected from `Config`.
#[derive(Debug, Clone)]
pub struct OcrSettings {
    /// Render resolution. 300 is the usual quality/speed tradeoff.
    pub dpi: u32,
    /// Hard cap on rasterized pages; anything beyond it is ignored.
    pub max_pages: usize,
    /// Tesseract language code.
    pub lang: String,
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self { dpi: 300, max_pages: 10, lang: "eng".to_string() }
    }
}

pub struct OcrStrategy {
    pub settings: OcrSettings,
}

impl OcrStrategy {
    pub fn new(settings: OcrSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl ExtractionStrategy for OcrStrategy {
    fn name(&self) -> &'static str {
        "raster_ocr"
    }

    fn confidence_weight(&self) -> f32 {
        0.7
    }

    async fn extract(&self, doc: &RawDocument) -> Result<ExtractedPayload, StrategyError> {
        match doc.format {
            DocumentFormat::Pdf => self.ocr_pdf(doc).await,
            DocumentFormat::Image => self.ocr_single_image(doc).await,
            _ => Err(StrategyError::Unavailable(
                "OCR supports only PDF and raster image inputs".to_string(),
            )),
        }
    }
}

impl OcrStrategy {
    async fn ocr_pdf(&self, doc: &RawDocument) -> Result<ExtractedPayload, StrategyError> {
        ensure_tools_available().await?;

        let workspace = tempfile::tempdir()
            .map_err(|e| StrategyError::External(format!("tempdir: {e}")))?;
        let pages = rasterize_pdf(&doc.bytes, &self.settings, workspace.path()).await?;
        if pages.is_empty() {
            return Err(StrategyError::Parse("pdftoppm produced no page images".to_string()));
        }
        debug!(pages = pages.len(), "rasterized pages, starting OCR");

        let mut combined = String::new();
        for (idx, image_path) in pages.iter().enumerate() {
            if idx > 0 {
                combined.push_str(&format!("\n\n--- Page {} ---\n\n", idx + 1));
            }
            combined.push_str(&recognize_page(image_path, idx + 1, &self.settings.lang).await?);
        }

        Ok(ExtractedPayload::Text { page_count: pages.len(), text: combined })
    }

    async fn ocr_single_image(&self, doc: &RawDocument) -> Result<ExtractedPayload, StrategyError> {
        if !command_available("tesseract").await {
            return Err(StrategyError::Unavailable("tesseract not installed".to_string()));
        }

        let workspace = tempfile::tempdir()
            .map_err(|e| StrategyError::External(format!("tempdir: {e}")))?;
        let image_path = workspace.path().join("input.png");
        tokio::fs::write(&image_path, &doc.bytes)
            .await
            .map_err(|e| StrategyError::External(format!("writing temp image: {e}")))?;

        let text = recognize_page(&image_path, 1, &self.settings.lang).await?;
        Ok(ExtractedPayload::Text { text, page_count: 1 })
    }
}

/// Renders up to `max_pages` pages of a PDF into zero-padded PNGs inside
/// `dir` and returns them in page order.
pub(crate) async fn rasterize_pdf(
    bytes: &[u8],
    settings: &OcrSettings,
    dir: &Path,
) -> Result<Vec<PathBuf>, StrategyError> {
    let pdf_path = dir.join("input.pdf");
    tokio::fs::write(&pdf_path, bytes)
        .await
        .map_err(|e| StrategyError::External(format!("writing temp pdf: {e}")))?;

    let output_prefix = dir.join("page");
    let rendered = Command::new("pdftoppm")
        .arg("-png")
        .arg("-r")
        .arg(settings.dpi.to_string())
        .arg("-l")
        .arg(settings.max_pages.to_string())
        .arg(&pdf_path)
        .arg(&output_prefix)
        .output()
        .await
        .map_err(|e| StrategyError::External(format!("failed to run pdftoppm: {e}")))?;

    if !rendered.status.success() {
        let stderr = String::from_utf8_lossy(&rendered.stderr);
        return Err(StrategyError::Parse(format!("pdftoppm failed: {stderr}")));
    }

    collect_page_images(dir, settings.max_pages)
        .map_err(|e| StrategyError::External(format!("listing rendered pages: {e}")))
}

/// Runs tesseract on one rendered page. Engine lifecycle is scoped to this
/// call: spawn, read stdout, done.
pub(crate) async fn recognize_page(
    image: &Path,
    page: usize,
    lang: &str,
) -> Result<String, StrategyError> {
    let output = Command::new("tesseract")
        .arg(image)
        .arg("stdout")
        .arg("-l")
        .arg(lang)
        .arg("--psm")
        .arg("1") // automatic page segmentation with orientation detection
        .output()
        .await
        .map_err(|e| {
            StrategyError::External(format!("failed to run tesseract on page {page}: {e}"))
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        warn!(page, %stderr, "tesseract reported errors");
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Both tools must exist for PDF OCR; probed per call so the strategy
/// degrades to `Unavailable` instead of erroring mid-run.
pub(crate) async fn ensure_tools_available() -> Result<(), StrategyError> {
    if !command_available("pdftoppm").await {
        return Err(StrategyError::Unavailable(
            "pdftoppm not installed (poppler-utils)".to_string(),
        ));
    }
    if !command_available("tesseract").await {
        return Err(StrategyError::Unavailable("tesseract not installed".to_string()));
    }
    Ok(())
}

pub(crate) async fn command_available(name: &str) -> bool {
    Command::new(name)
        .arg("--version")
        .output()
        .await
        .map(|o| o.status.success())
        .unwrap_or(false)
}

fn collect_page_images(dir: &Path, max_pages: usize) -> std::io::Result<Vec<PathBuf>> {
    let mut pages: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().map(|ext| ext == "png").unwrap_or(false))
        .collect();
    // pdftoppm zero-pads page numbers, so lexical order is page order.
    pages.sort();
    pages.truncate(max_pages);
    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[tokio::test]
    async fn test_unsupported_format_is_unavailable() {
        let strategy = OcrStrategy::new(OcrSettings::default());
        let doc = RawDocument::sniff(Bytes::from_static(b"PK\x03\x04[Content_Types].xml"));
        let err = strategy.extract(&doc).await.unwrap_err();
        assert!(matches!(err, StrategyError::Unavailable(_)));
    }

    #[test]
    fn test_collect_page_images_sorts_and_truncates() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["page-03.png", "page-01.png", "page-02.png", "notes.txt"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        let pages = collect_page_images(dir.path(), 2).unwrap();
        assert_eq!(pages.len(), 2);
        assert!(pages[0].to_string_lossy().ends_with("page-01.png"));
        assert!(pages[1].to_string_lossy().ends_with("page-02.png"));
    }

    #[test]
    fn test_default_settings_are_bounded() {
        let settings = OcrSettings::default();
        assert!(settings.max_pages > 0);
        assert!(settings.dpi >= 150);
    }
}
