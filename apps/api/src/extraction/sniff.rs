//! Format sniffing — classifies an uploaded buffer by its magic bytes.
//!
//! The declared content type of an upload is untrusted; the real format is
//! re-derived from the first bytes. `Unknown` is a valid terminal
//! classification, not an error: the pipeline fails fast on it without
//! attempting extraction.

/// Sniffed document format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    /// ZIP archive carrying an OOXML `[Content_Types].xml` manifest
    /// (docx/xlsx/pptx family).
    Office,
    /// PNG, JPEG, GIF or WEBP raster image.
    Image,
    Unknown,
}

impl DocumentFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Office => "office",
            DocumentFormat::Image => "image",
            DocumentFormat::Unknown => "unknown",
        }
    }
}

const PDF_MAGIC: &[u8] = b"%PDF";
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const PNG_MAGIC: &[u8] = &[0x89, 0x50, 0x4E, 0x47];
const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF];
const GIF_MAGIC: &[u8] = b"GIF8";
const RIFF_MAGIC: &[u8] = b"RIFF";
const WEBP_TAG: &[u8] = b"WEBP";
const OOXML_MANIFEST: &[u8] = b"[Content_Types].xml";

/// Classifies a raw buffer. Never panics; empty or unrecognized input maps
/// to `Unknown`.
pub fn sniff_format(bytes: &[u8]) -> DocumentFormat {
    if bytes.starts_with(PDF_MAGIC) {
        return DocumentFormat::Pdf;
    }
    if bytes.starts_with(ZIP_MAGIC) {
        // Office documents are ZIP containers; distinguish them from plain
        // archives by the OOXML manifest entry name, which appears verbatim
        // in the local file headers and the central directory.
        if contains_subslice(bytes, OOXML_MANIFEST) {
            return DocumentFormat::Office;
        }
        return DocumentFormat::Unknown;
    }
    if bytes.starts_with(PNG_MAGIC) || bytes.starts_with(JPEG_MAGIC) || bytes.starts_with(GIF_MAGIC)
    {
        return DocumentFormat::Image;
    }
    if bytes.starts_with(RIFF_MAGIC) && bytes.len() >= 12 && &bytes[8..12] == WEBP_TAG {
        return DocumentFormat::Image;
    }
    DocumentFormat::Unknown
}

fn contains_subslice(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}
