//! Office-archive strategy — reads `word/document.xml` out of the OOXML ZIP
//! container and scrapes the WordprocessingML text runs. No full XML parser:
//! `<w:t>` runs carry all visible text in practice, and anything this scrape
//! misses still has the vision strategy behind it.

use std::io::{Cursor, Read};

use async_trait::async_trait;

use crate::extraction::cascade::{
    ExtractedPayload, ExtractionStrategy, RawDocument, StrategyError,
};
use crate::extraction::sniff::DocumentFormat;

pub struct OfficeTextStrategy;

#[async_trait]
impl ExtractionStrategy for OfficeTextStrategy {
    fn name(&self) -> &'static str {
        "office_text"
    }

    fn confidence_weight(&self) -> f32 {
        0.9
    }

    async fn extract(&self, doc: &RawDocument) -> Result<ExtractedPayload, StrategyError> {
        if doc.format != DocumentFormat::Office {
            return Err(StrategyError::Unavailable(
                "office text read only applies to OOXML archives".to_string(),
            ));
        }

        let cursor = Cursor::new(doc.bytes.to_vec());
        let mut archive = zip::ZipArchive::new(cursor)
            .map_err(|e| StrategyError::Parse(format!("failed to open archive: {e}")))?;

        let mut xml = String::new();
        match archive.by_name("word/document.xml") {
            Ok(mut entry) => {
                entry
                    .read_to_string(&mut xml)
                    .map_err(|e| StrategyError::Parse(format!("reading document.xml: {e}")))?;
            }
            Err(_) => {
                return Err(StrategyError::Parse(
                    "archive has no word/document.xml entry".to_string(),
                ))
            }
        }

        let text = scrape_text_runs(&xml);
        if text.trim().is_empty() {
            return Err(StrategyError::LowConfidence(
                "document.xml contained no text runs".to_string(),
            ));
        }

        Ok(ExtractedPayload::Text { text, page_count: 1 })
    }
}

/// Pulls the contents of `<w:t>` runs and turns paragraph boundaries
/// (`</w:p>`) into newlines, preserving document order.
fn scrape_text_runs(xml: &str) -> String {
    let mut out = String::new();
    let mut rest = xml;
    loop {
        let Some(open) = rest.find("<w:t") else { break };
        // Paragraph closes before the next run become line breaks.
        if rest[..open].contains("</w:p>") && !out.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }
        let after_open = &rest[open..];
        // "<w:t" is also the prefix of <w:tab/> and <w:tbl>; only a '>' or
        // an attribute list makes it a text run.
        match after_open[4..].chars().next() {
            Some('>') | Some(' ') => {}
            _ => {
                if after_open.starts_with("<w:tab") && !out.is_empty() && !out.ends_with(' ') {
                    out.push(' ');
                }
                rest = &after_open[4..];
                continue;
            }
        }
        let Some(tag_end) = after_open.find('>') else { break };
        let body = &after_open[tag_end + 1..];
        let Some(close) = body.find("</w:t>") else { break };
        out.push_str(&unescape_xml(&body[..close]));
        rest = &body[close..];
    }
    out
}

fn unescape_xml(s: &str) -> String {
    s.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
}
