//! Section segmentation — a state machine over lines with a single
//! `current` state variable. A header match switches the state; every other
//! non-empty line lands in the current section's bucket. The `Other` bucket
//! becomes `unclassified_content`, so no input line is silently dropped.

use std::collections::BTreeMap;

use crate::parsing::lexicon::Lexicon;

/// Named résumé regions. `Other` is both the initial state and the
/// catch-all for unattributed content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SectionKind {
    Other,
    Summary,
    Experience,
    Education,
    Skills,
    Certifications,
    Projects,
}

/// Ordered lines per section, produced by [`segment`] and consumed only by
/// the builder and field extractor.
#[derive(Debug, Default)]
pub struct SectionMap {
    buckets: BTreeMap<SectionKind, Vec<String>>,
}

impl SectionMap {
    pub fn lines(&self, kind: SectionKind) -> &[String] {
        self.buckets.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn push(&mut self, kind: SectionKind, line: String) {
        self.buckets.entry(kind).or_default().push(line);
    }

    /// Total lines across every bucket, including `Other`.
    pub fn total_lines(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }
}

/// Splits repaired text into sections. Tolerates residual spacing corruption
/// in header lines via a header-specific de-spacing pass.
pub fn segment(text: &str, lexicon: &Lexicon) -> SectionMap {
    let mut map = SectionMap::default();
    let mut current = SectionKind::Other;

    for raw_line in text.lines() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        let header_candidate = despace_header(line);
        if let Some(kind) = lexicon.match_header(&header_candidate) {
            // Headers switch state and are not content.
            current = kind;
            continue;
        }

        map.push(current, line.to_string());
    }

    map
}

/// A line made of single uppercase letters separated by spaces collapses to
/// its dense form so "E X P E R I E N C E" still matches the header rules.
/// Anything else passes through unchanged.
fn despace_header(line: &str) -> String {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let spaced_caps = tokens.len() >= 3
        && tokens
            .iter()
            .all(|t| t.chars().count() == 1 && t.chars().all(|c| c.is_ascii_uppercase()));
    if spaced_caps {
        tokens.concat()
    } else {
        line.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "Jane Doe\njane@example.com\n\
        SUMMARY\nEight years building backend systems.\n\
        EXPERIENCE\nSenior Engineer | Acme Corp\nJanuary 2019 - Present\n\
        - Shipped the billing rewrite\n\
        EDUCATION\nState University\nBachelor of Science in Computer Science\n\
        SKILLS\nRust, Python, PostgreSQL";

    #[test]
    fn test_lines_route_to_matching_sections() {
        let map = segment(SAMPLE, &Lexicon::default());
        assert_eq!(map.lines(SectionKind::Summary), ["Eight years building backend systems."]);
        assert_eq!(map.lines(SectionKind::Experience).len(), 3);
        assert_eq!(map.lines(SectionKind::Education).len(), 2);
        assert_eq!(map.lines(SectionKind::Skills), ["Rust, Python, PostgreSQL"]);
    }

    #[test]
    fn test_preamble_lands_in_other() {
        let map = segment(SAMPLE, &Lexicon::default());
        assert_eq!(map.lines(SectionKind::Other), ["Jane Doe", "jane@example.com"]);
    }

    #[test]
    fn test_header_lines_are_not_emitted_as_content() {
        let map = segment(SAMPLE, &Lexicon::default());
        for kind in [
            SectionKind::Other,
            SectionKind::Summary,
            SectionKind::Experience,
            SectionKind::Education,
            SectionKind::Skills,
        ] {
            for line in map.lines(kind) {
                assert_ne!(line, "EXPERIENCE");
                assert_ne!(line, "SUMMARY");
            }
        }
    }

    #[test]
    fn test_no_line_is_dropped() {
        // Every non-empty, non-header input line appears in exactly one bucket.
        let non_empty = SAMPLE.lines().filter(|l| !l.trim().is_empty()).count();
        let headers = 4; // SUMMARY, EXPERIENCE, EDUCATION, SKILLS
        let map = segment(SAMPLE, &Lexicon::default());
        assert_eq!(map.total_lines(), non_empty - headers);
    }

    #[test]
    fn test_spaced_uppercase_header_recognized() {
        let text = "E X P E R I E N C E\nSenior Engineer at Acme";
        let map = segment(text, &Lexicon::default());
        assert_eq!(map.lines(SectionKind::Experience), ["Senior Engineer at Acme"]);
        assert!(map.lines(SectionKind::Other).is_empty());
    }

    #[test]
    fn test_spaced_multiword_header_recognized() {
        // Despacing yields "WORKEXPERIENCE"; the header patterns accept the
        // dense form.
        let text = "W O R K E X P E R I E N C E\nSenior Engineer at Acme";
        let map = segment(text, &Lexicon::default());
        assert_eq!(map.lines(SectionKind::Experience), ["Senior Engineer at Acme"]);
        assert!(map.lines(SectionKind::Other).is_empty());
    }

    #[test]
    fn test_unheaded_document_goes_entirely_to_other() {
        let text = "just a paragraph\nanother paragraph";
        let map = segment(text, &Lexicon::default());
        assert_eq!(map.lines(SectionKind::Other).len(), 2);
    }

    #[test]
    fn test_despace_header_leaves_initials_alone() {
        // Two tokens is too short to be a spaced header; "J D" stays as-is.
        assert_eq!(despace_header("J D"), "J D");
        assert_eq!(despace_header("S K I L L S"), "SKILLS");
    }
}
