//! Typed field extraction — pulls contact fields out of raw text using
//! regex families plus disambiguation heuristics. Deterministic and
//! order-preserving: ties are broken by document order, never by score.

use regex::Regex;

use crate::models::resume::ResumeLinks;
use crate::parsing::lexicon::Lexicon;

/// How far into the document the header-block heuristics (links label form,
/// location, name) are allowed to look.
const HEAD_WINDOW: usize = 1000;
/// Lines considered by the name scan.
const NAME_SCAN_LINES: usize = 10;

/// Contact fields recovered from the raw text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactFields {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub links: ResumeLinks,
}

pub struct FieldExtractor {
    email: Regex,
    phone: Regex,
    linkedin_url: Regex,
    linkedin_loose: Regex,
    linkedin_label: Regex,
    github_url: Regex,
    website: Regex,
    name_shape: Regex,
}

impl FieldExtractor {
    pub fn new() -> Self {
        let re = |p: &str| Regex::new(p).expect("static regex");
        Self {
            email: re(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}"),
            // International prefix, grouped separators, optional extension.
            // The digit-count rule below does the real filtering.
            phone: re(
                r"(?:\+\d{1,3}[\s.-]?)?(?:\(\d{1,4}\)[\s.-]?)?\d{3,5}[\s.-]?\d{3,6}(?:[\s.-]?\d{2,6})?(?:\s*(?:x|ext\.?)\s*\d{1,5})?",
            ),
            linkedin_url: re(r"(?i)https?://(?:www\.)?linkedin\.com/in/[A-Za-z0-9_%-]+/?"),
            linkedin_loose: re(r"(?i)\b(?:www\.)?linkedin\.com/in/([A-Za-z0-9_%-]+)"),
            linkedin_label: re(r"(?i)(?:linkedin\s*:\s*|\bin/)([A-Za-z0-9-]+)"),
            github_url: re(r"(?i)https?://(?:www\.)?github\.com/[A-Za-z0-9_.-]+(?:/[A-Za-z0-9._-]+)?"),
            website: re(r"(?i)\b(?:https?://|www\.)[A-Za-z0-9.-]+\.[A-Za-z]{2,}[^\s|]*"),
            name_shape: re(r"^[A-Z][A-Za-z'.-]*(?:\s+[A-Z][A-Za-z'.-]*){0,3}$"),
        }
    }

    /// Extracts every contact field. Pure: running it twice on the same
    /// text yields the same result.
    pub fn extract(&self, text: &str, lexicon: &Lexicon) -> ContactFields {
        ContactFields {
            name: self.extract_name(text, lexicon),
            email: self.extract_email(text),
            phone: self.extract_phone(text),
            location: self.extract_location(text, lexicon),
            links: self.extract_links(text),
        }
    }

    pub fn extract_email(&self, text: &str) -> Option<String> {
        self.email.find(text).map(|m| m.as_str().to_string())
    }

    /// First phone-shaped candidate whose digit-only form has 10–15 digits.
    /// The digit band rejects date-like and ID-like numeric runs.
    pub fn extract_phone(&self, text: &str) -> Option<String> {
        for m in self.phone.find_iter(text) {
            let digits = m.as_str().chars().filter(|c| c.is_ascii_digit()).count();
            if (10..=15).contains(&digits) {
                return Some(m.as_str().trim().to_string());
            }
        }
        None
    }

    pub fn extract_links(&self, text: &str) -> ResumeLinks {
        ResumeLinks {
            linkedin: self.extract_linkedin(text),
            github: self.github_url.find(text).map(|m| m.as_str().to_string()),
            website: self.extract_website(text),
        }
    }

    /// Three-pass LinkedIn detection: canonical URL anywhere, schemeless URL
    /// anywhere, then the text-label form ("in/handle", "LinkedIn: handle")
    /// restricted to the head window to avoid body-text false positives.
    fn extract_linkedin(&self, text: &str) -> Option<String> {
        if let Some(m) = self.linkedin_url.find(text) {
            return Some(m.as_str().trim_end_matches('/').to_string());
        }
        if let Some(c) = self.linkedin_loose.captures(text) {
            return Some(format!("https://linkedin.com/in/{}", &c[1]));
        }
        let head = head_window(text);
        if let Some(c) = self.linkedin_label.captures(head) {
            return Some(format!("https://linkedin.com/in/{}", &c[1]));
        }
        None
    }

    /// Generic website: any URL-shaped token that is not a social profile
    /// or a mail domain.
    fn extract_website(&self, text: &str) -> Option<String> {
        for m in self.website.find_iter(text) {
            let lower = m.as_str().to_lowercase();
            if lower.contains("linkedin.com")
                || lower.contains("github.com")
                || lower.contains("gmail.com")
                || lower.contains("mailto")
            {
                continue;
            }
            return Some(m.as_str().to_string());
        }
        None
    }

    /// Scans head-window candidates split on line/pipe/bullet delimiters.
    /// A candidate that is itself an email, URL or bare numeric run is
    /// rejected; otherwise the earliest known place name inside it wins,
    /// unless a blacklist word (month, language, job title) co-occurs.
    pub fn extract_location(&self, text: &str, lexicon: &Lexicon) -> Option<String> {
        let head = head_window(text);
        for candidate in head.split(['\n', '|', '\u{2022}', '\u{00b7}']) {
            let candidate = candidate.trim();
            if candidate.len() < 2 || candidate.len() > 120 {
                continue;
            }
            if self.is_contact_noise(candidate) {
                continue;
            }
            let lower = candidate.to_lowercase();
            if lexicon
                .location_blacklist
                .iter()
                .any(|word| contains_word(&lower, word))
            {
                continue;
            }
            // Earliest dictionary match in the candidate, verbatim slice.
            let mut best: Option<(usize, usize)> = None;
            for place in &lexicon.locations {
                if let Some(pos) = lower.find(&place.to_lowercase()) {
                    let len = place.len();
                    if best.map(|(p, _)| pos < p).unwrap_or(true) {
                        best = Some((pos, len));
                    }
                }
            }
            if let Some((pos, len)) = best {
                return Some(candidate[pos..pos + len].to_string());
            }
        }
        None
    }

    /// Scans the first lines for a name-shaped line, skipping section-header
    /// words, contact lines and out-of-band lengths. Falls back to the first
    /// sufficiently short surviving line.
    pub fn extract_name(&self, text: &str, lexicon: &Lexicon) -> Option<String> {
        let mut fallback: Option<String> = None;
        for line in text.lines().take(NAME_SCAN_LINES) {
            let line = line.trim();
            if line.len() < 2 || line.len() > 80 {
                continue;
            }
            let lower = line.to_lowercase();
            if lexicon.name_skip_words.iter().any(|w| contains_word(&lower, w)) {
                continue;
            }
            if line.contains('@') || self.extract_phone(line).is_some() {
                continue;
            }
            if self.name_shape.is_match(line) {
                return Some(line.to_string());
            }
            if fallback.is_none() && line.len() <= 40 {
                fallback = Some(line.to_string());
            }
        }
        fallback
    }

    /// Whole-candidate shape tests: a spaceless email/URL token or a bare
    /// numeric run is contact noise, not a place.
    fn is_contact_noise(&self, candidate: &str) -> bool {
        if !candidate.contains(' ')
            && (self.email.is_match(candidate) || self.website.is_match(candidate))
        {
            return true;
        }
        let digits = candidate.chars().filter(|c| c.is_ascii_digit()).count();
        let alphas = candidate.chars().filter(|c| c.is_alphabetic()).count();
        digits >= 7 && alphas == 0
    }
}

impl Default for FieldExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn head_window(text: &str) -> &str {
    let mut end = text.len().min(HEAD_WINDOW);
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// Word-boundary containment without building a regex per word.
fn contains_word(haystack_lower: &str, word: &str) -> bool {
    haystack_lower.split(|c: char| !c.is_alphanumeric()).any(|t| t == word)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_HEADER: &str = "Vamshi Banoth\n\
        India banothvamshi13@gmail.com +91 6302061843 in/vamshi-banoth\n\
        SUMMARY\nBackend engineer focused on distributed systems.";

    fn extractor() -> FieldExtractor {
        FieldExtractor::new()
    }

    #[test]
    fn test_email_first_match_wins() {
        let text = "contact: a@b.com or backup c@d.org";
        assert_eq!(extractor().extract_email(text).as_deref(), Some("a@b.com"));
    }

    #[test]
    fn test_phone_with_country_code() {
        let phone = extractor().extract_phone(SAMPLE_HEADER).unwrap();
        let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();
        assert_eq!(digits, "916302061843");
    }

    #[test]
    fn test_phone_rejects_date_like_runs() {
        assert_eq!(extractor().extract_phone("January 2019 - Present, 2021"), None);
    }

    #[test]
    fn test_phone_rejects_overlong_id() {
        assert_eq!(extractor().extract_phone("ID 12345678901234567890"), None);
    }

    #[test]
    fn test_phone_extraction_is_idempotent() {
        let e = extractor();
        assert_eq!(e.extract_phone(SAMPLE_HEADER), e.extract_phone(SAMPLE_HEADER));
        assert_eq!(e.extract_email(SAMPLE_HEADER), e.extract_email(SAMPLE_HEADER));
    }

    #[test]
    fn test_linkedin_canonical_url() {
        let text = "see https://www.linkedin.com/in/jane-doe/ for details";
        assert_eq!(
            extractor().extract_links(text).linkedin.as_deref(),
            Some("https://www.linkedin.com/in/jane-doe")
        );
    }

    #[test]
    fn test_linkedin_loose_url_normalized() {
        let text = "linkedin.com/in/jane-doe";
        assert_eq!(
            extractor().extract_links(text).linkedin.as_deref(),
            Some("https://linkedin.com/in/jane-doe")
        );
    }

    #[test]
    fn test_linkedin_label_form_in_head() {
        let links = extractor().extract_links(SAMPLE_HEADER);
        assert_eq!(links.linkedin.as_deref(), Some("https://linkedin.com/in/vamshi-banoth"));
    }

    #[test]
    fn test_linkedin_label_ignored_deep_in_body() {
        let mut text = "Jane Doe\n".to_string();
        text.push_str(&"body text filler line\n".repeat(60));
        text.push_str("worked in/around the platform team");
        assert_eq!(extractor().extract_links(&text).linkedin, None);
    }

    #[test]
    fn test_github_canonical_only() {
        let text = "code at https://github.com/janedoe and github.com/ignored";
        let links = extractor().extract_links(text);
        assert_eq!(links.github.as_deref(), Some("https://github.com/janedoe"));
    }

    #[test]
    fn test_website_excludes_social_domains() {
        let text = "https://linkedin.com/in/x https://github.com/y https://janedoe.dev";
        let links = extractor().extract_links(text);
        assert_eq!(links.website.as_deref(), Some("https://janedoe.dev"));
    }

    #[test]
    fn test_location_found_on_contact_line() {
        let location = extractor().extract_location(SAMPLE_HEADER, &Lexicon::default());
        assert_eq!(location.as_deref(), Some("India"));
    }

    #[test]
    fn test_location_blacklist_suppresses_months_and_titles() {
        let lex = Lexicon::default();
        let e = extractor();
        assert_eq!(e.extract_location("August 2021 in Augusta", &lex), None);
        assert_eq!(e.extract_location("Data Analyst Indiana", &lex), None);
    }

    #[test]
    fn test_location_ignores_language_lines() {
        let lex = Lexicon::default();
        assert_eq!(extractor().extract_location("Languages: English, Hindi, German", &lex), None);
    }

    #[test]
    fn test_name_from_first_line() {
        let name = extractor().extract_name(SAMPLE_HEADER, &Lexicon::default());
        assert_eq!(name.as_deref(), Some("Vamshi Banoth"));
    }

    #[test]
    fn test_name_skips_resume_label_and_contact_lines() {
        let text = "RESUME\njane@example.com\nJane Doe\nSoftware things";
        let name = extractor().extract_name(text, &Lexicon::default());
        assert_eq!(name.as_deref(), Some("Jane Doe"));
    }

    #[test]
    fn test_name_fallback_to_short_line() {
        // "dr. jane van der berg" fails the capitalized shape but is short.
        let text = "dr. jane van der berg\nlong body paragraph that keeps going and going beyond any plausible name length for a header line";
        let name = extractor().extract_name(text, &Lexicon::default());
        assert_eq!(name.as_deref(), Some("dr. jane van der berg"));
    }

    #[test]
    fn test_full_extract_on_sample_header() {
        let fields = extractor().extract(SAMPLE_HEADER, &Lexicon::default());
        assert_eq!(fields.name.as_deref(), Some("Vamshi Banoth"));
        assert_eq!(fields.email.as_deref(), Some("banothvamshi13@gmail.com"));
        assert_eq!(fields.location.as_deref(), Some("India"));
    }
}
