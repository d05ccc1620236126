//! Lookup tables for segmentation and field extraction, carried as one
//! injected configuration value instead of module-level globals so every
//! consumer stays pure and independently testable.

use regex::Regex;

use crate::parsing::sections::SectionKind;

/// Known place names recognized by the location extractor and protected by
/// the repair pass. Matching is case-insensitive substring containment.
pub const LOCATIONS: &[&str] = &[
    "India", "United States", "USA", "Canada", "United Kingdom", "UK", "Germany",
    "France", "Australia", "Singapore", "Netherlands", "Ireland", "Switzerland",
    "Bangalore", "Bengaluru", "Hyderabad", "Mumbai", "Delhi", "Chennai", "Pune",
    "Kolkata", "Noida", "Gurgaon", "New York", "San Francisco", "Seattle",
    "Austin", "Boston", "Chicago", "London", "Berlin", "Munich", "Amsterdam",
    "Dublin", "Paris", "Sydney", "Toronto", "Vancouver", "Remote",
];

/// Words that defeat a location candidate even when a dictionary entry
/// partially overlaps it ("August" contains no place, "Analyst" is a title).
pub const LOCATION_BLACKLIST: &[&str] = &[
    // months
    "january", "february", "march", "april", "may", "june", "july", "august",
    "september", "october", "november", "december",
    // languages commonly listed on résumés
    "english", "hindi", "spanish", "french", "german", "mandarin", "telugu", "tamil",
    // job-title words
    "analyst", "engineer", "developer", "manager", "consultant", "architect",
    "intern", "lead", "designer", "administrator",
];

/// Degree keywords that open an education entry.
pub const DEGREE_KEYWORDS: &[&str] = &[
    "bachelor", "master", "phd", "ph.d", "doctorate", "diploma", "b.tech", "btech",
    "m.tech", "mtech", "b.sc", "bsc", "m.sc", "msc", "b.e", "mba", "bba", "b.a", "m.a",
    "associate",
];

/// Institution keywords that open or extend an education entry.
pub const INSTITUTION_KEYWORDS: &[&str] =
    &["university", "college", "institute", "school", "academy", "polytechnic", "iit"];

/// Words that disqualify a line from being the candidate's name.
pub const NAME_SKIP_WORDS: &[&str] = &[
    "resume", "curriculum", "vitae", "summary", "objective", "profile",
    "experience", "education", "skills", "projects", "certifications", "contact",
];

/// Header lines longer than this are body prose, not section headers.
pub const MAX_HEADER_LEN: usize = 40;

/// Compiled lookup tables. Built once at startup and shared read-only.
pub struct Lexicon {
    /// Ordered header patterns; first match wins.
    pub section_headers: Vec<(SectionKind, Regex)>,
    pub locations: Vec<&'static str>,
    pub location_blacklist: Vec<&'static str>,
    pub degree_keywords: Vec<&'static str>,
    pub institution_keywords: Vec<&'static str>,
    pub name_skip_words: Vec<&'static str>,
}

impl Default for Lexicon {
    fn default() -> Self {
        let header = |kind: SectionKind, pattern: &str| {
            let re = Regex::new(&format!(r"(?i)^(?:{pattern})\s*:?\s*$")).expect("static regex");
            (kind, re)
        };
        Self {
            section_headers: vec![
                // Inter-word whitespace is optional: spaced-letter headers
                // like "W O R K   E X P E R I E N C E" arrive densely
                // concatenated after despacing.
                header(
                    SectionKind::Summary,
                    r"professional\s*summary|career\s*summary|summary|profile|objective|about\s*me",
                ),
                header(
                    SectionKind::Experience,
                    r"work\s*experience|professional\s*experience|employment(?:\s*history)?|work\s*history|experience",
                ),
                header(
                    SectionKind::Education,
                    r"education(?:al\s*background)?|academic\s*background|academics",
                ),
                header(
                    SectionKind::Skills,
                    r"technical\s*skills|core\s*competencies|skills(?:\s*&\s*abilities)?|technologies",
                ),
                header(
                    SectionKind::Certifications,
                    r"certifications?|licenses?\s*(?:&\s*certifications?)?|courses\s*and\s*certifications?",
                ),
                header(
                    SectionKind::Projects,
                    r"(?:personal|academic|key)\s+projects|projects?",
                ),
            ],
            locations: LOCATIONS.to_vec(),
            location_blacklist: LOCATION_BLACKLIST.to_vec(),
            degree_keywords: DEGREE_KEYWORDS.to_vec(),
            institution_keywords: INSTITUTION_KEYWORDS.to_vec(),
            name_skip_words: NAME_SKIP_WORDS.to_vec(),
        }
    }
}

impl Lexicon {
    /// Returns the section kind a header line switches to, if any. Lines
    /// over the length bound never match: real headers are short.
    pub fn match_header(&self, line: &str) -> Option<SectionKind> {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.len() > MAX_HEADER_LEN {
            return None;
        }
        self.section_headers
            .iter()
            .find(|(_, re)| re.is_match(trimmed))
            .map(|(kind, _)| *kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_headers_match() {
        let lex = Lexicon::default();
        assert_eq!(lex.match_header("EXPERIENCE"), Some(SectionKind::Experience));
        assert_eq!(lex.match_header("Work Experience:"), Some(SectionKind::Experience));
        assert_eq!(lex.match_header("Professional Summary"), Some(SectionKind::Summary));
        assert_eq!(lex.match_header("EDUCATION"), Some(SectionKind::Education));
        assert_eq!(lex.match_header("Technical Skills"), Some(SectionKind::Skills));
        assert_eq!(lex.match_header("Certifications"), Some(SectionKind::Certifications));
        assert_eq!(lex.match_header("Projects"), Some(SectionKind::Projects));
    }

    #[test]
    fn test_body_prose_does_not_match() {
        let lex = Lexicon::default();
        assert_eq!(lex.match_header("Gained experience building APIs"), None);
        assert_eq!(
            lex.match_header("My experience spans a decade of work across several skills domains"),
            None
        );
    }

    #[test]
    fn test_overlong_header_candidate_rejected() {
        let lex = Lexicon::default();
        let long = format!("experience{}", " x".repeat(30));
        assert_eq!(lex.match_header(&long), None);
    }

    #[test]
    fn test_header_order_prefers_summary_over_experience() {
        // "Professional Summary" must not be eaten by the experience rule.
        let lex = Lexicon::default();
        assert_eq!(lex.match_header("professional summary"), Some(SectionKind::Summary));
    }

    #[test]
    fn test_blacklist_is_lowercase() {
        for word in LOCATION_BLACKLIST {
            assert_eq!(*word, word.to_lowercase().as_str());
        }
    }
}
