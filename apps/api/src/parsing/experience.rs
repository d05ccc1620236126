//! Work-history parsing. Entries are anchored on date-range lines; the
//! surrounding lines supply title and company, bullet lines accumulate
//! into the description.

use std::collections::HashSet;

use regex::Regex;

use crate::models::resume::ExperienceEntry;
use crate::parsing::lexicon::Lexicon;

const BULLET_MARKERS: &[char] = &['\u{2022}', '-', '*', '\u{25e6}', '\u{25aa}', '\u{00b7}', '\u{2023}'];

pub struct ExperienceParser {
    /// Two date tokens joined by a dash or "to". A date token is a
    /// month-year, MM/YYYY, bare year, or Present/Current.
    date_range: Regex,
}

impl ExperienceParser {
    pub fn new() -> Self {
        let token = r"(?:(?:jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?\s+\d{4}|\d{1,2}/\d{4}|\d{4}|present|current)";
        let pattern = format!(r"(?i)\b{token}\s*(?:[-\u{{2013}}\u{{2014}}]|to)\s*{token}\b");
        Self {
            date_range: Regex::new(&pattern).expect("static regex"),
        }
    }

    /// Walks the section lines once. A date-range line opens a new entry;
    /// the most recent plain line before it is the title candidate, the
    /// non-date remainder of the line itself is the company. Plain lines
    /// that turn out not to precede a date range fall into the open
    /// entry's description.
    pub fn parse(&self, lines: &[String], lexicon: &Lexicon) -> Vec<ExperienceEntry> {
        let mut entries: Vec<ExperienceEntry> = Vec::new();
        let mut pending: Option<String> = None;
        let mut awaiting_company = false;

        for raw in lines {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }

            if let Some(range) = self.date_range.find(line) {
                let duration = range.as_str().trim().to_string();
                let remainder = strip_range(line, range.start(), range.end());
                let mut entry = ExperienceEntry {
                    title: String::new(),
                    company: String::new(),
                    location: None,
                    duration,
                    description: Vec::new(),
                };
                self.assign_header(&mut entry, &remainder, pending.take(), lexicon);
                awaiting_company = entry.company.is_empty();
                entries.push(entry);
                continue;
            }

            if let Some(text) = strip_bullet(line) {
                flush_pending(&mut entries, &mut pending);
                if let Some(entry) = entries.last_mut() {
                    entry.description.push(text);
                }
                awaiting_company = false;
                continue;
            }

            // Plain line. An entry still missing its company claims the
            // first short one; otherwise hold the line in case it is the
            // title of the next entry.
            if awaiting_company && line.len() <= 60 {
                if let Some(entry) = entries.last_mut() {
                    entry.company = line.to_string();
                }
                awaiting_company = false;
                continue;
            }
            flush_pending(&mut entries, &mut pending);
            pending = Some(line.to_string());
        }
        flush_pending(&mut entries, &mut pending);

        dedup(entries)
    }

    /// Distributes the date line's remainder and the preceding plain line
    /// over title/company/location.
    fn assign_header(
        &self,
        entry: &mut ExperienceEntry,
        remainder: &str,
        pending: Option<String>,
        lexicon: &Lexicon,
    ) {
        let mut parts = split_header(remainder);
        // A trailing part that is a known place is the entry location.
        if let Some(last) = parts.last() {
            if lexicon.locations.iter().any(|l| l.eq_ignore_ascii_case(last)) {
                entry.location = parts.pop();
            }
        }

        match (parts.len(), pending) {
            (0, Some(prev)) => {
                let mut prev_parts = split_header(&prev);
                entry.title = if prev_parts.is_empty() { prev } else { prev_parts.remove(0) };
                if let Some(company) = prev_parts.into_iter().next() {
                    entry.company = company;
                }
            }
            (0, None) => {}
            (1, Some(prev)) => {
                entry.title = prev;
                entry.company = parts.remove(0);
            }
            (1, None) => {
                let only = parts.remove(0);
                if let Some((title, company)) = only.split_once(" at ") {
                    entry.title = title.trim().to_string();
                    entry.company = company.trim().to_string();
                } else {
                    entry.title = only;
                }
            }
            (_, _) => {
                entry.title = parts.remove(0);
                entry.company = parts.remove(0);
            }
        }
    }
}

impl Default for ExperienceParser {
    fn default() -> Self {
        Self::new()
    }
}

fn strip_range(line: &str, start: usize, end: usize) -> String {
    let mut out = String::with_capacity(line.len());
    out.push_str(&line[..start]);
    out.push(' ');
    out.push_str(&line[end..]);
    out.trim_matches(|c: char| c.is_whitespace() || "|,-()\u{2013}\u{2014}".contains(c))
        .to_string()
}

/// Splits a header line on pipes and spaced dashes, keeping hyphenated
/// words intact.
fn split_header(text: &str) -> Vec<String> {
    text.split(['|'])
        .flat_map(|part| part.split(" - "))
        .flat_map(|part| part.split(" \u{2013} "))
        .map(|part| part.trim_matches(|c: char| c.is_whitespace() || c == ','))
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

fn strip_bullet(line: &str) -> Option<String> {
    let first = line.chars().next()?;
    if BULLET_MARKERS.contains(&first) {
        return Some(line[first.len_utf8()..].trim().to_string());
    }
    // Numbered bullets: "1. shipped the thing"
    let mut chars = line.char_indices().skip_while(|(_, c)| c.is_ascii_digit());
    if let Some((idx, '.')) = chars.next() {
        if idx > 0 {
            return Some(line[idx + 1..].trim().to_string());
        }
    }
    None
}

fn flush_pending(entries: &mut [ExperienceEntry], pending: &mut Option<String>) {
    if let Some(text) = pending.take() {
        if let Some(entry) = entries.last_mut() {
            entry.description.push(text);
        }
    }
}

/// Removes duplicate entries that OCR or repeated headers can produce,
/// keyed on normalized (title, company, duration). First occurrence wins.
fn dedup(entries: Vec<ExperienceEntry>) -> Vec<ExperienceEntry> {
    let mut seen = HashSet::new();
    entries
        .into_iter()
        .filter(|e| {
            seen.insert((
                normalize(&e.title),
                normalize(&e.company),
                normalize(&e.duration),
            ))
        })
        .collect()
}

fn normalize(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    fn parse(raw: &[&str]) -> Vec<ExperienceEntry> {
        ExperienceParser::new().parse(&lines(raw), &Lexicon::default())
    }

    #[test]
    fn test_title_on_preceding_line() {
        let entries = parse(&[
            "Technical Lead",
            "Highbrow Technology Inc January 2025 - Present",
            "\u{2022} Led the platform migration",
        ]);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, "Technical Lead");
        assert!(entries[0].company.contains("Highbrow Technology Inc"));
        assert!(entries[0].duration.contains("January 2025 - Present"));
        assert_eq!(entries[0].description, vec!["Led the platform migration"]);
    }

    #[test]
    fn test_pipe_delimited_single_line() {
        let entries = parse(&["Software Engineer | Acme Corp | Jan 2020 - Dec 2021"]);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, "Software Engineer");
        assert_eq!(entries[0].company, "Acme Corp");
        assert_eq!(entries[0].duration, "Jan 2020 - Dec 2021");
    }

    #[test]
    fn test_company_from_following_line() {
        let entries = parse(&[
            "2019 - 2022",
            "Acme Corp",
            "\u{2022} Built things",
        ]);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].company, "Acme Corp");
        assert_eq!(entries[0].description, vec!["Built things"]);
    }

    #[test]
    fn test_trailing_location_split_off() {
        let entries = parse(&["Data Engineer | Initech | Bangalore | 03/2021 - 07/2023"]);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].location.as_deref(), Some("Bangalore"));
        assert_eq!(entries[0].company, "Initech");
    }

    #[test]
    fn test_multiple_entries_keep_document_order() {
        let entries = parse(&[
            "Senior Engineer",
            "Acme Corp June 2021 - Present",
            "\u{2022} Ran the on-call rotation",
            "Engineer",
            "Initech 2018 - 2021",
            "\u{2022} Shipped the parser",
        ]);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].title, "Senior Engineer");
        assert_eq!(entries[1].title, "Engineer");
        assert_eq!(entries[1].description, vec!["Shipped the parser"]);
    }

    #[test]
    fn test_duplicate_entries_collapse() {
        let entries = parse(&[
            "Engineer | Acme | 2019 - 2020",
            "Engineer | Acme | 2019 - 2020",
        ]);
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_to_joined_range() {
        let entries = parse(&["Analyst | Initech | March 2018 to May 2019"]);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].duration, "March 2018 to May 2019");
    }

    #[test]
    fn test_lines_without_dates_produce_no_entries() {
        let entries = parse(&["Worked on many things", "with many people"]);
        assert!(entries.is_empty());
    }
}
