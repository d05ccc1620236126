//! Education parsing, keyed on degree and institution keyword lines.

use regex::Regex;

use crate::models::resume::EducationEntry;
use crate::parsing::lexicon::Lexicon;

pub struct EducationParser {
    year: Regex,
    gpa: Regex,
}

impl EducationParser {
    pub fn new() -> Self {
        Self {
            year: Regex::new(r"\b(19|20)\d{2}\b").expect("static regex"),
            gpa: Regex::new(r"(?i)\b(?:gpa|cgpa)\s*:?\s*([0-9]\.[0-9]{1,2})(?:\s*/\s*(?:4|5|10)(?:\.0)?)?").expect("static regex"),
        }
    }

    /// A line containing a degree keyword opens an entry (and may carry the
    /// field of study after "in"/"of"); an institution keyword line fills
    /// the school. Years and GPA tokens attach to the open entry, anything
    /// else lands in details.
    pub fn parse(&self, lines: &[String], lexicon: &Lexicon) -> Vec<EducationEntry> {
        let mut entries: Vec<EducationEntry> = Vec::new();

        for raw in lines {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            let lower = line.to_lowercase();
            let has_degree = lexicon.degree_keywords.iter().any(|k| lower.contains(k));
            let has_institution = lexicon.institution_keywords.iter().any(|k| lower.contains(k));

            if has_degree {
                let mut entry = EducationEntry {
                    institution: String::new(),
                    degree: line.to_string(),
                    field: None,
                    graduation_date: None,
                    gpa: None,
                    details: Vec::new(),
                };
                if let Some((degree, field)) = split_field(line) {
                    entry.degree = degree;
                    entry.field = Some(field);
                }
                self.absorb_tokens(&mut entry, line);
                // "B.Tech, IIT Bombay" style lines carry both.
                if has_institution {
                    if let Some(inst) = institution_segment(line, lexicon) {
                        entry.institution = inst;
                    }
                }
                entries.push(entry);
                continue;
            }

            if has_institution {
                match entries.last_mut().filter(|e| e.institution.is_empty()) {
                    Some(entry) => {
                        entry.institution = line.to_string();
                        self.absorb_tokens(entry, line);
                        strip_year_suffix(&mut entry.institution, &self.year);
                    }
                    None => {
                        let mut entry = EducationEntry {
                            institution: line.to_string(),
                            degree: String::new(),
                            field: None,
                            graduation_date: None,
                            gpa: None,
                            details: Vec::new(),
                        };
                        self.absorb_tokens(&mut entry, line);
                        strip_year_suffix(&mut entry.institution, &self.year);
                        entries.push(entry);
                    }
                }
                continue;
            }

            if let Some(entry) = entries.last_mut() {
                let before = (entry.graduation_date.clone(), entry.gpa.clone());
                self.absorb_tokens(entry, line);
                // Lines that contributed nothing but prose become details.
                if (entry.graduation_date.clone(), entry.gpa.clone()) == before {
                    entry.details.push(line.to_string());
                }
            }
        }
        entries
    }

    fn absorb_tokens(&self, entry: &mut EducationEntry, line: &str) {
        if entry.graduation_date.is_none() {
            // Last year on the line: ranges like "2018 - 2022" end with
            // the graduation year.
            if let Some(m) = self.year.find_iter(line).last() {
                entry.graduation_date = Some(m.as_str().to_string());
            }
        }
        if entry.gpa.is_none() {
            if let Some(c) = self.gpa.captures(line) {
                entry.gpa = Some(c[1].to_string());
            }
        }
    }
}

impl Default for EducationParser {
    fn default() -> Self {
        Self::new()
    }
}

/// "Bachelor of Technology in Computer Science" → degree + field.
fn split_field(line: &str) -> Option<(String, String)> {
    let lower = line.to_lowercase();
    let idx = lower.find(" in ")?;
    let degree = line[..idx].trim().trim_end_matches(',').to_string();
    let field = line[idx + 4..]
        .split(['|', ','])
        .next()
        .unwrap_or("")
        .trim()
        .to_string();
    if field.is_empty() {
        return None;
    }
    Some((degree, field))
}

/// Picks the delimiter-separated segment holding the institution keyword.
fn institution_segment(line: &str, lexicon: &Lexicon) -> Option<String> {
    line.split(['|', ','])
        .map(str::trim)
        .find(|seg| {
            let lower = seg.to_lowercase();
            lexicon.institution_keywords.iter().any(|k| lower.contains(k))
        })
        .map(str::to_string)
}

fn strip_year_suffix(text: &mut String, year: &Regex) {
    if let Some(m) = year.find(text) {
        let head = text[..m.start()]
            .trim_end_matches(|c: char| c.is_whitespace() || "|,-()\u{2013}".contains(c))
            .to_string();
        if !head.is_empty() {
            *text = head;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &[&str]) -> Vec<EducationEntry> {
        let lines: Vec<String> = raw.iter().map(|s| s.to_string()).collect();
        EducationParser::new().parse(&lines, &Lexicon::default())
    }

    #[test]
    fn test_degree_then_institution() {
        let entries = parse(&[
            "Bachelor of Technology in Computer Science",
            "National Institute of Technology, Warangal 2018 - 2022",
        ]);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].degree, "Bachelor of Technology");
        assert_eq!(entries[0].field.as_deref(), Some("Computer Science"));
        assert!(entries[0].institution.contains("National Institute of Technology"));
        assert_eq!(entries[0].graduation_date.as_deref(), Some("2022"));
    }

    #[test]
    fn test_gpa_token_attaches() {
        let entries = parse(&[
            "B.Sc in Physics",
            "Some University",
            "GPA: 3.85/4.0",
        ]);
        assert_eq!(entries[0].gpa.as_deref(), Some("3.85"));
        assert!(entries[0].details.is_empty());
    }

    #[test]
    fn test_institution_only_entry() {
        let entries = parse(&["Stanford University 2015"]);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].institution, "Stanford University");
        assert_eq!(entries[0].graduation_date.as_deref(), Some("2015"));
        assert!(entries[0].degree.is_empty());
    }

    #[test]
    fn test_unmatched_lines_become_details() {
        let entries = parse(&[
            "Master of Science in Data Engineering",
            "Thesis on stream processing",
        ]);
        assert_eq!(entries[0].details, vec!["Thesis on stream processing"]);
    }

    #[test]
    fn test_combined_degree_and_institution_line() {
        let entries = parse(&["B.Tech in Electronics, IIT Bombay, 2019"]);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].field.as_deref(), Some("Electronics"));
        assert!(entries[0].institution.contains("IIT"));
        assert_eq!(entries[0].graduation_date.as_deref(), Some("2019"));
    }

    #[test]
    fn test_no_keywords_no_entries() {
        assert!(parse(&["Relevant coursework only"]).is_empty());
    }
}
