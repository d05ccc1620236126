//! Assembles the normalized résumé from segmented text. Append-only: the
//! builder only fills fields from what the parsers recovered, it never
//! deletes or rewrites text.

use crate::models::resume::NormalizedResume;
use crate::parsing::education::EducationParser;
use crate::parsing::experience::ExperienceParser;
use crate::parsing::fields::FieldExtractor;
use crate::parsing::lexicon::Lexicon;
use crate::parsing::projects::parse_projects;
use crate::parsing::sections::{segment, SectionKind};
use crate::parsing::skills::parse_skills;

pub struct ResumeBuilder {
    fields: FieldExtractor,
    experience: ExperienceParser,
    education: EducationParser,
}

impl ResumeBuilder {
    pub fn new() -> Self {
        Self {
            fields: FieldExtractor::new(),
            experience: ExperienceParser::new(),
            education: EducationParser::new(),
        }
    }

    /// Segments the repaired text and runs every parser over its bucket.
    /// Returns the entity plus human-readable warnings for sections that
    /// came back empty.
    pub fn build(&self, text: &str, lexicon: &Lexicon) -> (NormalizedResume, Vec<String>) {
        let sections = segment(text, lexicon);
        let contact = self.fields.extract(text, lexicon);

        let summary = join_prose(sections.lines(SectionKind::Summary));
        let experience = self
            .experience
            .parse(sections.lines(SectionKind::Experience), lexicon);
        let education = self
            .education
            .parse(sections.lines(SectionKind::Education), lexicon);
        let skills = parse_skills(sections.lines(SectionKind::Skills));
        let certifications = list_lines(sections.lines(SectionKind::Certifications));
        let projects = parse_projects(sections.lines(SectionKind::Projects));
        let unclassified = self.leftover_lines(sections.lines(SectionKind::Other), &contact);

        let resume = NormalizedResume {
            name: contact.name,
            email: contact.email,
            phone: contact.phone,
            location: contact.location,
            links: contact.links,
            professional_summary: summary,
            experience,
            education,
            skills,
            certifications,
            projects,
            unclassified_content: unclassified,
        };
        let warnings = coverage_warnings(&resume);
        (resume, warnings)
    }

    /// Pre-section lines that did not feed a contact field. Kept verbatim
    /// so nothing the candidate wrote is silently dropped.
    fn leftover_lines(
        &self,
        lines: &[String],
        contact: &crate::parsing::fields::ContactFields,
    ) -> Vec<String> {
        lines
            .iter()
            .filter(|line| {
                let line = line.trim();
                if let Some(name) = &contact.name {
                    if line == name {
                        return false;
                    }
                }
                if let Some(email) = &contact.email {
                    if line.contains(email.as_str()) {
                        return false;
                    }
                }
                if let Some(phone) = &contact.phone {
                    if line.contains(phone.as_str()) {
                        return false;
                    }
                }
                true
            })
            .map(|l| l.trim().to_string())
            .collect()
    }
}

impl Default for ResumeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Warnings for sections a caller would expect on a résumé but that came
/// back empty. Applied to every entity regardless of which strategy
/// produced it.
pub fn coverage_warnings(resume: &NormalizedResume) -> Vec<String> {
    let mut warnings = Vec::new();
    if resume.experience.is_empty() {
        warnings.push("no work experience entries were recovered".to_string());
    }
    if resume.education.is_empty() {
        warnings.push("no education entries were recovered".to_string());
    }
    warnings
}

fn join_prose(lines: &[String]) -> Option<String> {
    if lines.is_empty() {
        return None;
    }
    Some(
        lines
            .iter()
            .map(|l| l.trim())
            .filter(|l| !l.is_empty())
            .collect::<Vec<_>>()
            .join(" "),
    )
}

fn list_lines(lines: &[String]) -> Vec<String> {
    lines
        .iter()
        .map(|l| {
            l.trim_start_matches(['\u{2022}', '-', '*', '\u{25e6}'])
                .trim()
                .to_string()
        })
        .filter(|l| !l.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Vamshi Banoth
India banothvamshi13@gmail.com +91 6302061843 in/vamshi-banoth

SUMMARY
Backend engineer focused on distributed systems.

EXPERIENCE
Technical Lead
Highbrow Technology Inc January 2025 - Present
\u{2022} Led the ingestion platform rebuild

EDUCATION
Bachelor of Technology in Computer Science
National Institute of Technology, Warangal 2018 - 2022

SKILLS
Rust, Python, PostgreSQL

CERTIFICATIONS
\u{2022} AWS Solutions Architect Associate
";

    fn build(text: &str) -> (NormalizedResume, Vec<String>) {
        ResumeBuilder::new().build(text, &Lexicon::default())
    }

    #[test]
    fn test_full_document_assembly() {
        let (resume, warnings) = build(SAMPLE);
        assert_eq!(resume.name.as_deref(), Some("Vamshi Banoth"));
        assert_eq!(resume.email.as_deref(), Some("banothvamshi13@gmail.com"));
        assert_eq!(
            resume.links.linkedin.as_deref(),
            Some("https://linkedin.com/in/vamshi-banoth")
        );
        assert_eq!(resume.location.as_deref(), Some("India"));
        assert!(resume
            .professional_summary
            .as_deref()
            .unwrap()
            .contains("distributed systems"));
        assert_eq!(resume.experience.len(), 1);
        assert_eq!(resume.experience[0].title, "Technical Lead");
        assert_eq!(resume.education.len(), 1);
        assert_eq!(resume.skills, vec!["Rust", "Python", "PostgreSQL"]);
        assert_eq!(resume.certifications, vec!["AWS Solutions Architect Associate"]);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_contact_lines_not_duplicated_into_unclassified() {
        let (resume, _) = build(SAMPLE);
        assert!(resume.unclassified_content.is_empty());
    }

    #[test]
    fn test_empty_sections_warn() {
        let (resume, warnings) = build("Jane Doe\njane@example.com\nSKILLS\nRust");
        assert!(resume.experience.is_empty());
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("experience"));
        assert!(warnings[1].contains("education"));
    }

    #[test]
    fn test_builder_is_deterministic() {
        let (first, _) = build(SAMPLE);
        let (second, _) = build(SAMPLE);
        assert_eq!(first, second);
    }
}
