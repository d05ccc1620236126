//! Canonical structured résumé entity produced by the ingestion pipeline.
//!
//! Every scalar field is either empty/absent or derived verbatim from text
//! extracted out of the uploaded bytes. Nothing is synthesized. The entity is
//! built once per request and never mutated after the builder finishes.

use serde::{Deserialize, Serialize};

/// Optional outbound links found in the contact block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumeLinks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

impl ResumeLinks {
    pub fn is_empty(&self) -> bool {
        self.linkedin.is_none() && self.github.is_none() && self.website.is_none()
    }
}

/// One work-history entry. `description` holds bullet lines in document order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperienceEntry {
    pub title: String,
    pub company: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub duration: String,
    #[serde(default)]
    pub description: Vec<String>,
}

/// One education entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EducationEntry {
    pub institution: String,
    pub degree: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graduation_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gpa: Option<String>,
    #[serde(default)]
    pub details: Vec<String>,
}

/// One project entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectEntry {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub technologies: Vec<String>,
}

/// The normalized résumé — independent of the source document format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedResume {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub links: ResumeLinks,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub professional_summary: Option<String>,
    #[serde(default)]
    pub experience: Vec<ExperienceEntry>,
    #[serde(default)]
    pub education: Vec<EducationEntry>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub certifications: Vec<String>,
    #[serde(default)]
    pub projects: Vec<ProjectEntry>,
    /// Leftover text not attributed to any known section. Kept so no input
    /// line is silently dropped.
    #[serde(default)]
    pub unclassified_content: Vec<String>,
}

impl NormalizedResume {
    /// True when nothing at all was recovered — used to reject empty vision
    /// output instead of returning a silently blank success.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.location.is_none()
            && self.links.is_empty()
            && self.professional_summary.is_none()
            && self.experience.is_empty()
            && self.education.is_empty()
            && self.skills.is_empty()
            && self.certifications.is_empty()
            && self.projects.is_empty()
            && self.unclassified_content.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_resume_is_empty() {
        assert!(NormalizedResume::default().is_empty());
    }

    #[test]
    fn test_resume_with_email_is_not_empty() {
        let resume = NormalizedResume {
            email: Some("a@b.com".to_string()),
            ..Default::default()
        };
        assert!(!resume.is_empty());
    }

    #[test]
    fn test_resume_deserializes_from_partial_json() {
        // The vision strategy may omit any field; all are defaulted.
        let json = r#"{
            "name": "Jane Doe",
            "skills": ["Rust", "SQL"],
            "experience": [{
                "title": "Engineer",
                "company": "Acme",
                "duration": "2020 - Present",
                "description": ["Built things"]
            }]
        }"#;
        let resume: NormalizedResume = serde_json::from_str(json).unwrap();
        assert_eq!(resume.name.as_deref(), Some("Jane Doe"));
        assert_eq!(resume.skills.len(), 2);
        assert_eq!(resume.experience[0].company, "Acme");
        assert!(resume.links.is_empty());
        assert!(resume.education.is_empty());
    }

    #[test]
    fn test_serialization_skips_absent_scalars() {
        let resume = NormalizedResume {
            name: Some("Jane Doe".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_string(&resume).unwrap();
        assert!(json.contains("\"name\""));
        assert!(!json.contains("\"email\""));
        assert!(!json.contains("\"phone\""));
    }
}
