//! Renders a normalized résumé back into canonical plain text. Used for
//! downstream consumers that want a stable text rendition regardless of
//! which extraction strategy produced the entity.

use crate::models::resume::NormalizedResume;

/// Canonical section order: contact header first, unclassified content
/// always last so recovered-but-unplaced text never interleaves.
pub fn format_resume(resume: &NormalizedResume) -> String {
    let mut out = String::new();

    if let Some(name) = &resume.name {
        push_line(&mut out, name);
    }
    let mut contact: Vec<&str> = Vec::new();
    if let Some(v) = &resume.location {
        contact.push(v);
    }
    if let Some(v) = &resume.email {
        contact.push(v);
    }
    if let Some(v) = &resume.phone {
        contact.push(v);
    }
    if let Some(v) = &resume.links.linkedin {
        contact.push(v);
    }
    if let Some(v) = &resume.links.github {
        contact.push(v);
    }
    if let Some(v) = &resume.links.website {
        contact.push(v);
    }
    if !contact.is_empty() {
        push_line(&mut out, &contact.join(" | "));
    }

    if let Some(summary) = &resume.professional_summary {
        section(&mut out, "SUMMARY");
        push_line(&mut out, summary);
    }

    if !resume.experience.is_empty() {
        section(&mut out, "EXPERIENCE");
        for entry in &resume.experience {
            let mut header = entry.title.clone();
            if !entry.company.is_empty() {
                if !header.is_empty() {
                    header.push_str(" | ");
                }
                header.push_str(&entry.company);
            }
            if let Some(location) = &entry.location {
                header.push_str(" | ");
                header.push_str(location);
            }
            if !entry.duration.is_empty() {
                header.push_str(" | ");
                header.push_str(&entry.duration);
            }
            push_line(&mut out, header.trim_start_matches(" | "));
            for bullet in &entry.description {
                push_line(&mut out, &format!("\u{2022} {bullet}"));
            }
        }
    }

    if !resume.education.is_empty() {
        section(&mut out, "EDUCATION");
        for entry in &resume.education {
            let mut header = entry.degree.clone();
            if let Some(field) = &entry.field {
                if !header.is_empty() {
                    header.push_str(" in ");
                }
                header.push_str(field);
            }
            if !entry.institution.is_empty() {
                if !header.is_empty() {
                    header.push_str(" | ");
                }
                header.push_str(&entry.institution);
            }
            if let Some(date) = &entry.graduation_date {
                header.push_str(" | ");
                header.push_str(date);
            }
            if let Some(gpa) = &entry.gpa {
                header.push_str(" | GPA ");
                header.push_str(gpa);
            }
            push_line(&mut out, &header);
            for detail in &entry.details {
                push_line(&mut out, &format!("\u{2022} {detail}"));
            }
        }
    }

    if !resume.skills.is_empty() {
        section(&mut out, "SKILLS");
        push_line(&mut out, &resume.skills.join(", "));
    }

    if !resume.certifications.is_empty() {
        section(&mut out, "CERTIFICATIONS");
        for cert in &resume.certifications {
            push_line(&mut out, &format!("\u{2022} {cert}"));
        }
    }

    if !resume.projects.is_empty() {
        section(&mut out, "PROJECTS");
        for project in &resume.projects {
            push_line(&mut out, &project.name);
            if !project.description.is_empty() {
                push_line(&mut out, &format!("\u{2022} {}", project.description));
            }
            if !project.technologies.is_empty() {
                push_line(
                    &mut out,
                    &format!("Technologies: {}", project.technologies.join(", ")),
                );
            }
        }
    }

    if !resume.unclassified_content.is_empty() {
        section(&mut out, "ADDITIONAL");
        for line in &resume.unclassified_content {
            push_line(&mut out, line);
        }
    }

    out.trim_end().to_string()
}

fn section(out: &mut String, title: &str) {
    if !out.is_empty() {
        out.push('\n');
    }
    push_line(out, title);
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(line);
    out.push('\n');
}
