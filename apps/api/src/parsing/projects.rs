//! Project section parsing.

use crate::models::resume::ProjectEntry;

const MAX_NAME_LEN: usize = 60;

/// Two-state walk: a short non-bullet line opens a project and names it, a
/// "Technologies:"/"Stack:" labeled line fills the tech list, everything
/// else extends the open project's description.
pub fn parse_projects(lines: &[String]) -> Vec<ProjectEntry> {
    let mut projects: Vec<ProjectEntry> = Vec::new();

    for raw in lines {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(tech) = tech_payload(line) {
            if let Some(project) = projects.last_mut() {
                project.technologies.extend(
                    tech.split([',', '|', '/'])
                        .map(str::trim)
                        .filter(|t| !t.is_empty())
                        .map(str::to_string),
                );
            }
            continue;
        }

        let bullet = line.starts_with(['\u{2022}', '-', '*', '\u{25e6}']);
        if !bullet && line.len() <= MAX_NAME_LEN {
            // Name lines sometimes carry a trailing dash description:
            // "Crawler - distributed fetch scheduler".
            let (name, desc) = match line.split_once(" - ") {
                Some((n, d)) => (n.trim().to_string(), d.trim().to_string()),
                None => (line.to_string(), String::new()),
            };
            projects.push(ProjectEntry {
                name,
                description: desc,
                technologies: Vec::new(),
            });
            continue;
        }

        if let Some(project) = projects.last_mut() {
            let text = line.trim_start_matches(['\u{2022}', '-', '*', '\u{25e6}']).trim_start();
            if project.description.is_empty() {
                project.description = text.to_string();
            } else {
                project.description.push(' ');
                project.description.push_str(text);
            }
        }
    }
    projects
}

/// Returns the payload of a technologies label line, if it is one.
fn tech_payload(line: &str) -> Option<&str> {
    let (label, rest) = line
        .trim_start_matches(['\u{2022}', '-', '*'])
        .trim_start()
        .split_once(':')?;
    let lower = label.to_lowercase();
    if lower.contains("technolog") || lower.contains("stack") || lower.contains("built with") {
        Some(rest.trim())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &[&str]) -> Vec<ProjectEntry> {
        parse_projects(&raw.iter().map(|s| s.to_string()).collect::<Vec<_>>())
    }

    #[test]
    fn test_name_bullets_and_tech_line() {
        let projects = parse(&[
            "Resume Pipeline",
            "\u{2022} Parses uploaded documents into structured records",
            "Technologies: Rust, Axum, Tokio",
        ]);
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].name, "Resume Pipeline");
        assert!(projects[0].description.contains("structured records"));
        assert_eq!(projects[0].technologies, vec!["Rust", "Axum", "Tokio"]);
    }

    #[test]
    fn test_inline_dash_description() {
        let projects = parse(&["Crawler - distributed fetch scheduler"]);
        assert_eq!(projects[0].name, "Crawler");
        assert_eq!(projects[0].description, "distributed fetch scheduler");
    }

    #[test]
    fn test_multiple_projects() {
        let projects = parse(&[
            "Alpha",
            "\u{2022} first thing",
            "Beta",
            "\u{2022} second thing",
            "Stack: Go",
        ]);
        assert_eq!(projects.len(), 2);
        assert_eq!(projects[1].name, "Beta");
        assert_eq!(projects[1].technologies, vec!["Go"]);
    }

    #[test]
    fn test_long_lines_extend_description() {
        let projects = parse(&[
            "Gamma",
            "A long free-form paragraph describing what the project does and why it exists at all",
        ]);
        assert_eq!(projects.len(), 1);
        assert!(projects[0].description.starts_with("A long free-form"));
    }

    #[test]
    fn test_tech_line_without_project_is_ignored() {
        assert!(parse(&["Technologies: Rust"]).is_empty());
    }
}
