//! Skills tokenization.

/// Splits skill lines on the separators résumés actually use: commas,
/// semicolons, pipes, bullets, and double-space runs. Category labels
/// ("Languages:") are dropped but their payload survives.
pub fn parse_skills(lines: &[String]) -> Vec<String> {
    let mut skills = Vec::new();
    for raw in lines {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        // "Databases:" with nothing after it is a pure category label.
        let payload = match line.split_once(':') {
            Some((label, rest)) if label.split_whitespace().count() <= 3 => rest,
            _ => line,
        };
        for chunk in split_tokens(payload) {
            let token = chunk
                .trim_matches(|c: char| c.is_whitespace() || "\u{2022}\u{25e6}\u{00b7}*-".contains(c));
            if (2..=40).contains(&token.len()) && !skills.iter().any(|s: &String| s == token) {
                skills.push(token.to_string());
            }
        }
    }
    skills
}

fn split_tokens(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    for part in text.split([',', ';', '|', '\u{2022}', '\u{00b7}']) {
        // Double-space runs separate columns in flattened table layouts.
        let mut rest = part;
        while let Some(idx) = rest.find("  ") {
            out.push(&rest[..idx]);
            rest = rest[idx..].trim_start();
        }
        out.push(rest);
    }
    out
}
