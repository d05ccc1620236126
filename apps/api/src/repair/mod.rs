//! Text repair heuristics — undoes common extraction artifacts before the
//! text reaches any regex downstream.
//!
//! Some extraction layers emit every character separated by a space
//! ("S U M M A R Y", "I n d i a"). Each line is repaired independently:
//!
//! - Contact-carrier lines (an `@` or a `+digit` phone prefix) first get
//!   known location names isolated, even when spaced, so a spaced location
//!   is not fused into an adjacent token once spaces collapse.
//! - A line where more than half the tokens are one or two characters long
//!   is "fragmented".
//! - Fragmented lines with runs of two-or-more spaces collapse safely: a
//!   double space is a word boundary left behind by the renderer, single
//!   spaces inside a run are noise.
//! - Fragmented lines without that signal collapse only when entirely
//!   uppercase (a header); anything else is left untouched and deferred to
//!   the segmenter and field extractor, which tolerate residual spacing.
//!
//! Output has the same line count as the input; repair is a pure function.

use regex::Regex;

const FRAGMENT_RATIO: f64 = 0.5;

/// Compiled repair rules. Location names are injected, not hardcoded, so the
/// component stays independently testable.
pub struct TextRepair {
    /// (spaced-tolerant pattern, dense replacement) per known location.
    location_patterns: Vec<(Regex, String)>,
    /// Dense names, lowercased, used to keep multi-word locations intact
    /// through the collapse pass.
    location_names: Vec<String>,
    double_space: Regex,
}

impl TextRepair {
    pub fn new(location_names: &[&str]) -> Self {
        let location_patterns = location_names
            .iter()
            .filter_map(|name| {
                spaced_pattern(name)
                    .map(|re| (re, name.to_string()))
            })
            .collect();
        Self {
            location_patterns,
            location_names: location_names.iter().map(|n| n.to_lowercase()).collect(),
            double_space: Regex::new(r"[ \t]{2,}").expect("static regex"),
        }
    }

    /// Repairs a whole document line by line.
    pub fn repair(&self, text: &str) -> String {
        text.lines()
            .map(|line| self.repair_line(line))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn repair_line(&self, line: &str) -> String {
        let mut line = line.to_string();

        if is_contact_carrier(&line) {
            line = self.isolate_locations(&line);
        }

        if !is_fragmented(&line) {
            return line;
        }

        if self.double_space.is_match(&line) {
            return self.collapse_with_boundaries(&line);
        }

        // No boundary signal: collapsing could merge real words. Only an
        // all-uppercase line (a header) is safe to collapse blind.
        if is_entirely_uppercase(&line) {
            return line.split_whitespace().collect::<String>();
        }

        line
    }

    /// Rewrites a spaced location name ("I n d i a") to its dense form
    /// followed by an explicit double-space separator. Dense occurrences are
    /// left alone so clean lines pass through byte-identical.
    fn isolate_locations(&self, line: &str) -> String {
        let mut result = line.to_string();
        for (pattern, dense) in &self.location_patterns {
            if let Some(m) = pattern.find(&result) {
                if m.as_str().chars().any(|c| c.is_whitespace()) {
                    result = format!(
                        "{}{}  {}",
                        &result[..m.start()],
                        dense,
                        result[m.end()..].trim_start()
                    );
                }
            }
        }
        result
    }

    /// Double-or-more spaces are word boundaries; everything between them is
    /// one word with noise spaces removed.
    fn collapse_with_boundaries(&self, line: &str) -> String {
        self.double_space
            .split(line)
            .map(|chunk| {
                let normalized = chunk.split_whitespace().collect::<Vec<_>>().join(" ");
                // An isolated multi-word location keeps its internal space.
                if self.location_names.contains(&normalized.to_lowercase()) {
                    normalized
                } else {
                    chunk.split_whitespace().collect::<String>()
                }
            })
            .filter(|word| !word.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Ratio of tokens of length <= 2 to total tokens exceeds the threshold.
fn is_fragmented(line: &str) -> bool {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.is_empty() {
        return false;
    }
    let short = tokens.iter().filter(|t| t.chars().count() <= 2).count();
    short as f64 / tokens.len() as f64 > FRAGMENT_RATIO
}

fn is_contact_carrier(line: &str) -> bool {
    if line.contains('@') {
        return true;
    }
    line.as_bytes()
        .windows(2)
        .any(|w| w[0] == b'+' && w[1].is_ascii_digit())
}

fn is_entirely_uppercase(line: &str) -> bool {
    let mut has_alpha = false;
    for c in line.chars() {
        if c.is_alphabetic() {
            has_alpha = true;
            if !c.is_uppercase() {
                return false;
            }
        }
    }
    has_alpha
}

/// Builds a case-insensitive regex matching `name` with optional whitespace
/// between every letter.
fn spaced_pattern(name: &str) -> Option<Regex> {
    let mut pattern = String::from(r"(?i)\b");
    for (i, c) in name.chars().enumerate() {
        if c.is_whitespace() {
            pattern.push_str(r"\s+");
        } else {
            if i > 0 && !pattern.ends_with(r"\s+") {
                pattern.push_str(r"\s*");
            }
            pattern.push_str(&regex::escape(&c.to_string()));
        }
    }
    pattern.push_str(r"\b");
    Regex::new(&pattern).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repairer() -> TextRepair {
        TextRepair::new(&["India", "New York", "Berlin"])
    }

    #[test]
    fn test_spaced_header_collapses_without_boundary_signal() {
        assert_eq!(repairer().repair_line("S U M M A R Y"), "SUMMARY");
    }

    #[test]
    fn test_double_space_boundaries_restore_words() {
        let line = "S e n i o r  E n g i n e e r  A c m e";
        assert_eq!(repairer().repair_line(line), "Senior Engineer Acme");
    }

    #[test]
    fn test_mixed_case_fragment_without_signal_is_left_alone() {
        // Collapsing "w o r k e d o n j a v a" blind would merge words.
        let line = "w o r k e d o n j a v a";
        assert_eq!(repairer().repair_line(line), line);
    }

    #[test]
    fn test_clean_line_is_untouched() {
        let line = "Led migration of billing services to a new platform";
        assert_eq!(repairer().repair_line(line), line);
    }

    #[test]
    fn test_no_op_without_short_tokens() {
        // Property: zero single/double-character tokens means no repair.
        let text = "Professional Summary\nExperienced engineer building reliable systems\nSkills: Rust, Python, Kubernetes";
        assert_eq!(repairer().repair(text), text);
    }

    #[test]
    fn test_spaced_location_isolated_on_contact_line() {
        let line = "I n d i a  j a n e @ e x a m p l e . c o m";
        let repaired = repairer().repair_line(line);
        assert!(repaired.starts_with("India"), "got: {repaired}");
        assert!(!repaired.starts_with("Indiaj"), "location fused: {repaired}");
    }

    #[test]
    fn test_dense_location_on_contact_line_untouched() {
        let line = "India jane@example.com +91 6302061843";
        assert_eq!(repairer().repair_line(line), line);
    }

    #[test]
    fn test_line_count_is_preserved() {
        let text = "S U M M A R Y\n\nplain line\nA B C  D E F";
        let repaired = repairer().repair(text);
        assert_eq!(repaired.lines().count(), text.lines().count());
    }

    #[test]
    fn test_repair_is_pure() {
        let text = "S U M M A R Y\nplain line";
        assert_eq!(repairer().repair(text), repairer().repair(text));
    }

    #[test]
    fn test_multi_word_location_spaced() {
        let line = "N e w  Y o r k  j d o e @ m a i l . c o m";
        let repaired = repairer().repair_line(line);
        assert!(repaired.starts_with("New York"), "got: {repaired}");
    }
}
