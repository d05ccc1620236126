//! Quality gate — scores extracted text for corruption before it is trusted
//! downstream.
//!
//! Two independent heuristics are combined:
//!
//! 1. Line repetition: a line whose most frequent alphanumeric character
//!    carries more than `line_repetition_share` of the line's alphanumeric
//!    characters is corrupted; the document is rejected when the fraction of
//!    corrupted lines exceeds `corrupted_line_fraction`.
//! 2. Token fragmentation: reject when the ratio of single-character tokens
//!    is high AND the absolute count clears a floor, so résumés that
//!    legitimately carry many short tokens (initials, bullet markers) are
//!    not false-rejected.
//!
//! The gate is a pure function of its input and is applied both to freshly
//! extracted text and to anything returned from a result cache.

use std::collections::HashMap;

/// Gate thresholds, injected rather than hardcoded so call sites share one
/// deliberate policy.
#[derive(Debug, Clone, Copy)]
pub struct QualityThresholds {
    /// Max share of a line's alphanumeric chars one character may carry.
    pub line_repetition_share: f64,
    /// Max fraction of corrupted lines across the document.
    pub corrupted_line_fraction: f64,
    /// Single-character token ratio above which fragmentation is suspected.
    pub single_char_token_ratio: f64,
    /// Absolute single-character token count required to confirm it.
    pub single_char_token_floor: usize,
    /// Minimum character count for any text to be usable at all.
    pub min_text_len: usize,
}

impl Default for QualityThresholds {
    fn default() -> Self {
        // The strict variant: shipping corrupted text downstream costs more
        // than one extra OCR pass.
        Self {
            line_repetition_share: 0.7,
            corrupted_line_fraction: 0.3,
            single_char_token_ratio: 0.55,
            single_char_token_floor: 200,
            min_text_len: 50,
        }
    }
}

/// Outcome of a gate assessment.
#[derive(Debug, Clone, PartialEq)]
pub struct Assessment {
    pub accept: bool,
    /// Present only on rejection.
    pub reason: Option<String>,
}

impl Assessment {
    fn accepted() -> Self {
        Self { accept: true, reason: None }
    }

    fn rejected(reason: String) -> Self {
        Self { accept: false, reason: Some(reason) }
    }
}

/// Assesses extracted text against the gate. Pure; holds no state.
pub fn assess(text: &str, thresholds: &QualityThresholds) -> Assessment {
    let trimmed = text.trim();
    if trimmed.len() < thresholds.min_text_len {
        return Assessment::rejected(format!(
            "text too short ({} chars, floor {})",
            trimmed.len(),
            thresholds.min_text_len
        ));
    }

    let lines: Vec<&str> = trimmed.lines().filter(|l| !l.trim().is_empty()).collect();
    if !lines.is_empty() {
        let corrupted = lines
            .iter()
            .filter(|line| line_repetition_share(line) > thresholds.line_repetition_share)
            .count();
        let fraction = corrupted as f64 / lines.len() as f64;
        if fraction > thresholds.corrupted_line_fraction {
            return Assessment::rejected(format!(
                "{corrupted}/{} lines dominated by a repeated character",
                lines.len()
            ));
        }
    }

    let tokens: Vec<&str> = trimmed.split_whitespace().collect();
    if !tokens.is_empty() {
        let single = tokens.iter().filter(|t| t.chars().count() == 1).count();
        let ratio = single as f64 / tokens.len() as f64;
        if ratio > thresholds.single_char_token_ratio && single > thresholds.single_char_token_floor
        {
            return Assessment::rejected(format!(
                "{single} single-character tokens out of {} (ratio {ratio:.2})",
                tokens.len()
            ));
        }
    }

    Assessment::accepted()
}

/// Share of a line's alphanumeric characters carried by its most frequent
/// alphanumeric character. Lines without alphanumerics score 0.
pub fn line_repetition_share(line: &str) -> f64 {
    let mut counts: HashMap<char, usize> = HashMap::new();
    let mut total = 0usize;
    for c in line.chars().filter(|c| c.is_alphanumeric()) {
        *counts.entry(c.to_ascii_lowercase()).or_insert(0) += 1;
        total += 1;
    }
    if total == 0 {
        return 0.0;
    }
    let max = counts.values().copied().max().unwrap_or(0);
    max as f64 / total as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate(text: &str) -> Assessment {
        assess(text, &QualityThresholds::default())
    }

    const CLEAN_RESUME: &str = "Jane Doe\nSoftware Engineer with 8 years of experience.\n\
        EXPERIENCE\nSenior Engineer at Acme Corp, 2019 - Present\n\
        - Led migration of billing services to Rust\n\
        - Reduced p99 latency by 40%";

    #[test]
    fn test_clean_text_accepted() {
        assert!(gate(CLEAN_RESUME).accept);
    }

    #[test]
    fn test_short_text_rejected() {
        let a = gate("Jane Doe");
        assert!(!a.accept);
        assert!(a.reason.unwrap().contains("too short"));
    }

    #[test]
    fn test_repeated_character_noise_rejected() {
        // Every line dominated by one character, as seen in broken decoders.
        let noise = "aaaaaaaaaaaaaaaaaaaaaaaa\n\
                     bbbbbbbbbbbbbbbbbbbbbbbb\n\
                     cccccccccccccccccccccccc";
        let a = gate(noise);
        assert!(!a.accept);
        assert!(a.reason.unwrap().contains("repeated character"));
    }

    #[test]
    fn test_minority_of_corrupted_lines_accepted() {
        // One bad line out of four stays under the 0.3 document fraction.
        let text = "Jane Doe, Senior Software Engineer in Berlin\n\
                    Led the platform team through a multi-year rewrite effort\n\
                    xxxxxxxxxxxxxxxxxxxxxxxxxxxx\n\
                    Shipped twelve releases with zero rollbacks last year";
        assert!(gate(text).accept);
    }

    #[test]
    fn test_fragmented_text_rejected() {
        // >55% single-char tokens and more than 200 of them.
        let mut fragmented = String::new();
        for _ in 0..120 {
            fragmented.push_str("a b c d e f g h i j resume\n");
        }
        let a = gate(&fragmented);
        assert!(!a.accept);
        assert!(a.reason.unwrap().contains("single-character"));
    }

    #[test]
    fn test_few_single_char_tokens_accepted() {
        // High ratio but small absolute count: below the 200 floor, so the
        // initials-heavy short résumé is not false-rejected.
        let text = "J D | A B C Inc | N Y C\n\
                    worked across many products and platforms over the years";
        assert!(gate(text).accept);
    }

    #[test]
    fn test_line_repetition_share_uniform_line() {
        assert!((line_repetition_share("abcd") - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn test_line_repetition_share_empty_line() {
        assert_eq!(line_repetition_share("--- ... ---"), 0.0);
    }

    #[test]
    fn test_monotonic_in_repetition_ratio() {
        // Raising the dominant character's share never flips a rejected
        // document back to accepted.
        let make = |dominant: usize| {
            let line: String =
                "x".repeat(dominant) + &"abcdefghij".chars().collect::<String>();
            format!("{line}\n").repeat(10)
        };
        let mut previously_rejected = false;
        for dominant in [10usize, 30, 60, 120, 300] {
            let accepted = gate(&make(dominant)).accept;
            if previously_rejected {
                assert!(!accepted, "dominant={dominant} flipped back to accepted");
            }
            if !accepted {
                previously_rejected = true;
            }
        }
        assert!(previously_rejected);
    }

    #[test]
    fn test_assess_is_pure() {
        let first = gate(CLEAN_RESUME);
        let second = gate(CLEAN_RESUME);
        assert_eq!(first, second);
    }
}
