//! # Content Clamping
//!
//! Tiles have a fixed footprint, so text that would overflow a variant's
//! content budget is shortened here instead of growing the tile. Budgets are
//! expressed in characters and lines; there is no font measurement in the
//! engine. Cuts land on UAX#14 break opportunities where possible and end
//! with an ellipsis.

use unicode_linebreak::{linebreaks, BreakOpportunity};

use crate::template::ContentBudget;

const ELLIPSIS: char = '\u{2026}';

/// Break opportunity *before* each char index. Index 0 is always `None`.
fn compute_break_opportunities(chars: &[char], text: &str) -> Vec<Option<BreakOpportunity>> {
    let mut result = vec![None; chars.len()];

    // linebreaks() reports byte offsets of the start of the next segment.
    let mut byte_to_char = vec![0usize; text.len() + 1];
    for (char_idx, (byte_idx, _)) in text.char_indices().enumerate() {
        byte_to_char[byte_idx] = char_idx;
    }
    byte_to_char[text.len()] = chars.len();

    for (byte_offset, opp) in linebreaks(text) {
        let char_idx = byte_to_char[byte_offset];
        if char_idx > 0 && char_idx < chars.len() {
            result[char_idx] = Some(opp);
        }
    }
    result
}

fn is_newline(ch: char) -> bool {
    matches!(ch, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

/// Greedily break `chars` into lines of at most `width` chars.
/// Returns (start, end) char ranges with newline chars excluded.
fn break_lines(chars: &[char], opps: &[Option<BreakOpportunity>], width: usize) -> Vec<(usize, usize)> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut last_break: Option<usize> = None;

    let mut i = 0;
    while i < chars.len() {
        if i > start {
            match opps[i] {
                Some(BreakOpportunity::Mandatory) => {
                    let mut end = i;
                    while end > start && is_newline(chars[end - 1]) {
                        end -= 1;
                    }
                    lines.push((start, end));
                    start = i;
                    last_break = None;
                }
                Some(BreakOpportunity::Allowed) => last_break = Some(i),
                None => {}
            }
        }

        if i - start >= width && !chars[i].is_whitespace() {
            let cut = match last_break {
                Some(b) if b > start => b,
                _ => i,
            };
            lines.push((start, cut));
            start = cut;
            last_break = None;
            i = cut.max(start);
            continue;
        }
        i += 1;
    }
    if start < chars.len() {
        let mut end = chars.len();
        while end > start && is_newline(chars[end - 1]) {
            end -= 1;
        }
        lines.push((start, end));
    }
    lines
}

fn trimmed(chars: &[char]) -> String {
    let s: String = chars.iter().collect();
    s.trim_end().to_string()
}

/// Shorten `text` to at most `max_chars` characters (ellipsis included).
pub fn clamp_chars(text: &str, max_chars: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_chars {
        return text.to_string();
    }
    if max_chars == 0 {
        return String::new();
    }

    let limit = max_chars - 1;
    let opps = compute_break_opportunities(&chars, text);
    let cut = (1..=limit).rev().find(|&i| opps[i].is_some()).unwrap_or(limit);

    let mut out = trimmed(&chars[..cut]);
    out.push(ELLIPSIS);
    out
}

/// Shorten `text` so it wraps into at most `max_lines` lines of
/// `chars_per_line` characters.
pub fn clamp_lines(text: &str, chars_per_line: usize, max_lines: usize) -> String {
    if max_lines == 0 || chars_per_line == 0 {
        return String::new();
    }
    let chars: Vec<char> = text.chars().collect();
    let opps = compute_break_opportunities(&chars, text);
    let lines = break_lines(&chars, &opps, chars_per_line);
    if lines.len() <= max_lines {
        return text.to_string();
    }

    let (last_start, last_end) = lines[max_lines - 1];
    let mut kept: Vec<String> = lines[..max_lines - 1]
        .iter()
        .map(|&(s, e)| trimmed(&chars[s..e]))
        .collect();

    let mut last: Vec<char> = trimmed(&chars[last_start..last_end]).chars().collect();
    while last.len() + 1 > chars_per_line && !last.is_empty() {
        last.pop();
    }
    let mut last: String = last.into_iter().collect::<String>().trim_end().to_string();
    last.push(ELLIPSIS);
    kept.push(last);
    kept.join("\n")
}

/// Item text after applying a variant's budget.
#[derive(Debug, Clone, PartialEq)]
pub struct ClampedText {
    pub name: String,
    pub description: Option<String>,
    /// Whether anything was shortened.
    pub truncated: bool,
}

/// Apply a content budget to an item's name and description.
pub fn apply_budget(name: &str, description: Option<&str>, budget: &ContentBudget) -> ClampedText {
    let clamped_name = match budget.max_name_chars {
        Some(max) => clamp_chars(name, max),
        None => name.to_string(),
    };

    let clamped_description = description.map(|d| match (budget.chars_per_line, budget.description_lines) {
        (Some(per_line), Some(lines)) => clamp_lines(d, per_line, lines),
        _ => d.to_string(),
    });

    let truncated = clamped_name != name || clamped_description.as_deref() != description;
    ClampedText {
        name: clamped_name,
        description: clamped_description.filter(|d| !d.is_empty()),
        truncated,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_chars_short_text_untouched() {
        assert_eq!(clamp_chars("Soup", 10), "Soup");
    }

    #[test]
    fn test_clamp_chars_cuts_at_word() {
        assert_eq!(clamp_chars("Grilled halloumi salad", 12), "Grilled\u{2026}");
    }

    #[test]
    fn test_clamp_chars_hard_cut_single_word() {
        assert_eq!(clamp_chars("Bouillabaisse", 6), "Bouil\u{2026}");
    }

    #[test]
    fn test_clamp_lines_fits() {
        assert_eq!(clamp_lines("Fresh tomato and basil", 12, 2), "Fresh tomato and basil");
    }

    #[test]
    fn test_clamp_lines_truncates() {
        let text = "Slow braised beef cheek with celeriac puree and red wine jus";
        let out = clamp_lines(text, 20, 2);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines.iter().all(|l| l.chars().count() <= 20));
        assert!(out.ends_with('\u{2026}'));
        assert!(out.starts_with("Slow braised beef"));
    }

    #[test]
    fn test_clamp_lines_respects_newlines() {
        let out = clamp_lines("one\ntwo\nthree", 40, 2);
        assert_eq!(out, "one\ntwo\u{2026}");
    }

    #[test]
    fn test_apply_budget_reports_truncation() {
        let budget = ContentBudget {
            max_name_chars: Some(8),
            ..Default::default()
        };
        let out = apply_budget("Margherita pizza", Some("Classic"), &budget);
        assert_eq!(out.name, "Margher\u{2026}");
        assert_eq!(out.description.as_deref(), Some("Classic"));
        assert!(out.truncated);

        let untouched = apply_budget("Tea", None, &ContentBudget::default());
        assert!(!untouched.truncated);
    }
}
