//! Transcript Cleaner
//!
//! Strips hesitation sounds, stutters and single-letter noise from raw
//! recognizer output before it is interpreted.

use super::text_normalizer::is_digit_token;
use lazy_static::lazy_static;
use regex::Regex;

/// Hesitations and non-speech markers the recognizer tends to emit.
/// "اه" and "أه" are answers at a checkbox, not hesitations.
const FILLERS: &[&str] = &["آ", "آآ", "امم", "مم", "ها", "ضحك", "كحة", "سعال", "إه"];

lazy_static! {
    static ref FILLER_RE: Regex = {
        let mut fillers = FILLERS.to_vec();
        fillers.sort_by_key(|f| std::cmp::Reverse(f.chars().count()));
        let alternation = fillers
            .iter()
            .map(|f| regex::escape(f))
            .collect::<Vec<_>>()
            .join("|");
        Regex::new(&format!(r"(?i)\b(?:{})\b", alternation)).expect("valid filler regex")
    };
}

/// Clean a raw transcript: drop fillers, collapse repeated words and drop
/// one-letter tokens that are not digits.
pub fn clean(raw: &str) -> String {
    if raw.trim().is_empty() {
        return String::new();
    }

    let without_fillers = FILLER_RE.replace_all(raw, " ");

    // noise is dropped before collapsing so "نعم و نعم" folds to one word
    let mut tokens: Vec<&str> = Vec::new();
    for token in without_fillers.split_whitespace() {
        if !is_digit_token(token) && token.chars().count() < 2 {
            continue;
        }
        if tokens.last() != Some(&token) {
            tokens.push(token);
        }
    }

    tokens.join(" ")
}
