//! Utterance segmentation
//!
//! Splits a cleaned utterance into field content and "advance" markers.
//! Saying "انتهى" (or a spelling variant) closes the current field.

use lazy_static::lazy_static;
use regex::Regex;

/// Spellings of "done" the recognizer produces for the separator keyword
pub const SEPARATOR_VARIANTS: &[&str] = &["انتهى", "انتهي", "انتهت", "انتها", "إنتهى", "إنتهي"];

/// Whole-utterance commands that move to the next field
pub const ADVANCE_COMMANDS: &[&str] = &[
    "انتهى", "انتهي", "انتهت", "انتها", "إنتهى", "إنتهي", "خلص", "تم", "التالي", "كمل",
];

lazy_static! {
    static ref SEPARATOR_RE: Regex = Regex::new(&format!(
        "(?i)(?:{})",
        SEPARATOR_VARIANTS
            .iter()
            .map(|v| regex::escape(v))
            .collect::<Vec<_>>()
            .join("|")
    ))
    .expect("valid separator regex");
}

/// A piece of a segmented utterance
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Text for the field under the cursor
    Content(String),
    /// Move the cursor to the next field
    Advance,
}

/// Split `text` on separator keywords, keeping order. Every separator yields
/// its own `Advance`, so "انتهى انتهى" skips two fields.
pub fn segment(text: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut last = 0;

    for m in SEPARATOR_RE.find_iter(text) {
        push_content(&mut segments, &text[last..m.start()]);
        segments.push(Segment::Advance);
        last = m.end();
    }
    push_content(&mut segments, &text[last..]);

    segments
}

fn push_content(segments: &mut Vec<Segment>, span: &str) {
    let span = span.trim();
    if !span.is_empty() {
        segments.push(Segment::Content(span.to_string()));
    }
}

/// Whether the whole utterance is an advance command
pub fn is_advance_command(text: &str) -> bool {
    let text = text.trim();
    ADVANCE_COMMANDS.iter().any(|c| *c == text)
}

/// If `text` ends with an advance command as a separate word, return the text
/// before it.
pub fn strip_advance_suffix(text: &str) -> Option<&str> {
    let text = text.trim();
    let (head, last) = text.rsplit_once(char::is_whitespace)?;
    if ADVANCE_COMMANDS.contains(&last) {
        Some(head.trim_end())
    } else {
        None
    }
}

/// Turn a cleaned final utterance into the tokens applied at the cursor.
/// A lone command advances once; a trailing command word advances once
/// after whatever precedes it; otherwise the text is segmented as is.
pub fn interpret(clean: &str) -> Vec<Segment> {
    if is_advance_command(clean) {
        return vec![Segment::Advance];
    }

    match strip_advance_suffix(clean) {
        Some(head) => {
            let mut segments = segment(head);
            segments.push(Segment::Advance);
            segments
        }
        None => segment(clean),
    }
}
