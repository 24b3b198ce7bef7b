//! Text Normalization
//!
//! Digit and spoken-number normalization for recognized Arabic speech.

use lazy_static::lazy_static;

/// Spoken number words and phrases, including Levantine/Gulf dialect forms
const NUMBER_WORDS: &[(&str, u32)] = &[
    ("واحد", 1),
    ("اثنين", 2),
    ("اثنان", 2),
    ("ثلاثة", 3),
    ("ثلاث", 3),
    ("اربعة", 4),
    ("أربعة", 4),
    ("اربع", 4),
    ("أربع", 4),
    ("خمسة", 5),
    ("خمس", 5),
    ("ستة", 6),
    ("ست", 6),
    ("سبعة", 7),
    ("سبع", 7),
    ("ثمانية", 8),
    ("ثماني", 8),
    ("ثمان", 8),
    ("تسعة", 9),
    ("تسع", 9),
    ("عشرة", 10),
    ("عشر", 10),
    ("احدعش", 11),
    ("إحدعش", 11),
    ("حداشر", 11),
    ("احد عشر", 11),
    ("أحد عشر", 11),
    ("اثنعش", 12),
    ("إثنعش", 12),
    ("اطنعش", 12),
    ("اثنا عشر", 12),
    ("إثنا عشر", 12),
    ("اتناشر", 12),
    ("ثلاثطعش", 13),
    ("ثلتطعش", 13),
    ("ثلاث عشر", 13),
    ("ثلاثة عشر", 13),
    ("تلتاشر", 13),
    ("اربعطعش", 14),
    ("أربعطعش", 14),
    ("اربع عشر", 14),
    ("أربعة عشر", 14),
    ("اربعتاشر", 14),
    ("خمسطعش", 15),
    ("خمستاشر", 15),
    ("خمس عشر", 15),
    ("خمسة عشر", 15),
    ("ستطعش", 16),
    ("سطعش", 16),
    ("ست عشر", 16),
    ("ستة عشر", 16),
    ("ستاشر", 16),
    ("سبعطعش", 17),
    ("سبعتاشر", 17),
    ("سبع عشر", 17),
    ("سبعة عشر", 17),
    ("ثمنطعش", 18),
    ("تمنطعش", 18),
    ("ثمانية عشر", 18),
    ("تمنتاشر", 18),
    ("ثماني عشر", 18),
    ("تسعطعش", 19),
    ("تسعتاشر", 19),
    ("تسع عشر", 19),
    ("تسعة عشر", 19),
    ("عشرين", 20),
    ("واحد وعشرين", 21),
    ("اثنين وعشرين", 22),
    ("ثلاثة وعشرين", 23),
    ("اربعة وعشرين", 24),
    ("أربعة وعشرين", 24),
    ("خمسة وعشرين", 25),
    ("ستة وعشرين", 26),
    ("سبعة وعشرين", 27),
    ("ثمانية وعشرين", 28),
    ("تسعة وعشرين", 29),
    ("ثلاثين", 30),
    ("واحد وثلاثين", 31),
];

lazy_static! {
    /// Number words ordered longest phrase first, so "خمسة عشر" wins over "خمسة"
    static ref SORTED_NUMBER_WORDS: Vec<(&'static str, u32)> = {
        let mut words = NUMBER_WORDS.to_vec();
        words.sort_by_key(|(word, _)| std::cmp::Reverse(word.chars().count()));
        words
    };
}

/// Number word table, longest phrase first
pub fn number_words() -> &'static [(&'static str, u32)] {
    &SORTED_NUMBER_WORDS
}

/// Map an Arabic-Indic (or Persian) digit to its ASCII counterpart
fn ascii_digit(c: char) -> Option<char> {
    match c {
        '\u{0660}'..='\u{0669}' => char::from_u32(c as u32 - 0x0660 + '0' as u32),
        '\u{06F0}'..='\u{06F9}' => char::from_u32(c as u32 - 0x06F0 + '0' as u32),
        _ => None,
    }
}

/// True for ASCII, Arabic-Indic and Persian digits
pub fn is_digit_char(c: char) -> bool {
    c.is_ascii_digit() || ascii_digit(c).is_some()
}

/// True if `token` is non-empty and made only of digits
pub fn is_digit_token(token: &str) -> bool {
    !token.is_empty() && token.chars().all(is_digit_char)
}

/// Replace Arabic-Indic digits with ASCII digits, leaving everything else untouched
pub fn normalize_digits(text: &str) -> String {
    text.chars().map(|c| ascii_digit(c).unwrap_or(c)).collect()
}

/// Replace every spoken number phrase with its digits, longest phrase first.
///
/// This is plain text substitution: a phrase embedded in a longer word is
/// replaced too.
pub fn words_to_digits(text: &str) -> String {
    let mut result = normalize_digits(text);
    for (word, num) in number_words() {
        if result.contains(word) {
            result = result.replace(word, &num.to_string());
        }
    }
    result
}

/// Read a number from the start of `text`, spoken or written.
///
/// Accepts a string that is only digits, or one that equals or starts with a
/// known number phrase.
pub fn extract_leading_number(text: &str) -> Option<u32> {
    let normalized = normalize_digits(text.trim());

    if is_digit_token(&normalized) {
        if let Ok(num) = normalized.parse::<u32>() {
            return Some(num);
        }
    }

    number_words()
        .iter()
        .find(|(word, _)| normalized.starts_with(word))
        .map(|&(_, num)| num)
}

/// Split a leading number phrase or digit run off `text`.
///
/// Returns the number and the rest of the text after it.
pub fn take_number_prefix(text: &str) -> Option<(u32, &str)> {
    if let Some((word, num)) = number_words().iter().find(|(w, _)| text.starts_with(w)) {
        return Some((*num, &text[word.len()..]));
    }

    let digits_end = text
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    if digits_end == 0 {
        return None;
    }
    text[..digits_end]
        .parse::<u32>()
        .ok()
        .map(|num| (num, &text[digits_end..]))
}
