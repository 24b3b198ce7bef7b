//! Field coercion
//!
//! Turns free-form spoken content into the canonical value for a field.
//! A coercer that finds nothing it understands returns the text untouched so
//! a reviewer can fix it later.

use super::text_normalizer::{extract_leading_number, normalize_digits, take_number_prefix};
use crate::schema::FieldKind;
use chrono::Datelike;
use lazy_static::lazy_static;
use regex::Regex;

const RANGE_FROM: &[&str] = &["من", "مِن"];
const RANGE_TO: &[&str] = &["إلى", "الى", "الي", "إلي", "لـ", "ل"];

const NOT_DONE: &[&str] = &["لا", "لم يتم", "لم", "ما تم", "لسا", "لسه"];
const DONE: &[&str] = &["تم", "تمّ", "نعم", "اه", "أه", "ايوا", "أيوا", "صح", "تمام"];

/// Grade spellings folded onto the canonical label
const GRADE_VARIANTS: &[(&str, &str)] = &[
    ("ممتاز", "ممتاز"),
    ("جيد جدا", "جيد جدا"),
    ("جيد جداً", "جيد جدا"),
    ("جيد", "جيد"),
    ("مقبول", "مقبول"),
    ("لم يسمع", "لم يسمع"),
    ("ما سمع", "لم يسمع"),
    ("لم يسمّع", "لم يسمع"),
];

/// Longest walk through a spoken date before giving up
const DATE_MAX_STEPS: usize = 10;

lazy_static! {
    static ref PLAN_RE: Regex = {
        let alt = |words: &[&str]| {
            words
                .iter()
                .map(|w| regex::escape(w))
                .collect::<Vec<_>>()
                .join("|")
        };
        Regex::new(&format!(
            r"(?i)^(.+?)\s+(?:{})\s+(.+?)\s+(?:{})\s+(.+)$",
            alt(RANGE_FROM),
            alt(RANGE_TO)
        ))
        .expect("valid plan regex")
    };
    static ref DIGITAL_DATE_RE: Regex =
        Regex::new(r"^([0-9]{1,2})\s*[/\-.]\s*([0-9]{1,2})(?:\s*[/\-.]\s*([0-9]{2,4}))?$")
            .expect("valid date regex");
    static ref DIGIT_RUN_RE: Regex = Regex::new(r"[0-9]+").expect("valid digit regex");
    static ref SORTED_GRADES: Vec<(&'static str, &'static str)> = {
        let mut grades = GRADE_VARIANTS.to_vec();
        grades.sort_by_key(|(variant, _)| std::cmp::Reverse(variant.chars().count()));
        grades
    };
}

/// Inputs a coercion needs beyond the text itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoercionContext {
    /// Year used when a spoken date leaves it out
    pub current_year: i32,
}

impl CoercionContext {
    pub fn today() -> Self {
        Self {
            current_year: chrono::Local::now().year(),
        }
    }

    pub fn with_year(current_year: i32) -> Self {
        Self { current_year }
    }
}

impl Default for CoercionContext {
    fn default() -> Self {
        Self::today()
    }
}

/// Coerce `text` for a field of type `kind`
pub fn coerce(kind: FieldKind, text: &str, ctx: &CoercionContext) -> String {
    match kind {
        FieldKind::PlanRange => spoken_to_plan(text),
        FieldKind::Date => spoken_to_date(text, ctx.current_year),
        FieldKind::Integer => spoken_to_number(text),
        FieldKind::Boolean => spoken_to_checkbox(text),
        FieldKind::Grade => spoken_to_grade(text),
        FieldKind::FreeText => text.to_string(),
    }
}

/// "سورة البقرة من خمسة إلى عشرة" -> "سورة البقرة (5-10)"
pub fn spoken_to_plan(text: &str) -> String {
    let normalized = normalize_digits(text.trim());

    if let Some(caps) = PLAN_RE.captures(&normalized) {
        let label = caps[1].trim();
        let from = extract_leading_number(&caps[2]);
        let to = extract_leading_number(&caps[3]);
        if let (Some(from), Some(to)) = (from, to) {
            return format!("{} ({}-{})", label, from, to);
        }
    }

    text.to_string()
}

/// Accepts "12/3[/2024]" or spoken numbers for day, month and optional year
pub fn spoken_to_date(text: &str, current_year: i32) -> String {
    let normalized = normalize_digits(text.trim());

    if let Some(caps) = DIGITAL_DATE_RE.captures(&normalized) {
        let year = caps
            .get(3)
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| current_year.to_string());
        return format!("{}/{}/{}", &caps[1], &caps[2], year);
    }

    let nums = collect_date_numbers(&normalized);
    if nums.len() >= 2 {
        let year = nums
            .get(2)
            .map(|y| y.to_string())
            .unwrap_or_else(|| current_year.to_string());
        return format!("{}/{}/{}", nums[0], nums[1], year);
    }

    text.to_string()
}

/// Read up to three numbers left to right, skipping words that are not numbers
fn collect_date_numbers(text: &str) -> Vec<u32> {
    let mut nums = Vec::new();
    let mut remaining = text.trim_start();

    for _ in 0..DATE_MAX_STEPS {
        if remaining.is_empty() || nums.len() == 3 {
            break;
        }
        match take_number_prefix(remaining) {
            Some((num, rest)) => {
                nums.push(num);
                remaining = rest;
            }
            None => {
                remaining = remaining
                    .split_once(char::is_whitespace)
                    .map(|(_, rest)| rest)
                    .unwrap_or("");
            }
        }
        remaining = remaining.trim_start();
    }

    nums
}

/// Page and error counts
pub fn spoken_to_number(text: &str) -> String {
    if let Some(num) = extract_leading_number(text) {
        return num.to_string();
    }

    let normalized = normalize_digits(text.trim());
    if let Some(m) = DIGIT_RUN_RE.find(&normalized) {
        return m.as_str().to_string();
    }

    text.to_string()
}

/// Checkbox columns. "not done" phrases are checked first since "لم يتم"
/// contains "تم".
pub fn spoken_to_checkbox(text: &str) -> String {
    let t = text.trim();

    if NOT_DONE.iter().any(|v| t.contains(v)) {
        return "FALSE".to_string();
    }
    if DONE.iter().any(|v| t.contains(v)) {
        return "TRUE".to_string();
    }

    text.to_string()
}

pub fn spoken_to_grade(text: &str) -> String {
    let t = text.trim();

    SORTED_GRADES
        .iter()
        .find(|(variant, _)| t.contains(variant))
        .map(|(_, canonical)| canonical.to_string())
        .unwrap_or_else(|| text.to_string())
}
