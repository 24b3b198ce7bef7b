//! Core interpretation modules
//!
//! Normalization, cleaning, segmentation and per-field coercion of
//! recognized speech. Everything here is pure and deterministic.

pub mod cleaner;
pub mod coercers;
pub mod segmenter;
pub mod text_normalizer;

pub use cleaner::clean;
pub use coercers::{coerce, CoercionContext};
pub use segmenter::{interpret, segment, Segment};
pub use text_normalizer::{extract_leading_number, normalize_digits, words_to_digits};
