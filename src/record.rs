//! Current record being filled by voice

use crate::schema::FIELD_COUNT;
use serde::{Deserialize, Serialize};

/// A committed row: one string per schema field
pub type Row = Vec<String>;

/// The nine field values under construction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    values: Vec<String>,
}

impl Default for Record {
    fn default() -> Self {
        Self::new()
    }
}

impl Record {
    pub fn new() -> Self {
        Self {
            values: vec![String::new(); FIELD_COUNT],
        }
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.values.get(index).map(String::as_str)
    }

    /// Overwrite a field. Out of range indices are ignored.
    pub fn set(&mut self, index: usize, value: impl Into<String>) {
        if let Some(slot) = self.values.get_mut(index) {
            *slot = value.into();
        }
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// True when every field is empty or whitespace
    pub fn is_blank(&self) -> bool {
        self.values.iter().all(|v| v.trim().is_empty())
    }

    pub fn clear(&mut self) {
        self.values.iter_mut().for_each(String::clear);
    }

    /// Snapshot with every value trimmed
    pub fn to_row(&self) -> Row {
        self.values.iter().map(|v| v.trim().to_string()).collect()
    }
}
