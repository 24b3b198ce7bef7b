//! Outgoing row preparation for the sheet backend

use crate::core::normalize_digits;
use crate::record::Row;
use crate::schema::{checkbox_columns, PAGES_COL};
use serde::Serialize;
use serde_json::Value;

/// Marker meaning the pages were not recited
const NOT_DONE_MARKER: &str = "لم يتم";

/// Request body for `POST /api/process`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessRequest {
    pub student_name: String,
    pub extracted_data: Vec<Vec<Value>>,
    pub action: &'static str,
}

impl ProcessRequest {
    pub fn confirm(student: &str, rows: &[Row]) -> Self {
        Self {
            student_name: student.to_string(),
            extracted_data: rows.iter().map(|r| prepare_row(r)).collect(),
            action: "confirm",
        }
    }
}

pub fn strip_zero_width(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(c, '\u{200B}'..='\u{200D}' | '\u{FEFF}'))
        .collect()
}

/// Parse a page count cell into a JSON number
fn page_count(cell: &str) -> Value {
    let cleaned = normalize_digits(strip_zero_width(cell).trim());
    if cleaned.is_empty() {
        return Value::Null;
    }
    if let Ok(n) = cleaned.parse::<i64>() {
        return Value::from(n);
    }
    cleaned
        .parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

/// Convert a row into the cells the backend expects. The page count becomes
/// a number (or null); "لم يتم" in the page cell clears it and ticks every
/// checkbox.
pub fn prepare_row(row: &[String]) -> Vec<Value> {
    let mut cells: Vec<Value> = row
        .iter()
        .enumerate()
        .map(|(idx, cell)| {
            if idx == PAGES_COL {
                page_count(cell)
            } else {
                Value::String(cell.clone())
            }
        })
        .collect();

    let not_done = row
        .get(PAGES_COL)
        .is_some_and(|cell| cell.contains(NOT_DONE_MARKER));
    if not_done {
        cells[PAGES_COL] = Value::Null;
        for col in checkbox_columns() {
            if let Some(cell) = cells.get_mut(col) {
                *cell = Value::String("TRUE".to_string());
            }
        }
    }

    cells
}
