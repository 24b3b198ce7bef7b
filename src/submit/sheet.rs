//! Spreadsheet column layout
//!
//! Field index to sheet column:
//!
//! | field | column |
//! |---|---|
//! | 0 plan | A |
//! | 1 date | D |
//! | 2 pages | E (number) |
//! | 3..5 checkboxes | F..H |
//! | 6 errors | I (number) |
//! | 7 grade | J |
//! | 8 notes | K |
//!
//! Columns B and C are filled by the sheet itself.

use crate::schema::{self, FieldKind, ERRORS_COL, PAGES_COL};
use serde::Serialize;

/// Number of columns A..K
pub const SHEET_WIDTH: usize = 11;

/// Sheet column for each field, by field index
const FIELD_COLUMNS: [usize; schema::FIELD_COUNT] = [0, 3, 4, 5, 6, 7, 8, 9, 10];

/// Checkbox spellings stored as ticked
const TICKED: &[&str] = &["TRUE", "true", "تم"];

/// One spreadsheet cell
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Checkbox(bool),
}

/// Column letter for a field index
pub fn column_for(field: usize) -> Option<char> {
    FIELD_COLUMNS
        .get(field)
        .and_then(|&col| char::from_u32('A' as u32 + col as u32))
}

fn number_or_text(value: &str) -> Cell {
    match value.parse::<f64>() {
        Ok(n) => Cell::Number(n),
        Err(_) => Cell::Text(value.to_string()),
    }
}

/// Lay a row out across columns A..K. Empty fields leave their cell empty.
pub fn to_sheet_row(row: &[String]) -> Vec<Cell> {
    let mut cells = vec![Cell::Empty; SHEET_WIDTH];

    for (field, value) in row.iter().enumerate().take(schema::FIELD_COUNT) {
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        let cell = match schema::kind_at(field) {
            Some(FieldKind::Boolean) => Cell::Checkbox(TICKED.contains(&value)),
            _ if field == PAGES_COL || field == ERRORS_COL => number_or_text(value),
            _ => Cell::Text(value.to_string()),
        };
        cells[FIELD_COLUMNS[field]] = cell;
    }

    cells
}
