//! Record Assembler
//!
//! Holds the rows committed during a session and builds the batch that is
//! handed to a submitter.

use crate::record::{Record, Row};
use tracing::debug;

#[derive(Debug, Default, Clone)]
pub struct RecordAssembler {
    rows: Vec<Row>,
}

impl RecordAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a trimmed snapshot of `record`
    pub fn commit(&mut self, record: &Record) {
        self.rows.push(record.to_row());
        debug!("📝 Row committed ({} total)", self.rows.len());
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }

    /// Committed rows plus the current record when it holds anything.
    /// `None` when there is nothing to send.
    pub fn pending_batch(&self, current: &Record) -> Option<Vec<Row>> {
        let mut batch = self.rows.clone();
        if !current.is_blank() {
            batch.push(current.to_row());
        }

        if batch.is_empty() {
            None
        } else {
            Some(batch)
        }
    }
}
