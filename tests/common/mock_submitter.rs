//! Mock Submitter for Testing
//!
//! Records every batch it is handed.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tasmee::record::Row;
use tasmee::submit::{RowSubmitter, SubmitReceipt};

#[derive(Default)]
pub struct MockSubmitter {
    pub batches: Arc<Mutex<Vec<(String, Vec<Row>)>>>,
    /// Reject every submit with this message
    pub fail_with: Option<String>,
}

impl MockSubmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn submitted(&self) -> Vec<(String, Vec<Row>)> {
        self.batches.lock().unwrap().clone()
    }
}

#[async_trait]
impl RowSubmitter for MockSubmitter {
    async fn submit(&self, student: &str, rows: &[Row]) -> Result<SubmitReceipt> {
        if let Some(message) = &self.fail_with {
            anyhow::bail!("{}", message);
        }
        self.batches
            .lock()
            .unwrap()
            .push((student.to_string(), rows.to_vec()));
        Ok(SubmitReceipt {
            rows_added: rows.len(),
            message: "ok".to_string(),
            sheet_url: None,
        })
    }

    fn name(&self) -> &str {
        "mock"
    }
}
