//! Submission Module
//!
//! Hands committed rows to a destination sheet.
//!
//! - HTTP: posts rows to the sheet backend (`/api/process`)
//! - File: appends rows in sheet layout to a local JSON-lines file

use crate::config::Config;
use crate::record::Row;
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

pub mod file;
pub mod http;
pub mod payload;
pub mod sheet;

pub use file::FileSubmitter;
pub use http::HttpSubmitter;

/// What a destination reports back after accepting rows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitReceipt {
    pub rows_added: usize,
    pub message: String,
    pub sheet_url: Option<String>,
}

/// Trait for row destinations
#[async_trait]
pub trait RowSubmitter: Send + Sync {
    /// Submit `rows` for `student`. Either every row is accepted or an error is returned.
    async fn submit(&self, student: &str, rows: &[Row]) -> Result<SubmitReceipt>;

    /// Get the submitter name
    fn name(&self) -> &str;
}

/// Factory to create the configured submitter
pub fn create_submitter(config: &Config) -> Result<Arc<dyn RowSubmitter>> {
    info!("🛠️ Creating submitter: {}", config.submitter);
    let submitter: Arc<dyn RowSubmitter> = match config.submitter.as_str() {
        "http" => {
            info!("  - Posting to backend at {}", config.backend_url);
            Arc::new(HttpSubmitter::new(config)?)
        }
        "file" => {
            info!("  - Appending rows to {}", config.output_path);
            Arc::new(FileSubmitter::new(&config.output_path))
        }
        other => {
            warn!("  - Unknown submitter '{}', falling back to file", other);
            Arc::new(FileSubmitter::new(&config.output_path))
        }
    };
    info!("✅ Submitter '{}' initialized", submitter.name());
    Ok(submitter)
}
