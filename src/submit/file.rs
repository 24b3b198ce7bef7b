use super::sheet::{to_sheet_row, Cell};
use super::{RowSubmitter, SubmitReceipt};
use crate::record::Row;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::info;

/// One appended line
#[derive(Debug, Serialize)]
struct SheetLine<'a> {
    student: &'a str,
    timestamp: String,
    cells: Vec<Cell>,
}

/// Appends rows, laid out as sheet columns, to a JSON-lines file
pub struct FileSubmitter {
    path: PathBuf,
}

impl FileSubmitter {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl RowSubmitter for FileSubmitter {
    async fn submit(&self, student: &str, rows: &[Row]) -> Result<SubmitReceipt> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let timestamp = chrono::Local::now().to_rfc3339();
        let mut buf = String::new();
        for row in rows {
            let line = SheetLine {
                student,
                timestamp: timestamp.clone(),
                cells: to_sheet_row(row),
            };
            buf.push_str(&serde_json::to_string(&line)?);
            buf.push('\n');
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .with_context(|| format!("Failed to open {}", self.path.display()))?;
        file.write_all(buf.as_bytes()).await?;
        file.flush().await?;

        info!("💾 Appended {} row(s) to {}", rows.len(), self.path.display());
        Ok(SubmitReceipt {
            rows_added: rows.len(),
            message: format!("Rows appended to {}", self.path.display()),
            sheet_url: None,
        })
    }

    fn name(&self) -> &str {
        "file"
    }
}
