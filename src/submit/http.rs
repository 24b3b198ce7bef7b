use super::payload::ProcessRequest;
use super::{RowSubmitter, SubmitReceipt};
use crate::config::Config;
use crate::record::Row;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Shown when the backend rejects rows without saying why
const DEFAULT_FAILURE: &str = "فشل في إضافة البيانات";

const MAX_ATTEMPTS: u32 = 3;

/// Response of `POST /api/process`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ProcessResponse {
    success: bool,
    message: Option<String>,
    rows_added: Option<usize>,
    sheet_url: Option<String>,
    error: Option<String>,
}

/// Sheet backend reached over HTTP
pub struct HttpSubmitter {
    client: Client,
    url: String,
}

impl HttpSubmitter {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            url: format!("{}/api/process", config.backend_url.trim_end_matches('/')),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn post(&self, request: &ProcessRequest) -> Result<reqwest::Response> {
        for attempt in 0..MAX_ATTEMPTS {
            match self.client.post(&self.url).json(request).send().await {
                Ok(resp) => return Ok(resp),
                // only connection failures are retried; timeouts surface at once
                Err(e) if e.is_connect() && attempt < MAX_ATTEMPTS - 1 => {
                    warn!(
                        "⚠️ Backend retry {}/{} for '{}': {}",
                        attempt + 1,
                        MAX_ATTEMPTS,
                        self.url,
                        e
                    );
                    debug!("📡 Connection refused. Backend might not be running.");
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
                Err(e) => {
                    if e.is_connect() {
                        anyhow::bail!("Could not reach backend at {}. Is it running?", self.url);
                    }
                    return Err(e.into());
                }
            }
        }

        anyhow::bail!("Backend request failed after {} attempts", MAX_ATTEMPTS)
    }
}

#[async_trait]
impl RowSubmitter for HttpSubmitter {
    async fn submit(&self, student: &str, rows: &[Row]) -> Result<SubmitReceipt> {
        let request = ProcessRequest::confirm(student, rows);
        debug!("POST {} ({} rows)", self.url, rows.len());

        let resp = self.post(&request).await?;
        let status = resp.status();
        let body: ProcessResponse = resp.json().await.unwrap_or_default();

        if !status.is_success() || !body.success {
            let reason = body.error.unwrap_or_else(|| DEFAULT_FAILURE.to_string());
            anyhow::bail!("{} (HTTP {})", reason, status.as_u16());
        }

        let rows_added = body.rows_added.unwrap_or(rows.len());
        info!("📊 Backend accepted {} row(s)", rows_added);
        Ok(SubmitReceipt {
            rows_added,
            message: body.message.unwrap_or_default(),
            sheet_url: body.sheet_url,
        })
    }

    fn name(&self) -> &str {
        "http"
    }
}
