use crate::recognizer::DEFAULT_LANGUAGE;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Lowest confidence a final result may carry and still be accepted.
/// Config may raise it, never lower it.
pub const CONFIDENCE_FLOOR: f32 = 0.75;

/// Class of device running the capture session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DeviceClass {
    Desktop,
    Mobile,
}

impl DeviceClass {
    /// Delay before restarting a recognizer that ended on its own
    pub fn restart_delay(self) -> Duration {
        match self {
            DeviceClass::Desktop => Duration::from_millis(50),
            DeviceClass::Mobile => Duration::from_millis(200),
        }
    }

    /// Whether interim transcript updates are rate limited
    pub fn throttles_interim(self) -> bool {
        matches!(self, DeviceClass::Mobile)
    }
}

/// What happens when the cursor advances past the last field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WrapPolicy {
    /// Jump back to the first field of the same row
    Wrap,
    /// Commit the row and start a fresh one
    CommitRow,
}

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // Speech
    pub language: String,
    pub alternative_languages: Vec<String>,
    pub device_class: DeviceClass,
    pub min_confidence: f32,

    // Session timing
    pub interim_throttle_ms: u64,
    pub processing_lock_ms: u64,
    pub restart_delay_ms: Option<u64>,
    pub recent_window: usize,
    pub wrap_policy: WrapPolicy,

    // Submission
    /// "http" or "file"
    pub submitter: String,
    pub backend_url: String,
    pub request_timeout_secs: u64,
    pub output_path: String,

    // Meta
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_string(),
            alternative_languages: vec!["ar-SA".to_string(), "ar-EG".to_string()],
            device_class: DeviceClass::Desktop,
            min_confidence: CONFIDENCE_FLOOR,
            interim_throttle_ms: 300,
            processing_lock_ms: 500,
            restart_delay_ms: None,
            recent_window: 5,
            wrap_policy: WrapPolicy::Wrap,
            submitter: "file".to_string(),
            backend_url: "http://localhost:3000".to_string(),
            request_timeout_secs: 10,
            output_path: dirs::data_dir()
                .unwrap_or_default()
                .join("tasmee/rows.jsonl")
                .to_string_lossy()
                .to_string(),
            log_level: "INFO".to_string(),
        }
    }
}

impl Config {
    /// Load config from the default location, or fall back to defaults
    pub fn load() -> Result<Self> {
        Self::load_from(&config_path())
    }

    /// Load config from `path`. A corrupt file is moved aside and defaults are used.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        match serde_json::from_str(&content) {
            Ok(config) => Ok(config),
            Err(e) => {
                tracing::warn!("⚠️ Config file corrupted or invalid, using defaults: {}", e);
                let backup_path = path.with_extension("json.corrupt");
                let _ = std::fs::rename(path, &backup_path);
                Ok(Self::default())
            }
        }
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Recognizer languages, primary first, without repeats
    pub fn languages(&self) -> Vec<String> {
        let mut languages = vec![self.language.clone()];
        for alt in &self.alternative_languages {
            if !languages.contains(alt) {
                languages.push(alt.clone());
            }
        }
        languages
    }

    /// Confidence threshold actually applied to final results
    pub fn effective_min_confidence(&self) -> f32 {
        self.min_confidence.max(CONFIDENCE_FLOOR)
    }

    pub fn restart_delay(&self) -> Duration {
        self.restart_delay_ms
            .map(Duration::from_millis)
            .unwrap_or_else(|| self.device_class.restart_delay())
    }

    pub fn processing_lock(&self) -> Duration {
        Duration::from_millis(self.processing_lock_ms)
    }

    pub fn interim_throttle(&self) -> Duration {
        Duration::from_millis(self.interim_throttle_ms)
    }
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tasmee")
        .join("config.json")
}
