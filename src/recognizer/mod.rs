//! Speech recognizer boundary
//!
//! The session controller never talks to a microphone directly. It drives an
//! injected [`Recognizer`] and consumes the [`RecognitionEvent`]s that the
//! recognizer delivers through the session input channel.
//!
//! - Script: replays a recorded transcript script (CLI and tests)

pub mod script;

use anyhow::Result;
use serde::{Deserialize, Serialize};

pub use script::ScriptRecognizer;

/// Locale the recognizer is configured for
pub const DEFAULT_LANGUAGE: &str = "ar-JO";

/// One recognition result, interim or final
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognitionResult {
    pub transcript: String,
    #[serde(default = "default_confidence")]
    pub confidence: f32,
    #[serde(default)]
    pub is_final: bool,
}

fn default_confidence() -> f32 {
    1.0
}

impl RecognitionResult {
    pub fn interim(transcript: &str) -> Self {
        Self {
            transcript: transcript.to_string(),
            confidence: 0.0,
            is_final: false,
        }
    }

    pub fn final_result(transcript: &str, confidence: f32) -> Self {
        Self {
            transcript: transcript.to_string(),
            confidence,
            is_final: true,
        }
    }
}

/// Error codes a recognizer can report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecognizerErrorCode {
    NoSpeech,
    Aborted,
    AudioCapture,
    Network,
    NotAllowed,
    ServiceNotAllowed,
    LanguageNotSupported,
    #[serde(other)]
    Unknown,
}

impl RecognizerErrorCode {
    /// Permission failures end the session; everything else is transient
    pub fn is_fatal(self) -> bool {
        matches!(
            self,
            RecognizerErrorCode::NotAllowed | RecognizerErrorCode::ServiceNotAllowed
        )
    }
}

/// Event delivered by a recognizer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RecognitionEvent {
    Result(RecognitionResult),
    Error { error: RecognizerErrorCode },
    /// The recognizer stopped on its own (end of utterance, silence timeout)
    End,
}

/// A speech recognizer the session can start and stop.
///
/// `start` and `stop` must return immediately; results arrive later as
/// events on the session input channel.
pub trait Recognizer: Send {
    /// Recognizer name for logs
    fn name(&self) -> &str;

    /// Whether recognition is available in this environment
    fn is_supported(&self) -> bool {
        true
    }

    /// Begin a recognition instance
    fn start(&mut self) -> Result<()>;

    /// Stop the current instance, best effort
    fn stop(&mut self);
}
