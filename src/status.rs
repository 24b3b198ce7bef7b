//! Session status reported to the host

use serde::{Deserialize, Serialize};
use std::fmt;

/// Shown when the microphone permission is refused
pub const PERMISSION_MESSAGE: &str = "يرجى السماح بالميكروفون";

/// Shown when the environment has no speech recognition
pub const UNSUPPORTED_MESSAGE: &str = "جهازك لا يدعم ميزة التسجيل الصوتي";

/// Shown when a recognizer restart fails
pub const RESTART_FAILED_MESSAGE: &str = "تعذر إعادة تشغيل التعرف على الصوت";

/// Observational status of a voice session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Listening,
    Processing,
    Sending,
    Success,
    Error,
    Unsupported,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionStatus::Listening => "listening",
            SessionStatus::Processing => "processing",
            SessionStatus::Sending => "sending",
            SessionStatus::Success => "success",
            SessionStatus::Error => "error",
            SessionStatus::Unsupported => "unsupported",
        };
        write!(f, "{}", name)
    }
}

/// Callback invoked on every status change
pub type StatusCallback = Box<dyn Fn(SessionStatus) + Send + Sync>;
