//! Mock Recognizer for Testing
//!
//! Counts start/stop calls and can be told to fail its next start.

use anyhow::Result;
use std::sync::{Arc, Mutex};
use tasmee::recognizer::Recognizer;

#[derive(Debug, Default)]
pub struct RecognizerCalls {
    pub starts: usize,
    pub stops: usize,
}

pub struct MockRecognizer {
    pub calls: Arc<Mutex<RecognizerCalls>>,
    pub fail_start: Arc<Mutex<bool>>,
    supported: bool,
}

impl MockRecognizer {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(RecognizerCalls::default())),
            fail_start: Arc::new(Mutex::new(false)),
            supported: true,
        }
    }

    /// A recognizer for an environment without speech recognition
    pub fn unsupported() -> Self {
        Self {
            supported: false,
            ..Self::new()
        }
    }
}

impl Recognizer for MockRecognizer {
    fn name(&self) -> &str {
        "mock"
    }

    fn is_supported(&self) -> bool {
        self.supported
    }

    fn start(&mut self) -> Result<()> {
        if *self.fail_start.lock().unwrap() {
            anyhow::bail!("audio device busy");
        }
        self.calls.lock().unwrap().starts += 1;
        Ok(())
    }

    fn stop(&mut self) {
        self.calls.lock().unwrap().stops += 1;
    }
}
