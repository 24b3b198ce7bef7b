#![allow(dead_code)]

pub mod mock_recognizer;
pub mod mock_submitter;

use mock_recognizer::MockRecognizer;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tasmee::config::{Config, DeviceClass};
use tasmee::core::CoercionContext;
use tasmee::recognizer::{RecognitionEvent, RecognitionResult};
use tasmee::status::SessionStatus;
use tasmee::{EventOutcome, VoiceSession};

/// A session wired to a mock recognizer, with a recorded status history
pub struct TestSession {
    pub session: VoiceSession,
    pub recognizer_calls: Arc<Mutex<mock_recognizer::RecognizerCalls>>,
    pub fail_start: Arc<Mutex<bool>>,
    pub statuses: Arc<Mutex<Vec<SessionStatus>>>,
    pub clock: Instant,
}

impl TestSession {
    pub fn new(device: DeviceClass) -> Self {
        let config = Config {
            device_class: device,
            ..Config::default()
        };
        Self::with_config(&config)
    }

    pub fn with_config(config: &Config) -> Self {
        Self::with_recognizer(MockRecognizer::new(), config)
    }

    pub fn with_recognizer(recognizer: MockRecognizer, config: &Config) -> Self {
        let recognizer_calls = recognizer.calls.clone();
        let fail_start = recognizer.fail_start.clone();
        let statuses = Arc::new(Mutex::new(Vec::new()));
        let sink = statuses.clone();

        let session = VoiceSession::new(Box::new(recognizer), config)
            .with_context(CoercionContext::with_year(2024))
            .on_status(Box::new(move |status: SessionStatus| sink.lock().unwrap().push(status)));

        Self {
            session,
            recognizer_calls,
            fail_start,
            statuses,
            clock: Instant::now(),
        }
    }

    /// Move the test clock forward
    pub fn advance(&mut self, ms: u64) {
        self.clock += Duration::from_millis(ms);
    }

    pub fn final_result(&mut self, text: &str, confidence: f32) -> EventOutcome {
        let now = self.clock;
        self.session.handle_event(
            RecognitionEvent::Result(RecognitionResult::final_result(text, confidence)),
            now,
        )
    }

    pub fn interim(&mut self, text: &str) -> EventOutcome {
        let now = self.clock;
        self.session
            .handle_event(RecognitionEvent::Result(RecognitionResult::interim(text)), now)
    }

    pub fn event(&mut self, event: RecognitionEvent) -> EventOutcome {
        let now = self.clock;
        self.session.handle_event(event, now)
    }

    /// Say `text` confidently, then let the processing lock expire
    pub fn say(&mut self, text: &str) -> EventOutcome {
        let outcome = self.final_result(text, 0.95);
        self.advance(600);
        outcome
    }

    pub fn starts(&self) -> usize {
        self.recognizer_calls.lock().unwrap().starts
    }

    pub fn stops(&self) -> usize {
        self.recognizer_calls.lock().unwrap().stops
    }

    pub fn statuses(&self) -> Vec<SessionStatus> {
        self.statuses.lock().unwrap().clone()
    }
}
