//! Recognition Session Controller
//!
//! Owns the recognizer lifecycle and folds final results into the current
//! record. Every decision that depends on time takes an explicit `now`, so
//! the controller can be driven step by step in tests or by [`VoiceSession::run`].
//!
//! Final result pipeline:
//! 1. Confidence gate
//! 2. Processing lock of the current recognizer instance
//! 3. Clean, then drop duplicates of recent utterances
//! 4. Interpret commands and separators
//! 5. Coerce content for the field under the cursor, advancing on separators

use crate::assembler::RecordAssembler;
use crate::config::{Config, DeviceClass, WrapPolicy};
use crate::core::{clean, coerce, interpret, CoercionContext, Segment};
use crate::error::{TasmeeError, TasmeeResult};
use crate::recognizer::{RecognitionEvent, RecognitionResult, Recognizer};
use crate::record::{Record, Row};
use crate::schema::{self, FIELD_COUNT};
use crate::status::{
    SessionStatus, StatusCallback, PERMISSION_MESSAGE, RESTART_FAILED_MESSAGE, UNSUPPORTED_MESSAGE,
};
use crate::submit::{RowSubmitter, SubmitReceipt};
use std::collections::VecDeque;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, error, info, warn};

/// Lifecycle of a capture session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Listening,
    Stopped,
}

/// Commands the host sends alongside recognizer events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostCommand {
    Start,
    Stop,
    AddRow,
    Reset,
}

/// Everything the session loop consumes, in arrival order
#[derive(Debug, Clone, PartialEq)]
pub enum SessionInput {
    Recognition(RecognitionEvent),
    Host(HostCommand),
}

/// Why an event left the record untouched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    NotListening,
    LowConfidence,
    Locked,
    Empty,
    Duplicate,
    Throttled,
    Recoverable,
}

/// Result of handling one recognizer event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    /// Live transcript updated
    Interim,
    /// A final result was applied
    Applied {
        /// Field indices written, in order
        fields: Vec<usize>,
        advances: usize,
    },
    Ignored(IgnoreReason),
    /// The session stopped with a user-facing message
    Fatal(String),
    RestartScheduled,
}

#[derive(Debug, Clone, Copy)]
struct ProcessingLock {
    instance: u64,
    until: Instant,
}

/// Voice capture session for one student sheet
pub struct VoiceSession {
    recognizer: Box<dyn Recognizer>,
    device_class: DeviceClass,
    min_confidence: f32,
    interim_throttle: Duration,
    lock_duration: Duration,
    restart_delay: Duration,
    wrap_policy: WrapPolicy,
    ctx: CoercionContext,

    state: SessionState,
    cursor: usize,
    record: Record,
    assembler: RecordAssembler,
    recent: VecDeque<String>,
    recent_capacity: usize,
    live_transcript: String,
    error: Option<String>,
    last_interim_update: Option<Instant>,
    processing_lock: Option<ProcessingLock>,
    /// Incremented on every recognizer start
    instance: u64,
    restart_at: Option<Instant>,
    on_status: Option<StatusCallback>,
}

impl VoiceSession {
    pub fn new(recognizer: Box<dyn Recognizer>, config: &Config) -> Self {
        let recent_capacity = config.recent_window.max(1);
        Self {
            recognizer,
            device_class: config.device_class,
            min_confidence: config.effective_min_confidence(),
            interim_throttle: config.interim_throttle(),
            lock_duration: config.processing_lock(),
            restart_delay: config.restart_delay(),
            wrap_policy: config.wrap_policy,
            ctx: CoercionContext::today(),
            state: SessionState::Idle,
            cursor: 0,
            record: Record::new(),
            assembler: RecordAssembler::new(),
            recent: VecDeque::with_capacity(recent_capacity),
            recent_capacity,
            live_transcript: String::new(),
            error: None,
            last_interim_update: None,
            processing_lock: None,
            instance: 0,
            restart_at: None,
            on_status: None,
        }
    }

    /// Pin the coercion context (current year)
    pub fn with_context(mut self, ctx: CoercionContext) -> Self {
        self.ctx = ctx;
        self
    }

    pub fn on_status(mut self, callback: StatusCallback) -> Self {
        self.on_status = Some(callback);
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn record(&self) -> &Record {
        &self.record
    }

    pub fn rows(&self) -> &[Row] {
        self.assembler.rows()
    }

    pub fn live_transcript(&self) -> &str {
        &self.live_transcript
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Rows a submit would send right now
    pub fn pending_batch(&self) -> Option<Vec<Row>> {
        self.assembler.pending_batch(&self.record)
    }

    /// Deadline of the pending recognizer restart, if any
    pub fn restart_at(&self) -> Option<Instant> {
        self.restart_at
    }

    fn emit(&self, status: SessionStatus) {
        debug!("Session status: {}", status);
        if let Some(callback) = &self.on_status {
            callback(status);
        }
    }

    /// Begin listening. Starting an already listening session is a no-op.
    pub fn start(&mut self) -> TasmeeResult<()> {
        if !self.recognizer.is_supported() {
            warn!("⚠️ Recognizer '{}' is not supported here", self.recognizer.name());
            self.error = Some(UNSUPPORTED_MESSAGE.to_string());
            self.emit(SessionStatus::Unsupported);
            return Err(TasmeeError::Unsupported);
        }
        if self.state == SessionState::Listening {
            return Ok(());
        }

        self.error = None;
        self.instance += 1;
        if let Err(e) = self.recognizer.start() {
            error!("❌ Failed to start recognizer: {}", e);
            self.state = SessionState::Stopped;
            self.error = Some(e.to_string());
            self.emit(SessionStatus::Error);
            return Err(TasmeeError::Recognizer(e.to_string()));
        }

        self.state = SessionState::Listening;
        info!("🎤 Listening ({})", self.recognizer.name());
        self.emit(SessionStatus::Listening);
        Ok(())
    }

    /// Stop listening. Cancels any pending restart; late results are discarded.
    pub fn stop(&mut self) {
        self.restart_at = None;
        self.live_transcript.clear();
        if self.state == SessionState::Listening {
            self.state = SessionState::Stopped;
            self.recognizer.stop();
            info!("🛑 Stopped listening");
        }
        self.emit(SessionStatus::Processing);
    }

    /// Handle one recognizer event
    pub fn handle_event(&mut self, event: RecognitionEvent, now: Instant) -> EventOutcome {
        match event {
            RecognitionEvent::Result(result) if result.is_final => self.handle_final(result, now),
            RecognitionEvent::Result(result) => self.handle_interim(result, now),
            RecognitionEvent::Error { error } if error.is_fatal() => {
                warn!("🚫 Recognizer permission error: {:?}", error);
                self.state = SessionState::Stopped;
                self.restart_at = None;
                self.error = Some(PERMISSION_MESSAGE.to_string());
                self.emit(SessionStatus::Error);
                EventOutcome::Fatal(PERMISSION_MESSAGE.to_string())
            }
            RecognitionEvent::Error { error } => {
                debug!("Ignoring recoverable recognizer error: {:?}", error);
                EventOutcome::Ignored(IgnoreReason::Recoverable)
            }
            RecognitionEvent::End => {
                if self.state != SessionState::Listening {
                    return EventOutcome::Ignored(IgnoreReason::NotListening);
                }
                self.restart_at = Some(now + self.restart_delay);
                debug!("🔁 Recognizer ended, restarting in {:?}", self.restart_delay);
                EventOutcome::RestartScheduled
            }
        }
    }

    fn handle_interim(&mut self, result: RecognitionResult, now: Instant) -> EventOutcome {
        if self.state != SessionState::Listening {
            return EventOutcome::Ignored(IgnoreReason::NotListening);
        }
        if self.device_class.throttles_interim() {
            if let Some(last) = self.last_interim_update {
                if now.saturating_duration_since(last) < self.interim_throttle {
                    return EventOutcome::Ignored(IgnoreReason::Throttled);
                }
            }
        }

        self.live_transcript = result.transcript;
        self.last_interim_update = Some(now);
        EventOutcome::Interim
    }

    fn handle_final(&mut self, result: RecognitionResult, now: Instant) -> EventOutcome {
        if self.state != SessionState::Listening {
            return EventOutcome::Ignored(IgnoreReason::NotListening);
        }
        if result.confidence.is_nan() || result.confidence < self.min_confidence {
            debug!(
                "Dropping low confidence result ({:.2}): {}",
                result.confidence, result.transcript
            );
            return EventOutcome::Ignored(IgnoreReason::LowConfidence);
        }
        if let Some(lock) = self.processing_lock {
            if lock.instance == self.instance && now < lock.until {
                debug!("Processing lock held, dropping: {}", result.transcript);
                return EventOutcome::Ignored(IgnoreReason::Locked);
            }
        }

        let cleaned = clean(&result.transcript);
        if cleaned.is_empty() {
            return EventOutcome::Ignored(IgnoreReason::Empty);
        }
        if self.recent.contains(&cleaned) {
            debug!("Duplicate utterance dropped: {}", cleaned);
            return EventOutcome::Ignored(IgnoreReason::Duplicate);
        }
        self.recent.push_back(cleaned.clone());
        while self.recent.len() > self.recent_capacity {
            self.recent.pop_front();
        }

        self.processing_lock = Some(ProcessingLock {
            instance: self.instance,
            until: now + self.lock_duration,
        });

        info!("🗣️ Heard: {}", cleaned);
        let outcome = self.apply(interpret(&cleaned));
        self.live_transcript = cleaned;

        if self.device_class == DeviceClass::Mobile {
            // the platform reports End, which schedules the restart
            self.recognizer.stop();
        }

        outcome
    }

    fn apply(&mut self, segments: Vec<Segment>) -> EventOutcome {
        let mut fields = Vec::new();
        let mut advances = 0;

        for segment in segments {
            match segment {
                Segment::Content(text) => {
                    let Some(kind) = schema::kind_at(self.cursor) else {
                        continue;
                    };
                    let value = coerce(kind, &text, &self.ctx);
                    debug!("Field {} <- {}", self.cursor, value);
                    self.record.set(self.cursor, value);
                    fields.push(self.cursor);
                }
                Segment::Advance => {
                    self.advance_cursor();
                    advances += 1;
                }
            }
        }

        EventOutcome::Applied { fields, advances }
    }

    fn advance_cursor(&mut self) {
        if self.cursor + 1 < FIELD_COUNT {
            self.cursor += 1;
        } else {
            self.on_wrap();
        }
    }

    /// Cursor moved past the last field
    fn on_wrap(&mut self) {
        match self.wrap_policy {
            WrapPolicy::Wrap => self.cursor = 0,
            WrapPolicy::CommitRow => self.add_row(),
        }
    }

    /// Fire a pending restart whose deadline has passed.
    /// Returns true when the recognizer was restarted.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.restart_at {
            Some(deadline) if now >= deadline => self.restart_at = None,
            _ => return false,
        }
        if self.state != SessionState::Listening {
            return false;
        }

        self.instance += 1;
        match self.recognizer.start() {
            Ok(()) => {
                debug!("🔁 Recognizer restarted (instance {})", self.instance);
                true
            }
            Err(e) => {
                error!("❌ Recognizer restart failed: {}", e);
                self.state = SessionState::Stopped;
                self.error = Some(RESTART_FAILED_MESSAGE.to_string());
                self.emit(SessionStatus::Error);
                false
            }
        }
    }

    /// Dispatch one input from the session channel
    pub fn handle_input(&mut self, input: SessionInput, now: Instant) -> TasmeeResult<()> {
        match input {
            SessionInput::Recognition(event) => match self.handle_event(event, now) {
                EventOutcome::Fatal(message) => {
                    return Err(TasmeeError::PermissionDenied(message));
                }
                outcome => debug!("Event outcome: {:?}", outcome),
            },
            SessionInput::Host(HostCommand::Start) => self.start()?,
            SessionInput::Host(HostCommand::Stop) => self.stop(),
            SessionInput::Host(HostCommand::AddRow) => self.add_row(),
            SessionInput::Host(HostCommand::Reset) => self.reset(),
        }
        Ok(())
    }

    /// Commit the current record as a row, blank or not, and start a fresh one
    pub fn add_row(&mut self) {
        self.assembler.commit(&self.record);
        self.record.clear();
        self.cursor = 0;
    }

    /// Discard everything collected so far
    pub fn reset(&mut self) {
        if self.state == SessionState::Listening {
            self.stop();
        }
        self.record.clear();
        self.assembler.clear();
        self.cursor = 0;
        self.recent.clear();
        self.live_transcript.clear();
        self.error = None;
        self.processing_lock = None;
        self.restart_at = None;
        self.state = SessionState::Idle;
        info!("🧹 Session reset");
    }

    /// Hand committed rows plus the current record to `submitter`.
    /// Returns `None` when there is nothing to send. On failure the rows are
    /// kept so the submit can be retried.
    pub async fn submit(
        &mut self,
        student: &str,
        submitter: &dyn RowSubmitter,
    ) -> TasmeeResult<Option<SubmitReceipt>> {
        let Some(batch) = self.assembler.pending_batch(&self.record) else {
            debug!("Nothing to submit");
            return Ok(None);
        };
        if student.trim().is_empty() {
            return Err(TasmeeError::Submission("student name is required".into()));
        }

        self.emit(SessionStatus::Sending);
        info!(
            "📤 Submitting {} row(s) for '{}' via {}",
            batch.len(),
            student,
            submitter.name()
        );

        match submitter.submit(student, &batch).await {
            Ok(receipt) => {
                info!("✅ Submitted {} row(s)", receipt.rows_added);
                self.assembler.clear();
                self.record.clear();
                self.cursor = 0;
                self.error = None;
                self.emit(SessionStatus::Success);
                Ok(Some(receipt))
            }
            Err(e) => {
                error!("❌ Submission failed: {:#}", e);
                self.error = Some(e.to_string());
                self.emit(SessionStatus::Error);
                Err(TasmeeError::Submission(e.to_string()))
            }
        }
    }

    /// Drive the session from an input channel until the channel closes or
    /// the session stops with no restart pending.
    pub async fn run(&mut self, mut inputs: UnboundedReceiver<SessionInput>) -> TasmeeResult<()> {
        loop {
            let restart_at = self.restart_at;
            let deadline = tokio::time::Instant::from_std(restart_at.unwrap_or_else(Instant::now));

            tokio::select! {
                input = inputs.recv() => match input {
                    Some(input) => {
                        if let Err(e) = self.handle_input(input, Instant::now()) {
                            if e.is_fatal() {
                                return Err(e);
                            }
                            warn!("⚠️ Session input failed: {}", e);
                        }
                    }
                    None => {
                        debug!("Session input channel closed");
                        break;
                    }
                },
                _ = tokio::time::sleep_until(deadline), if restart_at.is_some() => {
                    self.poll(Instant::now());
                }
            }

            if self.state == SessionState::Stopped && self.restart_at.is_none() {
                break;
            }
        }

        Ok(())
    }
}
