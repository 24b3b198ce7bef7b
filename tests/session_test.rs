use std::time::Duration;
use tasmee::config::{Config, DeviceClass};
use tasmee::core::CoercionContext;
use tasmee::recognizer::script::parse_script;
use tasmee::recognizer::{RecognitionEvent, RecognizerErrorCode, ScriptRecognizer};
use tasmee::schema::{DATE_COL, FIELD_COUNT, PAGES_COL, PLAN_COL, STUDENT_LISTEN_COL};
use tasmee::session::IgnoreReason;
use tasmee::status::{SessionStatus, PERMISSION_MESSAGE, RESTART_FAILED_MESSAGE, UNSUPPORTED_MESSAGE};
use tasmee::{EventOutcome, HostCommand, SessionInput, SessionState, TasmeeError, VoiceSession};
use tokio::sync::mpsc;

mod common;
use common::mock_recognizer::MockRecognizer;
use common::mock_submitter::MockSubmitter;
use common::TestSession;

fn listening(device: DeviceClass) -> TestSession {
    let mut t = TestSession::new(device);
    t.session.start().expect("start");
    t
}

/// Move the cursor to the page count field
fn to_pages_field(t: &mut TestSession) {
    t.say("التالي");
    t.say("كمل");
    assert_eq!(t.session.cursor(), PAGES_COL);
}

/// Move the cursor to the first checkbox field
fn to_checkbox_field(t: &mut TestSession) {
    to_pages_field(t);
    t.say("خلص");
    assert_eq!(t.session.cursor(), STUDENT_LISTEN_COL);
}

#[test]
fn test_checkbox_answers_survive_cleaning() {
    let answers = [
        ("نعم", "TRUE"),
        ("اه", "TRUE"),
        ("أه", "TRUE"),
        ("ايوا", "TRUE"),
        ("أيوا", "TRUE"),
        ("صح", "TRUE"),
        ("تمام", "TRUE"),
        ("لا", "FALSE"),
        ("لم", "FALSE"),
        ("لم يتم", "FALSE"),
        ("ما تم", "FALSE"),
        ("لسا", "FALSE"),
        ("لسه", "FALSE"),
    ];

    for (answer, expected) in answers {
        let mut t = listening(DeviceClass::Desktop);
        to_checkbox_field(&mut t);

        let outcome = t.say(&format!("{} انتهى", answer));
        assert_eq!(
            outcome,
            EventOutcome::Applied {
                fields: vec![STUDENT_LISTEN_COL],
                advances: 1
            },
            "answer {:?}",
            answer
        );
        assert_eq!(
            t.session.record().get(STUDENT_LISTEN_COL),
            Some(expected),
            "answer {:?}",
            answer
        );
        assert_eq!(t.session.cursor(), STUDENT_LISTEN_COL + 1);
    }
}

#[test]
fn test_bare_affirmative_at_checkbox() {
    let mut t = listening(DeviceClass::Desktop);
    to_checkbox_field(&mut t);

    assert_eq!(
        t.say("امم أه"),
        EventOutcome::Applied {
            fields: vec![STUDENT_LISTEN_COL],
            advances: 0
        }
    );
    assert_eq!(t.session.record().get(STUDENT_LISTEN_COL), Some("TRUE"));
    assert_eq!(t.session.cursor(), STUDENT_LISTEN_COL);
}

#[test]
fn test_nan_confidence_final_is_dropped() {
    let mut t = listening(DeviceClass::Desktop);

    assert_eq!(
        t.final_result("ممتاز", f32::NAN),
        EventOutcome::Ignored(IgnoreReason::LowConfidence)
    );
    assert!(t.session.record().is_blank());
}

#[test]
fn test_low_confidence_final_is_dropped() {
    let mut t = listening(DeviceClass::Desktop);
    to_pages_field(&mut t);

    let outcome = t.final_result("عشرين", 0.5);
    assert_eq!(outcome, EventOutcome::Ignored(IgnoreReason::LowConfidence));
    assert_eq!(t.session.record().get(PAGES_COL), Some(""));
    assert_eq!(t.session.cursor(), PAGES_COL);
}

#[test]
fn test_configured_threshold_only_tightens() {
    let config = Config {
        min_confidence: 0.9,
        ..Config::default()
    };
    let mut t = TestSession::with_config(&config);
    t.session.start().expect("start");

    assert_eq!(
        t.final_result("ممتاز", 0.8),
        EventOutcome::Ignored(IgnoreReason::LowConfidence)
    );

    let config = Config {
        min_confidence: 0.1,
        ..Config::default()
    };
    let mut t = TestSession::with_config(&config);
    t.session.start().expect("start");
    assert_eq!(
        t.final_result("ممتاز", 0.6),
        EventOutcome::Ignored(IgnoreReason::LowConfidence)
    );
}

#[test]
fn test_duplicate_final_applied_once() {
    let mut t = listening(DeviceClass::Desktop);

    assert!(matches!(t.say("سورة الملك"), EventOutcome::Applied { .. }));
    // same text once fillers and stutter are cleaned away
    assert_eq!(
        t.say("امم سورة سورة الملك"),
        EventOutcome::Ignored(IgnoreReason::Duplicate)
    );
    assert_eq!(t.session.record().get(PLAN_COL), Some("سورة الملك"));
}

#[test]
fn test_spoken_row_add_row_and_submit() {
    let mut t = listening(DeviceClass::Desktop);
    to_pages_field(&mut t);

    let outcome = t.say("عشرين صفحة انتهى");
    assert_eq!(
        outcome,
        EventOutcome::Applied {
            fields: vec![PAGES_COL],
            advances: 1
        }
    );
    assert_eq!(t.session.record().get(PAGES_COL), Some("20"));
    assert_eq!(t.session.cursor(), PAGES_COL + 1);

    t.session.add_row();
    assert_eq!(t.session.rows().len(), 1);
    assert!(t.session.record().is_blank());
    assert_eq!(t.session.cursor(), 0);

    let submitter = MockSubmitter::new();
    let receipt = tokio_test::block_on(t.session.submit("أحمد", &submitter))
        .expect("submit")
        .expect("receipt");
    assert_eq!(receipt.rows_added, 1);

    let submitted = submitter.submitted();
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0].0, "أحمد");
    assert_eq!(submitted[0].1.len(), 1);
    assert_eq!(submitted[0].1[0][PAGES_COL], "20");

    assert!(t.session.rows().is_empty());
    assert_eq!(
        t.statuses().last().copied(),
        Some(SessionStatus::Success)
    );
}

#[test]
fn test_whole_row_spoken_field_by_field() {
    let mut t = listening(DeviceClass::Desktop);

    t.say("سورة البقرة من خمسة إلى عشرة انتهى");
    t.say("١٢/٣ انتهى");
    t.say("ثلاثة انتهى");
    t.say("نعم انتهى");
    t.say("لم يتم انتهى");
    t.say("لسه انتهى");
    t.say("اثنين انتهى");
    t.say("جيد جداً انتهى");
    t.say("حفظ متقن");

    let record = t.session.record();
    assert_eq!(record.get(PLAN_COL), Some("سورة البقرة (5-10)"));
    assert_eq!(record.get(DATE_COL), Some("12/3/2024"));
    assert_eq!(record.get(PAGES_COL), Some("3"));
    assert_eq!(record.get(3), Some("TRUE"));
    assert_eq!(record.get(4), Some("FALSE"));
    assert_eq!(record.get(5), Some("FALSE"));
    assert_eq!(record.get(6), Some("2"));
    assert_eq!(record.get(7), Some("جيد جدا"));
    assert_eq!(record.get(8), Some("حفظ متقن"));
    assert_eq!(t.session.cursor(), 8);
}

#[test]
fn test_processing_lock_blocks_rapid_finals() {
    let mut t = listening(DeviceClass::Desktop);

    assert!(matches!(
        t.final_result("ممتاز", 0.95),
        EventOutcome::Applied { .. }
    ));
    t.advance(100);
    assert_eq!(
        t.final_result("جيد", 0.95),
        EventOutcome::Ignored(IgnoreReason::Locked)
    );
    t.advance(450);
    assert!(matches!(
        t.final_result("جيد", 0.95),
        EventOutcome::Applied { .. }
    ));
}

#[test]
fn test_restart_drops_processing_lock() {
    let mut t = listening(DeviceClass::Desktop);

    t.final_result("ممتاز", 0.95);
    assert_eq!(
        t.event(RecognitionEvent::End),
        EventOutcome::RestartScheduled
    );

    t.advance(20);
    assert!(!t.session.poll(t.clock));
    t.advance(30);
    assert!(t.session.poll(t.clock));
    assert_eq!(t.starts(), 2);

    // still inside the old instance's lock window
    assert!(matches!(
        t.final_result("جيد", 0.95),
        EventOutcome::Applied { .. }
    ));
}

#[test]
fn test_recoverable_errors_ignored() {
    let mut t = listening(DeviceClass::Desktop);

    for code in [
        RecognizerErrorCode::NoSpeech,
        RecognizerErrorCode::Aborted,
        RecognizerErrorCode::Network,
        RecognizerErrorCode::AudioCapture,
    ] {
        assert_eq!(
            t.event(RecognitionEvent::Error { error: code }),
            EventOutcome::Ignored(IgnoreReason::Recoverable)
        );
    }
    assert_eq!(t.session.state(), SessionState::Listening);
    assert!(t.session.error().is_none());
}

#[test]
fn test_permission_error_stops_session() {
    let mut t = listening(DeviceClass::Desktop);

    let outcome = t.event(RecognitionEvent::Error {
        error: RecognizerErrorCode::NotAllowed,
    });
    assert_eq!(outcome, EventOutcome::Fatal(PERMISSION_MESSAGE.to_string()));
    assert_eq!(t.session.state(), SessionState::Stopped);
    assert_eq!(t.session.error(), Some(PERMISSION_MESSAGE));
    assert_eq!(t.statuses().last().copied(), Some(SessionStatus::Error));

    // no auto-restart, late results discarded
    assert_eq!(
        t.event(RecognitionEvent::End),
        EventOutcome::Ignored(IgnoreReason::NotListening)
    );
    assert!(t.session.restart_at().is_none());
    assert_eq!(
        t.final_result("ممتاز", 0.99),
        EventOutcome::Ignored(IgnoreReason::NotListening)
    );
    assert!(t.session.record().is_blank());
}

#[test]
fn test_stop_cancels_pending_restart() {
    let mut t = listening(DeviceClass::Desktop);

    t.event(RecognitionEvent::End);
    assert!(t.session.restart_at().is_some());

    t.session.stop();
    assert!(t.session.restart_at().is_none());
    t.advance(500);
    assert!(!t.session.poll(t.clock));
    assert_eq!(t.starts(), 1);
    assert_eq!(t.stops(), 1);
    assert_eq!(t.statuses().last().copied(), Some(SessionStatus::Processing));
}

#[test]
fn test_restart_failure_stops_session() {
    let mut t = listening(DeviceClass::Desktop);

    t.event(RecognitionEvent::End);
    *t.fail_start.lock().unwrap() = true;
    t.advance(50);

    assert!(!t.session.poll(t.clock));
    assert_eq!(t.session.state(), SessionState::Stopped);
    assert_eq!(t.session.error(), Some(RESTART_FAILED_MESSAGE));
}

#[test]
fn test_unsupported_environment() {
    let mut t = TestSession::with_recognizer(MockRecognizer::unsupported(), &Config::default());

    let err = t.session.start().unwrap_err();
    assert!(matches!(err, TasmeeError::Unsupported));
    assert_eq!(t.session.error(), Some(UNSUPPORTED_MESSAGE));
    assert_eq!(t.statuses(), vec![SessionStatus::Unsupported]);
    assert_eq!(t.starts(), 0);
}

#[test]
fn test_mobile_throttles_interim_updates() {
    let mut t = listening(DeviceClass::Mobile);

    assert_eq!(t.interim("سورة"), EventOutcome::Interim);
    t.advance(100);
    assert_eq!(
        t.interim("سورة البقرة"),
        EventOutcome::Ignored(IgnoreReason::Throttled)
    );
    assert_eq!(t.session.live_transcript(), "سورة");
    t.advance(250);
    assert_eq!(t.interim("سورة البقرة من"), EventOutcome::Interim);
    assert_eq!(t.session.live_transcript(), "سورة البقرة من");
}

#[test]
fn test_desktop_interim_unthrottled() {
    let mut t = listening(DeviceClass::Desktop);

    assert_eq!(t.interim("سورة"), EventOutcome::Interim);
    assert_eq!(t.interim("سورة البقرة"), EventOutcome::Interim);
    assert_eq!(t.session.live_transcript(), "سورة البقرة");
}

#[test]
fn test_mobile_stops_after_final_and_restarts_later() {
    let mut t = listening(DeviceClass::Mobile);

    t.final_result("ممتاز", 0.95);
    assert_eq!(t.stops(), 1);

    t.event(RecognitionEvent::End);
    t.advance(100);
    assert!(!t.session.poll(t.clock));
    t.advance(100);
    assert!(t.session.poll(t.clock));
    assert_eq!(t.starts(), 2);
}

#[test]
fn test_add_row_on_blank_record_commits_snapshot() {
    let mut t = listening(DeviceClass::Desktop);
    to_pages_field(&mut t);

    t.session.add_row();
    assert_eq!(t.session.rows().len(), 1);
    assert_eq!(t.session.rows()[0], vec![String::new(); FIELD_COUNT]);
    assert_eq!(t.session.cursor(), 0);

    // the blank current record is left out, the committed blank row is not
    assert_eq!(t.session.pending_batch().map(|b| b.len()), Some(1));

    t.say("سورة يس");
    t.session.add_row();
    assert_eq!(t.session.rows().len(), 2);
    assert_eq!(t.session.rows()[1][PLAN_COL], "سورة يس");
}

#[test]
fn test_failed_submit_keeps_rows() {
    let mut t = listening(DeviceClass::Desktop);
    t.say("سورة يس");
    t.session.add_row();
    t.say("سورة الملك");

    let submitter = MockSubmitter::failing("Sheet not found");
    let err = tokio_test::block_on(t.session.submit("أحمد", &submitter)).unwrap_err();
    assert!(matches!(err, TasmeeError::Submission(_)));

    assert_eq!(t.session.rows().len(), 1);
    assert_eq!(t.session.record().get(PLAN_COL), Some("سورة الملك"));
    assert_eq!(t.session.error(), Some("Sheet not found"));
    assert_eq!(
        t.statuses()[t.statuses().len() - 2..],
        [SessionStatus::Sending, SessionStatus::Error]
    );

    // retry sends committed rows plus the current record
    let submitter = MockSubmitter::new();
    tokio_test::block_on(t.session.submit("أحمد", &submitter)).expect("retry");
    assert_eq!(submitter.submitted()[0].1.len(), 2);
}

#[test]
fn test_empty_submit_is_noop() {
    let mut t = listening(DeviceClass::Desktop);
    let submitter = MockSubmitter::new();

    let receipt = tokio_test::block_on(t.session.submit("أحمد", &submitter)).expect("submit");
    assert!(receipt.is_none());
    assert!(submitter.submitted().is_empty());
}

#[test]
fn test_reset_clears_everything() {
    let mut t = listening(DeviceClass::Desktop);
    t.say("سورة يس");
    t.session.add_row();
    t.say("سورة الملك انتهى");

    t.session.reset();
    assert_eq!(t.session.state(), SessionState::Idle);
    assert!(t.session.rows().is_empty());
    assert!(t.session.record().is_blank());
    assert_eq!(t.session.cursor(), 0);
    assert_eq!(t.stops(), 1);

    // recent window was cleared too
    t.session.start().expect("restart");
    assert!(matches!(t.say("سورة يس"), EventOutcome::Applied { .. }));
}

#[tokio::test]
async fn test_run_loop_with_host_commands() {
    let mut t = TestSession::new(DeviceClass::Desktop);
    let (tx, rx) = mpsc::unbounded_channel();

    tx.send(SessionInput::Host(HostCommand::Start)).unwrap();
    tx.send(SessionInput::Recognition(RecognitionEvent::Result(
        tasmee::recognizer::RecognitionResult::final_result(
            "سورة البقرة من خمسة إلى عشرة انتهى",
            0.9,
        ),
    )))
    .unwrap();
    tx.send(SessionInput::Host(HostCommand::AddRow)).unwrap();
    tx.send(SessionInput::Host(HostCommand::Stop)).unwrap();

    tokio::time::timeout(Duration::from_secs(5), t.session.run(rx))
        .await
        .expect("run loop should finish")
        .expect("run");

    assert_eq!(t.session.state(), SessionState::Stopped);
    assert_eq!(t.session.rows().len(), 1);
    assert_eq!(t.session.rows()[0][PLAN_COL], "سورة البقرة (5-10)");
}

#[tokio::test]
async fn test_run_loop_replays_script_with_restarts() {
    let script = "\
سورة البقرة من خمسة إلى عشرة انتهى
12/3 انتهى
{\"type\":\"result\",\"transcript\":\"عشر\",\"is_final\":false}
عشرين صفحة انتهى
{\"type\":\"error\",\"error\":\"no-speech\"}
{\"type\":\"result\",\"transcript\":\"نعم\",\"confidence\":0.3,\"is_final\":true}
---
سورة آل عمران من ١ إلى ٢٠
";
    let config = Config {
        restart_delay_ms: Some(1),
        ..Config::default()
    };
    let (tx, rx) = mpsc::unbounded_channel();
    let recognizer =
        ScriptRecognizer::new(parse_script(script).expect("parse"), tx, config.languages());
    let mut session = VoiceSession::new(Box::new(recognizer), &config)
        .with_context(CoercionContext::with_year(2024));

    session.start().expect("start");
    tokio::time::timeout(Duration::from_secs(5), session.run(rx))
        .await
        .expect("run loop should finish")
        .expect("run");

    let rows = session.rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0][PLAN_COL], "سورة البقرة (5-10)");
    assert_eq!(rows[0][DATE_COL], "12/3/2024");
    assert_eq!(rows[0][PAGES_COL], "20");
    assert_eq!(rows[0][3], "");

    assert_eq!(
        session.record().get(PLAN_COL),
        Some("سورة آل عمران (1-20)")
    );
    assert_eq!(session.pending_batch().map(|b| b.len()), Some(2));
}

#[tokio::test]
async fn test_run_loop_stops_on_permission_error() {
    let mut t = TestSession::new(DeviceClass::Desktop);
    let (tx, rx) = mpsc::unbounded_channel();

    tx.send(SessionInput::Host(HostCommand::Start)).unwrap();
    tx.send(SessionInput::Recognition(RecognitionEvent::Error {
        error: RecognizerErrorCode::NotAllowed,
    }))
    .unwrap();
    // never reached
    tx.send(SessionInput::Recognition(RecognitionEvent::Result(
        tasmee::recognizer::RecognitionResult::final_result("ممتاز", 0.9),
    )))
    .unwrap();

    let err = tokio::time::timeout(Duration::from_secs(5), t.session.run(rx))
        .await
        .expect("run loop should finish")
        .unwrap_err();

    match err {
        TasmeeError::PermissionDenied(message) => assert_eq!(message, PERMISSION_MESSAGE),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(t.session.state(), SessionState::Stopped);
    assert!(t.session.record().is_blank());
}
