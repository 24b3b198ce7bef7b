//! Script replay recognizer
//!
//! Replays a transcript script as if it came from a live recognizer. Each
//! `start()` delivers one utterance followed by an end-of-recognition event,
//! the way a non-continuous platform recognizer behaves.
//!
//! Script lines:
//! - a JSON object is a [`RecognitionEvent`]
//! - `---` commits the current row
//! - `#` starts a comment
//! - any other line is a final result with full confidence

use super::{RecognitionEvent, RecognitionResult, Recognizer};
use crate::error::{TasmeeError, TasmeeResult};
use crate::session::{HostCommand, SessionInput};
use anyhow::Result;
use std::collections::VecDeque;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

/// Row separator line
const ADD_ROW_MARKER: &str = "---";

/// One parsed script line
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptStep {
    Event(RecognitionEvent),
    AddRow,
}

/// Parse a transcript script into steps
pub fn parse_script(text: &str) -> TasmeeResult<Vec<ScriptStep>> {
    let mut steps = Vec::new();

    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if line == ADD_ROW_MARKER {
            steps.push(ScriptStep::AddRow);
            continue;
        }
        if line.starts_with('{') {
            let event = serde_json::from_str(line).map_err(|e| TasmeeError::Script {
                line: idx + 1,
                reason: e.to_string(),
            })?;
            steps.push(ScriptStep::Event(event));
            continue;
        }
        steps.push(ScriptStep::Event(RecognitionEvent::Result(
            RecognitionResult::final_result(line, 1.0),
        )));
    }

    Ok(steps)
}

/// Group steps into the batches delivered per recognizer start.
/// A batch closes after a final result, an error or an explicit end.
fn into_batches(steps: Vec<ScriptStep>) -> VecDeque<Vec<SessionInput>> {
    let mut batches = VecDeque::new();
    let mut current = Vec::new();

    for step in steps {
        match step {
            ScriptStep::AddRow => current.push(SessionInput::Host(HostCommand::AddRow)),
            ScriptStep::Event(event) => {
                let closes = match &event {
                    RecognitionEvent::Result(r) => r.is_final,
                    RecognitionEvent::Error { .. } | RecognitionEvent::End => true,
                };
                current.push(SessionInput::Recognition(event));
                if closes {
                    batches.push_back(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        batches.push_back(current);
    }

    batches
}

/// Recognizer that feeds a script into the session input channel
pub struct ScriptRecognizer {
    batches: VecDeque<Vec<SessionInput>>,
    tx: Option<UnboundedSender<SessionInput>>,
    languages: Vec<String>,
}

impl ScriptRecognizer {
    /// `languages` lists the primary locale first, then alternatives
    pub fn new(
        steps: Vec<ScriptStep>,
        tx: UnboundedSender<SessionInput>,
        languages: Vec<String>,
    ) -> Self {
        Self {
            batches: into_batches(steps),
            tx: Some(tx),
            languages,
        }
    }

    /// Utterances not yet delivered
    pub fn remaining(&self) -> usize {
        self.batches.len()
    }
}

impl Recognizer for ScriptRecognizer {
    fn name(&self) -> &str {
        "script"
    }

    fn start(&mut self) -> Result<()> {
        let Some(tx) = self.tx.as_ref() else {
            anyhow::bail!("script recognizer already finished");
        };

        match self.batches.pop_front() {
            Some(batch) => {
                debug!(
                    "📜 Replaying utterance ({} inputs, {})",
                    batch.len(),
                    self.languages.join(",")
                );
                let ended = matches!(
                    batch.last(),
                    Some(SessionInput::Recognition(RecognitionEvent::End))
                );
                for input in batch {
                    tx.send(input)?;
                }
                if !ended {
                    tx.send(SessionInput::Recognition(RecognitionEvent::End))?;
                }
            }
            None => {
                debug!("📜 Script exhausted, closing input channel");
                self.tx = None;
            }
        }
        Ok(())
    }

    fn stop(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recognizer::RecognizerErrorCode;
    use tokio::sync::mpsc;

    const SCRIPT: &str = r#"
# first row
سورة البقرة من خمسة إلى عشرة انتهى
{"type":"result","transcript":"عشر","confidence":0.4,"is_final":false}
{"type":"result","transcript":"12/3 انتهى","confidence":0.9,"is_final":true}
---
{"type":"error","error":"no-speech"}
"#;

    #[test]
    fn test_parse_script() {
        let steps = parse_script(SCRIPT).expect("parse");
        assert_eq!(steps.len(), 5);
        assert_eq!(
            steps[0],
            ScriptStep::Event(RecognitionEvent::Result(RecognitionResult::final_result(
                "سورة البقرة من خمسة إلى عشرة انتهى",
                1.0
            )))
        );
        assert_eq!(steps[3], ScriptStep::AddRow);
        assert_eq!(
            steps[4],
            ScriptStep::Event(RecognitionEvent::Error {
                error: RecognizerErrorCode::NoSpeech
            })
        );
    }

    #[test]
    fn test_parse_script_reports_line() {
        let err = parse_script("ممتاز\n{broken").unwrap_err();
        match err {
            TasmeeError::Script { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_batches_split_on_finals() {
        let batches = into_batches(parse_script(SCRIPT).expect("parse"));
        assert_eq!(batches.len(), 3);
        assert_eq!(batches[0].len(), 1);
        // interim + final
        assert_eq!(batches[1].len(), 2);
        // add-row travels ahead of the next utterance
        assert_eq!(batches[2][0], SessionInput::Host(HostCommand::AddRow));
    }

    #[test]
    fn test_start_delivers_one_utterance_then_closes() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let steps = parse_script("ممتاز\nجيد").expect("parse");
        let mut recognizer = ScriptRecognizer::new(steps, tx, vec!["ar-JO".to_string()]);

        recognizer.start().expect("start");
        assert!(matches!(
            rx.try_recv(),
            Ok(SessionInput::Recognition(RecognitionEvent::Result(_)))
        ));
        assert_eq!(
            rx.try_recv().ok(),
            Some(SessionInput::Recognition(RecognitionEvent::End))
        );
        assert!(rx.try_recv().is_err());
        assert_eq!(recognizer.remaining(), 1);

        recognizer.start().expect("second utterance");
        recognizer.start().expect("exhausted start closes channel");
        assert!(recognizer.start().is_err());

        // drain second utterance, then the channel reports closed
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_ok());
        assert!(matches!(
            rx.try_recv(),
            Err(mpsc::error::TryRecvError::Disconnected)
        ));
    }
}
