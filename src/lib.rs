//! Tasmee Library
//!
//! Voice entry of Quran memorization records: interprets a stream of
//! recognized Arabic speech into nine-field rows and submits them to a
//! student's sheet.

pub mod assembler;
pub mod audit;
pub mod config;
pub mod core;
pub mod error;
pub mod recognizer;
pub mod record;
pub mod schema;
pub mod session;
pub mod status;
pub mod submit;

pub use error::{TasmeeError, TasmeeResult};
pub use session::{EventOutcome, HostCommand, SessionInput, SessionState, VoiceSession};
