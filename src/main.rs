//! Tasmee - Voice entry of Quran memorization records
//!
//! Replays recognizer transcripts through a voice session and submits the
//! resulting rows.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tasmee::audit;
use tasmee::config::{Config, DeviceClass};
use tasmee::core::{clean, coerce, interpret, words_to_digits, CoercionContext};
use tasmee::recognizer::script::parse_script;
use tasmee::recognizer::ScriptRecognizer;
use tasmee::schema::{self, FIELDS};
use tasmee::status::SessionStatus;
use tasmee::submit::{create_submitter, sheet::column_for};
use tasmee::VoiceSession;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Config file (defaults to the user config directory)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay a transcript script through a voice session and submit the rows
    Replay {
        /// Transcript script: JSON event lines, plain lines, `---` to add a row
        #[arg(long, value_name = "FILE")]
        script: PathBuf,

        /// Student whose sheet receives the rows
        #[arg(long)]
        student: String,

        /// Device class the recognizer runs on
        #[arg(long, value_enum)]
        device: Option<DeviceClass>,

        /// Post rows to this sheet backend
        #[arg(long, value_name = "URL", conflicts_with = "output")]
        backend: Option<String>,

        /// Append rows to this JSON-lines file
        #[arg(long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Print the rows instead of submitting them
        #[arg(long)]
        dry_run: bool,
    },

    /// Clean an utterance and show its number and segment forms
    Normalize { text: String },

    /// Coerce an utterance for one field
    Coerce {
        /// Field index (0-8)
        #[arg(long)]
        field: usize,
        text: String,
    },

    /// Print the field schema
    Schema,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    // Setup logging: RUST_LOG wins, then --verbose, then config
    let default_level = if args.verbose {
        "debug".to_string()
    } else {
        config.log_level.to_lowercase()
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match args.command {
        Command::Replay {
            script,
            student,
            device,
            backend,
            output,
            dry_run,
        } => {
            if let Some(device) = device {
                config.device_class = device;
            }
            if let Some(url) = backend {
                config.submitter = "http".to_string();
                config.backend_url = url;
            }
            if let Some(path) = output {
                config.submitter = "file".to_string();
                config.output_path = path.to_string_lossy().to_string();
            }
            replay(&config, &script, &student, dry_run).await
        }
        Command::Normalize { text } => {
            let cleaned = clean(&text);
            println!("cleaned:  {}", cleaned);
            println!("numbers:  {}", words_to_digits(&cleaned));
            println!("segments: {:?}", interpret(&cleaned));
            Ok(())
        }
        Command::Coerce { field, text } => {
            let kind = schema::kind_at(field)
                .with_context(|| format!("No field at index {}", field))?;
            println!("{}", coerce(kind, &clean(&text), &CoercionContext::today()));
            Ok(())
        }
        Command::Schema => {
            for field in FIELDS.iter() {
                let kind = serde_json::to_string(&field.kind)?;
                println!(
                    "{} {} {:<22} {}",
                    field.index,
                    column_for(field.index).unwrap_or('?'),
                    field.name,
                    kind.trim_matches('"')
                );
            }
            Ok(())
        }
    }
}

async fn replay(config: &Config, script: &Path, student: &str, dry_run: bool) -> Result<()> {
    info!("🕌 Tasmee v{} starting replay...", env!("CARGO_PKG_VERSION"));

    let text = std::fs::read_to_string(script)
        .with_context(|| format!("Failed to read script {}", script.display()))?;
    let steps = parse_script(&text)?;
    info!("📜 Loaded {} script steps from {}", steps.len(), script.display());

    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
    let recognizer = ScriptRecognizer::new(steps, tx, config.languages());
    let mut session = VoiceSession::new(Box::new(recognizer), config)
        .on_status(Box::new(|status: SessionStatus| info!("📣 Status: {}", status)));

    session.start()?;
    // a fatal recognizer error still leaves the collected rows to submit
    if let Err(e) = session.run(rx).await {
        warn!("⚠️ Session stopped: {}", e);
    } else if let Some(message) = session.error() {
        warn!("⚠️ Session ended with error: {}", message);
    }

    let Some(batch) = session.pending_batch() else {
        info!("💡 Nothing was recorded");
        return Ok(());
    };

    if dry_run {
        for row in &batch {
            println!("{}", serde_json::to_string(row)?);
        }
        return Ok(());
    }

    let submitter = create_submitter(config)?;
    let audit_path = audit::audit_path();
    match session.submit(student, submitter.as_ref()).await {
        Ok(Some(receipt)) => {
            if let Err(e) = audit::log_submission(
                &audit_path,
                student,
                submitter.name(),
                batch.len(),
                Ok(receipt.rows_added),
            ) {
                warn!("Failed to write audit log: {}", e);
            }
            println!("{}", receipt.message);
            if let Some(url) = receipt.sheet_url {
                println!("{}", url);
            }
            Ok(())
        }
        Ok(None) => Ok(()),
        Err(e) => {
            let reason = e.to_string();
            if let Err(log_err) = audit::log_submission(
                &audit_path,
                student,
                submitter.name(),
                batch.len(),
                Err(&reason),
            ) {
                warn!("Failed to write audit log: {}", log_err);
            }
            Err(e.into())
        }
    }
}
