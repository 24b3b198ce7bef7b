use anyhow::Result;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Default audit log location (respecting XDG)
pub fn audit_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from(".config"))
        .join("tasmee")
        .join("audit.log")
}

/// Append a timestamped entry to the log at `path`
pub fn log_to(path: &Path, entry: &str) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;

    writeln!(
        file,
        "[{}] {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        entry
    )?;
    Ok(())
}

/// Record a submission attempt and its result
pub fn log_submission(
    path: &Path,
    student: &str,
    submitter: &str,
    rows: usize,
    result: std::result::Result<usize, &str>,
) -> Result<()> {
    let entry = match result {
        Ok(added) => format!(
            "SUBMIT student='{}' via={} rows={} added={}",
            student, submitter, rows, added
        ),
        Err(reason) => format!(
            "SUBMIT FAILED student='{}' via={} rows={} | REASON: {}",
            student, submitter, rows, reason
        ),
    };
    log_to(path, &entry)
}
