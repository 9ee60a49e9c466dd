//! Per-run file logger behind the `log` facade.
//!
//! Each run writes `<UTC timestamp> | <LEVEL> | <target> | <message>` lines to
//! `<dir>/<YYYYMMDD_HHMMSS>_log.txt`. Error records flush immediately.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

use log::{Level, LevelFilter, Log, Metadata, Record};
use time::OffsetDateTime;

use crate::AppError;

static RUN_LOG_PATH: OnceLock<PathBuf> = OnceLock::new();

/// File-backed [`Log`] implementation.
#[derive(Debug)]
pub struct RunLogger {
    file: Mutex<File>,
    path: PathBuf,
    level: LevelFilter,
}

impl RunLogger {
    /// Creates a fresh log file inside `dir`.
    ///
    /// # Errors
    /// Returns [`AppError::Logging`] when the file cannot be created.
    pub fn create(dir: &Path, level: LevelFilter) -> Result<Self, AppError> {
        let path = dir.join(format!("{}_log.txt", timestamp_compact_utc()));
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|error| {
                AppError::Logging(format!("unable to create log file '{}': {error}", path.display()))
            })?;

        Ok(Self {
            file: Mutex::new(file),
            path,
            level,
        })
    }

    /// Log file location.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Log for RunLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let line = format_log_line(
            &timestamp_compact_utc(),
            record.level(),
            record.target(),
            &record.args().to_string(),
        );
        if let Ok(mut file) = self.file.lock() {
            let _ = file.write_all(line.as_bytes());
            if record.level() == Level::Error {
                let _ = file.flush();
            }
        }
    }

    fn flush(&self) {
        if let Ok(mut file) = self.file.lock() {
            let _ = file.flush();
        }
    }
}

/// Installs a [`RunLogger`] writing into `dir` as the global logger.
///
/// Repeated calls return the already installed log path.
///
/// # Errors
/// Returns [`AppError::Logging`] when the file cannot be created or another
/// logger is already installed.
pub fn init_run_logger(dir: &Path) -> Result<PathBuf, AppError> {
    if let Some(path) = RUN_LOG_PATH.get() {
        return Ok(path.clone());
    }

    let logger = RunLogger::create(dir, LevelFilter::Debug)?;
    let path = logger.path().to_path_buf();
    log::set_logger(Box::leak(Box::new(logger)))
        .map_err(|error| AppError::Logging(error.to_string()))?;
    log::set_max_level(LevelFilter::Debug);
    let _ = RUN_LOG_PATH.set(path.clone());
    log::info!("stage=logging action=file_created log_file={}", path.display());
    Ok(path)
}

/// Formats one log line, newline included.
pub fn format_log_line(timestamp: &str, level: Level, target: &str, message: &str) -> String {
    format!("{timestamp} | {level} | {target} | {message}\n")
}

fn timestamp_compact_utc() -> String {
    let now = OffsetDateTime::now_utc();
    format!(
        "{:04}{:02}{:02}_{:02}{:02}{:02}",
        now.year(),
        now.month() as u8,
        now.day(),
        now.hour(),
        now.minute(),
        now.second()
    )
}
