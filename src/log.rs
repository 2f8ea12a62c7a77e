//! Leveled file logging for mai.
//!
//! Lines are appended to `~/.mai/mai.log` as `[HH:MM:SS.mmm] [LEVEL] message`.
//! The file is truncated when [`init_with_debug`] runs. Until then every call
//! is a no-op, so library consumers and tests produce no output.
//!
//! Dispatch attempts, backoff delays and classification results are logged
//! at DEBUG; the underlying cause of a failed workflow is logged at ERROR.
//!
//! Debug mode is enabled with `--debug` or `MAI_DEBUG=1`; `MAI_DEBUG=trace`
//! also logs request and response bodies.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::OnceLock;

static LOG_PATH: OnceLock<PathBuf> = OnceLock::new();
static LOG_LEVEL: AtomicU8 = AtomicU8::new(LogLevel::Info as u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    Error = 0,
    Warn = 1,
    Info = 2,
    Debug = 3,
    Trace = 4,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
            LogLevel::Trace => "TRACE",
        }
    }

    fn from_u8(v: u8) -> Self {
        match v {
            0 => LogLevel::Error,
            1 => LogLevel::Warn,
            2 => LogLevel::Info,
            3 => LogLevel::Debug,
            _ => LogLevel::Trace,
        }
    }
}

/// Level selected by the `--debug` flag and the `MAI_DEBUG` value.
///
/// `MAI_DEBUG=trace` enables TRACE; `1` or `true` (or `--debug`) enables DEBUG.
fn level_for(debug: bool, env_value: Option<&str>) -> LogLevel {
    match env_value.map(str::trim) {
        Some(v) if v.eq_ignore_ascii_case("trace") => LogLevel::Trace,
        Some(v) if v == "1" || v.eq_ignore_ascii_case("true") => LogLevel::Debug,
        _ if debug => LogLevel::Debug,
        _ => LogLevel::Info,
    }
}

/// Initialize logging from `--debug` and `MAI_DEBUG`.
pub fn init_with_debug(debug: bool) {
    let env_value = std::env::var("MAI_DEBUG").ok();
    let level = level_for(debug, env_value.as_deref());
    LOG_LEVEL.store(level as u8, Ordering::SeqCst);

    if let Some(mai_dir) = dirs::home_dir().map(|h| h.join(".mai")) {
        let _ = std::fs::create_dir_all(&mai_dir);
        let path = mai_dir.join("mai.log");
        let _ = std::fs::write(&path, "");
        LOG_PATH.set(path).ok();
    }
}

pub fn get_level() -> LogLevel {
    LogLevel::from_u8(LOG_LEVEL.load(Ordering::Relaxed))
}

/// Whether a message at `level` would be written.
pub fn enabled(level: LogLevel) -> bool {
    LOG_PATH.get().is_some() && level <= get_level()
}

/// Path of the active log file, if logging was initialized.
pub fn path() -> Option<&'static PathBuf> {
    LOG_PATH.get()
}

pub fn log_at(level: LogLevel, msg: &str) {
    if !enabled(level) {
        return;
    }

    if let Some(path) = LOG_PATH.get() {
        if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(path) {
            let timestamp = chrono::Local::now().format("%H:%M:%S%.3f");
            let _ = writeln!(file, "[{}] [{}] {}", timestamp, level.as_str(), msg);
        }
    }
}

pub fn error(msg: &str) {
    log_at(LogLevel::Error, msg);
}

pub fn warn(msg: &str) {
    log_at(LogLevel::Warn, msg);
}

pub fn info(msg: &str) {
    log_at(LogLevel::Info, msg);
}

pub fn debug(msg: &str) {
    log_at(LogLevel::Debug, msg);
}

pub fn trace(msg: &str) {
    log_at(LogLevel::Trace, msg);
}

/// Log at INFO level.
#[macro_export]
macro_rules! mlog {
    ($($arg:tt)*) => {
        $crate::log::info(&format!($($arg)*))
    };
}

#[macro_export]
macro_rules! mlog_error {
    ($($arg:tt)*) => {
        $crate::log::error(&format!($($arg)*))
    };
}

#[macro_export]
macro_rules! mlog_warn {
    ($($arg:tt)*) => {
        $crate::log::warn(&format!($($arg)*))
    };
}

#[macro_export]
macro_rules! mlog_debug {
    ($($arg:tt)*) => {
        $crate::log::debug(&format!($($arg)*))
    };
}

/// Log at TRACE level (request and response bodies). Arguments are only
/// evaluated when TRACE is enabled.
#[macro_export]
macro_rules! mlog_trace {
    ($($arg:tt)*) => {
        if $crate::log::enabled($crate::log::LogLevel::Trace) {
            $crate::log::trace(&format!($($arg)*))
        }
    };
}
