//! Session logger: one file next to the settings file, **truncated at each
//! launch**, so it only ever holds output from the most recent session.
//!
//! Use the `log_info!` / `log_warn!` / `log_err!` macros anywhere in the crate.
//! Before `init()` runs (unit tests, library use) every call is a silent no-op.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::settings::AppSettings;

const LOG_FILE_NAME: &str = "pixelfe.log";

static LOG_FILE: OnceLock<Mutex<File>> = OnceLock::new();

fn append(line: &str) {
    if let Some(mutex) = LOG_FILE.get()
        && let Ok(mut file) = mutex.lock()
    {
        let _ = writeln!(file, "{}", line);
    }
}

/// Write a timestamped, level-tagged line. I/O errors are swallowed.
pub fn write(level: &str, msg: &str) {
    if LOG_FILE.get().is_some() {
        append(&format!("[{}] [{}] {}", timestamp(), level, msg));
    }
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        $crate::logger::write("INFO", &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        $crate::logger::write("WARN", &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_err {
    ($($arg:tt)*) => {
        $crate::logger::write("ERROR", &format!($($arg)*))
    };
}

/// Open (truncating) the session log and hook panics into it. Call once,
/// before the window opens.
pub fn init() {
    let path = log_file_path();
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }

    match OpenOptions::new().create(true).write(true).truncate(true).open(&path) {
        Ok(f) => {
            let _ = LOG_FILE.set(Mutex::new(f));
        }
        Err(e) => {
            eprintln!("[logger] Failed to open log file {:?}: {}", path, e);
            return;
        }
    }
    append(&format!("=== PixelFE session {} ===", path.display()));

    let prev = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        append(&format!("[{}] [PANIC] {}", timestamp(), info));
        prev(info);
    }));
}

fn log_file_path() -> PathBuf {
    AppSettings::settings_path()
        .and_then(|p| p.parent().map(|dir| dir.join(LOG_FILE_NAME)))
        .unwrap_or_else(|| std::env::temp_dir().join(LOG_FILE_NAME))
}

/// HH:MM:SS within the current UTC day.
fn timestamp() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| format_clock(d.as_secs()))
        .unwrap_or_else(|_| "??:??:??".to_string())
}

fn format_clock(secs: u64) -> String {
    let h = (secs % 86400) / 3600;
    let m = (secs % 3600) / 60;
    let s = secs % 60;
    format!("{:02}:{:02}:{:02}", h, m, s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_wraps_at_midnight() {
        assert_eq!(format_clock(0), "00:00:00");
        assert_eq!(format_clock(3661), "01:01:01");
        assert_eq!(format_clock(86400 + 59), "00:00:59");
    }

    #[test]
    fn log_sits_beside_settings() {
        let path = log_file_path();
        assert_eq!(path.file_name().and_then(|n| n.to_str()), Some(LOG_FILE_NAME));
        if let Some(settings) = AppSettings::settings_path() {
            assert_eq!(path.parent(), settings.parent());
        }
    }

    #[test]
    fn logging_before_init_is_silent() {
        log_info!("nothing to see {}", 1);
        log_err!("still nothing");
    }
}
