use std::io;
use std::fs;
use std::path::{Path, PathBuf};

use time::macros::format_description;
use time::UtcOffset;
use tracing_subscriber::{self, fmt, prelude::*};
use tracing_appender::non_blocking::WorkerGuard;

const LOG_RETENTION_DAYS: u64 = 7;
const LOG_PREFIX: &str = "session-";
const LOG_SUFFIX: &str = ".log";

/// Get the log directory path in the user-specific OS cache directory
/// - Linux: ~/.cache/hanami-language-server/
/// - macOS: ~/Library/Caches/hanami-language-server/
/// - Windows: %LOCALAPPDATA%\hanami-language-server\
fn get_log_dir() -> io::Result<PathBuf> {
    let cache_dir = dirs::cache_dir()
        .ok_or_else(|| io::Error::new(
            io::ErrorKind::NotFound,
            "Unable to determine user cache directory"
        ))?;
    log_dir_in(&cache_dir)
}

fn log_dir_in(cache_dir: &Path) -> io::Result<PathBuf> {
    let log_dir = cache_dir.join(env!("CARGO_PKG_NAME"));
    fs::create_dir_all(&log_dir)?;
    Ok(log_dir)
}

fn is_session_log(name: &str) -> bool {
    name.starts_with(LOG_PREFIX) && name.ends_with(LOG_SUFFIX)
}

/// Clean up session logs older than LOG_RETENTION_DAYS. Other files are left alone.
fn cleanup_old_logs(log_dir: &Path) -> io::Result<usize> {
    let now = std::time::SystemTime::now();
    let retention = std::time::Duration::from_secs(LOG_RETENTION_DAYS * 24 * 60 * 60);
    let mut removed = 0;

    for entry in fs::read_dir(log_dir)?.flatten() {
        let Ok(metadata) = entry.metadata() else { continue };
        if !metadata.is_file() {
            continue;
        }
        let name = entry.file_name();
        if !name.to_str().is_some_and(is_session_log) {
            continue;
        }
        let expired = metadata
            .modified()
            .ok()
            .and_then(|modified| now.duration_since(modified).ok())
            .is_some_and(|age| age > retention);
        if expired {
            match fs::remove_file(entry.path()) {
                Ok(()) => removed += 1,
                Err(e) => eprintln!("Failed to remove old log file {:?}: {}", entry.path(), e),
            }
        }
    }

    Ok(removed)
}

/// Session identifier used in the log file name: UTC timestamp plus PID.
fn session_id() -> io::Result<String> {
    let timestamp = time::OffsetDateTime::now_utc()
        .format(format_description!("[year][month][day]-[hour][minute][second]"))
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    Ok(format!("{}-{}", timestamp, std::process::id()))
}

/// Subscribers can only be installed once per process; a second attempt is not an error.
fn tolerate_already_set(result: Result<(), tracing_subscriber::util::TryInitError>) -> io::Result<()> {
    match result {
        Ok(()) => Ok(()),
        Err(e) if e.to_string().contains("already been set") || e.to_string().contains("SetLoggerError") => Ok(()),
        Err(e) => Err(io::Error::new(io::ErrorKind::Other, e)),
    }
}

/// Initialize logger with stderr and (optionally) file output
/// Returns a WorkerGuard that must be kept alive for the duration of the program
///
/// # Arguments
/// * `no_color` - Disable ANSI colors in stderr output
/// * `log_level` - Override log level (otherwise uses RUST_LOG or defaults to "info")
/// * `enable_file_logging` - Enable the per-session log file (disable for tests)
///
/// # Logging Behavior
/// - **Stderr**: Logs at the configured level (default "info"). Stdout carries the protocol and is never logged to.
/// - **Session File**: Logs at DEBUG level, including every resolution stage
pub fn init_logger(no_color: bool, log_level: Option<&str>, enable_file_logging: bool) -> io::Result<WorkerGuard> {
    let timer = fmt::time::OffsetTime::new(
        UtcOffset::UTC,
        format_description!("[[[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z]"),
    );

    let stderr_filter = match log_level {
        Some(level) => tracing_subscriber::EnvFilter::new(level),
        None => tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
    };

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_timer(timer.clone())
        .with_ansi(!no_color)
        .with_filter(stderr_filter);

    if !enable_file_logging {
        let (_, guard) = tracing_appender::non_blocking(std::io::sink());
        tolerate_already_set(tracing_subscriber::registry().with(stderr_layer).try_init())?;
        return Ok(guard);
    }

    let log_dir = get_log_dir()?;
    let removed = cleanup_old_logs(&log_dir)?;
    if removed > 0 {
        eprintln!("Removed {} old log file(s) from {:?}", removed, log_dir);
    }

    let log_path = log_dir.join(format!("{}{}{}", LOG_PREFIX, session_id()?, LOG_SUFFIX));
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);
    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_timer(timer)
        .with_ansi(false)
        .with_filter(tracing_subscriber::EnvFilter::new("debug"));

    tolerate_already_set(
        tracing_subscriber::registry()
            .with(stderr_layer)
            .with(file_layer)
            .try_init(),
    )?;
    eprintln!("Logging to file: {:?}", log_path);
    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_log_dir_is_created() {
        let cache = TempDir::new().unwrap();
        let dir = log_dir_in(cache.path()).unwrap();
        assert!(dir.is_dir());
        assert_eq!(dir.file_name().unwrap(), env!("CARGO_PKG_NAME"));
        // Idempotent
        assert_eq!(log_dir_in(cache.path()).unwrap(), dir);
    }

    #[test]
    fn test_cleanup_keeps_fresh_and_foreign_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("session-20260101-000000-1.log"), "fresh").unwrap();
        fs::write(dir.path().join("notes.txt"), "keep").unwrap();
        fs::create_dir(dir.path().join("session-dir.log")).unwrap();

        assert_eq!(cleanup_old_logs(dir.path()).unwrap(), 0);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 3);
    }

    #[test]
    fn test_session_log_names() {
        assert!(is_session_log("session-20260101-000000-42.log"));
        assert!(!is_session_log("wire-20260101-000000-42.log"));
        assert!(!is_session_log("session-20260101.txt"));

        let id = session_id().unwrap();
        assert!(id.ends_with(&format!("-{}", std::process::id())));
        assert_eq!(id.split('-').next().unwrap().len(), 8);
    }

    #[test]
    fn test_init_logger_twice_is_tolerated() {
        assert!(init_logger(true, Some("warn"), false).is_ok());
        assert!(init_logger(true, Some("warn"), false).is_ok());
    }
}
