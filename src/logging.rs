//! Tracing setup
//!
//! Console output plus an append-only log file on the shared volume. The
//! file is never rotated.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing::Subscriber;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Timestamp format for log lines, e.g. `17/10/2026 03:04:05 PM`
pub const LOG_TIME_FORMAT: &str = "%d/%m/%Y %I:%M:%S %p";

/// `TraceLayer` emits its request spans and events at DEBUG
pub(crate) const DEFAULT_FILTER: &str = "classr=info,tower_http=debug";

/// Initialize the global subscriber
///
/// When `log_file` is given, lines are appended to it in addition to the
/// console.
pub fn init(log_file: Option<&Path>) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let console = tracing_subscriber::fmt::layer()
        .with_timer(ChronoLocal::new(LOG_TIME_FORMAT.to_string()));

    let file = log_file.map(file_layer).transpose()?;

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file)
        .try_init()?;

    Ok(())
}

/// Plain-text layer appending to `path`, creating its parent directory
pub(crate) fn file_layer<S>(path: &Path) -> Result<impl Layer<S>>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create log directory {}", dir.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    Ok(tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_target(false)
        .with_timer(ChronoLocal::new(LOG_TIME_FORMAT.to_string()))
        .with_writer(Mutex::new(file)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn log_once(path: &Path, message: &str) {
        let subscriber = tracing_subscriber::registry().with(file_layer(path).unwrap());
        tracing::subscriber::with_default(subscriber, || tracing::info!("{}", message));
    }

    #[test]
    fn test_file_layer_appends_plain_timestamped_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("inference.log");

        log_once(&path, "first entry");
        log_once(&path, "second entry");

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(!content.contains('\u{1b}'));

        for (line, message) in lines.iter().zip(["first entry", "second entry"]) {
            let (stamp, rest) = line.split_at(22);
            NaiveDateTime::parse_from_str(stamp, LOG_TIME_FORMAT).unwrap();
            assert!(rest.trim_start().starts_with("INFO"), "{}", line);
            assert!(rest.ends_with(message), "{}", line);
        }
    }
}
