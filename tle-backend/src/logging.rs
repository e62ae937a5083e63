use anyhow::Context;
use std::{
    fs,
    path::{Path, PathBuf},
    time::{Duration, SystemTime},
};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, filter::LevelFilter, fmt, prelude::*};

/// Keeps the file writer flushing; drop it at the end of `main`
#[allow(dead_code)]
pub struct LoggerGuard(WorkerGuard);

const SECONDS_PER_DAY: u64 = 60 * 60 * 24;

pub fn init_logging(
    log_dir: impl AsRef<Path>,
    prefix: &str,
    level: &str,
    retention_days: u64,
) -> anyhow::Result<LoggerGuard> {
    let log_dir = log_dir.as_ref();

    let (level, invalid_level) = match level.parse::<LevelFilter>() {
        Ok(level) => (level, false),
        Err(_) => (LevelFilter::INFO, true),
    };

    let builder = EnvFilter::builder().with_default_directive(level.into());
    let rust_log = std::env::var("RUST_LOG").unwrap_or_default();
    let console_filter = builder.clone().parse_lossy(&rust_log);
    let file_filter = builder.parse_lossy(&rust_log);

    fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory {:?}", log_dir))?;
    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(prefix)
        .filename_suffix("log")
        .build(log_dir)
        .context("Failed to create file appender")?;
    let (non_blocking, guard) = NonBlocking::new(file_appender);

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_filter(file_filter);
    let stdout_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_ansi(true)
        .with_filter(console_filter);

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stdout_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    if invalid_level {
        tracing::warn!("Invalid log level, defaulting to 'info'");
    }

    let retention = Duration::from_secs(retention_days * SECONDS_PER_DAY);
    match prune_logs(log_dir, prefix, retention) {
        Ok(removed) if !removed.is_empty() => {
            tracing::info!("Pruned {} log files older than {} days", removed.len(), retention_days)
        }
        Ok(_) => {}
        Err(e) => tracing::warn!("Failed to delete old log file: {}", e),
    }

    Ok(LoggerGuard(guard))
}

fn is_log_file(path: &Path, prefix: &str) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|name| name.starts_with(prefix) && name.ends_with(".log"))
}

/// Delete `{prefix}*.log` files not modified within `retention`.
/// Returns the deleted paths.
pub fn prune_logs(log_dir: &Path, prefix: &str, retention: Duration) -> std::io::Result<Vec<PathBuf>> {
    let cutoff = SystemTime::now()
        .checked_sub(retention)
        .unwrap_or(SystemTime::UNIX_EPOCH);

    let expired: Vec<PathBuf> = fs::read_dir(log_dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| is_log_file(path, prefix))
        .filter(|path| {
            fs::metadata(path)
                .and_then(|m| m.modified())
                .is_ok_and(|modified| modified < cutoff)
        })
        .collect();

    for path in &expired {
        fs::remove_file(path)?;
        tracing::info!("Old log file deleted: {:?}", path);
    }
    Ok(expired)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_prune_only_expired_prefixed_logs() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        fs::write(dir.join("tle-backend.2026-01-01.log"), "old").unwrap();
        fs::write(dir.join("other.log"), "x").unwrap();
        fs::write(dir.join("tle-backend.notes"), "x").unwrap();

        let removed = prune_logs(dir, "tle-backend", Duration::from_secs(3600)).unwrap();
        assert!(removed.is_empty());

        std::thread::sleep(Duration::from_millis(1100));
        let removed = prune_logs(dir, "tle-backend", Duration::from_millis(500)).unwrap();
        assert_eq!(removed, vec![dir.join("tle-backend.2026-01-01.log")]);
        assert!(dir.join("other.log").exists());
        assert!(dir.join("tle-backend.notes").exists());
    }
}
