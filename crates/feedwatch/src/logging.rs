//! Daily log files.

use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};

pub const LOG_FILE_PREFIX: &str = "feedwatch";
pub const LOG_FILE_SUFFIX: &str = "log";

/// Non-blocking writer appending to `<dir>/feedwatch.<YYYY-MM-DD>.log`.
///
/// The file rolls over at midnight UTC. Buffered lines are flushed when the
/// returned guard is dropped, so keep it alive for the life of the process.
pub fn daily_file_writer(dir: &Path) -> Result<(NonBlocking, WorkerGuard)> {
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix(LOG_FILE_SUFFIX)
        .build(dir)
        .with_context(|| format!("Failed to open log directory {}", dir.display()))?;

    Ok(tracing_appender::non_blocking(appender))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;

    #[test]
    fn test_writes_dated_file() {
        let dir = tempfile::tempdir().unwrap();
        let (mut writer, guard) = daily_file_writer(dir.path()).unwrap();

        writer.write_all(b"cycle complete\n").unwrap();
        drop(guard);

        let names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names.len(), 1);

        let today = chrono::Utc::now().format("%Y-%m-%d").to_string();
        assert_eq!(names[0], format!("feedwatch.{today}.log"));
        assert_eq!(
            fs::read_to_string(dir.path().join(&names[0])).unwrap(),
            "cycle complete\n"
        );
    }
}
