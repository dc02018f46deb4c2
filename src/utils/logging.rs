//! Logging system initialization
//!
//! Stdout carries the bridge reply, so log output goes to stderr unless a log
//! directory is configured. With a log directory, each run writes a fresh
//! `installed-apps.log` and earlier runs are shifted to `installed-apps.log.1`,
//! `.2`, ... up to `max_files`.

use crate::config::LoggingConfig;
use crate::error::{AppListerError, Result};
use std::path::{Path, PathBuf};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt};

const LOG_PREFIX: &str = "installed-apps";
const LOG_SUFFIX: &str = "log";

/// Initialize the logging system
///
/// The level comes from `config.level` unless `RUST_LOG` is set.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let installed = match &config.log_dir {
        Some(log_dir) => {
            std::fs::create_dir_all(log_dir)?;
            let log_path = log_dir.join(format!("{LOG_PREFIX}.{LOG_SUFFIX}"));
            rotate_logs_on_startup(&log_path, config.max_files)?;

            // Rotation is handled above, once per run
            let file_appender = RollingFileAppender::builder()
                .rotation(Rotation::NEVER)
                .filename_prefix(LOG_PREFIX)
                .filename_suffix(LOG_SUFFIX)
                .build(log_dir)
                .map_err(|e| AppListerError::ConfigError(Box::new(e)))?;

            let subscriber = fmt()
                .with_writer(file_appender)
                .with_env_filter(filter)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .finish();
            tracing::subscriber::set_global_default(subscriber)
        }
        None => {
            let subscriber = fmt()
                .with_writer(std::io::stderr)
                .with_env_filter(filter)
                .with_target(true)
                .finish();
            tracing::subscriber::set_global_default(subscriber)
        }
    };
    installed.map_err(|e| AppListerError::ConfigError(Box::new(e)))?;

    tracing::debug!("installed-apps v{} logging initialized", env!("CARGO_PKG_VERSION"));
    Ok(())
}

/// Shift previous session logs up by one and retire the oldest
///
/// `<log>` becomes `<log>.1`, `<log>.1` becomes `<log>.2`, and so on. Anything that
/// would land beyond `<log>.{max_files}` is deleted. With `max_files == 0` the
/// previous log is simply removed.
fn rotate_logs_on_startup(log_path: &Path, max_files: u8) -> Result<()> {
    if !log_path.exists() {
        return Ok(());
    }

    if max_files == 0 {
        std::fs::remove_file(log_path)?;
        return Ok(());
    }

    let numbered = |n: u8| {
        let mut name = log_path.as_os_str().to_owned();
        name.push(format!(".{n}"));
        PathBuf::from(name)
    };

    let oldest = numbered(max_files);
    if oldest.exists() {
        std::fs::remove_file(&oldest)?;
    }

    for n in (1..max_files).rev() {
        let from = numbered(n);
        if from.exists() {
            std::fs::rename(&from, numbered(n + 1))?;
        }
    }

    std::fs::rename(log_path, numbered(1))?;
    Ok(())
}
