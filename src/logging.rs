//! Tracing setup. `RUST_LOG` wins over the configured level.

use std::fs;
use std::io;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// Where log lines go.
pub enum LogTarget {
    /// Standard error, for CLI commands.
    Stderr,
    /// `<data_dir>/tasksync.log`, for the TUI which owns the terminal.
    File,
}

/// Installs the global subscriber. Keep the returned guard alive until exit
/// so buffered file output gets flushed.
pub fn init(config: &Config, target: LogTarget) -> io::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("tasksync={}", config.log_level)));

    match target {
        LogTarget::Stderr => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::stderr)
                .with_target(false)
                .try_init();
            Ok(None)
        }
        LogTarget::File => {
            fs::create_dir_all(&config.data_dir)?;
            let appender = tracing_appender::rolling::never(&config.data_dir, config.log_file_name());
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .try_init();
            Ok(Some(guard))
        }
    }
}
