//! Logging initialization.
//!
//! - **Production**: JSON logs to daily rolling files plus compact stdout
//! - **Development**: pretty stdout with span events
//!
//! The filter comes from `RUST_LOG`, then `RAILBOARD_LOG_LEVEL`, then `info`.

use std::path::PathBuf;
use std::sync::OnceLock;

use railboard_core::LoggingConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Fallback variable holding the filter directive.
pub const LOG_LEVEL_ENV: &str = "RAILBOARD_LOG_LEVEL";

const LOG_FILE_PREFIX: &str = "railboard";

/// Non-blocking writer guards; dropping them loses buffered lines.
static FILE_GUARD: OnceLock<WorkerGuard> = OnceLock::new();
static STDOUT_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Install the global subscriber described by `config`.
///
/// # Errors
///
/// Returns an error if the filter directive is invalid, the log directory
/// cannot be created, or a subscriber is already installed.
pub fn init(config: &LoggingConfig) -> anyhow::Result<()> {
    let filter = env_filter(std::env::var(LOG_LEVEL_ENV).ok().as_deref())?;

    if config.production {
        let directory = config.directory.clone().unwrap_or_else(log_directory);
        init_production(filter, directory)
    } else {
        init_development(filter)
    }
}

fn env_filter(fallback: Option<&str>) -> anyhow::Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    Ok(EnvFilter::try_new(fallback.unwrap_or("info"))?)
}

fn init_production(filter: EnvFilter, directory: PathBuf) -> anyhow::Result<()> {
    std::fs::create_dir_all(&directory)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &directory, LOG_FILE_PREFIX);
    let (file_writer, file_guard) = tracing_appender::non_blocking(file_appender);
    let (stdout_writer, stdout_guard) = tracing_appender::non_blocking(std::io::stdout());

    let file_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(file_writer)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    // journald adds its own timestamps and does not render ANSI
    let stdout_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_writer(stdout_writer)
        .with_target(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stdout_layer)
        .try_init()?;

    let _ = FILE_GUARD.set(file_guard);
    let _ = STDOUT_GUARD.set(stdout_guard);

    tracing::info!(directory = %directory.display(), "Logging to files");
    Ok(())
}

fn init_development(filter: EnvFilter) -> anyhow::Result<()> {
    let stdout_layer = tracing_subscriber::fmt::layer()
        .pretty()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE);

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .try_init()?;

    Ok(())
}

/// Platform log directory.
fn log_directory() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        PathBuf::from("/var/log/railboard")
    }
    #[cfg(not(target_os = "linux"))]
    {
        directories::ProjectDirs::from("", "", "railboard")
            .map(|dirs| dirs.data_dir().join("logs"))
            .unwrap_or_else(|| PathBuf::from("./logs"))
    }
}
