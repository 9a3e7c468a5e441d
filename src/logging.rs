use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Configuration for the logging system
pub struct LogConfig {
    /// Directory where log files will be stored
    pub log_dir: PathBuf,
    /// Prefix for log file names
    pub file_prefix: String,
    /// Maximum number of log files to keep (rotation)
    pub max_files: usize,
    /// Default filter directive, used when RUST_LOG is not set
    pub level: String,
    /// Whether to add the JSON file layer
    pub log_to_file: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        let log_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("wintoast")
            .join("logs");

        Self {
            log_dir,
            file_prefix: "wintoast".to_string(),
            max_files: 5,
            level: "info".to_string(),
            log_to_file: false,
        }
    }
}

/// Initialize the logging system with stdout and optional file output
///
/// # Log Targets
/// - `toast::manager` - initialization, show and hide
/// - `toast::shortcut` - Start-Menu shortcut checks
/// - `toast::events` - forwarded activation, dismissal and failure events
/// - `toast::backend` - platform calls
/// - `toast::config` - configuration loading
/// - `main` - demo lifecycle
///
/// # Example
/// ```bash
/// RUST_LOG=toast::manager=debug,toast::events=trace wintoast-demo --line hello
/// ```
pub fn init_logging(config: LogConfig) -> Result<LogGuard> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .context("Invalid log level")?;

    let mut worker_guard = None;
    let file_layer = if config.log_to_file {
        std::fs::create_dir_all(&config.log_dir).context("Failed to create log directory")?;

        let file_appender = tracing_appender::rolling::RollingFileAppender::builder()
            .rotation(tracing_appender::rolling::Rotation::DAILY)
            .filename_prefix(&config.file_prefix)
            .filename_suffix("log")
            .max_log_files(config.max_files)
            .build(&config.log_dir)
            .context("Failed to create file appender")?;

        // The guard must outlive every log call or buffered lines are lost
        let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);
        worker_guard = Some(guard);

        Some(
            fmt::layer()
                .json()
                .with_writer(non_blocking_file)
                .with_target(true)
                .with_thread_ids(true)
                .with_thread_names(true)
                .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE)
                .with_filter(env_filter.clone()),
        )
    } else {
        None
    };

    let stdout_layer = fmt::layer()
        .compact()
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true)
        .with_ansi(true)
        .with_filter(env_filter);

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stdout_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    tracing::info!(
        target: "main",
        log_dir = %config.log_dir.display(),
        log_to_file = config.log_to_file,
        max_files = config.max_files,
        "Logging system initialized"
    );

    Ok(LogGuard {
        _worker_guard: worker_guard,
    })
}

/// Guard that ensures logs are flushed before exit
pub struct LogGuard {
    _worker_guard: Option<tracing_appender::non_blocking::WorkerGuard>,
}

impl Drop for LogGuard {
    fn drop(&mut self) {
        tracing::info!(target: "main", "Flushing logs before shutdown");
    }
}
