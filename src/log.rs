use std::path::Path;

use anyhow::Result;
use time::format_description::well_known::Rfc3339;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_error::ErrorLayer;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Logs go to stderr and to `log_file`; stdout carries frame data only.
/// Keep the returned guard alive until the end of `main`.
pub fn init_logger(log_level: String, log_file: String) -> Result<WorkerGuard> {
    let path = Path::new(&log_file);
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let file_name = path
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("Invalid log file: {}", log_file))?;

    let file_appender = tracing_appender::rolling::never(directory, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_new(&log_level)?;

    let file_layer = fmt::layer()
        .with_timer(LocalTime::new(Rfc3339))
        .with_ansi(false)
        .with_writer(non_blocking);

    let stderr_layer = fmt::layer()
        .with_timer(LocalTime::new(Rfc3339))
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .with(ErrorLayer::default())
        .try_init()?;

    Ok(guard)
}
