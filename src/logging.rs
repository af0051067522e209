use std::fs;
use std::path::PathBuf;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the logging system with daily-rotated file output and a
/// simplified console layer.
pub fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let log_dir = get_log_directory()?;
    fs::create_dir_all(&log_dir)?;

    let file_appender = rolling::Builder::new()
        .rotation(rolling::Rotation::DAILY)
        .filename_prefix("wren")
        .filename_suffix("log")
        .build(&log_dir)
        .map_err(|e| format!("Failed to create rolling file appender: {}", e))?;
    let (non_blocking_appender, guard) = non_blocking(file_appender);

    // Console layer for development - message only
    let console_layer = fmt::layer()
        .with_target(false)
        .with_level(false)
        .with_ansi(true)
        .without_time();

    // File layer with structured format
    let file_layer = fmt::layer()
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(false)
        .with_writer(non_blocking_appender);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,wren=debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    tracing::info!("Logging system initialized");
    tracing::info!("Log directory: {}", log_dir.display());

    // Keep the non-blocking writer alive for the life of the process
    std::mem::forget(guard);

    Ok(())
}

/// Get the application's log directory
fn get_log_directory() -> Result<PathBuf, Box<dyn std::error::Error>> {
    let home_dir = std::env::var("USERPROFILE")
        .or_else(|_| std::env::var("HOME"))
        .map_err(|_| "Failed to get user home directory")?;

    Ok(PathBuf::from(home_dir).join(".wren").join("logs"))
}
