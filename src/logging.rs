//! Logging initialization
use std::{error::Error, fs::OpenOptions, path::Path, sync::Mutex};

use clap::ArgEnum;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Log level argument
#[derive(Debug, Clone, Copy, PartialEq, Eq, ArgEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

/// Where log lines end up
pub enum LogTarget<'a> {
    /// The terminal belongs to the UI, nothing is logged
    Disabled,
    Stderr,
    File(&'a Path),
}

fn env_filter(level: LogLevel) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(Level::from(level).as_str()))
}

/// Installs the global tracing subscriber. `RUST_LOG` takes precedence over `level`.
pub fn init_logging(target: LogTarget, level: LogLevel) -> Result<(), Box<dyn Error>> {
    let builder = tracing_subscriber::fmt().with_env_filter(env_filter(level));
    match target {
        LogTarget::Disabled => Ok(()),
        LogTarget::Stderr => builder
            .with_writer(std::io::stderr)
            .try_init()
            .map_err(|e| e as Box<dyn Error>),
        LogTarget::File(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
                .map_err(|e| e as Box<dyn Error>)
        }
    }
}
