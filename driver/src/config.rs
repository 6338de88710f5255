use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use file_logger::{LoggerConfig, LoggerError, DEFAULT_IDLE_INTERVAL, DEFAULT_QUEUE_CAPACITY};
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read config file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Malformed config file")]
    Parse(#[from] serde_json::Error),

    #[error("Unknown log target {0:?}")]
    UnknownTarget(String),

    #[error(transparent)]
    Logger(#[from] LoggerError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    File,
    Console,
}

pub struct Config {
    pub logger: LoggerConfig,
    pub target: LogTarget,
    /// `None` runs until the process is killed.
    pub iterations: Option<u64>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawConfig {
    logging: LoggingSection,
    demo: DemoSection,
}

#[derive(Deserialize)]
#[serde(default, rename_all = "kebab-case")]
struct LoggingSection {
    log_level: String,
    log_target: String,
    directory: PathBuf,
    max_file_size: u64,
    queue_capacity: usize,
    idle_interval_ms: u64,
}

impl Default for LoggingSection {
    fn default() -> Self {
        LoggingSection {
            log_level: "info".to_string(),
            log_target: "file".to_string(),
            directory: PathBuf::from("./"),
            max_file_size: 10 * 1024,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            idle_interval_ms: DEFAULT_IDLE_INTERVAL.as_millis() as u64,
        }
    }
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct DemoSection {
    iterations: Option<u64>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Config::parse(&raw)
    }

    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = serde_json::from_str(raw)?;
        let logging = raw.logging;

        let target = match logging.log_target.to_lowercase().as_str() {
            "file" => LogTarget::File,
            "console" => LogTarget::Console,
            _ => return Err(ConfigError::UnknownTarget(logging.log_target)),
        };

        let logger = LoggerConfig::new(&logging.log_level, logging.directory, logging.max_file_size)?
            .with_queue_capacity(logging.queue_capacity)
            .with_idle_interval(Duration::from_millis(logging.idle_interval_ms));
        logger.validate()?;

        Ok(Config {
            logger,
            target,
            iterations: raw.demo.iterations,
        })
    }
}
