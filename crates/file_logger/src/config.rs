use std::path::PathBuf;
use std::time::Duration;

use crate::{LoggerError, Severity, UnknownLabel, DEFAULT_QUEUE_CAPACITY};

pub const DEFAULT_IDLE_INTERVAL: Duration = Duration::from_millis(500);
pub const DEFAULT_WRITE_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_millis(10);
pub const DEFAULT_MAX_RETRY_BACKOFF: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub min_severity: Severity,
    pub directory: PathBuf,
    /// Rotation threshold in bytes.
    pub max_file_size: u64,
    pub queue_capacity: usize,
    /// Longest the writer sleeps while the queue looks empty.
    pub idle_interval: Duration,
    /// Extra attempts after a failed write before the record is given up.
    pub write_retries: u32,
    pub retry_backoff: Duration,
    pub max_retry_backoff: Duration,
    pub unknown_label: UnknownLabel,
}

impl LoggerConfig {
    pub fn new(level: &str,
               directory: impl Into<PathBuf>,
               max_file_size: u64
    ) -> Result<Self, LoggerError> {
        Ok(LoggerConfig {
            min_severity: Severity::parse(level)?,
            directory: directory.into(),
            max_file_size,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            idle_interval: DEFAULT_IDLE_INTERVAL,
            write_retries: DEFAULT_WRITE_RETRIES,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
            max_retry_backoff: DEFAULT_MAX_RETRY_BACKOFF,
            unknown_label: UnknownLabel::default(),
        })
    }

    pub fn with_min_severity(mut self,
                             severity: Severity
    ) -> Self {
        self.min_severity = severity;
        self
    }

    pub fn with_queue_capacity(mut self,
                               capacity: usize
    ) -> Self {
        self.queue_capacity = capacity;
        self
    }

    pub fn with_idle_interval(mut self,
                              interval: Duration
    ) -> Self {
        self.idle_interval = interval;
        self
    }

    pub fn with_write_retries(mut self,
                              retries: u32
    ) -> Self {
        self.write_retries = retries;
        self
    }

    pub fn with_retry_backoff(mut self,
                              initial: Duration,
                              max: Duration
    ) -> Self {
        self.retry_backoff = initial;
        self.max_retry_backoff = max;
        self
    }

    pub fn with_unknown_label(mut self,
                              label: UnknownLabel
    ) -> Self {
        self.unknown_label = label;
        self
    }

    pub fn validate(&self) -> Result<(), LoggerError> {
        if self.min_severity == Severity::Unknown {
            return Err(LoggerError::InvalidLevel("unknown".to_string()));
        }
        if self.max_file_size == 0 {
            return Err(LoggerError::InvalidConfig("max_file_size must be greater than zero"));
        }
        if self.queue_capacity == 0 {
            return Err(LoggerError::InvalidConfig("queue_capacity must be greater than zero"));
        }
        if self.idle_interval.is_zero() {
            return Err(LoggerError::InvalidConfig("idle_interval must be greater than zero"));
        }
        if self.retry_backoff > self.max_retry_backoff {
            return Err(LoggerError::InvalidConfig("retry_backoff exceeds max_retry_backoff"));
        }
        Ok(())
    }
}
