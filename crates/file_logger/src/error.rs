use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::ShutdownReport;

#[derive(Error, Debug)]
pub enum LoggerError {
    #[error("Invalid log level: {0:?}")]
    InvalidLevel(String),

    #[error("Invalid logger configuration: {0}")]
    InvalidConfig(&'static str),

    #[error("Failed to open log file {}", path.display())]
    SinkOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write to log file {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to spawn log writer thread")]
    Spawn(#[source] io::Error),

    #[error("Log writer thread panicked")]
    WorkerPanicked,

    /// `close` failed after the writer stopped; `report` still holds the
    /// final counters.
    #[error("Logger shutdown failed")]
    Shutdown {
        report: ShutdownReport,
        #[source]
        source: Box<LoggerError>,
    },
}
