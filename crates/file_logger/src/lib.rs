mod logger; pub use logger::*;
mod logger_macro;

pub mod call_site;
mod config;
mod error;
mod level;
mod msg_fmt;
mod queue;
mod sink;
mod stats;
mod writer;

pub use call_site::CallSite;
pub use config::*;
pub use error::LoggerError;
pub use level::{display_name, Severity, UnknownLabel};
pub use msg_fmt::{LogRecord, TIMESTAMP_FORMAT};
pub use queue::{RecordQueue, DEFAULT_QUEUE_CAPACITY};
pub use sink::{log_file_name, ConsoleSink, LogSink, RotatingSink, FILE_EXTENSION, FILE_NAME_FORMAT};
pub use stats::{Diagnostic, LoggerStats, ShutdownReport};
