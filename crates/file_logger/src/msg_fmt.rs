use std::fmt;
use chrono::{DateTime, Local};

use crate::{CallSite, Severity, UnknownLabel};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One logged event. Built once on the producer side and moved through the
/// queue to the writer; never modified in between.
#[derive(Debug, Clone)]
pub struct LogRecord {
    pub(crate) severity: Severity,
    pub(crate) message: String,
    pub(crate) site: CallSite,
    pub(crate) timestamp: DateTime<Local>,
}

impl LogRecord {
    pub fn new(severity: Severity,
               message: String,
               site: CallSite
    ) -> Self {
        LogRecord {
            severity,
            message,
            site,
            timestamp: Local::now(),
        }
    }

    pub fn with_timestamp(mut self,
                          timestamp: DateTime<Local>
    ) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn site(&self) -> &CallSite {
        &self.site
    }

    pub fn timestamp(&self) -> DateTime<Local> {
        self.timestamp
    }

    /// `[<timestamp>] [<LEVEL>] [<file>: <function>: <line>] <message>`,
    /// without the trailing newline.
    pub fn render(&self,
                  unknown: UnknownLabel
    ) -> String {
        format!("[{}] [{}] [{}: {}: {}] {}",
                self.timestamp.format(TIMESTAMP_FORMAT),
                self.severity.display_name(unknown),
                self.site.file,
                self.site.function,
                self.site.line,
                self.message
        )
    }
}

impl fmt::Display for LogRecord {
    fn fmt(&self,
           f: &mut fmt::Formatter
    ) -> fmt::Result {
        f.write_str(&self.render(UnknownLabel::default()))
    }
}
