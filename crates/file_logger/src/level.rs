use std::fmt;
use std::str::FromStr;

use crate::LoggerError;

/// Ordered log importance. A higher ordinal is more severe.
///
/// `Unknown` only exists as a sentinel for ordinals that do not name a
/// level; [`Severity::parse`] never returns it.
#[derive(Debug, Eq, PartialEq, PartialOrd, Ord, Clone, Copy, Hash)]
#[repr(u8)]
pub enum Severity {
    Unknown = 0,
    Debug,
    Trace,
    Info,
    Warning,
    Error,
    Fatal,
}

/// Label printed for a severity ordinal that does not name a level.
#[derive(Debug, Default, Eq, PartialEq, Clone, Copy)]
pub enum UnknownLabel {
    /// Legacy behaviour: unknown ordinals are printed as `DEBUG`.
    #[default]
    Debug,
    Unknown,
}

impl Severity {
    pub const ALL: [Severity; 6] = [
        Severity::Debug,
        Severity::Trace,
        Severity::Info,
        Severity::Warning,
        Severity::Error,
        Severity::Fatal,
    ];

    /// Case-insensitive lookup of one of
    /// `debug`, `trace`, `info`, `warning`, `error`, `fatal`.
    pub fn parse(name: &str) -> Result<Self, LoggerError> {
        match name.to_lowercase().as_str() {
            "debug" => Ok(Severity::Debug),
            "trace" => Ok(Severity::Trace),
            "info" => Ok(Severity::Info),
            "warning" => Ok(Severity::Warning),
            "error" => Ok(Severity::Error),
            "fatal" => Ok(Severity::Fatal),
            _ => Err(LoggerError::InvalidLevel(name.to_string())),
        }
    }

    pub fn from_ordinal(ordinal: u8) -> Self {
        match ordinal {
            1 => Severity::Debug,
            2 => Severity::Trace,
            3 => Severity::Info,
            4 => Severity::Warning,
            5 => Severity::Error,
            6 => Severity::Fatal,
            _ => Severity::Unknown,
        }
    }

    pub fn ordinal(self) -> u8 {
        self as u8
    }

    pub fn display_name(self,
                        unknown: UnknownLabel
    ) -> &'static str {
        match self {
            Severity::Debug => "DEBUG",
            Severity::Trace => "TRACE",
            Severity::Info => "Info",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
            Severity::Fatal => "FATAL",
            Severity::Unknown => match unknown {
                UnknownLabel::Debug => "DEBUG",
                UnknownLabel::Unknown => "UNKNOWN",
            },
        }
    }
}

/// Label for a raw ordinal, e.g. one read back from an external source.
pub fn display_name(ordinal: u8,
                    unknown: UnknownLabel
) -> &'static str {
    Severity::from_ordinal(ordinal).display_name(unknown)
}

impl FromStr for Severity {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Severity::parse(s)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self,
           f: &mut fmt::Formatter<'_>
    ) -> fmt::Result {
        f.write_str(self.display_name(UnknownLabel::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(Severity::parse("INFO").unwrap(), Severity::Info);
        assert_eq!(Severity::parse("Warning").unwrap(), Severity::Warning);
        assert_eq!("fAtAl".parse::<Severity>().unwrap(), Severity::Fatal);
    }

    #[test]
    fn parse_rejects_unknown_names() {
        for name in ["", "warn", "unknown", "information", " info"] {
            match Severity::parse(name) {
                Err(LoggerError::InvalidLevel(got)) => assert_eq!(got, name),
                other => panic!("expected InvalidLevel for {name:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn parse_never_yields_unknown() {
        for severity in Severity::ALL {
            let name = format!("{:?}", severity);
            assert_eq!(Severity::parse(&name).unwrap(), severity);
        }
    }

    #[test]
    fn ordering_follows_ordinals() {
        assert!(Severity::Unknown < Severity::Debug);
        assert!(Severity::Debug < Severity::Trace);
        assert!(Severity::Trace < Severity::Info);
        assert!(Severity::Error < Severity::Fatal);
        for severity in Severity::ALL {
            assert_eq!(Severity::from_ordinal(severity.ordinal()), severity);
        }
    }

    #[test]
    fn unknown_ordinals_fall_back_to_debug_by_default() {
        assert_eq!(display_name(0, UnknownLabel::default()), "DEBUG");
        assert_eq!(display_name(42, UnknownLabel::Debug), "DEBUG");
        assert_eq!(display_name(42, UnknownLabel::Unknown), "UNKNOWN");
        assert_eq!(display_name(5, UnknownLabel::Unknown), "ERROR");
    }
}
