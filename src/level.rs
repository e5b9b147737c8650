//! Severity levels understood by hooks and loggers.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
    Panic,
}

/// Error returned when a level name cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown log level: {0}")]
pub struct ParseLevelError(pub String);

impl Default for Level {
    fn default() -> Self {
        Self::Info
    }
}

impl Level {
    /// Every level, from least to most severe.
    pub const ALL: [Level; 7] = [
        Level::Trace,
        Level::Debug,
        Level::Info,
        Level::Warn,
        Level::Error,
        Level::Fatal,
        Level::Panic,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Level::Trace => "TRACE",
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::Fatal => "FATAL",
            Level::Panic => "PANIC",
        }
    }

    /// Lower-case name used by the text and JSON formatters.
    pub fn as_lower_str(self) -> &'static str {
        match self {
            Level::Trace => "trace",
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warning",
            Level::Error => "error",
            Level::Fatal => "fatal",
            Level::Panic => "panic",
        }
    }
}

impl From<Level> for u8 {
    fn from(level: Level) -> Self {
        level as u8
    }
}

impl TryFrom<u8> for Level {
    type Error = ParseLevelError;

    fn try_from(value: u8) -> Result<Self, ParseLevelError> {
        Level::ALL
            .get(usize::from(value))
            .copied()
            .ok_or_else(|| ParseLevelError(value.to_string()))
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "TRACE" => Ok(Self::Trace),
            "DEBUG" => Ok(Self::Debug),
            "INFO" => Ok(Self::Info),
            "WARN" | "WARNING" => Ok(Self::Warn),
            "ERROR" => Ok(Self::Error),
            "FATAL" | "CRITICAL" => Ok(Self::Fatal),
            "PANIC" => Ok(Self::Panic),
            _ => Err(ParseLevelError(s.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("trace", Level::Trace)]
    #[case("Debug", Level::Debug)]
    #[case("INFO", Level::Info)]
    #[case("warning", Level::Warn)]
    #[case(" error ", Level::Error)]
    #[case("critical", Level::Fatal)]
    #[case("panic", Level::Panic)]
    fn parses_level_names(#[case] input: &str, #[case] expected: Level) {
        assert_eq!(input.parse::<Level>(), Ok(expected));
    }

    #[test]
    fn rejects_unknown_names() {
        let err = "verbose".parse::<Level>().expect_err("unknown level");
        assert_eq!(err.to_string(), "unknown log level: verbose");
    }

    #[test]
    fn u8_round_trip_covers_all_levels() {
        for level in Level::ALL {
            assert_eq!(Level::try_from(u8::from(level)), Ok(level));
        }
        assert!(Level::try_from(7).is_err());
    }

    #[test]
    fn levels_are_ordered_by_severity() {
        assert!(Level::Trace < Level::Info);
        assert!(Level::Error < Level::Panic);
    }
}
