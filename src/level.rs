//! Log severities.
//!
//! # Design Decisions
//! - Levels carry no filtering semantics; every driver sees every event
//! - Declaration order is display order only

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity attached to every log event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warn,
    Error,
    Fault,
    Debug,
}

impl LogLevel {
    /// All levels in display order.
    pub const ALL: [LogLevel; 5] = [
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
        LogLevel::Fault,
        LogLevel::Debug,
    ];

    /// Lowercase display name.
    pub fn name(self) -> &'static str {
        match self {
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Fault => "fault",
            LogLevel::Debug => "debug",
        }
    }

    /// Uppercase label used by the console driver.
    pub fn label(self) -> &'static str {
        match self {
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Fault => "FAULT",
            LogLevel::Debug => "DEBUG",
        }
    }

    /// Type byte understood by os_log style native facilities.
    pub fn native_type(self) -> u8 {
        match self {
            LogLevel::Warn => 0x00,
            LogLevel::Info => 0x01,
            LogLevel::Debug => 0x02,
            LogLevel::Error => 0x10,
            LogLevel::Fault => 0x11,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_and_labels() {
        assert_eq!(LogLevel::Fault.name(), "fault");
        assert_eq!(LogLevel::Error.label(), "ERROR");
        assert_eq!(LogLevel::Warn.to_string(), "warn");
    }

    #[test]
    fn test_native_types_are_distinct() {
        let mut types: Vec<u8> = LogLevel::ALL.iter().map(|l| l.native_type()).collect();
        types.sort_unstable();
        types.dedup();
        assert_eq!(types.len(), LogLevel::ALL.len());
    }

    #[test]
    fn test_serde_lowercase() {
        let level: LogLevel = serde_json::from_str("\"debug\"").unwrap();
        assert_eq!(level, LogLevel::Debug);
        assert_eq!(serde_json::to_string(&LogLevel::Info).unwrap(), "\"info\"");
    }
}
