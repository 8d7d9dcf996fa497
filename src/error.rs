//! Error types.
//!
//! None of these escape the logging path on their own: argument failures
//! become placeholders, sink failures skip one driver, and usage errors are
//! returned to callers who may ignore them.

use thiserror::Error;

/// An argument producer could not supply a value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgumentError {
    /// The producer reported a failure.
    #[error("argument unavailable: {0}")]
    Unavailable(String),

    /// The producer panicked.
    #[error("argument producer panicked")]
    Panicked,

    /// A format string referenced more arguments than were supplied.
    #[error("format placeholder {0} has no argument")]
    Missing(usize),
}

/// Failures reported by a native sink.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NativeSinkError {
    /// The sink refused to open a handle.
    #[error("cannot open handle for {subsystem}/{category}: {reason}")]
    Open {
        subsystem: String,
        category: String,
        reason: String,
    },

    /// An emission was rejected.
    #[error("emit failed: {0}")]
    Emit(String),

    /// An argument buffer could not be decoded.
    #[error("malformed argument buffer at byte {offset}: {reason}")]
    Decode { offset: usize, reason: &'static str },
}

/// Lifecycle misuse of an operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UsageError {
    /// `event` or `end` was called while no operation was active.
    #[error("operation {name} ({operation_id}) received {action} before begin")]
    NotStarted {
        operation_id: String,
        name: String,
        action: &'static str,
    },
}
