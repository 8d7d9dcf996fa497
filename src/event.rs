//! What drivers receive, and what they can record.

use serde::{Deserialize, Serialize};

use crate::level::LogLevel;
use crate::message::{DisclosurePolicy, InterpolatedMessage};
use crate::metadata::MetadataValue;
use crate::site::CallSite;

/// Correlates the begin, events and end of one operation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CorrelationId(pub u64);

impl std::fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Lifecycle milestone of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignpostKind {
    Begin,
    Event,
    End,
}

impl SignpostKind {
    pub fn label(self) -> &'static str {
        match self {
            SignpostKind::Begin => "BEGIN",
            SignpostKind::Event => "EVENT",
            SignpostKind::End => "END",
        }
    }
}

/// Signpost details carried by operation records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signpost<'a> {
    pub kind: SignpostKind,
    pub name: &'a str,
    pub correlation_id: CorrelationId,
}

/// One event as handed to each driver. Nothing has been rendered yet.
#[derive(Debug, Clone, Copy)]
pub struct LogRecord<'a> {
    pub level: LogLevel,
    pub site: &'a CallSite,
    pub category: &'a str,
    pub message: &'a InterpolatedMessage<'a>,
    pub metadata: &'a MetadataValue,
    pub signpost: Option<Signpost<'a>>,
}

impl<'a> LogRecord<'a> {
    pub fn new(
        level: LogLevel,
        site: &'a CallSite,
        category: &'a str,
        message: &'a InterpolatedMessage<'a>,
        metadata: &'a MetadataValue,
    ) -> Self {
        Self {
            level,
            site,
            category,
            message,
            metadata,
            signpost: None,
        }
    }

    pub fn with_signpost(mut self, signpost: Signpost<'a>) -> Self {
        self.signpost = Some(signpost);
        self
    }

    /// Render under `policy` into an owned event.
    pub fn to_event(&self, policy: &DisclosurePolicy) -> LogEvent {
        LogEvent {
            level: self.level,
            source_file_id: self.site.file_id.to_string(),
            source_line: self.site.line,
            function: self.site.function.to_string(),
            category: self.category.to_string(),
            rendered_message: self.message.render(policy),
            metadata: self.metadata.clone(),
            correlation_id: self.signpost.map(|s| s.correlation_id),
        }
    }
}

/// A rendered, immutable log event.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LogEvent {
    pub level: LogLevel,
    pub source_file_id: String,
    pub source_line: u32,
    pub function: String,
    pub category: String,
    pub rendered_message: String,
    pub metadata: MetadataValue,
    /// Set when the event came from an operation.
    pub correlation_id: Option<CorrelationId>,
}
