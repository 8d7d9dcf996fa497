//! Forwarding to the platform's native logging facility.
//!
//! # Data Flow
//! ```text
//! LogRecord
//!     → NativeDriver
//!         → cache.rs (one handle per subsystem/category, built once)
//!         → encode.rs (format token + argument buffer)
//!         → NativeSink::emit / NativeSink::emit_signpost
//! ```
//!
//! # Design Decisions
//! - The native facility does its own redaction, so the driver forwards
//!   privacy flags instead of rendered text
//! - Sink failures are logged through `tracing` and the event is skipped for
//!   this driver only

pub mod cache;
pub mod encode;
pub mod memory;
pub mod tracing_sink;

pub use cache::{HandleCache, HandleKey};
pub use encode::{decode_buffer, DecodedItem, ItemKind, NativeMessage};
pub use memory::MemorySink;
pub use tracing_sink::TracingSink;

use crate::config::NativeConfig;
use crate::driver::LogDriver;
use crate::error::NativeSinkError;
use crate::event::{CorrelationId, LogRecord, SignpostKind};
use crate::level::LogLevel;

/// A native logging facility.
pub trait NativeSink: Send + Sync {
    /// Opaque per-(subsystem, category) handle.
    type Handle: Send + Sync;

    fn open_handle(&self, subsystem: &str, category: &str) -> Result<Self::Handle, NativeSinkError>;

    fn emit(&self, handle: &Self::Handle, level: LogLevel, message: &NativeMessage) -> Result<(), NativeSinkError>;

    /// Record an operation milestone. Sinks without signpost support ignore it.
    fn emit_signpost(
        &self,
        _handle: &Self::Handle,
        _kind: SignpostKind,
        _id: CorrelationId,
        _name: &str,
        _message: Option<&NativeMessage>,
    ) -> Result<(), NativeSinkError> {
        Ok(())
    }
}

/// Driver forwarding every record to a [`NativeSink`].
pub struct NativeDriver<S: NativeSink> {
    sink: S,
    handles: HandleCache<S::Handle>,
    subsystem_prefix: String,
}

impl<S: NativeSink> NativeDriver<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            handles: HandleCache::new(),
            subsystem_prefix: String::new(),
        }
    }

    /// A driver using the subsystem prefix from `config`.
    pub fn from_config(sink: S, config: &NativeConfig) -> Self {
        Self::new(sink).with_subsystem_prefix(config.subsystem_prefix.clone())
    }

    /// Prepend `prefix` to every subsystem name, e.g. `com.example.`.
    pub fn with_subsystem_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.subsystem_prefix = prefix.into();
        self
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn handles(&self) -> &HandleCache<S::Handle> {
        &self.handles
    }

    fn forward(&self, record: &LogRecord<'_>) -> Result<(), NativeSinkError> {
        let subsystem = format!("{}{}", self.subsystem_prefix, record.site.subsystem());
        let handle = self.handles.handle_for(&subsystem, record.category, || {
            self.sink.open_handle(&subsystem, record.category)
        })?;

        let message = NativeMessage::encode(record.message);
        if let Some(signpost) = record.signpost {
            let attached = (!message.format.is_empty()).then_some(&message);
            self.sink.emit_signpost(
                &handle,
                signpost.kind,
                signpost.correlation_id,
                signpost.name,
                attached,
            )?;
        }
        self.sink.emit(&handle, record.level, &message)
    }
}

impl<S: NativeSink> LogDriver for NativeDriver<S> {
    fn log(&self, record: &LogRecord<'_>) {
        if let Err(err) = self.forward(record) {
            tracing::warn!(
                error = %err,
                category = record.category,
                site = %record.site,
                "native sink rejected event"
            );
        }
    }

    fn name(&self) -> &str {
        "native"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Signpost;
    use crate::message::{InterpolatedMessage, Privacy};
    use crate::metadata::MetadataValue;
    use crate::site::CallSite;

    #[test]
    fn test_handles_keyed_by_prefixed_subsystem_and_category() {
        let config = NativeConfig {
            subsystem_prefix: "com.example.".into(),
        };
        let driver = NativeDriver::from_config(MemorySink::new(), &config);
        let chat = CallSite::new("Barcelona/Chat.rs", 1, "chat");
        let sync = CallSite::new("Barcelona/Sync.rs", 2, "sync");
        let metadata = MetadataValue::Nil;
        let message = InterpolatedMessage::literal("hi");

        for _ in 0..3 {
            driver.log(&LogRecord::new(LogLevel::Info, &chat, "Chat", &message, &metadata));
        }
        driver.log(&LogRecord::new(LogLevel::Info, &sync, "Sync", &message, &metadata));

        assert_eq!(driver.sink().opened(), 2);
        assert_eq!(driver.handles().len(), 2);
        let emitted = driver.sink().emissions();
        assert_eq!(emitted.len(), 4);
        assert_eq!(emitted[0].subsystem, "com.example.Barcelona");
        assert_eq!(emitted[3].category, "Sync");
    }

    #[test]
    fn test_privacy_flags_forwarded_not_rendered() {
        let driver = NativeDriver::new(MemorySink::new());
        let site = CallSite::new("app/src/lib.rs", 1, "app");
        let metadata = MetadataValue::Nil;
        let secret = "s3cret";
        let message = crate::message!("key " {secret; Privacy::PRIVATE});
        driver.log(&LogRecord::new(LogLevel::Error, &site, "Keys", &message, &metadata));

        let emitted = driver.sink().emissions();
        assert_eq!(emitted[0].message.format, "key %{private}s");
        let items = decode_buffer(&emitted[0].message.buffer).unwrap();
        assert!(items[0].is_private());
    }

    #[test]
    fn test_open_failure_skips_event() {
        let driver = NativeDriver::new(MemorySink::refusing());
        let site = CallSite::new("app/src/lib.rs", 1, "app");
        let metadata = MetadataValue::Nil;
        let message = InterpolatedMessage::literal("lost");
        driver.log(&LogRecord::new(LogLevel::Info, &site, "Any", &message, &metadata));

        assert!(driver.sink().emissions().is_empty());
        assert!(driver.handles().is_empty());
    }

    #[test]
    fn test_signpost_forwarded() {
        let driver = NativeDriver::new(MemorySink::new());
        let site = CallSite::new("app/src/lib.rs", 1, "app");
        let metadata = MetadataValue::Nil;
        let message = InterpolatedMessage::literal("started");
        let record = LogRecord::new(LogLevel::Debug, &site, "Ops", &message, &metadata).with_signpost(
            Signpost {
                kind: SignpostKind::Begin,
                name: "sync",
                correlation_id: CorrelationId(7),
            },
        );
        driver.log(&record);

        let signposts = driver.sink().signposts();
        assert_eq!(signposts.len(), 1);
        assert_eq!(signposts[0].kind, SignpostKind::Begin);
        assert_eq!(signposts[0].id, CorrelationId(7));
        assert_eq!(signposts[0].name, "sync");
        assert_eq!(signposts[0].format.as_deref(), Some("started"));
        assert_eq!(driver.sink().emissions().len(), 1);
    }
}
