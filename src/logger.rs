//! Per-category logging surface.

use std::borrow::Cow;
use std::sync::Arc;

use crate::driver::DriverRegistry;
use crate::event::LogRecord;
use crate::level::LogLevel;
use crate::message::{ArgValue, InterpolatedMessage};
use crate::metadata::MetadataValue;
use crate::operation::{MisusePolicy, Operation};
use crate::site::CallSite;

macro_rules! level_methods {
    ($($plain:ident, $format:ident, $with_metadata:ident => $level:expr;)+) => {
        $(
            pub fn $plain<'a>(&self, site: &CallSite, message: impl Into<InterpolatedMessage<'a>>) {
                self.log($level, site, message);
            }

            pub fn $format(&self, site: &CallSite, format: &str, args: &[ArgValue]) {
                self.log_format($level, site, format, args);
            }

            pub fn $with_metadata<'a>(
                &self,
                site: &CallSite,
                message: impl Into<InterpolatedMessage<'a>>,
                metadata: &MetadataValue,
            ) {
                self.log_with_metadata($level, site, message, metadata);
            }
        )+
    };
}

/// Logs under one category into one registry.
///
/// Cheap to clone; clones share the registry. The operation misuse policy
/// starts out as the registry's.
#[derive(Clone)]
pub struct Logger {
    category: Cow<'static, str>,
    registry: Arc<DriverRegistry>,
    misuse: MisusePolicy,
}

impl Logger {
    pub fn new(category: impl Into<Cow<'static, str>>, registry: Arc<DriverRegistry>) -> Self {
        Self {
            category: category.into(),
            misuse: registry.misuse_policy(),
            registry,
        }
    }

    /// A logger on the process-wide registry.
    pub fn shared(category: impl Into<Cow<'static, str>>) -> Self {
        Self::new(category, DriverRegistry::shared().clone())
    }

    /// Policy handed to operations created from this logger.
    pub fn with_misuse_policy(mut self, misuse: MisusePolicy) -> Self {
        self.misuse = misuse;
        self
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn registry(&self) -> &Arc<DriverRegistry> {
        &self.registry
    }

    pub fn misuse_policy(&self) -> MisusePolicy {
        self.misuse
    }

    pub fn log<'a>(&self, level: LogLevel, site: &CallSite, message: impl Into<InterpolatedMessage<'a>>) {
        self.log_with_metadata(level, site, message, &MetadataValue::Nil);
    }

    pub fn log_with_metadata<'a>(
        &self,
        level: LogLevel,
        site: &CallSite,
        message: impl Into<InterpolatedMessage<'a>>,
        metadata: &MetadataValue,
    ) {
        let message = message.into();
        self.registry
            .dispatch(&LogRecord::new(level, site, &self.category, &message, metadata));
    }

    /// Log a printf-style format string with positional arguments.
    pub fn log_format(&self, level: LogLevel, site: &CallSite, format: &str, args: &[ArgValue]) {
        self.registry
            .dispatch_format(level, site, &self.category, format, args);
    }

    level_methods! {
        info, info_format, info_with_metadata => LogLevel::Info;
        warn, warn_format, warn_with_metadata => LogLevel::Warn;
        error, error_format, error_with_metadata => LogLevel::Error;
        fault, fault_format, fault_with_metadata => LogLevel::Fault;
        debug, debug_format, debug_with_metadata => LogLevel::Debug;
    }

    /// Create an operation under this logger's category.
    pub fn operation(&self, site: CallSite, name: impl Into<String>) -> Operation {
        Operation::new(self.clone(), site, name)
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("category", &self.category)
            .field("drivers", &self.registry.len())
            .finish()
    }
}

/// Log at an explicit level, capturing the call site.
///
/// ```
/// use std::sync::Arc;
/// use swog::{log, CaptureDriver, DriverRegistry, LogLevel, Logger, Privacy};
///
/// let registry = Arc::new(DriverRegistry::empty());
/// let capture = Arc::new(CaptureDriver::new());
/// registry.register(capture.clone());
///
/// let logger = Logger::new("Chat", registry);
/// let unread = 3;
/// log!(logger, LogLevel::Info, "unread " {unread; Privacy::PRIVATE});
/// assert_eq!(capture.messages(), vec!["unread {private}"]);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $($parts:tt)+) => {
        $logger.log($level, &$crate::call_site!(), $crate::message!($($parts)+))
    };
}

#[macro_export]
macro_rules! info {
    ($logger:expr, $($parts:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Info, $($parts)+)
    };
}

#[macro_export]
macro_rules! warn {
    ($logger:expr, $($parts:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Warn, $($parts)+)
    };
}

#[macro_export]
macro_rules! error {
    ($logger:expr, $($parts:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Error, $($parts)+)
    };
}

#[macro_export]
macro_rules! fault {
    ($logger:expr, $($parts:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Fault, $($parts)+)
    };
}

#[macro_export]
macro_rules! debug {
    ($logger:expr, $($parts:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Debug, $($parts)+)
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::CaptureDriver;
    use crate::message::Privacy;

    fn captured(category: &'static str) -> (Logger, Arc<CaptureDriver>) {
        let registry = Arc::new(DriverRegistry::empty());
        let capture = Arc::new(CaptureDriver::new());
        registry.register(capture.clone());
        (Logger::new(category, registry), capture)
    }

    #[test]
    fn test_level_methods() {
        let (logger, capture) = captured("Chat");
        let site = CallSite::new("app/src/chat.rs", 5, "app::chat");
        logger.info(&site, "a");
        logger.warn(&site, "b");
        logger.error(&site, "c");
        logger.fault(&site, "d");
        logger.debug(&site, String::from("e"));

        let levels: Vec<LogLevel> = capture.events().iter().map(|e| e.level).collect();
        assert_eq!(
            levels,
            vec![LogLevel::Info, LogLevel::Warn, LogLevel::Error, LogLevel::Fault, LogLevel::Debug]
        );
        assert!(capture.events().iter().all(|e| e.category == "Chat"));
    }

    #[test]
    fn test_level_format_and_metadata_methods() {
        let (logger, capture) = captured("Chat");
        let site = CallSite::new("app/src/chat.rs", 6, "app::chat");
        let args = [ArgValue::Int(4)];
        logger.info_format(&site, "got %d", &args);
        logger.warn_format(&site, "got %d", &args);
        logger.error_format(&site, "got %d", &args);
        logger.fault_format(&site, "got %d", &args);
        logger.debug_format(&site, "got %d", &args);

        let meta = MetadataValue::from("ctx");
        logger.info_with_metadata(&site, "m", &meta);
        logger.warn_with_metadata(&site, "m", &meta);
        logger.error_with_metadata(&site, "m", &meta);
        logger.fault_with_metadata(&site, "m", &meta);
        logger.debug_with_metadata(&site, "m", &meta);

        let events = capture.events();
        let levels: Vec<LogLevel> = events.iter().map(|e| e.level).collect();
        let cycle = [LogLevel::Info, LogLevel::Warn, LogLevel::Error, LogLevel::Fault, LogLevel::Debug];
        assert_eq!(levels, [cycle, cycle].concat());
        assert!(events[..5].iter().all(|e| e.rendered_message == "got 4"));
        assert!(events[..5].iter().all(|e| e.metadata == MetadataValue::Nil));
        assert!(events[5..].iter().all(|e| e.rendered_message == "m" && e.metadata == meta));
    }

    #[test]
    fn test_macros_capture_call_site() {
        let (logger, capture) = captured("Macro");
        let peer = "bob";
        crate::warn!(logger, "lost " {peer; Privacy::PRIVATE});

        let event = &capture.events()[0];
        assert_eq!(event.rendered_message, "lost {private}");
        assert!(event.source_file_id.starts_with("swog/"));
        assert!(event.source_file_id.ends_with("logger.rs"));
        assert!(event.function.ends_with("tests"));
    }

    #[test]
    fn test_log_format_and_metadata() {
        let (logger, capture) = captured("Legacy");
        let site = CallSite::new("app/src/legacy.rs", 1, "app");
        logger.log_format(LogLevel::Info, &site, "%{private}s has %d", &[ArgValue::Str("ann".into()), ArgValue::Int(2)]);

        let meta = MetadataValue::from("ctx");
        logger.log_with_metadata(LogLevel::Info, &site, "with meta", &meta);

        let events = capture.events();
        assert_eq!(events[0].rendered_message, "{private} has 2");
        assert_eq!(events[1].metadata, meta);
    }

    #[test]
    fn test_operation_inherits_category_and_policy() {
        let (logger, _capture) = captured("Ops");
        let logger = logger.with_misuse_policy(MisusePolicy::Warn);
        let op = logger.operation(CallSite::new("app/src/ops.rs", 1, "app"), "upload");
        assert_eq!(op.category(), "Ops");
        assert!(op.end(None).is_err());
    }

    #[test]
    fn test_configured_misuse_policy_reaches_operations() {
        let config = crate::config::parse_config("[operations]\nmisuse = \"warn\"").unwrap();
        let registry = Arc::new(DriverRegistry::from_config(&config));
        registry.clear();
        let capture = Arc::new(CaptureDriver::new());
        registry.register(capture.clone());

        let logger = Logger::new("Ops", registry);
        assert_eq!(logger.misuse_policy(), MisusePolicy::Warn);
        let op = logger.operation(CallSite::new("app/src/ops.rs", 2, "app"), "upload");
        assert!(op.event(&InterpolatedMessage::literal("early")).is_err());
        assert!(op.end(None).is_err());
        assert_eq!(capture.events().len(), 2);
    }
}
