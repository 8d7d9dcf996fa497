//! Log drivers and their registry.
//!
//! # Data Flow
//! ```text
//! Logger / Operation
//!     → registry.rs (snapshot of the driver list)
//!     → for each driver, in registration order:
//!         - console.rs (render, colorize, one locked line)
//!         - capture.rs (render, keep LogEvent in memory)
//!         - native::NativeDriver (encode, forward via cached handle)
//!     → operation observer (operation records only)
//! ```
//!
//! # Design Decisions
//! - Dispatch is synchronous on the caller's thread
//! - A driver that panics is skipped for that event; later drivers still run
//! - Drivers must not log through the facade from inside `log`

pub mod capture;
pub mod console;
pub mod registry;

pub use capture::CaptureDriver;
pub use console::{ColorMode, ConsoleDriver};
pub use registry::{DriverId, DriverRegistry};

use crate::event::LogRecord;
use crate::level::LogLevel;
use crate::message::{ArgValue, InterpolatedMessage};
use crate::metadata::MetadataValue;
use crate::site::CallSite;

/// A sink that receives every dispatched event.
///
/// Implementations must not panic or report errors to the caller; failures
/// are handled internally.
pub trait LogDriver: Send + Sync {
    /// Receive a structured record.
    fn log(&self, record: &LogRecord<'_>);

    /// Receive a legacy format-string event.
    fn log_format(
        &self,
        level: LogLevel,
        site: &CallSite,
        category: &str,
        format: &str,
        args: &[ArgValue],
    ) {
        let message = InterpolatedMessage::from_format(format, args);
        let metadata = MetadataValue::Nil;
        self.log(&LogRecord::new(level, site, category, &message, &metadata));
    }

    /// Short name used in diagnostics.
    fn name(&self) -> &str {
        "driver"
    }
}
