//! Privacy-aware structured logging facade.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────────────────────┐
//!                    │                        SWOG                              │
//!                    │                                                          │
//!   info!(logger,    │  ┌──────────┐    ┌───────────────┐    ┌──────────────┐   │
//!     "x " {v; ..})  │  │ call_site│───▶│   message!    │───▶│    Logger    │   │
//!   ─────────────────┼─▶│  + level │    │ (lazy, tagged)│    │  (category)  │   │
//!                    │  └──────────┘    └───────────────┘    └──────┬───────┘   │
//!                    │                                              │           │
//!                    │                                              ▼           │
//!                    │                                     ┌────────────────┐   │
//!                    │                                     │ DriverRegistry │   │
//!                    │                                     │ (ArcSwap list) │   │
//!                    │                                     └──┬─────┬────┬──┘   │
//!                    │                  ┌────────────────────┘     │    │      │
//!                    │                  ▼                          ▼    ▼      │
//!                    │         ┌────────────────┐    ┌──────────┐ ┌──────────┐  │
//!   stdout ◀─────────┼─────────│ ConsoleDriver  │    │ Capture  │ │ Native   │──┼──▶ NativeSink
//!                    │         │ render+color   │    │ Driver   │ │ Driver   │  │    (tracing,
//!                    │         └────────────────┘    └──────────┘ │ +handles │  │     os log)
//!                    │                                            └──────────┘  │
//!                    │  ┌────────────────────────────────────────────────────┐  │
//!                    │  │ Operation: begin/event/end → signpost records      │  │
//!                    │  │            → drivers → OperationObserver           │  │
//!                    │  └────────────────────────────────────────────────────┘  │
//!                    └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Every driver renders the same message under its own [`DisclosurePolicy`];
//! private arguments are replaced with `{private}` unless the policy reveals
//! them, and masked arguments become a stable salted digest.

// Core model
pub mod error;
pub mod event;
pub mod level;
pub mod metadata;
pub mod site;

// Messages
pub mod message;

// Dispatch
pub mod driver;
pub mod logger;
pub mod native;
pub mod operation;

// Configuration
pub mod config;

pub use config::SwogConfig;
pub use driver::{CaptureDriver, ColorMode, ConsoleDriver, DriverId, DriverRegistry, LogDriver};
pub use error::{ArgumentError, NativeSinkError, UsageError};
pub use event::{CorrelationId, LogEvent, LogRecord, Signpost, SignpostKind};
pub use level::LogLevel;
pub use logger::Logger;
pub use message::{
    ArgValue, Argument, DisclosurePolicy, InterpolatedMessage, Mask, MessageBuilder, Privacy,
    PrivacyLevel,
};
pub use metadata::MetadataValue;
pub use native::{MemorySink, NativeDriver, NativeMessage, NativeSink, TracingSink};
pub use operation::{MisusePolicy, Operation, OperationObserver, OperationState, OperationUpdate};
pub use site::CallSite;
