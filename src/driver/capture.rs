//! In-memory driver for tests and diagnostics.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::driver::LogDriver;
use crate::event::{LogEvent, LogRecord};
use crate::message::DisclosurePolicy;

/// Records every event it receives, rendered under its own policy.
#[derive(Clone, Default)]
pub struct CaptureDriver {
    events: Arc<Mutex<Vec<LogEvent>>>,
    policy: DisclosurePolicy,
}

impl CaptureDriver {
    /// Capture with the default, non-disclosing policy.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: DisclosurePolicy) -> Self {
        Self {
            events: Arc::default(),
            policy,
        }
    }

    /// Everything captured so far.
    pub fn events(&self) -> Vec<LogEvent> {
        self.lock_events().clone()
    }

    /// Rendered messages only.
    pub fn messages(&self) -> Vec<String> {
        self.events().into_iter().map(|e| e.rendered_message).collect()
    }

    pub fn clear(&self) {
        self.lock_events().clear();
    }

    fn lock_events(&self) -> MutexGuard<'_, Vec<LogEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl LogDriver for CaptureDriver {
    fn log(&self, record: &LogRecord<'_>) {
        let event = record.to_event(&self.policy);
        self.lock_events().push(event);
    }

    fn name(&self) -> &str {
        "capture"
    }
}
