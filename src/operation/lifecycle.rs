//! Begin / event / end tracking for one named unit of work.
//!
//! # State Machine
//! ```text
//!        begin               end
//! Idle ────────► Active ─────────► Ended
//!                 │  ▲               │
//!           event └──┘               │ begin (fresh correlation id)
//!                 ▲                  │
//!                 └──────────────────┘
//! ```
//!
//! `event` and `end` outside `Active` are misuse, handled per
//! [`MisusePolicy`].
//!
//! Each transition holds the operation's transition lock until its record is
//! dispatched, so drivers never see an END before an EVENT of the same run.
//! Drivers and observers must not call back into the operation being
//! published.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::UsageError;
use crate::event::{CorrelationId, LogRecord, Signpost, SignpostKind};
use crate::level::LogLevel;
use crate::logger::Logger;
use crate::message::InterpolatedMessage;
use crate::metadata::MetadataValue;
use crate::operation::observer::OperationUpdate;
use crate::site::CallSite;

static NEXT_CORRELATION: AtomicU64 = AtomicU64::new(1);

fn next_correlation_id() -> CorrelationId {
    CorrelationId(NEXT_CORRELATION.fetch_add(1, Ordering::Relaxed))
}

/// What to do when `event` or `end` arrives before `begin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MisusePolicy {
    /// Panic with the usage error.
    Panic,
    /// Log the misuse and return the error.
    Warn,
}

impl Default for MisusePolicy {
    /// `Panic` in debug builds, `Warn` otherwise.
    fn default() -> Self {
        if cfg!(debug_assertions) {
            MisusePolicy::Panic
        } else {
            MisusePolicy::Warn
        }
    }
}

/// Where an operation is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationState {
    Idle,
    Active(CorrelationId),
    Ended { last: CorrelationId },
}

/// A named, reusable span of work.
pub struct Operation {
    operation_id: Uuid,
    name: String,
    site: CallSite,
    logger: Logger,
    misuse: MisusePolicy,
    state: Mutex<OperationState>,
    transition: Mutex<()>,
}

impl Operation {
    pub fn new(logger: Logger, site: CallSite, name: impl Into<String>) -> Self {
        Self {
            operation_id: Uuid::new_v4(),
            name: name.into(),
            site,
            misuse: logger.misuse_policy(),
            logger,
            state: Mutex::new(OperationState::Idle),
            transition: Mutex::new(()),
        }
    }

    pub fn with_misuse_policy(mut self, misuse: MisusePolicy) -> Self {
        self.misuse = misuse;
        self
    }

    pub fn operation_id(&self) -> Uuid {
        self.operation_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> &str {
        self.logger.category()
    }

    pub fn state(&self) -> OperationState {
        *self.lock_state()
    }

    /// The active correlation id, if any.
    pub fn correlation_id(&self) -> Option<CorrelationId> {
        match self.state() {
            OperationState::Active(id) => Some(id),
            _ => None,
        }
    }

    /// Start a run with a fresh correlation id.
    ///
    /// Beginning an already active operation starts a new run.
    pub fn begin(&self, message: Option<&InterpolatedMessage<'_>>) -> &Self {
        let _transition = self.lock_transition();
        let id = next_correlation_id();
        let previous = std::mem::replace(&mut *self.lock_state(), OperationState::Active(id));
        if let OperationState::Active(old) = previous {
            tracing::debug!(operation = %self.name, old = %old, new = %id, "operation restarted");
        }
        self.publish(SignpostKind::Begin, id, message);
        self
    }

    /// Record a milestone of the active run.
    pub fn event(&self, message: &InterpolatedMessage<'_>) -> Result<(), UsageError> {
        let _transition = self.lock_transition();
        match self.state() {
            OperationState::Active(id) => {
                self.publish(SignpostKind::Event, id, Some(message));
                Ok(())
            }
            _ => self.misused("event", LogLevel::Warn),
        }
    }

    /// Close the active run.
    pub fn end(&self, message: Option<&InterpolatedMessage<'_>>) -> Result<(), UsageError> {
        let _transition = self.lock_transition();
        let id = {
            let mut state = self.lock_state();
            match *state {
                OperationState::Active(id) => {
                    *state = OperationState::Ended { last: id };
                    id
                }
                _ => {
                    drop(state);
                    return self.misused("end", LogLevel::Fault);
                }
            }
        };
        self.publish(SignpostKind::End, id, message);
        Ok(())
    }

    fn lock_state(&self) -> MutexGuard<'_, OperationState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_transition(&self) -> MutexGuard<'_, ()> {
        self.transition.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, kind: SignpostKind, id: CorrelationId, message: Option<&InterpolatedMessage<'_>>) {
        let fallback;
        let text = match message {
            Some(message) => message,
            None => {
                fallback = InterpolatedMessage::literal(format!(
                    "OPERATION.{} name={} id={}",
                    kind.label(),
                    self.name,
                    id
                ));
                &fallback
            }
        };

        let metadata = MetadataValue::Nil;
        let record = LogRecord::new(LogLevel::Debug, &self.site, self.logger.category(), text, &metadata)
            .with_signpost(Signpost {
                kind,
                name: &self.name,
                correlation_id: id,
            });
        let registry = self.logger.registry();
        registry.dispatch(&record);
        registry.notify_observer(&OperationUpdate {
            operation_id: self.operation_id,
            name: &self.name,
            category: self.logger.category(),
            kind,
            correlation_id: id,
            message,
        });
    }

    fn misused(&self, action: &'static str, level: LogLevel) -> Result<(), UsageError> {
        let err = UsageError::NotStarted {
            operation_id: self.operation_id.to_string(),
            name: self.name.clone(),
            action,
        };
        if self.misuse == MisusePolicy::Panic {
            panic!("{err}");
        }

        tracing::warn!(operation = %self.name, id = %self.operation_id, action, "operation misuse");
        let text = InterpolatedMessage::literal(err.to_string());
        let metadata = MetadataValue::Nil;
        self.logger
            .registry()
            .dispatch(&LogRecord::new(level, &self.site, self.logger.category(), &text, &metadata));
        Err(err)
    }
}

impl std::fmt::Debug for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Operation")
            .field("operation_id", &self.operation_id)
            .field("name", &self.name)
            .field("category", &self.category())
            .field("state", &self.state())
            .finish()
    }
}
