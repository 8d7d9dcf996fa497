//! Hook notified on every operation transition.

use uuid::Uuid;

use crate::event::{CorrelationId, SignpostKind};
use crate::message::InterpolatedMessage;

/// What changed, handed to the observer after drivers have run.
#[derive(Clone, Copy)]
pub struct OperationUpdate<'a> {
    pub operation_id: Uuid,
    pub name: &'a str,
    pub category: &'a str,
    pub kind: SignpostKind,
    pub correlation_id: CorrelationId,
    /// The caller's message, if one was supplied.
    pub message: Option<&'a InterpolatedMessage<'a>>,
}

impl std::fmt::Debug for OperationUpdate<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationUpdate")
            .field("operation_id", &self.operation_id)
            .field("name", &self.name)
            .field("category", &self.category)
            .field("kind", &self.kind)
            .field("correlation_id", &self.correlation_id)
            .field("has_message", &self.message.is_some())
            .finish()
    }
}

/// Receives operation transitions synchronously on the logging thread.
///
/// Must not log through the facade.
pub trait OperationObserver: Send + Sync {
    fn operation_updated(&self, update: &OperationUpdate<'_>);
}

impl<F> OperationObserver for F
where
    F: Fn(&OperationUpdate<'_>) + Send + Sync,
{
    fn operation_updated(&self, update: &OperationUpdate<'_>) {
        self(update)
    }
}
