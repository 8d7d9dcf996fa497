//! In-memory native sink.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::error::NativeSinkError;
use crate::event::{CorrelationId, SignpostKind};
use crate::level::LogLevel;
use crate::native::{NativeMessage, NativeSink};

/// Handle issued by [`MemorySink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryHandle {
    pub serial: usize,
    pub subsystem: String,
    pub category: String,
}

/// One `emit` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Emission {
    pub handle: usize,
    pub subsystem: String,
    pub category: String,
    pub level: LogLevel,
    pub message: NativeMessage,
}

/// One `emit_signpost` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignpostEmission {
    pub kind: SignpostKind,
    pub id: CorrelationId,
    pub name: String,
    pub format: Option<String>,
}

/// Records handles and emissions for inspection.
#[derive(Default)]
pub struct MemorySink {
    opened: AtomicUsize,
    refuse: bool,
    emissions: Mutex<Vec<Emission>>,
    signposts: Mutex<Vec<SignpostEmission>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink whose `open_handle` always fails.
    pub fn refusing() -> Self {
        Self {
            refuse: true,
            ..Self::default()
        }
    }

    /// Number of handles opened so far.
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn emissions(&self) -> Vec<Emission> {
        self.emissions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn signposts(&self) -> Vec<SignpostEmission> {
        self.signposts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl NativeSink for MemorySink {
    type Handle = MemoryHandle;

    fn open_handle(&self, subsystem: &str, category: &str) -> Result<MemoryHandle, NativeSinkError> {
        if self.refuse {
            return Err(NativeSinkError::Open {
                subsystem: subsystem.to_string(),
                category: category.to_string(),
                reason: "refused".to_string(),
            });
        }
        Ok(MemoryHandle {
            serial: self.opened.fetch_add(1, Ordering::SeqCst),
            subsystem: subsystem.to_string(),
            category: category.to_string(),
        })
    }

    fn emit(&self, handle: &MemoryHandle, level: LogLevel, message: &NativeMessage) -> Result<(), NativeSinkError> {
        self.emissions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Emission {
                handle: handle.serial,
                subsystem: handle.subsystem.clone(),
                category: handle.category.clone(),
                level,
                message: message.clone(),
            });
        Ok(())
    }

    fn emit_signpost(
        &self,
        _handle: &MemoryHandle,
        kind: SignpostKind,
        id: CorrelationId,
        name: &str,
        message: Option<&NativeMessage>,
    ) -> Result<(), NativeSinkError> {
        self.signposts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(SignpostEmission {
                kind,
                id,
                name: name.to_string(),
                format: message.map(|m| m.format.clone()),
            });
        Ok(())
    }
}
