//! Ordered, copy-on-write collection of drivers.
//!
//! # Responsibilities
//! - Hold the drivers every event is fanned out to
//! - Let registration and removal race safely with dispatch
//! - Isolate a failing driver from its siblings and from the caller
//! - Carry the optional operation observer
//!
//! # Design Decisions
//! - The list lives behind `ArcSwap`; writers publish a new `Vec`, readers
//!   dispatch over whichever snapshot they loaded, never a torn one
//! - A process-wide instance exists for convenience, but every `Logger` can
//!   be given its own registry
//! - The configured operation misuse policy lives here so loggers built on
//!   the registry pick it up

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use arc_swap::{ArcSwap, ArcSwapOption};

use crate::config::SwogConfig;
use crate::driver::console::ConsoleDriver;
use crate::driver::LogDriver;
use crate::event::LogRecord;
use crate::level::LogLevel;
use crate::message::ArgValue;
use crate::operation::{MisusePolicy, OperationObserver, OperationUpdate};
use crate::site::CallSite;

/// Identifies one registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DriverId(u64);

#[derive(Clone)]
struct Registered {
    id: DriverId,
    driver: Arc<dyn LogDriver>,
}

/// The drivers events are dispatched to.
pub struct DriverRegistry {
    drivers: ArcSwap<Vec<Registered>>,
    observer: ArcSwapOption<Box<dyn OperationObserver>>,
    misuse: MisusePolicy,
    next_id: AtomicU64,
}

impl DriverRegistry {
    /// A registry with no drivers.
    pub fn empty() -> Self {
        Self {
            drivers: ArcSwap::from_pointee(Vec::new()),
            observer: ArcSwapOption::empty(),
            misuse: MisusePolicy::default(),
            next_id: AtomicU64::new(1),
        }
    }

    /// A registry holding one default console driver.
    pub fn new() -> Self {
        Self::from_config(&SwogConfig::default())
    }

    /// Build the default driver list described by `config`.
    pub fn from_config(config: &SwogConfig) -> Self {
        let registry = Self::empty().with_misuse_policy(config.operations.misuse);
        if config.console.enabled {
            registry.register(Arc::new(ConsoleDriver::from_config(&config.console)));
        }
        registry
    }

    /// Misuse policy inherited by loggers created on this registry.
    pub fn with_misuse_policy(mut self, misuse: MisusePolicy) -> Self {
        self.misuse = misuse;
        self
    }

    pub fn misuse_policy(&self) -> MisusePolicy {
        self.misuse
    }

    /// The lazily created process-wide registry.
    pub fn shared() -> &'static Arc<DriverRegistry> {
        static SHARED: OnceLock<Arc<DriverRegistry>> = OnceLock::new();
        SHARED.get_or_init(|| Arc::new(DriverRegistry::new()))
    }

    /// Append a driver. It receives every event dispatched after this returns.
    pub fn register(&self, driver: Arc<dyn LogDriver>) -> DriverId {
        let id = DriverId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let entry = Registered { id, driver };
        self.drivers.rcu(|current| {
            let mut next = Vec::clone(current);
            next.push(entry.clone());
            next
        });
        tracing::debug!(driver = entry.driver.name(), id = id.0, "log driver registered");
        id
    }

    /// Remove a driver. Returns false if it was not registered.
    pub fn deregister(&self, id: DriverId) -> bool {
        let previous = self.drivers.rcu(|current| {
            current
                .iter()
                .filter(|r| r.id != id)
                .cloned()
                .collect::<Vec<_>>()
        });
        previous.iter().any(|r| r.id == id)
    }

    /// Swap the whole list at once.
    pub fn replace(&self, drivers: Vec<Arc<dyn LogDriver>>) -> Vec<DriverId> {
        let entries: Vec<Registered> = drivers
            .into_iter()
            .map(|driver| Registered {
                id: DriverId(self.next_id.fetch_add(1, Ordering::Relaxed)),
                driver,
            })
            .collect();
        let ids = entries.iter().map(|r| r.id).collect();
        self.drivers.store(Arc::new(entries));
        ids
    }

    pub fn clear(&self) {
        self.drivers.store(Arc::new(Vec::new()));
    }

    pub fn len(&self) -> usize {
        self.drivers.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The drivers currently registered, in order.
    pub fn snapshot(&self) -> Vec<Arc<dyn LogDriver>> {
        self.drivers.load().iter().map(|r| r.driver.clone()).collect()
    }

    /// Hand `record` to every driver, in registration order.
    pub fn dispatch(&self, record: &LogRecord<'_>) {
        let drivers = self.drivers.load_full();
        for entry in drivers.iter() {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| entry.driver.log(record)));
            if outcome.is_err() {
                tracing::error!(
                    driver = entry.driver.name(),
                    id = entry.id.0,
                    category = record.category,
                    "log driver panicked; event skipped for this driver"
                );
            }
        }
    }

    /// Hand a legacy format-string event to every driver.
    pub fn dispatch_format(
        &self,
        level: LogLevel,
        site: &CallSite,
        category: &str,
        format: &str,
        args: &[ArgValue],
    ) {
        let drivers = self.drivers.load_full();
        for entry in drivers.iter() {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                entry.driver.log_format(level, site, category, format, args)
            }));
            if outcome.is_err() {
                tracing::error!(
                    driver = entry.driver.name(),
                    id = entry.id.0,
                    category,
                    "log driver panicked; event skipped for this driver"
                );
            }
        }
    }

    /// Install or remove the operation observer.
    pub fn set_operation_observer(&self, observer: Option<Box<dyn OperationObserver>>) {
        self.observer.store(observer.map(Arc::new));
    }

    pub(crate) fn notify_observer(&self, update: &OperationUpdate<'_>) {
        let guard = self.observer.load();
        if let Some(observer) = &*guard {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| observer.operation_updated(update)));
            if outcome.is_err() {
                tracing::error!(operation = update.name, "operation observer panicked");
            }
        }
    }
}

impl Default for DriverRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::CaptureDriver;
    use crate::message::InterpolatedMessage;
    use crate::metadata::MetadataValue;

    struct Exploding;

    impl LogDriver for Exploding {
        fn log(&self, _record: &LogRecord<'_>) {
            panic!("driver failure");
        }
    }

    fn dispatch_text(registry: &DriverRegistry, text: &str) {
        let site = CallSite::new("tests/registry.rs", 1, "tests");
        let message = InterpolatedMessage::literal(text);
        let metadata = MetadataValue::Nil;
        registry.dispatch(&LogRecord::new(LogLevel::Info, &site, "Registry", &message, &metadata));
    }

    #[test]
    fn test_register_and_deregister() {
        let registry = DriverRegistry::empty();
        let first = Arc::new(CaptureDriver::new());
        let second = Arc::new(CaptureDriver::new());
        let id = registry.register(first.clone());
        registry.register(second.clone());
        assert_eq!(registry.len(), 2);

        dispatch_text(&registry, "one");
        assert!(registry.deregister(id));
        assert!(!registry.deregister(id));
        dispatch_text(&registry, "two");

        assert_eq!(first.messages(), vec!["one"]);
        assert_eq!(second.messages(), vec!["one", "two"]);
    }

    #[test]
    fn test_panicking_driver_is_isolated() {
        let registry = DriverRegistry::empty();
        let before = Arc::new(CaptureDriver::new());
        let after = Arc::new(CaptureDriver::new());
        registry.register(before.clone());
        registry.register(Arc::new(Exploding));
        registry.register(after.clone());

        dispatch_text(&registry, "survives");

        assert_eq!(before.messages(), vec!["survives"]);
        assert_eq!(after.messages(), vec!["survives"]);
    }

    #[test]
    fn test_replace_and_clear() {
        let registry = DriverRegistry::new();
        assert_eq!(registry.len(), 1);

        let capture = Arc::new(CaptureDriver::new());
        let ids = registry.replace(vec![capture.clone() as Arc<dyn LogDriver>, Arc::new(CaptureDriver::new())]);
        assert_eq!(ids.len(), 2);
        assert_eq!(registry.snapshot().len(), 2);

        registry.clear();
        assert!(registry.is_empty());
        dispatch_text(&registry, "dropped");
        assert!(capture.events().is_empty());
    }

    #[test]
    fn test_from_config_without_console() {
        let mut config = SwogConfig::default();
        config.console.enabled = false;
        assert!(DriverRegistry::from_config(&config).is_empty());
    }

    #[test]
    fn test_from_config_carries_misuse_policy() {
        let config = crate::config::parse_config("[operations]\nmisuse = \"warn\"").unwrap();
        let registry = DriverRegistry::from_config(&config);
        assert_eq!(registry.misuse_policy(), MisusePolicy::Warn);
    }

    struct SelfRemoving {
        registry: Arc<DriverRegistry>,
        id: std::sync::OnceLock<DriverId>,
        seen: Arc<CaptureDriver>,
    }

    impl LogDriver for SelfRemoving {
        fn log(&self, record: &LogRecord<'_>) {
            self.seen.log(record);
            if let Some(id) = self.id.get() {
                self.registry.deregister(*id);
            }
            self.registry.register(Arc::new(CaptureDriver::new()));
        }
    }

    #[test]
    fn test_dispatch_survives_registry_changes_from_driver() {
        let registry = Arc::new(DriverRegistry::empty());
        let seen = Arc::new(CaptureDriver::new());
        let tail = Arc::new(CaptureDriver::new());
        let remover = Arc::new(SelfRemoving {
            registry: registry.clone(),
            id: std::sync::OnceLock::new(),
            seen: seen.clone(),
        });
        let id = registry.register(remover.clone());
        let _ = remover.id.set(id);
        registry.register(tail.clone());

        dispatch_text(&registry, "first");
        dispatch_text(&registry, "second");

        assert_eq!(seen.messages(), vec!["first"]);
        assert_eq!(tail.messages(), vec!["first", "second"]);
        assert_eq!(registry.len(), 2);
    }
}
