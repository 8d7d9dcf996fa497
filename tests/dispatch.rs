//! Fan-out, ordering and isolation across drivers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use swog::{
    info, CaptureDriver, ConsoleDriver, DisclosurePolicy, DriverRegistry, LogDriver, LogRecord,
    Logger, Privacy,
};

mod common;
use common::SharedBuf;

/// Appends its tag to a shared journal on every event.
struct Journal {
    tag: &'static str,
    journal: Arc<Mutex<Vec<&'static str>>>,
}

impl LogDriver for Journal {
    fn log(&self, _record: &LogRecord<'_>) {
        self.journal.lock().unwrap().push(self.tag);
    }
}

struct Panicking;

impl LogDriver for Panicking {
    fn log(&self, _record: &LogRecord<'_>) {
        panic!("sink exploded");
    }

    fn name(&self) -> &str {
        "panicking"
    }
}

#[test]
fn test_registration_order_and_exactly_once() {
    let journal = Arc::new(Mutex::new(Vec::new()));
    let registry = Arc::new(DriverRegistry::empty());
    for tag in ["a", "b", "c"] {
        registry.register(Arc::new(Journal {
            tag,
            journal: journal.clone(),
        }));
    }

    let logger = Logger::new("Order", registry);
    info!(logger, "first");
    info!(logger, "second");

    assert_eq!(*journal.lock().unwrap(), vec!["a", "b", "c", "a", "b", "c"]);
}

#[test]
fn test_two_consoles_render_identically() {
    let first = SharedBuf::default();
    let second = SharedBuf::default();
    let registry = Arc::new(DriverRegistry::empty());
    registry.register(Arc::new(ConsoleDriver::with_writer(Box::new(first.clone()), false)));
    registry.register(Arc::new(ConsoleDriver::with_writer(Box::new(second.clone()), false)));

    let logger = Logger::new("Twin", registry);
    let secret = "k";
    info!(logger, "value " {secret; Privacy::PRIVATE} " done");

    assert_eq!(first.text(), second.text());
    assert_eq!(first.text(), "[Twin                ] [INFO  ] value {private} done\n");
}

#[test]
fn test_per_driver_policy() {
    let registry = Arc::new(DriverRegistry::empty());
    let open = Arc::new(CaptureDriver::with_policy(DisclosurePolicy::disclose_all()));
    let closed = Arc::new(CaptureDriver::new());
    registry.register(open.clone());
    registry.register(closed.clone());

    let logger = Logger::new("Policy", registry);
    let who = "ann";
    info!(logger, "hello " {who; Privacy::AUTO});

    assert_eq!(open.messages(), vec!["hello ann"]);
    assert_eq!(closed.messages(), vec!["hello {private}"]);
}

#[test]
fn test_panicking_driver_does_not_reach_caller() {
    common::init_tracing();
    let registry = Arc::new(DriverRegistry::empty());
    let capture = Arc::new(CaptureDriver::new());
    registry.register(Arc::new(Panicking));
    registry.register(capture.clone());

    let logger = Logger::new("Isolation", registry);
    info!(logger, "still delivered");

    assert_eq!(capture.messages(), vec!["still delivered"]);
}

#[test]
fn test_register_during_dispatch_never_tears() {
    let registry = Arc::new(DriverRegistry::empty());
    let stable = Arc::new(CaptureDriver::new());
    registry.register(stable.clone());

    let stop = Arc::new(AtomicBool::new(false));
    let churn = {
        let registry = registry.clone();
        let stop = stop.clone();
        thread::spawn(move || {
            while !stop.load(Ordering::Relaxed) {
                let id = registry.register(Arc::new(CaptureDriver::new()));
                registry.deregister(id);
            }
        })
    };

    let logger = Logger::new("Churn", registry.clone());
    for i in 0..500 {
        info!(logger, "event " {i});
    }
    stop.store(true, Ordering::Relaxed);
    churn.join().unwrap();

    assert_eq!(stable.events().len(), 500);
    assert_eq!(registry.len(), 1);
}
