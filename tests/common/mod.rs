//! Shared utilities for integration tests.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use swog::{CaptureDriver, DriverRegistry, Logger};

/// A `Write` target whose contents can be read back.
#[derive(Clone, Default)]
pub struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl SharedBuf {
    pub fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }

    #[allow(dead_code)]
    pub fn lines(&self) -> Vec<String> {
        self.text().lines().map(str::to_string).collect()
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A fresh registry holding one capture driver, and a logger on it.
#[allow(dead_code)]
pub fn captured_logger(category: &'static str) -> (Logger, Arc<CaptureDriver>) {
    let registry = Arc::new(DriverRegistry::empty());
    let capture = Arc::new(CaptureDriver::new());
    registry.register(capture.clone());
    (Logger::new(category, registry), capture)
}

/// Install a test subscriber so internal diagnostics show up with `--nocapture`.
#[allow(dead_code)]
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
