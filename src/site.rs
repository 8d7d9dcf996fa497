//! Call-site context.

use std::fmt;

/// Where a log statement was written.
///
/// `file_id` has the shape `<subsystem>/<path>`; the `call_site!` macro fills
/// it with the calling crate's name followed by `file!()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallSite {
    pub file_id: &'static str,
    pub line: u32,
    pub function: &'static str,
}

impl CallSite {
    pub const fn new(file_id: &'static str, line: u32, function: &'static str) -> Self {
        Self {
            file_id,
            line,
            function,
        }
    }

    /// First path segment of `file_id`, up to the first `/`.
    pub fn subsystem(&self) -> &'static str {
        match self.file_id.split_once('/') {
            Some((head, _)) => head,
            None => self.file_id,
        }
    }
}

impl fmt::Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file_id, self.line)
    }
}

/// Capture the current call site.
#[macro_export]
macro_rules! call_site {
    () => {
        $crate::CallSite::new(
            concat!(env!("CARGO_CRATE_NAME"), "/", file!()),
            line!(),
            module_path!(),
        )
    };
}
