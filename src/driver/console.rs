//! Console driver.
//!
//! # Responsibilities
//! - Render each record under the console's disclosure policy
//! - Lay it out as `[<category:20>] [<LEVEL:6>] <text>`
//! - Colorize by level and write one newline-terminated line
//!
//! # Design Decisions
//! - Compose and flush happen under one lock, so lines from concurrent
//!   threads never interleave
//! - Colors are applied around the composed line; column layout is computed
//!   on the plain text

use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use termcolor::{Buffer, BufferWriter, Color, ColorChoice, ColorSpec, WriteColor};

use crate::config::ConsoleConfig;
use crate::driver::LogDriver;
use crate::event::LogRecord;
use crate::level::LogLevel;
use crate::message::DisclosurePolicy;

/// Width of the category column.
pub const CATEGORY_WIDTH: usize = 20;

/// Width of the level column.
pub const LEVEL_WIDTH: usize = 6;

/// When to emit ANSI color codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    Always,
    Never,
    #[default]
    Auto,
}

impl ColorMode {
    fn choice(self) -> ColorChoice {
        match self {
            ColorMode::Always => ColorChoice::Always,
            ColorMode::Never => ColorChoice::Never,
            ColorMode::Auto => ColorChoice::Auto,
        }
    }
}

enum Output {
    Stdout(BufferWriter),
    Writer {
        sink: Box<dyn Write + Send>,
        ansi: bool,
    },
}

/// Writes one formatted line per event.
pub struct ConsoleDriver {
    policy: DisclosurePolicy,
    output: Mutex<Output>,
}

impl ConsoleDriver {
    /// Standard output, auto-detected colors, non-disclosing policy.
    pub fn new() -> Self {
        Self::stdout(ColorMode::Auto)
    }

    pub fn stdout(color: ColorMode) -> Self {
        Self {
            policy: DisclosurePolicy::default(),
            output: Mutex::new(Output::Stdout(BufferWriter::stdout(color.choice()))),
        }
    }

    /// Write to an arbitrary stream instead of stdout.
    pub fn with_writer(sink: Box<dyn Write + Send>, ansi: bool) -> Self {
        Self {
            policy: DisclosurePolicy::default(),
            output: Mutex::new(Output::Writer { sink, ansi }),
        }
    }

    pub fn from_config(config: &ConsoleConfig) -> Self {
        Self::stdout(config.color).with_policy(config.disclosure.clone())
    }

    pub fn with_policy(mut self, policy: DisclosurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> &DisclosurePolicy {
        &self.policy
    }

    /// Write already rendered text.
    pub fn write(&self, level: LogLevel, category: &str, text: &str) {
        let mut output = self.output.lock().unwrap_or_else(PoisonError::into_inner);
        let result = match &mut *output {
            Output::Stdout(writer) => {
                let mut buffer = writer.buffer();
                compose(&mut buffer, level, category, text).and_then(|()| writer.print(&buffer))
            }
            Output::Writer { sink, ansi } => {
                let mut buffer = if *ansi {
                    Buffer::ansi()
                } else {
                    Buffer::no_color()
                };
                compose(&mut buffer, level, category, text)
                    .and_then(|()| sink.write_all(buffer.as_slice()))
                    .and_then(|()| sink.flush())
            }
        };

        if let Err(err) = result {
            tracing::debug!(error = %err, "console write failed");
        }
    }
}

impl Default for ConsoleDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl LogDriver for ConsoleDriver {
    fn log(&self, record: &LogRecord<'_>) {
        let text = record.message.render(&self.policy);
        self.write(record.level, record.category, &text);
    }

    fn name(&self) -> &str {
        "console"
    }
}

/// The uncolored line, without the trailing newline.
pub fn format_line(level: LogLevel, category: &str, text: &str) -> String {
    format!(
        "[{category:<cw$.cw$}] [{label:<lw$}] {text}",
        label = level.label(),
        cw = CATEGORY_WIDTH,
        lw = LEVEL_WIDTH,
    )
}

/// Color used for a level, or `None` for plain output.
pub fn level_color(level: LogLevel) -> Option<ColorSpec> {
    let mut spec = ColorSpec::new();
    match level {
        LogLevel::Info => spec.set_fg(Some(Color::Cyan)),
        LogLevel::Warn => spec.set_fg(Some(Color::Yellow)),
        LogLevel::Debug => return None,
        LogLevel::Fault => spec.set_bg(Some(Color::Red)),
        LogLevel::Error => spec.set_fg(Some(Color::Red)).set_intense(true),
    };
    Some(spec)
}

fn compose(buffer: &mut Buffer, level: LogLevel, category: &str, text: &str) -> io::Result<()> {
    let line = format_line(level, category, text);
    match level_color(level) {
        Some(spec) => {
            buffer.set_color(&spec)?;
            buffer.write_all(line.as_bytes())?;
            buffer.reset()?;
        }
        None => buffer.write_all(line.as_bytes())?,
    }
    buffer.write_all(b"\n")
}
