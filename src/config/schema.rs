//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::driver::ColorMode;
use crate::message::DisclosurePolicy;
use crate::operation::MisusePolicy;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct SwogConfig {
    /// The default console driver.
    pub console: ConsoleConfig,

    /// Native sink forwarding.
    pub native: NativeConfig,

    /// Operation lifecycle behavior.
    pub operations: OperationConfig,
}

/// Console driver configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Register a console driver in `DriverRegistry::from_config`.
    pub enabled: bool,

    /// When to emit ANSI colors.
    pub color: ColorMode,

    /// What the console may reveal.
    pub disclosure: DisclosurePolicy,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            color: ColorMode::Auto,
            disclosure: DisclosurePolicy::default(),
        }
    }
}

/// Native driver configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct NativeConfig {
    /// Prepended to the subsystem derived from each call site.
    pub subsystem_prefix: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct OperationConfig {
    /// Reaction to `event` / `end` before `begin`.
    pub misuse: MisusePolicy,
}
