//! Configuration subsystem.
//!
//! # Data Flow
//! ```text
//! TOML text or file
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → SwogConfig (validated, immutable)
//!     → DriverRegistry::from_config / NativeDriver::from_config / Logger
//! ```
//!
//! # Design Decisions
//! - Nothing is loaded implicitly; callers decide when and from where
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{ConsoleConfig, NativeConfig, OperationConfig, SwogConfig};
pub use validation::{validate_config, ValidationError};
