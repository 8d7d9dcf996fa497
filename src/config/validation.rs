//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the native subsystem prefix is usable as an identifier prefix
//! - Bound the mask salt
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is a pure function: SwogConfig → Result<(), Vec<ValidationError>>

use thiserror::Error;

use crate::config::schema::SwogConfig;

/// Longest accepted mask salt, in bytes.
pub const MAX_MASK_SALT_LEN: usize = 256;

/// One semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("native.subsystem_prefix must not contain whitespace or '/': {0:?}")]
    InvalidSubsystemPrefix(String),

    #[error("console.disclosure.mask_salt is {len} bytes, limit is {max}")]
    MaskSaltTooLong { len: usize, max: usize },
}

/// Check `config`, collecting every violation.
pub fn validate_config(config: &SwogConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let prefix = &config.native.subsystem_prefix;
    if prefix.chars().any(|c| c.is_whitespace() || c == '/') {
        errors.push(ValidationError::InvalidSubsystemPrefix(prefix.clone()));
    }

    let salt_len = config.console.disclosure.mask_salt.len();
    if salt_len > MAX_MASK_SALT_LEN {
        errors.push(ValidationError::MaskSaltTooLong {
            len: salt_len,
            max: MAX_MASK_SALT_LEN,
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
