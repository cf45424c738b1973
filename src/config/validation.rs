//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, expiration > 0, name length)
//! - Check the endpoint is an http(s) URL
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ClientConfig → Result<(), Vec<ValidationError>>

use std::fmt;

use crate::accounts::keys::MAX_ACCOUNT_NAME_LEN;
use crate::config::schema::ClientConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &ClientConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match url::Url::parse(&config.endpoint.url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ValidationError::new(
            "endpoint.url",
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new("endpoint.url", e.to_string())),
    }
    if config.endpoint.timeout_secs == 0 {
        errors.push(ValidationError::new("endpoint.timeout_secs", "must be > 0"));
    }

    if config.transaction.expire_seconds == 0 {
        errors.push(ValidationError::new("transaction.expire_seconds", "must be > 0"));
    }

    let provisioning = &config.provisioning;
    if provisioning.creator.is_empty() {
        errors.push(ValidationError::new("provisioning.creator", "must not be empty"));
    }
    if provisioning.system_contract.is_empty() {
        errors.push(ValidationError::new("provisioning.system_contract", "must not be empty"));
    }
    if provisioning.ram_bytes == 0 {
        errors.push(ValidationError::new("provisioning.ram_bytes", "must be > 0"));
    }
    if provisioning.symbol.is_empty() {
        errors.push(ValidationError::new("provisioning.symbol", "must not be empty"));
    }
    if provisioning.name_length == 0 || provisioning.name_length > MAX_ACCOUNT_NAME_LEN {
        errors.push(ValidationError::new(
            "provisioning.name_length",
            format!("must be within 1..={}", MAX_ACCOUNT_NAME_LEN),
        ));
    }

    if config.retry.max_attempts == 0 {
        errors.push(ValidationError::new("retry.max_attempts", "must be >= 1"));
    }
    if config.retry.base_delay_ms > config.retry.max_delay_ms {
        errors.push(ValidationError::new(
            "retry.base_delay_ms",
            "must not exceed retry.max_delay_ms",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
