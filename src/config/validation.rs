//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, limits > 0)
//! - Check that configured header names are legal
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::HeaderName;
use thiserror::Error;

use crate::config::schema::ServerConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address {0:?} is not a socket address")]
    BindAddress(String),

    #[error("request.max_body_bytes must be greater than zero")]
    ZeroBodyLimit,

    #[error("request.timeout_secs must be greater than zero")]
    ZeroTimeout,

    #[error("security.hsts_include_subdomains requires hsts_max_age_secs > 0")]
    SubdomainsWithoutHsts,

    #[error("cors.allow_headers entry {0:?} is not a valid header name")]
    AllowHeader(String),
}

/// Check `config` and report every problem found.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.request.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    if config.request.timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    if config.security.hsts_include_subdomains && config.security.hsts_max_age_secs == 0 {
        errors.push(ValidationError::SubdomainsWithoutHsts);
    }

    for name in &config.cors.allow_headers {
        if HeaderName::from_bytes(name.as_bytes()).is_err() {
            errors.push(ValidationError::AllowHeader(name.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
