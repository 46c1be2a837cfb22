//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files and
//! every field has a default, so an empty file is a valid configuration.

use serde::{Deserialize, Serialize};

/// Root configuration for the service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Secure headers and HTTPS redirection.
    pub security: SecurityConfig,

    /// CORS response headers.
    pub cors: CorsConfig,

    /// Request limits.
    pub request: RequestConfig,

    /// Logging settings.
    pub logging: LoggingConfig,
}

impl ServerConfig {
    /// Apply overrides from the process environment.
    ///
    /// See [`ServerConfig::apply_env_with`].
    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    /// Apply overrides from `lookup`.
    ///
    /// - `HTTPS`, or `JEST_HTTPS` when `HTTPS` is unset or empty: HTTPS
    ///   redirection is disabled only by the exact value `false`
    /// - `DYNO` (set by the platform router): any non-empty value trusts
    ///   `X-Forwarded-Proto`
    /// - `PORT`: replaces the port of the bind address
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let https = lookup("HTTPS")
            .filter(|v| !v.is_empty())
            .or_else(|| lookup("JEST_HTTPS").filter(|v| !v.is_empty()));
        if let Some(https) = https {
            self.security.https_redirect = https != "false";
        }

        if lookup("DYNO").is_some_and(|v| !v.is_empty()) {
            self.security.use_forwarded_proto = true;
        }

        if let Some(port) = lookup("PORT").and_then(|p| p.parse::<u16>().ok()) {
            let host = self
                .listener
                .bind_address
                .rsplit_once(':')
                .map(|(host, _)| host)
                .unwrap_or("0.0.0.0");
            self.listener.bind_address = format!("{}:{}", host, port);
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:5000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:5000".to_string(),
        }
    }
}

/// Secure response headers and HTTPS redirection.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Redirect plain HTTP requests to HTTPS (301).
    pub https_redirect: bool,

    /// Trust `X-Forwarded-Proto` to decide whether a request is HTTPS.
    pub use_forwarded_proto: bool,

    /// Serve loopback clients over plain HTTP without redirecting.
    pub permit_clear_loopback: bool,

    /// `Strict-Transport-Security` max-age in seconds (0 disables the header).
    pub hsts_max_age_secs: u64,

    /// Append `includeSubDomains` to `Strict-Transport-Security`.
    pub hsts_include_subdomains: bool,

    /// Send `X-Frame-Options: DENY`.
    pub frame_options: bool,

    /// Send `X-Content-Type-Options: nosniff`.
    pub content_type_options: bool,

    /// Send `X-XSS-Protection`.
    pub xss_protection: bool,

    /// Use `1; mode=block` instead of `1` for `X-XSS-Protection`.
    pub xss_protection_block: bool,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            https_redirect: true,
            use_forwarded_proto: false,
            permit_clear_loopback: false,
            hsts_max_age_secs: 100 * 24 * 60 * 60, // 100 days
            hsts_include_subdomains: true,
            frame_options: true,
            content_type_options: true,
            xss_protection: true,
            xss_protection_block: false,
        }
    }
}

/// CORS response headers added by the dispatcher.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Echo the request `Origin` as `Access-Control-Allow-Origin`.
    pub mirror_origin: bool,

    /// Value of `Access-Control-Allow-Headers` (empty disables the header).
    pub allow_headers: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            mirror_origin: true,
            allow_headers: ["Authorization", "Accept", "Range", "Content-Type", "Host", "Origin"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

/// Request handling limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RequestConfig {
    /// Maximum buffered body size in bytes.
    pub max_body_bytes: usize,

    /// Total time allowed per request, in seconds.
    pub timeout_secs: u64,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 1024 * 1024,
            timeout_secs: 30,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default `tracing` filter directive; `RUST_LOG` takes precedence.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}
