//! Configuration module for environment variable parsing.
//!
//! Both secrets are read once at startup and handed to the handlers through
//! [`crate::web::AppState`]. Nothing in the verification path reads the
//! process environment.

use std::env;
use std::fmt;
use tracing::warn;

/// Fallback verification token for local development only.
pub const DEFAULT_VERIFY_TOKEN: &str = "my_test_verify_token";

/// Fallback application secret for local development only.
pub const DEFAULT_APP_SECRET: &str = "my_test_app_secret";

/// Default port, matching the platform's quickstart.
pub const DEFAULT_PORT: u16 = 3000;

/// Default ceiling for buffered webhook bodies (100 KiB).
pub const DEFAULT_MAX_BODY_BYTES: usize = 100 * 1024;

/// Application configuration loaded from environment variables.
#[derive(Clone)]
pub struct Config {
    /// Port for the web server to listen on
    pub port: u16,

    /// Token the platform echoes back during the subscription handshake
    pub verify_token: String,

    /// Shared secret used to sign event payloads (HMAC-SHA1)
    pub app_secret: String,

    /// Maximum number of body bytes captured for signature verification
    pub max_body_bytes: usize,
}

impl Config {
    /// Build a configuration with explicit secrets and default server settings.
    pub fn new(verify_token: impl Into<String>, app_secret: impl Into<String>) -> Self {
        Config {
            port: DEFAULT_PORT,
            verify_token: verify_token.into(),
            app_secret: app_secret.into(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Config {
            port: parse_number("PORT", DEFAULT_PORT),

            verify_token: env::var("VERIFY_TOKEN")
                .unwrap_or_else(|_| DEFAULT_VERIFY_TOKEN.to_string()),

            app_secret: env::var("APP_SECRET").unwrap_or_else(|_| DEFAULT_APP_SECRET.to_string()),

            max_body_bytes: parse_number("MAX_BODY_BYTES", DEFAULT_MAX_BODY_BYTES),
        }
    }

    /// Whether either secret is still the development fallback.
    ///
    /// Must be false in any production deployment.
    pub fn uses_default_secrets(&self) -> bool {
        self.verify_token == DEFAULT_VERIFY_TOKEN || self.app_secret == DEFAULT_APP_SECRET
    }
}

// Secrets never reach the logs, even through `?config`.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("verify_token", &"<redacted>")
            .field("app_secret", &"<redacted>")
            .field("max_body_bytes", &self.max_body_bytes)
            .finish()
    }
}

/// Parse a numeric environment variable, falling back to `default`.
fn parse_number<T: std::str::FromStr>(name: &str, default: T) -> T {
    let raw = match env::var(name) {
        Ok(v) => v,
        Err(_) => return default,
    };

    match raw.trim().parse() {
        Ok(value) => value,
        Err(_) => {
            warn!(env_var = name, value = %raw, "Invalid number, using default");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_uses_server_defaults() {
        let config = Config::new("token", "secret");
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.max_body_bytes, DEFAULT_MAX_BODY_BYTES);
        assert!(!config.uses_default_secrets());
    }

    #[test]
    fn test_uses_default_secrets() {
        assert!(Config::new(DEFAULT_VERIFY_TOKEN, "real-secret").uses_default_secrets());
        assert!(Config::new("real-token", DEFAULT_APP_SECRET).uses_default_secrets());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let rendered = format!("{:?}", Config::new("visible-token", "visible-secret"));
        assert!(!rendered.contains("visible-token"));
        assert!(!rendered.contains("visible-secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_parse_number_valid() {
        env::set_var("PAGEHOOK_TEST_NUMBER", " 8080 ");
        assert_eq!(parse_number("PAGEHOOK_TEST_NUMBER", 1u16), 8080);
        env::remove_var("PAGEHOOK_TEST_NUMBER");
    }

    #[test]
    fn test_parse_number_invalid_falls_back() {
        env::set_var("PAGEHOOK_TEST_BAD_NUMBER", "lots");
        assert_eq!(parse_number("PAGEHOOK_TEST_BAD_NUMBER", 42usize), 42);
        env::remove_var("PAGEHOOK_TEST_BAD_NUMBER");
    }

    #[test]
    fn test_parse_number_default() {
        assert_eq!(parse_number("PAGEHOOK_NONEXISTENT_VAR", 7u16), 7);
    }
}
