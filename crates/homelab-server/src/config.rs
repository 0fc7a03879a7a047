//! Server configuration loaded from environment variables.
//!
//! Every setting has a default so the service starts with zero
//! configuration for local development.

use std::net::SocketAddr;
use std::path::PathBuf;

use homelab_shared::constants::DEFAULT_HTTP_PORT;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address for the HTTP (axum) API server.
    /// Env: `HTTP_ADDR`
    /// Default: `0.0.0.0:8080`
    pub http_addr: SocketAddr,

    /// SQLite database file.
    /// Env: `DATABASE_PATH`
    /// Default: `None`, meaning the platform data directory.
    pub database_path: Option<PathBuf>,

    /// Human-readable name reported by `/info`.
    /// Env: `INSTANCE_NAME`
    pub instance_name: String,

    /// Admin API bearer token. Required for /api/admin/* endpoints.
    /// Env: `ADMIN_TOKEN`
    /// Default: empty (admin API disabled).
    pub admin_token: Option<String>,

    /// Sustained requests per second allowed per client on mutating routes.
    /// Env: `RATE_LIMIT_PER_SEC`
    pub rate_limit_per_sec: f64,

    /// Burst size for the same bucket.
    /// Env: `RATE_LIMIT_BURST`
    pub rate_limit_burst: f64,

    /// Largest accepted request body in bytes.
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: ([0, 0, 0, 0], DEFAULT_HTTP_PORT).into(),
            database_path: None,
            instance_name: "Homelab Comments".to_string(),
            admin_token: None,
            rate_limit_per_sec: 2.0,
            rate_limit_burst: 10.0,
            max_body_bytes: 64 * 1024,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(addr) = lookup("HTTP_ADDR") {
            if let Ok(parsed) = addr.parse::<SocketAddr>() {
                config.http_addr = parsed;
            } else {
                tracing::warn!(value = %addr, "Invalid HTTP_ADDR, using default");
            }
        }

        if let Some(path) = lookup("DATABASE_PATH") {
            if !path.trim().is_empty() {
                config.database_path = Some(PathBuf::from(path));
            }
        }

        if let Some(name) = lookup("INSTANCE_NAME") {
            config.instance_name = name;
        }

        if let Some(token) = lookup("ADMIN_TOKEN") {
            if !token.is_empty() {
                config.admin_token = Some(token);
            }
        }

        if let Some(val) = lookup("RATE_LIMIT_PER_SEC") {
            match parse_positive(&val) {
                Some(rate) => config.rate_limit_per_sec = rate,
                None => tracing::warn!(value = %val, "Invalid RATE_LIMIT_PER_SEC, using default"),
            }
        }

        if let Some(val) = lookup("RATE_LIMIT_BURST") {
            match parse_positive(&val) {
                Some(burst) if burst >= 1.0 => config.rate_limit_burst = burst,
                _ => tracing::warn!(value = %val, "Invalid RATE_LIMIT_BURST, using default"),
            }
        }

        // RUST_LOG is handled directly by tracing-subscriber's EnvFilter.

        config
    }
}

fn parse_positive(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v > 0.0)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn from_pairs(pairs: &[(&str, &str)]) -> ServerConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.http_addr, ([0, 0, 0, 0], 8080).into());
        assert!(config.database_path.is_none());
        assert!(config.admin_token.is_none());
    }

    #[test]
    fn test_env_overrides() {
        let config = from_pairs(&[
            ("HTTP_ADDR", "127.0.0.1:3000"),
            ("DATABASE_PATH", "/var/lib/homelab/comments.db"),
            ("ADMIN_TOKEN", "s3cret"),
            ("RATE_LIMIT_PER_SEC", "5"),
            ("RATE_LIMIT_BURST", "20"),
        ]);
        assert_eq!(config.http_addr, ([127, 0, 0, 1], 3000).into());
        assert_eq!(
            config.database_path,
            Some(PathBuf::from("/var/lib/homelab/comments.db"))
        );
        assert_eq!(config.admin_token.as_deref(), Some("s3cret"));
        assert_eq!(config.rate_limit_per_sec, 5.0);
        assert_eq!(config.rate_limit_burst, 20.0);
    }

    #[test]
    fn test_invalid_values_keep_defaults() {
        let config = from_pairs(&[
            ("HTTP_ADDR", "not-an-address"),
            ("ADMIN_TOKEN", ""),
            ("RATE_LIMIT_PER_SEC", "-1"),
            ("RATE_LIMIT_BURST", "0.5"),
        ]);
        let defaults = ServerConfig::default();
        assert_eq!(config.http_addr, defaults.http_addr);
        assert!(config.admin_token.is_none());
        assert_eq!(config.rate_limit_per_sec, defaults.rate_limit_per_sec);
        assert_eq!(config.rate_limit_burst, defaults.rate_limit_burst);
    }
}
