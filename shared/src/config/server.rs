//! Server configuration module

use serde::{Deserialize, Serialize};

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Service name; every route is mounted under `/<server_name>`
    pub server_name: String,

    /// Server host address
    pub host: String,

    /// Server port
    pub port: u16,

    /// Worker threads (0 = number of CPU cores)
    #[serde(default)]
    pub workers: usize,

    /// Capacity of the request context pool
    #[serde(default = "default_context_pool_size")]
    pub context_pool_size: usize,

    /// Mount administrative routes such as forced logout
    #[serde(default)]
    pub admin_routes_enabled: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server_name: String::from("tokengate"),
            host: String::from("0.0.0.0"),
            port: 8080,
            workers: 0,  // Use all CPU cores
            context_pool_size: default_context_pool_size(),
            admin_routes_enabled: false,
        }
    }
}

impl ServerConfig {
    /// Create a new server configuration
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Create from `SERVER_NAME`, `SERVER_HOST`, `SERVER_PORT`, `SERVER_WORKERS`
    /// and `ADMIN_ROUTES_ENABLED`
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_name: std::env::var("SERVER_NAME").unwrap_or(defaults.server_name),
            host: std::env::var("SERVER_HOST").unwrap_or(defaults.host),
            port: std::env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),
            workers: std::env::var("SERVER_WORKERS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.workers),
            context_pool_size: defaults.context_pool_size,
            admin_routes_enabled: env_flag("ADMIN_ROUTES_ENABLED").unwrap_or(defaults.admin_routes_enabled),
        }
    }

    /// Get the bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Route prefix shared by every endpoint
    pub fn base_path(&self) -> String {
        format!("/{}", self.server_name.trim_matches('/'))
    }
}

fn default_context_pool_size() -> usize {
    1024
}

/// Cross-origin resource sharing, off unless enabled
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CorsConfig {
    #[serde(default)]
    pub enabled: bool,

    /// Allowed origins; empty or `*` allows any origin
    #[serde(default)]
    pub allowed_origins: Vec<String>,

    #[serde(default = "default_allow_credentials")]
    pub allow_credentials: bool,

    /// Preflight cache lifetime in seconds
    #[serde(default = "default_max_age")]
    pub max_age: usize,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            allowed_origins: Vec::new(),
            allow_credentials: default_allow_credentials(),
            max_age: default_max_age(),
        }
    }
}

impl CorsConfig {
    /// Load from `CORS_ENABLED`, `CORS_ALLOWED_ORIGINS` (comma separated),
    /// `CORS_ALLOW_CREDENTIALS` and `CORS_MAX_AGE`
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            enabled: env_flag("CORS_ENABLED").unwrap_or(defaults.enabled),
            allowed_origins: std::env::var("CORS_ALLOWED_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(str::trim)
                        .filter(|o| !o.is_empty())
                        .map(String::from)
                        .collect()
                })
                .unwrap_or(defaults.allowed_origins),
            allow_credentials: env_flag("CORS_ALLOW_CREDENTIALS").unwrap_or(defaults.allow_credentials),
            max_age: std::env::var("CORS_MAX_AGE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_age),
        }
    }

    /// Whether every origin is accepted
    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.is_empty() || self.allowed_origins.iter().any(|o| o == "*")
    }
}

fn default_allow_credentials() -> bool {
    true
}

fn default_max_age() -> usize {
    3600
}

/// `1`, `true` or `yes` (any case) as true; other values as false
fn env_flag(name: &str) -> Option<bool> {
    std::env::var(name)
        .ok()
        .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_address() {
        let config = ServerConfig::new("127.0.0.1", 9000);
        assert_eq!(config.bind_address(), "127.0.0.1:9000");
    }

    #[test]
    fn test_base_path_trims_slashes() {
        let config = ServerConfig {
            server_name: String::from("/shop/"),
            ..Default::default()
        };
        assert_eq!(config.base_path(), "/shop");
        assert_eq!(ServerConfig::default().base_path(), "/tokengate");
    }

    #[test]
    fn test_cors_any_origin() {
        let config = CorsConfig::default();
        assert!(!config.enabled);
        assert!(config.allows_any_origin());

        let config = CorsConfig {
            allowed_origins: vec![String::from("https://app.example.com")],
            ..Default::default()
        };
        assert!(!config.allows_any_origin());
    }

    #[test]
    fn test_admin_routes_off_by_default() {
        assert!(!ServerConfig::default().admin_routes_enabled);
        let config: ServerConfig =
            serde_json::from_str(r#"{"server_name":"svc","host":"0.0.0.0","port":80}"#).unwrap();
        assert!(!config.admin_routes_enabled);
    }
}
