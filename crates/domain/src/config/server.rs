use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Server
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "d_8000")]
    pub port: u16,
    #[serde(default = "d_host")]
    pub host: String,
    #[serde(default)]
    pub cors: CorsConfig,
    /// WebSocket keepalive / idle-timeout tuning.
    #[serde(default)]
    pub ws: WsConfig,
    /// Per-IP token-bucket rate limiting.  `None` (default) disables it —
    /// suitable for local development.
    #[serde(default)]
    pub rate_limit: Option<RateLimitConfig>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            host: "127.0.0.1".into(),
            cors: CorsConfig::default(),
            ws: WsConfig::default(),
            rate_limit: None,
        }
    }
}

/// WebSocket connection tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WsConfig {
    /// Close the socket when no frame has arrived for this long.
    #[serde(default = "d_60")]
    pub idle_timeout_sec: u64,
    /// Interval for server-initiated keepalive pings.
    #[serde(default = "d_30")]
    pub keepalive_interval_sec: u64,
}

impl Default for WsConfig {
    fn default() -> Self {
        Self {
            idle_timeout_sec: 60,
            keepalive_interval_sec: 30,
        }
    }
}

/// Per-IP token-bucket rate limiting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Quota replenishment rate — one token every `1 / requests_per_second` seconds.
    pub requests_per_second: u64,
    /// Maximum tokens in the bucket.
    pub burst_size: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Origins allowed for CORS. Use `["*"]` for permissive (NOT recommended).
    /// Defaults to localhost-only.
    #[serde(default = "d_cors_origins")]
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: d_cors_origins(),
        }
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_8000() -> u16 {
    8000
}
fn d_host() -> String {
    "127.0.0.1".into()
}
fn d_60() -> u64 {
    60
}
fn d_30() -> u64 {
    30
}
fn d_cors_origins() -> Vec<String> {
    vec!["http://localhost:*".into(), "http://127.0.0.1:*".into()]
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_config_default_has_no_rate_limit() {
        let cfg = ServerConfig::default();
        assert!(cfg.rate_limit.is_none());
        assert_eq!(cfg.port, 8000);
    }

    #[test]
    fn ws_defaults_match_keepalive_contract() {
        let cfg = WsConfig::default();
        assert!(cfg.keepalive_interval_sec < cfg.idle_timeout_sec);
    }

    #[test]
    fn server_config_parses_rate_limit() {
        let toml_str = r#"
            host = "0.0.0.0"
            [rate_limit]
            requests_per_second = 10
            burst_size = 20
        "#;
        let cfg: ServerConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.host, "0.0.0.0");
        assert_eq!(cfg.rate_limit.unwrap().burst_size, 20);
    }
}
