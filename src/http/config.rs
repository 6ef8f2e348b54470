//! HTTP server configuration

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Interval, in seconds, between reaper sweeps. `0` disables the
    /// reaper entirely (the default for single-shot/test configurations).
    #[serde(default)]
    pub reaper_interval_seconds: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5943
}

fn default_cors_origins() -> Vec<String> {
    Vec::new()
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: default_cors_origins(),
            reaper_interval_seconds: 0,
        }
    }
}

impl HttpServerConfig {
    pub fn with_port(port: u16) -> Self {
        Self { port, ..Default::default() }
    }

    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn reaper_enabled(&self) -> bool {
        self.reaper_interval_seconds > 0
    }
}
