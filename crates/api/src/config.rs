//! Server configuration, loaded once at startup.

use edgegate_core::GateConfig;
use edgegate_infra::BackendConfig;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_UPSTREAM_URL: &str = "http://127.0.0.1:4200";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// The web application that gated requests are forwarded to.
    pub upstream_url: String,
    pub gate: GateConfig,
    pub backend: BackendConfig,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let bind_addr =
            std::env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());

        let upstream_url = std::env::var("UPSTREAM_URL").unwrap_or_else(|_| {
            tracing::warn!("UPSTREAM_URL not set; forwarding to {DEFAULT_UPSTREAM_URL}");
            DEFAULT_UPSTREAM_URL.to_string()
        });

        Self {
            bind_addr,
            upstream_url,
            gate: GateConfig::from_env(),
            backend: BackendConfig::from_env(),
        }
    }
}
