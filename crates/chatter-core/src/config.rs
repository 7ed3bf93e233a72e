use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PORT: u16 = 8888;
pub const DEFAULT_BIND: &str = "0.0.0.0";
pub const DEFAULT_DELIVERY_TIMEOUT_MS: u64 = 5_000; // bound on one slow recipient
pub const MAX_PAYLOAD_BYTES: usize = 64 * 1024; // 64 KB cap per inbound frame
pub const DEFAULT_OUTBOUND_QUEUE: usize = 256; // pending envelopes per client

/// Top-level config (chatter.toml + CHATTER_* env overrides).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatterConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub hub: HubConfig,
}

/// Listener settings. Only decides where the gateway binds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Raises the chatter crates' log level to debug.
    #[serde(default)]
    pub debug: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind: DEFAULT_BIND.to_string(),
            debug: false,
        }
    }
}

/// Broadcast engine tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubConfig {
    /// Upper bound for one socket write to one recipient.
    #[serde(default = "default_delivery_timeout_ms")]
    pub delivery_timeout_ms: u64,
    /// Inbound frames larger than this are dropped as protocol errors.
    #[serde(default = "default_max_payload_bytes")]
    pub max_payload_bytes: usize,
    /// Envelopes buffered per client before further deliveries to it fail.
    #[serde(default = "default_outbound_queue")]
    pub outbound_queue: usize,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            delivery_timeout_ms: DEFAULT_DELIVERY_TIMEOUT_MS,
            max_payload_bytes: MAX_PAYLOAD_BYTES,
            outbound_queue: DEFAULT_OUTBOUND_QUEUE,
        }
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}
fn default_delivery_timeout_ms() -> u64 {
    DEFAULT_DELIVERY_TIMEOUT_MS
}
fn default_max_payload_bytes() -> usize {
    MAX_PAYLOAD_BYTES
}
fn default_outbound_queue() -> usize {
    DEFAULT_OUTBOUND_QUEUE
}

impl ChatterConfig {
    /// Load config from a TOML file with CHATTER_* env var overrides.
    ///
    /// Checks in order:
    ///   1. Explicit path argument
    ///   2. ~/.chatter/chatter.toml
    ///
    /// A missing file is not an error; every field has a default.
    /// Env keys use `__` between section and field: `CHATTER_SERVER__PORT=9000`.
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        Self::from_figment(
            Figment::new()
                .merge(Toml::file(&path))
                .merge(Env::prefixed("CHATTER_").split("__")),
        )
    }

    /// Extract from an already assembled figment.
    pub fn from_figment(figment: Figment) -> crate::error::Result<Self> {
        figment
            .extract()
            .map_err(|e| crate::error::ChatterError::Config(e.to_string()))
    }

    /// `bind:port` string handed to the TCP listener.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.bind, self.server.port)
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.chatter/chatter.toml", home)
}
