use chatter_core::ChatterConfig;
use chatter_gateway::AppState;
use clap::Parser;
use std::sync::Arc;
use tracing::{info, warn};

/// Real-time broadcast chat server.
#[derive(Debug, Parser)]
#[command(name = "chatter-gateway", version, about)]
struct Cli {
    /// Run on the given port
    #[arg(long)]
    port: Option<u16>,

    /// Bind address
    #[arg(long)]
    bind: Option<String>,

    /// Run in debug mode (verbose logging)
    #[arg(long)]
    debug: bool,

    /// Path to chatter.toml (defaults to $CHATTER_CONFIG, then ~/.chatter/chatter.toml)
    #[arg(long)]
    config: Option<String>,
}

impl Cli {
    /// Command-line flags win over file and env settings.
    fn apply(&self, config: &mut ChatterConfig) {
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(ref bind) = self.bind {
            config.server.bind = bind.clone();
        }
        if self.debug {
            config.server.debug = true;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // load config: --config > CHATTER_CONFIG env > ~/.chatter/chatter.toml
    let config_path = cli
        .config
        .clone()
        .or_else(|| std::env::var("CHATTER_CONFIG").ok());
    let loaded = ChatterConfig::load(config_path.as_deref());
    let mut config = match &loaded {
        Ok(c) => c.clone(),
        Err(_) => ChatterConfig::default(),
    };
    cli.apply(&mut config);

    init_tracing(config.server.debug);
    if let Err(e) = loaded {
        warn!(code = e.code(), "Config load failed ({}), using defaults", e);
    }

    let listener = chatter_gateway::bind(&config).await?;
    let state = Arc::new(AppState::new(config));
    chatter_gateway::serve(listener, state, shutdown_signal()).await?;

    info!("Server stopped");
    Ok(())
}

fn init_tracing(debug: bool) {
    let default_filter = if debug {
        "chatter_gateway=debug,chatter_hub=debug,tower_http=debug"
    } else {
        "chatter_gateway=info,chatter_hub=info,tower_http=debug"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for ctrl-c: {e}");
        std::future::pending::<()>().await;
    }
    info!("Server shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_flags_keep_config() {
        let cli = Cli::parse_from(["chatter-gateway"]);
        let mut config = ChatterConfig::default();
        cli.apply(&mut config);
        assert_eq!(config.server.port, chatter_core::config::DEFAULT_PORT);
        assert!(!config.server.debug);
    }

    #[test]
    fn flags_override_config() {
        let cli = Cli::parse_from([
            "chatter-gateway",
            "--port",
            "9001",
            "--bind",
            "127.0.0.1",
            "--debug",
        ]);
        let mut config = ChatterConfig::default();
        cli.apply(&mut config);
        assert_eq!(config.listen_addr(), "127.0.0.1:9001");
        assert!(config.server.debug);
    }

    #[test]
    fn rejects_non_numeric_port() {
        assert!(Cli::try_parse_from(["chatter-gateway", "--port", "abc"]).is_err());
    }
}
