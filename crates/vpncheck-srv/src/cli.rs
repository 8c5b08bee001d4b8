//! Command-line entry point.

use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ServerConfig;

/// VPN/proxy/Tor verdict endpoint for edge deployments
#[derive(Parser, Debug)]
#[command(name = "vpncheck-srv")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the TOML config file (defaults are used if it does not exist)
    #[arg(short, long, value_name = "FILE", default_value = "vpncheck.toml")]
    pub config: PathBuf,

    /// Listen address, overrides the config file
    #[arg(short, long)]
    pub listen: Option<SocketAddr>,

    /// ipapi.is API key (or set IPAPI_KEY env var)
    #[arg(long, env = "IPAPI_KEY", hide_env_values = true)]
    pub ipapi_key: Option<String>,
}

/// Parse arguments, set up logging and run the server.
pub async fn run() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let mut config = ServerConfig::load(&cli.config)?;
    if let Some(listen) = cli.listen {
        config.listen = listen;
    }

    crate::server::run(&config, cli.ipapi_key).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["vpncheck-srv"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("vpncheck.toml"));
        assert!(cli.listen.is_none());
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::try_parse_from([
            "vpncheck-srv",
            "--config",
            "/etc/vpncheck.toml",
            "--listen",
            "127.0.0.1:9000",
            "--ipapi-key",
            "k",
        ])
        .unwrap();
        assert_eq!(cli.listen.map(|a| a.port()), Some(9000));
        assert_eq!(cli.ipapi_key.as_deref(), Some("k"));
    }
}
