//! vpncheck-srv - VPN/proxy verdict endpoint

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    vpncheck_srv::cli::run().await
}
