use std::net::SocketAddr;

use anyhow::Result;
use clap::Parser;
use fitshare_devserver::InnerServerState;
use tokio::net::TcpListener;
use tracing::info;

#[derive(Debug, Parser)]
#[command(
    name = "fitshare-devserver",
    about = "In-memory stand-in for the fitshare REST backend"
)]
struct DevServerConfig {
    /// Address to bind
    #[arg(long, env = "FITSHARE_BIND", default_value = "127.0.0.1")]
    bind: String,

    /// Port to listen on
    #[arg(long, env = "FITSHARE_PORT", default_value = "8080")]
    port: u16,

    /// Bearer token required on /api routes other than health and media files
    #[arg(long, env = "FITSHARE_TOKEN")]
    token: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = DevServerConfig::parse();
    let addr = SocketAddr::new(config.bind.parse()?, config.port);

    if config.token.is_some() {
        info!("authentication enabled");
    } else {
        info!("authentication disabled (no FITSHARE_TOKEN)");
    }

    let state = InnerServerState::shared(config.token);
    let listener = TcpListener::bind(addr).await?;
    info!("fitshare-devserver listening on http://{addr}/api");

    fitshare_devserver::serve(listener, state).await
}
