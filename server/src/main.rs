use anyhow::Result;
use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};
use sweeper_server::{LeaderboardServer, ServerConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Leaderboard server for sweeper.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    #[command(flatten)]
    server: ServerConfig,

    #[command(flatten)]
    verbosity: Verbosity<InfoLevel>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over -v/-q when set
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(cli.verbosity.tracing_level_filter().into())
                .from_env_lossy(),
        )
        .init();

    let server = LeaderboardServer::start(cli.server).await?;
    info!("Scores at {}/top", server.url());

    let stop = server.stop_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl-C received, saving and stopping");
            stop.stop();
        }
    });

    server.wait().await
}
