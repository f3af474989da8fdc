//! Leaderboard service: ranks timed completions and keeps them on disk between runs.

use std::net::SocketAddr;

use anyhow::Result;
use sweeper_core::SharedLeaderboard;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{error, info};

pub use config::ServerConfig;
pub use handler::{AppState, StopHandle, router};

mod config;
mod handler;
pub mod storage;

pub struct LeaderboardServer {
    local_addr: SocketAddr,
    leaderboard: SharedLeaderboard,
    stop: StopHandle,
    task: JoinHandle<()>,
}

impl LeaderboardServer {
    /// Loads the scores, binds and serves in the background until stopped.
    ///
    /// Scores are saved once the serve loop has drained.
    pub async fn start(config: ServerConfig) -> Result<Self> {
        let scores_path = config.scores_path.clone();
        let loaded = tokio::task::spawn_blocking(move || storage::load_scores(&scores_path)).await?;
        let leaderboard = SharedLeaderboard::new(loaded);

        let listener = TcpListener::bind((config.bind, config.port)).await?;
        let local_addr = listener.local_addr()?;

        let (stop, mut stop_rx) = StopHandle::new();
        let app = router(AppState::new(
            leaderboard.clone(),
            &config.stop_secret,
            stop.clone(),
        ));

        let board = leaderboard.clone();
        let scores_path = config.scores_path;
        let task = tokio::spawn(async move {
            let served = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = stop_rx.wait_for(|stopping| *stopping).await;
                })
                .await;
            if let Err(err) = served {
                error!(%err, "Leaderboard server failed");
            }

            let saved =
                tokio::task::spawn_blocking(move || storage::save_scores(&scores_path, &board))
                    .await
                    .map_err(|err| anyhow::anyhow!("save scores: {err:#}"))
                    .and_then(|saved| saved);
            if let Err(err) = saved {
                error!(err = format!("{err:#}"), "Error while saving scores, ignoring save");
            }
            info!("Leaderboard server stopped");
        });

        info!(%local_addr, "Leaderboard server listening");
        Ok(Self {
            local_addr,
            leaderboard,
            stop,
            task,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Base URL for clients, e.g. `http://127.0.0.1:5784`.
    pub fn url(&self) -> String {
        format!("http://{}", self.local_addr)
    }

    pub fn leaderboard(&self) -> &SharedLeaderboard {
        &self.leaderboard
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn shutdown(&self) {
        self.stop.stop();
    }

    /// Waits for the serve loop to end and the scores to be written.
    pub async fn wait(self) -> Result<()> {
        self.task.await?;
        Ok(())
    }
}
