use std::time::Duration;

use sweeper_core::ScoreRecord;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::LeaderboardClient;

/// Shortest interval accepted by [`LeaderboardPoller::spawn`].
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Background task refreshing the top scores on a fixed interval.
#[derive(Debug)]
pub struct LeaderboardPoller {
    latest: watch::Receiver<Vec<ScoreRecord>>,
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl LeaderboardPoller {
    /// Starts polling right away, then every `interval`, raised to [`MIN_POLL_INTERVAL`].
    pub fn spawn(client: LeaderboardClient, interval: Duration) -> Self {
        if interval < MIN_POLL_INTERVAL {
            warn!(?interval, "Poll interval too short, using {:?}", MIN_POLL_INTERVAL);
        }
        let interval = interval.max(MIN_POLL_INTERVAL);
        let (latest_tx, latest) = watch::channel(Vec::new());
        let (shutdown, mut shutdown_rx) = watch::channel(false);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    _ = shutdown_rx.wait_for(|stop| *stop) => break,
                    _ = ticker.tick() => {}
                }

                // shutdown is only observed between fetches
                match client.top().await {
                    Ok(records) => {
                        debug!(count = records.len(), "Leaderboard refreshed");
                        latest_tx.send_replace(records);
                    }
                    Err(err) => warn!(%err, "Leaderboard refresh failed, keeping previous list"),
                }
            }
        });

        Self {
            latest,
            shutdown,
            task,
        }
    }

    pub fn latest(&self) -> Vec<ScoreRecord> {
        self.latest.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<ScoreRecord>> {
        self.latest.clone()
    }

    /// Stops further polls and waits for an in-flight fetch to finish.
    pub async fn shutdown(self) {
        self.shutdown.send_replace(true);
        if let Err(err) = self.task.await {
            warn!(%err, "Leaderboard poller panicked");
        }
    }
}
