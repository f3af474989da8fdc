use sweeper_core::Completion;
use sweeper_protocol::SubmissionStatus;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::LeaderboardClient;

/// Fire-and-forget score submission with an observable status.
///
/// Uploads are not cancelled: a later upload only overwrites the status once its own
/// request settles.
#[derive(Debug)]
pub struct ScoreUploader {
    client: LeaderboardClient,
    status: watch::Sender<SubmissionStatus>,
}

impl ScoreUploader {
    pub fn new(client: LeaderboardClient) -> Self {
        Self {
            client,
            status: watch::Sender::new(SubmissionStatus::Idle),
        }
    }

    pub fn status(&self) -> SubmissionStatus {
        *self.status.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<SubmissionStatus> {
        self.status.subscribe()
    }

    /// Marks the status `Pending` and submits in a background task.
    ///
    /// Must be called from within a tokio runtime.
    pub fn upload(&self, player: impl Into<String>, completion: Completion) -> JoinHandle<()> {
        let player = player.into();
        let client = self.client.clone();
        let status = self.status.clone();
        status.send_replace(SubmissionStatus::Pending);

        tokio::spawn(async move {
            let settled = match client.submit_completion(&player, completion).await {
                Ok(rank) => {
                    info!(%player, rank, "Score submitted");
                    SubmissionStatus::Ranked(rank)
                }
                Err(err) => {
                    warn!(%player, %err, "Score submission failed");
                    SubmissionStatus::Failed
                }
            };
            status.send_replace(settled);
        })
    }
}
