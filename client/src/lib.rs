//! Talks to a leaderboard server from a game front end.
//!
//! [`LeaderboardClient`] wraps the two public endpoints, [`ScoreUploader`] submits a
//! finished game in the background and [`LeaderboardPoller`] keeps a fresh copy of the top
//! scores around.

use std::time::Duration;

use reqwest::Url;
use sweeper_core::{Completion, ScoreRecord};
use sweeper_protocol::{ADD_PATH, AddQuery, ProtocolError, TOP_PATH, parse_rank, parse_top};

pub use sweeper_protocol::SubmissionStatus;

mod poller;
mod uploader;

pub use poller::{LeaderboardPoller, MIN_POLL_INTERVAL};
pub use uploader::ScoreUploader;

/// Whole-request timeout used by [`LeaderboardClient::new`].
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("invalid server url {0:?}")]
    Url(String),
    #[error("http: {0}")]
    Http(#[from] reqwest::Error),
    #[error("http {0}")]
    Status(reqwest::StatusCode),
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

#[derive(Clone, Debug)]
pub struct LeaderboardClient {
    http: reqwest::Client,
    base: Url,
}

impl LeaderboardClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Every request fails with [`ClientError::Http`] once `timeout` has elapsed.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let base = Url::parse(base_url).map_err(|_| ClientError::Url(base_url.to_owned()))?;
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Submits a completion time and returns the rank the server gave it.
    pub async fn submit(&self, player: &str, duration: Duration) -> Result<usize, ClientError> {
        let nanos = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);
        self.submit_nanos(player, nanos).await
    }

    pub async fn submit_completion(
        &self,
        player: &str,
        completion: Completion,
    ) -> Result<usize, ClientError> {
        self.submit_nanos(player, completion.duration_nanos()).await
    }

    pub async fn submit_nanos(&self, player: &str, nanos: u64) -> Result<usize, ClientError> {
        let query = AddQuery::new(player, nanos);
        let mut url = self.endpoint(ADD_PATH)?;
        {
            let mut pairs = url.query_pairs_mut();
            if let Some(id) = &query.id {
                pairs.append_pair("id", id);
            }
            if let Some(score) = &query.score {
                pairs.append_pair("score", score);
            }
        }

        let body = self.get_text(url).await?;
        Ok(parse_rank(&body)?)
    }

    /// Fetches the current top scores, best first.
    pub async fn top(&self) -> Result<Vec<ScoreRecord>, ClientError> {
        let url = self.endpoint(TOP_PATH)?;
        let body = self.get_text(url).await?;
        Ok(parse_top(&body))
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.base
            .join(path)
            .map_err(|_| ClientError::Url(format!("{}{path}", self.base)))
    }

    async fn get_text(&self, url: Url) -> Result<String, ClientError> {
        let res = self.http.get(url).send().await?;
        if !res.status().is_success() {
            return Err(ClientError::Status(res.status()));
        }
        Ok(res.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_base_url() {
        assert!(matches!(
            LeaderboardClient::new("not a url"),
            Err(ClientError::Url(_))
        ));
    }

    #[test]
    fn endpoints_resolve_against_base() {
        let client = LeaderboardClient::new("http://127.0.0.1:5784").unwrap();
        assert_eq!(
            client.endpoint(TOP_PATH).unwrap().as_str(),
            "http://127.0.0.1:5784/top"
        );
    }
}
