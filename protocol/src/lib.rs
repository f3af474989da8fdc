//! Plain-text leaderboard protocol shared by the server and its clients.
//!
//! Every route is a `GET` with query parameters, answers are bare text bodies:
//! - `/add?id=<player>&score=<nanos>` answers the decimal rank, or nothing when the query is bad.
//! - `/top` answers up to [`TOP_LIMIT`] lines of `"<nanos> <player>"`, CRLF separated.
//! - `/stop?pwd=<secret>` persists and stops the server when the secret matches.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use sweeper_core::ScoreRecord;

pub const DEFAULT_PORT: u16 = 5784;

/// Scores returned by `/top`.
pub const TOP_LIMIT: usize = 20;

pub const DEFAULT_SCORES_PATH: &str = "scores.txt";

/// Shared secret accepted by `/stop` unless the server is configured otherwise.
pub const DEFAULT_STOP_SECRET: &str = "secret_passw!<<>ord";

pub const ADD_PATH: &str = "/add";
pub const TOP_PATH: &str = "/top";
pub const STOP_PATH: &str = "/stop";

const LINE_SEPARATOR: &str = "\r\n";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Missing player id")]
    MissingPlayer,
    #[error("Player id cannot contain line breaks")]
    InvalidPlayer,
    #[error("Missing score")]
    MissingScore,
    #[error("Invalid score {0:?}")]
    InvalidScore(String),
    #[error("Submission was rejected")]
    Rejected,
    #[error("Invalid rank {0:?}")]
    InvalidRank(String),
}

/// Query of `/add`, fields stay optional so a bad request still deserializes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddQuery {
    pub id: Option<String>,
    pub score: Option<String>,
}

impl AddQuery {
    pub fn new(player: impl Into<String>, duration_nanos: u64) -> Self {
        Self {
            id: Some(player.into()),
            score: Some(duration_nanos.to_string()),
        }
    }

    pub fn validate(&self) -> Result<(String, u64), ProtocolError> {
        let player = self
            .id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or(ProtocolError::MissingPlayer)?;
        if player.contains(['\r', '\n']) {
            return Err(ProtocolError::InvalidPlayer);
        }

        let score = self
            .score
            .as_deref()
            .filter(|score| !score.is_empty())
            .ok_or(ProtocolError::MissingScore)?;
        let duration_nanos = score
            .parse()
            .map_err(|_| ProtocolError::InvalidScore(score.to_owned()))?;

        Ok((player.to_owned(), duration_nanos))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopQuery {
    pub pwd: Option<String>,
}

impl StopQuery {
    pub fn new(pwd: impl Into<String>) -> Self {
        Self {
            pwd: Some(pwd.into()),
        }
    }

    pub fn authorizes(&self, secret: &str) -> bool {
        self.pwd.as_deref() == Some(secret)
    }
}

pub fn format_rank(rank: usize) -> String {
    rank.to_string()
}

/// Reads the body of `/add`, an empty body means the server refused the query.
pub fn parse_rank(body: &str) -> Result<usize, ProtocolError> {
    let body = body.trim();
    if body.is_empty() {
        return Err(ProtocolError::Rejected);
    }
    match body.parse() {
        Ok(rank) if rank > 0 => Ok(rank),
        _ => Err(ProtocolError::InvalidRank(body.to_owned())),
    }
}

/// Body of `/top`, at most [`TOP_LIMIT`] records.
pub fn format_top<'a>(records: impl IntoIterator<Item = &'a ScoreRecord>) -> String {
    records
        .into_iter()
        .take(TOP_LIMIT)
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(LINE_SEPARATOR)
}

/// Reads the body of `/top`, dropping lines that do not parse.
pub fn parse_top(body: &str) -> Vec<ScoreRecord> {
    body.lines()
        .filter(|line| !line.is_empty())
        .filter_map(|line| match line.parse::<ScoreRecord>() {
            Ok(record) => Some(record),
            Err(err) => {
                log::warn!("Ignoring leaderboard line {:?}: {}", line, err);
                None
            }
        })
        .collect()
}

/// State of the last score submission as shown to the player.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubmissionStatus {
    /// Nothing submitted yet.
    #[default]
    Idle,
    Pending,
    Failed,
    Ranked(usize),
}

impl SubmissionStatus {
    pub const fn is_settled(self) -> bool {
        matches!(self, Self::Failed | Self::Ranked(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_query_validation() {
        assert_eq!(
            AddQuery::new("alice", 1234).validate(),
            Ok(("alice".to_owned(), 1234))
        );
        assert_eq!(
            AddQuery::default().validate(),
            Err(ProtocolError::MissingPlayer)
        );
        assert_eq!(
            AddQuery {
                id: Some(String::new()),
                score: Some("1".into())
            }
            .validate(),
            Err(ProtocolError::MissingPlayer)
        );
        assert_eq!(
            AddQuery {
                id: Some("bob".into()),
                score: None
            }
            .validate(),
            Err(ProtocolError::MissingScore)
        );
        assert_eq!(
            AddQuery {
                id: Some("bob".into()),
                score: Some("1.5".into())
            }
            .validate(),
            Err(ProtocolError::InvalidScore("1.5".into()))
        );
        assert_eq!(
            AddQuery {
                id: Some("a\nb".into()),
                score: Some("1".into())
            }
            .validate(),
            Err(ProtocolError::InvalidPlayer)
        );
    }

    #[test]
    fn stop_query_needs_exact_secret() {
        assert!(StopQuery::new(DEFAULT_STOP_SECRET).authorizes(DEFAULT_STOP_SECRET));
        assert!(!StopQuery::new("guess").authorizes(DEFAULT_STOP_SECRET));
        assert!(!StopQuery::default().authorizes(DEFAULT_STOP_SECRET));
    }

    #[test]
    fn rank_bodies() {
        assert_eq!(parse_rank(&format_rank(3)), Ok(3));
        assert_eq!(parse_rank("7\r\n"), Ok(7));
        assert_eq!(parse_rank(""), Err(ProtocolError::Rejected));
        assert_eq!(parse_rank("0"), Err(ProtocolError::InvalidRank("0".into())));
        assert!(parse_rank("first").is_err());
    }

    #[test]
    fn top_body_is_crlf_separated_and_limited() {
        let records: Vec<_> = (0..25u64)
            .map(|i| ScoreRecord::new(format!("p{i}"), i))
            .collect();

        let body = format_top(&records);

        assert_eq!(body.split("\r\n").count(), TOP_LIMIT);
        assert!(body.starts_with("0 p0\r\n1 p1"));
        assert_eq!(parse_top(&body), records[..TOP_LIMIT].to_vec());
    }

    #[test]
    fn top_body_skips_noise() {
        assert_eq!(
            parse_top("5 a b\r\nnope\r\n\r\n9 c"),
            vec![ScoreRecord::new("a b", 5), ScoreRecord::new("c", 9)]
        );
        assert!(parse_top("").is_empty());
        assert_eq!(format_top(&Vec::<ScoreRecord>::new()), "");
    }

    #[test]
    fn submission_status_settles() {
        assert!(!SubmissionStatus::default().is_settled());
        assert!(!SubmissionStatus::Pending.is_settled());
        assert!(SubmissionStatus::Failed.is_settled());
        assert!(SubmissionStatus::Ranked(1).is_settled());
    }
}
