use core::fmt;
use core::num::ParseIntError;
use core::str::FromStr;
use core::time::Duration;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A timed completion, persisted as the line `"<duration_nanos> <player>"`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub player: String,
    pub duration_nanos: u64,
}

impl ScoreRecord {
    pub fn new(player: impl Into<String>, duration_nanos: u64) -> Self {
        Self {
            player: player.into(),
            duration_nanos,
        }
    }

    pub fn duration(&self) -> Duration {
        Duration::from_nanos(self.duration_nanos)
    }
}

impl fmt::Display for ScoreRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.duration_nanos, self.player)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScoreParseError {
    #[error("Missing space between duration and player")]
    MissingSeparator,
    #[error("Invalid duration: {0}")]
    InvalidDuration(#[from] ParseIntError),
    #[error("Empty player id")]
    EmptyPlayer,
}

impl FromStr for ScoreRecord {
    type Err = ScoreParseError;

    /// Splits at the first space, everything after it is the player id.
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim_end_matches(['\r', '\n']);
        let (duration, player) = line
            .split_once(' ')
            .ok_or(ScoreParseError::MissingSeparator)?;
        let duration_nanos = duration.parse()?;
        if player.is_empty() {
            return Err(ScoreParseError::EmptyPlayer);
        }
        Ok(Self::new(player, duration_nanos))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Entry {
    seq: u64,
    record: ScoreRecord,
}

impl Entry {
    fn key(&self) -> (u64, u64) {
        (self.record.duration_nanos, self.seq)
    }
}

/// Scores kept sorted by duration, ties going to whoever arrived first.
#[derive(Clone, Debug, Default)]
pub struct Leaderboard {
    entries: Vec<Entry>,
    next_seq: u64,
}

impl Leaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: impl IntoIterator<Item = ScoreRecord>) -> Self {
        let mut board = Self::new();
        board.load(records);
        board
    }

    /// Builds a leaderboard from its persisted text, skipping lines that do not parse.
    pub fn parse(text: &str) -> Self {
        let mut board = Self::new();
        board.load_str(text);
        board
    }

    /// Replaces the contents, arrival order being the iteration order.
    pub fn load(&mut self, records: impl IntoIterator<Item = ScoreRecord>) {
        self.entries.clear();
        self.next_seq = 0;

        for record in records {
            if record.player.is_empty() {
                log::warn!("Skipping score without player id: {}", record.duration_nanos);
                continue;
            }
            if has_line_break(&record.player) {
                log::warn!("Skipping score with a multi-line player id: {:?}", record.player);
                continue;
            }
            let seq = self.bump_seq();
            self.entries.push(Entry { seq, record });
        }
        self.entries.sort_by_key(Entry::key);
        log::debug!("Loaded {} scores", self.entries.len());
    }

    pub fn load_str(&mut self, text: &str) {
        let records = text
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .filter_map(|(number, line)| match line.parse::<ScoreRecord>() {
                Ok(record) => Some(record),
                Err(err) => {
                    log::warn!("Skipping score line {}: {}", number + 1, err);
                    None
                }
            });
        self.load(records);
    }

    /// Inserts a score and returns its 1-based rank, equal durations ranking behind older ones.
    ///
    /// Never refuses a record, the same player may hold several entries. Line breaks in the
    /// player id become spaces so the record stays on one persisted line.
    pub fn submit(&mut self, player: impl Into<String>, duration_nanos: u64) -> usize {
        let mut player = player.into();
        if has_line_break(&player) {
            player = player.replace(['\r', '\n'], " ");
        }
        let rank = self.rank_of(duration_nanos);
        let seq = self.bump_seq();
        self.entries.insert(
            rank - 1,
            Entry {
                seq,
                record: ScoreRecord::new(player, duration_nanos),
            },
        );
        rank
    }

    /// Rank a new score with this duration would get, without inserting it.
    pub fn rank_of(&self, duration_nanos: u64) -> usize {
        self.entries
            .partition_point(|entry| entry.record.duration_nanos <= duration_nanos)
            + 1
    }

    pub fn top(&self, k: usize) -> Vec<ScoreRecord> {
        self.iter().take(k).cloned().collect()
    }

    /// Records best first.
    pub fn iter(&self) -> impl Iterator<Item = &ScoreRecord> + '_ {
        self.entries.iter().map(|entry| &entry.record)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// One line per record, best first, so reloading keeps tie order.
    pub fn serialize(&self) -> String {
        self.iter().map(|record| format!("{record}\n")).collect()
    }

    fn bump_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }
}

fn has_line_break(player: &str) -> bool {
    player.contains(['\r', '\n'])
}

/// Cloneable handle on a [`Leaderboard`]; every call runs under the lock as a whole.
#[derive(Clone, Debug, Default)]
pub struct SharedLeaderboard {
    inner: Arc<RwLock<Leaderboard>>,
}

impl SharedLeaderboard {
    pub fn new(board: Leaderboard) -> Self {
        Self {
            inner: Arc::new(RwLock::new(board)),
        }
    }

    pub fn submit(&self, player: impl Into<String>, duration_nanos: u64) -> usize {
        self.inner.write().submit(player, duration_nanos)
    }

    pub fn top(&self, k: usize) -> Vec<ScoreRecord> {
        self.inner.read().top(k)
    }

    pub fn load(&self, records: impl IntoIterator<Item = ScoreRecord>) {
        let board = Leaderboard::from_records(records);
        *self.inner.write() = board;
    }

    pub fn load_str(&self, text: &str) {
        let board = Leaderboard::parse(text);
        *self.inner.write() = board;
    }

    pub fn serialize(&self) -> String {
        self.inner.read().serialize()
    }

    pub fn snapshot(&self) -> Leaderboard {
        self.inner.read().clone()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}
