//! Scores file persistence: one `"<nanos> <player>"` line per record.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use sweeper_core::{Leaderboard, SharedLeaderboard};
use tracing::{info, warn};

/// Loads the scores file; a missing or unreadable file yields an empty leaderboard.
pub fn load_scores(path: &Path) -> Leaderboard {
    match std::fs::read_to_string(path) {
        Ok(text) => {
            let board = Leaderboard::parse(&text);
            info!(path = %path.display(), count = board.len(), "Loaded scores");
            board
        }
        Err(err) if err.kind() == ErrorKind::NotFound => {
            info!(path = %path.display(), "No scores file yet, starting empty");
            Leaderboard::new()
        }
        Err(err) => {
            warn!(path = %path.display(), %err, "Error while loading scores, loading without scores");
            Leaderboard::new()
        }
    }
}

/// Writes the scores next to `path` first, then renames over it.
pub fn save_scores(path: &Path, board: &SharedLeaderboard) -> anyhow::Result<()> {
    let text = board.serialize();
    let tmp = temp_path(path);

    std::fs::write(&tmp, text).with_context(|| format!("writing {}", tmp.display()))?;
    std::fs::rename(&tmp, path)
        .with_context(|| format!("renaming {} to {}", tmp.display(), path.display()))?;
    info!(path = %path.display(), count = board.len(), "Saved scores");
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}
