/// Per-level leaderboards.
///
/// ## Storage
///   One JSON file per level, `level<id>.json`, holding an array of
///   `{ "id", "initials", "score" }` entries in insertion order.
///   The directory comes from config (default: the OS user-data dir).
///
/// Writes append with an id one past the largest stored id. Reads never
/// fail: a missing file is an empty board, a corrupt one is logged and
/// treated as empty.

use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: u32,
    pub initials: String,
    pub score: u32,
}

#[derive(Debug, Error)]
pub enum LeaderboardError {
    #[error("initials must be exactly 3 letters or digits, got '{0}'")]
    InvalidInitials(String),
    #[error("leaderboard I/O at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not encode leaderboard: {0}")]
    Serialize(#[from] serde_json::Error),
}

// ══════════════════════════════════════════════════════════════
// Paths
// ══════════════════════════════════════════════════════════════

fn board_path(dir: &Path, level_id: u32) -> PathBuf {
    dir.join(format!("level{level_id}.json"))
}

/// Uppercased initials, or `None` unless exactly three ASCII letters/digits.
pub fn normalize_initials(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.chars().count() == 3 && trimmed.chars().all(|c| c.is_ascii_alphanumeric()) {
        Some(trimmed.to_ascii_uppercase())
    } else {
        None
    }
}

// ══════════════════════════════════════════════════════════════
// Read / write
// ══════════════════════════════════════════════════════════════

/// Entries for a level in insertion order.
pub fn read_entries(dir: &Path, level_id: u32) -> Vec<Entry> {
    let path = board_path(dir, level_id);
    let text = match std::fs::read_to_string(&path) {
        Ok(t) => t,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return vec![],
        Err(e) => {
            warn!("could not read {}: {e}", path.display());
            return vec![];
        }
    };
    match serde_json::from_str::<Vec<Entry>>(&text) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("corrupt leaderboard {}, treating as empty: {e}", path.display());
            vec![]
        }
    }
}

/// Append an entry and return it with its assigned id.
pub fn add_entry(dir: &Path, level_id: u32, initials: &str, score: u32) -> Result<Entry, LeaderboardError> {
    let initials = normalize_initials(initials)
        .ok_or_else(|| LeaderboardError::InvalidInitials(initials.to_string()))?;

    let mut entries = read_entries(dir, level_id);
    let id = entries.iter().map(|e| e.id).max().map_or(1, |m| m + 1);
    let entry = Entry { id, initials, score };
    entries.push(entry.clone());

    let path = board_path(dir, level_id);
    let io_err = |source| LeaderboardError::Io { path: path.clone(), source };
    std::fs::create_dir_all(dir).map_err(io_err)?;
    let text = serde_json::to_string_pretty(&entries)?;
    std::fs::write(&path, text).map_err(io_err)?;

    info!("leaderboard level {level_id}: {} scored {score}", entry.initials);
    Ok(entry)
}

/// Highest score first; equal scores keep insertion order.
pub fn sorted_by_score(mut entries: Vec<Entry>) -> Vec<Entry> {
    entries.sort_by(|a, b| b.score.cmp(&a.score));
    entries
}
