//! Rules for folding submissions into the leaderboard.
//!
//! Two entry points with deliberately different semantics:
//! [`submit_score`] replaces a record wholesale, and only when the new score
//! beats the stored one; [`apply_full_state`] shallow-merges a checkpoint onto
//! whatever is stored, with no score check at all. Neither does any I/O.

use chrono::{DateTime, Utc};
use serde::ser::Error as _;
use serde_json::{Map, Value};

use crate::error::AppError;
use crate::models::player::{Leaderboard, PlayerRecord, Score, ShipState};
use crate::store::StoreError;

/// Keys a checkpoint may not overwrite.
const SERVER_OWNED_KEYS: &[&str] = &["username", "lastUpdated"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    Created,
    Updated { previous: u64 },
    Rejected { high_score: u64 },
}

impl MergeOutcome {
    pub fn is_mutation(&self) -> bool {
        !matches!(self, MergeOutcome::Rejected { .. })
    }
}

fn record_from_score(score: Score, now: DateTime<Utc>) -> PlayerRecord {
    PlayerRecord {
        username: score.username,
        high_score: score.score,
        ship: ShipState::with_fuel(score.fuel),
        enemies: score.enemies,
        level: score.level,
        last_updated: Some(now),
        extra: Map::new(),
    }
}

/// Applies a validated score to the board.
///
/// A strictly higher score replaces the stored record entirely; level, ship
/// and enemies left out of the submission fall back to their defaults rather
/// than keeping the old values. Anything else leaves the board untouched.
pub fn submit_score(board: &mut Leaderboard, score: Score, now: DateTime<Utc>) -> MergeOutcome {
    match board.position(&score.username) {
        None => {
            board.players.push(record_from_score(score, now));
            MergeOutcome::Created
        }
        Some(idx) => {
            let previous = board.players[idx].high_score;
            if score.score > previous {
                board.players[idx] = record_from_score(score, now);
                MergeOutcome::Updated { previous }
            } else {
                MergeOutcome::Rejected {
                    high_score: previous,
                }
            }
        }
    }
}

/// Upserts a checkpoint of a player's in-progress state.
///
/// Top-level keys of `state` overwrite the stored ones; keys it does not
/// mention are kept. A `level` of 0 is stored as 1, as on the score path.
/// On a type error in a known field the board is left as it was.
pub fn apply_full_state(
    board: &mut Leaderboard,
    username: &str,
    state: Map<String, Value>,
    now: DateTime<Utc>,
) -> Result<(), AppError> {
    let idx = board.position(username);

    let mut fields = match idx {
        Some(i) => match serde_json::to_value(&board.players[i]).map_err(StoreError::from)? {
            Value::Object(map) => map,
            _ => {
                let e = serde_json::Error::custom("player record did not encode as an object");
                return Err(StoreError::from(e).into());
            }
        },
        None => Map::new(),
    };
    for (key, value) in state {
        if !SERVER_OWNED_KEYS.contains(&key.as_str()) {
            fields.insert(key, value);
        }
    }
    fields.insert("username".into(), Value::String(username.to_owned()));
    fields.remove("lastUpdated");

    let mut record: PlayerRecord = serde_json::from_value(Value::Object(fields))
        .map_err(|e| AppError::Validation(format!("Invalid gameState: {}", e)))?;
    record.last_updated = Some(now);
    if record.level == 0 {
        record.level = 1;
    }

    match idx {
        Some(i) => board.players[i] = record,
        None => board.players.push(record),
    }
    Ok(())
}

/// Deletes `username`'s record; returns whether one existed.
pub fn remove_player(board: &mut Leaderboard, username: &str) -> bool {
    let before = board.players.len();
    board.players.retain(|p| p.username != username);
    board.players.len() < before
}
