use chrono::Utc;

use crate::error::AppError;
use crate::models::player::*;
use crate::services::merge::{self, MergeOutcome};
use crate::services::stats;
use crate::store::{Change, Store};
use crate::validation;

pub fn get_leaderboard(store: &Store) -> Result<Leaderboard, AppError> {
    store.read(|board| Ok(board.clone()))
}

pub fn submit_score(store: &Store, req: ScoreSubmission) -> Result<ScoreResponse, AppError> {
    let score = validation::validate_score_submission(req)?;
    let username = score.username.clone();
    let submitted = score.score;

    let outcome = store.write(|board| {
        let outcome = merge::submit_score(board, score, Utc::now());
        if outcome.is_mutation() {
            Ok(Change::Commit(outcome))
        } else {
            Ok(Change::Keep(outcome))
        }
    })?;

    let response = match outcome {
        MergeOutcome::Created => {
            tracing::info!("Added new player: {} with score {}", username, submitted);
            ScoreResponse {
                success: true,
                message: "Score submitted successfully".into(),
                high_score: submitted,
                outcome: Outcome::Created,
            }
        }
        MergeOutcome::Updated { previous } => {
            tracing::info!(
                "Updated {}: new high score {} (was {})",
                username,
                submitted,
                previous
            );
            ScoreResponse {
                success: true,
                message: "Score submitted successfully".into(),
                high_score: submitted,
                outcome: Outcome::Updated,
            }
        }
        MergeOutcome::Rejected { high_score } => {
            tracing::info!(
                "Score {} for {} not higher than existing {}",
                submitted,
                username,
                high_score
            );
            ScoreResponse {
                success: true,
                message: "Score not higher than existing high score".into(),
                high_score,
                outcome: Outcome::Rejected,
            }
        }
    };
    Ok(response)
}

pub fn save_game_state(
    store: &Store,
    req: GameStateSubmission,
) -> Result<Acknowledgement, AppError> {
    let (username, state) = validation::validate_game_state(req)?;

    store.write(|board| {
        merge::apply_full_state(board, &username, state, Utc::now())?;
        Ok(Change::Commit(()))
    })?;
    tracing::info!("Saved game state for {}", username);

    Ok(Acknowledgement {
        success: true,
        message: "Game state saved".into(),
    })
}

pub fn get_stats(store: &Store) -> Result<LeaderboardStats, AppError> {
    store.read(|board| Ok(stats::summarize(board)))
}

pub fn delete_player(store: &Store, username: &str) -> Result<Acknowledgement, AppError> {
    let found = store.write(|board| {
        if merge::remove_player(board, username) {
            Ok(Change::Commit(true))
        } else {
            Ok(Change::Keep(false))
        }
    })?;

    if !found {
        return Err(AppError::NotFound("Player not found".into()));
    }
    tracing::info!("Deleted player: {}", username);
    Ok(Acknowledgement {
        success: true,
        message: format!("Deleted player: {}", username),
    })
}
