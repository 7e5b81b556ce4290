use serde_json::{Map, Value};

use crate::error::AppError;
use crate::models::player::{GameStateSubmission, Score, ScoreSubmission};

const MISSING_SCORE_FIELDS: &str = "Missing required fields: username and score";
const MISSING_STATE_FIELDS: &str = "Missing required fields: username and gameState";

pub fn validate_username(username: Option<String>, missing: &str) -> Result<String, AppError> {
    match username {
        Some(name) if !name.is_empty() => Ok(name),
        _ => Err(AppError::Validation(missing.into())),
    }
}

/// Scores must be whole and non-negative; `12.0` is accepted, `12.5` is not.
pub fn validate_score(score: Option<&Value>) -> Result<u64, AppError> {
    let score = match score {
        None | Some(Value::Null) => return Err(AppError::Validation(MISSING_SCORE_FIELDS.into())),
        Some(v) => v,
    };
    if let Some(n) = score.as_u64() {
        return Ok(n);
    }
    match score.as_f64() {
        Some(f) if f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 => Ok(f as u64),
        Some(f) if f < 0.0 => Err(AppError::Validation("Score cannot be negative".into())),
        _ => Err(AppError::Validation(
            "Score must be a non-negative integer".into(),
        )),
    }
}

pub fn validate_score_submission(req: ScoreSubmission) -> Result<Score, AppError> {
    let username = validate_username(req.username, MISSING_SCORE_FIELDS)?;
    let score = validate_score(req.score.as_ref())?;
    Ok(Score {
        username,
        score,
        // a level of 0 means "not reported"
        level: req.level.filter(|&l| l > 0).unwrap_or(1),
        fuel: req.fuel.unwrap_or(0.0),
        enemies: req.enemies.unwrap_or_default(),
    })
}

pub fn validate_game_state(
    req: GameStateSubmission,
) -> Result<(String, Map<String, Value>), AppError> {
    let username = validate_username(req.username, MISSING_STATE_FIELDS)?;
    match req.game_state {
        Some(Value::Object(state)) => Ok((username, state)),
        None | Some(Value::Null) => Err(AppError::Validation(MISSING_STATE_FIELDS.into())),
        Some(_) => Err(AppError::Validation("gameState must be an object".into())),
    }
}

/// Decodes a request body, reporting shape errors as validation failures.
pub fn decode<T: serde::de::DeserializeOwned>(body: Value) -> Result<T, AppError> {
    serde_json::from_value(body)
        .map_err(|e| AppError::Validation(format!("Invalid request: {}", e)))
}
