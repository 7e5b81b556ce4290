use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Where a freshly created ship spawns on the river.
pub const SPAWN_X: f64 = 600.0;
pub const SPAWN_Y: f64 = 500.0;

/// The whole persisted leaderboard, stored as one JSON document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Leaderboard {
    #[serde(default)]
    pub players: Vec<PlayerRecord>,
}

impl Leaderboard {
    pub fn position(&self, username: &str) -> Option<usize> {
        self.players.iter().position(|p| p.username == username)
    }

    pub fn find(&self, username: &str) -> Option<&PlayerRecord> {
        self.players.iter().find(|p| p.username == username)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

/// One player's stored entry.
///
/// Field names on the wire follow the game client (`HighScore`, `player`,
/// `lastUpdated`). Fields the client checkpoints that the server does not
/// know about are kept in `extra` and written back untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub username: String,
    #[serde(rename = "HighScore", default)]
    pub high_score: u64,
    #[serde(rename = "player", default)]
    pub ship: ShipState,
    #[serde(default)]
    pub enemies: Vec<Value>,
    #[serde(default = "default_level")]
    pub level: u32,
    #[serde(
        rename = "lastUpdated",
        default,
        skip_serializing_if = "Option::is_none",
        with = "iso_millis"
    )]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PlayerRecord {
    pub fn enemy_count(&self) -> usize {
        self.enemies.len()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipState {
    #[serde(default)]
    pub fuel: f64,
    #[serde(default = "spawn_x")]
    pub x: f64,
    #[serde(default = "spawn_y")]
    pub y: f64,
}

impl ShipState {
    pub fn with_fuel(fuel: f64) -> Self {
        ShipState {
            fuel,
            ..ShipState::default()
        }
    }
}

impl Default for ShipState {
    fn default() -> Self {
        ShipState {
            fuel: 0.0,
            x: SPAWN_X,
            y: SPAWN_Y,
        }
    }
}

fn default_level() -> u32 {
    1
}

fn spawn_x() -> f64 {
    SPAWN_X
}

fn spawn_y() -> f64 {
    SPAWN_Y
}

/// `lastUpdated` is written the way browsers print `Date.toISOString()`:
/// millisecond precision with a `Z` suffix.
mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(ts) => serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        raw.map(|s| {
            DateTime::parse_from_rfc3339(&s)
                .map(|ts| ts.with_timezone(&Utc))
                .map_err(serde::de::Error::custom)
        })
        .transpose()
    }
}

// ---- requests ----

/// Body of `POST /api/score`. Everything is optional here so that missing
/// fields surface as validation errors rather than decode failures.
#[derive(Debug, Default, Deserialize)]
pub struct ScoreSubmission {
    pub username: Option<String>,
    pub score: Option<Value>,
    pub level: Option<u32>,
    pub fuel: Option<f64>,
    pub enemies: Option<Vec<Value>>,
}

/// A score submission that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct Score {
    pub username: String,
    pub score: u64,
    pub level: u32,
    pub fuel: f64,
    pub enemies: Vec<Value>,
}

/// Body of `POST /api/game-state`.
#[derive(Debug, Default, Deserialize)]
pub struct GameStateSubmission {
    pub username: Option<String>,
    #[serde(rename = "gameState")]
    pub game_state: Option<Value>,
}

// ---- responses ----

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Created,
    Updated,
    Rejected,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResponse {
    pub success: bool,
    pub message: String,
    pub high_score: u64,
    pub outcome: Outcome,
}

#[derive(Debug, Serialize)]
pub struct Acknowledgement {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardStats {
    pub total_players: usize,
    pub highest_score: u64,
    pub average_score: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_player: Option<PlayerRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_decodes_client_document() {
        let doc = json!({
            "players": [{
                "username": "maverick",
                "HighScore": 4200,
                "player": { "fuel": 37.5, "x": 610, "y": 480 },
                "enemies": [{ "kind": "heli" }],
                "level": 3,
                "lastUpdated": "2024-05-01T12:30:00.250Z"
            }]
        });
        let board: Leaderboard = serde_json::from_value(doc).unwrap();
        let rec = &board.players[0];
        assert_eq!(rec.high_score, 4200);
        assert_eq!(rec.ship.fuel, 37.5);
        assert_eq!(rec.enemy_count(), 1);
        assert_eq!(rec.level, 3);
        assert!(rec.extra.is_empty());
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let rec: PlayerRecord = serde_json::from_value(json!({ "username": "x" })).unwrap();
        assert_eq!(rec.high_score, 0);
        assert_eq!(rec.level, 1);
        assert_eq!(rec.ship, ShipState::default());
        assert!(rec.last_updated.is_none());
    }

    #[test]
    fn test_unknown_fields_survive_reencoding() {
        let raw = json!({
            "username": "x",
            "HighScore": 1,
            "player": { "fuel": 0.0, "x": 600.0, "y": 500.0 },
            "enemies": [],
            "level": 1,
            "lastUpdated": "2024-05-01T12:30:00.000Z",
            "bridgesDestroyed": 7
        });
        let rec: PlayerRecord = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(rec.extra.get("bridgesDestroyed"), Some(&json!(7)));
        assert_eq!(serde_json::to_value(&rec).unwrap(), raw);
    }

    #[test]
    fn test_timestamp_keeps_millisecond_format() {
        let rec: PlayerRecord = serde_json::from_value(json!({
            "username": "x",
            "lastUpdated": "2024-05-01T12:30:00.000Z"
        }))
        .unwrap();
        let out = serde_json::to_value(&rec).unwrap();
        assert_eq!(out["lastUpdated"], "2024-05-01T12:30:00.000Z");
    }

    #[test]
    fn test_stats_omit_top_player_when_empty() {
        let stats = LeaderboardStats {
            total_players: 0,
            highest_score: 0,
            average_score: 0,
            top_player: None,
        };
        assert_eq!(
            serde_json::to_value(&stats).unwrap(),
            json!({ "totalPlayers": 0, "highestScore": 0, "averageScore": 0 })
        );
    }
}
