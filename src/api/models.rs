use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{GamePlayer, Player};

/// Body of `GET /players`.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct PlayersResponse {
    #[serde(default)]
    pub players: Option<Vec<Player>>,
}

/// Body the backend returns alongside a failed request.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Body of `POST /games`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateGameRequest {
    pub radiant_players: Vec<GamePlayerInput>,
    pub dire_players: Vec<GamePlayerInput>,
    pub winner: String,
    /// Only sent when the recorder is configured to forward the operator's game time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

/// A single roster slot on the wire.
///
/// Exactly one of `id` and `nickname` is set: registered players are referred to by id, custom
/// players by the nickname the operator typed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GamePlayerInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    pub role: String,
    pub is_captain: bool,
}

impl From<&GamePlayer> for GamePlayerInput {
    fn from(slot: &GamePlayer) -> Self {
        let (id, nickname) = if slot.player.is_custom() {
            (None, Some(slot.player.nickname.clone()))
        } else {
            (Some(slot.player.id.clone()), None)
        };

        Self {
            id,
            nickname,
            role: slot.role.to_string().to_lowercase(),
            is_captain: slot.is_captain,
        }
    }
}
