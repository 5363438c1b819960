use serde::{Deserialize, Deserializer, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Sentinel id carried by players that only exist in this session.
pub const CUSTOM_PLAYER_ID: &str = "custom";

/// Number of slots in a single team's roster.
pub const ROSTER_SIZE: usize = 5;

/// One of the two sides of a game.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum Team {
    #[default]
    Radiant,
    Dire,
}

/// The position a player filled during the game.
///
/// The declaration order is the order slots are seeded in: slot 0 is the carry, slot 4 is the
/// hard support.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Role {
    Carry,
    Mid,
    Offlane,
    Pos4,
    Pos5,
}

impl Role {
    pub const ORDER: [Role; ROSTER_SIZE] = [
        Role::Carry,
        Role::Mid,
        Role::Offlane,
        Role::Pos4,
        Role::Pos5,
    ];

    /// The role a freshly bound slot starts with. `None` if the index is outside the roster.
    pub fn for_slot(index: usize) -> Option<Role> {
        Self::ORDER.get(index).copied()
    }
}

/// A player known to the backend, or one typed in by the operator for this game only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: String,
    pub nickname: String,
    /// Number of games the backend has on record for this player.
    #[serde(
        default,
        deserialize_with = "deserialize_games",
        skip_serializing_if = "Option::is_none"
    )]
    pub games: Option<u32>,
}

impl Player {
    pub fn custom(nickname: impl Into<String>) -> Self {
        Self {
            id: CUSTOM_PLAYER_ID.to_string(),
            nickname: nickname.into(),
            games: None,
        }
    }

    pub fn is_custom(&self) -> bool {
        self.id == CUSTOM_PLAYER_ID
    }
}

/// The backend sends either a count or the list of game ids the player took part in.
#[derive(Deserialize)]
#[serde(untagged)]
enum GamesField {
    Count(u32),
    Ids(Vec<serde_json::Value>),
}

fn deserialize_games<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let games = Option::<GamesField>::deserialize(deserializer)?;

    Ok(games.map(|games| match games {
        GamesField::Count(count) => count,
        GamesField::Ids(ids) => u32::try_from(ids.len()).unwrap_or(u32::MAX),
    }))
}

/// A player bound to a roster slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GamePlayer {
    pub player: Player,
    pub team: Team,
    pub role: Role,
    pub is_captain: bool,
}
