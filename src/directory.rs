use tracing::{error, info};

use crate::{api::RecorderApi, models::Player};

/// The registered players known to the backend, fetched once per session.
///
/// Custom players never end up in here.
#[derive(Debug, Clone, Default)]
pub struct PlayerDirectory {
    players: Vec<Player>,
}

impl PlayerDirectory {
    pub fn from_players(players: Vec<Player>) -> Self {
        Self { players }
    }

    /// Fetch the directory from the backend.
    ///
    /// Never fails: any error is logged and an empty directory is returned, so the form stays
    /// usable with custom players only.
    pub async fn load<A: RecorderApi>(api: &A) -> Self {
        match api.get_players().await {
            Ok(players) => {
                info!("Loaded {} players from the backend", players.len());
                Self::from_players(players)
            }
            Err(e) => {
                error!("Error fetching players, continuing without a directory: {}", e);
                Self::default()
            }
        }
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Player> {
        self.players.iter().find(|player| player.id == id)
    }

    /// Exact, case-insensitive nickname lookup.
    pub fn find_by_nickname(&self, nickname: &str) -> Option<&Player> {
        let wanted = nickname.to_lowercase();
        self.players
            .iter()
            .find(|player| player.nickname.to_lowercase() == wanted)
    }
}
