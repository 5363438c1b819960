use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::{
    directory::PlayerDirectory,
    models::{Player, Role, Team, CUSTOM_PLAYER_ID},
    roster::{Roster, RosterError},
    submission::GameSubmission,
    validation::{self, Violation},
};

/// What the operator picked for a slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerRef {
    /// A player from the directory, by id.
    Registered(String),
    /// Somebody who is not in the directory, by nickname.
    Custom(String),
}

impl PlayerRef {
    /// Interpret a raw `(id, nickname)` pair the way the picker hands it over.
    ///
    /// A missing or blank id means nothing was picked. The `custom` id only counts as a custom
    /// player when a nickname comes with it.
    pub fn from_parts(id: Option<&str>, nickname: Option<&str>) -> Option<Self> {
        match (id, nickname) {
            (None, _) => None,
            (Some(id), _) if id.is_empty() => None,
            (Some(CUSTOM_PLAYER_ID), Some(nickname)) => Some(PlayerRef::Custom(nickname.to_string())),
            (Some(id), _) => Some(PlayerRef::Registered(id.to_string())),
        }
    }
}

/// One game being entered by the operator.
///
/// Owns both rosters; the directory is only ever read.
#[derive(Debug, Clone)]
pub struct GameForm {
    directory: PlayerDirectory,
    radiant: Roster,
    dire: Roster,
    winner: Team,
    timestamp: DateTime<Utc>,
}

impl GameForm {
    pub fn new(directory: PlayerDirectory) -> Self {
        Self {
            directory,
            radiant: Roster::new(Team::Radiant),
            dire: Roster::new(Team::Dire),
            winner: Team::default(),
            timestamp: Utc::now(),
        }
    }

    pub fn directory(&self) -> &PlayerDirectory {
        &self.directory
    }

    /// Swap in a freshly fetched directory. Players already bound keep their slots.
    pub fn set_directory(&mut self, directory: PlayerDirectory) {
        self.directory = directory;
    }

    pub fn roster(&self, team: Team) -> &Roster {
        match team {
            Team::Radiant => &self.radiant,
            Team::Dire => &self.dire,
        }
    }

    fn roster_mut(&mut self, team: Team) -> &mut Roster {
        match team {
            Team::Radiant => &mut self.radiant,
            Team::Dire => &mut self.dire,
        }
    }

    pub fn winner(&self) -> Team {
        self.winner
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Bind a player to a slot.
    ///
    /// Returns `Ok(false)` and changes nothing when the id is not in the directory.
    pub fn bind_player(
        &mut self,
        team: Team,
        index: usize,
        player_ref: PlayerRef,
    ) -> Result<bool, RosterError> {
        Role::for_slot(index).ok_or(RosterError::InvalidSlot(index))?;

        let player = match player_ref {
            PlayerRef::Custom(nickname) => Player::custom(nickname),
            PlayerRef::Registered(id) => match self.directory.find_by_id(&id) {
                Some(player) => player.clone(),
                None => {
                    debug!("Ignoring unknown player id {}", id);
                    return Ok(false);
                }
            },
        };

        info!(
            "Binding {} ({}) to {} slot {}",
            player.nickname, player.id, team, index
        );
        let roster = self.roster(team).with_player(index, player)?;
        *self.roster_mut(team) = roster;

        Ok(true)
    }

    /// Bind whatever the operator typed into a slot.
    ///
    /// A name matching a directory nickname (ignoring case) binds that player, anything else
    /// becomes a custom player. Blank input is ignored.
    pub fn enter_name(&mut self, team: Team, index: usize, text: &str) -> Result<bool, RosterError> {
        if text.is_empty() {
            return Ok(false);
        }

        let player_ref = match self.directory.find_by_nickname(text) {
            Some(player) => PlayerRef::Registered(player.id.clone()),
            None => PlayerRef::Custom(text.to_string()),
        };

        self.bind_player(team, index, player_ref)
    }

    pub fn change_role(&mut self, team: Team, index: usize, role: Role) -> Result<(), RosterError> {
        let roster = self.roster(team).with_role(index, role)?;
        *self.roster_mut(team) = roster;
        Ok(())
    }

    pub fn set_captain(&mut self, team: Team, index: usize) -> Result<(), RosterError> {
        let roster = self.roster(team).with_captain(index)?;
        *self.roster_mut(team) = roster;
        Ok(())
    }

    pub fn set_winner(&mut self, winner: Team) {
        self.winner = winner;
    }

    pub fn set_timestamp(&mut self, timestamp: DateTime<Utc>) {
        self.timestamp = timestamp;
    }

    pub fn validate(&self) -> Vec<Violation> {
        validation::validate(&self.radiant, &self.dire)
    }

    /// Freeze the current state for submission.
    pub fn snapshot(&self) -> GameSubmission {
        GameSubmission {
            radiant: self.radiant.clone(),
            dire: self.dire.clone(),
            winner: self.winner,
            timestamp: self.timestamp,
        }
    }

    /// Empty both rosters and start the next game. The directory is kept.
    pub fn reset(&mut self) {
        self.radiant = Roster::new(Team::Radiant);
        self.dire = Roster::new(Team::Dire);
        self.winner = Team::default();
        self.timestamp = Utc::now();
    }
}
