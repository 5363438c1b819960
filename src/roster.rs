use thiserror::Error;

use crate::models::{GamePlayer, Player, Role, Team, ROSTER_SIZE};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RosterError {
    #[error("slot {} does not exist, slots go from 1 to 5", .0 + 1)]
    InvalidSlot(usize),
    #[error("slot {} of {team} has no player yet", .index + 1)]
    EmptySlot { team: Team, index: usize },
}

/// The five slots of one team.
///
/// A roster is a value: every edit returns a new roster and leaves the original untouched.
/// Slots start unbound and only ever move to bound; the captain flag lives on bound slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roster {
    team: Team,
    slots: [Option<GamePlayer>; ROSTER_SIZE],
}

impl Roster {
    pub fn new(team: Team) -> Self {
        Self {
            team,
            slots: Default::default(),
        }
    }

    pub fn team(&self) -> Team {
        self.team
    }

    pub fn slot(&self, index: usize) -> Option<&GamePlayer> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// Every slot in index order, bound or not.
    pub fn slots(&self) -> impl Iterator<Item = (usize, Option<&GamePlayer>)> {
        self.slots.iter().map(Option::as_ref).enumerate()
    }

    /// Bound slots in index order.
    pub fn bound(&self) -> impl Iterator<Item = &GamePlayer> {
        self.slots.iter().flatten()
    }

    pub fn occupied(&self) -> usize {
        self.bound().count()
    }

    pub fn is_empty(&self) -> bool {
        self.occupied() == 0
    }

    /// Index of the captain's slot, if any.
    pub fn captain(&self) -> Option<usize> {
        self.slots().find_map(|(index, slot)| match slot {
            Some(slot) if slot.is_captain => Some(index),
            _ => None,
        })
    }

    fn check(&self, index: usize) -> Result<(), RosterError> {
        if index < ROSTER_SIZE {
            Ok(())
        } else {
            Err(RosterError::InvalidSlot(index))
        }
    }

    /// Bind `player` to `index`. The slot's role is reset to the one its position implies and
    /// it loses the captaincy if it had it.
    pub fn with_player(&self, index: usize, player: Player) -> Result<Roster, RosterError> {
        let role = Role::for_slot(index).ok_or(RosterError::InvalidSlot(index))?;

        let mut roster = self.clone();
        roster.slots[index] = Some(GamePlayer {
            player,
            team: self.team,
            role,
            is_captain: false,
        });

        Ok(roster)
    }

    /// Change the role of the player at `index`. Unbound slots are left alone.
    ///
    /// Nothing stops two slots from holding the same role; the validation pass reports it.
    pub fn with_role(&self, index: usize, role: Role) -> Result<Roster, RosterError> {
        self.check(index)?;

        let mut roster = self.clone();
        if let Some(slot) = roster.slots[index].as_mut() {
            slot.role = role;
        }

        Ok(roster)
    }

    /// Make the player at `index` the captain and strip everybody else of it.
    ///
    /// Fails if the slot has no player, in which case nobody's flag is touched.
    pub fn with_captain(&self, index: usize) -> Result<Roster, RosterError> {
        self.check(index)?;
        if self.slots[index].is_none() {
            return Err(RosterError::EmptySlot {
                team: self.team,
                index,
            });
        }

        let mut roster = self.clone();
        for (i, slot) in roster.slots.iter_mut().enumerate() {
            if let Some(slot) = slot {
                slot.is_captain = i == index;
            }
        }

        Ok(roster)
    }
}
