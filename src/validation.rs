use std::fmt;

use strum::IntoEnumIterator;

use crate::{
    models::{Role, Team},
    roster::Roster,
};

/// Something the backend would refuse about a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    EmptySlot { team: Team, index: usize },
    CaptainCount { team: Team, count: usize },
    DuplicateRole { team: Team, role: Role },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Violation::*;
        match self {
            EmptySlot { team, index } => write!(f, "{} slot {} has no player.", team, index + 1),
            CaptainCount { team, count } => write!(
                f,
                "{} must have exactly one captain, it has {}.",
                team, count
            ),
            DuplicateRole { team, role } => {
                write!(f, "{} has more than one player on {}.", team, role)
            }
        }
    }
}

/// Check one roster: every slot bound, one captain, each role filled once.
pub fn validate_roster(roster: &Roster) -> Vec<Violation> {
    let team = roster.team();
    let mut violations: Vec<Violation> = roster
        .slots()
        .filter(|(_, slot)| slot.is_none())
        .map(|(index, _)| Violation::EmptySlot { team, index })
        .collect();

    let count = roster.bound().filter(|slot| slot.is_captain).count();
    if count != 1 {
        violations.push(Violation::CaptainCount { team, count });
    }

    violations.extend(
        Role::iter()
            .filter(|role| roster.bound().filter(|slot| slot.role == *role).count() > 1)
            .map(|role| Violation::DuplicateRole { team, role }),
    );

    violations
}

/// Check both rosters. An empty list means the backend should accept the game.
pub fn validate(radiant: &Roster, dire: &Roster) -> Vec<Violation> {
    let mut violations = validate_roster(radiant);
    violations.extend(validate_roster(dire));
    violations
}
