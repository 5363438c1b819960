use std::io::Write;

use chrono::{DateTime, Utc};
use prettytable::{row, Table};
use tracing::{info, warn};

use crate::{
    api::RecorderApi,
    models::{Role, Team, ROSTER_SIZE},
    roster::{Roster, RosterError},
    session::PlayerRef,
    RecorderError,
};

use super::{slot_index, Console};

impl<A: RecorderApi> Console<A> {
    pub(super) fn bind<W: Write>(
        &mut self,
        out: &mut W,
        team: Team,
        slot: u8,
        id: &str,
    ) -> Result<(), RecorderError> {
        let Some(player_ref) = PlayerRef::from_parts(Some(id), None) else {
            return Ok(());
        };

        let result = self.form.bind_player(team, slot_index(slot), player_ref);
        self.report_binding(out, team, slot, result, id)
    }

    pub(super) fn custom<W: Write>(
        &mut self,
        out: &mut W,
        team: Team,
        slot: u8,
        nickname: &str,
    ) -> Result<(), RecorderError> {
        let result = self.form.bind_player(
            team,
            slot_index(slot),
            PlayerRef::Custom(nickname.to_string()),
        );
        self.report_binding(out, team, slot, result, nickname)
    }

    pub(super) fn name<W: Write>(
        &mut self,
        out: &mut W,
        team: Team,
        slot: u8,
        text: &str,
    ) -> Result<(), RecorderError> {
        let result = self.form.enter_name(team, slot_index(slot), text);
        self.report_binding(out, team, slot, result, text)
    }

    fn report_binding<W: Write>(
        &self,
        out: &mut W,
        team: Team,
        slot: u8,
        result: Result<bool, RosterError>,
        wanted: &str,
    ) -> Result<(), RecorderError> {
        match result {
            Ok(true) => {
                if let Some(bound) = self.form.roster(team).slot(slot_index(slot)) {
                    writeln!(
                        out,
                        "{} slot {}: {} ({}) as {}",
                        team,
                        slot,
                        bound.player.nickname,
                        if bound.player.is_custom() {
                            "custom"
                        } else {
                            bound.player.id.as_str()
                        },
                        bound.role
                    )?;
                }
            }
            Ok(false) => {
                warn!("Operator picked unknown player {}", wanted);
                writeln!(
                    out,
                    "No registered player has the id {}. Use `custom` or `name` for new players.",
                    wanted
                )?;
            }
            Err(e) => writeln!(out, "{}", e)?,
        }

        Ok(())
    }

    pub(super) fn role<W: Write>(
        &mut self,
        out: &mut W,
        team: Team,
        slot: u8,
        role: Role,
    ) -> Result<(), RecorderError> {
        let index = slot_index(slot);
        if let Err(e) = self.form.change_role(team, index, role) {
            writeln!(out, "{}", e)?;
            return Ok(());
        }

        match self.form.roster(team).slot(index) {
            Some(bound) => writeln!(out, "{} slot {} now plays {}", team, slot, bound.role)?,
            None => writeln!(out, "{} slot {} has no player yet, nothing changed", team, slot)?,
        }

        Ok(())
    }

    pub(super) fn captain<W: Write>(
        &mut self,
        out: &mut W,
        team: Team,
        slot: u8,
    ) -> Result<(), RecorderError> {
        match self.form.set_captain(team, slot_index(slot)) {
            Ok(()) => writeln!(out, "{} slot {} is the captain", team, slot)?,
            Err(e) => writeln!(out, "{}", e)?,
        }

        Ok(())
    }

    pub(super) fn winner<W: Write>(&mut self, out: &mut W, team: Team) -> Result<(), RecorderError> {
        self.form.set_winner(team);
        info!("Winner set to {}", team);
        writeln!(out, "{} victory", team)?;

        Ok(())
    }

    pub(super) fn time<W: Write>(
        &mut self,
        out: &mut W,
        time: DateTime<Utc>,
    ) -> Result<(), RecorderError> {
        self.form.set_timestamp(time);
        writeln!(out, "Game played at {}", time.to_rfc2822())?;

        Ok(())
    }

    pub(super) fn show<W: Write>(&self, out: &mut W) -> Result<(), RecorderError> {
        for team in [Team::Radiant, Team::Dire] {
            let roster = self.form.roster(team);
            if roster.is_empty() {
                writeln!(out, "{} team: no players yet\n", team)?;
                continue;
            }

            let captain = roster
                .captain()
                .map(|index| format!("slot {}", index + 1))
                .unwrap_or_else(|| "none".to_string());
            writeln!(
                out,
                "{} team ({}/{} players, captain: {})\n{}",
                team,
                roster.occupied(),
                ROSTER_SIZE,
                captain,
                roster_table(roster)
            )?;
        }
        writeln!(
            out,
            "Winner: {}\nPlayed at: {}",
            self.form.winner(),
            self.form.timestamp().to_rfc2822()
        )?;

        Ok(())
    }
}

fn roster_table(roster: &Roster) -> Table {
    let mut table = Table::new();
    table.set_titles(row!["Slot", "Player", "Id", "Role", "Captain"]);

    for (index, slot) in roster.slots() {
        match slot {
            Some(slot) => {
                let captain = if slot.is_captain { "yes" } else { "" };
                table.add_row(row![
                    index + 1,
                    &slot.player.nickname,
                    &slot.player.id,
                    slot.role,
                    captain
                ])
            }
            None => table.add_row(row![index + 1, "-", "", "", ""]),
        };
    }

    table
}
