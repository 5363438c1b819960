use std::io::Write;

use prettytable::{row, Table};
use tracing::{info, instrument, warn};

use crate::{
    api::RecorderApi,
    directory::PlayerDirectory,
    log::{log_error, log_info},
    submission::SubmitError,
    RecorderError,
};

use super::Console;

impl<A: RecorderApi> Console<A> {
    pub(super) fn players<W: Write>(&self, out: &mut W) -> Result<(), RecorderError> {
        let directory = self.form.directory();
        if directory.is_empty() {
            writeln!(
                out,
                "No registered players. Use `custom` or `name` to enter players by nickname."
            )?;
            return Ok(());
        }

        let mut table = Table::new();
        table.set_titles(row!["No.", "Nickname", "Id", "Games"]);
        for (i, player) in directory.players().iter().enumerate() {
            let games = player.games.map(|g| g.to_string()).unwrap_or_default();
            table.add_row(row![i + 1, &player.nickname, &player.id, games]);
        }

        writeln!(out, "{}", table)?;
        Ok(())
    }

    #[instrument(skip(self, out))]
    pub(super) async fn reload<W: Write>(&mut self, out: &mut W) -> Result<(), RecorderError> {
        let directory = PlayerDirectory::load(self.submitter.api()).await;
        writeln!(out, "{} registered players", directory.len())?;
        self.form.set_directory(directory);

        Ok(())
    }

    pub(super) fn validate<W: Write>(&self, out: &mut W) -> Result<(), RecorderError> {
        let violations = self.form.validate();
        if violations.is_empty() {
            writeln!(out, "The game is ready to be saved.")?;
        }
        for violation in violations {
            writeln!(out, "- {}", violation)?;
        }

        Ok(())
    }

    /// Send the game. The form is only cleared once the backend has accepted it.
    #[instrument(skip(self, out))]
    pub(super) async fn submit<W: Write>(&mut self, out: &mut W) -> Result<(), RecorderError> {
        let violations = self.form.validate();
        if !violations.is_empty() {
            if self.strict {
                let problems: Vec<String> = violations.iter().map(|v| v.to_string()).collect();
                let cause = SubmitError::Rejected(violations).to_string();
                let mut fields = vec![("Cause", cause.as_str())];
                fields.extend(problems.iter().map(|p| ("Problem", p.as_str())));

                return log_error(out, "The game was not saved", fields);
            }

            warn!(
                "Submitting a game with {} validation problems",
                violations.len()
            );
            writeln!(out, "Sending anyway, the backend will likely refuse this game:")?;
            for violation in &violations {
                writeln!(out, "- {}", violation)?;
            }
        }

        let submission = self.form.snapshot();
        match self.submitter.submit(&submission).await {
            Ok(()) => {
                info!("Game saved, resetting the form");
                self.form.reset();
                let winner = submission.winner.to_string();
                log_info(out, "Game saved", vec![("Winner", winner.as_str())])
            }
            Err(e @ SubmitError::InFlight) => log_error(
                out,
                "A game is already being saved",
                vec![("Cause", e.to_string().as_str())],
            ),
            Err(e) => log_error(
                out,
                "Could not save the game",
                vec![("Cause", e.to_string().as_str())],
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;

    use crate::{
        commands::tests::{console, run_lines},
        models::{Team, ROSTER_SIZE},
        submission::tests::FakeApi,
    };

    fn full_game() -> Vec<String> {
        let mut lines = Vec::new();
        for team in ["radiant", "dire"] {
            for slot in 1..=ROSTER_SIZE {
                lines.push(format!("name {} {} {}{}", team, slot, team, slot));
            }
            lines.push(format!("captain {} 1", team));
        }
        lines.push("bind radiant 1 p1".to_string());
        lines.push("captain radiant 1".to_string());
        lines.push("winner dire".to_string());
        lines
    }

    async fn enter_full_game(console: &mut super::Console<FakeApi>) {
        let lines = full_game();
        let lines: Vec<&str> = lines.iter().map(String::as_str).collect();
        run_lines(console, &lines).await;
    }

    #[tokio::test]
    async fn lists_players() {
        let mut console = console(FakeApi::default(), false);

        let output = run_lines(&mut console, &["players"]).await;

        assert!(output.contains("Alice"));
        assert!(output.contains("p2"));
        assert!(output.contains("12"));
    }

    #[tokio::test]
    async fn reload_refetches_the_directory() {
        let mut console = console(FakeApi::default(), false);

        let output = run_lines(&mut console, &["reload"]).await;

        assert!(output.contains("2 registered players"));
        assert_eq!(console.form().directory().len(), 2);
    }

    #[tokio::test]
    async fn successful_submit_resets_the_form() {
        let mut console = console(FakeApi::default(), false);
        enter_full_game(&mut console).await;

        let output = run_lines(&mut console, &["validate", "submit"]).await;

        assert!(output.contains("The game is ready to be saved."));
        assert!(output.contains("Game saved"));
        assert!(console.form().roster(Team::Radiant).is_empty());
        assert!(console.form().roster(Team::Dire).is_empty());
        assert_eq!(console.form().winner(), Team::Radiant);

        let sent = console.submitter.api().sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].winner, "DIRE");
        assert_eq!(sent[0].radiant_players[0].id.as_deref(), Some("p1"));
        assert!(sent[0].radiant_players[0].is_captain);
    }

    #[tokio::test]
    async fn failed_submit_keeps_the_form() {
        let api = FakeApi {
            fail_with: Some(StatusCode::INTERNAL_SERVER_ERROR),
            ..Default::default()
        };
        let mut console = console(api, false);
        enter_full_game(&mut console).await;
        let before = console.form().snapshot();

        let output = run_lines(&mut console, &["submit"]).await;

        assert!(output.contains("Could not save the game"));
        assert!(output.contains("500"));
        assert_eq!(console.form().snapshot(), before);
    }

    #[tokio::test]
    async fn lenient_mode_sends_incomplete_games() {
        let mut console = console(FakeApi::default(), false);

        let output = run_lines(&mut console, &["bind radiant 1 p1", "submit"]).await;

        assert!(output.contains("Sending anyway"));
        let sent = console.submitter.api().sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].radiant_players.len(), 1);
        assert!(sent[0].dire_players.is_empty());
    }

    #[tokio::test]
    async fn strict_mode_refuses_incomplete_games() {
        let mut console = console(FakeApi::default(), true);

        let output = run_lines(&mut console, &["bind radiant 1 p1", "submit"]).await;

        assert!(output.contains("The game was not saved"));
        assert!(output.contains("DIRE must have exactly one captain"));
        assert!(console.submitter.api().sent.lock().unwrap().is_empty());
        assert_eq!(console.form().roster(Team::Radiant).occupied(), 1);
    }
}
