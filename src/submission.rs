use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{error, info, instrument, warn};

use crate::{
    api::{
        models::{CreateGameRequest, GamePlayerInput},
        ApiError, RecorderApi,
    },
    models::Team,
    roster::Roster,
    validation::Violation,
};

/// A finished game as the operator entered it, frozen at submit time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSubmission {
    pub radiant: Roster,
    pub dire: Roster,
    pub winner: Team,
    /// When the game was played. Only forwarded if the recorder is told to.
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("a game is already being submitted")]
    InFlight,
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("the game has {} problem(s) and strict mode is on", .0.len())]
    Rejected(Vec<Violation>),
}

impl CreateGameRequest {
    /// Turn a submission into the body of `POST /games`. Unbound slots are left out.
    pub fn from_submission(submission: &GameSubmission, send_timestamp: bool) -> Self {
        fn players(roster: &Roster) -> Vec<GamePlayerInput> {
            roster.bound().map(GamePlayerInput::from).collect()
        }

        Self {
            radiant_players: players(&submission.radiant),
            dire_players: players(&submission.dire),
            winner: submission.winner.to_string(),
            timestamp: send_timestamp.then_some(submission.timestamp),
        }
    }
}

/// Releases the in-flight flag however the submission ends, including when the future is
/// dropped half way.
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn claim(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Sends finished games to the backend, one at a time.
///
/// Submitting is not idempotent: the backend stores a new game for every successful call.
#[derive(Debug)]
pub struct GameSubmitter<A> {
    api: A,
    send_timestamp: bool,
    in_flight: AtomicBool,
}

impl<A: RecorderApi> GameSubmitter<A> {
    pub fn new(api: A, send_timestamp: bool) -> Self {
        Self {
            api,
            send_timestamp,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    #[cfg(test)]
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Send the submission as-is. Nothing is validated here.
    ///
    /// Returns [`SubmitError::InFlight`] without touching the network if another submission
    /// has not finished yet. On error the caller is expected to keep its state so the operator
    /// can try again.
    #[instrument(skip(self, submission), fields(winner = %submission.winner))]
    pub async fn submit(&self, submission: &GameSubmission) -> Result<(), SubmitError> {
        let Some(_guard) = InFlightGuard::claim(&self.in_flight) else {
            warn!("Rejected a submission while another one is in flight");
            return Err(SubmitError::InFlight);
        };

        let request = CreateGameRequest::from_submission(submission, self.send_timestamp);

        match self.api.create_game(&request).await {
            Ok(()) => {
                info!(
                    "Saved game with {} radiant and {} dire players",
                    request.radiant_players.len(),
                    request.dire_players.len()
                );
                Ok(())
            }
            Err(e) => {
                error!("Error saving game: {}", e);
                Err(e.into())
            }
        }
    }
}
