use crate::{
    controller::{
        GameController,
        RoundOutcome,
    },
    error::GameResult,
    icons::IconId,
    round::DrawSource,
};
use std::{
    future::pending,
    time::Duration,
};
use tokio::time::{
    Instant,
    sleep_until,
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PhaseDelays {
    pub spin: Duration,
    pub reveal: Duration,
}

impl Default for PhaseDelays {
    fn default() -> Self {
        Self {
            spin: Duration::from_millis(crate::config::DEFAULT_SPIN_MS),
            reveal: Duration::from_millis(crate::config::DEFAULT_REVEAL_MS),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Transition {
    /// Spinning -> Revealing
    Reveal,
    /// Revealing -> Result
    Settle,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Fired {
    Revealed(IconId),
    Settled(RoundOutcome),
}

/// A delayed transition. Dropping it cancels the transition.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PhaseTimer {
    pub transition: Transition,
    pub deadline: Instant,
}

impl PhaseTimer {
    pub fn after(transition: Transition, delays: &PhaseDelays) -> Self {
        let delay = match transition {
            Transition::Reveal => delays.spin,
            Transition::Settle => delays.reveal,
        };
        Self {
            transition,
            deadline: Instant::now() + delay,
        }
    }

    /// Applies the transition and schedules the follow-up one, if any.
    pub fn fire<D: DrawSource>(
        self,
        game: &mut GameController<D>,
        delays: &PhaseDelays,
    ) -> GameResult<(Fired, Option<PhaseTimer>)> {
        match self.transition {
            Transition::Reveal => {
                let winner = game.reveal_winner()?;
                Ok((
                    Fired::Revealed(winner),
                    Some(PhaseTimer::after(Transition::Settle, delays)),
                ))
            }
            Transition::Settle => {
                let outcome = game.complete_round()?;
                Ok((Fired::Settled(outcome), None))
            }
        }
    }
}

/// Resolves when the scheduled timer (if any) elapses; never resolves when
/// nothing is scheduled.
pub async fn wait_for(timer: Option<PhaseTimer>) -> PhaseTimer {
    match timer {
        Some(timer) => {
            sleep_until(timer.deadline).await;
            timer
        }
        None => pending().await,
    }
}
