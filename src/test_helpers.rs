use crate::{
    controller::{
        GameController,
        RoundOutcome,
    },
    error::GameResult,
    icons::{
        GAME_ICONS,
        INITIAL_BALANCE,
        IconId,
        icon_index,
    },
    round::DrawSource,
};
use std::collections::VecDeque;

/// Draw source that hands out queued winners, falling back to the first icon
/// when the queue runs dry.
#[derive(Debug, Default)]
pub struct ScriptedDraw {
    winners: VecDeque<usize>,
}

impl ScriptedDraw {
    pub fn push_winner(&mut self, icon_id: &str) {
        let id = IconId::parse(icon_id)
            .unwrap_or_else(|| panic!("unknown icon in test script: {icon_id}"));
        self.winners.push_back(icon_index(id));
    }

    pub fn push_index(&mut self, idx: usize) {
        self.winners.push_back(idx);
    }
}

impl DrawSource for ScriptedDraw {
    fn draw_index(&mut self, icon_count: usize) -> usize {
        self.winners.pop_front().unwrap_or(0) % icon_count
    }
}

pub struct TestContext {
    game: GameController<ScriptedDraw>,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_balance(INITIAL_BALANCE)
    }

    pub fn with_balance(balance: u64) -> Self {
        Self {
            game: GameController::new(balance, ScriptedDraw::default()),
        }
    }

    pub fn game(&mut self) -> &mut GameController<ScriptedDraw> {
        &mut self.game
    }

    pub fn force_winner(&mut self, icon_id: &str) {
        self.game.draw_source_mut().push_winner(icon_id);
    }

    /// Starts a round with the current bets and runs it to `Result`.
    pub fn resolve_round(&mut self, winner: &str) -> GameResult<RoundOutcome> {
        self.force_winner(winner);
        self.game.start_round()?;
        self.game.reveal_winner()?;
        self.game.complete_round()
    }

    /// Places `bets`, resolves against `winner` and closes the result screen.
    pub fn play_round(
        &mut self,
        bets: &[(&str, u64)],
        winner: &str,
    ) -> GameResult<RoundOutcome> {
        for (icon, amount) in bets {
            self.game.place_bet(icon, *amount)?;
        }
        let outcome = self.resolve_round(winner)?;
        self.game.acknowledge_result()?;
        Ok(outcome)
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

pub fn icon_ids() -> Vec<&'static str> {
    GAME_ICONS.iter().map(|def| def.id.as_str()).collect()
}
