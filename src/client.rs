use crate::ui;
use color_eyre::eyre::{
    Result,
    WrapErr,
};
use lucky_slip::{
    AppConfig,
    DEFAULT_BET_AMOUNT,
    DrawSource,
    GAME_ICONS,
    GRANT_AMOUNT,
    GameController,
    GameError,
    GameSnapshot,
    RandomDraw,
    advisor::{
        Advisor,
        spawn_insight,
    },
    phase::{
        Fired,
        PhaseDelays,
        PhaseTimer,
        Transition,
        wait_for,
    },
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{
    debug,
    error,
    info,
};

const MAX_ERRORS: usize = 50;
const VISIBLE_ERRORS: usize = 5;

#[derive(Clone, Debug)]
pub struct AppSnapshot {
    pub game: GameSnapshot,
    pub selected_bet_amount: u64,
    pub insight: String,
    pub status: String,
    pub errors: Vec<String>,
}

/// Application state threaded through the event loop: the game itself plus
/// the UI-facing preferences and messages that sit around it.
pub struct AppController<D = RandomDraw> {
    pub game: GameController<D>,
    pub selected_bet_amount: u64,
    pub insight: String,
    pub status: String,
    timer: Option<PhaseTimer>,
    delays: PhaseDelays,
    errors: Vec<String>,
}

impl<D: DrawSource> AppController<D> {
    pub fn new(game: GameController<D>, delays: PhaseDelays) -> Self {
        Self {
            game,
            selected_bet_amount: DEFAULT_BET_AMOUNT,
            insight: String::new(),
            status: String::from("Ready"),
            timer: None,
            delays,
            errors: Vec::new(),
        }
    }

    pub fn snapshot(&self) -> AppSnapshot {
        AppSnapshot {
            game: self.game.snapshot(),
            selected_bet_amount: self.selected_bet_amount,
            insight: self.insight.clone(),
            status: self.status.clone(),
            errors: self
                .errors
                .iter()
                .rev()
                .take(VISIBLE_ERRORS)
                .cloned()
                .collect(),
        }
    }

    pub fn timer(&self) -> Option<PhaseTimer> {
        self.timer
    }

    pub fn select_bet_amount(&mut self, amount: u64) {
        if amount == 0 {
            return;
        }
        self.selected_bet_amount = amount;
        self.status = format!("Chip set to ₹{amount}");
    }

    pub fn place_bet(&mut self, icon_idx: usize) {
        let Some(def) = GAME_ICONS.get(icon_idx) else {
            return;
        };
        let amount = self.selected_bet_amount;
        match self.game.place_bet(def.id.as_str(), amount) {
            Ok(()) => {
                self.status = format!("Placed ₹{} on {}", amount, def.display_name);
            }
            Err(GameError::InsufficientFunds { .. }) => {
                self.status = String::from("Insufficient balance!");
            }
            Err(e) => self.reject(e),
        }
    }

    pub fn clear_bets(&mut self) {
        match self.game.clear_bets() {
            Ok(refunded) => self.status = format!("Cleared bets, refunded ₹{refunded}"),
            Err(e) => self.reject(e),
        }
    }

    pub fn start_round(&mut self) {
        match self.game.start_round() {
            Ok(()) => {
                self.timer = Some(PhaseTimer::after(Transition::Reveal, &self.delays));
                self.status = String::from("Mixing slips...");
            }
            Err(e) => self.reject(e),
        }
    }

    /// Returns true when a round has just completed.
    pub fn on_timer(&mut self, timer: PhaseTimer) -> bool {
        self.timer = None;
        match timer.fire(&mut self.game, &self.delays) {
            Ok((Fired::Revealed(_), next)) => {
                self.timer = next;
                self.status = String::from("Opening slip...");
                false
            }
            Ok((Fired::Settled(outcome), next)) => {
                self.timer = next;
                self.status = if outcome.payout > 0 {
                    format!("Round {}: won ₹{}", outcome.round, outcome.payout)
                } else {
                    format!("Round {}: no win", outcome.round)
                };
                true
            }
            Err(e) => {
                self.push_errors(vec![format!("phase transition failed: {e}")]);
                false
            }
        }
    }

    pub fn close_result(&mut self) {
        match self.game.acknowledge_result() {
            Ok(()) => self.status = String::from("Place your bets"),
            Err(e) => self.reject(e),
        }
    }

    pub fn grant_funds(&mut self) {
        match self.game.grant_funds(GRANT_AMOUNT) {
            Ok(()) => self.status = format!("₹{GRANT_AMOUNT} Added via Mock UPI!"),
            Err(e) => self.reject(e),
        }
    }

    pub fn set_insight(&mut self, insight: String) {
        self.insight = insight;
    }

    fn reject(&mut self, e: GameError) {
        if e.is_guard() {
            debug!(error = %e, "intent ignored");
            self.status = e.to_string();
            return;
        }
        self.push_errors(vec![e.to_string()]);
    }

    fn push_errors(&mut self, mut items: Vec<String>) {
        if items.is_empty() {
            return;
        }
        for item in &items {
            error!("{}", item);
        }
        self.errors.append(&mut items);
        if self.errors.len() > MAX_ERRORS {
            let drain = self.errors.len() - MAX_ERRORS;
            self.errors.drain(0..drain);
        }
    }
}

pub async fn run_app(config: AppConfig) -> Result<()> {
    let delays = PhaseDelays {
        spin: config.spin_delay,
        reveal: config.reveal_delay,
    };
    let game = GameController::with_random_draw(config.initial_balance, config.seed);
    let controller = AppController::new(game, delays);
    let advisor = Arc::new(config.advisor);
    let mut ui_state = ui::UiState::default();
    let mut input_events = ui::input_event_stream();

    tracing::info!("Starting UI");
    ui::terminal_enter(&mut ui_state)?;
    let res = run_loop(controller, advisor, &mut ui_state, &mut input_events).await;
    ui::terminal_exit()?;
    res
}

async fn run_loop<D: DrawSource>(
    mut controller: AppController<D>,
    advisor: Arc<Advisor>,
    ui_state: &mut ui::UiState,
    input_events: &mut ui::InputEventReceiver,
) -> Result<()> {
    let (insight_tx, mut insight_rx) = mpsc::unbounded_channel();
    spawn_insight(advisor.clone(), insight_tx.clone());
    ui::draw(ui_state, &controller.snapshot()).wrap_err("initial draw failed")?;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => { break; }
            timer = wait_for(controller.timer()) => {
                if controller.on_timer(timer) {
                    spawn_insight(advisor.clone(), insight_tx.clone());
                }
            }
            Some(insight) = insight_rx.recv() => {
                controller.set_insight(insight);
            }
            raw_ev = ui::next_raw_event(input_events) => {
                let event = raw_ev?;
                let Some(ev) = ui::interpret_event(ui_state, event) else {
                    continue;
                };
                if ui::apply_local(ui_state, &ev) {
                    ui::draw(ui_state, &controller.snapshot())
                        .wrap_err("draw after selection change failed")?;
                    continue;
                }
                match ev {
                    ui::UserEvent::Quit => break,
                    ui::UserEvent::PlaceBet { icon_idx } => controller.place_bet(icon_idx),
                    ui::UserEvent::ChooseAmount(amount) => controller.select_bet_amount(amount),
                    ui::UserEvent::ClearBets => controller.clear_bets(),
                    ui::UserEvent::StartRound => controller.start_round(),
                    ui::UserEvent::CloseResult => controller.close_result(),
                    ui::UserEvent::GrantFunds => controller.grant_funds(),
                    ui::UserEvent::OpenWallet
                    | ui::UserEvent::OpenHistory
                    | ui::UserEvent::MoveSelection { .. }
                    | ui::UserEvent::Redraw => {}
                }
            }
        }
        ui::draw(ui_state, &controller.snapshot()).wrap_err("draw failed")?;
    }
    info!(rounds = controller.game.rounds_completed(), "exiting");
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]
    use super::*;
    use lucky_slip::{
        RoundStatus,
        test_helpers::ScriptedDraw,
    };
    use std::time::Duration;

    fn controller() -> AppController<ScriptedDraw> {
        let delays = PhaseDelays {
            spin: Duration::from_millis(1500),
            reveal: Duration::from_millis(2000),
        };
        AppController::new(GameController::new(5000, ScriptedDraw::default()), delays)
    }

    #[test]
    fn place_bet__uses_selected_chip_amount() {
        // given
        let mut app = controller();
        app.select_bet_amount(500);

        // when
        app.place_bet(2);

        // then
        let snap = app.snapshot();
        assert_eq!(snap.game.wallet.balance, 4500);
        assert_eq!(snap.game.round.total_stake, 500);
        assert_eq!(snap.status, "Placed ₹500 on Sun");
    }

    #[test]
    fn place_bet__insufficient_balance_sets_status_without_error() {
        let mut app = controller();
        app.select_bet_amount(10_000);
        app.place_bet(0);
        let snap = app.snapshot();
        assert_eq!(snap.status, "Insufficient balance!");
        assert!(snap.errors.is_empty());
        assert_eq!(snap.game.wallet.balance, 5000);
    }

    #[test]
    fn start_round__without_bets_schedules_nothing() {
        let mut app = controller();
        app.start_round();
        assert!(app.timer().is_none());
        assert!(app.snapshot().errors.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn on_timer__drives_round_to_result() {
        // given
        let mut app = controller();
        app.game.draw_source_mut().push_winner("sun");
        app.place_bet(2);
        app.start_round();

        // when
        let timer = wait_for(app.timer()).await;
        let completed = app.on_timer(timer);

        // then
        assert!(!completed);
        assert_eq!(app.game.status(), RoundStatus::Revealing);

        // when
        let timer = wait_for(app.timer()).await;
        let completed = app.on_timer(timer);

        // then
        assert!(completed);
        assert!(app.timer().is_none());
        assert_eq!(app.snapshot().game.wallet.balance, 5900);
        assert_eq!(app.status, "Round 1: won ₹1000");
    }

    #[test]
    fn grant_funds__adds_fixed_top_up() {
        let mut app = controller();
        app.grant_funds();
        assert_eq!(app.snapshot().game.wallet.balance, 6000);
    }

    #[test]
    fn push_errors__keeps_only_latest() {
        // given
        let mut app = controller();

        // when
        app.push_errors((0..60).map(|i| format!("e{i}")).collect());

        // then
        assert_eq!(app.errors.len(), MAX_ERRORS);
        let visible = app.snapshot().errors;
        assert_eq!(visible.len(), VISIBLE_ERRORS);
        assert_eq!(visible[0], "e59");
    }
}
