use crate::{
    error::{
        GameError,
        GameResult,
    },
    history::{
        HistoryEntry,
        HistoryLog,
        entry_id,
    },
    icons::IconId,
    round::{
        Bet,
        DrawSource,
        RandomDraw,
        RoundEngine,
        RoundStatus,
    },
    wallet::{
        WalletLedger,
        WalletState,
    },
};
use chrono::Utc;
use serde::Serialize;
use tracing::{
    debug,
    info,
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RoundView {
    pub status: RoundStatus,
    pub bets: Vec<Bet>,
    pub winning_icon: Option<IconId>,
    pub total_stake: u64,
}

impl RoundView {
    pub fn bet_on(&self, icon_id: IconId) -> Option<u64> {
        self.bets
            .iter()
            .find(|bet| bet.icon_id == icon_id)
            .map(|bet| bet.amount)
    }
}

/// Read-only view handed to the presentation layer after every mutation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GameSnapshot {
    pub wallet: WalletState,
    pub round: RoundView,
    pub history: Vec<HistoryEntry>,
}

impl GameSnapshot {
    /// Payout of the round currently on display, once it has settled.
    pub fn last_payout(&self) -> Option<u64> {
        match self.round.status {
            RoundStatus::Result => self.history.first().map(|entry| entry.payout),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoundOutcome {
    pub round: u64,
    pub winner: IconId,
    pub payout: u64,
}

pub struct GameController<D = RandomDraw> {
    wallet: WalletLedger,
    round: RoundEngine,
    history: HistoryLog,
    draw: D,
    rounds_completed: u64,
}

impl<D: DrawSource> GameController<D> {
    pub fn new(initial_balance: u64, draw: D) -> Self {
        Self {
            wallet: WalletLedger::new(initial_balance),
            round: RoundEngine::new(),
            history: HistoryLog::default(),
            draw,
            rounds_completed: 0,
        }
    }

    pub fn wallet(&self) -> WalletState {
        self.wallet.state()
    }

    pub fn status(&self) -> RoundStatus {
        self.round.status()
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    pub fn rounds_completed(&self) -> u64 {
        self.rounds_completed
    }

    pub fn draw_source_mut(&mut self) -> &mut D {
        &mut self.draw
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            wallet: self.wallet.state(),
            round: RoundView {
                status: self.round.status(),
                bets: self.round.bets().to_vec(),
                winning_icon: self.round.winning_icon(),
                total_stake: self.round.total_stake(),
            },
            history: self.history.to_vec(),
        }
    }

    pub fn place_bet(&mut self, icon_id: &str, amount: u64) -> GameResult<()> {
        let icon = IconId::parse(icon_id)
            .ok_or_else(|| GameError::UnknownIcon(icon_id.to_string()))?;
        self.round
            .place_bet(&mut self.wallet, icon, amount)
            .inspect_err(|e| debug!(%icon, amount, error = %e, "bet rejected"))?;
        debug!(%icon, amount, balance = self.wallet.balance(), "bet placed");
        Ok(())
    }

    pub fn clear_bets(&mut self) -> GameResult<u64> {
        let refunded = self.round.clear_bets(&mut self.wallet)?;
        debug!(refunded, "bets cleared");
        Ok(refunded)
    }

    pub fn start_round(&mut self) -> GameResult<()> {
        self.round.start()?;
        info!(
            round = self.rounds_completed + 1,
            stake = self.round.total_stake(),
            "round started"
        );
        Ok(())
    }

    /// Fired when the spin phase elapses.
    pub fn reveal_winner(&mut self) -> GameResult<IconId> {
        let winner = self.round.draw(&mut self.draw)?;
        info!(round = self.rounds_completed + 1, %winner, "winner drawn");
        Ok(winner)
    }

    /// Fired when the reveal phase elapses: settles the payout and records the
    /// round in the history log.
    pub fn complete_round(&mut self) -> GameResult<RoundOutcome> {
        let (winner, payout) = self.round.settle(&mut self.wallet)?;
        self.rounds_completed += 1;
        let entry = HistoryEntry {
            id: entry_id(&mut rand::rng()),
            round: self.rounds_completed,
            timestamp: Utc::now(),
            bets: self.round.bets().to_vec(),
            winning_icon: winner,
            payout,
        };
        if let Some(evicted) = self.history.push(entry) {
            debug!(round = evicted.round, "history entry evicted");
        }
        info!(
            round = self.rounds_completed,
            %winner,
            payout,
            balance = self.wallet.balance(),
            "round settled"
        );
        Ok(RoundOutcome {
            round: self.rounds_completed,
            winner,
            payout,
        })
    }

    pub fn acknowledge_result(&mut self) -> GameResult<()> {
        self.round.acknowledge()
    }

    /// Mock top-up; not counted as winnings.
    pub fn grant_funds(&mut self, amount: u64) -> GameResult<()> {
        if amount == 0 {
            return Err(GameError::InvalidAmount);
        }
        self.wallet.grant(amount);
        info!(amount, balance = self.wallet.balance(), "funds granted");
        Ok(())
    }
}

impl GameController<RandomDraw> {
    pub fn with_random_draw(initial_balance: u64, seed: Option<u64>) -> Self {
        let draw = match seed {
            Some(seed) => RandomDraw::seeded(seed),
            None => RandomDraw::from_os_rng(),
        };
        Self::new(initial_balance, draw)
    }
}
