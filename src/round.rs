use crate::{
    error::{
        GameError,
        GameResult,
    },
    icons::{
        BET_MULTIPLIER,
        GAME_ICONS,
        IconId,
    },
    wallet::WalletLedger,
};
use rand::{
    Rng,
    SeedableRng,
    rngs::StdRng,
};
use serde::Serialize;
use std::fmt;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize)]
pub enum RoundStatus {
    #[default]
    Idle,
    Spinning,
    Revealing,
    Result,
}

impl fmt::Display for RoundStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RoundStatus::Idle => "idle",
            RoundStatus::Spinning => "spinning",
            RoundStatus::Revealing => "revealing",
            RoundStatus::Result => "showing result",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct Bet {
    pub icon_id: IconId,
    pub amount: u64,
}

/// Picks the index of the winning icon for a round.
pub trait DrawSource {
    fn draw_index(&mut self, icon_count: usize) -> usize;
}

/// Uniform draw over the icon set. Not suitable for anything requiring an
/// auditable outcome.
#[derive(Debug)]
pub struct RandomDraw<R = StdRng> {
    rng: R,
}

impl RandomDraw<StdRng> {
    pub fn from_os_rng() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl<R: Rng> RandomDraw<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> DrawSource for RandomDraw<R> {
    fn draw_index(&mut self, icon_count: usize) -> usize {
        self.rng.random_range(0..icon_count)
    }
}

#[derive(Clone, Debug, Default)]
pub struct RoundEngine {
    status: RoundStatus,
    bets: Vec<Bet>,
    winning_icon: Option<IconId>,
}

impl RoundEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> RoundStatus {
        self.status
    }

    pub fn bets(&self) -> &[Bet] {
        &self.bets
    }

    pub fn bet_on(&self, icon_id: IconId) -> Option<&Bet> {
        self.bets.iter().find(|bet| bet.icon_id == icon_id)
    }

    pub fn total_stake(&self) -> u64 {
        self.bets.iter().map(|bet| bet.amount).sum()
    }

    /// Only observable once the draw has happened.
    pub fn winning_icon(&self) -> Option<IconId> {
        match self.status {
            RoundStatus::Revealing | RoundStatus::Result => self.winning_icon,
            RoundStatus::Idle | RoundStatus::Spinning => None,
        }
    }

    fn require(&self, expected: RoundStatus, intent: &'static str) -> GameResult<()> {
        if self.status != expected {
            return Err(GameError::guard(intent, self.status));
        }
        Ok(())
    }

    pub fn place_bet(
        &mut self,
        wallet: &mut WalletLedger,
        icon_id: IconId,
        amount: u64,
    ) -> GameResult<()> {
        self.require(RoundStatus::Idle, "placing a bet")?;
        wallet.debit(amount)?;
        match self.bets.iter_mut().find(|bet| bet.icon_id == icon_id) {
            Some(bet) => bet.amount = bet.amount.saturating_add(amount),
            None => self.bets.push(Bet { icon_id, amount }),
        }
        Ok(())
    }

    /// Returns the refunded total.
    pub fn clear_bets(&mut self, wallet: &mut WalletLedger) -> GameResult<u64> {
        self.require(RoundStatus::Idle, "clearing bets")?;
        if self.bets.is_empty() {
            return Err(GameError::guard("clearing an empty bet set", self.status));
        }
        let refund = self.total_stake();
        wallet.refund(refund)?;
        self.bets.clear();
        Ok(refund)
    }

    pub fn start(&mut self) -> GameResult<()> {
        self.require(RoundStatus::Idle, "starting a round")?;
        if self.bets.is_empty() {
            return Err(GameError::guard("starting a round without bets", self.status));
        }
        self.status = RoundStatus::Spinning;
        Ok(())
    }

    /// Spinning -> Revealing. The draw never looks at the bet set.
    pub fn draw(&mut self, source: &mut impl DrawSource) -> GameResult<IconId> {
        self.require(RoundStatus::Spinning, "drawing")?;
        let idx = source.draw_index(GAME_ICONS.len()) % GAME_ICONS.len();
        let winner = GAME_ICONS[idx].id;
        self.winning_icon = Some(winner);
        self.status = RoundStatus::Revealing;
        Ok(winner)
    }

    pub fn payout_for(&self, winner: IconId) -> u64 {
        self.bet_on(winner)
            .map(|bet| bet.amount.saturating_mul(BET_MULTIPLIER))
            .unwrap_or(0)
    }

    /// Revealing -> Result. Credits the payout and returns it.
    pub fn settle(&mut self, wallet: &mut WalletLedger) -> GameResult<(IconId, u64)> {
        self.require(RoundStatus::Revealing, "settling")?;
        let Some(winner) = self.winning_icon else {
            return Err(GameError::guard("settling without a winner", self.status));
        };
        let payout = self.payout_for(winner);
        wallet.credit(payout);
        self.status = RoundStatus::Result;
        Ok((winner, payout))
    }

    pub fn acknowledge(&mut self) -> GameResult<()> {
        self.require(RoundStatus::Result, "closing the result")?;
        self.bets.clear();
        self.winning_icon = None;
        self.status = RoundStatus::Idle;
        Ok(())
    }
}
