use crate::error::{
    GameError,
    GameResult,
};
use serde::Serialize;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct WalletState {
    pub balance: u64,
    pub total_won: u64,
    pub total_bet: u64,
}

/// Spendable balance plus the lifetime winnings/wagered counters.
///
/// Each operation either applies completely or returns an error without
/// touching any field.
#[derive(Clone, Debug)]
pub struct WalletLedger {
    state: WalletState,
}

impl WalletLedger {
    pub fn new(initial_balance: u64) -> Self {
        Self {
            state: WalletState {
                balance: initial_balance,
                total_won: 0,
                total_bet: 0,
            },
        }
    }

    pub fn state(&self) -> WalletState {
        self.state
    }

    pub fn balance(&self) -> u64 {
        self.state.balance
    }

    pub fn debit(&mut self, amount: u64) -> GameResult<()> {
        if amount == 0 {
            return Err(GameError::InvalidAmount);
        }
        if self.state.balance < amount {
            return Err(GameError::InsufficientFunds {
                requested: amount,
                available: self.state.balance,
            });
        }
        self.state.balance -= amount;
        self.state.total_bet = self.state.total_bet.saturating_add(amount);
        Ok(())
    }

    pub fn credit(&mut self, amount: u64) {
        if amount == 0 {
            return;
        }
        self.state.balance = self.state.balance.saturating_add(amount);
        self.state.total_won = self.state.total_won.saturating_add(amount);
    }

    /// Reverses earlier debits of bets that never reached a draw.
    pub fn refund(&mut self, amount: u64) -> GameResult<()> {
        if amount > self.state.total_bet {
            return Err(GameError::RefundExceedsWagered {
                requested: amount,
                wagered: self.state.total_bet,
            });
        }
        self.state.total_bet -= amount;
        self.state.balance = self.state.balance.saturating_add(amount);
        Ok(())
    }

    pub fn grant(&mut self, amount: u64) {
        self.state.balance = self.state.balance.saturating_add(amount);
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn debit__moves_amount_from_balance_to_total_bet() {
        // given
        let mut ledger = WalletLedger::new(5000);

        // when
        ledger.debit(100).unwrap();

        // then
        let expected = WalletState {
            balance: 4900,
            total_won: 0,
            total_bet: 100,
        };
        assert_eq!(ledger.state(), expected);
    }

    #[test]
    fn debit__fails_without_mutation_when_balance_too_low() {
        // given
        let mut ledger = WalletLedger::new(50);

        // when
        let result = ledger.debit(100);

        // then
        assert_eq!(
            result,
            Err(GameError::InsufficientFunds {
                requested: 100,
                available: 50
            })
        );
        assert_eq!(ledger.state(), WalletLedger::new(50).state());
    }

    #[test]
    fn debit__rejects_zero_amount() {
        let mut ledger = WalletLedger::new(50);
        assert_eq!(ledger.debit(0), Err(GameError::InvalidAmount));
        assert_eq!(ledger.balance(), 50);
    }

    #[test]
    fn debit__allows_spending_entire_balance() {
        let mut ledger = WalletLedger::new(100);
        ledger.debit(100).unwrap();
        assert_eq!(ledger.balance(), 0);
    }

    #[test]
    fn credit__zero_amount_is_noop() {
        // given
        let mut ledger = WalletLedger::new(5000);
        ledger.debit(50).unwrap();
        let before = ledger.state();

        // when
        ledger.credit(0);

        // then
        assert_eq!(ledger.state(), before);
    }

    #[test]
    fn credit__counts_towards_total_won() {
        let mut ledger = WalletLedger::new(4900);
        ledger.credit(1000);
        assert_eq!(ledger.state().balance, 5900);
        assert_eq!(ledger.state().total_won, 1000);
    }

    #[test]
    fn refund__does_not_touch_total_won() {
        // given
        let mut ledger = WalletLedger::new(5000);
        ledger.debit(300).unwrap();
        ledger.credit(10);

        // when
        ledger.refund(300).unwrap();

        // then
        let expected = WalletState {
            balance: 5010,
            total_won: 10,
            total_bet: 0,
        };
        assert_eq!(ledger.state(), expected);
    }

    #[test]
    fn refund__rejects_more_than_was_wagered() {
        let mut ledger = WalletLedger::new(5000);
        ledger.debit(10).unwrap();
        assert!(ledger.refund(11).is_err());
        assert_eq!(ledger.state().total_bet, 10);
        assert_eq!(ledger.balance(), 4990);
    }

    #[test]
    fn grant__only_increases_balance() {
        // given
        let mut ledger = WalletLedger::new(5000);

        // when
        ledger.grant(1000);

        // then
        let expected = WalletState {
            balance: 6000,
            total_won: 0,
            total_bet: 0,
        };
        assert_eq!(ledger.state(), expected);
    }

    proptest! {
        #[test]
        fn debit_then_refund__restores_initial_state(
            initial in 0u64..1_000_000,
            amounts in proptest::collection::vec(1u64..5_000, 0..20),
        ) {
            let mut ledger = WalletLedger::new(initial);
            let mut debited = 0u64;
            for amount in amounts {
                if ledger.debit(amount).is_ok() {
                    debited += amount;
                }
                prop_assert_eq!(ledger.balance() + debited, initial);
            }
            ledger.refund(debited).unwrap();
            prop_assert_eq!(ledger.state(), WalletLedger::new(initial).state());
        }
    }
}
