#![allow(non_snake_case)]
use lucky_slip::{
    GameError,
    IconId,
    RoundStatus,
    test_helpers::TestContext,
};

fn id(raw: &str) -> IconId {
    IconId::parse(raw).unwrap()
}

#[test]
fn place_bet__adds_bet_and_debits_wallet() {
    let mut ctx = TestContext::new();
    // given
    let bet_amount = 100;

    // when
    ctx.game().place_bet("kite", bet_amount).unwrap();

    // then
    let snap = ctx.game().snapshot();
    assert_eq!(snap.round.bet_on(id("kite")), Some(bet_amount));
    assert_eq!(snap.wallet.balance, 4900);
    assert_eq!(snap.wallet.total_bet, 100);
    assert_eq!(snap.round.status, RoundStatus::Idle);
}

#[test]
fn place_bet__same_icon_accumulates() {
    let mut ctx = TestContext::new();
    // given
    ctx.game().place_bet("rose", 50).unwrap();

    // when
    ctx.game().place_bet("rose", 500).unwrap();

    // then
    let snap = ctx.game().snapshot();
    assert_eq!(snap.round.bets.len(), 1);
    assert_eq!(snap.round.bet_on(id("rose")), Some(550));
    assert_eq!(snap.wallet.balance, 4450);
}

#[test]
fn place_bet__keeps_insertion_order_across_icons() {
    let mut ctx = TestContext::new();

    // when
    ctx.game().place_bet("pigeon", 10).unwrap();
    ctx.game().place_bet("cow", 10).unwrap();
    ctx.game().place_bet("pigeon", 10).unwrap();

    // then
    let order: Vec<&str> = ctx
        .game()
        .snapshot()
        .round
        .bets
        .iter()
        .map(|bet| bet.icon_id.as_str())
        .collect();
    assert_eq!(order, vec!["pigeon", "cow"]);
}

#[test]
fn place_bet__fails_if_balance_too_low() {
    let mut ctx = TestContext::with_balance(50);

    // when
    let err = ctx.game().place_bet("sun", 100).unwrap_err();

    // then
    assert_eq!(
        err,
        GameError::InsufficientFunds {
            requested: 100,
            available: 50
        }
    );
    let snap = ctx.game().snapshot();
    assert_eq!(snap.wallet.balance, 50);
    assert!(snap.round.bets.is_empty());
}

#[test]
fn place_bet__exact_balance_is_allowed() {
    let mut ctx = TestContext::with_balance(100);
    ctx.game().place_bet("sun", 100).unwrap();
    assert_eq!(ctx.game().wallet().balance, 0);
}

#[test]
fn place_bet__unknown_icon_is_rejected() {
    let mut ctx = TestContext::new();
    let err = ctx.game().place_bet("dragon", 100).unwrap_err();
    assert_eq!(err, GameError::UnknownIcon("dragon".to_string()));
    assert_eq!(ctx.game().wallet().balance, 5000);
}

#[test]
fn place_bet__rejected_while_round_in_progress() {
    let mut ctx = TestContext::new();
    // given
    ctx.game().place_bet("ball", 100).unwrap();
    ctx.game().start_round().unwrap();

    // when
    let err = ctx.game().place_bet("ball", 100).unwrap_err();

    // then
    assert!(err.is_guard());
    assert_eq!(ctx.game().wallet().balance, 4900);
    assert_eq!(ctx.game().snapshot().round.total_stake, 100);
}

#[test]
fn clear_bets__refunds_every_stake() {
    let mut ctx = TestContext::new();
    // given
    ctx.game().place_bet("lamp", 100).unwrap();
    ctx.game().place_bet("bucket", 1000).unwrap();

    // when
    let refunded = ctx.game().clear_bets().unwrap();

    // then
    assert_eq!(refunded, 1100);
    let snap = ctx.game().snapshot();
    assert_eq!(snap.wallet.balance, 5000);
    assert_eq!(snap.wallet.total_bet, 0);
    assert!(snap.round.bets.is_empty());
}

#[test]
fn clear_bets__without_bets_is_rejected() {
    let mut ctx = TestContext::new();
    assert!(ctx.game().clear_bets().unwrap_err().is_guard());
}
