#![allow(non_snake_case)]
use lucky_slip::{
    HISTORY_CAPACITY,
    test_helpers::TestContext,
};

#[test]
fn history__newest_round_first() {
    let mut ctx = TestContext::new();

    // when
    ctx.play_round(&[("sun", 100)], "sun").unwrap();
    ctx.play_round(&[("cow", 50)], "rose").unwrap();

    // then
    let history = ctx.game().snapshot().history;
    let rounds: Vec<u64> = history.iter().map(|entry| entry.round).collect();
    assert_eq!(rounds, vec![2, 1]);
    assert_eq!(history[0].payout, 0);
    assert_eq!(history[1].payout, 1000);
}

#[test]
fn history__twenty_first_round_evicts_the_oldest() {
    let mut ctx = TestContext::new();

    // when
    for _ in 0..21 {
        ctx.play_round(&[("lamp", 10)], "bucket").unwrap();
    }

    // then
    let history = ctx.game().snapshot().history;
    assert_eq!(history.len(), HISTORY_CAPACITY);
    let rounds: Vec<u64> = history.iter().map(|entry| entry.round).collect();
    let expected: Vec<u64> = (2..=21).rev().collect();
    assert_eq!(rounds, expected);
    assert_eq!(ctx.game().rounds_completed(), 21);
}

#[test]
fn history__entry_records_bets_and_short_id() {
    let mut ctx = TestContext::new();

    // when
    ctx.play_round(&[("spinning-top", 500), ("pigeon", 100)], "pigeon")
        .unwrap();

    // then
    let entry = ctx.game().snapshot().history[0].clone();
    assert_eq!(entry.bets.len(), 2);
    assert_eq!(entry.total_staked(), 600);
    assert_eq!(entry.payout, 1000);
    assert_eq!(entry.id.len(), 9);
    assert!(
        entry
            .id
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase())
    );
}

#[test]
fn history__unchanged_by_cleared_bets() {
    let mut ctx = TestContext::new();
    ctx.game().place_bet("sun", 100).unwrap();
    ctx.game().clear_bets().unwrap();
    assert!(ctx.game().history().is_empty());
}
