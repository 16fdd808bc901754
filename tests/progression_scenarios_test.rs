//! Round-by-round scenarios for every progression family, driven through a session.

use rust_decimal_macros::dec;
use stakeline::domain::{ActiveSet, Decimal, PayoutRule, Side, StateSnapshot, StrategyId};
use stakeline::oracle::OracleMode;
use stakeline::simulation::RandomOutcomeSource;
use stakeline::{ResolveStatus, Session, SessionOptions};

fn d(v: i64) -> Decimal {
    Decimal::from(v)
}

fn session(strategy: StrategyId, base_unit: i64, side: Side) -> Session {
    Session::initialize(
        strategy,
        d(base_unit),
        SessionOptions {
            oracle: OracleMode::Fixed { side },
            ..SessionOptions::default()
        },
    )
    .unwrap()
}

fn no_commission(strategy: StrategyId, side: Side) -> Session {
    Session::initialize(
        strategy,
        Decimal::one(),
        SessionOptions {
            oracle: OracleMode::Fixed { side },
            payout: PayoutRule::new(None, Decimal::zero()),
            default_seed: None,
        },
    )
    .unwrap()
}

/// Recommend, resolve, and return the stake that was played.
fn play(session: &mut Session, outcome: Side) -> Decimal {
    let stake = session.recommend().expect("recommendation").stake;
    assert!(matches!(session.resolve(outcome), ResolveStatus::Resolved(_)));
    stake
}

#[test]
fn test_one_two_two_one_completes_after_two_wins() {
    let mut s = session(StrategyId::OneTwoTwoOne, 20, Side::B);

    assert_eq!(play(&mut s, Side::B), d(40));
    assert_eq!(
        s.snapshot(),
        StateSnapshot::Sequence {
            sequence: vec![d(2), d(2)]
        }
    );
    assert!(!s.ledger().complete);

    assert_eq!(play(&mut s, Side::B), d(80));
    assert!(s.ledger().complete);
    assert_eq!(s.ledger().cumulative_pnl, d(120));
    assert_eq!(s.recommend(), None);
}

#[test]
fn test_one_two_two_one_loss_appends_stake_units() {
    let mut s = session(StrategyId::OneTwoTwoOne, 10, Side::B);
    assert_eq!(play(&mut s, Side::A), d(20));
    assert_eq!(
        s.snapshot(),
        StateSnapshot::Sequence {
            sequence: vec![d(1), d(2), d(2), d(1), d(2)]
        }
    );
    assert_eq!(play(&mut s, Side::B), d(30));
    assert_eq!(
        s.snapshot(),
        StateSnapshot::Sequence {
            sequence: vec![d(2), d(2), d(1)]
        }
    );
}

#[test]
fn test_one_three_two_four_cycles_and_restarts_on_loss() {
    let mut s = session(StrategyId::OneThreeTwoFour, 10, Side::B);
    let stakes: Vec<Decimal> = [Side::B, Side::B, Side::B, Side::B, Side::B]
        .into_iter()
        .map(|o| play(&mut s, o))
        .collect();
    assert_eq!(stakes, vec![d(10), d(30), d(20), d(40), d(10)]);

    assert_eq!(play(&mut s, Side::A), d(30));
    assert_eq!(s.snapshot(), StateSnapshot::Cycle { step: 0 });
    assert!(!s.ledger().is_terminal());
}

#[test]
fn test_ladder_completes_on_tenth_win_only() {
    let mut s = no_commission(StrategyId::TenStepLadder, Side::A);
    let mut outcomes = RandomOutcomeSource::new(0.4, Some(17));
    let mut wins = 0;
    while !s.ledger().complete {
        assert!(s.ledger().rounds.len() < 10_000);
        let outcome = outcomes.draw();
        play(&mut s, outcome);
        if outcome == Side::A {
            wins += 1;
        }
        assert_eq!(s.ledger().complete, wins == 10);
    }
    assert_eq!(s.ledger().wins(), 10);
}

#[test]
fn test_ladder_never_completes_below_target() {
    let mut s = no_commission(StrategyId::TenStepLadder, Side::A);
    for _ in 0..9 {
        play(&mut s, Side::A);
    }
    for _ in 0..200 {
        play(&mut s, Side::B);
    }
    assert!(!s.ledger().complete);
    assert!(!s.ledger().busted);
    assert_eq!(
        s.snapshot(),
        StateSnapshot::Ladder {
            level: 9,
            wins: 9,
            target_wins: Some(10)
        }
    );
}

#[test]
fn test_nine_tier_end_to_end() {
    let mut s = session(StrategyId::NineTier, 1, Side::A);

    assert_eq!(play(&mut s, Side::A), d(1));
    assert_eq!(s.ledger().cumulative_pnl, Decimal::new(dec!(0.95)));
    assert!(matches!(
        s.snapshot(),
        StateSnapshot::Tiered { level: 0, step: 0, .. }
    ));

    assert_eq!(play(&mut s, Side::B), d(1));
    assert_eq!(s.recommend().unwrap().stake, d(2));

    assert_eq!(play(&mut s, Side::B), d(2));
    assert_eq!(s.recommend().unwrap().stake, d(4));

    assert_eq!(play(&mut s, Side::B), d(4));
    match s.snapshot() {
        StateSnapshot::Tiered {
            level, step, level_loss, ..
        } => {
            assert_eq!((level, step), (1, 0));
            assert_eq!(level_loss, Decimal::zero());
        }
        other => panic!("unexpected state {:?}", other),
    }
    assert_eq!(s.recommend().unwrap().stake, d(2));
}

#[test]
fn test_eight_layer_retreats_one_level_on_later_win() {
    let mut s = no_commission(StrategyId::EightLayer, Side::A);
    // Level 0 [1,1,2] lost in full moves to level 1.
    for expected in [1, 1, 2] {
        assert_eq!(play(&mut s, Side::B), d(expected));
    }
    assert!(matches!(s.snapshot(), StateSnapshot::Tiered { level: 1, step: 0, .. }));

    assert_eq!(play(&mut s, Side::A), d(2));
    assert!(matches!(s.snapshot(), StateSnapshot::Tiered { level: 1, step: 1, .. }));
    assert_eq!(play(&mut s, Side::A), d(2));
    assert!(matches!(s.snapshot(), StateSnapshot::Tiered { level: 0, step: 0, .. }));
}

#[test]
fn test_two_set_mirror_hands_over_and_back() {
    let mut s = no_commission(StrategyId::TwoSetMirror, Side::A);

    assert_eq!(play(&mut s, Side::A), d(1));
    assert_eq!(
        s.snapshot(),
        StateSnapshot::DualSet {
            active: ActiveSet::Second,
            first_level: 0,
            doubled: false,
            second_level: 0
        }
    );
    assert_eq!(play(&mut s, Side::A), d(1));
    assert_eq!(play(&mut s, Side::B), d(2));
    assert_eq!(
        s.snapshot(),
        StateSnapshot::DualSet {
            active: ActiveSet::First,
            first_level: 0,
            doubled: false,
            second_level: 0
        }
    );

    assert_eq!(play(&mut s, Side::B), d(1));
    assert_eq!(play(&mut s, Side::A), d(2));
    assert_eq!(s.recommend().unwrap().stake, d(4));
    assert_eq!(play(&mut s, Side::A), d(4));
    assert_eq!(s.recommend().unwrap().stake, d(1));
}

#[test]
fn test_two_set_mirror_busts_past_last_level() {
    let mut s = no_commission(StrategyId::TwoSetMirror, Side::A);
    for _ in 0..8 {
        play(&mut s, Side::B);
    }
    assert!(s.ledger().busted);
    assert_eq!(s.ledger().cumulative_pnl, d(-255));
}

#[test]
fn test_netted_mirror_cancelled_round_books_nothing_but_advances() {
    let mut s = no_commission(StrategyId::NettedMirror, Side::A);

    let first = s.recommend().unwrap();
    assert_eq!(first.stake, Decimal::zero());
    assert_eq!(first.legs.len(), 2);
    let report = s.resolve(Side::A).report().cloned().unwrap();
    assert_eq!(report.pnl_delta, Decimal::zero());
    assert!(!report.won);
    assert_eq!(s.ledger().wins(), 0);
    assert_eq!(s.ledger().losses(), 0);

    let second = s.recommend().unwrap();
    assert_eq!(second.side, Side::B);
    assert_eq!(second.stake, d(1));
    let report = s.resolve(Side::B).report().cloned().unwrap();
    assert_eq!(report.pnl_delta, d(1));
    assert_eq!(s.ledger().rounds.len(), 2);
    assert_eq!(s.ledger().wins(), 1);
    assert_eq!(s.ledger().losses(), 0);
}
