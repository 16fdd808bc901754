//! Netted combination of two systems betting opposite sides.
//!
//! The main system follows the oracle's side; the hedge ladder takes the other
//! side. Only the net position is staked. Its P/L is shared back to each system
//! in proportion to the signed stake it contributed to the net.

use serde::Serialize;

use crate::domain::{Decimal, Outcome, PayoutRule, Side, StateSnapshot};

use super::stake_table::StakeTableError;
use super::{DualSetEngine, LadderEngine, Progress, Progression, Recommendation, Settlement, Wager};

/// Net stake after offsetting two wagers. `side` is None when they cancel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NetPosition {
    pub side: Option<Side>,
    pub stake: Decimal,
}

/// Same-side stakes add; opposite-side stakes subtract, keeping the larger side.
pub fn net_position(
    main_stake: Decimal,
    main_side: Side,
    mirror_stake: Decimal,
    mirror_side: Side,
) -> NetPosition {
    if main_side == mirror_side {
        return NetPosition {
            side: Some(main_side),
            stake: main_stake + mirror_stake,
        };
    }
    let diff = main_stake - mirror_stake;
    if diff.is_zero() {
        NetPosition {
            side: None,
            stake: Decimal::zero(),
        }
    } else if diff.is_positive() {
        NetPosition {
            side: Some(main_side),
            stake: diff,
        }
    } else {
        NetPosition {
            side: Some(mirror_side),
            stake: diff.abs(),
        }
    }
}

/// Split `net_pnl` across `legs` by signed contribution to the net stake.
///
/// A leg on the net side contributes `+stake`, a leg against it `-stake`.
/// The shares always sum to `net_pnl` exactly; the last leg absorbs rounding.
pub fn distribute_pnl(net_pnl: Decimal, net: &NetPosition, legs: &[Wager]) -> Vec<Decimal> {
    let Some(net_side) = net.side.filter(|_| net.stake.is_positive()) else {
        return vec![Decimal::zero(); legs.len()];
    };

    let mut shares = Vec::with_capacity(legs.len());
    let mut allotted = Decimal::zero();
    for (i, leg) in legs.iter().enumerate() {
        let share = if i + 1 == legs.len() {
            net_pnl - allotted
        } else {
            let signed = if leg.side == net_side {
                leg.stake
            } else {
                -leg.stake
            };
            (net_pnl * signed)
                .checked_div(net.stake)
                .unwrap_or_else(Decimal::zero)
        };
        allotted += share;
        shares.push(share);
    }
    shares
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NettedEngine {
    main: DualSetEngine,
    hedge: LadderEngine,
}

impl NettedEngine {
    pub fn new(main: DualSetEngine, hedge: LadderEngine) -> Self {
        Self { main, hedge }
    }

    pub fn main(&self) -> &DualSetEngine {
        &self.main
    }

    pub fn hedge(&self) -> &LadderEngine {
        &self.hedge
    }

    pub fn plan(&self, side: Side) -> Option<Recommendation> {
        let main = Wager {
            side,
            stake: self.main.next_stake()?,
        };
        let hedge = Wager {
            side: side.opposite(),
            stake: self.hedge.next_stake()?,
        };
        let net = net_position(main.stake, main.side, hedge.stake, hedge.side);
        Some(Recommendation {
            side: net.side.unwrap_or(side),
            stake: net.stake,
            legs: vec![main, hedge],
        })
    }

    pub fn settle(
        &mut self,
        plan: &Recommendation,
        outcome: Outcome,
        payout: &PayoutRule,
    ) -> Settlement {
        let (main, hedge) = match plan.legs.as_slice() {
            [main, hedge] => (*main, *hedge),
            _ => {
                return Settlement {
                    pnl_delta: Decimal::zero(),
                    progress: Progress::Continue,
                }
            }
        };

        let net = net_position(main.stake, main.side, hedge.stake, hedge.side);
        let pnl_delta = match net.side {
            Some(side) if net.stake.is_positive() => payout.settle(net.stake, side, outcome),
            _ => Decimal::zero(),
        };
        let shares = distribute_pnl(pnl_delta, &net, &[main, hedge]);

        let main_progress = self.main.record(main.side == outcome, main.stake, shares[0]);
        let hedge_progress = self.hedge.record(hedge.side == outcome, hedge.stake, shares[1]);
        if hedge_progress == Progress::Complete {
            self.hedge.reset();
        }

        let progress = if main_progress == Progress::Busted || hedge_progress == Progress::Busted {
            Progress::Busted
        } else {
            Progress::Continue
        };
        Settlement {
            pnl_delta,
            progress,
        }
    }

    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot::Netted {
            main: Box::new(self.main.snapshot()),
            hedge: Box::new(self.hedge.snapshot()),
        }
    }

    pub fn reset(&mut self) {
        self.main.reset();
        self.hedge.reset();
    }

    /// Main system tables followed by the hedge ladder.
    pub fn stakes(&self) -> Vec<Decimal> {
        let mut stakes = self.main.stakes();
        stakes.extend(self.hedge.stakes());
        stakes
    }

    pub fn set_base_unit(&mut self, base_unit: Decimal) -> Result<Decimal, StakeTableError> {
        let mut main = self.main.clone();
        let previous = main.set_base_unit(base_unit)?;
        self.hedge.set_base_unit(base_unit)?;
        self.main = main;
        Ok(previous)
    }

    pub fn edit_stake(&mut self, index: usize, value: Decimal) -> Result<Decimal, StakeTableError> {
        let main_len = self.main.stakes().len();
        if index < main_len {
            return self.main.edit_stake(index, value);
        }
        self.hedge
            .edit_stake(index - main_len, value)
            .map_err(|e| match e {
                StakeTableError::NonPositive {
                    rejected, previous, ..
                } => StakeTableError::NonPositive {
                    index,
                    rejected,
                    previous,
                },
                StakeTableError::IndexOutOfRange { len, .. } => StakeTableError::IndexOutOfRange {
                    index,
                    len: main_len + len,
                },
                StakeTableError::Overflow { previous, .. } => {
                    StakeTableError::Overflow { index, previous }
                }
                other => other,
            })
    }

    pub fn adjust_stakes(&mut self, times: i64) -> Result<(), StakeTableError> {
        // Check the hedge first so a rejection leaves both systems untouched.
        self.hedge.table().preview_adjust(times)?;
        self.main.adjust_stakes(times)?;
        self.hedge.adjust_stakes(times)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::stake_table::units;
    use rust_decimal_macros::dec;

    fn d(v: i64) -> Decimal {
        Decimal::from(v)
    }

    #[test]
    fn test_same_side_adds() {
        let net = net_position(d(30), Side::A, d(10), Side::A);
        assert_eq!(
            net,
            NetPosition {
                side: Some(Side::A),
                stake: d(40)
            }
        );
    }

    #[test]
    fn test_opposite_sides_subtract_towards_larger() {
        let net = net_position(d(10), Side::A, d(30), Side::B);
        assert_eq!(
            net,
            NetPosition {
                side: Some(Side::B),
                stake: d(20)
            }
        );
    }

    #[test]
    fn test_exact_cancellation_places_no_bet() {
        let net = net_position(d(25), Side::A, d(25), Side::B);
        assert_eq!(net.side, None);
        assert!(net.stake.is_zero());
        let legs = [
            Wager {
                side: Side::A,
                stake: d(25),
            },
            Wager {
                side: Side::B,
                stake: d(25),
            },
        ];
        assert_eq!(distribute_pnl(d(0), &net, &legs), vec![d(0), d(0)]);
    }

    #[test]
    fn test_distribution_credits_winner_and_debits_loser() {
        let legs = [
            Wager {
                side: Side::A,
                stake: d(30),
            },
            Wager {
                side: Side::B,
                stake: d(10),
            },
        ];
        let net = net_position(d(30), Side::A, d(10), Side::B);
        // Net 20 on A wins at 5% commission: +19.
        let shares = distribute_pnl(Decimal::new(dec!(19)), &net, &legs);
        assert_eq!(shares, vec![Decimal::new(dec!(28.5)), Decimal::new(dec!(-9.5))]);
    }

    #[test]
    fn test_distribution_same_side_is_proportional() {
        let legs = [
            Wager {
                side: Side::B,
                stake: d(30),
            },
            Wager {
                side: Side::B,
                stake: d(10),
            },
        ];
        let net = net_position(d(30), Side::B, d(10), Side::B);
        let shares = distribute_pnl(d(-40), &net, &legs);
        assert_eq!(shares, vec![d(-30), d(-10)]);
    }

    #[test]
    fn test_distribution_sums_exactly_with_repeating_fractions() {
        let legs = [
            Wager {
                side: Side::A,
                stake: d(1),
            },
            Wager {
                side: Side::A,
                stake: d(2),
            },
        ];
        let net = net_position(d(1), Side::A, d(2), Side::A);
        let shares = distribute_pnl(d(10), &net, &legs);
        assert_eq!(shares[0] + shares[1], d(10));
    }

    fn netted() -> NettedEngine {
        NettedEngine::new(
            DualSetEngine::new(units(&[1, 2, 4, 8]), units(&[1, 2]), d(10)).unwrap(),
            LadderEngine::new(units(&[1, 2, 3]), d(10), None).unwrap(),
        )
    }

    #[test]
    fn test_opening_round_cancels() {
        let engine = netted();
        let plan = engine.plan(Side::A).unwrap();
        assert!(plan.stake.is_zero());
        assert_eq!(plan.legs.len(), 2);
        assert_eq!(plan.legs[1].side, Side::B);
    }

    #[test]
    fn test_cancelled_round_still_advances_both_systems() {
        let mut engine = netted();
        let plan = engine.plan(Side::A).unwrap();
        let settlement = engine.settle(&plan, Side::B, &PayoutRule::default());
        assert!(settlement.pnl_delta.is_zero());
        // Main lost (level 0 -> 1), hedge won (stays at 0).
        assert_eq!(engine.main().first_level(), 1);
        assert_eq!(engine.hedge().level(), 0);

        let plan = engine.plan(Side::A).unwrap();
        assert_eq!(plan.side, Side::A);
        assert_eq!(plan.stake, d(10));
    }

    #[test]
    fn test_netted_bust_follows_main_system() {
        let mut engine = netted();
        let payout = PayoutRule::default();
        let mut last = Progress::Continue;
        for _ in 0..4 {
            let plan = engine.plan(Side::A).unwrap();
            last = engine.settle(&plan, Side::B, &payout).progress;
        }
        assert_eq!(last, Progress::Busted);
    }
}
