//! Progression engines: pure, synchronous state machines over win/loss.

use serde::Serialize;

use crate::domain::{Decimal, Outcome, PayoutRule, Side, StateSnapshot};

pub mod cycle;
pub mod dual_set;
pub mod ladder;
pub mod netting;
pub mod sequence;
pub mod stake_table;
pub mod tiered;

pub use cycle::CycleEngine;
pub use dual_set::DualSetEngine;
pub use ladder::LadderEngine;
pub use netting::{distribute_pnl, net_position, NetPosition, NettedEngine};
pub use sequence::SequenceEngine;
pub use stake_table::{StakeTable, StakeTableError, MAX_STAKE};
pub use tiered::{LaterWin, LevelExit, TierRules, TieredEngine};

/// Where a progression stands after a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Progress {
    #[default]
    Continue,
    /// Session ended successfully (empty sequence, win target reached).
    Complete,
    /// Maximum escalation exceeded. Terminal until reset.
    Busted,
}

/// A single stake on one side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Wager {
    pub side: Side,
    pub stake: Decimal,
}

/// What to bet next. `legs` lists the component wagers when a netted
/// engine combines several systems into `side`/`stake`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    pub side: Side,
    pub stake: Decimal,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub legs: Vec<Wager>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settlement {
    pub pnl_delta: Decimal,
    pub progress: Progress,
}

/// Shared contract of a single staking system.
pub trait Progression {
    /// Stake prescribed by the current position, or None when there is nothing to bet.
    fn next_stake(&self) -> Option<Decimal>;

    /// Advance after a resolved round. `pnl` is the amount this system was credited.
    fn record(&mut self, won: bool, stake: Decimal, pnl: Decimal) -> Progress;

    fn snapshot(&self) -> StateSnapshot;

    /// Return to the initial position. Stake tables are kept.
    fn reset(&mut self);

    /// Current stake table, flattened.
    fn stakes(&self) -> Vec<Decimal>;

    /// Returns the previous base unit.
    fn set_base_unit(&mut self, base_unit: Decimal) -> Result<Decimal, StakeTableError>;

    /// Returns the replaced value.
    fn edit_stake(&mut self, _index: usize, _value: Decimal) -> Result<Decimal, StakeTableError> {
        Err(StakeTableError::NotEditable)
    }

    fn adjust_stakes(&mut self, _times: i64) -> Result<(), StakeTableError> {
        Err(StakeTableError::NotEditable)
    }
}

/// Every strategy variant behind one type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Engine {
    Sequence(SequenceEngine),
    Cycle(CycleEngine),
    Ladder(LadderEngine),
    Tiered(TieredEngine),
    DualSet(DualSetEngine),
    Netted(NettedEngine),
}

macro_rules! each_variant {
    ($engine:expr, $e:ident => $body:expr) => {
        match $engine {
            Engine::Sequence($e) => $body,
            Engine::Cycle($e) => $body,
            Engine::Ladder($e) => $body,
            Engine::Tiered($e) => $body,
            Engine::DualSet($e) => $body,
            Engine::Netted($e) => $body,
        }
    };
}

macro_rules! single_system {
    ($engine:expr, $e:ident => $body:expr, $netted:ident => $netted_body:expr) => {
        match $engine {
            Engine::Sequence($e) => $body,
            Engine::Cycle($e) => $body,
            Engine::Ladder($e) => $body,
            Engine::Tiered($e) => $body,
            Engine::DualSet($e) => $body,
            Engine::Netted($netted) => $netted_body,
        }
    };
}

impl Engine {
    /// Recommendation for a round where the oracle picked `side`.
    pub fn plan(&self, side: Side) -> Option<Recommendation> {
        single_system!(self,
            e => e.next_stake().map(|stake| Recommendation {
                side,
                stake,
                legs: Vec::new(),
            }),
            n => n.plan(side)
        )
    }

    /// Apply `outcome` to a recommendation previously produced by [`Engine::plan`].
    pub fn settle(
        &mut self,
        plan: &Recommendation,
        outcome: Outcome,
        payout: &PayoutRule,
    ) -> Settlement {
        single_system!(self,
            e => {
                let pnl_delta = payout.settle(plan.stake, plan.side, outcome);
                let progress = e.record(plan.side == outcome, plan.stake, pnl_delta);
                Settlement { pnl_delta, progress }
            },
            n => n.settle(plan, outcome, payout)
        )
    }

    pub fn snapshot(&self) -> StateSnapshot {
        each_variant!(self, e => e.snapshot())
    }

    pub fn reset(&mut self) {
        each_variant!(self, e => e.reset())
    }

    pub fn stakes(&self) -> Vec<Decimal> {
        each_variant!(self, e => e.stakes())
    }

    pub fn set_base_unit(&mut self, base_unit: Decimal) -> Result<Decimal, StakeTableError> {
        each_variant!(self, e => e.set_base_unit(base_unit))
    }

    pub fn edit_stake(&mut self, index: usize, value: Decimal) -> Result<Decimal, StakeTableError> {
        each_variant!(self, e => e.edit_stake(index, value))
    }

    pub fn adjust_stakes(&mut self, times: i64) -> Result<(), StakeTableError> {
        each_variant!(self, e => e.adjust_stakes(times))
    }
}
