//! Multi-tier level/step engine (nine-tier and eight-layer families).
//!
//! Each level holds a short run of steps (two or three stakes). Losses walk
//! down the steps of a level; at the final step the engine either repeats the
//! level or, once the level's loss threshold is reached, moves up a level.
//! Needing a level beyond the last one is a bust.

use serde::{Deserialize, Serialize};

use crate::domain::{Decimal, StateSnapshot};

use super::stake_table::{StakeTable, StakeTableError};
use super::{Progress, Progression};

/// What a win past the first step of a level does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaterWin {
    /// Back to level 0, step 0.
    FullReset,
    /// Down one level (floor 0), step 0.
    RetreatLevel,
}

/// When a level counts as exhausted at its final step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelExit {
    /// Gross losses in the level reach the sum of its stakes.
    GrossLoss,
    /// Net P/L in the level falls to minus the sum of its stakes.
    NetLoss,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierRules {
    /// Any win while on level 0 restarts the whole engine.
    pub level_zero_resets: bool,
    pub later_win: LaterWin,
    pub level_exit: LevelExit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TieredEngine {
    table: StakeTable,
    steps_per_level: Vec<usize>,
    rules: TierRules,
    level: usize,
    step: usize,
    level_loss: Decimal,
    level_pnl: Decimal,
}

impl TieredEngine {
    pub fn new(
        levels: Vec<Vec<Decimal>>,
        base_unit: Decimal,
        rules: TierRules,
    ) -> Result<Self, StakeTableError> {
        let steps_per_level = levels.iter().map(|l| l.len()).collect();
        let flat = levels.into_iter().flatten().collect();
        Ok(Self {
            table: StakeTable::new(flat, base_unit)?,
            steps_per_level,
            rules,
            level: 0,
            step: 0,
            level_loss: Decimal::zero(),
            level_pnl: Decimal::zero(),
        })
    }

    pub fn level(&self) -> usize {
        self.level
    }

    pub fn step(&self) -> usize {
        self.step
    }

    pub fn level_loss(&self) -> Decimal {
        self.level_loss
    }

    pub fn level_pnl(&self) -> Decimal {
        self.level_pnl
    }

    pub fn level_count(&self) -> usize {
        self.steps_per_level.len()
    }

    fn offset(&self, level: usize) -> usize {
        self.steps_per_level[..level].iter().sum()
    }

    fn steps(&self, level: usize) -> usize {
        self.steps_per_level.get(level).copied().unwrap_or(0)
    }

    /// Sum of the stakes of `level`.
    pub fn level_total(&self, level: usize) -> Decimal {
        let start = self.offset(level);
        self.table.entries()[start..start + self.steps(level)]
            .iter()
            .fold(Decimal::zero(), |acc, v| acc.saturating_add(*v))
    }

    fn level_exhausted(&self) -> bool {
        let total = self.level_total(self.level);
        match self.rules.level_exit {
            LevelExit::GrossLoss => self.level_loss >= total,
            LevelExit::NetLoss => -self.level_pnl >= total,
        }
    }

    fn enter_level(&mut self, level: usize) {
        self.level = level;
        self.step = 0;
        self.level_loss = Decimal::zero();
        self.level_pnl = Decimal::zero();
    }
}

impl Progression for TieredEngine {
    fn next_stake(&self) -> Option<Decimal> {
        if self.level >= self.level_count() {
            return None;
        }
        self.table.get(self.offset(self.level) + self.step)
    }

    fn record(&mut self, won: bool, stake: Decimal, pnl: Decimal) -> Progress {
        self.level_pnl = self.level_pnl.saturating_add(pnl);

        if won {
            if self.level == 0 && self.rules.level_zero_resets {
                self.enter_level(0);
            } else if self.step == 0 && self.steps(self.level) > 1 {
                self.step = 1;
            } else {
                match self.rules.later_win {
                    LaterWin::FullReset => self.enter_level(0),
                    LaterWin::RetreatLevel => self.enter_level(self.level.saturating_sub(1)),
                }
            }
            return Progress::Continue;
        }

        self.level_loss = self.level_loss.saturating_add(stake);
        if self.step + 1 < self.steps(self.level) {
            self.step += 1;
            return Progress::Continue;
        }

        if !self.level_exhausted() {
            self.step = 0;
            return Progress::Continue;
        }

        if self.level + 1 >= self.level_count() {
            return Progress::Busted;
        }
        self.enter_level(self.level + 1);
        Progress::Continue
    }

    fn snapshot(&self) -> StateSnapshot {
        StateSnapshot::Tiered {
            level: self.level,
            step: self.step,
            level_loss: self.level_loss,
            level_pnl: self.level_pnl,
        }
    }

    fn reset(&mut self) {
        self.enter_level(0);
    }

    fn stakes(&self) -> Vec<Decimal> {
        self.table.entries().to_vec()
    }

    fn set_base_unit(&mut self, base_unit: Decimal) -> Result<Decimal, StakeTableError> {
        self.table.set_base_unit(base_unit)
    }

    /// `index` addresses the levels flattened in order (level 0 steps first).
    fn edit_stake(&mut self, index: usize, value: Decimal) -> Result<Decimal, StakeTableError> {
        self.table.edit(index, value)
    }

    fn adjust_stakes(&mut self, times: i64) -> Result<(), StakeTableError> {
        self.table.adjust(times)
    }
}
