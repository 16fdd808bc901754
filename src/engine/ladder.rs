//! Win-retreat / lose-advance ladder.

use crate::domain::{Decimal, StateSnapshot};

use super::stake_table::StakeTable;
use super::{Progress, Progression, StakeTableError};

/// A single index into a stake table. A win steps down one populated slot
/// (floor 0), a loss steps up one (ceiling at the last populated slot).
/// With a win target the session completes once that many wins are booked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LadderEngine {
    table: StakeTable,
    level: usize,
    wins: u32,
    target_wins: Option<u32>,
}

impl LadderEngine {
    pub fn new(
        levels: Vec<Decimal>,
        base_unit: Decimal,
        target_wins: Option<u32>,
    ) -> Result<Self, StakeTableError> {
        Ok(Self {
            table: StakeTable::new(levels, base_unit)?,
            level: 0,
            wins: 0,
            target_wins,
        })
    }

    pub fn level(&self) -> usize {
        self.level
    }

    pub fn wins(&self) -> u32 {
        self.wins
    }

    pub fn table(&self) -> &StakeTable {
        &self.table
    }
}

impl Progression for LadderEngine {
    fn next_stake(&self) -> Option<Decimal> {
        if self.target_wins.is_some_and(|t| self.wins >= t) {
            return None;
        }
        self.table.get(self.level).filter(|s| s.is_positive())
    }

    fn record(&mut self, won: bool, _stake: Decimal, _pnl: Decimal) -> Progress {
        if won {
            self.wins += 1;
            self.level = self.table.prev_populated(self.level).unwrap_or(0);
            if self.target_wins.is_some_and(|t| self.wins >= t) {
                return Progress::Complete;
            }
        } else if let Some(next) = self.table.next_populated(self.level) {
            self.level = next;
        }
        Progress::Continue
    }

    fn snapshot(&self) -> StateSnapshot {
        StateSnapshot::Ladder {
            level: self.level,
            wins: self.wins,
            target_wins: self.target_wins,
        }
    }

    fn reset(&mut self) {
        self.level = 0;
        self.wins = 0;
    }

    fn stakes(&self) -> Vec<Decimal> {
        self.table.entries().to_vec()
    }

    fn set_base_unit(&mut self, base_unit: Decimal) -> Result<Decimal, StakeTableError> {
        self.table.set_base_unit(base_unit)
    }

    fn edit_stake(&mut self, index: usize, value: Decimal) -> Result<Decimal, StakeTableError> {
        self.table.edit(index, value)
    }

    fn adjust_stakes(&mut self, times: i64) -> Result<(), StakeTableError> {
        self.table.adjust(times)
    }
}
