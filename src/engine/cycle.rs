//! Fixed four-step cycle (1-3-2-4).

use crate::domain::{Decimal, StateSnapshot};

use super::{Progress, Progression, StakeTable, StakeTableError};

/// Wins climb the cycle, the last step always returns to the start, any loss
/// returns to the start. No bust condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleEngine {
    table: StakeTable,
    step: usize,
}

impl CycleEngine {
    pub fn new(values: Vec<Decimal>, base_unit: Decimal) -> Result<Self, StakeTableError> {
        Ok(Self {
            table: StakeTable::new(values, base_unit)?,
            step: 0,
        })
    }

    pub fn step(&self) -> usize {
        self.step
    }
}

impl Progression for CycleEngine {
    fn next_stake(&self) -> Option<Decimal> {
        self.table.get(self.step)
    }

    fn record(&mut self, won: bool, _stake: Decimal, _pnl: Decimal) -> Progress {
        let last = self.table.len().saturating_sub(1);
        self.step = if won && self.step < last {
            self.step + 1
        } else {
            0
        };
        Progress::Continue
    }

    fn snapshot(&self) -> StateSnapshot {
        StateSnapshot::Cycle { step: self.step }
    }

    fn reset(&mut self) {
        self.step = 0;
    }

    fn stakes(&self) -> Vec<Decimal> {
        self.table.entries().to_vec()
    }

    fn set_base_unit(&mut self, base_unit: Decimal) -> Result<Decimal, StakeTableError> {
        self.table.set_base_unit(base_unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::stake_table::units;

    fn d(v: i64) -> Decimal {
        Decimal::from(v)
    }

    #[test]
    fn test_four_wins_walk_the_cycle_and_wrap() {
        let mut engine = CycleEngine::new(units(&[1, 3, 2, 4]), d(10)).unwrap();
        let mut stakes = Vec::new();
        for _ in 0..5 {
            let stake = engine.next_stake().unwrap();
            stakes.push(stake);
            engine.record(true, stake, stake);
        }
        assert_eq!(stakes, vec![d(10), d(30), d(20), d(40), d(10)]);
    }

    #[test]
    fn test_loss_resets_to_first_step() {
        let mut engine = CycleEngine::new(units(&[1, 3, 2, 4]), d(1)).unwrap();
        engine.record(true, d(1), d(1));
        engine.record(true, d(3), d(3));
        assert_eq!(engine.step(), 2);
        engine.record(false, d(2), d(-2));
        assert_eq!(engine.step(), 0);
    }
}
