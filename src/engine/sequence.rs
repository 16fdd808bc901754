//! Cancellation sequence (1-2-2-1 family).
//!
//! The stake is the first plus last element of the sequence. A win crosses both
//! off; a loss appends the units just lost. The session completes when the
//! sequence is empty. There is no bust state.

use crate::domain::{Decimal, StateSnapshot};

use super::stake_table::check_base_unit;
use super::{Progress, Progression, StakeTableError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceEngine {
    initial: Vec<Decimal>,
    sequence: Vec<Decimal>,
    base_unit: Decimal,
}

impl SequenceEngine {
    pub fn new(initial: Vec<Decimal>, base_unit: Decimal) -> Result<Self, StakeTableError> {
        check_base_unit(base_unit, Decimal::zero())?;
        if let Some((index, value)) = initial.iter().enumerate().find(|(_, v)| !v.is_positive()) {
            return Err(StakeTableError::NonPositive {
                index,
                rejected: *value,
                previous: Decimal::zero(),
            });
        }
        Ok(Self {
            sequence: initial.clone(),
            initial,
            base_unit,
        })
    }

    pub fn sequence(&self) -> &[Decimal] {
        &self.sequence
    }

    pub fn is_complete(&self) -> bool {
        self.sequence.is_empty()
    }

    /// Units at stake: first + last, or the single remaining element.
    fn current_units(&self) -> Option<Decimal> {
        match self.sequence.as_slice() {
            [] => None,
            [only] => Some(*only),
            [first, .., last] => Some(*first + *last),
        }
    }
}

impl Progression for SequenceEngine {
    fn next_stake(&self) -> Option<Decimal> {
        self.current_units().map(|u| u.saturating_mul(self.base_unit))
    }

    fn record(&mut self, won: bool, _stake: Decimal, _pnl: Decimal) -> Progress {
        let Some(units) = self.current_units() else {
            return Progress::Complete;
        };

        if won {
            if self.sequence.len() <= 1 {
                self.sequence.clear();
            } else {
                self.sequence.pop();
                self.sequence.remove(0);
            }
        } else {
            self.sequence.push(units);
        }

        if self.sequence.is_empty() {
            Progress::Complete
        } else {
            Progress::Continue
        }
    }

    fn snapshot(&self) -> StateSnapshot {
        StateSnapshot::Sequence {
            sequence: self.sequence.clone(),
        }
    }

    fn reset(&mut self) {
        self.sequence = self.initial.clone();
    }

    fn stakes(&self) -> Vec<Decimal> {
        self.initial.iter().map(|v| *v * self.base_unit).collect()
    }

    fn set_base_unit(&mut self, base_unit: Decimal) -> Result<Decimal, StakeTableError> {
        let previous = self.base_unit;
        check_base_unit(base_unit, previous)?;
        self.base_unit = base_unit;
        Ok(previous)
    }
}
