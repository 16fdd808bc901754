//! Two-set mirror engine.
//!
//! The first set is a loss ladder with a one-shot doubling: a win above level 0
//! repeats the level at double stake, a second win retreats to level 0, a loss
//! climbs. Winning on level 0 hands over to the second set, a win ladder that
//! climbs on wins and gives control back on the first loss.

use crate::domain::{ActiveSet, Decimal, StateSnapshot};

use super::stake_table::{adjust_all, edit_flat, rescale_all, StakeTable, StakeTableError};
use super::{Progress, Progression};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DualSetEngine {
    first: StakeTable,
    second: StakeTable,
    active: ActiveSet,
    first_level: usize,
    doubled: bool,
    second_level: usize,
}

impl DualSetEngine {
    pub fn new(
        first: Vec<Decimal>,
        second: Vec<Decimal>,
        base_unit: Decimal,
    ) -> Result<Self, StakeTableError> {
        Ok(Self {
            first: StakeTable::new(first, base_unit)?,
            second: StakeTable::new(second, base_unit)?,
            active: ActiveSet::First,
            first_level: 0,
            doubled: false,
            second_level: 0,
        })
    }

    pub fn active(&self) -> ActiveSet {
        self.active
    }

    pub fn first_level(&self) -> usize {
        self.first_level
    }

    pub fn second_level(&self) -> usize {
        self.second_level
    }

    pub fn is_doubled(&self) -> bool {
        self.doubled
    }

    fn record_first(&mut self, won: bool) -> Progress {
        if won {
            if self.first_level == 0 {
                self.active = ActiveSet::Second;
                self.second_level = 0;
            } else if !self.doubled {
                self.doubled = true;
            } else {
                self.doubled = false;
                self.first_level = 0;
            }
            return Progress::Continue;
        }

        if self.first_level + 1 >= self.first.len() {
            return Progress::Busted;
        }
        self.doubled = false;
        self.first_level += 1;
        Progress::Continue
    }

    fn record_second(&mut self, won: bool) -> Progress {
        if won {
            self.second_level = (self.second_level + 1).min(self.second.len().saturating_sub(1));
            return Progress::Continue;
        }

        // Losing the opening bet of the second set skips level 0 of the first.
        self.first_level = if self.second_level == 0 { 1 } else { 0 };
        self.second_level = 0;
        self.doubled = false;
        self.active = ActiveSet::First;
        Progress::Continue
    }
}

impl Progression for DualSetEngine {
    fn next_stake(&self) -> Option<Decimal> {
        match self.active {
            ActiveSet::First => {
                let stake = self.first.get(self.first_level)?;
                if self.doubled && self.first_level > 0 {
                    Some(stake * Decimal::two())
                } else {
                    Some(stake)
                }
            }
            ActiveSet::Second => self.second.get(self.second_level),
        }
    }

    fn record(&mut self, won: bool, _stake: Decimal, _pnl: Decimal) -> Progress {
        match self.active {
            ActiveSet::First => self.record_first(won),
            ActiveSet::Second => self.record_second(won),
        }
    }

    fn snapshot(&self) -> StateSnapshot {
        StateSnapshot::DualSet {
            active: self.active,
            first_level: self.first_level,
            doubled: self.doubled,
            second_level: self.second_level,
        }
    }

    fn reset(&mut self) {
        self.active = ActiveSet::First;
        self.first_level = 0;
        self.doubled = false;
        self.second_level = 0;
    }

    /// First set followed by second set.
    fn stakes(&self) -> Vec<Decimal> {
        self.first
            .entries()
            .iter()
            .chain(self.second.entries())
            .copied()
            .collect()
    }

    fn set_base_unit(&mut self, base_unit: Decimal) -> Result<Decimal, StakeTableError> {
        rescale_all(&mut [&mut self.first, &mut self.second], base_unit)
    }

    fn edit_stake(&mut self, index: usize, value: Decimal) -> Result<Decimal, StakeTableError> {
        edit_flat(&mut [&mut self.first, &mut self.second], index, value)
    }

    fn adjust_stakes(&mut self, times: i64) -> Result<(), StakeTableError> {
        adjust_all(&mut [&mut self.first, &mut self.second], times)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::stake_table::units;

    fn d(v: i64) -> Decimal {
        Decimal::from(v)
    }

    fn engine() -> DualSetEngine {
        DualSetEngine::new(units(&[1, 2, 4, 8]), units(&[1, 2, 4]), d(10)).unwrap()
    }

    fn play(e: &mut DualSetEngine, won: bool) -> (Decimal, Progress) {
        let stake = e.next_stake().unwrap();
        let pnl = if won { stake } else { -stake };
        (stake, e.record(won, stake, pnl))
    }

    #[test]
    fn test_win_above_level_zero_doubles_then_retreats() {
        let mut e = engine();
        play(&mut e, false);
        play(&mut e, false);
        assert_eq!(e.first_level(), 2);

        let (stake, _) = play(&mut e, true);
        assert_eq!(stake, d(40));
        assert!(e.is_doubled());
        assert_eq!(e.next_stake(), Some(d(80)));

        play(&mut e, true);
        assert!(!e.is_doubled());
        assert_eq!(e.first_level(), 0);
        assert_eq!(e.active(), ActiveSet::First);
    }

    #[test]
    fn test_doubled_loss_clears_flag_and_climbs() {
        let mut e = engine();
        play(&mut e, false);
        play(&mut e, true);
        assert!(e.is_doubled());
        let (stake, _) = play(&mut e, false);
        assert_eq!(stake, d(40));
        assert!(!e.is_doubled());
        assert_eq!(e.first_level(), 2);
    }

    #[test]
    fn test_level_zero_win_hands_over_to_second_set() {
        let mut e = engine();
        play(&mut e, true);
        assert_eq!(e.active(), ActiveSet::Second);
        play(&mut e, true);
        play(&mut e, true);
        play(&mut e, true);
        // Capped at the top of the second set.
        assert_eq!(e.second_level(), 2);
        assert_eq!(e.next_stake(), Some(d(40)));
    }

    #[test]
    fn test_second_set_opening_loss_returns_to_first_level_one() {
        let mut e = engine();
        play(&mut e, true);
        play(&mut e, false);
        assert_eq!(e.active(), ActiveSet::First);
        assert_eq!(e.first_level(), 1);
        assert_eq!(e.second_level(), 0);
    }

    #[test]
    fn test_second_set_later_loss_returns_to_first_level_zero() {
        let mut e = engine();
        play(&mut e, true);
        play(&mut e, true);
        play(&mut e, false);
        assert_eq!(e.active(), ActiveSet::First);
        assert_eq!(e.first_level(), 0);
    }

    #[test]
    fn test_loss_on_last_first_level_busts() {
        let mut e = engine();
        for _ in 0..3 {
            assert_eq!(play(&mut e, false).1, Progress::Continue);
        }
        assert_eq!(e.first_level(), 3);
        assert_eq!(play(&mut e, false).1, Progress::Busted);
    }

    #[test]
    fn test_doubled_loss_on_last_level_busts() {
        let mut e = engine();
        for _ in 0..3 {
            play(&mut e, false);
        }
        play(&mut e, true);
        assert!(e.is_doubled());
        assert_eq!(e.next_stake(), Some(d(160)));
        assert_eq!(play(&mut e, false).1, Progress::Busted);
    }

    #[test]
    fn test_edit_addresses_both_sets() {
        let mut e = engine();
        assert_eq!(e.edit_stake(5, d(25)), Ok(d(20)));
        assert_eq!(e.stakes()[5], d(25));
    }
}
