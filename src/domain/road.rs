//! Outcome history and its "big road" layout.
//!
//! The history belongs to the table, not to an engine: resetting an engine
//! leaves it untouched.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::{Alphabet, Outcome};

pub const ROAD_ROWS: usize = 6;

/// A cell of the big road grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoadCell {
    pub column: usize,
    pub row: usize,
    pub outcome: Outcome,
}

/// Every observed outcome in order, plus its big road placement.
///
/// Streaks run down a column; a streak longer than the column (or blocked by
/// an earlier tail) turns right along its last free row.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct OutcomeHistory {
    outcomes: Vec<Outcome>,
    cells: Vec<RoadCell>,
    #[serde(skip)]
    occupied: HashSet<(usize, usize)>,
    #[serde(skip)]
    streak_column: usize,
}

impl OutcomeHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, outcome: Outcome) {
        let cell = match self.cells.last() {
            None => RoadCell {
                column: 0,
                row: 0,
                outcome,
            },
            Some(last) if last.outcome == outcome => {
                let below = (last.column, last.row + 1);
                if last.row + 1 < ROAD_ROWS && !self.occupied.contains(&below) {
                    RoadCell {
                        column: last.column,
                        row: last.row + 1,
                        outcome,
                    }
                } else {
                    RoadCell {
                        column: last.column + 1,
                        row: last.row,
                        outcome,
                    }
                }
            }
            Some(_) => {
                self.streak_column += 1;
                RoadCell {
                    column: self.streak_column,
                    row: 0,
                    outcome,
                }
            }
        };
        self.occupied.insert((cell.column, cell.row));
        self.cells.push(cell);
        self.outcomes.push(outcome);
    }

    pub fn outcomes(&self) -> &[Outcome] {
        &self.outcomes
    }

    pub fn cells(&self) -> &[RoadCell] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn spell(&self, alphabet: Alphabet) -> String {
        alphabet.spell(&self.outcomes)
    }

    /// Length of the streak the latest outcome belongs to.
    pub fn current_streak(&self) -> usize {
        match self.outcomes.last() {
            None => 0,
            Some(last) => self
                .outcomes
                .iter()
                .rev()
                .take_while(|o| *o == last)
                .count(),
        }
    }
}
