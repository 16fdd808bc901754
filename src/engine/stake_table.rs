//! Editable stake tables.
//!
//! A table starts as a strategy's raw unit values scaled by the base unit.
//! Individual edits overwrite both the live entry and the reference value used
//! by bulk `+N × base` adjustments. Rescaling the base unit starts over from
//! the strategy defaults.

use serde::Serialize;
use thiserror::Error;

use crate::domain::Decimal;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StakeTableError {
    #[error("stake {rejected} at index {index} must be positive (keeping {previous})")]
    NonPositive {
        index: usize,
        rejected: Decimal,
        previous: Decimal,
    },
    #[error("base unit {rejected} must be positive (keeping {previous})")]
    NonPositiveBaseUnit { rejected: Decimal, previous: Decimal },
    #[error("stake index {index} out of range (table has {len} entries)")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("stake at index {index} would exceed the limit of {} (keeping {previous})", MAX_STAKE)]
    Overflow { index: usize, previous: Decimal },
    #[error("base unit {rejected} scales stakes past the limit of {} (keeping {previous})", MAX_STAKE)]
    BaseUnitTooLarge { rejected: Decimal, previous: Decimal },
    #[error("this strategy has no editable stake table")]
    NotEditable,
}

/// Largest value any stake-table entry may hold.
pub const MAX_STAKE: i64 = 1_000_000_000_000_000;

pub(crate) fn within_limit(value: Decimal) -> bool {
    value <= Decimal::from(MAX_STAKE)
}

/// Positive and no larger than [`MAX_STAKE`].
pub(crate) fn check_base_unit(base_unit: Decimal, previous: Decimal) -> Result<(), StakeTableError> {
    if !base_unit.is_positive() {
        return Err(StakeTableError::NonPositiveBaseUnit {
            rejected: base_unit,
            previous,
        });
    }
    if !within_limit(base_unit) {
        return Err(StakeTableError::BaseUnitTooLarge {
            rejected: base_unit,
            previous,
        });
    }
    Ok(())
}

/// `defaults × base_unit`, or None if any entry overflows or passes the limit.
fn scale(defaults: &[Decimal], base_unit: Decimal) -> Option<Vec<Decimal>> {
    defaults
        .iter()
        .map(|v| v.checked_mul(base_unit).filter(|s| within_limit(*s)))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StakeTable {
    defaults: Vec<Decimal>,
    base: Vec<Decimal>,
    entries: Vec<Decimal>,
    base_unit: Decimal,
}

impl StakeTable {
    /// Build a table from raw unit values. Zero entries mark unused slots.
    pub fn new(defaults: Vec<Decimal>, base_unit: Decimal) -> Result<Self, StakeTableError> {
        if !base_unit.is_positive() {
            return Err(StakeTableError::NonPositiveBaseUnit {
                rejected: base_unit,
                previous: Decimal::zero(),
            });
        }
        let entries = scale(&defaults, base_unit).ok_or(StakeTableError::BaseUnitTooLarge {
            rejected: base_unit,
            previous: Decimal::zero(),
        })?;
        Ok(Self {
            defaults,
            base: entries.clone(),
            entries,
            base_unit,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Decimal> {
        self.entries.get(index).copied()
    }

    pub fn entries(&self) -> &[Decimal] {
        &self.entries
    }

    pub fn base_unit(&self) -> Decimal {
        self.base_unit
    }

    pub fn is_populated(&self, index: usize) -> bool {
        self.get(index).is_some_and(|v| v.is_positive())
    }

    /// Highest index holding a usable stake (0 for an all-empty table).
    pub fn last_populated(&self) -> usize {
        self.entries
            .iter()
            .rposition(|v| v.is_positive())
            .unwrap_or(0)
    }

    /// Next populated slot above `index`, if any.
    pub fn next_populated(&self, index: usize) -> Option<usize> {
        (index + 1..self.entries.len()).find(|i| self.is_populated(*i))
    }

    /// Nearest populated slot below `index`, if any.
    pub fn prev_populated(&self, index: usize) -> Option<usize> {
        (0..index).rev().find(|i| self.is_populated(*i))
    }

    /// Replace one entry. Returns the value it replaced.
    pub fn edit(&mut self, index: usize, value: Decimal) -> Result<Decimal, StakeTableError> {
        let previous = self.get(index).ok_or(StakeTableError::IndexOutOfRange {
            index,
            len: self.len(),
        })?;
        if !value.is_positive() {
            return Err(StakeTableError::NonPositive {
                index,
                rejected: value,
                previous,
            });
        }
        if !within_limit(value) {
            return Err(StakeTableError::Overflow { index, previous });
        }
        self.entries[index] = value;
        self.base[index] = value;
        Ok(previous)
    }

    /// Entries after adding `times × base` to each populated slot, without applying them.
    pub fn preview_adjust(&self, times: i64) -> Result<Vec<Decimal>, StakeTableError> {
        let factor = Decimal::from(times);
        self.entries
            .iter()
            .zip(&self.base)
            .enumerate()
            .map(|(index, (entry, base))| {
                if !entry.is_positive() {
                    return Ok(*entry);
                }
                let adjusted = base
                    .checked_mul(factor)
                    .and_then(|delta| entry.checked_add(delta))
                    .ok_or(StakeTableError::Overflow {
                        index,
                        previous: *entry,
                    })?;
                if !within_limit(adjusted) {
                    return Err(StakeTableError::Overflow {
                        index,
                        previous: *entry,
                    });
                }
                if adjusted.is_positive() {
                    Ok(adjusted)
                } else {
                    Err(StakeTableError::NonPositive {
                        index,
                        rejected: adjusted,
                        previous: *entry,
                    })
                }
            })
            .collect()
    }

    pub(crate) fn commit_entries(&mut self, entries: Vec<Decimal>) {
        debug_assert_eq!(entries.len(), self.entries.len());
        self.entries = entries;
    }

    pub fn adjust(&mut self, times: i64) -> Result<(), StakeTableError> {
        let entries = self.preview_adjust(times)?;
        self.commit_entries(entries);
        Ok(())
    }

    /// Rescale from the strategy defaults. Returns the previous base unit.
    pub fn set_base_unit(&mut self, base_unit: Decimal) -> Result<Decimal, StakeTableError> {
        let previous = self.base_unit;
        if !base_unit.is_positive() {
            return Err(StakeTableError::NonPositiveBaseUnit {
                rejected: base_unit,
                previous,
            });
        }
        self.entries = scale(&self.defaults, base_unit)
            .ok_or(StakeTableError::BaseUnitTooLarge {
                rejected: base_unit,
                previous,
            })?;
        self.base = self.entries.clone();
        self.base_unit = base_unit;
        Ok(previous)
    }
}

/// Edit across several tables addressed as one flat index space.
pub(crate) fn edit_flat(
    tables: &mut [&mut StakeTable],
    index: usize,
    value: Decimal,
) -> Result<Decimal, StakeTableError> {
    let total: usize = tables.iter().map(|t| t.len()).sum();
    let mut offset = index;
    for table in tables.iter_mut() {
        if offset < table.len() {
            return table.edit(offset, value).map_err(|e| match e {
                StakeTableError::NonPositive {
                    rejected, previous, ..
                } => StakeTableError::NonPositive {
                    index,
                    rejected,
                    previous,
                },
                StakeTableError::Overflow { previous, .. } => {
                    StakeTableError::Overflow { index, previous }
                }
                other => other,
            });
        }
        offset -= table.len();
    }
    Err(StakeTableError::IndexOutOfRange { index, len: total })
}

/// Adjust several tables atomically: nothing changes unless every table accepts.
pub(crate) fn adjust_all(tables: &mut [&mut StakeTable], times: i64) -> Result<(), StakeTableError> {
    let mut previews = Vec::with_capacity(tables.len());
    for table in tables.iter() {
        previews.push(table.preview_adjust(times)?);
    }
    for (table, entries) in tables.iter_mut().zip(previews) {
        table.commit_entries(entries);
    }
    Ok(())
}

/// Rescale several tables atomically.
pub(crate) fn rescale_all(
    tables: &mut [&mut StakeTable],
    base_unit: Decimal,
) -> Result<Decimal, StakeTableError> {
    let previous = tables
        .first()
        .map(|t| t.base_unit())
        .unwrap_or_else(Decimal::zero);
    if !base_unit.is_positive() {
        return Err(StakeTableError::NonPositiveBaseUnit {
            rejected: base_unit,
            previous,
        });
    }
    if tables.iter().any(|t| scale(&t.defaults, base_unit).is_none()) {
        return Err(StakeTableError::BaseUnitTooLarge {
            rejected: base_unit,
            previous,
        });
    }
    for table in tables.iter_mut() {
        table.set_base_unit(base_unit)?;
    }
    Ok(previous)
}

pub(crate) fn units(values: &[i64]) -> Vec<Decimal> {
    values.iter().map(|v| Decimal::from(*v)).collect()
}
