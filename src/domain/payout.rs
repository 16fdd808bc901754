//! Win/loss settlement with a one-sided commission.

use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{Decimal, Outcome, Side};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayoutError {
    #[error("commission rate {0} must be in [0, 1)")]
    RateOutOfRange(Decimal),
}

/// Payout rule shared by every engine of a session.
///
/// A winning bet on `commission_side` is credited `stake × (1 − rate)`;
/// any other winning bet is credited the full stake. A losing bet costs the stake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoutRule {
    pub commission_side: Option<Side>,
    pub commission_rate: Decimal,
}

impl Default for PayoutRule {
    fn default() -> Self {
        Self {
            commission_side: Some(Side::A),
            commission_rate: Decimal::new(dec!(0.05)),
        }
    }
}

impl PayoutRule {
    pub fn new(commission_side: Option<Side>, commission_rate: Decimal) -> Self {
        Self {
            commission_side,
            commission_rate,
        }
    }

    /// A commission of 100% or more would turn a win into a loss.
    pub fn validate(&self) -> Result<(), PayoutError> {
        let rate = self.commission_rate;
        if rate.is_negative() || rate >= Decimal::one() {
            return Err(PayoutError::RateOutOfRange(rate));
        }
        Ok(())
    }

    /// Amount credited for a winning stake on `side`.
    pub fn win_amount(&self, stake: Decimal, side: Side) -> Decimal {
        if self.commission_side == Some(side) {
            stake * (Decimal::one() - self.commission_rate)
        } else {
            stake
        }
    }

    /// Signed P/L of a stake on `side` when `outcome` is observed.
    pub fn settle(&self, stake: Decimal, side: Side, outcome: Outcome) -> Decimal {
        if side == outcome {
            self.win_amount(stake, side)
        } else {
            -stake
        }
    }
}
