//! Domain types shared by every progression engine.
//!
//! This module provides:
//! - Lossless numeric handling via the Decimal wrapper
//! - Sides, outcomes and the symbol alphabets used to spell histories
//! - The commission payout rule
//! - The ledger of resolved rounds and engine state snapshots
//! - Outcome history with its big road layout

pub mod decimal;
pub mod ledger;
pub mod payout;
pub mod primitives;
pub mod road;
pub mod snapshot;

pub use decimal::Decimal;
pub use ledger::{Ledger, RoundRecord};
pub use payout::{PayoutError, PayoutRule};
pub use primitives::{Alphabet, Outcome, Side, StrategyId};
pub use road::{OutcomeHistory, RoadCell, ROAD_ROWS};
pub use snapshot::{ActiveSet, StateSnapshot};
