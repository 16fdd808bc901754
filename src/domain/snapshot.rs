//! Serializable views of an engine's position in its progression.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::Decimal;

/// Which of the two sets a dual-set engine is currently staking from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ActiveSet {
    #[default]
    First,
    Second,
}

/// Position of an engine after a round. Recorded with every ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StateSnapshot {
    Sequence {
        sequence: Vec<Decimal>,
    },
    Cycle {
        step: usize,
    },
    #[serde(rename_all = "camelCase")]
    Ladder {
        level: usize,
        wins: u32,
        target_wins: Option<u32>,
    },
    #[serde(rename_all = "camelCase")]
    Tiered {
        level: usize,
        step: usize,
        level_loss: Decimal,
        level_pnl: Decimal,
    },
    #[serde(rename_all = "camelCase")]
    DualSet {
        active: ActiveSet,
        first_level: usize,
        doubled: bool,
        second_level: usize,
    },
    Netted {
        main: Box<StateSnapshot>,
        hedge: Box<StateSnapshot>,
    },
}

impl fmt::Display for StateSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateSnapshot::Sequence { sequence } => {
                let parts: Vec<String> = sequence.iter().map(|v| v.to_string()).collect();
                write!(f, "seq[{}]", parts.join(" "))
            }
            StateSnapshot::Cycle { step } => write!(f, "step {}", step),
            StateSnapshot::Ladder {
                level,
                wins,
                target_wins: Some(target),
            } => write!(f, "level {} wins {}/{}", level, wins, target),
            StateSnapshot::Ladder { level, wins, .. } => write!(f, "level {} wins {}", level, wins),
            StateSnapshot::Tiered {
                level,
                step,
                level_loss,
                level_pnl,
            } => write!(
                f,
                "level {} step {} loss {} pnl {}",
                level, step, level_loss, level_pnl
            ),
            StateSnapshot::DualSet {
                active,
                first_level,
                doubled,
                second_level,
            } => match active {
                ActiveSet::First if *doubled => write!(f, "first {} x2", first_level),
                ActiveSet::First => write!(f, "first {}", first_level),
                ActiveSet::Second => write!(f, "second {}", second_level),
            },
            StateSnapshot::Netted { main, hedge } => write!(f, "{} | {}", main, hedge),
        }
    }
}
