//! Domain primitives: Side, Outcome, Alphabet, StrategyId.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the two possible results of a round, or the direction of a bet.
///
/// `A` is Banker/Big and `B` is Player/Small in the shipped alphabets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    A,
    B,
}

/// An observed result. Same two-valued domain as [`Side`].
pub type Outcome = Side;

impl Side {
    pub fn opposite(&self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::A => write!(f, "A"),
            Side::B => write!(f, "B"),
        }
    }
}

impl FromStr for Side {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "A" | "a" => Ok(Side::A),
            "B" | "b" => Ok(Side::B),
            other => Err(format!("unknown side: {}", other)),
        }
    }
}

/// Letters used to spell outcome histories and pattern rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Alphabet {
    /// `B` = Banker (side A), `P` = Player (side B).
    #[default]
    BankerPlayer,
    /// `B` = Big (side A), `S` = Small (side B).
    BigSmall,
}

impl Alphabet {
    pub fn symbol(&self, side: Side) -> char {
        match (self, side) {
            (Alphabet::BankerPlayer, Side::A) => 'B',
            (Alphabet::BankerPlayer, Side::B) => 'P',
            (Alphabet::BigSmall, Side::A) => 'B',
            (Alphabet::BigSmall, Side::B) => 'S',
        }
    }

    pub fn side(&self, symbol: char) -> Option<Side> {
        let upper = symbol.to_ascii_uppercase();
        [Side::A, Side::B]
            .into_iter()
            .find(|side| self.symbol(*side) == upper)
    }

    /// Human label for a side ("Banker", "Small", ...).
    pub fn label(&self, side: Side) -> &'static str {
        match (self, side) {
            (Alphabet::BankerPlayer, Side::A) => "Banker",
            (Alphabet::BankerPlayer, Side::B) => "Player",
            (Alphabet::BigSmall, Side::A) => "Big",
            (Alphabet::BigSmall, Side::B) => "Small",
        }
    }

    pub fn spell(&self, outcomes: &[Outcome]) -> String {
        outcomes.iter().map(|o| self.symbol(*o)).collect()
    }
}

/// Identifier of a staking strategy in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyId {
    /// 1-2-2-1 cancellation sequence.
    OneTwoTwoOne,
    /// 1-3-2-4 four-step cycle.
    OneThreeTwoFour,
    /// Ten-step win-retreat / lose-advance ladder.
    TenStepLadder,
    /// Nine tiers of three steps; any win on tier 0 restarts.
    NineTier,
    /// Eight layers of three steps with single-layer retreat.
    EightLayer,
    /// First-set mirror ladder with a second-set win ladder.
    TwoSetMirror,
    /// Two-set mirror netted against an opposite-side ladder.
    NettedMirror,
}

impl StrategyId {
    pub const ALL: [StrategyId; 7] = [
        StrategyId::OneTwoTwoOne,
        StrategyId::OneThreeTwoFour,
        StrategyId::TenStepLadder,
        StrategyId::NineTier,
        StrategyId::EightLayer,
        StrategyId::TwoSetMirror,
        StrategyId::NettedMirror,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyId::OneTwoTwoOne => "one_two_two_one",
            StrategyId::OneThreeTwoFour => "one_three_two_four",
            StrategyId::TenStepLadder => "ten_step_ladder",
            StrategyId::NineTier => "nine_tier",
            StrategyId::EightLayer => "eight_layer",
            StrategyId::TwoSetMirror => "two_set_mirror",
            StrategyId::NettedMirror => "netted_mirror",
        }
    }
}

impl fmt::Display for StrategyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for StrategyId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StrategyId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| format!("unknown strategy: {}", s))
    }
}
