//! Strategy catalog: initial state, stake tables and oracle odds per strategy.
//!
//! Constants are kept per strategy; the oracle probabilities deliberately
//! differ between strategies.

use serde::Serialize;

use crate::domain::{Alphabet, Decimal, StrategyId};
use crate::engine::stake_table::units;
use crate::engine::{
    CycleEngine, DualSetEngine, Engine, LadderEngine, LaterWin, LevelExit, NettedEngine,
    SequenceEngine, StakeTableError, TierRules, TieredEngine,
};

/// Shape and raw unit values of a strategy's progression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "engine", rename_all = "snake_case")]
pub enum EngineSpec {
    Sequence {
        initial: Vec<Decimal>,
    },
    Cycle {
        values: Vec<Decimal>,
    },
    #[serde(rename_all = "camelCase")]
    Ladder {
        levels: Vec<Decimal>,
        target_wins: Option<u32>,
    },
    Tiered {
        levels: Vec<Vec<Decimal>>,
        rules: TierRules,
    },
    DualSet {
        first: Vec<Decimal>,
        second: Vec<Decimal>,
    },
    Netted {
        first: Vec<Decimal>,
        second: Vec<Decimal>,
        hedge: Vec<Decimal>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyConfig {
    pub id: StrategyId,
    pub name: &'static str,
    pub alphabet: Alphabet,
    /// Probability that the random oracle picks side A.
    pub oracle_probability: f64,
    pub spec: EngineSpec,
}

impl StrategyConfig {
    pub fn for_id(id: StrategyId) -> Self {
        match id {
            StrategyId::OneTwoTwoOne => Self {
                id,
                name: "1-2-2-1",
                alphabet: Alphabet::BigSmall,
                oracle_probability: 0.508,
                spec: EngineSpec::Sequence {
                    initial: units(&[1, 2, 2, 1]),
                },
            },
            StrategyId::OneThreeTwoFour => Self {
                id,
                name: "1-3-2-4",
                alphabet: Alphabet::BigSmall,
                oracle_probability: 0.508,
                spec: EngineSpec::Cycle {
                    values: units(&[1, 3, 2, 4]),
                },
            },
            StrategyId::TenStepLadder => Self {
                id,
                name: "Ten-step ladder",
                alphabet: Alphabet::BankerPlayer,
                oracle_probability: 0.5066,
                spec: EngineSpec::Ladder {
                    levels: units(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10]),
                    target_wins: Some(10),
                },
            },
            StrategyId::NineTier => Self {
                id,
                name: "Nine-tier",
                alphabet: Alphabet::BankerPlayer,
                oracle_probability: 0.5066,
                spec: EngineSpec::Tiered {
                    levels: vec![
                        units(&[1, 2, 4]),
                        units(&[2, 4, 8]),
                        units(&[4, 8, 16]),
                        units(&[8, 16, 32]),
                        units(&[16, 32, 64]),
                        units(&[32, 64, 128]),
                        units(&[64, 128, 256]),
                        units(&[128, 256, 512]),
                        units(&[256, 512, 1024]),
                    ],
                    rules: TierRules {
                        level_zero_resets: true,
                        later_win: LaterWin::FullReset,
                        level_exit: LevelExit::GrossLoss,
                    },
                },
            },
            StrategyId::EightLayer => Self {
                id,
                name: "Eight-layer",
                alphabet: Alphabet::BankerPlayer,
                oracle_probability: 0.5,
                spec: EngineSpec::Tiered {
                    levels: vec![
                        units(&[1, 1, 2]),
                        units(&[2, 2, 4]),
                        units(&[3, 3, 6]),
                        units(&[5, 5, 10]),
                        units(&[8, 8, 16]),
                        units(&[13, 13, 26]),
                        units(&[21, 21, 42]),
                        units(&[34, 34, 68]),
                    ],
                    rules: TierRules {
                        level_zero_resets: false,
                        later_win: LaterWin::RetreatLevel,
                        level_exit: LevelExit::NetLoss,
                    },
                },
            },
            StrategyId::TwoSetMirror => Self {
                id,
                name: "Two-set mirror",
                alphabet: Alphabet::BankerPlayer,
                oracle_probability: 0.5066,
                spec: EngineSpec::DualSet {
                    first: units(&[1, 2, 4, 8, 16, 32, 64, 128]),
                    second: units(&[1, 2, 4, 8]),
                },
            },
            StrategyId::NettedMirror => Self {
                id,
                name: "Netted mirror",
                alphabet: Alphabet::BankerPlayer,
                oracle_probability: 0.5066,
                spec: EngineSpec::Netted {
                    first: units(&[1, 2, 4, 8, 16, 32, 64, 128]),
                    second: units(&[1, 2, 4, 8]),
                    hedge: units(&[1, 2, 3, 4, 5, 6, 7, 8]),
                },
            },
        }
    }

    pub fn catalog() -> Vec<StrategyConfig> {
        StrategyId::ALL.into_iter().map(Self::for_id).collect()
    }

    /// Whether individual stake-table entries may be edited.
    pub fn editable(&self) -> bool {
        !matches!(
            self.spec,
            EngineSpec::Sequence { .. } | EngineSpec::Cycle { .. }
        )
    }

    /// Build a fresh engine at its initial position.
    pub fn build(&self, base_unit: Decimal) -> Result<Engine, StakeTableError> {
        let engine = match &self.spec {
            EngineSpec::Sequence { initial } => {
                Engine::Sequence(SequenceEngine::new(initial.clone(), base_unit)?)
            }
            EngineSpec::Cycle { values } => {
                Engine::Cycle(CycleEngine::new(values.clone(), base_unit)?)
            }
            EngineSpec::Ladder {
                levels,
                target_wins,
            } => Engine::Ladder(LadderEngine::new(levels.clone(), base_unit, *target_wins)?),
            EngineSpec::Tiered { levels, rules } => {
                Engine::Tiered(TieredEngine::new(levels.clone(), base_unit, *rules)?)
            }
            EngineSpec::DualSet { first, second } => Engine::DualSet(DualSetEngine::new(
                first.clone(),
                second.clone(),
                base_unit,
            )?),
            EngineSpec::Netted {
                first,
                second,
                hedge,
            } => Engine::Netted(NettedEngine::new(
                DualSetEngine::new(first.clone(), second.clone(), base_unit)?,
                LadderEngine::new(hedge.clone(), base_unit, None)?,
            )),
        };
        Ok(engine)
    }
}
