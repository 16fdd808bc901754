//! Recommendation oracle: which side to bet next.
//!
//! The oracle never sees stakes or the ledger. It is a function of the outcome
//! history, plus an RNG in random mode.

use serde::{Deserialize, Serialize};

use crate::domain::{Alphabet, Outcome, Side};

pub mod pattern;
pub mod random;

pub use pattern::{match_rules, PatternError, PatternOracle, PatternRule, PatternRuleSpec};
pub use random::RandomOracle;

/// Oracle configuration as supplied when a session is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum OracleMode {
    /// Weighted coin. `probability` defaults to the strategy's own value.
    Random {
        #[serde(default)]
        probability: Option<f64>,
        #[serde(default)]
        seed: Option<u64>,
    },
    /// First matching rule in priority order; no match means no bet.
    Pattern { rules: Vec<PatternRuleSpec> },
    /// Always the same side.
    Fixed { side: Side },
}

impl Default for OracleMode {
    fn default() -> Self {
        OracleMode::Random {
            probability: None,
            seed: None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Oracle {
    Random(RandomOracle),
    Pattern(PatternOracle),
    Fixed(Side),
}

impl Oracle {
    /// `default_probability` and `default_seed` fill in what a random mode leaves unset.
    pub fn from_mode(
        mode: &OracleMode,
        alphabet: Alphabet,
        default_probability: f64,
        default_seed: Option<u64>,
    ) -> Self {
        match mode {
            OracleMode::Random { probability, seed } => Oracle::Random(RandomOracle::new(
                probability.unwrap_or(default_probability),
                seed.or(default_seed),
            )),
            OracleMode::Pattern { rules } => Oracle::Pattern(PatternOracle::new(rules, alphabet)),
            OracleMode::Fixed { side } => Oracle::Fixed(*side),
        }
    }

    /// Side to bet after `history`, or None for no bet this round.
    pub fn recommend(&mut self, history: &[Outcome]) -> Option<Side> {
        match self {
            Oracle::Random(r) => Some(r.sample()),
            Oracle::Pattern(p) => p.recommend(history),
            Oracle::Fixed(side) => Some(*side),
        }
    }

    pub fn mode_name(&self) -> &'static str {
        match self {
            Oracle::Random(_) => "random",
            Oracle::Pattern(_) => "pattern",
            Oracle::Fixed(_) => "fixed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_deserializes_from_tagged_json() {
        let mode: OracleMode = serde_json::from_str(
            r#"{"mode":"pattern","rules":[{"pattern":"BP","side":"B","strict":false}]}"#,
        )
        .unwrap();
        assert_eq!(
            mode,
            OracleMode::Pattern {
                rules: vec![PatternRuleSpec::new("BP", "B", false)]
            }
        );

        let mode: OracleMode = serde_json::from_str(r#"{"mode":"random"}"#).unwrap();
        assert_eq!(mode, OracleMode::default());
    }

    #[test]
    fn test_fixed_oracle_ignores_history() {
        let mut oracle = Oracle::from_mode(
            &OracleMode::Fixed { side: Side::B },
            Alphabet::BankerPlayer,
            0.5,
            None,
        );
        assert_eq!(oracle.recommend(&[]), Some(Side::B));
        assert_eq!(oracle.recommend(&[Side::A, Side::A]), Some(Side::B));
    }

    #[test]
    fn test_random_mode_uses_default_seed() {
        let mut a = Oracle::from_mode(&OracleMode::default(), Alphabet::BankerPlayer, 0.5, Some(9));
        let mut b = Oracle::from_mode(&OracleMode::default(), Alphabet::BankerPlayer, 0.5, Some(9));
        let xs: Vec<_> = (0..20).map(|_| a.recommend(&[])).collect();
        let ys: Vec<_> = (0..20).map(|_| b.recommend(&[])).collect();
        assert_eq!(xs, ys);
    }
}
