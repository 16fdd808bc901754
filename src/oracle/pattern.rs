//! Pattern rules: recommend a side when the outcome history matches.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{Alphabet, Outcome, Side};

/// A rule as entered by a user, spelled in the session's alphabet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternRuleSpec {
    pub pattern: String,
    pub side: String,
    #[serde(default)]
    pub strict: bool,
}

impl PatternRuleSpec {
    pub fn new(pattern: &str, side: &str, strict: bool) -> Self {
        Self {
            pattern: pattern.to_string(),
            side: side.to_string(),
            strict,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("pattern is empty")]
    Empty,
    #[error("symbol '{symbol}' at position {position} is not in the alphabet")]
    UnknownSymbol { symbol: char, position: usize },
    #[error("side '{0}' is not a single symbol of the alphabet")]
    UnknownSide(String),
}

/// A validated rule.
///
/// Strict rules require the whole history to equal the pattern. Loose rules
/// require the history to end with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternRule {
    pub pattern: Vec<Outcome>,
    pub side: Side,
    pub strict: bool,
}

impl PatternRule {
    pub fn parse(spec: &PatternRuleSpec, alphabet: Alphabet) -> Result<Self, PatternError> {
        let trimmed = spec.pattern.trim();
        if trimmed.is_empty() {
            return Err(PatternError::Empty);
        }
        let pattern = trimmed
            .chars()
            .enumerate()
            .map(|(position, symbol)| {
                alphabet
                    .side(symbol)
                    .ok_or(PatternError::UnknownSymbol { symbol, position })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut side_chars = spec.side.trim().chars();
        let side = match (side_chars.next(), side_chars.next()) {
            (Some(c), None) => alphabet.side(c),
            _ => None,
        }
        .ok_or_else(|| PatternError::UnknownSide(spec.side.clone()))?;

        Ok(Self {
            pattern,
            side,
            strict: spec.strict,
        })
    }

    pub fn matches(&self, history: &[Outcome]) -> bool {
        if self.strict {
            history == self.pattern.as_slice()
        } else {
            history.ends_with(&self.pattern)
        }
    }
}

/// Ordered rule set; the first matching rule wins.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PatternOracle {
    rules: Vec<PatternRule>,
    skipped: usize,
}

impl PatternOracle {
    /// Compile `specs` in order. Malformed rules are skipped with a warning.
    pub fn new(specs: &[PatternRuleSpec], alphabet: Alphabet) -> Self {
        let mut rules = Vec::with_capacity(specs.len());
        let mut skipped = 0;
        for (index, spec) in specs.iter().enumerate() {
            match PatternRule::parse(spec, alphabet) {
                Ok(rule) => rules.push(rule),
                Err(e) => {
                    skipped += 1;
                    tracing::warn!(rule = index, pattern = %spec.pattern, error = %e, "Skipping invalid pattern rule");
                }
            }
        }
        Self { rules, skipped }
    }

    pub fn rules(&self) -> &[PatternRule] {
        &self.rules
    }

    /// Number of specs rejected at construction.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn recommend(&self, history: &[Outcome]) -> Option<Side> {
        match_rules(history, &self.rules)
    }
}

/// Side of the first rule in `rules` matching `history`.
pub fn match_rules(history: &[Outcome], rules: &[PatternRule]) -> Option<Side> {
    rules.iter().find(|r| r.matches(history)).map(|r| r.side)
}
