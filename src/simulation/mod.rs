//! Driving sessions from outcome streams: synchronous backtests and async auto-play.

use async_trait::async_trait;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::collections::VecDeque;
use std::fmt;
use thiserror::Error;

use crate::domain::{Decimal, Outcome, Side};
use crate::session::Session;

pub mod autoplay;

pub use autoplay::{spawn_autoplay, AutoPlayHandle, AutoPlayOptions, AutoPlayReport, AutoPlayState, StopReason};

/// Where observed outcomes come from when nobody is entering them by hand.
#[async_trait]
pub trait OutcomeSource: Send + fmt::Debug {
    /// Next outcome, or None once the source is exhausted.
    async fn next_outcome(&mut self) -> Result<Option<Outcome>, OutcomeSourceError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OutcomeSourceError {
    #[error("outcome source failed: {0}")]
    Failed(String),
}

/// Endless weighted coin. Also usable as a plain iterator for [`run_rounds`].
#[derive(Debug, Clone)]
pub struct RandomOutcomeSource {
    probability_a: f64,
    rng: ChaCha8Rng,
}

impl RandomOutcomeSource {
    pub fn new(probability_a: f64, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self {
            probability_a: probability_a.clamp(0.0, 1.0),
            rng,
        }
    }

    pub fn draw(&mut self) -> Outcome {
        if self.rng.gen_bool(self.probability_a) {
            Side::A
        } else {
            Side::B
        }
    }
}

impl Iterator for RandomOutcomeSource {
    type Item = Outcome;

    fn next(&mut self) -> Option<Outcome> {
        Some(self.draw())
    }
}

#[async_trait]
impl OutcomeSource for RandomOutcomeSource {
    async fn next_outcome(&mut self) -> Result<Option<Outcome>, OutcomeSourceError> {
        Ok(Some(self.draw()))
    }
}

/// Predefined outcomes, optionally followed by a failure.
#[derive(Debug, Clone, Default)]
pub struct ScriptedOutcomeSource {
    outcomes: VecDeque<Outcome>,
    failure: Option<String>,
}

impl ScriptedOutcomeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_outcome(mut self, outcome: Outcome) -> Self {
        self.outcomes.push_back(outcome);
        self
    }

    pub fn with_outcomes(mut self, outcomes: impl IntoIterator<Item = Outcome>) -> Self {
        self.outcomes.extend(outcomes);
        self
    }

    /// Fail with `message` once the scripted outcomes run out.
    pub fn then_fail(mut self, message: &str) -> Self {
        self.failure = Some(message.to_string());
        self
    }

    pub fn remaining(&self) -> usize {
        self.outcomes.len()
    }
}

#[async_trait]
impl OutcomeSource for ScriptedOutcomeSource {
    async fn next_outcome(&mut self) -> Result<Option<Outcome>, OutcomeSourceError> {
        match self.outcomes.pop_front() {
            Some(outcome) => Ok(Some(outcome)),
            None => match &self.failure {
                Some(message) => Err(OutcomeSourceError::Failed(message.clone())),
                None => Ok(None),
            },
        }
    }
}

/// Result of a backtest run, read from the session ledger when the run ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    /// Outcomes consumed by this run, paired or not.
    pub observed: usize,
    pub rounds: usize,
    pub wins: usize,
    pub losses: usize,
    pub max_drawdown: Decimal,
    pub final_pnl: Decimal,
    pub busted: bool,
    pub complete: bool,
}

/// Play `session` against `outcomes` until the session turns terminal, the
/// outcomes run out, or `max_rounds` outcomes have been consumed.
///
/// Each outcome is preceded by a `recommend()`, so a round is only skipped
/// when the oracle declines to bet.
pub fn run_rounds<I>(session: &mut Session, outcomes: I, max_rounds: Option<usize>) -> RunSummary
where
    I: IntoIterator<Item = Outcome>,
{
    let mut observed = 0;
    let mut outcomes = outcomes.into_iter();
    while !session.ledger().is_terminal() && max_rounds.map_or(true, |max| observed < max) {
        session.recommend();
        let Some(outcome) = outcomes.next() else {
            break;
        };
        session.resolve(outcome);
        observed += 1;
    }

    let ledger = session.ledger();
    RunSummary {
        observed,
        rounds: ledger.rounds.len(),
        wins: ledger.wins(),
        losses: ledger.losses(),
        max_drawdown: ledger.max_drawdown(),
        final_pnl: ledger.cumulative_pnl,
        busted: ledger.busted,
        complete: ledger.complete,
    }
}
