//! A playing session: one engine, its ledger, its oracle and the table history.
//!
//! Every mutation goes through `&mut self`, so a round is always resolved in
//! full before anything else (including reset) can touch the session.

use serde::Serialize;
use thiserror::Error;

use crate::domain::{
    Alphabet, Decimal, Ledger, Outcome, OutcomeHistory, PayoutError, PayoutRule, Side,
    StateSnapshot, StrategyId,
};
use crate::engine::{Engine, Progress, Recommendation, StakeTableError};
use crate::oracle::{Oracle, OracleMode};
use crate::strategy::StrategyConfig;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    #[error("base unit must be positive, got {0}")]
    InvalidBaseUnit(Decimal),
    #[error(transparent)]
    StakeTable(#[from] StakeTableError),
    #[error(transparent)]
    InvalidPayout(#[from] PayoutError),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionOptions {
    pub oracle: OracleMode,
    pub payout: PayoutRule,
    /// Seed for a random oracle that does not carry its own.
    pub default_seed: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    NoPendingRecommendation,
    Busted,
    Complete,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundReport {
    pub round: u32,
    pub side: Side,
    pub outcome: Outcome,
    pub won: bool,
    pub stake: Decimal,
    pub pnl_delta: Decimal,
    pub cumulative_pnl: Decimal,
    pub busted: bool,
    pub complete: bool,
    pub state: StateSnapshot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ResolveStatus {
    Resolved(RoundReport),
    #[serde(rename_all = "camelCase")]
    Ignored {
        reason: IgnoreReason,
        cumulative_pnl: Decimal,
        state: StateSnapshot,
    },
}

impl ResolveStatus {
    pub fn report(&self) -> Option<&RoundReport> {
        match self {
            ResolveStatus::Resolved(report) => Some(report),
            ResolveStatus::Ignored { .. } => None,
        }
    }

    pub fn is_ignored(&self) -> bool {
        matches!(self, ResolveStatus::Ignored { .. })
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    config: StrategyConfig,
    base_unit: Decimal,
    engine: Engine,
    ledger: Ledger,
    oracle: Oracle,
    payout: PayoutRule,
    history: OutcomeHistory,
    pending: Option<Recommendation>,
}

impl Session {
    pub fn initialize(
        strategy: StrategyId,
        base_unit: Decimal,
        options: SessionOptions,
    ) -> Result<Self, SessionError> {
        if !base_unit.is_positive() {
            return Err(SessionError::InvalidBaseUnit(base_unit));
        }
        options.payout.validate()?;
        let config = StrategyConfig::for_id(strategy);
        let engine = config.build(base_unit)?;
        let oracle = Oracle::from_mode(
            &options.oracle,
            config.alphabet,
            config.oracle_probability,
            options.default_seed,
        );

        tracing::info!(strategy = %strategy, base_unit = %base_unit, oracle = oracle.mode_name(), "Session initialized");

        Ok(Self {
            config,
            base_unit,
            engine,
            ledger: Ledger::new(),
            oracle,
            payout: options.payout,
            history: OutcomeHistory::new(),
            pending: None,
        })
    }

    /// Side and stake for the next round.
    ///
    /// Returns the pending recommendation unchanged if there is one. Returns
    /// None when the session is busted or complete, when the oracle declines
    /// to bet, or when the engine has no stake.
    pub fn recommend(&mut self) -> Option<Recommendation> {
        if self.ledger.is_terminal() {
            return None;
        }
        if let Some(pending) = &self.pending {
            return Some(pending.clone());
        }
        let side = self.oracle.recommend(self.history.outcomes())?;
        let plan = self.engine.plan(side)?;
        self.pending = Some(plan.clone());
        Some(plan)
    }

    /// Record an observed outcome and, if a recommendation is pending, settle it.
    ///
    /// The outcome always joins the history. The ledger and engine only move
    /// when a recommendation was pending and the session is not terminal.
    pub fn resolve(&mut self, outcome: Outcome) -> ResolveStatus {
        self.history.push(outcome);

        if self.ledger.busted {
            return self.ignored(IgnoreReason::Busted);
        }
        if self.ledger.complete {
            return self.ignored(IgnoreReason::Complete);
        }
        let Some(plan) = self.pending.take() else {
            return self.ignored(IgnoreReason::NoPendingRecommendation);
        };

        let settlement = self.engine.settle(&plan, outcome, &self.payout);
        let state = self.engine.snapshot();
        let record = self
            .ledger
            .record(plan.side, outcome, plan.stake, settlement.pnl_delta, state)
            .clone();

        match settlement.progress {
            Progress::Busted => {
                self.ledger.mark_busted();
                tracing::warn!(strategy = %self.config.id, round = record.round, cumulative_pnl = %record.cumulative_pnl, "Progression busted");
            }
            Progress::Complete => {
                self.ledger.mark_complete();
                tracing::info!(strategy = %self.config.id, round = record.round, cumulative_pnl = %record.cumulative_pnl, "Progression complete");
            }
            Progress::Continue => {}
        }

        tracing::debug!(
            strategy = %self.config.id,
            round = record.round,
            side = %record.side,
            outcome = %record.outcome,
            stake = %record.stake,
            pnl = %record.pnl_delta,
            state = %record.state,
            "Round resolved"
        );

        ResolveStatus::Resolved(RoundReport {
            round: record.round,
            side: record.side,
            outcome: record.outcome,
            won: record.won,
            stake: record.stake,
            pnl_delta: record.pnl_delta,
            cumulative_pnl: record.cumulative_pnl,
            busted: self.ledger.busted,
            complete: self.ledger.complete,
            state: record.state,
        })
    }

    fn ignored(&self, reason: IgnoreReason) -> ResolveStatus {
        ResolveStatus::Ignored {
            reason,
            cumulative_pnl: self.ledger.cumulative_pnl,
            state: self.engine.snapshot(),
        }
    }

    /// Fresh progression position and ledger. Outcome history, stake tables
    /// and base unit are kept.
    pub fn reset(&mut self) {
        self.engine.reset();
        self.ledger = Ledger::new();
        self.pending = None;
        tracing::info!(strategy = %self.config.id, "Session reset");
    }

    /// Replace one stake-table entry. Withdraws any pending recommendation.
    pub fn edit_stake_table(&mut self, index: usize, value: Decimal) -> Result<Decimal, SessionError> {
        let previous = self.engine.edit_stake(index, value)?;
        self.pending = None;
        Ok(previous)
    }

    /// Add `times × base` to every stake-table entry.
    pub fn adjust_stakes(&mut self, times: i64) -> Result<(), SessionError> {
        self.engine.adjust_stakes(times)?;
        self.pending = None;
        Ok(())
    }

    /// Rescale every stake table. Returns the previous base unit.
    pub fn set_base_unit(&mut self, base_unit: Decimal) -> Result<Decimal, SessionError> {
        if !base_unit.is_positive() {
            return Err(StakeTableError::NonPositiveBaseUnit {
                rejected: base_unit,
                previous: self.base_unit,
            }
            .into());
        }
        self.engine.set_base_unit(base_unit)?;
        let previous = std::mem::replace(&mut self.base_unit, base_unit);
        self.pending = None;
        Ok(previous)
    }

    pub fn strategy(&self) -> &StrategyConfig {
        &self.config
    }

    pub fn strategy_id(&self) -> StrategyId {
        self.config.id
    }

    pub fn alphabet(&self) -> Alphabet {
        self.config.alphabet
    }

    pub fn base_unit(&self) -> Decimal {
        self.base_unit
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn history(&self) -> &OutcomeHistory {
        &self.history
    }

    pub fn pending(&self) -> Option<&Recommendation> {
        self.pending.as_ref()
    }

    pub fn payout(&self) -> &PayoutRule {
        &self.payout
    }

    pub fn snapshot(&self) -> StateSnapshot {
        self.engine.snapshot()
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            strategy: self.config.id,
            name: self.config.name,
            alphabet: self.config.alphabet,
            oracle: self.oracle.mode_name(),
            base_unit: self.base_unit,
            editable: self.config.editable(),
            stakes: self.engine.stakes(),
            state: self.engine.snapshot(),
            pending: self.pending.clone(),
            cumulative_pnl: self.ledger.cumulative_pnl,
            rounds: self.ledger.rounds.len(),
            wins: self.ledger.wins(),
            losses: self.ledger.losses(),
            max_drawdown: self.ledger.max_drawdown(),
            busted: self.ledger.busted,
            complete: self.ledger.complete,
            history: self.history.spell(self.config.alphabet),
        }
    }
}

/// Read-only summary of a session for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub strategy: StrategyId,
    pub name: &'static str,
    pub alphabet: Alphabet,
    pub oracle: &'static str,
    pub base_unit: Decimal,
    pub editable: bool,
    pub stakes: Vec<Decimal>,
    pub state: StateSnapshot,
    pub pending: Option<Recommendation>,
    pub cumulative_pnl: Decimal,
    pub rounds: usize,
    pub wins: usize,
    pub losses: usize,
    pub max_drawdown: Decimal,
    pub busted: bool,
    pub complete: bool,
    pub history: String,
}
