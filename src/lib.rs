pub mod api;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod oracle;
pub mod session;
pub mod simulation;
pub mod strategy;

pub use config::Config;
pub use domain::{Alphabet, Decimal, Ledger, Outcome, OutcomeHistory, PayoutRule, Side, StateSnapshot, StrategyId};
pub use engine::{Engine, Progress, Recommendation, StakeTableError};
pub use error::AppError;
pub use oracle::{Oracle, OracleMode, PatternRuleSpec};
pub use session::{IgnoreReason, ResolveStatus, RoundReport, Session, SessionError, SessionOptions};
pub use simulation::{run_rounds, OutcomeSource, RandomOutcomeSource, RunSummary, ScriptedOutcomeSource};
pub use strategy::StrategyConfig;
