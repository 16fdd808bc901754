//! Background auto-play: resolve rounds from an [`OutcomeSource`] on a timer.
//!
//! Pause, resume and stop only gate the loop. Each tick takes the session
//! lock for one whole recommend/resolve pair, so manual calls interleave with
//! auto-play at round boundaries only.

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::{JoinError, JoinHandle};

use super::OutcomeSource;
use crate::session::{IgnoreReason, ResolveStatus, Session};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AutoPlayState {
    Running,
    Paused,
    Stopped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum StopReason {
    Stopped,
    Busted,
    Complete,
    Exhausted,
    RoundLimit,
    SourceError { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoPlayReport {
    /// Rounds that settled a recommendation.
    pub rounds_played: usize,
    /// Outcomes drawn from the source.
    pub observed: usize,
    pub stop_reason: StopReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoPlayOptions {
    pub interval: Duration,
    pub max_rounds: Option<usize>,
    pub start_paused: bool,
}

impl Default for AutoPlayOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(1000),
            max_rounds: None,
            start_paused: false,
        }
    }
}

#[derive(Debug)]
pub struct AutoPlayHandle {
    control: Arc<watch::Sender<AutoPlayState>>,
    task: JoinHandle<AutoPlayReport>,
}

impl AutoPlayHandle {
    pub fn state(&self) -> AutoPlayState {
        *self.control.borrow()
    }

    /// Returns false if the loop has already stopped.
    pub fn pause(&self) -> bool {
        self.transition(AutoPlayState::Running, AutoPlayState::Paused)
    }

    pub fn resume(&self) -> bool {
        self.transition(AutoPlayState::Paused, AutoPlayState::Running)
    }

    pub fn stop(&self) {
        self.control.send_replace(AutoPlayState::Stopped);
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the loop to end and collect its report.
    pub async fn join(self) -> Result<AutoPlayReport, JoinError> {
        self.task.await
    }

    fn transition(&self, from: AutoPlayState, to: AutoPlayState) -> bool {
        self.control.send_if_modified(|state| {
            if *state == from {
                *state = to;
                true
            } else {
                false
            }
        }) || self.state() == to
    }
}

pub fn spawn_autoplay(
    session: Arc<Mutex<Session>>,
    source: Box<dyn OutcomeSource>,
    options: AutoPlayOptions,
) -> AutoPlayHandle {
    let initial = if options.start_paused {
        AutoPlayState::Paused
    } else {
        AutoPlayState::Running
    };
    let (tx, _) = watch::channel(initial);
    let control = Arc::new(tx);
    let task = tokio::spawn(run(session, source, control.clone(), options));
    AutoPlayHandle { control, task }
}

async fn run(
    session: Arc<Mutex<Session>>,
    mut source: Box<dyn OutcomeSource>,
    control: Arc<watch::Sender<AutoPlayState>>,
    options: AutoPlayOptions,
) -> AutoPlayReport {
    let mut rx = control.subscribe();
    let mut rounds_played = 0;
    let mut observed = 0;

    let stop_reason = loop {
        let state = *rx.borrow_and_update();
        match state {
            AutoPlayState::Stopped => break StopReason::Stopped,
            AutoPlayState::Paused => {
                if rx.changed().await.is_err() {
                    break StopReason::Stopped;
                }
                continue;
            }
            AutoPlayState::Running => {}
        }

        if options.max_rounds.is_some_and(|max| observed >= max) {
            break StopReason::RoundLimit;
        }

        {
            let guard = session.lock().await;
            if guard.ledger().busted {
                break StopReason::Busted;
            }
            if guard.ledger().complete {
                break StopReason::Complete;
            }
        }

        let outcome = match source.next_outcome().await {
            Ok(Some(outcome)) => outcome,
            Ok(None) => break StopReason::Exhausted,
            Err(e) => {
                tracing::warn!(error = %e, "Auto-play source failed");
                break StopReason::SourceError {
                    message: e.to_string(),
                };
            }
        };

        let status = {
            let mut guard = session.lock().await;
            guard.recommend();
            guard.resolve(outcome)
        };
        observed += 1;

        match status {
            ResolveStatus::Resolved(report) => {
                rounds_played += 1;
                if report.busted {
                    break StopReason::Busted;
                }
                if report.complete {
                    break StopReason::Complete;
                }
            }
            ResolveStatus::Ignored {
                reason: IgnoreReason::Busted,
                ..
            } => break StopReason::Busted,
            ResolveStatus::Ignored {
                reason: IgnoreReason::Complete,
                ..
            } => break StopReason::Complete,
            ResolveStatus::Ignored { .. } => {}
        }

        tokio::select! {
            _ = tokio::time::sleep(options.interval) => {}
            changed = rx.changed() => {
                if changed.is_err() {
                    break StopReason::Stopped;
                }
            }
        }
    };

    control.send_replace(AutoPlayState::Stopped);
    tracing::info!(rounds = rounds_played, observed, reason = ?stop_reason, "Auto-play finished");

    AutoPlayReport {
        rounds_played,
        observed,
        stop_reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Decimal, Side, StrategyId};
    use crate::oracle::OracleMode;
    use crate::session::SessionOptions;
    use crate::simulation::ScriptedOutcomeSource;

    fn shared(strategy: StrategyId, side: Side) -> Arc<Mutex<Session>> {
        let session = Session::initialize(
            strategy,
            Decimal::one(),
            SessionOptions {
                oracle: OracleMode::Fixed { side },
                ..SessionOptions::default()
            },
        )
        .unwrap();
        Arc::new(Mutex::new(session))
    }

    fn fast() -> AutoPlayOptions {
        AutoPlayOptions {
            interval: Duration::ZERO,
            ..AutoPlayOptions::default()
        }
    }

    #[tokio::test]
    async fn test_runs_until_source_exhausted() {
        let session = shared(StrategyId::OneThreeTwoFour, Side::A);
        let source = ScriptedOutcomeSource::new().with_outcomes([Side::A, Side::A, Side::B]);
        let handle = spawn_autoplay(session.clone(), Box::new(source), fast());

        let report = handle.join().await.unwrap();
        assert_eq!(report.stop_reason, StopReason::Exhausted);
        assert_eq!(report.rounds_played, 3);
        assert_eq!(session.lock().await.ledger().rounds.len(), 3);
    }

    #[tokio::test]
    async fn test_stops_itself_on_completion() {
        let session = shared(StrategyId::OneTwoTwoOne, Side::B);
        let source = ScriptedOutcomeSource::new().with_outcomes([Side::B; 5]);
        let report = spawn_autoplay(session.clone(), Box::new(source), fast())
            .join()
            .await
            .unwrap();
        assert_eq!(report.stop_reason, StopReason::Complete);
        assert_eq!(report.rounds_played, 2);
        assert!(session.lock().await.ledger().complete);
    }

    #[tokio::test]
    async fn test_paused_loop_does_not_touch_session() {
        let session = shared(StrategyId::TenStepLadder, Side::A);
        let source = ScriptedOutcomeSource::new().with_outcomes([Side::A, Side::B]);
        let handle = spawn_autoplay(
            session.clone(),
            Box::new(source),
            AutoPlayOptions {
                start_paused: true,
                ..fast()
            },
        );

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(handle.state(), AutoPlayState::Paused);
        assert!(session.lock().await.ledger().rounds.is_empty());

        assert!(handle.resume());
        let report = handle.join().await.unwrap();
        assert_eq!(report.stop_reason, StopReason::Exhausted);
        assert_eq!(report.rounds_played, 2);
    }

    #[tokio::test]
    async fn test_stop_while_paused() {
        let session = shared(StrategyId::TenStepLadder, Side::A);
        let source = ScriptedOutcomeSource::new().with_outcomes([Side::A]);
        let handle = spawn_autoplay(
            session,
            Box::new(source),
            AutoPlayOptions {
                start_paused: true,
                ..fast()
            },
        );
        handle.stop();
        assert!(!handle.resume());
        let report = handle.join().await.unwrap();
        assert_eq!(report.stop_reason, StopReason::Stopped);
        assert_eq!(report.observed, 0);
    }

    #[tokio::test]
    async fn test_round_limit_and_source_error() {
        let session = shared(StrategyId::OneThreeTwoFour, Side::A);
        let source = ScriptedOutcomeSource::new().with_outcomes([Side::A; 10]);
        let report = spawn_autoplay(
            session,
            Box::new(source),
            AutoPlayOptions {
                max_rounds: Some(4),
                ..fast()
            },
        )
        .join()
        .await
        .unwrap();
        assert_eq!(report.stop_reason, StopReason::RoundLimit);
        assert_eq!(report.observed, 4);

        let session = shared(StrategyId::OneThreeTwoFour, Side::A);
        let source = ScriptedOutcomeSource::new()
            .with_outcome(Side::B)
            .then_fail("dealer offline");
        let report = spawn_autoplay(session, Box::new(source), fast())
            .join()
            .await
            .unwrap();
        assert_eq!(
            report.stop_reason,
            StopReason::SourceError {
                message: "outcome source failed: dealer offline".to_string()
            }
        );
        assert_eq!(report.rounds_played, 1);
    }
}
