use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

use super::sessions::lookup;
use super::AppState;
use crate::config::MIN_AUTOPLAY_INTERVAL_MS;
use crate::error::AppError;
use crate::simulation::{
    spawn_autoplay, AutoPlayOptions, AutoPlayReport, AutoPlayState, RandomOutcomeSource,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutoPlayAction {
    Start,
    Pause,
    Resume,
    Stop,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoPlayRequest {
    pub action: AutoPlayAction,
    pub interval_ms: Option<u64>,
    pub max_rounds: Option<usize>,
    /// Probability that the simulated table deals side A.
    pub probability: Option<f64>,
    pub seed: Option<u64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoPlayResponse {
    pub state: AutoPlayState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<AutoPlayReport>,
}

/// Interval and round cap for a start request. Every run is bounded by the
/// configured cap; larger requests are clamped to it.
fn autoplay_options(req: &AutoPlayRequest, state: &AppState) -> Result<AutoPlayOptions, AppError> {
    let interval = match req.interval_ms {
        Some(ms) if ms < MIN_AUTOPLAY_INTERVAL_MS => {
            return Err(AppError::BadRequest(format!(
                "intervalMs must be at least {}",
                MIN_AUTOPLAY_INTERVAL_MS
            )))
        }
        Some(ms) => Duration::from_millis(ms),
        None => state.config.autoplay_interval,
    };
    let cap = state.config.autoplay_max_rounds;
    let max_rounds = match req.max_rounds {
        Some(0) => return Err(AppError::BadRequest("maxRounds must be positive".to_string())),
        Some(n) => n.min(cap),
        None => cap,
    };
    Ok(AutoPlayOptions {
        interval,
        max_rounds: Some(max_rounds),
        start_paused: false,
    })
}

pub async fn control_autoplay(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Json(req): Json<AutoPlayRequest>,
) -> Result<Json<AutoPlayResponse>, AppError> {
    let entry = lookup(&state, id).await?;
    let mut slot = entry.autoplay.lock().await;

    match req.action {
        AutoPlayAction::Start => {
            if slot.as_ref().is_some_and(|h| !h.is_finished()) {
                return Err(AppError::Conflict("auto-play already running".to_string()));
            }
            let options = autoplay_options(&req, &state)?;
            let source = RandomOutcomeSource::new(
                req.probability.unwrap_or(0.5),
                req.seed.or(state.config.oracle_seed),
            );
            let handle = spawn_autoplay(entry.session.clone(), Box::new(source), options);
            let current = handle.state();
            *slot = Some(handle);
            tracing::info!(session = %id, "Auto-play started");
            Ok(Json(AutoPlayResponse {
                state: current,
                report: None,
            }))
        }
        AutoPlayAction::Pause | AutoPlayAction::Resume => {
            let handle = slot
                .as_ref()
                .ok_or_else(|| AppError::NotFound("no auto-play for this session".to_string()))?;
            let accepted = if req.action == AutoPlayAction::Pause {
                handle.pause()
            } else {
                handle.resume()
            };
            if !accepted {
                return Err(AppError::Conflict("auto-play has stopped".to_string()));
            }
            Ok(Json(AutoPlayResponse {
                state: handle.state(),
                report: None,
            }))
        }
        AutoPlayAction::Stop => {
            let handle = slot
                .take()
                .ok_or_else(|| AppError::NotFound("no auto-play for this session".to_string()))?;
            handle.stop();
            let report = handle
                .join()
                .await
                .map_err(|e| AppError::Internal(e.to_string()))?;
            tracing::info!(session = %id, rounds = report.rounds_played, "Auto-play stopped");
            Ok(Json(AutoPlayResponse {
                state: AutoPlayState::Stopped,
                report: Some(report),
            }))
        }
    }
}
