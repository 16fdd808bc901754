use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AppState, RegistryError, SessionEntry};
use crate::domain::{Decimal, Outcome, PayoutRule, RoadCell, StateSnapshot, StrategyId, ROAD_ROWS};
use crate::engine::Recommendation;
use crate::error::AppError;
use crate::oracle::OracleMode;
use crate::session::{ResolveStatus, Session, SessionOptions, SessionView};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    pub strategy: StrategyId,
    pub base_unit: Option<Decimal>,
    pub oracle: Option<OracleMode>,
    pub payout: Option<PayoutRule>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub session: SessionView,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendResponse {
    pub recommendation: Option<Recommendation>,
    pub state: StateSnapshot,
    pub busted: bool,
    pub complete: bool,
}

#[derive(Debug, Deserialize)]
pub struct ResolveRequest {
    pub outcome: Outcome,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveResponse {
    #[serde(flatten)]
    pub status: ResolveStatus,
    /// How long a client may animate the outcome before showing the result.
    pub reveal_delay_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct EditStakeRequest {
    pub value: Decimal,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditStakeResponse {
    pub index: usize,
    pub previous: Decimal,
    pub stakes: Vec<Decimal>,
}

#[derive(Debug, Deserialize)]
pub struct AdjustStakesRequest {
    pub times: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseUnitRequest {
    pub base_unit: Decimal,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseUnitResponse {
    pub previous: Decimal,
    pub base_unit: Decimal,
    pub stakes: Vec<Decimal>,
}

#[derive(Debug, Serialize)]
pub struct StakesResponse {
    pub stakes: Vec<Decimal>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoadResponse {
    pub rows: usize,
    pub history: String,
    pub current_streak: usize,
    pub cells: Vec<RoadCell>,
}

pub(super) async fn lookup(state: &AppState, id: Uuid) -> Result<SessionEntry, AppError> {
    state
        .registry
        .get(&id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("session {}", id)))
}

fn respond(entry: &SessionEntry, session: &Session) -> SessionResponse {
    SessionResponse {
        id: entry.id,
        created_at: entry.created_at,
        session: session.view(),
    }
}

pub async fn create_session(
    State(state): State<AppState>,
    Json(req): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<SessionResponse>), AppError> {
    let options = SessionOptions {
        oracle: req.oracle.unwrap_or_default(),
        payout: req.payout.unwrap_or(state.config.payout),
        default_seed: state.config.oracle_seed,
    };
    let base_unit = req.base_unit.unwrap_or(state.config.default_base_unit);
    let session = Session::initialize(req.strategy, base_unit, options)?;

    let entry = state.registry.insert(session).await.map_err(|e| match e {
        RegistryError::Full { .. } => AppError::Conflict(e.to_string()),
    })?;
    tracing::info!(session = %entry.id, strategy = %req.strategy, "Session registered");

    let guard = entry.session.lock().await;
    Ok((StatusCode::CREATED, Json(respond(&entry, &guard))))
}

pub async fn get_session(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<SessionResponse>, AppError> {
    let entry = lookup(&state, id).await?;
    let guard = entry.session.lock().await;
    Ok(Json(respond(&entry, &guard)))
}

pub async fn delete_session(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    state
        .registry
        .remove(&id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("session {}", id)))?;
    tracing::info!(session = %id, "Session removed");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn recommend(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<RecommendResponse>, AppError> {
    let entry = lookup(&state, id).await?;
    let mut session = entry.session.lock().await;
    let recommendation = session.recommend();
    Ok(Json(RecommendResponse {
        recommendation,
        state: session.snapshot(),
        busted: session.ledger().busted,
        complete: session.ledger().complete,
    }))
}

pub async fn resolve(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Json(req): Json<ResolveRequest>,
) -> Result<Json<ResolveResponse>, AppError> {
    let entry = lookup(&state, id).await?;
    let status = entry.session.lock().await.resolve(req.outcome);
    Ok(Json(ResolveResponse {
        status,
        reveal_delay_ms: state.config.reveal_delay_ms,
    }))
}

pub async fn reset(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<SessionResponse>, AppError> {
    let entry = lookup(&state, id).await?;
    let mut session = entry.session.lock().await;
    session.reset();
    Ok(Json(respond(&entry, &session)))
}

pub async fn edit_stake(
    Path((id, index)): Path<(Uuid, usize)>,
    State(state): State<AppState>,
    Json(req): Json<EditStakeRequest>,
) -> Result<Json<EditStakeResponse>, AppError> {
    let entry = lookup(&state, id).await?;
    let mut session = entry.session.lock().await;
    let previous = session.edit_stake_table(index, req.value)?;
    Ok(Json(EditStakeResponse {
        index,
        previous,
        stakes: session.engine().stakes(),
    }))
}

pub async fn adjust_stakes(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Json(req): Json<AdjustStakesRequest>,
) -> Result<Json<StakesResponse>, AppError> {
    let entry = lookup(&state, id).await?;
    let mut session = entry.session.lock().await;
    session.adjust_stakes(req.times)?;
    Ok(Json(StakesResponse {
        stakes: session.engine().stakes(),
    }))
}

pub async fn set_base_unit(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Json(req): Json<BaseUnitRequest>,
) -> Result<Json<BaseUnitResponse>, AppError> {
    let entry = lookup(&state, id).await?;
    let mut session = entry.session.lock().await;
    let previous = session.set_base_unit(req.base_unit)?;
    Ok(Json(BaseUnitResponse {
        previous,
        base_unit: session.base_unit(),
        stakes: session.engine().stakes(),
    }))
}

pub async fn get_road(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<RoadResponse>, AppError> {
    let entry = lookup(&state, id).await?;
    let session = entry.session.lock().await;
    let history = session.history();
    Ok(Json(RoadResponse {
        rows: ROAD_ROWS,
        history: history.spell(session.alphabet()),
        current_streak: history.current_streak(),
        cells: history.cells().to_vec(),
    }))
}

pub async fn export_history(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let entry = lookup(&state, id).await?;
    let mut body = Vec::new();
    {
        let session = entry.session.lock().await;
        session.ledger().write_csv(session.alphabet(), &mut body)?;
    }
    Ok(([(header::CONTENT_TYPE, "text/csv")], body))
}
