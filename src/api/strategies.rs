use axum::Json;

use crate::strategy::StrategyConfig;

pub async fn list_strategies() -> Json<Vec<StrategyConfig>> {
    Json(StrategyConfig::catalog())
}
