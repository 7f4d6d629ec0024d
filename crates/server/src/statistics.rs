//! Statistics API endpoints.

use api_types::{ApiResponse, stats::StatsOverview};
use axum::{Extension, Json, extract::State};
use chrono::Utc;

use crate::{ServerError, server::ServerState};

/// Handle `GET /stats/overview`: per-user rollup, recomputed on every
/// request.
pub async fn overview(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
) -> Result<Json<ApiResponse<StatsOverview>>, ServerError> {
    let stats = state.engine.stats_overview(user.id, Utc::now()).await?;

    Ok(Json(ApiResponse::ok(StatsOverview {
        total_accounts: stats.total_accounts,
        total_balance_minor: stats.total_balance.cents(),
        monthly_income_minor: stats.monthly_income.cents(),
        monthly_expenses_minor: stats.monthly_expenses.cents(),
        total_budgets: stats.total_budgets,
        exceeded_budgets: stats.exceeded_budgets,
    })))
}
