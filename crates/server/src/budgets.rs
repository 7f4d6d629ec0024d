//! Budgets API endpoints.

use api_types::{
    ApiResponse,
    budget::{BudgetNew, BudgetPeriod as ApiPeriod, BudgetUpdate, BudgetView},
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use engine::{CreateBudgetCmd, MoneyCents, UpdateBudgetCmd};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

fn period_to_engine(period: ApiPeriod) -> engine::BudgetPeriod {
    match period {
        ApiPeriod::Monthly => engine::BudgetPeriod::Monthly,
        ApiPeriod::Weekly => engine::BudgetPeriod::Weekly,
        ApiPeriod::Yearly => engine::BudgetPeriod::Yearly,
        ApiPeriod::Custom => engine::BudgetPeriod::Custom,
    }
}

fn period_to_api(period: engine::BudgetPeriod) -> ApiPeriod {
    match period {
        engine::BudgetPeriod::Monthly => ApiPeriod::Monthly,
        engine::BudgetPeriod::Weekly => ApiPeriod::Weekly,
        engine::BudgetPeriod::Yearly => ApiPeriod::Yearly,
        engine::BudgetPeriod::Custom => ApiPeriod::Custom,
    }
}

fn budget_view(budget: &engine::Budget) -> BudgetView {
    BudgetView {
        id: budget.id,
        name: budget.name.clone(),
        category: budget.category.clone(),
        amount_minor: budget.amount.cents(),
        spent_minor: budget.spent.cents(),
        period: period_to_api(budget.period),
        start_date: budget.start_date.fixed_offset(),
        end_date: budget.end_date.map(|dt| dt.fixed_offset()),
        is_active: budget.is_active,
    }
}

/// Handle `GET /budgets`.
pub async fn list(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
) -> Result<Json<ApiResponse<Vec<BudgetView>>>, ServerError> {
    let budgets = state.engine.budgets(user.id).await?;
    Ok(Json(ApiResponse::ok(
        budgets.iter().map(budget_view).collect(),
    )))
}

/// Handle `GET /budgets/{id}`.
pub async fn get(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<BudgetView>>, ServerError> {
    let budget = state.engine.budget(id, user.id).await?;
    Ok(Json(ApiResponse::ok(budget_view(&budget))))
}

/// Handle `POST /budgets`. One budget per (user, category); duplicates are
/// rejected with a conflict.
pub async fn create(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
    Json(payload): Json<BudgetNew>,
) -> Result<(StatusCode, Json<ApiResponse<BudgetView>>), ServerError> {
    crate::validation::budget_new(&payload)?;

    let start_date = payload
        .start_date
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(Utc::now);
    let mut cmd = CreateBudgetCmd::new(
        user.id,
        payload.category,
        MoneyCents::new(payload.amount_minor),
        period_to_engine(payload.period),
        start_date,
    );
    if let Some(name) = payload.name {
        cmd = cmd.name(name);
    }
    if let Some(end_date) = payload.end_date {
        cmd = cmd.end_date(end_date.with_timezone(&Utc));
    }
    if let Some(is_active) = payload.is_active {
        cmd = cmd.is_active(is_active);
    }

    let budget = state.engine.create_budget(cmd).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(budget_view(&budget))),
    ))
}

/// Handle `PUT /budgets/{id}`.
pub async fn update(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<BudgetUpdate>,
) -> Result<Json<ApiResponse<BudgetView>>, ServerError> {
    crate::validation::budget_update(&payload)?;

    let mut cmd = UpdateBudgetCmd::new(id, user.id);
    if let Some(name) = payload.name {
        cmd = cmd.name(name);
    }
    if let Some(category) = payload.category {
        cmd = cmd.category(category);
    }
    if let Some(amount) = payload.amount_minor {
        cmd = cmd.amount(MoneyCents::new(amount));
    }
    if let Some(period) = payload.period {
        cmd = cmd.period(period_to_engine(period));
    }
    if let Some(start_date) = payload.start_date {
        cmd = cmd.start_date(start_date.with_timezone(&Utc));
    }
    if let Some(end_date) = payload.end_date {
        cmd = cmd.end_date(end_date.with_timezone(&Utc));
    }
    if let Some(is_active) = payload.is_active {
        cmd = cmd.is_active(is_active);
    }

    let budget = state.engine.update_budget(cmd).await?;
    Ok(Json(ApiResponse::ok(budget_view(&budget))))
}

/// Handle `DELETE /budgets/{id}`.
pub async fn remove(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, ServerError> {
    state.engine.delete_budget(id, user.id).await?;
    Ok(Json(ApiResponse::message("budget deleted")))
}

/// Handle `PUT /budgets/{id}/spent`: rebuild the cached spent total from the
/// stored transactions.
pub async fn recompute_spent(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<BudgetView>>, ServerError> {
    let budget = state.engine.recompute_budget_spent(id, user.id).await?;
    Ok(Json(ApiResponse::ok(budget_view(&budget))))
}
