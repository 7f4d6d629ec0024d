//! Transactions API endpoints.

use api_types::{
    ApiResponse,
    transaction::{
        TransactionKind as ApiKind, TransactionListQuery, TransactionNew, TransactionUpdate,
        TransactionView,
    },
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use engine::{CreateTransactionCmd, MoneyCents, TransactionListFilter, UpdateTransactionCmd};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

fn kind_to_engine(kind: ApiKind) -> engine::TransactionKind {
    match kind {
        ApiKind::Income => engine::TransactionKind::Income,
        ApiKind::Expense => engine::TransactionKind::Expense,
        ApiKind::Transfer => engine::TransactionKind::Transfer,
    }
}

fn kind_to_api(kind: engine::TransactionKind) -> ApiKind {
    match kind {
        engine::TransactionKind::Income => ApiKind::Income,
        engine::TransactionKind::Expense => ApiKind::Expense,
        engine::TransactionKind::Transfer => ApiKind::Transfer,
    }
}

fn transaction_view(tx: &engine::Transaction) -> TransactionView {
    TransactionView {
        id: tx.id,
        account_id: tx.account_id,
        amount_minor: tx.amount.cents(),
        kind: kind_to_api(tx.kind),
        category: tx.category.clone(),
        description: tx.description.clone(),
        date: tx.date.fixed_offset(),
        tags: tx.tags.clone(),
        transfer_account_id: tx.transfer_account_id,
    }
}

/// Handle `GET /transactions`, filterable by account, category, kind and
/// date range; newest first.
pub async fn list(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
    Query(query): Query<TransactionListQuery>,
) -> Result<Json<ApiResponse<Vec<TransactionView>>>, ServerError> {
    let filter = TransactionListFilter {
        account_id: query.account_id,
        category: query.category,
        kind: query.kind.map(kind_to_engine),
        from: query.from.map(|dt| dt.with_timezone(&Utc)),
        to: query.to.map(|dt| dt.with_timezone(&Utc)),
    };

    let transactions = state.engine.transactions(user.id, &filter).await?;
    Ok(Json(ApiResponse::ok(
        transactions.iter().map(transaction_view).collect(),
    )))
}

/// Handle `GET /transactions/{id}`.
pub async fn get(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<TransactionView>>, ServerError> {
    let tx = state.engine.transaction(id, user.id).await?;
    Ok(Json(ApiResponse::ok(transaction_view(&tx))))
}

/// Handle `POST /transactions`.
pub async fn create(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
    Json(payload): Json<TransactionNew>,
) -> Result<(StatusCode, Json<ApiResponse<TransactionView>>), ServerError> {
    crate::validation::transaction_new(&payload)?;

    let date = payload
        .date
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(Utc::now);
    let mut cmd = CreateTransactionCmd::new(
        user.id,
        payload.account_id,
        MoneyCents::new(payload.amount_minor),
        kind_to_engine(payload.kind),
        payload.category,
        date,
    );
    if let Some(description) = payload.description {
        cmd = cmd.description(description);
    }
    if let Some(tags) = payload.tags {
        cmd = cmd.tags(tags);
    }
    if let Some(target) = payload.transfer_account_id {
        cmd = cmd.transfer_account_id(target);
    }

    let tx = state.engine.create_transaction(cmd).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(transaction_view(&tx))),
    ))
}

/// Handle `PUT /transactions/{id}`.
pub async fn update(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<TransactionUpdate>,
) -> Result<Json<ApiResponse<TransactionView>>, ServerError> {
    crate::validation::transaction_update(&payload)?;

    let mut cmd = UpdateTransactionCmd::new(id, user.id);
    if let Some(account_id) = payload.account_id {
        cmd = cmd.account_id(account_id);
    }
    if let Some(amount) = payload.amount_minor {
        cmd = cmd.amount(MoneyCents::new(amount));
    }
    if let Some(kind) = payload.kind {
        cmd = cmd.kind(kind_to_engine(kind));
    }
    if let Some(category) = payload.category {
        cmd = cmd.category(category);
    }
    if let Some(description) = payload.description {
        cmd = cmd.description(description);
    }
    if let Some(date) = payload.date {
        cmd = cmd.date(date.with_timezone(&Utc));
    }
    if let Some(tags) = payload.tags {
        cmd = cmd.tags(tags);
    }
    if let Some(target) = payload.transfer_account_id {
        cmd = cmd.transfer_account_id(target);
    }

    let tx = state.engine.update_transaction(cmd).await?;
    Ok(Json(ApiResponse::ok(transaction_view(&tx))))
}

/// Handle `DELETE /transactions/{id}`.
pub async fn remove(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, ServerError> {
    state.engine.delete_transaction(id, user.id).await?;
    Ok(Json(ApiResponse::message("transaction deleted")))
}
