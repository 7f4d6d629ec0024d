//! Account API endpoints.

use api_types::{
    ApiResponse,
    account::{AccountKind as ApiKind, AccountNew, AccountUpdate, AccountView},
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{CreateAccountCmd, CurrencyCode, MoneyCents, UpdateAccountCmd};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

fn kind_to_engine(kind: ApiKind) -> engine::AccountKind {
    match kind {
        ApiKind::Checking => engine::AccountKind::Checking,
        ApiKind::Savings => engine::AccountKind::Savings,
        ApiKind::Credit => engine::AccountKind::Credit,
        ApiKind::Investment => engine::AccountKind::Investment,
        ApiKind::Cash => engine::AccountKind::Cash,
        ApiKind::Other => engine::AccountKind::Other,
    }
}

fn kind_to_api(kind: engine::AccountKind) -> ApiKind {
    match kind {
        engine::AccountKind::Checking => ApiKind::Checking,
        engine::AccountKind::Savings => ApiKind::Savings,
        engine::AccountKind::Credit => ApiKind::Credit,
        engine::AccountKind::Investment => ApiKind::Investment,
        engine::AccountKind::Cash => ApiKind::Cash,
        engine::AccountKind::Other => ApiKind::Other,
    }
}

fn account_view(account: &engine::Account) -> AccountView {
    AccountView {
        id: account.id,
        name: account.name.clone(),
        kind: kind_to_api(account.kind),
        balance_minor: account.balance.cents(),
        currency: account.currency.to_string(),
        description: account.description.clone(),
        is_active: account.is_active,
        created_at: account.created_at.fixed_offset(),
    }
}

/// Handle `GET /accounts`.
pub async fn list(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
) -> Result<Json<ApiResponse<Vec<AccountView>>>, ServerError> {
    let accounts = state.engine.accounts(user.id).await?;
    Ok(Json(ApiResponse::ok(
        accounts.iter().map(account_view).collect(),
    )))
}

/// Handle `GET /accounts/{id}`.
pub async fn get(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<AccountView>>, ServerError> {
    let account = state.engine.account(id, user.id).await?;
    Ok(Json(ApiResponse::ok(account_view(&account))))
}

/// Handle `POST /accounts`.
pub async fn create(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
    Json(payload): Json<AccountNew>,
) -> Result<(StatusCode, Json<ApiResponse<AccountView>>), ServerError> {
    crate::validation::account_new(&payload)?;

    let mut cmd = CreateAccountCmd::new(user.id, payload.name, kind_to_engine(payload.kind))
        .opening_balance(MoneyCents::new(payload.balance_minor.unwrap_or(0)));
    if let Some(code) = payload.currency.as_deref() {
        cmd = cmd.currency(CurrencyCode::try_from(code)?);
    }
    if let Some(description) = payload.description {
        cmd = cmd.description(description);
    }
    if let Some(is_active) = payload.is_active {
        cmd = cmd.is_active(is_active);
    }

    let account = state.engine.new_account(cmd).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(account_view(&account))),
    ))
}

/// Handle `PUT /accounts/{id}`.
pub async fn update(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AccountUpdate>,
) -> Result<Json<ApiResponse<AccountView>>, ServerError> {
    crate::validation::account_update(&payload)?;

    let mut cmd = UpdateAccountCmd::new(id, user.id);
    if let Some(name) = payload.name {
        cmd = cmd.name(name);
    }
    if let Some(kind) = payload.kind {
        cmd = cmd.kind(kind_to_engine(kind));
    }
    if let Some(code) = payload.currency.as_deref() {
        cmd = cmd.currency(CurrencyCode::try_from(code)?);
    }
    if let Some(description) = payload.description {
        cmd = cmd.description(description);
    }
    if let Some(is_active) = payload.is_active {
        cmd = cmd.is_active(is_active);
    }

    let account = state.engine.update_account(cmd).await?;
    Ok(Json(ApiResponse::ok(account_view(&account))))
}

/// Handle `DELETE /accounts/{id}`: removes the account and every transaction
/// touching it.
pub async fn remove(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, ServerError> {
    state.engine.delete_account(id, user.id).await?;
    Ok(Json(ApiResponse::message("account deleted")))
}
