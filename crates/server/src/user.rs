//! User profile endpoints.

use api_types::{
    ApiResponse,
    user::{PasswordChange, ProfileUpdate, UserView},
};
use axum::{Extension, Json, extract::State};

use crate::{ServerError, auth::AuthError, server::ServerState};

pub(crate) fn user_view(user: &engine::User) -> UserView {
    UserView {
        id: user.id,
        name: user.name.clone(),
        email: user.email.clone(),
    }
}

/// Handle `PUT /user/profile`.
pub async fn update_profile(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
    Json(payload): Json<ProfileUpdate>,
) -> Result<Json<ApiResponse<UserView>>, ServerError> {
    crate::validation::profile_update(&payload)?;

    let updated = state
        .engine
        .update_profile(user.id, payload.name.as_deref(), payload.email.as_deref())
        .await?;
    Ok(Json(ApiResponse::ok(user_view(&updated))))
}

/// Handle `PUT /user/password`.
pub async fn change_password(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
    Json(payload): Json<PasswordChange>,
) -> Result<Json<ApiResponse<()>>, ServerError> {
    crate::validation::password_change(&payload)?;

    let valid = bcrypt::verify(&payload.current_password, &user.password_hash)
        .map_err(|err| ServerError::Internal(format!("password verification failed: {err}")))?;
    if !valid {
        return Err(AuthError::WrongCredentials.into());
    }

    let password_hash = bcrypt::hash(&payload.new_password, bcrypt::DEFAULT_COST)
        .map_err(|err| ServerError::Internal(format!("password hashing failed: {err}")))?;
    state.engine.change_password(user.id, &password_hash).await?;

    Ok(Json(ApiResponse::message("password changed")))
}

/// Handle `DELETE /user`: deletes the caller and everything they own.
pub async fn delete_user(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
) -> Result<Json<ApiResponse<()>>, ServerError> {
    state.engine.delete_user(user.id).await?;
    Ok(Json(ApiResponse::message("user deleted")))
}
