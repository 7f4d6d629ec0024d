//! Bearer-token authentication: token issue/verify, the middleware guarding
//! every protected route, and the register/login/me handlers.

use std::fmt;

use api_types::{
    ApiResponse,
    auth::{AuthData, Login, Register},
    user::UserView,
};
use axum::{
    Extension, Json,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, user::user_view};

#[derive(Debug, PartialEq, Eq)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
    WrongCredentials,
    TokenCreation,
}

impl AuthError {
    pub(crate) fn status(&self) -> StatusCode {
        match self {
            Self::MissingToken | Self::InvalidToken | Self::WrongCredentials => {
                StatusCode::UNAUTHORIZED
            }
            Self::TokenCreation => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            Self::MissingToken => "not authorized",
            Self::InvalidToken => "invalid or expired token",
            Self::WrongCredentials => "invalid credentials",
            Self::TokenCreation => "internal server error",
        };
        f.write_str(message)
    }
}

/// Signing material and token lifetime, built once at startup from the
/// configured secret.
pub struct AuthConfig {
    encoding: EncodingKey,
    decoding: DecodingKey,
    token_ttl: Duration,
}

impl AuthConfig {
    #[must_use]
    pub fn new(secret: &str, token_ttl_minutes: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            token_ttl: Duration::minutes(token_ttl_minutes),
        }
    }
}

/// The contents of a token.
#[derive(Serialize, Deserialize)]
struct Claims {
    /// The subject: the user id.
    sub: String,
    /// The time the token was issued.
    iat: usize,
    /// The expiry time of the token.
    exp: usize,
}

fn encode_token(user_id: Uuid, config: &AuthConfig) -> Result<String, AuthError> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        iat: now.timestamp() as usize,
        exp: (now + config.token_ttl).timestamp() as usize,
    };
    encode(&Header::default(), &claims, &config.encoding).map_err(|_| AuthError::TokenCreation)
}

fn decode_token(token: &str, config: &AuthConfig) -> Result<Claims, AuthError> {
    decode::<Claims>(token, &config.decoding, &Validation::default())
        .map(|data| data.claims)
        .map_err(|_| AuthError::InvalidToken)
}

/// Middleware for the protected routes: verifies the bearer token, loads the
/// user and injects it into request extensions.
pub(crate) async fn auth(
    State(state): State<ServerState>,
    auth_header: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let Some(TypedHeader(Authorization(bearer))) = auth_header else {
        return Err(AuthError::MissingToken.into());
    };

    let claims = decode_token(bearer.token(), &state.auth)?;
    let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidToken)?;
    // A valid token for a deleted user is still unauthorized.
    let user = state
        .engine
        .user_by_id(user_id)
        .await
        .map_err(|_| AuthError::InvalidToken)?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Handle `POST /auth/register`.
pub async fn register(
    State(state): State<ServerState>,
    Json(payload): Json<Register>,
) -> Result<(StatusCode, Json<ApiResponse<AuthData>>), ServerError> {
    crate::validation::register(&payload)?;

    let password_hash = bcrypt::hash(&payload.password, bcrypt::DEFAULT_COST)
        .map_err(|err| ServerError::Internal(format!("password hashing failed: {err}")))?;
    let user = state
        .engine
        .create_user(&payload.name, &payload.email, &password_hash)
        .await?;
    let token = encode_token(user.id, &state.auth)?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(AuthData {
            user: user_view(&user),
            token,
        })),
    ))
}

/// Handle `POST /auth/login`.
pub async fn login(
    State(state): State<ServerState>,
    Json(payload): Json<Login>,
) -> Result<Json<ApiResponse<AuthData>>, ServerError> {
    // An unknown email and a wrong password are indistinguishable.
    let user = state
        .engine
        .user_by_email(&payload.email)
        .await
        .map_err(|_| AuthError::WrongCredentials)?;

    let valid = bcrypt::verify(&payload.password, &user.password_hash)
        .map_err(|err| ServerError::Internal(format!("password verification failed: {err}")))?;
    if !valid {
        return Err(AuthError::WrongCredentials.into());
    }

    let token = encode_token(user.id, &state.auth)?;
    Ok(Json(ApiResponse::ok(AuthData {
        user: user_view(&user),
        token,
    })))
}

/// Handle `GET /auth/me`.
pub async fn me(Extension(user): Extension<engine::User>) -> Json<ApiResponse<UserView>> {
    Json(ApiResponse::ok(user_view(&user)))
}
