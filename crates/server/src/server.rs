use std::sync::Arc;

use api_types::ApiResponse;
use axum::{
    Json, Router,
    extract::State,
    middleware,
    routing::{delete, get, post, put},
};
use engine::Engine;

use crate::{
    ServerError, accounts, auth, auth::AuthConfig, budgets, statistics, transactions, user,
};

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub auth: Arc<AuthConfig>,
}

/// Liveness probe: no auth, pings the database.
async fn health(State(state): State<ServerState>) -> Result<Json<ApiResponse<()>>, ServerError> {
    state.engine.ping().await?;
    Ok(Json(ApiResponse::message("OK")))
}

fn router(state: ServerState) -> Router {
    let protected = Router::new()
        .route("/auth/me", get(auth::me))
        .route("/user/profile", put(user::update_profile))
        .route("/user/password", put(user::change_password))
        .route("/user", delete(user::delete_user))
        .route("/accounts", get(accounts::list).post(accounts::create))
        .route(
            "/accounts/{id}",
            get(accounts::get)
                .put(accounts::update)
                .delete(accounts::remove),
        )
        .route(
            "/transactions",
            get(transactions::list).post(transactions::create),
        )
        .route(
            "/transactions/{id}",
            get(transactions::get)
                .put(transactions::update)
                .delete(transactions::remove),
        )
        .route("/budgets", get(budgets::list).post(budgets::create))
        .route(
            "/budgets/{id}",
            get(budgets::get).put(budgets::update).delete(budgets::remove),
        )
        .route("/budgets/{id}/spent", put(budgets::recompute_spent))
        .route("/stats/overview", get(statistics::overview))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::auth));

    Router::new()
        .route("/health", get(health))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .merge(protected)
        .with_state(state)
}

pub async fn run(engine: Engine, auth_config: AuthConfig) {
    let listener = match tokio::net::TcpListener::bind("127.0.0.1:3000").await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, auth_config, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    auth_config: AuthConfig,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
        auth: Arc::new(auth_config),
    };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    auth_config: AuthConfig,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, auth_config, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use http_body_util::BodyExt;
    use migration::MigratorTrait;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    async fn test_app() -> Router {
        let db = sea_orm::Database::connect("sqlite::memory:").await.unwrap();
        migration::Migrator::up(&db, None).await.unwrap();
        let engine = Engine::builder().database(db).build().await.unwrap();

        router(ServerState {
            engine: Arc::new(engine),
            auth: Arc::new(AuthConfig::new("test-secret", 60)),
        })
    }

    async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn register(app: &Router, name: &str, email: &str) -> String {
        let (status, body) = send(
            app,
            "POST",
            "/auth/register",
            None,
            Some(json!({ "name": name, "email": email, "password": "hunter2!" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body["data"]["token"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn health_works_without_auth() {
        let app = test_app().await;
        let (status, body) = send(&app, "GET", "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], json!(true));
    }

    #[tokio::test]
    async fn register_login_me_round_trip() {
        let app = test_app().await;
        register(&app, "Alice", "alice@example.com").await;

        let (status, body) = send(
            &app,
            "POST",
            "/auth/login",
            None,
            Some(json!({ "email": "alice@example.com", "password": "hunter2!" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let token = body["data"]["token"].as_str().unwrap().to_string();

        let (status, body) = send(&app, "GET", "/auth/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["email"], json!("alice@example.com"));
        assert_eq!(body["data"]["name"], json!("Alice"));
    }

    #[tokio::test]
    async fn login_rejects_wrong_password() {
        let app = test_app().await;
        register(&app, "Alice", "alice@example.com").await;

        let (status, body) = send(
            &app,
            "POST",
            "/auth/login",
            None,
            Some(json!({ "email": "alice@example.com", "password": "wrong-password" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], json!(false));
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let app = test_app().await;
        register(&app, "Alice", "alice@example.com").await;

        let (status, _) = send(
            &app,
            "POST",
            "/auth/register",
            None,
            Some(json!({
                "name": "Other Alice",
                "email": "alice@example.com",
                "password": "hunter2!",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn protected_routes_require_a_token() {
        let app = test_app().await;
        let (status, _) = send(&app, "GET", "/accounts", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(&app, "GET", "/accounts", Some("not-a-jwt"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn invalid_register_payload_lists_violations() {
        let app = test_app().await;
        let (status, body) = send(
            &app,
            "POST",
            "/auth/register",
            None,
            Some(json!({ "name": "", "email": "nope", "password": "x" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let message = body["message"].as_str().unwrap();
        assert!(message.contains("name"));
        assert!(message.contains("email"));
        assert!(message.contains("password"));
    }

    #[tokio::test]
    async fn expense_creation_moves_the_account_balance() {
        let app = test_app().await;
        let token = register(&app, "Alice", "alice@example.com").await;

        let (status, body) = send(
            &app,
            "POST",
            "/accounts",
            Some(&token),
            Some(json!({ "name": "Checking", "kind": "checking", "balance_minor": 10_000 })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let account_id = body["data"]["id"].as_str().unwrap().to_string();

        let (status, _) = send(
            &app,
            "POST",
            "/transactions",
            Some(&token),
            Some(json!({
                "account_id": account_id,
                "amount_minor": 3_000,
                "kind": "expense",
                "category": "Food",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) =
            send(&app, "GET", &format!("/accounts/{account_id}"), Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["balance_minor"], json!(7_000));
    }

    #[tokio::test]
    async fn other_users_entities_are_not_found() {
        let app = test_app().await;
        let alice = register(&app, "Alice", "alice@example.com").await;
        let bob = register(&app, "Bob", "bob@example.com").await;

        let (_, body) = send(
            &app,
            "POST",
            "/accounts",
            Some(&alice),
            Some(json!({ "name": "Checking", "kind": "checking" })),
        )
        .await;
        let account_id = body["data"]["id"].as_str().unwrap().to_string();

        let (status, body) =
            send(&app, "GET", &format!("/accounts/{account_id}"), Some(&bob), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["data"].is_null());
    }

    #[tokio::test]
    async fn duplicate_budget_category_conflicts() {
        let app = test_app().await;
        let token = register(&app, "Alice", "alice@example.com").await;

        let budget = json!({ "category": "Food", "amount_minor": 20_000, "period": "monthly" });
        let (status, first) = send(&app, "POST", "/budgets", Some(&token), Some(budget.clone())).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, _) = send(&app, "POST", "/budgets", Some(&token), Some(budget)).await;
        assert_eq!(status, StatusCode::CONFLICT);

        // The existing budget is unchanged.
        let id = first["data"]["id"].as_str().unwrap();
        let (_, body) = send(&app, "GET", &format!("/budgets/{id}"), Some(&token), None).await;
        assert_eq!(body["data"]["amount_minor"], json!(20_000));
        assert_eq!(body["data"]["spent_minor"], json!(0));
    }

    #[tokio::test]
    async fn stats_overview_reports_monthly_totals() {
        let app = test_app().await;
        let token = register(&app, "Alice", "alice@example.com").await;

        let (_, body) = send(
            &app,
            "POST",
            "/accounts",
            Some(&token),
            Some(json!({ "name": "Checking", "kind": "checking", "balance_minor": 50_000 })),
        )
        .await;
        let account_id = body["data"]["id"].as_str().unwrap().to_string();

        for (kind, amount) in [("income", 20_000), ("expense", 5_000)] {
            let (status, _) = send(
                &app,
                "POST",
                "/transactions",
                Some(&token),
                Some(json!({
                    "account_id": account_id,
                    "amount_minor": amount,
                    "kind": kind,
                    "category": "General",
                })),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (status, body) = send(&app, "GET", "/stats/overview", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["total_accounts"], json!(1));
        assert_eq!(body["data"]["total_balance_minor"], json!(65_000));
        assert_eq!(body["data"]["monthly_income_minor"], json!(20_000));
        assert_eq!(body["data"]["monthly_expenses_minor"], json!(5_000));
    }

    #[tokio::test]
    async fn deleted_user_token_stops_working() {
        let app = test_app().await;
        let token = register(&app, "Alice", "alice@example.com").await;

        let (status, _) = send(&app, "DELETE", "/user", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(&app, "GET", "/auth/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
