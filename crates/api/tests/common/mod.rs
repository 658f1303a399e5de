#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

use splitsave_api::auth::jwt::{generate_access_token, JwtConfig};
use splitsave_api::config::ServerConfig;
use splitsave_api::router::build_app_router;
use splitsave_api::state::AppState;

const TEST_SECRET: &str = "integration-test-secret-long-enough-for-hs256";

pub fn jwt_config() -> JwtConfig {
    JwtConfig {
        secret: TEST_SECRET.to_string(),
        access_token_expiry_mins: 15,
    }
}

/// Build a test `ServerConfig` with safe defaults and a 30-second timeout.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        db_max_connections: 5,
        log_json: false,
        jwt: jwt_config(),
    }
}

/// Build the full application router, middleware included, over `pool`.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

/// A signed bearer token for `user`.
pub fn token_for(user: Uuid) -> String {
    generate_access_token(user, &jwt_config()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

fn authed(method: &str, uri: &str, user: Uuid) -> axum::http::request::Builder {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {}", token_for(user)))
}

/// Unauthenticated GET.
pub async fn get_anon(app: Router, uri: &str) -> Response<Body> {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

pub async fn get(app: Router, uri: &str, user: Uuid) -> Response<Body> {
    send(app, authed("GET", uri, user).body(Body::empty()).unwrap()).await
}

pub async fn post(app: Router, uri: &str, user: Uuid) -> Response<Body> {
    send(app, authed("POST", uri, user).body(Body::empty()).unwrap()).await
}

pub async fn post_json(app: Router, uri: &str, user: Uuid, body: serde_json::Value) -> Response<Body> {
    let request = authed("POST", uri, user)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn put_json(app: Router, uri: &str, user: Uuid, body: serde_json::Value) -> Response<Body> {
    let request = authed("PUT", uri, user)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn delete(app: Router, uri: &str, user: Uuid) -> Response<Body> {
    send(app, authed("DELETE", uri, user).body(Body::empty()).unwrap()).await
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Create a partnership owned by a fresh user and have a second user join.
///
/// Returns `(partnership_id, partner_a, partner_b)`. Incomes are 6000/4000.
pub async fn joined_partnership(pool: &PgPool) -> (i64, Uuid, Uuid) {
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();

    let response = post_json(
        build_test_app(pool.clone()),
        "/api/v1/partnerships",
        a,
        serde_json::json!({
            "name": "Home",
            "partner_a_income": 6000.0,
            "partner_b_income": 4000.0,
        }),
    )
    .await;
    let id = body_json(response).await["id"].as_i64().unwrap();

    let response = post(
        build_test_app(pool.clone()),
        &format!("/api/v1/partnerships/{id}/join"),
        b,
    )
    .await;
    assert!(response.status().is_success());

    (id, a, b)
}
