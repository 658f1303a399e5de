//! HTTP-level tests for partnerships: creation, joining, membership checks.

mod common;

use axum::http::StatusCode;
use common::{body_json, get, post, post_json, put_json};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_partnership_returns_201(pool: PgPool) {
    let owner = Uuid::new_v4();
    let response = post_json(
        common::build_test_app(pool),
        "/api/v1/partnerships",
        owner,
        json!({ "name": "Our Place", "partner_a_income": 5000.0 }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["name"], "Our Place");
    assert_eq!(json["partner_a_id"], owner.to_string());
    assert!(json["partner_b_id"].is_null());
    assert_eq!(json["currency"], "USD");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn user_can_only_have_one_partnership(pool: PgPool) {
    let owner = Uuid::new_v4();
    let body = json!({ "name": "First" });
    post_json(common::build_test_app(pool.clone()), "/api/v1/partnerships", owner, body.clone()).await;

    let response = post_json(common::build_test_app(pool), "/api/v1/partnerships", owner, body).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_rejects_blank_name_and_bad_currency(pool: PgPool) {
    let owner = Uuid::new_v4();
    let response = post_json(
        common::build_test_app(pool.clone()),
        "/api/v1/partnerships",
        owner,
        json!({ "name": "  " }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json(
        common::build_test_app(pool),
        "/api/v1/partnerships",
        owner,
        json!({ "name": "Home", "currency": "dollars" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn second_user_joins_as_partner_b(pool: PgPool) {
    let (id, a, b) = common::joined_partnership(&pool).await;

    let response = get(common::build_test_app(pool.clone()), &format!("/api/v1/partnerships/{id}"), b).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["partner_a_id"], a.to_string());
    assert_eq!(json["partner_b_id"], b.to_string());

    let response = get(common::build_test_app(pool), "/api/v1/partnerships", b).await;
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn join_is_rejected_when_seat_taken_or_already_member(pool: PgPool) {
    let (id, a, _) = common::joined_partnership(&pool).await;
    let uri = format!("/api/v1/partnerships/{id}/join");

    let response = post(common::build_test_app(pool.clone()), &uri, Uuid::new_v4()).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = post(common::build_test_app(pool), &uri, a).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn joining_a_missing_partnership_returns_404(pool: PgPool) {
    let response = post(
        common::build_test_app(pool),
        "/api/v1/partnerships/999999/join",
        Uuid::new_v4(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn outsiders_get_404(pool: PgPool) {
    let (id, _, _) = common::joined_partnership(&pool).await;
    let response = get(
        common::build_test_app(pool),
        &format!("/api/v1/partnerships/{id}"),
        Uuid::new_v4(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn either_partner_can_update_incomes(pool: PgPool) {
    let (id, _, b) = common::joined_partnership(&pool).await;
    let uri = format!("/api/v1/partnerships/{id}");

    let response = put_json(
        common::build_test_app(pool.clone()),
        &uri,
        b,
        json!({ "partner_b_income": 4500.0 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["partner_b_income"], 4500.0);
    assert_eq!(json["partner_a_income"], 6000.0);

    let response = put_json(
        common::build_test_app(pool),
        &uri,
        b,
        json!({ "partner_a_income": -1.0 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn joining_notifies_partner_a_and_logs_activity(pool: PgPool) {
    let (id, a, _) = common::joined_partnership(&pool).await;

    let response = get(common::build_test_app(pool.clone()), "/api/v1/notifications", a).await;
    let json = body_json(response).await;
    assert_eq!(json["data"][0]["kind"], "partner_joined");
    assert_eq!(json["data"][0]["entity_id"], id);

    let response = get(
        common::build_test_app(pool),
        &format!("/api/v1/partnerships/{id}/activity"),
        a,
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["total"], 2);
    assert_eq!(json["data"]["items"][0]["activity_type"], "partner_joined");
    assert_eq!(json["data"]["items"][0]["description"], "Joined the partnership");
    assert_eq!(json["data"]["items"][1]["activity_type"], "partnership_created");
}
