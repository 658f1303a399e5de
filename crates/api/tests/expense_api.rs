//! HTTP-level tests for expenses, split previews and settlement.

mod common;

use axum::http::StatusCode;
use common::{body_json, delete, get, post_json, put_json};
use serde_json::{json, Value};
use sqlx::PgPool;
use uuid::Uuid;

async fn add_expense(pool: &PgPool, partnership_id: i64, user: Uuid, body: Value) -> Value {
    let response = post_json(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/partnerships/{partnership_id}/expenses"),
        user,
        body,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_expense_defaults_payer_to_caller(pool: PgPool) {
    let (id, a, _) = common::joined_partnership(&pool).await;
    let expense = add_expense(
        &pool,
        id,
        a,
        json!({ "description": "Groceries", "amount": 100.0, "category": "food" }),
    )
    .await;

    assert_eq!(expense["paid_by"], a.to_string());
    assert_eq!(expense["is_shared"], true);
    assert_eq!(expense["category"], "food");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn shared_expense_tells_the_other_partner_their_share(pool: PgPool) {
    let (id, a, b) = common::joined_partnership(&pool).await;
    add_expense(&pool, id, a, json!({ "description": "Dinner", "amount": 80.0 })).await;

    let response = get(
        common::build_test_app(pool.clone()),
        "/api/v1/notifications?unread_only=true",
        b,
    )
    .await;
    let json = body_json(response).await;
    let newest = &json["data"][0];
    assert_eq!(newest["kind"], "partner_expense_added");
    assert_eq!(newest["body"], "\"Dinner\" for 80.00. Your share is 32.00.");

    // The payer is not notified about their own expense.
    let response = get(common::build_test_app(pool), "/api/v1/notifications", a).await;
    let kinds: Vec<Value> = body_json(response).await["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["kind"].clone())
        .collect();
    assert!(!kinds.contains(&json!("partner_expense_added")));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn payer_must_be_a_partner(pool: PgPool) {
    let (id, a, _) = common::joined_partnership(&pool).await;
    let response = post_json(
        common::build_test_app(pool),
        &format!("/api/v1/partnerships/{id}/expenses"),
        a,
        json!({ "description": "Rent", "amount": 900.0, "paid_by": Uuid::new_v4() }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_filters_by_category(pool: PgPool) {
    let (id, a, b) = common::joined_partnership(&pool).await;
    add_expense(&pool, id, a, json!({ "description": "Milk", "amount": 3.5, "category": "food" })).await;
    add_expense(&pool, id, b, json!({ "description": "Bus", "amount": 2.0, "category": "transport" })).await;

    let response = get(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/partnerships/{id}/expenses?category=food"),
        a,
    )
    .await;
    let json = body_json(response).await;
    let items = json["data"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["description"], "Milk");

    let response = get(
        common::build_test_app(pool),
        &format!("/api/v1/partnerships/{id}/expenses?limit=1"),
        a,
    )
    .await;
    assert_eq!(body_json(response).await["data"].as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn update_and_delete_expense(pool: PgPool) {
    let (id, a, b) = common::joined_partnership(&pool).await;
    let expense = add_expense(&pool, id, a, json!({ "description": "Gym", "amount": 40.0 })).await;
    let uri = format!("/api/v1/expenses/{}", expense["id"]);

    let response = put_json(
        common::build_test_app(pool.clone()),
        &uri,
        b,
        json!({ "amount": 45.0, "is_shared": false }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["amount"], 45.0);
    assert_eq!(json["is_shared"], false);
    assert_eq!(json["description"], "Gym");

    let response = put_json(common::build_test_app(pool.clone()), &uri, b, json!({ "amount": 0.0 })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = delete(common::build_test_app(pool.clone()), &uri, Uuid::new_v4()).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = delete(common::build_test_app(pool.clone()), &uri, a).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get(common::build_test_app(pool), &uri, a).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn split_preview_follows_income_ratio(pool: PgPool) {
    let (id, a, _) = common::joined_partnership(&pool).await;
    let uri = format!("/api/v1/partnerships/{id}/expenses/split-preview");

    let response = get(common::build_test_app(pool.clone()), &format!("{uri}?amount=100"), a).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["split"]["partner_a"], 60.0);
    assert_eq!(json["data"]["split"]["partner_b"], 40.0);

    let response = get(common::build_test_app(pool), &format!("{uri}?amount=0"), a).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn settlement_nets_shared_expenses(pool: PgPool) {
    let (id, a, b) = common::joined_partnership(&pool).await;
    add_expense(&pool, id, a, json!({ "description": "Rent", "amount": 100.0 })).await;
    add_expense(&pool, id, a, json!({ "description": "Power", "amount": 50.0 })).await;
    add_expense(
        &pool,
        id,
        b,
        json!({ "description": "Haircut", "amount": 30.0, "is_shared": false }),
    )
    .await;

    let response = get(
        common::build_test_app(pool),
        &format!("/api/v1/partnerships/{id}/settlement"),
        b,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let data = &json["data"];
    assert_eq!(data["total_shared"], 150.0);
    assert_eq!(data["debtor"], "b");
    assert_eq!(data["amount_owed"], 60.0);
    assert_eq!(data["debtor_id"], b.to_string());
    assert_eq!(data["creditor_id"], a.to_string());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn settled_partnership_has_no_debtor(pool: PgPool) {
    let (id, a, b) = common::joined_partnership(&pool).await;
    add_expense(&pool, id, a, json!({ "description": "Food", "amount": 60.0 })).await;
    add_expense(&pool, id, b, json!({ "description": "Fuel", "amount": 40.0 })).await;

    let response = get(
        common::build_test_app(pool),
        &format!("/api/v1/partnerships/{id}/settlement"),
        a,
    )
    .await;
    let json = body_json(response).await;
    assert!(json["data"]["debtor"].is_null());
    assert!(json["data"]["debtor_id"].is_null());
    assert_eq!(json["data"]["amount_owed"], 0.0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn amounts_past_the_cap_are_rejected(pool: PgPool) {
    let (id, a, _) = common::joined_partnership(&pool).await;
    for _ in 0..2 {
        let response = post_json(
            common::build_test_app(pool.clone()),
            &format!("/api/v1/partnerships/{id}/expenses"),
            a,
            json!({ "description": "Yacht", "amount": 6e16 }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    let response = get(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/partnerships/{id}/settlement"),
        a,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["total_shared"], 0.0);

    let response = put_json(
        common::build_test_app(pool),
        &format!("/api/v1/partnerships/{id}"),
        a,
        json!({ "partner_a_income": 6e16 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
