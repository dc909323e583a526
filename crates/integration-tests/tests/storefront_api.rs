//! The storefront router over real HTTP.
//!
//! Most tests point the pool at an address nothing listens on, which covers
//! every path that must not need the database and the 500 a client sees when
//! it is down. Tests against a live database are `#[ignore]`d and read
//! `TEST_DATABASE_URL`.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use serde_json::{Value, json};
use sqlx::postgres::PgPoolOptions;

use ximy_cart::{
    AvailabilityValidator, CheckoutDispatcher, HttpValidator, ReconcileOutcome, ValidatorError,
};
use ximy_core::{CartEntry, ItemId, ItemStatus, Price};
use ximy_integration_tests::{
    UNREACHABLE_DATABASE_URL, cart_at, spawn_storefront, temp_cart_path,
};
use ximy_storefront::db::{
    ClickRepository, ItemRepository, NewItem, StatsRepository, ViewRepository,
};

async fn post_json(url: &url::Url, path: &str, body: &Value) -> reqwest::Response {
    reqwest::Client::new()
        .post(url.join(path).unwrap())
        .json(body)
        .send()
        .await
        .unwrap()
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health_answers_without_database() {
    let url = spawn_storefront(UNREACHABLE_DATABASE_URL).await;

    let response = reqwest::get(url.join("/health").unwrap()).await.unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "ok");
}

#[tokio::test]
async fn test_readiness_reports_unreachable_database() {
    let url = spawn_storefront(UNREACHABLE_DATABASE_URL).await;

    let response = reqwest::get(url.join("/health/ready").unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), 503);
}

#[tokio::test]
async fn test_request_id_is_echoed_or_minted() {
    let url = spawn_storefront(UNREACHABLE_DATABASE_URL).await;
    let client = reqwest::Client::new();

    let echoed = client
        .get(url.join("/health").unwrap())
        .header("x-request-id", "edge-7f3a")
        .send()
        .await
        .unwrap();
    assert_eq!(echoed.headers()["x-request-id"], "edge-7f3a");

    let minted = client.get(url.join("/health").unwrap()).send().await.unwrap();
    let id = minted.headers()["x-request-id"].to_str().unwrap();
    assert!(uuid::Uuid::parse_str(id).is_ok());
}

// ============================================================================
// Cart validation
// ============================================================================

#[tokio::test]
async fn test_validate_empty_list_skips_database() {
    let url = spawn_storefront(UNREACHABLE_DATABASE_URL).await;

    for body in [json!({ "itemIds": [] }), json!({})] {
        let response = post_json(&url, "/api/cart/validate", &body).await;
        assert_eq!(response.status(), 200);
        assert_eq!(
            response.json::<Value>().await.unwrap(),
            json!({ "validIds": [] })
        );
    }
}

#[tokio::test]
async fn test_validate_rejects_oversized_batch() {
    let url = spawn_storefront(UNREACHABLE_DATABASE_URL).await;
    let ids: Vec<String> = (0..101).map(|n| format!("item-{n}")).collect();

    let response = post_json(&url, "/api/cart/validate", &json!({ "itemIds": ids })).await;

    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_validate_duplicates_count_once_toward_limit() {
    let url = spawn_storefront(UNREACHABLE_DATABASE_URL).await;
    let ids = vec!["same"; 150];

    let response = post_json(&url, "/api/cart/validate", &json!({ "itemIds": ids })).await;

    // Past the limit check; fails only on the missing database
    assert_eq!(response.status(), 500);
}

#[tokio::test]
async fn test_database_outage_reaches_client_as_status_error() {
    let url = spawn_storefront(UNREACHABLE_DATABASE_URL).await;
    let validator = HttpValidator::new(&url, Duration::from_secs(5)).unwrap();

    let err = validator
        .check(&[ItemId::new("a"), ItemId::new("b")])
        .await
        .unwrap_err();

    assert!(matches!(err, ValidatorError::Status(500)));
}

#[tokio::test]
async fn test_database_outage_hides_details() {
    let url = spawn_storefront(UNREACHABLE_DATABASE_URL).await;

    let response = post_json(&url, "/api/cart/validate", &json!({ "itemIds": ["a"] })).await;

    assert_eq!(response.status(), 500);
    let body = response.text().await.unwrap();
    assert!(!body.contains("127.0.0.1"));
}

// ============================================================================
// Click and view tracking
// ============================================================================

#[tokio::test]
async fn test_click_rejects_non_uuid_item() {
    let url = spawn_storefront(UNREACHABLE_DATABASE_URL).await;

    let response = post_json(
        &url,
        "/api/whatsapp/clicks",
        &json!({ "item_id": "levi-s-501-denim-jacket" }),
    )
    .await;

    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_click_rejects_oversized_visitor_id() {
    let url = spawn_storefront(UNREACHABLE_DATABASE_URL).await;

    let response = post_json(
        &url,
        "/api/whatsapp/clicks",
        &json!({
            "item_id": uuid::Uuid::new_v4().to_string(),
            "visitor_id": "v".repeat(65),
        }),
    )
    .await;

    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_view_rejects_non_uuid_item() {
    let url = spawn_storefront(UNREACHABLE_DATABASE_URL).await;

    let response = post_json(&url, "/api/views", &json!({ "item_id": "flannel-shirt" })).await;

    assert_eq!(response.status(), 400);
}

// ============================================================================
// Live database
// ============================================================================

fn test_database_url() -> String {
    std::env::var("TEST_DATABASE_URL").expect("TEST_DATABASE_URL must be set for live tests")
}

async fn live_pool(database_url: &str) -> sqlx::PgPool {
    let pool = PgPoolOptions::new().connect(database_url).await.unwrap();
    sqlx::migrate!("../storefront/migrations")
        .run(&pool)
        .await
        .unwrap();
    pool
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_validate_against_live_catalog() {
    let database_url = test_database_url();
    let pool = live_pool(&database_url).await;

    let repo = ItemRepository::new(&pool);
    let jacket = repo
        .create(&NewItem::new("Levi's 501 Denim Jacket", Price::from_ringgit(120)).unwrap())
        .await
        .unwrap();
    let tee = repo
        .create(&NewItem::new("Harley Davidson Tee", Price::from_ringgit(80)).unwrap())
        .await
        .unwrap();
    repo.set_status(&jacket.id, ItemStatus::OfflineSold)
        .await
        .unwrap();

    let url = spawn_storefront(&database_url).await;
    let missing = uuid::Uuid::new_v4().to_string();
    let response = post_json(
        &url,
        "/api/cart/validate",
        &json!({ "itemIds": [jacket.id, "not-a-uuid", tee.id, missing] }),
    )
    .await;

    assert_eq!(response.status(), 200);
    assert_eq!(
        response.json::<Value>().await.unwrap(),
        json!({ "validIds": [tee.id] })
    );
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_click_is_recorded_under_returned_visitor() {
    let database_url = test_database_url();
    let pool = live_pool(&database_url).await;

    let item = ItemRepository::new(&pool)
        .create(&NewItem::new("Flannel Shirt", Price::from_ringgit(45)).unwrap())
        .await
        .unwrap();

    let url = spawn_storefront(&database_url).await;
    let response = post_json(
        &url,
        "/api/whatsapp/clicks",
        &json!({ "item_id": item.id }),
    )
    .await;

    assert_eq!(response.status(), 204);
    let visitor = response.headers()["x-visitor-id"].to_str().unwrap();
    assert_eq!(visitor.len(), 32);

    let clicks = ClickRepository::new(&pool)
        .count_for_item(&item.id)
        .await
        .unwrap();
    assert_eq!(clicks, 1);

    let unknown = post_json(
        &url,
        "/api/whatsapp/clicks",
        &json!({ "item_id": uuid::Uuid::new_v4().to_string(), "visitor_id": visitor }),
    )
    .await;
    assert_eq!(unknown.status(), 404);
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_deleted_item_is_no_longer_valid() {
    let database_url = test_database_url();
    let pool = live_pool(&database_url).await;

    let repo = ItemRepository::new(&pool);
    let kept = repo
        .create(&NewItem::new("Corduroy Trousers", Price::from_ringgit(60)).unwrap())
        .await
        .unwrap();
    let deleted = repo
        .create(&NewItem::new("Varsity Jacket", Price::from_ringgit(150)).unwrap())
        .await
        .unwrap();
    repo.delete(&deleted.id).await.unwrap();

    let url = spawn_storefront(&database_url).await;
    let response = post_json(
        &url,
        "/api/cart/validate",
        &json!({ "itemIds": [deleted.id, kept.id] }),
    )
    .await;

    assert_eq!(response.status(), 200);
    assert_eq!(
        response.json::<Value>().await.unwrap(),
        json!({ "validIds": [kept.id] })
    );
    assert!(repo.get_by_id(&deleted.id).await.unwrap().is_none());
    assert!(matches!(
        repo.delete(&deleted.id).await,
        Err(ximy_storefront::db::RepositoryError::NotFound)
    ));
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_views_and_clicks_reach_stats() {
    let database_url = test_database_url();
    let pool = live_pool(&database_url).await;

    let item = ItemRepository::new(&pool)
        .create(&NewItem::new("Denim Overshirt", Price::from_ringgit(70)).unwrap())
        .await
        .unwrap();
    let before = StatsRepository::new(&pool).catalog().await.unwrap();

    let url = spawn_storefront(&database_url).await;
    let view = post_json(&url, "/api/views", &json!({ "item_id": item.id })).await;
    assert_eq!(view.status(), 204);
    let visitor = view.headers()["x-visitor-id"].to_str().unwrap().to_owned();

    let click = post_json(
        &url,
        "/api/whatsapp/clicks",
        &json!({ "item_id": item.id, "visitor_id": visitor }),
    )
    .await;
    assert_eq!(click.status(), 204);
    assert_eq!(click.headers()["x-visitor-id"], visitor.as_str());

    assert_eq!(
        ViewRepository::new(&pool).count_for_item(&item.id).await.unwrap(),
        1
    );

    // Other tests may share the database, so compare against a baseline
    let after = StatsRepository::new(&pool).catalog().await.unwrap();
    assert!(after.item_views > before.item_views);
    assert!(after.whatsapp_clicks > before.whatsapp_clicks);
    assert!(after.total_items >= after.available_items + after.sold_items);
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_cart_keeps_price_seen_at_add_time() {
    let database_url = test_database_url();
    let pool = live_pool(&database_url).await;

    let item = ItemRepository::new(&pool)
        .create(&NewItem::new("Wool Cardigan", Price::from_ringgit(120)).unwrap())
        .await
        .unwrap();

    let url = spawn_storefront(&database_url).await;
    let path = temp_cart_path();
    let mut cart = cart_at(&path, &url, Duration::from_secs(5));
    cart.reconcile_on_load().await;
    cart.add_to_cart(CartEntry::new(
        item.id.clone(),
        item.title.clone(),
        item.price,
        item.slug.clone(),
    ))
    .await
    .unwrap();

    sqlx::query("UPDATE items SET price = 200 WHERE id::text = $1")
        .bind(&item.id)
        .execute(&pool)
        .await
        .unwrap();

    let mut next_visit = cart_at(&path, &url, Duration::from_secs(5));
    assert_eq!(next_visit.reconcile_on_load().await, ReconcileOutcome::Unchanged);
    assert_eq!(next_visit.total(), Price::from_ringgit(120));

    let message = CheckoutDispatcher::new(url.as_str())
        .compose(next_visit.entries())
        .unwrap();
    assert!(message.text.ends_with("Total: RM 120"));

    let _ = std::fs::remove_dir_all(path.parent().unwrap());
}
