//! Integration tests for combo offer creation, listing and deletion.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::{Method, StatusCode};
use combo_offers_core::{ComboOffer, ComboOfferId, NewComboOffer, Product, ProductPatch};
use combo_offers_integration_tests::{FIRST_COMBO_PRODUCT_ID, FakeShopify, TestContext, send};
use combo_offers_server::db::{CatalogStore, MemoryCatalogStore, RepositoryError};
use serde_json::{Value, json};

fn normal_bundle() -> Value {
    json!({
        "name": "Bundle A",
        "comboType": "normal",
        "productIds": ["1", "2"],
        "selectableQuantity": 1,
        "comboPrice": 19.99,
        "comboImg": "https://cdn.example.com/bundle-a.png"
    })
}

fn breakfast_box() -> Value {
    json!({
        "name": "Breakfast Box",
        "comboType": "categorizedCombo",
        "comboPrice": "25.00",
        "categories": [
            {"name": "Jams", "selectableQuantity": 1, "productIds": ["10", "11"]},
            {"name": "Breads", "selectableQuantity": 2, "productIds": ["20", "21", "10"]}
        ]
    })
}

// =============================================================================
// Creation
// =============================================================================

#[tokio::test]
async fn test_create_normal_combo() {
    let ctx = TestContext::new();

    let (status, body) = ctx.post("/api/combo-offers", &normal_bundle()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);

    let combo = &body["combo"];
    assert_eq!(combo["name"], "Bundle A");
    assert_eq!(combo["comboType"], "normal");
    assert_eq!(combo["shopifyProductIds"], json!(["1", "2"]));
    assert_eq!(combo["selectableQuantity"], 1);
    assert_eq!(combo["comboPrice"], json!(19.99));
    assert_eq!(combo["comboImg"], "https://cdn.example.com/bundle-a.png");
    assert_eq!(combo["isSynthetic"], true);
    assert_eq!(combo["isActive"], true);
    assert_eq!(combo["shopifyComboProductId"], FIRST_COMBO_PRODUCT_ID.to_string());
    assert_eq!(combo["comboVariantId"], (FIRST_COMBO_PRODUCT_ID * 10).to_string());
    assert!(combo.get("categories").is_none());

    let (status, listed) = ctx.get("/api/combo-offers").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["comboOffers"], json!([combo]));
}

#[tokio::test]
async fn test_create_marks_representative_product_synthetic() {
    let ctx = TestContext::new();
    ctx.post("/api/combo-offers", &normal_bundle()).await;

    let (_, products) = ctx.get("/api/products").await;
    assert_eq!(
        products[0]["externalId"],
        FIRST_COMBO_PRODUCT_ID.to_string()
    );
    assert_eq!(products[0]["isSynthetic"], true);
}

#[tokio::test]
async fn test_create_categorized_combo() {
    let ctx = TestContext::new();

    let (status, body) = ctx.post("/api/combo-offers", &breakfast_box()).await;
    assert_eq!(status, StatusCode::CREATED);

    let combo = &body["combo"];
    assert_eq!(combo["comboType"], "categorized");
    assert_eq!(combo["comboPrice"], json!(25.0));
    assert_eq!(combo["categories"][0]["name"], "Jams");
    assert_eq!(combo["categories"][1]["selectableQuantity"], 2);
    assert_eq!(
        combo["categories"][1]["productIds"],
        json!(["20", "21", "10"])
    );
    assert!(combo.get("shopifyProductIds").is_none());
    assert!(combo.get("selectableQuantity").is_none());
}

#[tokio::test]
async fn test_metafields_are_attached_to_bundled_products() {
    let ctx = TestContext::new();

    let (_, body) = ctx.post("/api/combo-offers", &normal_bundle()).await;
    let combo_id = body["combo"]["id"].as_str().unwrap().to_string();

    assert_eq!(
        body["metafields"],
        json!([
            {"productId": "1", "attached": true},
            {"productId": "2", "attached": true}
        ])
    );

    let metafields = ctx.shopify.metafields();
    assert_eq!(metafields.len(), 2);
    for (_, metafield) in &metafields {
        assert_eq!(metafield.namespace, "combo_offers");
        assert_eq!(metafield.key, combo_id);
        let value: Value = serde_json::from_str(&metafield.value).unwrap();
        assert_eq!(
            value,
            json!({
                "name": "Bundle A",
                "productIds": ["1", "2"],
                "comboPrice": 19.99,
                "selectableQuantity": 1
            })
        );
    }
}

#[tokio::test]
async fn test_categorized_metafields_cover_each_distinct_product_once() {
    let ctx = TestContext::new();

    let (_, body) = ctx.post("/api/combo-offers", &breakfast_box()).await;

    let targets: Vec<_> = body["metafields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["productId"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(targets, vec!["10", "11", "20", "21"]);
    assert_eq!(ctx.shopify.metafields().len(), 4);
}

#[tokio::test]
async fn test_metafield_failure_is_reported_not_fatal() {
    let shopify = FakeShopify::new();
    shopify.fail_metafields_for("2");
    let ctx = TestContext::with_shopify(shopify);

    let (status, body) = ctx.post("/api/combo-offers", &normal_bundle()).await;
    assert_eq!(status, StatusCode::CREATED);

    let outcomes = body["metafields"].as_array().unwrap();
    assert_eq!(outcomes[0]["attached"], true);
    assert_eq!(outcomes[1]["productId"], "2");
    assert_eq!(outcomes[1]["attached"], false);
    assert!(outcomes[1]["error"].as_str().unwrap().contains("503"));

    let (_, listed) = ctx.get("/api/combo-offers").await;
    assert_eq!(listed["comboOffers"].as_array().unwrap().len(), 1);
}

// =============================================================================
// Validation
// =============================================================================

#[tokio::test]
async fn test_unknown_combo_type_is_rejected_without_side_effects() {
    let ctx = TestContext::new();
    let mut body = normal_bundle();
    body["comboType"] = json!("mysteryCombo");

    let (status, response) = ctx.post("/api/combo-offers", &body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["success"], false);

    assert_eq!(ctx.shopify.product_count(), 0);
    let (_, listed) = ctx.get("/api/combo-offers").await;
    assert_eq!(listed["comboOffers"], json!([]));
}

#[tokio::test]
async fn test_missing_combo_type_is_rejected() {
    let ctx = TestContext::new();
    let mut body = normal_bundle();
    body.as_object_mut().unwrap().remove("comboType");

    let (status, response) = ctx.post("/api/combo-offers", &body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["message"], "Invalid combo type.");
}

#[tokio::test]
async fn test_invalid_shapes_are_rejected() {
    let ctx = TestContext::new();

    let cases = [
        json!({"name": "", "comboType": "normal", "productIds": ["1"], "selectableQuantity": 1, "comboPrice": 5}),
        json!({"name": "A", "comboType": "normal", "productIds": ["1"], "selectableQuantity": 1}),
        json!({"name": "A", "comboType": "normal", "productIds": ["1"], "selectableQuantity": 1, "comboPrice": -1}),
        json!({"name": "A", "comboType": "normal", "productIds": [], "selectableQuantity": 1, "comboPrice": 5}),
        json!({"name": "A", "comboType": "normal", "productIds": ["1"], "comboPrice": 5}),
        json!({"name": "A", "comboType": "normal", "productIds": ["1"], "selectableQuantity": 2, "comboPrice": 5}),
        json!({"name": "A", "comboType": "categorized", "comboPrice": 5}),
        json!({"name": "A", "comboType": "categorized", "comboPrice": 5, "categories": []}),
        json!({"name": "A", "comboType": "categorized", "comboPrice": 5,
               "categories": [{"name": "Empty", "selectableQuantity": 1, "productIds": []}]}),
        json!({"name": "A", "comboType": "categorized", "comboPrice": 5,
               "categories": [{"name": "Jams", "selectableQuantity": 0, "productIds": ["1"]}]}),
    ];

    for case in cases {
        let (status, response) = ctx.post("/api/combo-offers", &case).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "case: {case}");
        assert_eq!(response["success"], false, "case: {case}");
    }

    assert_eq!(ctx.shopify.product_count(), 0);
}

#[tokio::test]
async fn test_unstorable_price_is_rejected_before_shopify() {
    let ctx = TestContext::new();

    for (price, message) in [
        ("19.999", "comboPrice must have at most 2 decimal places"),
        ("10000000000", "comboPrice must be less than 10000000000"),
    ] {
        let mut body = normal_bundle();
        body["comboPrice"] = json!(price);

        let (status, response) = ctx.post("/api/combo-offers", &body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "price: {price}");
        assert_eq!(response["message"], message);
    }

    assert_eq!(ctx.shopify.product_count(), 0);
    assert!(ctx.shopify.deleted().is_empty());
    assert!(ctx.store.list_combo_offers().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let ctx = TestContext::new();

    let (status, response) = ctx.post_raw("/api/combo-offers", "{not json").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["success"], false);

    let (status, _) = ctx
        .post_raw("/api/combo-offers", r#"{"comboType": "normal", "productIds": "1"}"#)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Remote and store failures
// =============================================================================

#[tokio::test]
async fn test_remote_create_failure_persists_nothing() {
    let shopify = FakeShopify::new();
    shopify.fail_create();
    let ctx = TestContext::with_shopify(shopify);

    let (status, body) = ctx.post("/api/combo-offers", &normal_bundle()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);

    let (_, listed) = ctx.get("/api/combo-offers").await;
    assert_eq!(listed["comboOffers"], json!([]));
    let (_, products) = ctx.get("/api/products").await;
    assert_eq!(products, json!([]));
}

/// Store that refuses to persist combos.
#[derive(Default)]
struct ComboWritesFail(MemoryCatalogStore);

#[async_trait]
impl CatalogStore for ComboWritesFail {
    async fn upsert_product(
        &self,
        external_id: &str,
        patch: &ProductPatch,
    ) -> Result<(), RepositoryError> {
        self.0.upsert_product(external_id, patch).await
    }

    async fn list_products(&self) -> Result<Vec<Product>, RepositoryError> {
        self.0.list_products().await
    }

    async fn list_combo_offers(&self) -> Result<Vec<ComboOffer>, RepositoryError> {
        self.0.list_combo_offers().await
    }

    async fn get_combo_offer(&self, id: ComboOfferId) -> Result<ComboOffer, RepositoryError> {
        self.0.get_combo_offer(id).await
    }

    async fn create_combo_offer(&self, _offer: NewComboOffer) -> Result<ComboOffer, RepositoryError> {
        Err(RepositoryError::DataCorruption(
            "combo_offers_shape violated".to_string(),
        ))
    }

    async fn delete_combo_offer(&self, id: ComboOfferId) -> Result<(), RepositoryError> {
        self.0.delete_combo_offer(id).await
    }
}

#[tokio::test]
async fn test_store_failure_removes_orphaned_remote_product() {
    let shopify = Arc::new(FakeShopify::new());
    let app = TestContext::router_with_store(shopify.clone(), Arc::new(ComboWritesFail::default()));

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/combo-offers",
        Some(normal_bundle().to_string()),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({"success": false, "message": "Internal server error"})
    );
    assert_eq!(shopify.deleted(), vec![FIRST_COMBO_PRODUCT_ID.to_string()]);
    assert_eq!(shopify.product_count(), 0);
    assert!(shopify.metafields().is_empty());
}

// =============================================================================
// Deletion
// =============================================================================

#[tokio::test]
async fn test_delete_combo() {
    let ctx = TestContext::new();
    let (_, created) = ctx.post("/api/combo-offers", &normal_bundle()).await;
    let id = created["combo"]["id"].as_str().unwrap();

    let (status, body) = ctx
        .delete(&format!("/api/combo-offers-delete/{id}"))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["remoteProductDeleted"], true);

    assert_eq!(ctx.shopify.deleted(), vec![FIRST_COMBO_PRODUCT_ID.to_string()]);
    let (_, listed) = ctx.get("/api/combo-offers").await;
    assert_eq!(listed["comboOffers"], json!([]));

    let (status, _) = ctx
        .delete(&format!("/api/combo-offers-delete/{id}"))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_survives_remote_failure() {
    let shopify = FakeShopify::new();
    shopify.fail_delete();
    let ctx = TestContext::with_shopify(shopify);
    let (_, created) = ctx.post("/api/combo-offers", &normal_bundle()).await;
    let id = created["combo"]["id"].as_str().unwrap();

    let (status, body) = ctx
        .delete(&format!("/api/combo-offers-delete/{id}"))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["remoteProductDeleted"], false);

    let (_, listed) = ctx.get("/api/combo-offers").await;
    assert_eq!(listed["comboOffers"], json!([]));
}

#[tokio::test]
async fn test_delete_nonexistent_is_404() {
    let ctx = TestContext::new();

    let (status, body) = ctx
        .delete(&format!(
            "/api/combo-offers-delete/{}",
            ComboOfferId::generate()
        ))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body,
        json!({"success": false, "message": "Combo offer not found"})
    );

    let (status, body) = ctx
        .delete("/api/combo-offers-delete/65a1f0c2e4b0a1b2c3d4e5f6")
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert!(ctx.shopify.deleted().is_empty());
}
