//! `PgCatalogStore` against a real database.
//!
//! These tests are ignored by default. Run them with a disposable database:
//!
//! ```bash
//! DATABASE_URL=postgres://localhost/combo_offers_test \
//!     cargo test -p combo-offers-integration-tests --test postgres_store -- --ignored
//! ```
//!
//! Each test migrates its own schema so tests can run in parallel.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use combo_offers_core::{
    ComboCategory, ComboOfferId, ComboSelection, NewComboOffer, ProductPatch, RepresentativeProduct,
};
use combo_offers_server::db::{CatalogStore, PgCatalogStore, RepositoryError};
use rust_decimal::Decimal;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Executor, PgPool};
use uuid::Uuid;

async fn fresh_store() -> (PgCatalogStore, PgPool) {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let schema = format!("catalog_test_{}", Uuid::new_v4().simple());

    let admin = PgPool::connect(&url).await.unwrap();
    admin
        .execute(format!("CREATE SCHEMA {schema}").as_str())
        .await
        .unwrap();

    let pool = PgPoolOptions::new()
        .max_connections(4)
        .after_connect(move |conn, _meta| {
            let set_path = format!("SET search_path TO {schema}");
            Box::pin(async move {
                conn.execute(set_path.as_str()).await?;
                Ok(())
            })
        })
        .connect(&url)
        .await
        .unwrap();

    sqlx::migrate!("../server/migrations")
        .run(&pool)
        .await
        .unwrap();

    (PgCatalogStore::new(pool.clone()), pool)
}

fn patch(title: &str) -> ProductPatch {
    ProductPatch {
        title: Some(title.to_string()),
        price: Some(Decimal::new(500, 2)),
        handle: Some(title.to_lowercase()),
        image: None,
        is_synthetic: None,
    }
}

fn new_offer(name: &str) -> NewComboOffer {
    NewComboOffer {
        name: name.to_string(),
        combo_price: Decimal::new(1999, 2),
        combo_image_url: None,
        selection: ComboSelection::Normal {
            product_ids: vec!["1".to_string(), "2".to_string()],
            selectable_quantity: 1,
        },
        representative: RepresentativeProduct {
            product_id: "9001".to_string(),
            variant_id: "9101".to_string(),
        },
    }
}

// =============================================================================
// Products
// =============================================================================

#[tokio::test]
#[ignore = "Requires PostgreSQL via DATABASE_URL"]
async fn test_upsert_is_idempotent() {
    let (store, _) = fresh_store().await;
    store.upsert_product("1", &patch("Jam")).await.unwrap();
    store.upsert_product("1", &patch("Jam")).await.unwrap();

    let products = store.list_products().await.unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].title, "Jam");
    assert_eq!(products[0].price, Decimal::new(500, 2));
}

#[tokio::test]
#[ignore = "Requires PostgreSQL via DATABASE_URL"]
async fn test_concurrent_identical_upserts_keep_one_row() {
    let (store, _) = fresh_store().await;
    let jam = patch("Jam");

    let (a, b) = tokio::join!(
        store.upsert_product("1", &jam),
        store.upsert_product("1", &jam)
    );
    a.unwrap();
    b.unwrap();

    assert_eq!(store.list_products().await.unwrap().len(), 1);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL via DATABASE_URL"]
async fn test_products_are_listed_in_insertion_order() {
    let (store, _) = fresh_store().await;
    store.upsert_product("1", &patch("Jam")).await.unwrap();
    store.upsert_product("2", &patch("Bread")).await.unwrap();
    store.upsert_product("1", &patch("Jam XL")).await.unwrap();

    let products = store.list_products().await.unwrap();
    let titles: Vec<_> = products.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, vec!["Jam XL", "Bread"]);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL via DATABASE_URL"]
async fn test_sync_upsert_does_not_clear_synthetic_flag() {
    let (store, _) = fresh_store().await;
    store
        .upsert_product("9001", &ProductPatch::synthetic())
        .await
        .unwrap();
    store.upsert_product("9001", &patch("Bundle A")).await.unwrap();

    let products = store.list_products().await.unwrap();
    assert_eq!(products.len(), 1);
    assert!(products[0].is_synthetic);
    assert_eq!(products[0].title, "Bundle A");
}

#[tokio::test]
#[ignore = "Requires PostgreSQL via DATABASE_URL"]
async fn test_partial_patch_keeps_existing_columns() {
    let (store, _) = fresh_store().await;
    let mut full = patch("Jam");
    full.image = Some("https://cdn.shopify.com/jam.png".to_string());
    store.upsert_product("1", &full).await.unwrap();
    store
        .upsert_product("1", &ProductPatch::synthetic())
        .await
        .unwrap();

    let product = &store.list_products().await.unwrap()[0];
    assert_eq!(product.title, "Jam");
    assert_eq!(product.handle, "jam");
    assert_eq!(product.image.as_deref(), Some("https://cdn.shopify.com/jam.png"));
    assert!(product.is_synthetic);
}

// =============================================================================
// Combo offers
// =============================================================================

#[tokio::test]
#[ignore = "Requires PostgreSQL via DATABASE_URL"]
async fn test_combo_lifecycle() {
    let (store, _) = fresh_store().await;
    let first = store.create_combo_offer(new_offer("A")).await.unwrap();
    let second = store.create_combo_offer(new_offer("B")).await.unwrap();
    assert_ne!(first.id, second.id);
    assert_eq!(first.combo_price, Decimal::new(1999, 2));

    let listed = store.list_combo_offers().await.unwrap();
    assert_eq!(listed, vec![first.clone(), second.clone()]);
    assert_eq!(store.get_combo_offer(second.id).await.unwrap(), second);

    store.delete_combo_offer(first.id).await.unwrap();
    assert!(matches!(
        store.get_combo_offer(first.id).await,
        Err(RepositoryError::NotFound)
    ));
    assert_eq!(store.list_combo_offers().await.unwrap(), vec![second]);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL via DATABASE_URL"]
async fn test_categorized_combo_round_trips_through_jsonb() {
    let (store, _) = fresh_store().await;
    let mut offer = new_offer("Breakfast Box");
    offer.selection = ComboSelection::Categorized {
        categories: vec![ComboCategory {
            name: "Jams".to_string(),
            selectable_quantity: 1,
            product_ids: vec!["10".to_string(), "11".to_string()],
        }],
    };

    let created = store.create_combo_offer(offer.clone()).await.unwrap();
    assert_eq!(created.selection, offer.selection);
    assert_eq!(store.get_combo_offer(created.id).await.unwrap(), created);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL via DATABASE_URL"]
async fn test_delete_missing_combo_is_not_found() {
    let (store, _) = fresh_store().await;
    assert!(matches!(
        store.delete_combo_offer(ComboOfferId::generate()).await,
        Err(RepositoryError::NotFound)
    ));
}

#[tokio::test]
#[ignore = "Requires PostgreSQL via DATABASE_URL"]
async fn test_shape_check_rejects_mixed_columns() {
    let (_, pool) = fresh_store().await;

    let result = sqlx::query(
        r"
        INSERT INTO combo_offers (
            id, name, combo_price, combo_type, product_ids, selectable_quantity,
            categories, representative_product_id, representative_variant_id
        )
        VALUES ($1, 'Mixed', 10, 'normal', ARRAY['1'], 1, '[]'::jsonb, '9001', '9101')
        ",
    )
    .bind(Uuid::new_v4())
    .execute(&pool)
    .await;

    let err = result.unwrap_err();
    let db_err = err.as_database_error().unwrap();
    assert_eq!(db_err.constraint(), Some("combo_offers_shape"));
}
