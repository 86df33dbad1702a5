//! Catalog browsing against a seeded database.
//!
//! Requires the API server and `cw-cli seed crates/cli/seed/catalog.yaml`.

#![allow(clippy::unwrap_used)]

use casawood_core::ProductCategory;
use casawood_integration_tests::TestClient;
use reqwest::StatusCode;

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_product_listing_is_paginated() {
    let (status, body) = TestClient::anonymous().get("/api/products?limit=2").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].as_array().unwrap().len() <= 2);
    assert_eq!(body["pagination"]["page"], 1);
    assert_eq!(body["pagination"]["limit"], 2);
    assert!(body["pagination"]["total"].as_i64().unwrap() >= 1);
}

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_every_category_filter_is_accepted() {
    let client = TestClient::anonymous();
    for category in ProductCategory::ALL {
        let (status, body) = client
            .get(&format!("/api/products?category={category}"))
            .await;
        assert_eq!(status, StatusCode::OK, "{category}");
        for product in body["data"].as_array().unwrap() {
            assert_eq!(product["category"], category.as_str());
        }
    }
}

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_price_sort_ascending() {
    let (_, body) = TestClient::anonymous()
        .get("/api/products?sort=price_asc&limit=50")
        .await;
    let prices: Vec<f64> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["price"].as_str().unwrap().parse().unwrap())
        .collect();
    assert!(prices.windows(2).all(|w| w[0] <= w[1]), "{prices:?}");
}

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_unknown_product_is_404() {
    let (status, body) = TestClient::anonymous().get("/api/products/99999999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Product not found");
}

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_fabrics_and_categories() {
    let client = TestClient::anonymous();

    let (status, body) = client.get("/api/fabrics?type=velvet").await;
    assert_eq!(status, StatusCode::OK);
    for fabric in body["data"].as_array().unwrap() {
        assert_eq!(fabric["type"], "velvet");
    }

    let (status, body) = client.get("/api/categories").await;
    assert_eq!(status, StatusCode::OK);
    let slug = body["data"][0]["slug"].as_str().unwrap().to_string();

    let (status, body) = client.get(&format!("/api/categories/{slug}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["slug"], slug);
}

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_catalog_writes_require_admin() {
    let user = TestClient::register("Not An Admin").await;
    let (status, _) = user
        .post(
            "/api/fabrics",
            serde_json::json!({"name": "Rust Velvet", "type": "velvet", "color": "Rust"}),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
