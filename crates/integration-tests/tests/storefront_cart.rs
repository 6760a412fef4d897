//! Cart fragments served by the storefront.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;

use reqwest::StatusCode;

use painboul_integration_tests::{FakeStoreBackend, client, product, spawn_storefront};

#[tokio::test]
async fn test_cart_lifecycle() {
    let backend = Arc::new(FakeStoreBackend::new(vec![
        product(7, "Croissant", 4000),
        product(9, "Pain au chocolat", 5000),
    ]));
    let base = spawn_storefront(backend).await;
    let client = client();

    // Adding the same product twice merges the line
    for _ in 0..2 {
        client
            .post(format!("{base}/cart/add"))
            .form(&[("product_id", "7")])
            .send()
            .await
            .unwrap();
    }
    client
        .post(format!("{base}/cart/add"))
        .form(&[("product_id", "9"), ("quantity", "3")])
        .send()
        .await
        .unwrap();

    let drawer = client
        .get(format!("{base}/cart"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(drawer.contains("Croissant"));
    assert!(drawer.contains("23000 Ar"));

    // Quantity zero removes the line
    let resp = client
        .post(format!("{base}/cart/update"))
        .form(&[("product_id", "9"), ("quantity", "0")])
        .send()
        .await
        .unwrap();
    assert_eq!(
        resp.headers().get("HX-Trigger").unwrap().to_str().unwrap(),
        "cart-updated"
    );
    let drawer = resp.text().await.unwrap();
    assert!(!drawer.contains("Pain au chocolat"));
    assert!(drawer.contains("8000 Ar"));

    let drawer = client
        .post(format!("{base}/cart/clear"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(!drawer.contains("Croissant"));
}

#[tokio::test]
async fn test_unknown_product_is_not_added() {
    let backend = Arc::new(FakeStoreBackend::new(vec![product(7, "Croissant", 4000)]));
    let base = spawn_storefront(backend).await;
    let client = client();

    let resp = client
        .post(format!("{base}/cart/add"))
        .form(&[("product_id", "404")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let count = client
        .get(format!("{base}/cart/count"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(!count.contains("badge"));
}

#[tokio::test]
async fn test_carts_are_per_visitor() {
    let backend = Arc::new(FakeStoreBackend::new(vec![product(7, "Croissant", 4000)]));
    let base = spawn_storefront(backend).await;
    let alice = client();
    let bob = client();

    alice
        .post(format!("{base}/cart/add"))
        .form(&[("product_id", "7")])
        .send()
        .await
        .unwrap();

    let bob_count = bob
        .get(format!("{base}/cart/count"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(!bob_count.contains("badge"));
}

#[tokio::test]
async fn test_health_and_request_id() {
    let base = spawn_storefront(Arc::new(FakeStoreBackend::new(Vec::new()))).await;
    let resp = client()
        .get(format!("{base}/health"))
        .header("x-request-id", "abc-123")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get("x-request-id").unwrap().to_str().unwrap(),
        "abc-123"
    );
}
