//! Order management through the admin dashboard.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;

use reqwest::{Client, Response, StatusCode};

use painboul_core::{AdminRole, CustomerId, OrderId, OrderStatus};
use painboul_integration_tests::{
    AdminCall, FakeAdminBackend, client, customer, order, spawn_admin,
};

fn location(resp: &Response) -> &str {
    resp.headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

async fn signed_in(backend: Arc<FakeAdminBackend>) -> (String, Client) {
    let base = spawn_admin(backend).await;
    let client = client();
    let resp = client
        .post(format!("{base}/auth/login"))
        .form(&[
            ("email", "owner@painboule.mg"),
            ("password", "croissant"),
            ("callback_url", "/"),
        ])
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_redirection());
    (base, client)
}

fn backend() -> Arc<FakeAdminBackend> {
    let mut named = order(1, OrderStatus::Pending, Some(9));
    named.customer_name = Some("Voahangy Ravelo".to_string());
    named.customer_email = Some("voa@example.mg".to_string());

    Arc::new(
        FakeAdminBackend::new()
            .with_account("owner@painboule.mg", "croissant", AdminRole::Owner)
            .with_customer(customer(4, "hery@example.mg"))
            .with_orders(vec![
                named,
                order(2, OrderStatus::Ready, Some(4)),
                order(3, OrderStatus::Pending, Some(77)),
            ]),
    )
}

#[tokio::test]
async fn test_list_enriches_customers() {
    let backend = backend();
    let (base, client) = signed_in(backend.clone()).await;

    let body = client
        .get(format!("{base}/orders"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("Voahangy Ravelo"));
    assert!(body.contains("Hery Rakoto"));
    // Customer 77 does not exist; the id is shown instead
    assert!(body.contains("Customer #77"));

    let lookups: Vec<_> = backend
        .calls()
        .into_iter()
        .filter(|c| matches!(c, AdminCall::GetCustomer(_)))
        .collect();
    assert_eq!(lookups.len(), 2);
    assert!(!lookups.contains(&AdminCall::GetCustomer(CustomerId::new(9))));
}

#[tokio::test]
async fn test_filter_and_search() {
    let (base, client) = signed_in(backend()).await;

    let body = client
        .get(format!("{base}/orders"))
        .query(&[("status", "READY")])
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("/orders/2\""));
    assert!(!body.contains("/orders/1\""));

    let body = client
        .get(format!("{base}/orders"))
        .query(&[("status", "ALL"), ("q", "voa@")])
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("/orders/1\""));
    assert!(!body.contains("/orders/3\""));
}

#[tokio::test]
async fn test_detail_page_and_missing_order() {
    let (base, client) = signed_in(backend()).await;

    let resp = client.get(format!("{base}/orders/2")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.unwrap();
    assert!(body.contains("Order #2"));
    assert!(body.contains("034 11 222 33"));

    let resp = client.get(format!("{base}/orders/999")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_status_update() {
    let backend = backend();
    let (base, client) = signed_in(backend.clone()).await;

    let resp = client
        .post(format!("{base}/orders/1/status"))
        .form(&[("status", "PREPARING")])
        .send()
        .await
        .unwrap();
    assert_eq!(location(&resp), "/orders/1?notice=status_updated");
    assert!(
        backend
            .calls()
            .contains(&AdminCall::UpdateStatus(OrderId::new(1), OrderStatus::Preparing))
    );
    assert_eq!(backend.orders()[0].status, OrderStatus::Preparing);
}

#[tokio::test]
async fn test_unknown_status_never_reaches_backend() {
    let backend = backend();
    let (base, client) = signed_in(backend.clone()).await;

    let resp = client
        .post(format!("{base}/orders/1/status"))
        .form(&[("status", "SHIPPED")])
        .send()
        .await
        .unwrap();
    assert_eq!(location(&resp), "/orders/1?notice=invalid_status");
    assert!(
        !backend
            .calls()
            .iter()
            .any(|c| matches!(c, AdminCall::UpdateStatus(..)))
    );
    assert_eq!(backend.orders()[0].status, OrderStatus::Pending);
}

#[tokio::test]
async fn test_delete_twice_reports_already_deleted() {
    let backend = backend();
    let (base, client) = signed_in(backend.clone()).await;

    let first = client
        .post(format!("{base}/orders/3/delete"))
        .send()
        .await
        .unwrap();
    assert_eq!(location(&first), "/orders?notice=deleted");

    let second = client
        .post(format!("{base}/orders/3/delete"))
        .send()
        .await
        .unwrap();
    assert_eq!(location(&second), "/orders?notice=already_deleted");
    assert_eq!(backend.orders().len(), 2);
}
