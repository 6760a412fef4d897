//! Order management handlers.
//!
//! Orders arrive from the storefront as `PENDING`; the dashboard moves them
//! through the workflow or deletes them. The backend often answers with a
//! bare customer id, so rows are enriched with the customer's name and
//! contact before display.

use std::collections::HashMap;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect},
};
use futures::future::join_all;
use serde::Deserialize;
use tracing::instrument;

use painboul_core::{Customer, CustomerId, Order, OrderId, OrderStatus};

use super::dashboard::{AdminUserView, StatusCount, count_by_status};
use super::notice_message;
use crate::backend::AdminBackend;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdminAuth;
use crate::state::AppState;

// =============================================================================
// Query Parameters
// =============================================================================

/// Query parameters for the order list.
#[derive(Debug, Default, Deserialize)]
pub struct OrdersQuery {
    /// Status filter (`ALL` or a status wire name).
    pub status: Option<String>,
    /// Free-text search: customer name, email or order id.
    pub q: Option<String>,
    pub notice: Option<String>,
}

impl OrdersQuery {
    /// The status filter; `ALL`, blank or unknown values mean no filter.
    #[must_use]
    pub fn status_filter(&self) -> Option<OrderStatus> {
        self.status.as_deref()?.parse().ok()
    }

    #[must_use]
    pub fn search(&self) -> &str {
        self.q.as_deref().map_or("", str::trim)
    }
}

/// Status change form data.
#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: String,
}

// =============================================================================
// Views
// =============================================================================

/// Order line for display.
#[derive(Debug, Clone)]
pub struct OrderItemView {
    pub name: String,
    pub quantity: u32,
    pub price: String,
    pub line_total: String,
}

/// Order row for the listing and detail pages.
#[derive(Debug, Clone)]
pub struct OrderView {
    pub id: i64,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub date: String,
    pub status: &'static str,
    pub status_label: &'static str,
    pub total: String,
    pub item_count: u32,
    pub items: Vec<OrderItemView>,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id.as_i64(),
            customer_name: display_customer_name(order),
            customer_email: order.customer_email.clone().unwrap_or_default(),
            customer_phone: order.customer_phone.clone().unwrap_or_default(),
            date: order
                .order_date
                .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default(),
            status: order.status.as_str(),
            status_label: order.status.label(),
            total: order.total_amount.display(),
            item_count: order.item_count(),
            items: order
                .items
                .iter()
                .map(|item| OrderItemView {
                    name: item.name.clone(),
                    quantity: item.quantity,
                    price: item.price.display(),
                    line_total: item.line_total().display(),
                })
                .collect(),
        }
    }
}

/// Status option for the filter and status selects.
#[derive(Debug, Clone)]
pub struct StatusOption {
    pub value: &'static str,
    pub label: &'static str,
}

fn status_options() -> Vec<StatusOption> {
    OrderStatus::ALL
        .into_iter()
        .map(|s| StatusOption {
            value: s.as_str(),
            label: s.label(),
        })
        .collect()
}

// =============================================================================
// Enrichment and filtering
// =============================================================================

/// Customer name shown for an order, "Customer #id" when unknown.
#[must_use]
pub fn display_customer_name(order: &Order) -> String {
    match (order.customer_name.as_deref().map(str::trim), order.customer_id) {
        (Some(name), _) if !name.is_empty() => name.to_string(),
        (_, Some(id)) => format!("Customer #{id}"),
        _ => "Customer #unknown".to_string(),
    }
}

/// Fill in customer name, email and phone for orders that only carry a
/// customer id. Each customer is fetched once; failures keep the order as is.
pub async fn enrich_customers<B>(backend: &B, orders: &mut [Order])
where
    B: AdminBackend + ?Sized,
{
    let mut missing: Vec<CustomerId> = orders
        .iter()
        .filter(|o| o.customer_name.as_deref().is_none_or(|n| n.trim().is_empty()))
        .filter_map(|o| o.customer_id)
        .collect();
    missing.sort_unstable();
    missing.dedup();
    if missing.is_empty() {
        return;
    }

    let fetched = join_all(missing.iter().map(|&id| backend.get_customer(id))).await;
    let customers: HashMap<CustomerId, Customer> = missing
        .into_iter()
        .zip(fetched)
        .filter_map(|(id, result)| match result {
            Ok(customer) => Some((id, customer)),
            Err(e) => {
                tracing::warn!(customer_id = %id, error = %e, "Failed to fetch order customer");
                None
            }
        })
        .collect();

    for order in orders.iter_mut() {
        let Some(customer) = order.customer_id.and_then(|id| customers.get(&id)) else {
            continue;
        };
        if order.customer_name.as_deref().is_none_or(|n| n.trim().is_empty()) {
            order.customer_name = Some(customer.full_name()).filter(|n| !n.is_empty());
        }
        order.customer_email.get_or_insert_with(|| customer.email.clone());
        order.customer_phone.get_or_insert_with(|| customer.phone.clone());
    }
}

/// Keep the orders matching the status filter and the search text.
///
/// The search matches the customer name or email (ignoring case) or the
/// exact order id, with or without a leading `#`.
#[must_use]
pub fn filter_orders(orders: Vec<Order>, status: Option<OrderStatus>, search: &str) -> Vec<Order> {
    let needle = search.trim().to_lowercase();
    let wanted_id = needle.trim_start_matches('#').parse::<i64>().ok();

    orders
        .into_iter()
        .filter(|o| status.is_none_or(|s| o.status == s))
        .filter(|o| {
            if needle.is_empty() {
                return true;
            }
            let contains = |field: Option<&str>| {
                field.is_some_and(|value| value.to_lowercase().contains(&needle))
            };
            wanted_id == Some(o.id.as_i64())
                || contains(o.customer_name.as_deref())
                || contains(o.customer_email.as_deref())
        })
        .collect()
}

// =============================================================================
// Templates
// =============================================================================

/// Orders list page template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/index.html")]
pub struct OrdersIndexTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub notice: Option<&'static str>,
    pub orders: Vec<OrderView>,
    pub counts: Vec<StatusCount>,
    pub status_options: Vec<StatusOption>,
    /// Selected status filter, `ALL` when none.
    pub status_filter: &'static str,
    pub search_value: String,
    pub load_failed: bool,
}

/// Order detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/show.html")]
pub struct OrderShowTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub notice: Option<&'static str>,
    pub order: OrderView,
    pub status_options: Vec<StatusOption>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Orders list page handler.
#[instrument(skip(admin, state))]
pub async fn index(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Query(query): Query<OrdersQuery>,
) -> impl IntoResponse {
    let status = query.status_filter();

    let (orders, counts, load_failed) = match state.backend().list_orders().await {
        Ok(mut orders) => {
            enrich_customers(state.backend(), &mut orders).await;
            let counts = count_by_status(&orders);
            let orders = filter_orders(orders, status, query.search());
            (orders.iter().map(OrderView::from).collect(), counts, false)
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to fetch orders");
            (Vec::new(), Vec::new(), true)
        }
    };

    OrdersIndexTemplate {
        admin_user: AdminUserView::from(&admin),
        current_path: "/orders".to_string(),
        notice: notice_message(query.notice.as_deref()),
        orders,
        counts,
        status_options: status_options(),
        status_filter: status.map_or("ALL", |s| s.as_str()),
        search_value: query.search().to_string(),
        load_failed,
    }
}

/// Query parameters for the detail page.
#[derive(Debug, Default, Deserialize)]
pub struct ShowQuery {
    pub notice: Option<String>,
}

/// Order detail page handler.
///
/// The backend has no single-order endpoint; the order is picked from the
/// full list.
#[instrument(skip(admin, state, query))]
pub async fn show(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<ShowQuery>,
) -> Result<impl IntoResponse> {
    let order = state
        .backend()
        .list_orders()
        .await?
        .into_iter()
        .find(|o| o.id == OrderId::new(id))
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;

    let mut single = [order];
    enrich_customers(state.backend(), &mut single).await;
    let [order] = single;

    Ok(OrderShowTemplate {
        admin_user: AdminUserView::from(&admin),
        current_path: "/orders".to_string(),
        notice: notice_message(query.notice.as_deref()),
        order: OrderView::from(&order),
        status_options: status_options(),
    })
}

/// Change an order's status.
///
/// Values outside the six known statuses are refused without calling the
/// backend.
#[instrument(skip(_admin, state, form))]
pub async fn update_status(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<StatusForm>,
) -> Redirect {
    let Ok(status) = form.status.parse::<OrderStatus>() else {
        tracing::warn!(status = %form.status, "Rejected unknown order status");
        return Redirect::to(&format!("/orders/{id}?notice=invalid_status"));
    };

    match state
        .backend()
        .update_order_status(OrderId::new(id), status)
        .await
    {
        Ok(()) => {
            tracing::info!(order_id = id, status = %status, "Order status updated");
            Redirect::to(&format!("/orders/{id}?notice=status_updated"))
        }
        Err(e) if e.is_not_found() => Redirect::to("/orders?notice=already_deleted"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to update order status");
            Redirect::to(&format!("/orders/{id}?notice=failed"))
        }
    }
}

/// Delete an order. A 404 from the backend means someone else already did.
#[instrument(skip(_admin, state))]
pub async fn delete(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Redirect {
    match state.backend().delete_order(OrderId::new(id)).await {
        Ok(()) => {
            tracing::info!(order_id = id, "Order deleted");
            Redirect::to("/orders?notice=deleted")
        }
        Err(e) if e.is_not_found() => Redirect::to("/orders?notice=already_deleted"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to delete order");
            Redirect::to("/orders?notice=failed")
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use mockall::predicate::eq;

    use super::*;
    use crate::backend::{BackendError, MockAdminBackend};

    fn order(value: serde_json::Value) -> Order {
        serde_json::from_value(value).unwrap()
    }

    fn customer(id: i64) -> Customer {
        serde_json::from_value(serde_json::json!({
            "idCustomer": id,
            "firstName": "Hery",
            "lastName": "Rakoto",
            "email": "hery@example.mg",
            "phone": "034 11 222 33"
        }))
        .unwrap()
    }

    fn sample_orders() -> Vec<Order> {
        vec![
            order(serde_json::json!({"id": 1, "status": "PENDING", "customerName": "Hery Rakoto", "customerEmail": "hery@example.mg"})),
            order(serde_json::json!({"idOrder": 2, "status": "READY", "customerName": "Voahangy", "customerEmail": "voa@example.mg"})),
            order(serde_json::json!({"id": 13, "status": "PENDING", "customerId": 4})),
        ]
    }

    #[test]
    fn test_filter_by_status() {
        let filtered = filter_orders(sample_orders(), Some(OrderStatus::Pending), "");
        assert_eq!(filtered.len(), 2);
    }

    #[test]
    fn test_search_by_name_email_or_id() {
        let by_name = filter_orders(sample_orders(), None, "rakoto");
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].id, OrderId::new(1));

        let by_email = filter_orders(sample_orders(), None, "VOA@");
        assert_eq!(by_email[0].id, OrderId::new(2));

        let by_id = filter_orders(sample_orders(), None, "#13");
        assert_eq!(by_id.len(), 1);
        assert_eq!(by_id[0].id, OrderId::new(13));
    }

    #[test]
    fn test_status_filter_parsing() {
        let query = OrdersQuery {
            status: Some("ALL".to_string()),
            ..OrdersQuery::default()
        };
        assert_eq!(query.status_filter(), None);

        let query = OrdersQuery {
            status: Some("preparing".to_string()),
            ..OrdersQuery::default()
        };
        assert_eq!(query.status_filter(), Some(OrderStatus::Preparing));
    }

    #[test]
    fn test_display_name_falls_back_to_customer_id() {
        let orders = sample_orders();
        assert_eq!(display_customer_name(&orders[0]), "Hery Rakoto");
        assert_eq!(display_customer_name(&orders[2]), "Customer #4");
        let anonymous = order(serde_json::json!({"id": 9}));
        assert_eq!(display_customer_name(&anonymous), "Customer #unknown");
    }

    #[tokio::test]
    async fn test_enrich_fetches_each_customer_once() {
        let mut backend = MockAdminBackend::new();
        backend
            .expect_get_customer()
            .with(eq(CustomerId::new(4)))
            .times(1)
            .returning(|id| Ok(customer(id.as_i64())));

        let mut orders = sample_orders();
        orders.push(order(serde_json::json!({"id": 14, "customerId": 4})));
        enrich_customers(&backend, &mut orders).await;

        assert_eq!(orders[2].customer_name.as_deref(), Some("Hery Rakoto"));
        assert_eq!(orders[2].customer_phone.as_deref(), Some("034 11 222 33"));
        assert_eq!(orders[3].customer_email.as_deref(), Some("hery@example.mg"));
        // Orders that already carried a name are untouched
        assert_eq!(orders[1].customer_name.as_deref(), Some("Voahangy"));
    }

    #[tokio::test]
    async fn test_enrich_keeps_order_when_lookup_fails() {
        let mut backend = MockAdminBackend::new();
        backend
            .expect_get_customer()
            .returning(|id| Err(BackendError::NotFound(format!("customer {id}"))));

        let mut orders = sample_orders();
        enrich_customers(&backend, &mut orders).await;

        assert_eq!(orders[2].customer_name, None);
        assert_eq!(OrderView::from(&orders[2]).customer_name, "Customer #4");
    }
}
