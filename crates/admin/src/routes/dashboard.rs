//! Dashboard route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use painboul_core::{Order, OrderStatus};

use crate::middleware::RequireAdminAuth;
use crate::models::CurrentAdmin;
use crate::state::AppState;

/// Admin user view for templates.
#[derive(Debug, Clone)]
pub struct AdminUserView {
    pub email: String,
    pub role: String,
}

impl From<&CurrentAdmin> for AdminUserView {
    fn from(admin: &CurrentAdmin) -> Self {
        Self {
            email: admin.email.clone(),
            role: admin.role.to_string(),
        }
    }
}

/// Number of orders in one status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusCount {
    pub status: &'static str,
    pub label: &'static str,
    pub count: usize,
}

/// Count orders per status, in workflow order, zeros included.
#[must_use]
pub fn count_by_status(orders: &[Order]) -> Vec<StatusCount> {
    OrderStatus::ALL
        .into_iter()
        .map(|status| StatusCount {
            status: status.as_str(),
            label: status.label(),
            count: orders.iter().filter(|o| o.status == status).count(),
        })
        .collect()
}

/// Dashboard metrics. `None` means the backend could not be reached.
#[derive(Debug, Clone, Default)]
pub struct DashboardMetrics {
    pub products: Option<usize>,
    pub categories: Option<usize>,
    pub orders: Option<usize>,
    pub by_status: Vec<StatusCount>,
}

/// Dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub metrics: DashboardMetrics,
}

/// Dashboard overview.
#[instrument(skip(admin, state))]
pub async fn index(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let backend = state.backend();
    let (products, categories, orders) = tokio::join!(
        backend.list_products(),
        backend.list_categories(),
        backend.list_orders()
    );

    let mut metrics = DashboardMetrics::default();
    match products {
        Ok(products) => metrics.products = Some(products.len()),
        Err(e) => tracing::warn!(error = %e, "Failed to count products"),
    }
    match categories {
        Ok(categories) => metrics.categories = Some(categories.len()),
        Err(e) => tracing::warn!(error = %e, "Failed to count categories"),
    }
    match orders {
        Ok(orders) => {
            metrics.orders = Some(orders.len());
            metrics.by_status = count_by_status(&orders);
        }
        Err(e) => tracing::warn!(error = %e, "Failed to count orders"),
    }

    DashboardTemplate {
        admin_user: AdminUserView::from(&admin),
        current_path: "/".to_string(),
        metrics,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn order(id: i64, status: &str) -> Order {
        serde_json::from_value(serde_json::json!({ "id": id, "status": status })).unwrap()
    }

    #[test]
    fn test_count_by_status_includes_zeros() {
        let orders = vec![
            order(1, "PENDING"),
            order(2, "PENDING"),
            order(3, "READY"),
        ];
        let counts = count_by_status(&orders);

        assert_eq!(counts.len(), 6);
        assert_eq!(counts[0].status, "PENDING");
        assert_eq!(counts[0].count, 2);
        assert_eq!(
            counts.iter().find(|c| c.status == "READY").unwrap().count,
            1
        );
        assert_eq!(
            counts.iter().find(|c| c.status == "CANCELLED").unwrap().count,
            0
        );
    }
}
