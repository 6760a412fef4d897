//! Order submission.

use chrono::Utc;
use tracing::instrument;

use painboul_core::{Customer, Email, NewOrder, Order};

use super::{CheckoutError, CheckoutForm, RememberedCustomer};
use crate::backend::StoreBackend;
use crate::cart::{CartRepository, CartStore};

/// Turn the cart and checkout form into an order.
///
/// Runs strictly in sequence:
///
/// 1. Check the cart has at least one valid line, then the required fields.
///    Nothing reaches the backend if either check fails.
/// 2. Save the customer: update `remembered` when it matches the form's
///    email, create a new customer otherwise.
/// 3. Create a `PENDING` order from the cart lines and total.
/// 4. Clear the cart.
///
/// The cart is left untouched on any error. A customer saved in step 2 is
/// not rolled back if step 3 fails.
///
/// # Errors
///
/// `EmptyCart` or `Invalid` for local validation failures, `SaveCustomer`
/// or `CreateOrder` when the backend call fails.
#[instrument(skip_all, fields(items = cart.total_items()))]
pub async fn submit_order<B, R>(
    backend: &B,
    cart: &mut CartStore<R>,
    form: &CheckoutForm,
    remembered: Option<&RememberedCustomer>,
) -> Result<Order, CheckoutError>
where
    B: StoreBackend + ?Sized,
    R: CartRepository,
{
    if !cart.cart().is_submittable() {
        return Err(CheckoutError::EmptyCart);
    }
    let email = form.validate().map_err(CheckoutError::Invalid)?;

    let customer = save_customer(backend, form, &email, remembered).await?;

    let order = NewOrder::from_cart(customer.id, cart.cart(), Utc::now());
    let created = backend
        .create_order(&order)
        .await
        .map_err(CheckoutError::CreateOrder)?;

    tracing::info!(
        order_id = %created.id,
        customer_id = %customer.id,
        total = %order.total_amount,
        "Order placed"
    );

    cart.clear().await;
    Ok(created)
}

async fn save_customer<B>(
    backend: &B,
    form: &CheckoutForm,
    email: &Email,
    remembered: Option<&RememberedCustomer>,
) -> Result<Customer, CheckoutError>
where
    B: StoreBackend + ?Sized,
{
    let input = form.customer_input(email);

    let result = match remembered.filter(|r| r.applies_to(email.as_str())) {
        Some(existing) => {
            tracing::debug!(customer_id = %existing.id, "Updating existing customer");
            backend.update_customer(existing.id, &input).await
        }
        None => backend.create_customer(&input).await,
    };

    let customer = result.map_err(CheckoutError::SaveCustomer)?;
    if !customer.id.is_assigned() {
        return Err(CheckoutError::MissingCustomerId);
    }
    Ok(customer)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use painboul_core::{CustomerId, OrderId, OrderStatus, Price, Product, ProductId};

    use super::*;
    use crate::backend::{BackendError, MockStoreBackend};
    use crate::cart::MemoryCartRepository;

    fn product(id: i64, name: &str, price: u64) -> Product {
        Product {
            id: ProductId::new(id),
            name: name.to_string(),
            description: None,
            price: Some(Price::from_ariary(price)),
            image: None,
            category_id: None,
            category_name: None,
        }
    }

    fn form() -> CheckoutForm {
        CheckoutForm {
            first_name: "Hery".to_string(),
            last_name: "Rakoto".to_string(),
            email: "hery@example.mg".to_string(),
            phone: "034 00 000 00".to_string(),
            address: "Ivandry".to_string(),
            delivery_time: "2026-10-20T08:00".to_string(),
            notes: String::new(),
        }
    }

    fn customer(id: i64) -> Customer {
        Customer {
            id: CustomerId::new(id),
            first_name: "Hery".to_string(),
            last_name: "Rakoto".to_string(),
            email: "hery@example.mg".to_string(),
            phone: "034 00 000 00".to_string(),
            address: "Ivandry".to_string(),
        }
    }

    fn created(order: &NewOrder) -> Order {
        Order {
            id: OrderId::new(42),
            customer_id: Some(order.customer_id),
            items: order.items.clone(),
            order_date: Some(order.order_date),
            status: order.status,
            total_amount: order.total_amount,
            customer_name: None,
            customer_email: None,
            customer_phone: None,
        }
    }

    async fn filled_cart(repo: &MemoryCartRepository) -> CartStore<MemoryCartRepository> {
        let mut cart = CartStore::load(repo.clone()).await;
        cart.add_item(product(7, "Croissant", 4000), 2).await;
        cart.add_item(product(12, "Tarte", 9500), 1).await;
        cart
    }

    #[tokio::test]
    async fn test_empty_cart_makes_no_backend_call() {
        // No expectations: any call panics.
        let backend = MockStoreBackend::new();
        let mut cart = CartStore::load(MemoryCartRepository::new()).await;

        let err = submit_order(&backend, &mut cart, &form(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::EmptyCart));
    }

    #[tokio::test]
    async fn test_cart_with_unassigned_product_is_rejected() {
        let backend = MockStoreBackend::new();
        let mut cart = CartStore::load(MemoryCartRepository::new()).await;
        cart.add_item(product(0, "Draft", 1000), 1).await;

        let err = submit_order(&backend, &mut cart, &form(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::EmptyCart));
        assert_eq!(cart.total_items(), 1);
    }

    #[tokio::test]
    async fn test_missing_fields_make_no_backend_call() {
        let backend = MockStoreBackend::new();
        let repo = MemoryCartRepository::new();
        let mut cart = filled_cart(&repo).await;
        let mut incomplete = form();
        incomplete.phone.clear();

        let err = submit_order(&backend, &mut cart, &incomplete, None)
            .await
            .unwrap_err();
        match err {
            CheckoutError::Invalid(errors) => assert!(errors.get("phone").is_some()),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_new_customer_is_created_then_order_placed() {
        let mut backend = MockStoreBackend::new();
        backend
            .expect_create_customer()
            .withf(|input| input.email == "hery@example.mg" && input.first_name == "Hery")
            .times(1)
            .returning(|_| Ok(customer(5)));
        backend.expect_update_customer().never();
        backend
            .expect_create_order()
            .withf(|order| {
                order.customer_id == CustomerId::new(5)
                    && order.status == OrderStatus::Pending
                    && order.total_amount == Price::from_ariary(17_500)
                    && order.items.len() == 2
            })
            .times(1)
            .returning(|order| Ok(created(order)));

        let repo = MemoryCartRepository::new();
        let mut cart = filled_cart(&repo).await;

        let order = submit_order(&backend, &mut cart, &form(), None)
            .await
            .unwrap();
        assert_eq!(order.id, OrderId::new(42));
        assert!(cart.cart().is_empty());
        assert!(CartStore::load(repo).await.cart().is_empty());
    }

    #[tokio::test]
    async fn test_remembered_customer_is_updated() {
        let mut backend = MockStoreBackend::new();
        backend.expect_create_customer().never();
        backend
            .expect_update_customer()
            .withf(|id, _| *id == CustomerId::new(5))
            .times(1)
            .returning(|_, _| Ok(customer(5)));
        backend
            .expect_create_order()
            .times(1)
            .returning(|order| Ok(created(order)));

        let repo = MemoryCartRepository::new();
        let mut cart = filled_cart(&repo).await;
        let remembered = RememberedCustomer {
            id: CustomerId::new(5),
            email: "HERY@example.mg".to_string(),
        };

        submit_order(&backend, &mut cart, &form(), Some(&remembered))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_stale_match_for_other_email_creates() {
        let mut backend = MockStoreBackend::new();
        backend.expect_update_customer().never();
        backend
            .expect_create_customer()
            .times(1)
            .returning(|_| Ok(customer(6)));
        backend
            .expect_create_order()
            .returning(|order| Ok(created(order)));

        let repo = MemoryCartRepository::new();
        let mut cart = filled_cart(&repo).await;
        let remembered = RememberedCustomer {
            id: CustomerId::new(5),
            email: "someone.else@example.mg".to_string(),
        };

        submit_order(&backend, &mut cart, &form(), Some(&remembered))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_order_failure_keeps_cart() {
        let mut backend = MockStoreBackend::new();
        backend
            .expect_create_customer()
            .returning(|_| Ok(customer(5)));
        backend.expect_create_order().returning(|_| {
            Err(BackendError::Status {
                status: 500,
                body: "database locked".to_string(),
            })
        });

        let repo = MemoryCartRepository::new();
        let mut cart = filled_cart(&repo).await;

        let err = submit_order(&backend, &mut cart, &form(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::CreateOrder(_)));
        assert!(err.is_retryable());
        assert_eq!(cart.total_items(), 3);
        assert_eq!(CartStore::load(repo).await.total_items(), 3);
    }

    #[tokio::test]
    async fn test_customer_failure_skips_order() {
        let mut backend = MockStoreBackend::new();
        backend.expect_create_customer().returning(|_| {
            Err(BackendError::Status {
                status: 400,
                body: "bad phone".to_string(),
            })
        });
        backend.expect_create_order().never();

        let repo = MemoryCartRepository::new();
        let mut cart = filled_cart(&repo).await;

        let err = submit_order(&backend, &mut cart, &form(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::SaveCustomer(_)));
        assert_eq!(cart.total_items(), 3);
    }

    #[tokio::test]
    async fn test_customer_without_id_aborts() {
        let mut backend = MockStoreBackend::new();
        backend
            .expect_create_customer()
            .returning(|_| Ok(customer(0)));
        backend.expect_create_order().never();

        let repo = MemoryCartRepository::new();
        let mut cart = filled_cart(&repo).await;

        let err = submit_order(&backend, &mut cart, &form(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::MissingCustomerId));
        assert!(err.is_retryable());
    }
}
