//! Checkout: form validation, debounced customer lookup, order submission.

pub mod debounce;
pub mod form;
pub mod lookup;
pub mod remembered;
pub mod submit;

pub use debounce::LookupDebouncer;
pub use form::{CheckoutForm, FieldError, FieldErrors};
pub use lookup::lookup_customer;
pub use remembered::{RememberedCustomer, RememberedCustomers};
pub use submit::submit_order;

use thiserror::Error;

use crate::backend::BackendError;

/// Why an order could not be placed.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The cart has no valid line to order.
    #[error("nothing to order")]
    EmptyCart,

    /// Required form fields are missing or malformed.
    #[error("{0}")]
    Invalid(FieldErrors),

    /// Creating or updating the customer failed.
    #[error("could not save customer: {0}")]
    SaveCustomer(#[source] BackendError),

    /// The backend saved the customer but returned no id.
    #[error("backend returned a customer without an id")]
    MissingCustomerId,

    /// Creating the order failed.
    #[error("could not create order: {0}")]
    CreateOrder(#[source] BackendError),
}

impl CheckoutError {
    /// Whether resubmitting the same form may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::SaveCustomer(_) | Self::MissingCustomerId | Self::CreateOrder(_)
        )
    }

    /// Message shown to the visitor.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::EmptyCart => "Your cart is empty. Add something from the menu first.",
            Self::Invalid(_) => "Please fill in the highlighted fields.",
            Self::SaveCustomer(_) | Self::MissingCustomerId | Self::CreateOrder(_) => {
                "We could not place your order. Please try again in a moment."
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(!CheckoutError::EmptyCart.is_retryable());
        assert!(!CheckoutError::Invalid(FieldErrors::default()).is_retryable());
        assert!(
            CheckoutError::CreateOrder(BackendError::NotFound("orders".to_string()))
                .is_retryable()
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(CheckoutError::EmptyCart.to_string(), "nothing to order");
        let err = CheckoutError::SaveCustomer(BackendError::Status {
            status: 400,
            body: "bad phone".to_string(),
        });
        assert_eq!(
            err.to_string(),
            "could not save customer: Backend returned 400: bad phone"
        );
    }
}
