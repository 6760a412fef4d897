//! Customer lookup by email.

use tracing::instrument;

use painboul_core::{Customer, Email};

use crate::backend::StoreBackend;

/// Find an existing customer for the email typed into the checkout form.
///
/// Returns `None` for an unparseable email (no backend call), for an
/// unknown email, and when the backend call fails. A failure only means the
/// order will create a new customer, so it is logged and swallowed.
#[instrument(skip(backend, email))]
pub async fn lookup_customer<B>(backend: &B, email: &str) -> Option<Customer>
where
    B: StoreBackend + ?Sized,
{
    let email = Email::parse(email).ok()?;

    match backend.find_customer_by_email(&email).await {
        Ok(Some(customer)) => {
            tracing::debug!(customer_id = %customer.id, "Existing customer matched");
            Some(customer)
        }
        Ok(None) => None,
        Err(e) => {
            tracing::warn!(error = %e, "Customer lookup failed, treating as new customer");
            None
        }
    }
}
