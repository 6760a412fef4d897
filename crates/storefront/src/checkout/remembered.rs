//! Customers matched by the checkout email lookup.
//!
//! A match is held in memory keyed by the visitor's checkout token, never in
//! the session. The lookup handler awaits the debounce interval with the
//! session already loaded; writing it afterwards would save that stale copy
//! over whatever the visitor did meanwhile, such as placing the order.

use std::time::Duration;

use moka::future::Cache;

use painboul_core::{Customer, CustomerId};

/// How long a match survives without the visitor touching the checkout.
const IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Upper bound on checkout forms tracked at once.
const MAX_FORMS: u64 = 10_000;

/// Customer matched by the checkout email lookup.
///
/// Remembered between the lookup and the order submission so that the
/// submission updates this record instead of creating a duplicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RememberedCustomer {
    /// Backend id of the matched customer.
    pub id: CustomerId,
    /// Email the match was made on.
    pub email: String,
}

impl RememberedCustomer {
    /// Whether this match still applies to the email now in the form.
    #[must_use]
    pub fn applies_to(&self, email: &str) -> bool {
        self.email.trim().eq_ignore_ascii_case(email.trim())
    }
}

impl From<&Customer> for RememberedCustomer {
    fn from(customer: &Customer) -> Self {
        Self {
            id: customer.id,
            email: customer.email.clone(),
        }
    }
}

/// Latest lookup match per checkout token.
#[derive(Clone)]
pub struct RememberedCustomers {
    cache: Cache<String, RememberedCustomer>,
}

impl Default for RememberedCustomers {
    fn default() -> Self {
        Self::new(IDLE_TIMEOUT)
    }
}

impl RememberedCustomers {
    #[must_use]
    pub fn new(idle_timeout: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(MAX_FORMS)
            .time_to_idle(idle_timeout)
            .build();
        Self { cache }
    }

    /// Record the outcome of a lookup: remember a match, forget otherwise.
    pub async fn record(&self, token: &str, found: Option<&Customer>) {
        match found {
            Some(customer) => {
                self.cache
                    .insert(token.to_string(), RememberedCustomer::from(customer))
                    .await;
            }
            None => self.cache.invalidate(token).await,
        }
    }

    pub async fn get(&self, token: &str) -> Option<RememberedCustomer> {
        self.cache.get(token).await
    }

    /// Drop the match once the order is placed.
    pub async fn forget(&self, token: &str) {
        self.cache.invalidate(token).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn customer(id: i64, email: &str) -> Customer {
        Customer {
            id: CustomerId::new(id),
            first_name: "Hery".to_string(),
            last_name: "Rakoto".to_string(),
            email: email.to_string(),
            phone: "034 11 222 33".to_string(),
            address: "Lot II A 12 Ivandry".to_string(),
        }
    }

    #[test]
    fn test_applies_to_ignores_case_and_whitespace() {
        let remembered = RememberedCustomer {
            id: CustomerId::new(5),
            email: "Hery@Example.mg".to_string(),
        };
        assert!(remembered.applies_to(" hery@example.mg "));
        assert!(!remembered.applies_to("other@example.mg"));
    }

    #[tokio::test]
    async fn test_miss_forgets_earlier_match() {
        let remembered = RememberedCustomers::default();
        remembered
            .record("form-1", Some(&customer(5, "hery@example.mg")))
            .await;
        assert_eq!(
            remembered.get("form-1").await.map(|r| r.id),
            Some(CustomerId::new(5))
        );

        remembered.record("form-1", None).await;
        assert_eq!(remembered.get("form-1").await, None);
    }

    #[tokio::test]
    async fn test_tokens_are_independent() {
        let remembered = RememberedCustomers::default();
        remembered
            .record("form-1", Some(&customer(5, "hery@example.mg")))
            .await;
        remembered
            .record("form-2", Some(&customer(6, "soa@example.mg")))
            .await;

        remembered.forget("form-1").await;
        assert_eq!(remembered.get("form-1").await, None);
        assert_eq!(
            remembered.get("form-2").await.map(|r| r.email),
            Some("soa@example.mg".to_string())
        );
    }
}
