//! Customer records.
//!
//! Customers are keyed by email on the backend; the storefront creates one on
//! first checkout and updates it on later checkouts.

use serde::{Deserialize, Serialize};

use super::id::CustomerId;

/// A customer as stored by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    #[serde(rename = "idCustomer")]
    pub id: CustomerId,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
}

impl Customer {
    /// "First Last", trimmed.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Payload for creating or updating a customer (the id travels in the URL).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_customer_from_backend_json() {
        let customer: Customer = serde_json::from_str(
            r#"{"idCustomer":5,"firstName":"Hery","lastName":"Rakoto","email":"hery@example.mg","phone":"034 00 000 00"}"#,
        )
        .unwrap();
        assert_eq!(customer.id, CustomerId::new(5));
        assert_eq!(customer.address, "");
        assert_eq!(customer.full_name(), "Hery Rakoto");
    }

    #[test]
    fn test_input_uses_camel_case() {
        let input = CustomerInput {
            first_name: "Hery".to_string(),
            last_name: "Rakoto".to_string(),
            email: "hery@example.mg".to_string(),
            phone: "034".to_string(),
            address: "Lot II".to_string(),
        };
        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json["firstName"], "Hery");
        assert_eq!(json["lastName"], "Rakoto");
        assert!(json.get("idCustomer").is_none());
    }
}
