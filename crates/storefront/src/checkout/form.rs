//! The checkout form and its validation.

use serde::Deserialize;

use painboul_core::{Customer, CustomerInput, Email};

/// Values posted by the checkout form.
///
/// Kept as raw strings so the form can be re-rendered exactly as typed
/// when validation or submission fails.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CheckoutForm {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub delivery_time: String,
    #[serde(default)]
    pub notes: String,
}

/// A validation problem tied to one form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

/// Every validation problem found in one submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    fn push(&mut self, field: &'static str, message: &'static str) {
        self.0.push(FieldError { field, message });
    }

    /// Message for `field`, if it failed.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&'static str> {
        self.0
            .iter()
            .find(|error| error.field == field)
            .map(|error| error.message)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let fields: Vec<&str> = self.0.iter().map(|error| error.field).collect();
        write!(f, "invalid fields: {}", fields.join(", "))
    }
}

impl CheckoutForm {
    /// Check every required field.
    ///
    /// First name, last name, email, phone, address and delivery time are
    /// required; the email must also parse. Notes are optional.
    ///
    /// # Errors
    ///
    /// Returns all problems found, not only the first.
    pub fn validate(&self) -> Result<Email, FieldErrors> {
        let mut errors = FieldErrors::default();

        let required = [
            ("first_name", &self.first_name, "First name is required"),
            ("last_name", &self.last_name, "Last name is required"),
            ("phone", &self.phone, "Phone number is required"),
            ("address", &self.address, "Delivery address is required"),
            ("delivery_time", &self.delivery_time, "Choose a delivery time"),
        ];
        for (field, value, message) in required {
            if value.trim().is_empty() {
                errors.push(field, message);
            }
        }

        let email = if self.email.trim().is_empty() {
            errors.push("email", "Email is required");
            None
        } else {
            match Email::parse(&self.email) {
                Ok(email) => Some(email),
                Err(_) => {
                    errors.push("email", "Enter a valid email address");
                    None
                }
            }
        };

        match email {
            Some(email) if errors.is_empty() => Ok(email),
            _ => Err(errors),
        }
    }

    /// Customer payload from the form's contact fields.
    #[must_use]
    pub fn customer_input(&self, email: &Email) -> CustomerInput {
        CustomerInput {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            email: email.as_str().to_string(),
            phone: self.phone.trim().to_string(),
            address: self.address.trim().to_string(),
        }
    }

    /// Overwrite the contact fields with a matched customer's record.
    ///
    /// Email, delivery time and notes are left as typed.
    pub fn apply_customer(&mut self, customer: &Customer) {
        self.first_name.clone_from(&customer.first_name);
        self.last_name.clone_from(&customer.last_name);
        self.phone.clone_from(&customer.phone);
        self.address.clone_from(&customer.address);
    }
}
