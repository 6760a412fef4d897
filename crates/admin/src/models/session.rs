//! Session-related types for admin authentication.

use serde::{Deserialize, Serialize};

use painboul_core::AdminRole;

use crate::backend::AuthenticatedUser;

/// Session-stored admin identity.
///
/// Copied from the backend's login answer; the backend is not asked again
/// until the session expires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentAdmin {
    /// Backend user id, when the backend reports one.
    pub id: Option<i64>,
    pub email: String,
    pub role: AdminRole,
}

impl CurrentAdmin {
    /// Identifier for Sentry and logs: the id if known, else the email.
    #[must_use]
    pub fn sentry_id(&self) -> String {
        self.id
            .map_or_else(|| self.email.clone(), |id| id.to_string())
    }
}

impl From<AuthenticatedUser> for CurrentAdmin {
    fn from(user: AuthenticatedUser) -> Self {
        Self {
            id: user.id,
            email: user.email,
            role: user.role,
        }
    }
}

/// Session keys for admin authentication data.
pub mod keys {
    /// Key for storing the current logged-in admin.
    pub const CURRENT_ADMIN: &str = "current_admin";
}
