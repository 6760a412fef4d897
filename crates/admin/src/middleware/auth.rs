//! Authentication extractors for admin.
//!
//! Every dashboard page takes [`RequireAdminAuth`]. Visitors without a
//! session are sent to the login page with the page they wanted as
//! `callback_url`; a session whose role lost dashboard access is sent back
//! with `error=unauthorized`.

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::models::{CurrentAdmin, session_keys};

/// Login page path.
pub const LOGIN_PATH: &str = "/auth/login";

/// Extractor that requires a logged-in admin or owner.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAdminAuth(admin): RequireAdminAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", admin.email)
/// }
/// ```
pub struct RequireAdminAuth(pub CurrentAdmin);

/// Rejection for [`RequireAdminAuth`]: always a redirect to the login page.
#[derive(Debug)]
pub struct AdminAuthRejection(String);

impl AdminAuthRejection {
    /// Redirect target, for tests.
    #[must_use]
    pub fn location(&self) -> &str {
        &self.0
    }
}

impl IntoResponse for AdminAuthRejection {
    fn into_response(self) -> Response {
        Redirect::to(&self.0).into_response()
    }
}

/// Login URL that returns to `callback` after a successful login.
#[must_use]
pub fn login_redirect(callback: &str) -> String {
    if callback.is_empty() || callback == "/" {
        return LOGIN_PATH.to_string();
    }
    format!(
        "{LOGIN_PATH}?callback_url={}",
        urlencoding::encode(callback)
    )
}

async fn session_admin(session: &Session) -> Option<CurrentAdmin> {
    session
        .get::<CurrentAdmin>(session_keys::CURRENT_ADMIN)
        .await
        .ok()
        .flatten()
}

impl<S> FromRequestParts<S> for RequireAdminAuth
where
    S: Send + Sync,
{
    type Rejection = AdminAuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let callback = parts
            .uri
            .path_and_query()
            .map_or("/", axum::http::uri::PathAndQuery::as_str);

        let Some(session) = parts.extensions.get::<Session>() else {
            tracing::error!("Session layer missing from admin router");
            return Err(AdminAuthRejection(login_redirect(callback)));
        };

        let admin = session_admin(session)
            .await
            .ok_or_else(|| AdminAuthRejection(login_redirect(callback)))?;

        if !admin.role.can_access_dashboard() {
            tracing::warn!(email = %admin.email, role = %admin.role, "Session role lacks dashboard access");
            return Err(AdminAuthRejection(format!(
                "{LOGIN_PATH}?error=unauthorized"
            )));
        }

        Ok(Self(admin))
    }
}

/// Extractor that optionally gets the current admin.
///
/// Unlike `RequireAdminAuth`, this never rejects the request.
pub struct OptionalAdminAuth(pub Option<CurrentAdmin>);

impl<S> FromRequestParts<S> for OptionalAdminAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let admin = match parts.extensions.get::<Session>() {
            Some(session) => session_admin(session).await,
            None => None,
        };
        Ok(Self(admin))
    }
}

/// Helper to set the current admin in the session.
///
/// The session id is cycled first so a pre-login cookie cannot be reused.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_admin(
    session: &Session,
    admin: &CurrentAdmin,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_ADMIN, admin).await
}

/// Helper to clear the current admin from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_admin(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use axum::http::Request;
    use painboul_core::AdminRole;
    use tower_sessions::MemoryStore;

    use super::*;

    fn parts_with(session: Option<Session>, uri: &str) -> Parts {
        let mut request = Request::builder().uri(uri).body(()).unwrap();
        if let Some(session) = session {
            request.extensions_mut().insert(session);
        }
        request.into_parts().0
    }

    fn new_session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    #[test]
    fn test_login_redirect_encodes_callback() {
        assert_eq!(
            login_redirect("/orders?status=PENDING"),
            "/auth/login?callback_url=%2Forders%3Fstatus%3DPENDING"
        );
        assert_eq!(login_redirect("/"), "/auth/login");
    }

    #[tokio::test]
    async fn test_anonymous_request_redirects_with_callback() {
        let mut parts = parts_with(Some(new_session()), "/products");
        let rejection = RequireAdminAuth::from_request_parts(&mut parts, &())
            .await
            .err()
            .unwrap();
        assert_eq!(rejection.location(), "/auth/login?callback_url=%2Fproducts");
    }

    #[tokio::test]
    async fn test_owner_is_admitted() {
        let session = new_session();
        let owner = CurrentAdmin {
            id: Some(1),
            email: "owner@painboule.mg".to_string(),
            role: AdminRole::Owner,
        };
        session
            .insert(session_keys::CURRENT_ADMIN, &owner)
            .await
            .unwrap();

        let mut parts = parts_with(Some(session), "/");
        let RequireAdminAuth(admin) = RequireAdminAuth::from_request_parts(&mut parts, &())
            .await
            .ok()
            .unwrap();
        assert_eq!(admin, owner);
    }

    #[tokio::test]
    async fn test_other_role_is_refused() {
        let session = new_session();
        session
            .insert(
                session_keys::CURRENT_ADMIN,
                &CurrentAdmin {
                    id: None,
                    email: "baker@painboule.mg".to_string(),
                    role: AdminRole::Other("baker".to_string()),
                },
            )
            .await
            .unwrap();

        let mut parts = parts_with(Some(session), "/orders");
        let rejection = RequireAdminAuth::from_request_parts(&mut parts, &())
            .await
            .err()
            .unwrap();
        assert_eq!(rejection.location(), "/auth/login?error=unauthorized");
    }
}
