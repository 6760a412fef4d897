//! Authentication route handlers for admin.
//!
//! The bakery backend checks the email and password; only the `admin` and
//! `owner` roles it reports may enter the dashboard.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use secrecy::SecretString;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::backend::BackendError;
use crate::error::{clear_sentry_user, set_sentry_user};
use crate::middleware::{OptionalAdminAuth, clear_current_admin, set_current_admin};
use crate::models::CurrentAdmin;
use crate::state::AppState;

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginPageTemplate {
    pub email: String,
    pub callback_url: String,
    pub error: Option<&'static str>,
}

/// Query parameters accepted by the login page.
#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    pub callback_url: Option<String>,
    pub error: Option<String>,
}

/// Login form data.
#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub callback_url: String,
}

/// Build the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/login", get(login_page).post(login))
        .route("/auth/logout", post(logout))
}

/// Where to go after login: the requested page if it is a same-site
/// relative path, the dashboard otherwise.
#[must_use]
pub fn safe_callback(raw: Option<&str>) -> &str {
    match raw.map(str::trim) {
        Some(path)
            if path.starts_with('/')
                && !path.starts_with("//")
                && !path.contains('\\')
                && !path.starts_with("/auth/") =>
        {
            path
        }
        _ => "/",
    }
}

fn error_message(code: Option<&str>) -> Option<&'static str> {
    match code? {
        "unauthorized" => Some("This account is not allowed to use the dashboard."),
        "invalid" => Some("Invalid email or password."),
        "unavailable" => Some("The bakery backend is unavailable. Please try again."),
        _ => None,
    }
}

/// Render the login page.
///
/// GET /auth/login
#[instrument(skip(admin, query))]
pub async fn login_page(
    OptionalAdminAuth(admin): OptionalAdminAuth,
    Query(query): Query<LoginQuery>,
) -> Response {
    let callback_url = safe_callback(query.callback_url.as_deref()).to_string();

    // Already signed in: no reason to show the form again.
    if admin.is_some_and(|a| a.role.can_access_dashboard()) {
        return Redirect::to(&callback_url).into_response();
    }

    LoginPageTemplate {
        email: String::new(),
        callback_url,
        error: error_message(query.error.as_deref()),
    }
    .into_response()
}

/// Check credentials with the backend and start the session.
///
/// POST /auth/login
#[instrument(skip(state, session, form), fields(email = %form.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    let email = form.email.trim().to_string();
    let password = SecretString::from(form.password);
    let callback_url = safe_callback(Some(&form.callback_url)).to_string();

    let rerender = |status: StatusCode, code: &str| {
        (
            status,
            LoginPageTemplate {
                email: email.clone(),
                callback_url: callback_url.clone(),
                error: error_message(Some(code)),
            },
        )
            .into_response()
    };

    let user = match state.backend().login(&email, &password).await {
        Ok(user) => user,
        Err(BackendError::InvalidCredentials) => {
            tracing::info!("Login rejected by backend");
            return rerender(StatusCode::UNAUTHORIZED, "invalid");
        }
        Err(e) => {
            tracing::error!(error = %e, "Login request failed");
            return rerender(StatusCode::BAD_GATEWAY, "unavailable");
        }
    };

    if !user.role.can_access_dashboard() {
        tracing::warn!(role = %user.role, "Login refused for role");
        return Redirect::to("/auth/login?error=unauthorized").into_response();
    }

    let admin = CurrentAdmin::from(user);
    if let Err(e) = set_current_admin(&session, &admin).await {
        tracing::error!(error = %e, "Failed to store admin session");
        return rerender(StatusCode::INTERNAL_SERVER_ERROR, "unavailable");
    }
    set_sentry_user(&admin.sentry_id(), &admin.email);
    tracing::info!(role = %admin.role, "Admin logged in");

    Redirect::to(&callback_url).into_response()
}

/// Logout and clear session.
///
/// POST /auth/logout
#[instrument(skip(session))]
pub async fn logout(session: Session) -> impl IntoResponse {
    if let Err(e) = clear_current_admin(&session).await {
        tracing::warn!(error = %e, "Failed to clear admin session");
    }
    clear_sentry_user();
    Redirect::to("/auth/login")
}
