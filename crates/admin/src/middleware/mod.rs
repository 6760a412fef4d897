//! HTTP middleware for admin.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request span with status and latency)
//! 3. Session layer (tower-sessions, `admin.session` table)
//! 4. Auth extractors in handlers ([`RequireAdminAuth`])

pub mod auth;
pub mod session;

pub use auth::{
    OptionalAdminAuth, RequireAdminAuth, clear_current_admin, login_redirect,
    set_current_admin,
};
pub use session::{SessionStoreError, admin_session_store, create_session_layer};
