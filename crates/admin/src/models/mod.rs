//! Domain models for admin.
//!
//! Catalog and order records come from `painboul-core`; this module holds
//! only what the dashboard keeps in its own session.

pub mod session;

pub use session::{CurrentAdmin, keys as session_keys};
