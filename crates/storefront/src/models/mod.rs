//! Session-held state for storefront visitors.

pub mod session;

pub use session as session_keys;
