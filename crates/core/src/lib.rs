//! Pain Boulé Core - Shared domain types.
//!
//! This crate provides the types used across all Pain Boulé components:
//! - `storefront` - Public bakery site (menu, blog, cart, checkout)
//! - `admin` - Dashboard for products, categories and orders
//! - `cli` - Command-line tools for session-store migrations
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no database
//! access, no HTTP clients. The backend API owns every durable record; these
//! types mirror its JSON payloads.
//!
//! # Modules
//!
//! - [`types`] - Ids, prices, emails, statuses, catalog/customer/order records
//!   and the cart

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
