//! Pain Boulé Admin library.
//!
//! The dashboard as a library, so the binary, the CLI and the integration
//! tests share one router.
//!
//! # Security
//!
//! Staff sign in with backend credentials. Only `ADMIN` and `OWNER` roles
//! get a session; every page except login and health requires one.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod backend;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;
