//! Core types for Pain Boulé.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod catalog;
pub mod customer;
pub mod email;
pub mod id;
pub mod order;
pub mod price;
pub mod status;

pub use cart::{Cart, CartItem};
pub use catalog::{BlogPost, Category, CategoryInput, Product, ProductInput};
pub use customer::{Customer, CustomerInput};
pub use email::{Email, EmailError};
pub use id::*;
pub use order::{NewOrder, Order, OrderItem};
pub use price::Price;
pub use status::*;
