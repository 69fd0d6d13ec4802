//! Business logic services for storefront.
//!
//! # Services
//!
//! - `cart` - Cart reducer bound to the visitor's storage

pub mod cart;

pub use cart::{CartError, CartStore};
