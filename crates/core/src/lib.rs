//! Bazar Pepe Core - Shared types and pure storefront logic.
//!
//! This crate provides the pieces of the storefront that do not touch the
//! network or the session store:
//! - Type-safe ids, prices, and order statuses used by the API client
//! - The shopping-cart reducer and its persisted snapshot format
//! - Client-side pagination arithmetic
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no session access. Persistence of the cart is the storefront's
//! job; here a cart is just a value transformed by [`cart::CartAction`]s.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, prices, and statuses
//! - [`cart`] - Cart line items, actions, and the reducer
//! - [`pagination`] - Page slicing for list pages

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod pagination;
pub mod types;

pub use cart::{CART_STORAGE_KEY, Cart, CartAction, CartLineItem, SnapshotError};
pub use pagination::Pagination;
pub use types::*;
