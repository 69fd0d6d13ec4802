//! Domain models for storefront.

pub mod session;

pub use session::{SessionState, keys as session_keys};
