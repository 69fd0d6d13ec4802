//! Cart persistence.
//!
//! [`CartStore`] wraps the pure reducer from `bazar_pepe_core::cart` and
//! mirrors every change into the visitor's [`LocalStorage`] under the `cart`
//! key.

use thiserror::Error;
use tracing::{debug, warn};

use bazar_pepe_core::{Cart, CartAction, SnapshotError};

use crate::models::session_keys;
use crate::storage::{LocalStorage, StorageError};

/// Errors loading or saving the cart.
#[derive(Debug, Error)]
pub enum CartError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

/// The visitor's cart bound to their storage.
pub struct CartStore<'a, S: LocalStorage> {
    storage: &'a S,
    cart: Cart,
}

impl<'a, S: LocalStorage> CartStore<'a, S> {
    /// Rehydrate the cart from storage.
    ///
    /// A missing snapshot gives an empty cart, and so does one that does not
    /// parse (logged at `warn`).
    ///
    /// # Errors
    ///
    /// Returns an error only if storage cannot be read.
    pub async fn load(storage: &'a S) -> Result<Self, StorageError> {
        let cart = match storage.get_item(session_keys::CART).await? {
            None => Cart::new(),
            Some(snapshot) => Cart::from_snapshot(&snapshot).unwrap_or_else(|e| {
                warn!(error = %e, "Discarding unreadable cart snapshot");
                Cart::new()
            }),
        };

        Ok(Self { storage, cart })
    }

    /// Current cart contents.
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    #[must_use]
    pub fn into_cart(self) -> Cart {
        self.cart
    }

    /// Apply an action and persist the result.
    ///
    /// `Clear` removes the stored key; any other action that changes the
    /// cart rewrites the full snapshot. Actions that leave the cart as it was
    /// do not touch storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be written.
    pub async fn dispatch(&mut self, action: CartAction) -> Result<(), CartError> {
        if action == CartAction::Clear {
            self.cart = Cart::new();
            self.storage.remove_item(session_keys::CART).await?;
            debug!("Cart cleared");
            return Ok(());
        }

        let next = self.cart.clone().reduce(action);
        if next == self.cart {
            return Ok(());
        }

        self.storage
            .set_item(session_keys::CART, next.to_snapshot()?)
            .await?;
        debug!(lines = next.len(), items = next.item_count(), "Cart saved");
        self.cart = next;
        Ok(())
    }
}
