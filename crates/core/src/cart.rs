//! Shopping cart reducer.
//!
//! A [`Cart`] is an insertion-ordered list of [`CartLineItem`]s, unique by
//! product id, where every quantity is at least 1. It only changes through
//! [`Cart::reduce`], a pure function of the current cart and a
//! [`CartAction`]. Persisting the result is left to the caller; the snapshot
//! format is a JSON array stored under [`CART_STORAGE_KEY`].
//!
//! # Example
//!
//! ```
//! use bazar_pepe_core::{Cart, CartAction, CartLineItem, Price, ProductId};
//!
//! let mug = CartLineItem::new(ProductId::new(1), "Mug", Price::from_cents(450));
//!
//! let cart = Cart::new()
//!     .reduce(CartAction::Add(mug.clone()))
//!     .reduce(CartAction::Add(mug));
//!
//! assert_eq!(cart.len(), 1);
//! assert_eq!(cart.quantity_of(ProductId::new(1)), 2);
//! assert_eq!(cart.total_price(), Price::from_cents(900));
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Price, ProductId};

/// Storage key under which the cart snapshot is persisted.
pub const CART_STORAGE_KEY: &str = "cart";

/// MIME type assumed for product images that carry no explicit type.
pub const DEFAULT_IMAGE_TYPE: &str = "image/jpeg";

/// Errors reading or writing a cart snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The snapshot is not a JSON array of line items.
    #[error("invalid cart snapshot: {0}")]
    Invalid(#[from] serde_json::Error),
}

/// One product in the cart with its quantity.
///
/// Field names serialize in camelCase (`imageType`) to keep the snapshot
/// format stable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineItem {
    /// Product id, unique within the cart.
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Price,
    /// Base64-encoded image bytes.
    #[serde(default)]
    pub image: Option<String>,
    /// MIME type of `image`.
    #[serde(default)]
    pub image_type: Option<String>,
    /// Always at least 1 for an item held in a [`Cart`].
    pub quantity: u32,
}

impl CartLineItem {
    /// Create a payload for `id` with no description or image and quantity 1.
    #[must_use]
    pub fn new(id: ProductId, name: impl Into<String>, price: Price) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            price,
            image: None,
            image_type: None,
            quantity: 1,
        }
    }

    /// Price of this line: unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }

    /// `data:` URL for rendering the image inline, if there is one.
    #[must_use]
    pub fn image_data_url(&self) -> Option<String> {
        self.image.as_ref().map(|image| {
            let mime = self.image_type.as_deref().unwrap_or(DEFAULT_IMAGE_TYPE);
            format!("data:{mime};base64,{image}")
        })
    }
}

/// An action the cart reducer understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartAction {
    /// Add one unit of a product, appending it if it is not in the cart yet.
    /// The payload's `quantity` is ignored.
    Add(CartLineItem),
    /// Add one unit of a product already in the cart.
    Increment(ProductId),
    /// Take one unit away from a product whose quantity is above 1.
    Decrement(ProductId),
    /// Drop a product from the cart whatever its quantity.
    Remove(ProductId),
    /// Empty the cart.
    Clear,
}

impl CartAction {
    /// The action behind a "-" button.
    ///
    /// `Decrement` leaves an item at quantity 1 untouched, so stepping down
    /// from 1 (or from an item that is not in the cart) becomes `Remove`.
    #[must_use]
    pub fn step_down(cart: &Cart, id: ProductId) -> Self {
        if cart.quantity_of(id) > 1 {
            Self::Decrement(id)
        } else {
            Self::Remove(id)
        }
    }
}

/// Ordered, unique-by-id list of line items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartLineItem>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Apply an action and return the resulting cart.
    ///
    /// Total: unknown ids and out-of-range decrements leave the cart as it
    /// was.
    #[must_use]
    pub fn reduce(mut self, action: CartAction) -> Self {
        match action {
            CartAction::Add(payload) => {
                if let Some(item) = self.find_mut(payload.id) {
                    item.quantity = item.quantity.saturating_add(1);
                } else {
                    self.items.push(CartLineItem {
                        quantity: 1,
                        ..payload
                    });
                }
            }
            CartAction::Increment(id) => {
                if let Some(item) = self.find_mut(id) {
                    item.quantity = item.quantity.saturating_add(1);
                }
            }
            CartAction::Decrement(id) => {
                if let Some(item) = self.find_mut(id)
                    && item.quantity > 1
                {
                    item.quantity -= 1;
                }
            }
            CartAction::Remove(id) => self.items.retain(|item| item.id != id),
            CartAction::Clear => self.items.clear(),
        }
        self
    }

    /// Line items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    /// Line item for a product, if present.
    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&CartLineItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Quantity of a product, 0 when absent.
    #[must_use]
    pub fn quantity_of(&self, id: ProductId) -> u32 {
        self.get(id).map_or(0, |item| item.quantity)
    }

    /// Number of distinct products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of all quantities (the navbar badge).
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// Sum of price times quantity over every line.
    #[must_use]
    pub fn total_price(&self) -> Price {
        self.items.iter().map(CartLineItem::line_total).sum()
    }

    /// Parse a persisted snapshot.
    ///
    /// The result is normalized: lines with quantity 0 are dropped and
    /// repeated ids are merged into the first occurrence.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Invalid`] if the text is not a JSON array of
    /// line items.
    pub fn from_snapshot(snapshot: &str) -> Result<Self, SnapshotError> {
        let raw: Vec<CartLineItem> = serde_json::from_str(snapshot)?;

        let mut cart = Self::new();
        for line in raw.into_iter().filter(|line| line.quantity > 0) {
            if let Some(existing) = cart.find_mut(line.id) {
                existing.quantity = existing.quantity.saturating_add(line.quantity);
            } else {
                cart.items.push(line);
            }
        }
        Ok(cart)
    }

    /// Serialize the cart as a JSON array.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Invalid`] if serialization fails.
    pub fn to_snapshot(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string(&self.items)?)
    }

    fn find_mut(&mut self, id: ProductId) -> Option<&mut CartLineItem> {
        self.items.iter_mut().find(|item| item.id == id)
    }
}
