//! View data shared by every page template.
//!
//! Templates stay free of logic: handlers precompute what a page shows into
//! these structs.

use axum::http::HeaderName;
use tower_sessions::Session;

use bazar_pepe_core::{Cart, Pagination, ProductId};

use crate::bazar::Product;
use crate::error::Result;
use crate::models::SessionState;
use crate::services::CartStore;

/// Non-standard but universally supported delayed-navigation header.
pub static REFRESH: HeaderName = HeaderName::from_static("refresh");

/// Navbar state.
#[derive(Debug, Clone, Default)]
pub struct NavView {
    pub is_authenticated: bool,
    pub is_admin: bool,
    pub cart_count: u32,
    pub search: String,
}

impl NavView {
    /// Navbar for a visitor whose cart is already loaded.
    #[must_use]
    pub fn new(login: &SessionState, cart: &Cart) -> Self {
        Self {
            is_authenticated: login.is_authenticated(),
            is_admin: login.is_admin(),
            cart_count: cart.item_count(),
            search: String::new(),
        }
    }

    /// Navbar for a visitor, reading their cart from the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be read.
    pub async fn load(session: &Session, login: &SessionState) -> Result<Self> {
        let store = CartStore::load(session).await?;
        Ok(Self::new(login, store.cart()))
    }

    /// Keep the search box filled with `search`.
    #[must_use]
    pub fn with_search(mut self, search: &str) -> Self {
        self.search = search.to_string();
        self
    }
}

/// Visual kind of a [`Notice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// Inline message shown at the top of a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub text: String,
    pub kind: NoticeKind,
    /// Milliseconds after which the browser removes the notice.
    pub dismiss_after_ms: Option<u32>,
}

impl Notice {
    #[must_use]
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: NoticeKind::Success,
            dismiss_after_ms: None,
        }
    }

    #[must_use]
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: NoticeKind::Error,
            dismiss_after_ms: None,
        }
    }

    /// Remove the notice after `ms` milliseconds.
    #[must_use]
    pub const fn dismiss_after(mut self, ms: u32) -> Self {
        self.dismiss_after_ms = Some(ms);
        self
    }

    /// CSS class for the notice.
    #[must_use]
    pub const fn class(&self) -> &'static str {
        match self.kind {
            NoticeKind::Success => "message",
            NoticeKind::Error => "error-message",
        }
    }
}

/// `Refresh` header sending the browser to `url` after `seconds`.
#[must_use]
pub fn refresh_after(seconds: u32, url: &str) -> [(HeaderName, String); 1] {
    [(REFRESH.clone(), format!("{seconds}; url={url}"))]
}

/// One numbered link of a pager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLink {
    pub number: usize,
    pub href: String,
    pub is_current: bool,
}

/// Pager links for `pagination`; `href` builds the URL of a page number.
#[must_use]
pub fn page_links(pagination: &Pagination, href: impl Fn(usize) -> String) -> Vec<PageLink> {
    // A single page needs no pager.
    if pagination.total_pages() <= 1 {
        return Vec::new();
    }
    pagination
        .pages()
        .map(|number| PageLink {
            number,
            href: href(number),
            is_current: number == pagination.current(),
        })
        .collect()
}

/// A product tile with its cart controls.
#[derive(Debug, Clone)]
pub struct ProductCard {
    pub product: Product,
    pub image_src: Option<String>,
    /// Units of this product in the cart; 0 shows the add button.
    pub in_cart: u32,
}

impl ProductCard {
    #[must_use]
    pub fn new(product: Product, cart: &Cart) -> Self {
        Self {
            image_src: product.image_data_url(),
            in_cart: cart.quantity_of(product.id),
            product,
        }
    }

    /// Cards for a page of products.
    #[must_use]
    pub fn list(products: &[Product], cart: &Cart) -> Vec<Self> {
        products
            .iter()
            .map(|product| Self::new(product.clone(), cart))
            .collect()
    }

    #[must_use]
    pub const fn id(&self) -> ProductId {
        self.product.id
    }
}

#[cfg(test)]
#[allow(clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_refresh_header_value() {
        let [(name, value)] = refresh_after(4, "/profile");
        assert_eq!(name.as_str(), "refresh");
        assert_eq!(value, "4; url=/profile");
    }

    #[test]
    fn test_page_links_mark_current() {
        let links = page_links(&Pagination::new(9, 4, 2), |n| format!("/?page={n}"));

        assert_eq!(links.len(), 3);
        assert!(links[1].is_current);
        assert!(!links[0].is_current);
        assert_eq!(links[2].href, "/?page=3");
    }

    #[test]
    fn test_single_page_has_no_pager() {
        assert!(page_links(&Pagination::new(3, 4, 1), |n| n.to_string()).is_empty());
        assert!(page_links(&Pagination::new(0, 4, 1), |n| n.to_string()).is_empty());
    }

    #[test]
    fn test_notice_classes() {
        let notice = Notice::success("ok").dismiss_after(3000);
        assert_eq!(notice.class(), "message");
        assert_eq!(notice.dismiss_after_ms, Some(3000));
        assert_eq!(Notice::error("no").class(), "error-message");
    }
}
