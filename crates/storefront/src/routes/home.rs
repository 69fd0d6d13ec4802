//! Home page: product listing and search.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Query, State};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use bazar_pepe_core::Pagination;
use bazar_pepe_core::pagination::DEFAULT_PER_PAGE;

use crate::bazar::{BazarClient, Product};
use crate::error::Result;
use crate::filters;
use crate::middleware::CurrentSession;
use crate::services::CartStore;
use crate::views::{NavView, Notice, PageLink, ProductCard, page_links};

const NO_MATCHES: &str = "No existen productos que coincidan con la busqueda";
const LOAD_FAILED: &str = "No se puede obtener los productos";

/// Home page query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct HomeQuery {
    pub search: Option<String>,
    #[serde(default, deserialize_with = "crate::routes::lenient_page")]
    pub page: Option<usize>,
}

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home/index.html")]
pub struct HomeTemplate {
    pub nav: NavView,
    pub notice: Option<Notice>,
    pub cards: Vec<ProductCard>,
    pub pages: Vec<PageLink>,
    pub return_to: String,
}

/// URL of page `page` of the listing, keeping the search term.
fn listing_href(search: Option<&str>, page: usize) -> String {
    match search {
        Some(term) => format!("/?search={}&page={page}", urlencoding::encode(term)),
        None => format!("/?page={page}"),
    }
}

/// All products, or the search results for `search`.
async fn load_products(
    api: &BazarClient,
    search: Option<&str>,
) -> std::result::Result<Vec<Product>, Notice> {
    let result = match search {
        Some(term) => api.search_products(term).await,
        None => api.all_products().await,
    };

    match result {
        Ok(products) if products.is_empty() && search.is_some() => Err(Notice::error(NO_MATCHES)),
        Ok(products) => Ok(products),
        Err(e) => Err(Notice::error(e.display_message(LOAD_FAILED))),
    }
}

/// Display the product listing.
#[instrument(skip(state, session, login))]
pub async fn index(
    State(state): State<crate::state::AppState>,
    session: Session,
    CurrentSession(login): CurrentSession,
    Query(query): Query<HomeQuery>,
) -> Result<HomeTemplate> {
    let cart = CartStore::load(&session).await?.into_cart();
    let search = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|term| !term.is_empty());
    let page = query.page.unwrap_or(1);

    let (products, notice) = match load_products(state.api(), search).await {
        Ok(products) => (products, None),
        Err(notice) => (Vec::new(), Some(notice)),
    };

    let pagination = Pagination::new(products.len(), DEFAULT_PER_PAGE, page);

    Ok(HomeTemplate {
        nav: NavView::new(&login, &cart).with_search(search.unwrap_or_default()),
        notice,
        cards: ProductCard::list(pagination.slice(&products), &cart),
        pages: page_links(&pagination, |n| listing_href(search, n)),
        return_to: listing_href(search, pagination.current()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_href_keeps_search() {
        assert_eq!(listing_href(None, 2), "/?page=2");
        assert_eq!(listing_href(Some("taza azul"), 1), "/?search=taza%20azul&page=1");
    }
}
