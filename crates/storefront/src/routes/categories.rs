//! Category listing and per-category product pages.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, Query, State};
use tower_sessions::Session;
use tracing::instrument;

use bazar_pepe_core::pagination::DEFAULT_PER_PAGE;
use bazar_pepe_core::{CategoryId, Pagination};

use crate::bazar::Category;
use crate::error::Result;
use crate::filters;
use crate::middleware::CurrentSession;
use crate::routes::PageQuery;
use crate::services::CartStore;
use crate::state::AppState;
use crate::views::{NavView, Notice, PageLink, ProductCard, page_links};

const CATEGORIES_FAILED: &str = "No se puede obtener las categorias";
const PRODUCTS_FAILED: &str = "No se puede obtener los productos de esa categoria";

/// Category listing template.
#[derive(Template, WebTemplate)]
#[template(path = "categories/index.html")]
pub struct CategoriesTemplate {
    pub nav: NavView,
    pub notice: Option<Notice>,
    pub categories: Vec<Category>,
}

/// Products of one category.
#[derive(Template, WebTemplate)]
#[template(path = "categories/show.html")]
pub struct CategoryProductsTemplate {
    pub nav: NavView,
    pub notice: Option<Notice>,
    pub cards: Vec<ProductCard>,
    pub pages: Vec<PageLink>,
    pub return_to: String,
}

/// Display every category.
#[instrument(skip(state, session, login))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    CurrentSession(login): CurrentSession,
) -> Result<CategoriesTemplate> {
    let nav = NavView::load(&session, &login).await?;

    let (categories, notice) = match state.api().categories().await {
        Ok(categories) => (categories, None),
        Err(e) => (Vec::new(), Some(Notice::error(e.display_message(CATEGORIES_FAILED)))),
    };

    Ok(CategoriesTemplate {
        nav,
        notice,
        categories,
    })
}

/// Display the products of a category, four per page.
#[instrument(skip(state, session, login))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    CurrentSession(login): CurrentSession,
    Path(id): Path<CategoryId>,
    Query(query): Query<PageQuery>,
) -> Result<CategoryProductsTemplate> {
    let cart = CartStore::load(&session).await?.into_cart();

    let (products, notice) = match state.api().products_by_category(id).await {
        Ok(products) => (products, None),
        Err(e) => (Vec::new(), Some(Notice::error(e.display_message(PRODUCTS_FAILED)))),
    };

    let pagination = Pagination::new(products.len(), DEFAULT_PER_PAGE, query.page());

    Ok(CategoryProductsTemplate {
        nav: NavView::new(&login, &cart),
        notice,
        cards: ProductCard::list(pagination.slice(&products), &cart),
        pages: page_links(&pagination, |n| format!("/category/{id}?page={n}")),
        return_to: format!("/category/{id}?page={}", pagination.current()),
    })
}
