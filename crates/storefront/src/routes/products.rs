//! Product detail page.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, State};
use tower_sessions::Session;
use tracing::instrument;

use bazar_pepe_core::ProductId;

use crate::error::Result;
use crate::filters;
use crate::middleware::CurrentSession;
use crate::services::CartStore;
use crate::state::AppState;
use crate::views::{NavView, Notice, ProductCard};

const LOAD_FAILED: &str = "No se puede obtener el producto";

/// Product detail template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub nav: NavView,
    pub notice: Option<Notice>,
    pub card: Option<ProductCard>,
    pub return_to: String,
}

/// Display a single product with its cart controls.
#[instrument(skip(state, session, login))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    CurrentSession(login): CurrentSession,
    Path(id): Path<ProductId>,
) -> Result<ProductShowTemplate> {
    let cart = CartStore::load(&session).await?.into_cart();

    let (card, notice) = match state.api().product(id).await {
        Ok(product) => (Some(ProductCard::new(product, &cart)), None),
        Err(e) => (None, Some(Notice::error(e.display_message(LOAD_FAILED)))),
    };

    Ok(ProductShowTemplate {
        nav: NavView::new(&login, &cart),
        notice,
        card,
        return_to: format!("/product/{id}"),
    })
}
