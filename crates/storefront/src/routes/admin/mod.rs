//! Back-office route handlers.
//!
//! Every handler takes [`RequireAdmin`], so visitors whose stored role is not
//! exactly `ADMIN` are redirected to the login page.

pub mod categories;
pub mod orders;
pub mod products;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::state::AppState;
use crate::views::{NavView, Notice};

/// Largest accepted product form, image included.
const PRODUCT_FORM_LIMIT: usize = 10 * 1024 * 1024;

/// Admin dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/dashboard.html")]
pub struct DashboardTemplate {
    pub nav: NavView,
    pub notice: Option<Notice>,
}

/// Display the admin dashboard.
#[instrument(skip(session, login))]
pub async fn dashboard(
    session: Session,
    RequireAdmin(login): RequireAdmin,
) -> Result<DashboardTemplate> {
    Ok(DashboardTemplate {
        nav: NavView::load(&session, &login).await?,
        notice: None,
    })
}

/// Create the admin routes router, nested under `/admin`.
pub fn routes() -> Router<AppState> {
    let product_forms = Router::new()
        .route(
            "/add-product",
            get(products::add_page).post(products::add),
        )
        .route(
            "/edit-product/{id}",
            get(products::edit_page).post(products::edit),
        )
        .layer(DefaultBodyLimit::max(PRODUCT_FORM_LIMIT));

    Router::new()
        .route("/", get(dashboard))
        .route("/categories", get(categories::index))
        .route("/categories/{id}/delete", post(categories::delete))
        .route(
            "/add-category",
            get(categories::add_page).post(categories::add),
        )
        .route(
            "/edit-category/{id}",
            get(categories::edit_page).post(categories::edit),
        )
        .route("/products", get(products::index))
        .route("/products/{id}/delete", post(products::delete))
        .merge(product_forms)
        .route("/orders", get(orders::index))
        .route(
            "/order-details/{id}",
            get(orders::details).post(orders::update_status),
        )
}
