//! Cart route handlers.
//!
//! The cart lives in the visitor's session under the `cart` key. Every
//! mutation goes through [`CartStore::dispatch`], then redirects back to the
//! page the form was posted from.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use bazar_pepe_core::{Cart, CartAction, ProductId};

use crate::bazar::OrderRequest;
use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::middleware::CurrentSession;
use crate::middleware::auth::is_local_path;
use crate::services::CartStore;
use crate::state::AppState;
use crate::views::{NavView, Notice, refresh_after};

const LOGIN_FIRST: &str = "Tienes que hacer login antes de hacer el pedido";
const ORDER_PLACED: &str = "Se ha completado el pedido";
const ORDER_FAILED: &str = "Se ha producido un error con el pedido";
const PRODUCT_FAILED: &str = "No se puede obtener el producto";

/// Delay before an anonymous checkout is sent to the login page.
const LOGIN_REDIRECT_SECS: u32 = 3;

/// How long checkout messages stay on screen.
const CHECKOUT_NOTICE_MS: u32 = 3000;

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartTemplate {
    pub nav: NavView,
    pub notice: Option<Notice>,
    pub cart: Cart,
}

/// Form data for cart mutations.
#[derive(Debug, Deserialize)]
pub struct CartForm {
    pub product_id: ProductId,
    pub return_to: Option<String>,
}

impl CartForm {
    /// Where to send the visitor after the mutation.
    fn redirect(&self) -> Redirect {
        let target = self
            .return_to
            .as_deref()
            .filter(|path| is_local_path(path))
            .unwrap_or("/cart");
        Redirect::to(target)
    }
}

fn render(login: &CurrentSession, cart: Cart, notice: Option<Notice>) -> CartTemplate {
    CartTemplate {
        nav: NavView::new(&login.0, &cart),
        notice,
        cart,
    }
}

/// Display the cart page.
#[instrument(skip(session, login))]
pub async fn show(session: Session, login: CurrentSession) -> Result<CartTemplate> {
    let cart = CartStore::load(&session).await?.into_cart();
    Ok(render(&login, cart, None))
}

/// Add one unit of a product, fetching its details from the API.
#[instrument(skip(state, session, login))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    login: CurrentSession,
    Form(form): Form<CartForm>,
) -> Result<Response> {
    let mut store = CartStore::load(&session).await?;

    let product = match state.api().cached_product(form.product_id).await {
        Ok(product) => product,
        Err(e) => {
            let notice = Notice::error(e.display_message(PRODUCT_FAILED));
            return Ok(render(&login, store.into_cart(), Some(notice)).into_response());
        }
    };

    store.dispatch(CartAction::Add(product.to_cart_item())).await?;

    let id = product.id.to_string();
    add_breadcrumb("cart", "Added product", Some(&[("product_id", id.as_str())]));

    Ok(form.redirect().into_response())
}

/// Add one unit of a product already in the cart.
#[instrument(skip(session))]
pub async fn increment(session: Session, Form(form): Form<CartForm>) -> Result<Redirect> {
    let mut store = CartStore::load(&session).await?;
    store.dispatch(CartAction::Increment(form.product_id)).await?;
    Ok(form.redirect())
}

/// Remove one unit; the last unit drops the line.
#[instrument(skip(session))]
pub async fn decrement(session: Session, Form(form): Form<CartForm>) -> Result<Redirect> {
    let mut store = CartStore::load(&session).await?;
    let action = CartAction::step_down(store.cart(), form.product_id);
    store.dispatch(action).await?;
    Ok(form.redirect())
}

/// Drop a line from the cart.
#[instrument(skip(session))]
pub async fn remove(session: Session, Form(form): Form<CartForm>) -> Result<Redirect> {
    let mut store = CartStore::load(&session).await?;
    store.dispatch(CartAction::Remove(form.product_id)).await?;
    Ok(form.redirect())
}

/// Place an order for the cart contents.
///
/// Anonymous visitors get a message and are sent to the login page after a
/// short delay; no order is placed. The cart is cleared only when the API
/// reports status 200.
#[instrument(skip(state, session, login))]
pub async fn checkout(
    State(state): State<AppState>,
    session: Session,
    login: CurrentSession,
) -> Result<Response> {
    let mut store = CartStore::load(&session).await?;

    if !login.0.is_authenticated() {
        let notice = Notice::error(LOGIN_FIRST).dismiss_after(CHECKOUT_NOTICE_MS);
        let page = render(&login, store.into_cart(), Some(notice));
        return Ok((refresh_after(LOGIN_REDIRECT_SECS, "/login"), page).into_response());
    }

    if store.cart().is_empty() {
        return Ok(Redirect::to("/cart").into_response());
    }

    let order = OrderRequest::from_cart(store.cart());
    let notice = match state.api().create_order(login.0.token(), &order).await {
        Ok(outcome) if outcome.is_ok() => {
            store.dispatch(CartAction::Clear).await?;
            add_breadcrumb("checkout", "Order placed", None);
            tracing::info!(lines = order.items.len(), "Order placed");
            Notice::success(outcome.message_or(ORDER_PLACED))
        }
        Ok(outcome) => Notice::error(outcome.message_or(ORDER_FAILED)),
        Err(e) => {
            tracing::warn!(error = %e, "Checkout failed");
            Notice::error(e.display_message(ORDER_FAILED))
        }
    };

    let page = render(&login, store.into_cart(), Some(notice.dismiss_after(CHECKOUT_NOTICE_MS)));
    Ok(page.into_response())
}
