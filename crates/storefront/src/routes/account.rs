//! Account route handlers: profile and address forms.
//!
//! Every handler here requires a logged-in visitor; see [`RequireAuth`].

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    http::Uri,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use bazar_pepe_core::pagination::PROFILE_ORDERS_PER_PAGE;
use bazar_pepe_core::{OrderStatus, Pagination, Price};

use crate::bazar::{Address, OrderItem, User};
use crate::error::{Result, set_sentry_user};
use crate::filters;
use crate::middleware::RequireAuth;
use crate::routes::PageQuery;
use crate::state::AppState;
use crate::views::{NavView, Notice, PageLink, page_links};

const PROFILE_FAILED: &str = "No es posible cargar los datos del usuario";
const ADDRESS_LOAD_FAILED: &str = "No es posible cargar la informacion del usuario";
const ADDRESS_SAVE_FAILED: &str = "No se ha podido registrar la direccion";

/// One row of the order history.
#[derive(Debug, Clone)]
pub struct OrderRow {
    pub product_name: String,
    pub status: OrderStatus,
    pub quantity: u32,
    pub price: Price,
    pub created_at: String,
}

impl From<&OrderItem> for OrderRow {
    fn from(item: &OrderItem) -> Self {
        Self {
            product_name: item
                .product
                .as_ref()
                .map(|product| product.name.clone())
                .unwrap_or_default(),
            status: item.status,
            quantity: item.quantity,
            price: item.price,
            created_at: item.created_at_display(),
        }
    }
}

/// Profile page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/profile.html")]
pub struct ProfileTemplate {
    pub nav: NavView,
    pub notice: Option<Notice>,
    pub user: Option<User>,
    pub orders: Vec<OrderRow>,
    pub pages: Vec<PageLink>,
}

/// Add or edit address form template.
#[derive(Template, WebTemplate)]
#[template(path = "account/address.html")]
pub struct AddressTemplate {
    pub nav: NavView,
    pub notice: Option<Notice>,
    pub address: Address,
    pub is_edit: bool,
    pub action: String,
}

/// Display the visitor's profile, address, and order history.
#[instrument(skip(state, session, login))]
pub async fn profile(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(login): RequireAuth,
    Query(query): Query<PageQuery>,
) -> Result<ProfileTemplate> {
    let nav = NavView::load(&session, &login).await?;

    let user = match state.api().current_user(login.token()).await {
        Ok(user) => user,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load profile");
            return Ok(ProfileTemplate {
                nav,
                notice: Some(Notice::error(e.display_message(PROFILE_FAILED))),
                user: None,
                orders: Vec::new(),
                pages: Vec::new(),
            });
        }
    };

    set_sentry_user(&user.id, Some(&user.email));

    let pagination = Pagination::new(
        user.order_item_list.len(),
        PROFILE_ORDERS_PER_PAGE,
        query.page(),
    );
    let orders = pagination
        .slice(&user.order_item_list)
        .iter()
        .map(OrderRow::from)
        .collect();

    Ok(ProfileTemplate {
        nav,
        notice: None,
        orders,
        pages: page_links(&pagination, |n| format!("/profile?page={n}")),
        user: Some(user),
    })
}

/// Display the empty address form.
#[instrument(skip(session, login))]
pub async fn add_address(
    session: Session,
    RequireAuth(login): RequireAuth,
) -> Result<AddressTemplate> {
    Ok(AddressTemplate {
        nav: NavView::load(&session, &login).await?,
        notice: None,
        address: Address::default(),
        is_edit: false,
        action: "/add-address".to_string(),
    })
}

/// Display the address form filled with the stored address.
#[instrument(skip(state, session, login))]
pub async fn edit_address(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(login): RequireAuth,
) -> Result<AddressTemplate> {
    let nav = NavView::load(&session, &login).await?;

    let (address, notice) = match state.api().current_user(login.token()).await {
        Ok(user) => (user.address.unwrap_or_default(), None),
        Err(e) => (
            Address::default(),
            Some(Notice::error(e.display_message(ADDRESS_LOAD_FAILED))),
        ),
    };

    Ok(AddressTemplate {
        nav,
        notice,
        address,
        is_edit: true,
        action: "/edit-address".to_string(),
    })
}

/// Save the address and return to the profile.
///
/// Serves both forms; a failure re-renders the form that was posted.
#[instrument(skip(state, session, login, address))]
pub async fn save_address(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(login): RequireAuth,
    uri: Uri,
    Form(address): Form<Address>,
) -> Result<Response> {
    let message = match state.api().save_address(login.token(), &address).await {
        Ok(outcome) if outcome.is_ok() => return Ok(Redirect::to("/profile").into_response()),
        Ok(outcome) => outcome.message_or(ADDRESS_SAVE_FAILED).to_string(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to save address");
            e.display_message(ADDRESS_SAVE_FAILED)
        }
    };

    let is_edit = uri.path() == "/edit-address";
    let page = AddressTemplate {
        nav: NavView::load(&session, &login).await?,
        notice: Some(Notice::error(message)),
        address,
        is_edit,
        action: uri.path().to_string(),
    };
    Ok(page.into_response())
}
