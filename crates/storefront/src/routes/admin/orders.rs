//! Order item management.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use bazar_pepe_core::pagination::DEFAULT_PER_PAGE;
use bazar_pepe_core::{OrderItemId, OrderStatus, Pagination, Price};

use crate::bazar::{OrderFilter, OrderItem};
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::models::SessionState;
use crate::state::AppState;
use crate::views::{NavView, Notice, PageLink, page_links};

const LIST_FAILED: &str = "No es posible cargar los pedidos";
const DETAILS_FAILED: &str = "No es posible cargar el pedido";
const UPDATE_OK: &str = "El estado del producto del pedido se ha actualizado correctamente";
const UPDATE_FAILED: &str = "No ha sido posible actualizar el estado";

const NOTICE_MS: u32 = 3000;

/// `?status=&page=` query of the order list. An empty status lists all.
#[derive(Debug, Default, Deserialize)]
pub struct OrdersQuery {
    pub status: Option<String>,
    #[serde(default, deserialize_with = "crate::routes::lenient_page")]
    pub page: Option<usize>,
}

impl OrdersQuery {
    fn status(&self) -> Option<OrderStatus> {
        self.status
            .as_deref()
            .filter(|status| !status.trim().is_empty())
            .and_then(|status| status.parse().ok())
    }
}

/// One order item as listed in the back office.
#[derive(Debug, Clone)]
pub struct OrderItemRow {
    pub id: OrderItemId,
    pub customer: String,
    pub email: String,
    pub phone_number: String,
    pub product_name: String,
    pub product_image: Option<String>,
    pub description: String,
    pub quantity: u32,
    pub price: Price,
    pub status: OrderStatus,
    pub created_at: String,
}

impl From<&OrderItem> for OrderItemRow {
    fn from(item: &OrderItem) -> Self {
        let user = item.user.as_ref();
        let product = item.product.as_ref();
        Self {
            id: item.id,
            customer: user.map(|user| user.name.clone()).unwrap_or_default(),
            email: user.map(|user| user.email.clone()).unwrap_or_default(),
            phone_number: user
                .map(|user| user.phone_number.clone())
                .unwrap_or_default(),
            product_name: product
                .map(|product| product.name.clone())
                .unwrap_or_default(),
            product_image: product.and_then(crate::bazar::Product::image_data_url),
            description: product
                .map(|product| product.description.clone())
                .unwrap_or_default(),
            quantity: item.quantity,
            price: item.price,
            status: item.status,
            created_at: item.created_at_display(),
        }
    }
}

/// One entry of a status select.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusOption {
    pub status: OrderStatus,
    pub selected: bool,
}

/// Every status, marking `selected`.
fn status_options(selected: Option<OrderStatus>) -> Vec<StatusOption> {
    OrderStatus::ALL
        .into_iter()
        .map(|status| StatusOption {
            status,
            selected: selected == Some(status),
        })
        .collect()
}

/// Order list template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/orders.html")]
pub struct OrdersTemplate {
    pub nav: NavView,
    pub notice: Option<Notice>,
    pub orders: Vec<OrderItemRow>,
    pub statuses: Vec<StatusOption>,
    pub pages: Vec<PageLink>,
}

/// Order item details template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/order_details.html")]
pub struct OrderDetailsTemplate {
    pub nav: NavView,
    pub notice: Option<Notice>,
    pub order: Option<OrderItemRow>,
    pub statuses: Vec<StatusOption>,
}

/// Status update form data.
#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: OrderStatus,
}

fn orders_href(status: Option<OrderStatus>, page: usize) -> String {
    match status {
        Some(status) => format!("/admin/orders?status={status}&page={page}"),
        None => format!("/admin/orders?page={page}"),
    }
}

/// Display order items, optionally filtered by status, four per page.
#[instrument(skip(state, session, login))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(login): RequireAdmin,
    Query(query): Query<OrdersQuery>,
) -> Result<OrdersTemplate> {
    let nav = NavView::load(&session, &login).await?;
    let selected = query.status();
    let filter = selected.map_or(OrderFilter::All, OrderFilter::Status);

    let (items, notice) = match state.api().filter_orders(login.token(), filter).await {
        Ok(page) => (page.items, None),
        Err(e) => (
            Vec::new(),
            Some(Notice::error(e.display_message(LIST_FAILED)).dismiss_after(NOTICE_MS)),
        ),
    };

    let pagination = Pagination::new(items.len(), DEFAULT_PER_PAGE, query.page.unwrap_or(1));

    Ok(OrdersTemplate {
        nav,
        notice,
        orders: pagination
            .slice(&items)
            .iter()
            .map(OrderItemRow::from)
            .collect(),
        statuses: status_options(selected),
        pages: page_links(&pagination, |n| orders_href(selected, n)),
    })
}

async fn render_details(
    state: &AppState,
    session: &Session,
    login: &SessionState,
    id: OrderItemId,
    notice: Option<Notice>,
) -> Result<OrderDetailsTemplate> {
    let nav = NavView::load(session, login).await?;

    let (order, load_notice) = match state
        .api()
        .filter_orders(login.token(), OrderFilter::ItemId(id))
        .await
    {
        Ok(page) => (page.items.first().map(OrderItemRow::from), None),
        Err(e) => (None, Some(Notice::error(e.display_message(DETAILS_FAILED)))),
    };
    let statuses = status_options(order.as_ref().map(|order| order.status));

    Ok(OrderDetailsTemplate {
        nav,
        notice: notice.or(load_notice),
        order,
        statuses,
    })
}

/// Display one order item with its status form.
#[instrument(skip(state, session, login))]
pub async fn details(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(login): RequireAdmin,
    Path(id): Path<OrderItemId>,
) -> Result<OrderDetailsTemplate> {
    render_details(&state, &session, &login, id, None).await
}

/// Move an order item to a new status, then show it again.
#[instrument(skip(state, session, login))]
pub async fn update_status(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(login): RequireAdmin,
    Path(id): Path<OrderItemId>,
    Form(form): Form<StatusForm>,
) -> Result<OrderDetailsTemplate> {
    let notice = match state
        .api()
        .update_order_item_status(login.token(), id, form.status)
        .await
    {
        Ok(outcome) if outcome.is_ok() => {
            tracing::info!(order_item_id = %id, status = %form.status, "Order item status updated");
            Notice::success(outcome.message_or(UPDATE_OK))
        }
        Ok(outcome) => Notice::error(outcome.message_or(UPDATE_FAILED)),
        Err(e) => {
            tracing::warn!(error = %e, "Order item status update failed");
            Notice::error(e.display_message(UPDATE_FAILED))
        }
    };

    render_details(&state, &session, &login, id, Some(notice.dismiss_after(NOTICE_MS))).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_status_lists_all() {
        let query = OrdersQuery {
            status: Some(String::new()),
            page: None,
        };
        assert_eq!(query.status(), None);

        let query = OrdersQuery {
            status: Some("shipped".to_string()),
            page: None,
        };
        assert_eq!(query.status(), Some(OrderStatus::Shipped));
    }

    #[test]
    fn test_malformed_page_keeps_status_filter() {
        let uri = axum::http::Uri::from_static("/admin/orders?status=PENDING&page=x");
        let query = axum::extract::Query::<OrdersQuery>::try_from_uri(&uri)
            .map(|query| query.0)
            .unwrap_or_default();
        assert_eq!(query.status(), Some(OrderStatus::Pending));
        assert_eq!(query.page, None);
    }

    #[test]
    fn test_status_options_mark_selection() {
        let options = status_options(Some(OrderStatus::Shipped));
        assert_eq!(options.len(), OrderStatus::ALL.len());
        assert_eq!(
            options.iter().filter(|option| option.selected).count(),
            1
        );
        assert!(status_options(None).iter().all(|option| !option.selected));
    }

    #[test]
    fn test_orders_href_keeps_status() {
        assert_eq!(
            orders_href(Some(OrderStatus::Delivered), 2),
            "/admin/orders?status=DELIVERED&page=2"
        );
        assert_eq!(orders_href(None, 1), "/admin/orders?page=1");
    }
}
