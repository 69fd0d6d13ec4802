//! Category management.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use bazar_pepe_core::CategoryId;

use crate::bazar::{Category, CategoryRequest};
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::models::SessionState;
use crate::state::AppState;
use crate::views::{NavView, Notice, refresh_after};

const LIST_FAILED: &str = "No se puede obtener las categorias";
const DELETE_FAILED: &str = "No se ha podido eliminar la categoría";
const ADD_OK: &str = "Se ha añadido correctamente la categoría";
const ADD_FAILED: &str = "No se ha podido añadir la categoría";
const LOAD_FAILED: &str = "Error al cargar la categoría";
const UPDATE_OK: &str = "Categoría actualizada correctamente";
const UPDATE_FAILED: &str = "Error al actualizar la categoría";

const ADD_REDIRECT_SECS: u32 = 2;
const EDIT_REDIRECT_SECS: u32 = 3;
const LOAD_NOTICE_MS: u32 = 3000;

const LIST_PATH: &str = "/admin/categories";

/// Category list template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/categories.html")]
pub struct CategoriesTemplate {
    pub nav: NavView,
    pub notice: Option<Notice>,
    pub categories: Vec<Category>,
}

/// Add or edit category form template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/category_form.html")]
pub struct CategoryFormTemplate {
    pub nav: NavView,
    pub notice: Option<Notice>,
    pub name: String,
    pub action: String,
    pub is_edit: bool,
}

async fn render_list(
    state: &AppState,
    session: &Session,
    login: &SessionState,
    notice: Option<Notice>,
) -> Result<CategoriesTemplate> {
    let nav = NavView::load(session, login).await?;

    let (categories, list_notice) = match state.api().categories().await {
        Ok(categories) => (categories, None),
        Err(e) => (Vec::new(), Some(Notice::error(e.display_message(LIST_FAILED)))),
    };

    Ok(CategoriesTemplate {
        nav,
        notice: notice.or(list_notice),
        categories,
    })
}

/// Display every category with edit and delete controls.
#[instrument(skip(state, session, login))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(login): RequireAdmin,
) -> Result<CategoriesTemplate> {
    render_list(&state, &session, &login, None).await
}

/// Delete a category, then show the list again.
#[instrument(skip(state, session, login))]
pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(login): RequireAdmin,
    Path(id): Path<CategoryId>,
) -> Result<Response> {
    match state.api().delete_category(login.token(), id).await {
        Ok(outcome) if outcome.is_ok() => {
            tracing::info!(category_id = %id, "Category deleted");
            Ok(Redirect::to(LIST_PATH).into_response())
        }
        outcome => {
            let message = match outcome {
                Ok(outcome) => outcome.message_or(DELETE_FAILED).to_string(),
                Err(e) => e.display_message(DELETE_FAILED),
            };
            let page = render_list(&state, &session, &login, Some(Notice::error(message))).await?;
            Ok(page.into_response())
        }
    }
}

/// Display the empty category form.
#[instrument(skip(session, login))]
pub async fn add_page(
    session: Session,
    RequireAdmin(login): RequireAdmin,
) -> Result<CategoryFormTemplate> {
    Ok(CategoryFormTemplate {
        nav: NavView::load(&session, &login).await?,
        notice: None,
        name: String::new(),
        action: "/admin/add-category".to_string(),
        is_edit: false,
    })
}

/// Create a category.
#[instrument(skip(state, session, login))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(login): RequireAdmin,
    Form(form): Form<CategoryRequest>,
) -> Result<Response> {
    let nav = NavView::load(&session, &login).await?;
    let action = "/admin/add-category".to_string();

    match state.api().create_category(login.token(), &form).await {
        Ok(outcome) if outcome.is_ok() => {
            let page = CategoryFormTemplate {
                nav,
                notice: Some(Notice::success(outcome.message_or(ADD_OK))),
                name: String::new(),
                action,
                is_edit: false,
            };
            Ok((refresh_after(ADD_REDIRECT_SECS, LIST_PATH), page).into_response())
        }
        outcome => {
            let message = match outcome {
                Ok(outcome) => outcome.message_or(ADD_FAILED).to_string(),
                Err(e) => e.display_message(ADD_FAILED),
            };
            let page = CategoryFormTemplate {
                nav,
                notice: Some(Notice::error(message)),
                name: form.name,
                action,
                is_edit: false,
            };
            Ok(page.into_response())
        }
    }
}

/// Display the category form filled with the stored name.
#[instrument(skip(state, session, login))]
pub async fn edit_page(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(login): RequireAdmin,
    Path(id): Path<CategoryId>,
) -> Result<CategoryFormTemplate> {
    let nav = NavView::load(&session, &login).await?;

    let (name, notice) = match state.api().category(id).await {
        Ok(category) => (category.name, None),
        Err(e) => (
            String::new(),
            Some(Notice::error(e.display_message(LOAD_FAILED)).dismiss_after(LOAD_NOTICE_MS)),
        ),
    };

    Ok(CategoryFormTemplate {
        nav,
        notice,
        name,
        action: format!("/admin/edit-category/{id}"),
        is_edit: true,
    })
}

/// Rename a category.
#[instrument(skip(state, session, login))]
pub async fn edit(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(login): RequireAdmin,
    Path(id): Path<CategoryId>,
    Form(form): Form<CategoryRequest>,
) -> Result<Response> {
    let nav = NavView::load(&session, &login).await?;
    let action = format!("/admin/edit-category/{id}");

    let (notice, redirect) = match state.api().update_category(login.token(), id, &form).await {
        Ok(outcome) if outcome.is_ok() => (
            Notice::success(outcome.message_or(UPDATE_OK)),
            Some(refresh_after(EDIT_REDIRECT_SECS, LIST_PATH)),
        ),
        Ok(outcome) => (Notice::error(outcome.message_or(UPDATE_FAILED)), None),
        Err(e) => (Notice::error(e.display_message(UPDATE_FAILED)), None),
    };

    let page = CategoryFormTemplate {
        nav,
        notice: Some(notice),
        name: form.name,
        action,
        is_edit: true,
    };

    Ok(match redirect {
        Some(refresh) => (refresh, page).into_response(),
        None => page.into_response(),
    })
}
