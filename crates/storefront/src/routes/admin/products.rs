//! Product management.
//!
//! Product forms are `multipart/form-data` with the fields `image`,
//! `categoryId`, `name`, `description` and `price`, forwarded to the API as
//! received. On edit an empty file input keeps the stored image.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Multipart, Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use bazar_pepe_core::pagination::DEFAULT_PER_PAGE;
use bazar_pepe_core::{CategoryId, Pagination, ProductId};

use crate::bazar::{BazarClient, Category, ImageUpload, Product, ProductForm};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::models::SessionState;
use crate::routes::PageQuery;
use crate::state::AppState;
use crate::views::{NavView, Notice, PageLink, page_links, refresh_after};

const LIST_FAILED: &str = "No se ha conseguido cargar los productos";
const DELETE_FAILED: &str = "No se ha podido borrar el producto";
const ADD_OK: &str = "Producto añadido correctamente";
const ADD_FAILED: &str = "No se ha podido añadir el producto";
const LOAD_FAILED: &str = "No se puede obtener el producto";
const UPDATE_OK: &str = "Producto actualizado correctamente";
const UPDATE_FAILED: &str = "No se ha podido actualizar el producto";
const CATEGORY_REQUIRED: &str = "Selecciona una categoría";
const CATEGORIES_FAILED: &str = "No se puede obtener las categorias";

const SAVE_REDIRECT_SECS: u32 = 3;
const LIST_PATH: &str = "/admin/products";

/// One row of the admin product list.
#[derive(Debug, Clone)]
pub struct ProductRow {
    pub product: Product,
    pub image_src: Option<String>,
}

/// Product list template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/products.html")]
pub struct ProductsTemplate {
    pub nav: NavView,
    pub notice: Option<Notice>,
    pub products: Vec<ProductRow>,
    pub pages: Vec<PageLink>,
}

/// Values of the product form as entered.
#[derive(Debug, Clone, Default)]
pub struct ProductFields {
    pub category_id: String,
    pub name: String,
    pub description: String,
    pub price: String,
    pub image: Option<ImageUpload>,
}

impl ProductFields {
    fn from_product(product: &Product) -> Self {
        Self {
            category_id: product
                .category_id()
                .map(|id| id.to_string())
                .unwrap_or_default(),
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price.to_string(),
            image: None,
        }
    }

    /// Read the fields of a product form; unknown fields are ignored.
    async fn from_multipart(mut multipart: Multipart) -> Result<Self> {
        let mut fields = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?
        {
            let name = field.name().unwrap_or_default().to_string();

            if name == "image" {
                let file_name = field.file_name().unwrap_or("image").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;

                // No file chosen.
                if !bytes.is_empty() {
                    fields.image = Some(ImageUpload {
                        file_name,
                        content_type,
                        bytes: bytes.to_vec(),
                    });
                }
                continue;
            }

            let value = field
                .text()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;

            match name.as_str() {
                "categoryId" => fields.category_id = value,
                "name" => fields.name = value,
                "description" => fields.description = value,
                "price" => fields.price = value,
                _ => {}
            }
        }

        Ok(fields)
    }

    /// Form to send to the API, or `None` when no category is selected.
    fn to_form(&self) -> Option<ProductForm> {
        let category_id = self.category_id.trim().parse::<CategoryId>().ok()?;
        Some(ProductForm {
            category_id,
            name: self.name.clone(),
            description: self.description.clone(),
            price: self.price.clone(),
            image: self.image.clone(),
        })
    }

    fn is_selected(&self, category: &Category) -> bool {
        self.category_id.trim() == category.id.to_string()
    }

    /// Entries of the category select for these values.
    fn category_options(&self, categories: Vec<Category>) -> Vec<CategoryOption> {
        categories
            .into_iter()
            .map(|category| CategoryOption {
                selected: self.is_selected(&category),
                id: category.id,
                name: category.name,
            })
            .collect()
    }
}

/// One entry of the category select.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryOption {
    pub id: CategoryId,
    pub name: String,
    pub selected: bool,
}

/// Add or edit product form template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/product_form.html")]
pub struct ProductFormTemplate {
    pub nav: NavView,
    pub notice: Option<Notice>,
    pub categories: Vec<CategoryOption>,
    pub fields: ProductFields,
    /// Stored image of the product being edited.
    pub image_src: Option<String>,
    pub action: String,
    pub is_edit: bool,
}

/// Categories for the form's select, or the notice to show instead.
async fn load_categories(api: &BazarClient) -> (Vec<Category>, Option<Notice>) {
    match api.categories().await {
        Ok(categories) => (categories, None),
        Err(e) => (
            Vec::new(),
            Some(Notice::error(e.display_message(CATEGORIES_FAILED))),
        ),
    }
}

async fn render_list(
    state: &AppState,
    session: &Session,
    login: &SessionState,
    page: usize,
    notice: Option<Notice>,
) -> Result<ProductsTemplate> {
    let nav = NavView::load(session, login).await?;

    let (products, list_notice) = match state.api().all_products().await {
        Ok(products) => (products, None),
        Err(e) => (Vec::new(), Some(Notice::error(e.display_message(LIST_FAILED)))),
    };

    let pagination = Pagination::new(products.len(), DEFAULT_PER_PAGE, page);
    let rows = pagination
        .slice(&products)
        .iter()
        .map(|product| ProductRow {
            image_src: product.image_data_url(),
            product: product.clone(),
        })
        .collect();

    Ok(ProductsTemplate {
        nav,
        notice: notice.or(list_notice),
        products: rows,
        pages: page_links(&pagination, |n| format!("{LIST_PATH}?page={n}")),
    })
}

/// Display the product list, four per page.
#[instrument(skip(state, session, login))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(login): RequireAdmin,
    Query(query): Query<PageQuery>,
) -> Result<ProductsTemplate> {
    render_list(&state, &session, &login, query.page(), None).await
}

/// Delete a product, then show the list again.
#[instrument(skip(state, session, login))]
pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(login): RequireAdmin,
    Path(id): Path<ProductId>,
) -> Result<Response> {
    let message = match state.api().delete_product(login.token(), id).await {
        Ok(outcome) if outcome.is_ok() => {
            tracing::info!(product_id = %id, "Product deleted");
            return Ok(Redirect::to(LIST_PATH).into_response());
        }
        Ok(outcome) => outcome.message_or(DELETE_FAILED).to_string(),
        Err(e) => e.display_message(DELETE_FAILED),
    };

    let page = render_list(&state, &session, &login, 1, Some(Notice::error(message))).await?;
    Ok(page.into_response())
}

/// Display the empty product form.
#[instrument(skip(state, session, login))]
pub async fn add_page(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(login): RequireAdmin,
) -> Result<ProductFormTemplate> {
    let (categories, notice) = load_categories(state.api()).await;

    Ok(ProductFormTemplate {
        nav: NavView::load(&session, &login).await?,
        notice,
        categories: ProductFields::default().category_options(categories),
        fields: ProductFields::default(),
        image_src: None,
        action: "/admin/add-product".to_string(),
        is_edit: false,
    })
}

/// Create a product.
#[instrument(skip(state, session, login, multipart))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(login): RequireAdmin,
    multipart: Multipart,
) -> Result<Response> {
    let fields = ProductFields::from_multipart(multipart).await?;

    let outcome = match fields.to_form() {
        Some(form) => state
            .api()
            .create_product(login.token(), form)
            .await
            .map_err(|e| e.display_message(ADD_FAILED))
            .and_then(|outcome| {
                if outcome.is_ok() {
                    Ok(outcome.message_or(ADD_OK).to_string())
                } else {
                    Err(outcome.message_or(ADD_FAILED).to_string())
                }
            }),
        None => Err(CATEGORY_REQUIRED.to_string()),
    };

    let (categories, _) = load_categories(state.api()).await;
    let nav = NavView::load(&session, &login).await?;
    let action = "/admin/add-product".to_string();

    match outcome {
        Ok(message) => {
            tracing::info!(name = %fields.name, "Product created");
            let page = ProductFormTemplate {
                nav,
                notice: Some(Notice::success(message)),
                categories: ProductFields::default().category_options(categories),
                fields: ProductFields::default(),
                image_src: None,
                action,
                is_edit: false,
            };
            Ok((refresh_after(SAVE_REDIRECT_SECS, LIST_PATH), page).into_response())
        }
        Err(message) => {
            let page = ProductFormTemplate {
                nav,
                notice: Some(Notice::error(message)),
                categories: fields.category_options(categories),
                fields: ProductFields {
                    image: None,
                    ..fields
                },
                image_src: None,
                action,
                is_edit: false,
            };
            Ok(page.into_response())
        }
    }
}

/// Display the product form filled with the stored product.
#[instrument(skip(state, session, login))]
pub async fn edit_page(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(login): RequireAdmin,
    Path(id): Path<ProductId>,
) -> Result<ProductFormTemplate> {
    let (categories, categories_notice) = load_categories(state.api()).await;

    let (fields, image_src, notice) = match state.api().product(id).await {
        Ok(product) => (
            ProductFields::from_product(&product),
            product.image_data_url(),
            categories_notice,
        ),
        Err(e) => (
            ProductFields::default(),
            None,
            Some(Notice::error(e.display_message(LOAD_FAILED))),
        ),
    };

    Ok(ProductFormTemplate {
        nav: NavView::load(&session, &login).await?,
        notice,
        categories: fields.category_options(categories),
        fields,
        image_src,
        action: format!("/admin/edit-product/{id}"),
        is_edit: true,
    })
}

/// Update a product; the stored image is kept unless a new one is sent.
#[instrument(skip(state, session, login, multipart))]
pub async fn edit(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(login): RequireAdmin,
    Path(id): Path<ProductId>,
    multipart: Multipart,
) -> Result<Response> {
    let fields = ProductFields::from_multipart(multipart).await?;

    let outcome = match fields.to_form() {
        Some(form) => state
            .api()
            .update_product(login.token(), id, form)
            .await
            .map_err(|e| e.display_message(UPDATE_FAILED))
            .and_then(|outcome| {
                if outcome.is_ok() {
                    Ok(())
                } else {
                    Err(outcome.message_or(UPDATE_FAILED).to_string())
                }
            }),
        None => Err(CATEGORY_REQUIRED.to_string()),
    };

    let (categories, _) = load_categories(state.api()).await;
    let image_src = state
        .api()
        .product(id)
        .await
        .ok()
        .and_then(|product| product.image_data_url());

    let (notice, refresh) = match outcome {
        Ok(()) => {
            tracing::info!(product_id = %id, "Product updated");
            (
                Notice::success(UPDATE_OK),
                Some(refresh_after(SAVE_REDIRECT_SECS, LIST_PATH)),
            )
        }
        Err(message) => (Notice::error(message), None),
    };

    let page = ProductFormTemplate {
        nav: NavView::load(&session, &login).await?,
        notice: Some(notice),
        categories: fields.category_options(categories),
        fields: ProductFields {
            image: None,
            ..fields
        },
        image_src,
        action: format!("/admin/edit-product/{id}"),
        is_edit: true,
    };

    Ok(match refresh {
        Some(refresh) => (refresh, page).into_response(),
        None => page.into_response(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_form_requires_category() {
        let fields = ProductFields {
            name: "Mug".to_string(),
            price: "4.50".to_string(),
            ..ProductFields::default()
        };
        assert!(fields.to_form().is_none());

        let fields = ProductFields {
            category_id: " 3 ".to_string(),
            ..fields
        };
        let form = fields.to_form().unwrap();
        assert_eq!(form.category_id, CategoryId::new(3));
        assert_eq!(form.price, "4.50");
        assert!(form.image.is_none());
    }

    #[test]
    fn test_category_options_mark_current_category() {
        let category = |id: i64, name: &str| Category {
            id: CategoryId::new(id),
            name: name.to_string(),
            product_list: Vec::new(),
        };
        let fields = ProductFields {
            category_id: "7".to_string(),
            ..ProductFields::default()
        };

        let options = fields.category_options(vec![category(3, "Hogar"), category(7, "Cocina")]);

        assert_eq!(options.len(), 2);
        assert!(!options[0].selected);
        assert!(options[1].selected);
        assert_eq!(options[1].name, "Cocina");
        assert!(
            ProductFields::default()
                .category_options(vec![category(7, "Cocina")])
                .iter()
                .all(|option| !option.selected)
        );
    }
}
