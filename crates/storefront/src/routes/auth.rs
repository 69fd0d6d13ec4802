//! Authentication route handlers.
//!
//! Login stores the API's bearer token and role in the session; logout erases
//! them and leaves the cart alone. Success pages navigate on after a short
//! delay through a `Refresh` header.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::bazar::{ApiError, LoginRequest, RegisterRequest};
use crate::error::{Result, add_breadcrumb, clear_sentry_user};
use crate::filters;
use crate::middleware::{CurrentSession, safe_return_path};
use crate::models::SessionState;
use crate::state::AppState;
use crate::views::{NavView, Notice, refresh_after};

const LOGIN_OK: &str = "Se ha iniciado sesión con éxito";
const LOGIN_FAILED: &str = "No se ha podido iniciar sesión";
const REGISTER_OK: &str = "Usuario registrado con éxito";
const REGISTER_FAILED: &str = "No se ha podido registrar al usuario";
const EMAIL_TAKEN: &str = "El correo ya existe, intenta con otro.";

/// Server message fragment that marks an already registered email.
const DUPLICATE_ENTRY: &str = "Duplicate entry";

const LOGIN_REDIRECT_SECS: u32 = 4;
const REGISTER_REDIRECT_SECS: u32 = 4;
const LOGOUT_REDIRECT_SECS: u32 = 1;

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub nav: NavView,
    pub notice: Option<Notice>,
    pub email: String,
    pub from: Option<String>,
}

/// Registration page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub nav: NavView,
    pub notice: Option<Notice>,
    pub email: String,
    pub name: String,
    pub phone_number: String,
}

/// Page shown while logout navigates to the login page.
#[derive(Template, WebTemplate)]
#[template(path = "auth/logged_out.html")]
pub struct LoggedOutTemplate {
    pub nav: NavView,
    pub notice: Option<Notice>,
}

// =============================================================================
// Forms
// =============================================================================

/// `?from=` query of the login page.
#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    pub from: Option<String>,
}

/// Login form data; `from` round-trips the guarded page.
#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub from: Option<String>,
}

impl LoginForm {
    fn credentials(&self) -> LoginRequest {
        LoginRequest {
            email: self.email.clone(),
            password: self.password.clone(),
        }
    }

    /// `from`, with an empty value treated as absent.
    fn return_path(&self) -> Option<&str> {
        self.from.as_deref().filter(|from| !from.is_empty())
    }
}

/// Display message for a failed registration.
fn register_error_message(err: &ApiError) -> String {
    match err.server_message() {
        Some(message) if message.contains(DUPLICATE_ENTRY) => EMAIL_TAKEN.to_string(),
        _ => err.display_message(REGISTER_FAILED),
    }
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
#[instrument(skip(session, login))]
pub async fn login_page(
    session: Session,
    CurrentSession(login): CurrentSession,
    Query(query): Query<LoginQuery>,
) -> Result<LoginTemplate> {
    Ok(LoginTemplate {
        nav: NavView::load(&session, &login).await?,
        notice: None,
        email: String::new(),
        from: query.from,
    })
}

/// Handle login form submission.
///
/// On success the token and role are stored and the visitor is sent to the
/// page that required login, or to their profile.
#[instrument(skip(state, session, login, form), fields(email = %form.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    CurrentSession(login): CurrentSession,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let outcome = match state.api().login(&form.credentials()).await {
        Ok(response) if response.status == 200 => Ok(response),
        Ok(response) => Err(response.message.unwrap_or_else(|| LOGIN_FAILED.to_string())),
        Err(e) => {
            tracing::warn!(error = %e, "Login failed");
            Err(e.display_message(LOGIN_FAILED))
        }
    };

    match outcome {
        Ok(response) => {
            SessionState::store_login(&session, &response.token, &response.role).await?;
            add_breadcrumb("auth", "Logged in", Some(&[("role", response.role.as_str())]));

            let login = SessionState::load(&session).await?;
            let target = safe_return_path(form.return_path()).to_string();
            let page = LoginTemplate {
                nav: NavView::load(&session, &login).await?,
                notice: Some(Notice::success(LOGIN_OK)),
                email: form.email,
                from: None,
            };

            Ok((refresh_after(LOGIN_REDIRECT_SECS, &target), page).into_response())
        }
        Err(message) => {
            let page = LoginTemplate {
                nav: NavView::load(&session, &login).await?,
                notice: Some(Notice::error(message)),
                from: form.return_path().map(str::to_string),
                email: form.email,
            };
            Ok(page.into_response())
        }
    }
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
#[instrument(skip(session, login))]
pub async fn register_page(
    session: Session,
    CurrentSession(login): CurrentSession,
) -> Result<RegisterTemplate> {
    Ok(RegisterTemplate {
        nav: NavView::load(&session, &login).await?,
        notice: None,
        email: String::new(),
        name: String::new(),
        phone_number: String::new(),
    })
}

/// Handle registration form submission.
#[instrument(skip(state, session, login, form), fields(email = %form.email))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    CurrentSession(login): CurrentSession,
    Form(form): Form<RegisterRequest>,
) -> Result<Response> {
    let nav = NavView::load(&session, &login).await?;

    match state.api().register(&form).await {
        Ok(outcome) if outcome.is_ok() => {
            let page = RegisterTemplate {
                nav,
                notice: Some(Notice::success(outcome.message_or(REGISTER_OK))),
                email: String::new(),
                name: String::new(),
                phone_number: String::new(),
            };
            Ok((refresh_after(REGISTER_REDIRECT_SECS, "/login"), page).into_response())
        }
        outcome => {
            let message = match outcome {
                Ok(outcome) => outcome.message_or(REGISTER_FAILED).to_string(),
                Err(e) => {
                    tracing::warn!(error = %e, "Registration failed");
                    register_error_message(&e)
                }
            };
            let page = RegisterTemplate {
                nav,
                notice: Some(Notice::error(message)),
                email: form.email,
                name: form.name,
                phone_number: form.phone_number,
            };
            Ok(page.into_response())
        }
    }
}

// =============================================================================
// Logout
// =============================================================================

/// Handle logout.
///
/// Erases the token and role; the cart survives.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Response> {
    SessionState::clear(&session).await?;
    clear_sentry_user();

    let page = LoggedOutTemplate {
        nav: NavView::load(&session, &SessionState::default()).await?,
        notice: None,
    };

    Ok((refresh_after(LOGOUT_REDIRECT_SECS, "/login"), page).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_email_message() {
        let err = ApiError::Server {
            status: 500,
            message: Some("Duplicate entry 'a@b.es' for key 'users.email'".to_string()),
        };
        assert_eq!(register_error_message(&err), EMAIL_TAKEN);
    }

    #[test]
    fn test_other_register_errors_keep_server_message() {
        let err = ApiError::Server {
            status: 400,
            message: Some("Phone number required".to_string()),
        };
        assert_eq!(register_error_message(&err), "Phone number required");

        let err = ApiError::Server {
            status: 500,
            message: None,
        };
        assert_eq!(
            register_error_message(&err),
            "Request failed with status code 500"
        );
    }

    #[test]
    fn test_empty_from_is_absent() {
        let form = LoginForm {
            email: "a@b.es".to_string(),
            password: "secret".to_string(),
            from: Some(String::new()),
        };
        assert_eq!(form.return_path(), None);
    }
}
