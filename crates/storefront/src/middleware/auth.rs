//! Route guards and session extractors.
//!
//! [`RequireAuth`] and [`RequireAdmin`] gate pages on the visitor's stored
//! token and role. A visitor who fails the check is redirected to
//! `/login?from=<requested path>` and never sees the guarded page.

use axum::{
    extract::{FromRequestParts, OriginalUri},
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::error::AppError;
use crate::models::SessionState;

/// Where login sends the visitor when no usable `from` is given.
pub const DEFAULT_AFTER_LOGIN: &str = "/profile";

/// Extractor for the visitor's login state, guarded or not.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(CurrentSession(session): CurrentSession) -> impl IntoResponse {
///     if session.is_authenticated() { "Hello again!" } else { "Hello, guest!" }
/// }
/// ```
pub struct CurrentSession(pub SessionState);

/// Extractor that requires a stored token.
///
/// # Example
///
/// ```rust,ignore
/// async fn profile(RequireAuth(session): RequireAuth) -> impl IntoResponse {
///     // session.token() is present here
/// }
/// ```
pub struct RequireAuth(pub SessionState);

/// Extractor that requires the stored role to be `ADMIN`.
pub struct RequireAdmin(pub SessionState);

/// Error returned when a guard rejects the visitor.
#[derive(Debug)]
pub enum AuthRejection {
    /// Redirect to the login page, remembering the requested location.
    RedirectToLogin { from: String },
    /// The session layer is missing or failed.
    Session(AppError),
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin { from } => Redirect::to(&login_url(&from)).into_response(),
            Self::Session(err) => err.into_response(),
        }
    }
}

/// Login URL that returns to `from` afterwards.
#[must_use]
pub fn login_url(from: &str) -> String {
    format!("/login?from={}", urlencoding::encode(from))
}

/// Where to go after login: `from` if it is a local path, else the profile.
#[must_use]
pub fn safe_return_path(from: Option<&str>) -> &str {
    from.filter(|path| is_local_path(path))
        .unwrap_or(DEFAULT_AFTER_LOGIN)
}

/// A path on this site: starts with `/` but not `//` or `/\`, and is plain
/// visible ASCII so it can be echoed into headers.
#[must_use]
pub fn is_local_path(path: &str) -> bool {
    path.starts_with('/')
        && !path.starts_with("//")
        && !path.starts_with("/\\")
        && path.bytes().all(|b| b.is_ascii_graphic())
}

/// Read the session state from the request's session.
async fn load_session(parts: &Parts) -> Result<SessionState, AppError> {
    let session = parts.extensions.get::<Session>().ok_or_else(|| {
        AppError::Internal("session layer is not installed".to_string())
    })?;

    Ok(SessionState::load(session).await?)
}

/// Requested path plus query, as remembered in `from`.
///
/// Nested routers see the URI with their prefix stripped, so the original
/// URI is preferred when axum recorded it.
fn requested_location(parts: &Parts) -> String {
    let uri = parts
        .extensions
        .get::<OriginalUri>()
        .map_or(&parts.uri, |original| &original.0);

    uri.path_and_query()
        .map_or_else(|| uri.path().to_string(), ToString::to_string)
}

impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(load_session(parts).await?))
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = load_session(parts).await.map_err(AuthRejection::Session)?;

        if !session.is_authenticated() {
            tracing::debug!(path = %parts.uri.path(), "Guard: not authenticated");
            return Err(AuthRejection::RedirectToLogin {
                from: requested_location(parts),
            });
        }

        Ok(Self(session))
    }
}

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = load_session(parts).await.map_err(AuthRejection::Session)?;

        if !session.is_admin() {
            tracing::debug!(path = %parts.uri.path(), "Guard: not an admin");
            return Err(AuthRejection::RedirectToLogin {
                from: requested_location(parts),
            });
        }

        Ok(Self(session))
    }
}
