//! Bazar Pepe REST API client.
//!
//! # Architecture
//!
//! - One method per remote operation, each issuing exactly one HTTP call
//! - The bearer token is passed per call; the client itself holds no session
//! - The shared response envelope is narrowed to a typed result per operation
//! - Errors are propagated untransformed; pages pick the message to display
//! - Product lookups for the cart are cached via `moka` (5 minute TTL)
//!
//! # Example
//!
//! ```rust,ignore
//! use bazar_pepe_storefront::bazar::BazarClient;
//!
//! let client = BazarClient::new(&config)?;
//!
//! let products = client.all_products().await?;
//! let user = client.current_user(Some(&token)).await?;
//! ```

mod client;
pub mod types;

pub use client::BazarClient;
pub use types::*;

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when calling the Bazar Pepe API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request could not be sent or the response could not be read.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("{}", format_server_error(*status, message.as_deref()))]
    Server { status: u16, message: Option<String> },

    /// The response body was not the expected JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The response lacked a field the operation needs.
    #[error("Missing field in API response: {0}")]
    MissingField(&'static str),

    /// The configured base URL cannot carry endpoint paths.
    #[error("Invalid API base URL: {0}")]
    InvalidBaseUrl(String),
}

impl ApiError {
    /// The structured `message` the server sent with an error, if any.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Server {
                message: Some(message),
                ..
            } => Some(message),
            _ => None,
        }
    }

    /// HTTP status of a server error.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Text to show the visitor: the server message, else this error's own
    /// description, else `default`.
    #[must_use]
    pub fn display_message(&self, default: &str) -> String {
        if let Some(message) = self.server_message() {
            return message.to_string();
        }
        let description = self.to_string();
        if description.trim().is_empty() {
            default.to_string()
        } else {
            description
        }
    }
}

fn format_server_error(status: u16, message: Option<&str>) -> String {
    message.map_or_else(
        || format!("Request failed with status code {status}"),
        ToString::to_string,
    )
}

/// Structured error body: `{"message": "..."}`.
#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Extract a structured message from an error body.
///
/// Anything that is not a JSON object with a non-empty `message` is treated
/// as unstructured.
pub(crate) fn parse_server_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.message)
        .filter(|message| !message.trim().is_empty())
}
