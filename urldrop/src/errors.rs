use std::any::Any;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error as ThisError;

use crate::api::models::submissions::SubmitResponse;
use crate::notion::NotionError;

#[derive(ThisError, Debug)]
pub enum Error {
    /// Any verb other than POST on the submission endpoint
    #[error("Method {method} not allowed")]
    MethodNotAllowed { method: String },

    /// Notion credentials are absent from the process configuration
    #[error("{missing} required")]
    MissingConfiguration { missing: String },

    /// Request body has no usable `url`
    #[error("url is required")]
    UrlRequired,

    /// `url` is present but is not an absolute URL
    #[error("invalid url: {reason}")]
    InvalidUrl { reason: url::ParseError },

    /// A field is present with the wrong JSON type
    #[error("{field} must be {expected}")]
    InvalidField { field: &'static str, expected: &'static str },

    /// Notion answered with a non-success status; relayed verbatim
    #[error("Notion rejected the page with status {status}")]
    Notion { status: StatusCode, detail: String },

    /// Unexpected error with full context chain
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            Error::MissingConfiguration { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Error::UrlRequired | Error::InvalidUrl { .. } | Error::InvalidField { .. } => StatusCode::BAD_REQUEST,
            Error::Notion { status, .. } => *status,
            Error::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable tag carried in the `error` field of the response envelope
    pub fn tag(&self) -> &'static str {
        match self {
            Error::MethodNotAllowed { .. } => "method_not_allowed",
            Error::MissingConfiguration { .. } => "missing_env",
            Error::UrlRequired => "url_required",
            Error::InvalidUrl { .. } => "invalid_url",
            Error::InvalidField { .. } => "invalid_field",
            Error::Notion { .. } => "notion_error",
            Error::Other(_) => "server_error",
        }
    }

    /// Human-readable detail shown to the submitter.
    ///
    /// Notion rejections carry the downstream body untouched; unexpected errors carry their
    /// context chain on a best-effort basis.
    pub fn detail(&self) -> String {
        match self {
            Error::Notion { detail, .. } => detail.clone(),
            Error::Other(e) => format!("{e:#}"),
            _ => self.to_string(),
        }
    }
}

impl From<NotionError> for Error {
    fn from(err: NotionError) -> Self {
        match err {
            NotionError::Rejected { status, body } => Error::Notion { status, detail: body },
            other => Error::Other(other.into()),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match &self {
            Error::Other(_) | Error::MissingConfiguration { .. } => {
                tracing::error!("Submission failed: {:#}", self);
            }
            Error::Notion { status, .. } => {
                tracing::warn!(status = %status, "Notion rejected submission");
            }
            Error::MethodNotAllowed { .. } | Error::UrlRequired | Error::InvalidUrl { .. } | Error::InvalidField { .. } => {
                tracing::debug!("Client error: {}", self);
            }
        }

        let status = self.status_code();
        let body = SubmitResponse::rejected(self.tag(), Some(self.detail()));
        (status, Json(body)).into_response()
    }
}

/// Render a panic inside the router as the `server_error` envelope.
///
/// Installed through `tower_http::catch_panic::CatchPanicLayer::custom`.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else {
        "handler panicked".to_string()
    };

    tracing::error!(detail = %detail, "Request handler panicked");

    let body = SubmitResponse::rejected("server_error", Some(detail));
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}

/// Type alias for handler results
pub type Result<T> = std::result::Result<T, Error>;
