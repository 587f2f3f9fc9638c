//! HTTP error handling.
//!
//! Every error leaves the server as an XML document:
//!
//! ```xml
//! <error><code>400</code><message>No files uploaded</message><description>...</description></error>
//! ```

use axum::{
    extract::multipart::{MultipartError, MultipartRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::error::ServiceError;

/// XML error response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename = "error")]
pub struct ErrorBody {
    /// HTTP status code
    pub code: u16,
    pub message: String,
    pub description: String,
}

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Invalid request (validation error)
    BadRequest { message: String, description: String },
    /// Request body over the configured limit
    PayloadTooLarge(String),
    /// Known route, wrong method; carries the method the route accepts
    MethodNotAllowed(&'static str),
    NotFound,
    /// Internal server error
    Internal { message: String, description: String },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, description: impl Into<String>) -> Self {
        AppError::BadRequest {
            message: message.into(),
            description: description.into(),
        }
    }

    pub fn internal(message: impl Into<String>, description: impl Into<String>) -> Self {
        AppError::Internal {
            message: message.into(),
            description: description.into(),
        }
    }

    /// Map a service failure, using `message` as the headline for errors
    /// that carry no better one.
    pub fn from_service(message: &str, err: ServiceError) -> Self {
        match err {
            ServiceError::NoRecipients => AppError::bad_request(
                "Emails are required",
                "Please provide at least one email address.",
            ),
            ServiceError::InvalidRecipient(address) => AppError::bad_request(
                "Invalid email address",
                format!("'{}' is not a valid email address.", address),
            ),
            err if err.is_client_error() => AppError::bad_request(message, err.to_string()),
            err => AppError::internal(message, format!("{:#}", anyhow::Error::from(err))),
        }
    }

    pub fn from_multipart(err: MultipartError) -> Self {
        Self::multipart_failure(err.status(), err.body_text())
    }

    fn multipart_failure(status: StatusCode, details: String) -> Self {
        if status == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge(details)
        } else {
            AppError::bad_request("Failed to parse multipart form", details)
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn into_body(self) -> ErrorBody {
        let code = self.status().as_u16();
        let (message, description) = match self {
            AppError::BadRequest {
                message,
                description,
            }
            | AppError::Internal {
                message,
                description,
            } => (message, description),
            AppError::PayloadTooLarge(details) => ("Upload too large".to_string(), details),
            AppError::MethodNotAllowed(allowed) => (
                "Method not allowed".to_string(),
                format!("Only {} method is allowed for this operation.", allowed),
            ),
            AppError::NotFound => (
                "Not found".to_string(),
                "No such endpoint.".to_string(),
            ),
        };

        ErrorBody {
            code,
            message,
            description,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = self.into_body();

        if status.is_server_error() {
            error!(message = %body.message, description = %body.description, "request failed");
        } else {
            warn!(code = body.code, message = %body.message, "request rejected");
        }

        match quick_xml::se::to_string(&body) {
            Ok(xml) => (status, [(header::CONTENT_TYPE, "application/xml")], xml).into_response(),
            Err(e) => {
                error!("failed to encode error body: {}", e);
                (status, body.message).into_response()
            }
        }
    }
}

impl From<MultipartRejection> for AppError {
    fn from(rejection: MultipartRejection) -> Self {
        Self::multipart_failure(rejection.status(), rejection.body_text())
    }
}
