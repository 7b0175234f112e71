pub mod diagnostics;
pub mod health;
pub mod pois;
pub mod ratings;
pub mod stats;
pub mod users;

pub use diagnostics::*;
pub use health::*;
pub use pois::*;
pub use ratings::*;
pub use stats::*;
pub use users::*;

use axum::http::{header, HeaderName, StatusCode};
use tracing::error;

use crate::db::StoreError;
use crate::models::{ApiError, ErrorResponse};

/// Turn a store failure into the matching HTTP error
pub(crate) fn store_failure(e: StoreError, context: &str) -> ApiError {
    match e {
        StoreError::Conflict(msg) => ErrorResponse::reply(StatusCode::CONFLICT, msg),
        other => {
            error!("{}: {}", context, other);
            ErrorResponse::reply(StatusCode::INTERNAL_SERVER_ERROR, context.to_string())
        }
    }
}

pub(crate) fn bad_request(msg: String) -> ApiError {
    ErrorResponse::reply(StatusCode::BAD_REQUEST, msg)
}

pub(crate) fn not_found(what: &str, id: impl std::fmt::Display) -> ApiError {
    ErrorResponse::reply(StatusCode::NOT_FOUND, format!("No {} found with ID {}", what, id))
}

pub(crate) fn location(path: String) -> [(HeaderName, String); 1] {
    [(header::LOCATION, path)]
}
