//! Money Tracker is a web app for recording personal income and expenses.
//!
//! This library provides a JSON API for managing transactions and a dashboard
//! page, served as HTML, that shows the totals and a breakdown of expenses by
//! category.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use tokio::signal;

mod app_state;
mod dashboard;
mod database_id;
mod db;
mod endpoints;
mod html;
mod internal_server_error;
mod logging;
mod not_found;
mod routing;
mod timezone;
mod transaction;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use database_id::{DatabaseId, TransactionId};
pub use db::initialize as initialize_db;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::build_router;
pub use timezone::get_local_offset;
pub use transaction::{
    CategoryTotal, FieldInput, NewTransaction, Totals, Transaction, TransactionDto,
    TransactionRequest, TransactionType, ValidationError,
};

use crate::{internal_server_error::InternalServerError, not_found::get_404_not_found_response};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The client sent a transaction that failed validation.
    ///
    /// The inner error names the first rule that failed and its message is
    /// safe to show to the client.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The transaction ID in the request path is not a positive integer.
    #[error("{0:?} is not a valid transaction ID")]
    InvalidId(String),

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows or a
    /// delete did not affect any rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    ///
    /// The error should only be logged on the server. When communicating with
    /// the client this error must be replaced with a generic message.
    #[error("an unexpected SQL error occurred: {0}")]
    PersistenceError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::PersistenceError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => get_404_not_found_response(),
            Error::InvalidTimezoneError(timezone) => InternalServerError {
                description: "Invalid Timezone Settings",
                fix: &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            }
            .into_response(),
            Error::DatabaseLockError => InternalServerError::default().into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    /// The status code and message to show the client for this error.
    ///
    /// Client errors keep their own message. Everything else is reported with
    /// `failure_message` so that internal details never leave the server.
    pub(crate) fn status_and_message(&self, failure_message: &str) -> (StatusCode, String) {
        match self {
            Error::Validation(error) => (StatusCode::BAD_REQUEST, error.to_string()),
            Error::InvalidId(_) => (
                StatusCode::BAD_REQUEST,
                "Invalid transaction ID".to_owned(),
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                failure_message.to_owned(),
            ),
        }
    }

    /// Render the error as a JSON body of the form `{"message": "..."}`.
    pub(crate) fn into_json_response(self, failure_message: &str) -> Response {
        let (status, message) = self.status_and_message(failure_message);

        (status, Json(json!({ "message": message }))).into_response()
    }
}
