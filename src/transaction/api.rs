//! The JSON API for listing, creating and deleting transactions.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde_json::json;
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    database_id::TransactionId,
    transaction::{
        TransactionDto, TransactionRequest,
        core::{create_transaction, delete_transaction, list_transactions},
    },
};

const LIST_FAILED_MESSAGE: &str = "Could not load transactions";
const INVALID_BODY_MESSAGE: &str = "Request body must be a JSON object";
/// The message shown to clients when a transaction could not be created.
pub(crate) const CREATE_FAILED_MESSAGE: &str = "Could not create transaction";
/// The message shown to clients when a transaction could not be deleted.
pub(crate) const DELETE_FAILED_MESSAGE: &str = "Could not delete transaction";

/// The state needed to manage transactions through the API.
#[derive(Debug, Clone)]
pub struct TransactionApiState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for TransactionApiState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler that responds with all transactions as JSON, most recent first.
pub async fn list_transactions_endpoint(State(state): State<TransactionApiState>) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_json_response(LIST_FAILED_MESSAGE);
        }
    };

    match list_transactions(&connection) {
        Ok(transactions) => Json(
            transactions
                .into_iter()
                .map(TransactionDto::from)
                .collect::<Vec<_>>(),
        )
        .into_response(),
        Err(error) => {
            tracing::error!("could not list transactions: {error}");
            error.into_json_response(LIST_FAILED_MESSAGE)
        }
    }
}

/// A route handler for creating a new transaction.
///
/// Responds with 201 and the created transaction, or 400 with the reason the
/// request was rejected. Nothing is written to the database unless the
/// request passes validation.
pub async fn create_transaction_endpoint(
    State(state): State<TransactionApiState>,
    body: Result<Json<TransactionRequest>, JsonRejection>,
) -> Response {
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::info!("rejected transaction body: {}", rejection.body_text());
            return (
                rejection.status(),
                Json(json!({ "message": INVALID_BODY_MESSAGE })),
            )
                .into_response();
        }
    };

    let new_transaction = match request.validate(OffsetDateTime::now_utc()) {
        Ok(new_transaction) => new_transaction,
        Err(error) => {
            tracing::info!("rejected transaction: {error}");
            return Error::from(error).into_json_response(CREATE_FAILED_MESSAGE);
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_json_response(CREATE_FAILED_MESSAGE);
        }
    };

    match create_transaction(new_transaction, &connection) {
        Ok(transaction) => (
            StatusCode::CREATED,
            Json(TransactionDto::from(transaction)),
        )
            .into_response(),
        Err(error) => {
            tracing::error!("could not create transaction: {error}");
            error.into_json_response(CREATE_FAILED_MESSAGE)
        }
    }
}

/// A route handler for deleting a transaction.
///
/// The ID is taken as text so that a malformed ID gets the same JSON error
/// body as every other failure.
pub async fn delete_transaction_endpoint(
    State(state): State<TransactionApiState>,
    Path(raw_id): Path<String>,
) -> Response {
    let transaction_id = match parse_transaction_id(&raw_id) {
        Ok(transaction_id) => transaction_id,
        Err(error) => {
            tracing::info!("rejected delete request: {error}");
            return error.into_json_response(DELETE_FAILED_MESSAGE);
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_json_response(DELETE_FAILED_MESSAGE);
        }
    };

    match delete_transaction(transaction_id, &connection) {
        Ok(()) => Json(json!({ "success": true })).into_response(),
        Err(error) => {
            tracing::error!("Could not delete transaction {transaction_id}: {error}");
            error.into_json_response(DELETE_FAILED_MESSAGE)
        }
    }
}

/// Parse a transaction ID from a request path.
///
/// # Errors
/// Returns [Error::InvalidId] if `text` is not a positive integer.
pub(crate) fn parse_transaction_id(text: &str) -> Result<TransactionId, Error> {
    text.parse::<TransactionId>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| Error::InvalidId(text.to_owned()))
}
