//! Dashboard HTTP handlers.
//!
//! Each handler loads the transactions into a [DashboardStore], applies the
//! request to the database and records the outcome in the store, then
//! renders the store. HTMX requests get only the dashboard content back.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use rusqlite::Connection;
use serde::Deserialize;
use time::{Date, OffsetDateTime};

use crate::{
    AppState, Error,
    dashboard::{
        store::{DashboardStore, FormState},
        view::{dashboard_content, dashboard_page},
    },
    routing::get_internal_server_error_redirect,
    timezone::get_local_offset,
    transaction::{
        CREATE_FAILED_MESSAGE, DELETE_FAILED_MESSAGE, FieldInput, TransactionRequest,
        TransactionType, create_transaction, delete_transaction, list_transactions,
        parse_transaction_id,
    },
};

/// The state needed for displaying and updating the dashboard.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The new transaction form as submitted by the browser.
///
/// Empty fields are deserialized as `None`.
#[derive(Debug, Default, Deserialize)]
pub struct TransactionForm {
    pub amount: Option<String>,
    pub category: Option<String>,
    pub note: Option<String>,
    #[serde(rename = "type")]
    pub type_: Option<String>,
    pub date: Option<String>,
}

impl From<&TransactionForm> for FormState {
    fn from(form: &TransactionForm) -> Self {
        Self {
            amount: form.amount.clone().unwrap_or_default(),
            category: form.category.clone().unwrap_or_default(),
            note: form.note.clone().unwrap_or_default(),
            date: form.date.clone().unwrap_or_default(),
            type_: form
                .type_
                .as_deref()
                .and_then(TransactionType::parse)
                .unwrap_or(TransactionType::Expense),
        }
    }
}

impl From<TransactionForm> for TransactionRequest {
    fn from(form: TransactionForm) -> Self {
        Self {
            amount: form.amount.map(FieldInput::Text),
            category: form.category.map(FieldInput::Text),
            note: form.note.map(FieldInput::Text),
            type_: form.type_.map(FieldInput::Text),
            date: form.date.map(FieldInput::Text),
        }
    }
}

/// Display the dashboard with all transactions, the totals and the category breakdown.
pub async fn get_dashboard_page(State(state): State<DashboardState>) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let store = load_store(&connection, &state.local_timezone)?;

    Ok(dashboard_page(&store).into_response())
}

/// Create a transaction from the dashboard form and respond with the updated dashboard content.
///
/// If the transaction is rejected or cannot be saved, the content is
/// rendered with the error message and the values the user submitted. If the
/// dashboard itself cannot be loaded, HTMX is redirected to the error page.
pub async fn submit_transaction_form(
    State(state): State<DashboardState>,
    Form(form): Form<TransactionForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return get_internal_server_error_redirect();
        }
    };

    let mut store = match load_store(&connection, &state.local_timezone) {
        Ok(store) => store,
        Err(error) => {
            tracing::error!("could not load the dashboard: {error}");
            return get_internal_server_error_redirect();
        }
    };
    let submitted_form = FormState::from(&form);

    let result = TransactionRequest::from(form)
        .validate(OffsetDateTime::now_utc())
        .map_err(Error::from)
        .and_then(|new_transaction| create_transaction(new_transaction, &connection));

    let status = match result {
        Ok(transaction) => {
            tracing::debug!("created transaction {}", transaction.id);
            store.record_created(transaction);
            StatusCode::OK
        }
        Err(error) => {
            log_failure("could not create transaction", &error);
            let (status, message) = error.status_and_message(CREATE_FAILED_MESSAGE);
            store.set_form(submitted_form);
            store.record_failure(message);
            status
        }
    };

    (status, dashboard_content(&store)).into_response()
}

/// Delete a transaction from the dashboard and respond with the updated dashboard content.
pub async fn delete_transaction_from_dashboard(
    State(state): State<DashboardState>,
    Path(raw_id): Path<String>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return get_internal_server_error_redirect();
        }
    };

    let mut store = match load_store(&connection, &state.local_timezone) {
        Ok(store) => store,
        Err(error) => {
            tracing::error!("could not load the dashboard: {error}");
            return get_internal_server_error_redirect();
        }
    };

    let result = parse_transaction_id(&raw_id).and_then(|transaction_id| {
        delete_transaction(transaction_id, &connection).map(|()| transaction_id)
    });

    let status = match result {
        Ok(transaction_id) => {
            store.record_deleted(transaction_id);
            StatusCode::OK
        }
        Err(error) => {
            log_failure("could not delete transaction", &error);
            let (status, message) = error.status_and_message(DELETE_FAILED_MESSAGE);
            store.record_failure(message);
            status
        }
    };

    (status, dashboard_content(&store)).into_response()
}

fn load_store(connection: &Connection, local_timezone: &str) -> Result<DashboardStore, Error> {
    let today = get_local_today(local_timezone)?;
    let transactions = list_transactions(connection)
        .inspect_err(|error| tracing::error!("could not list transactions: {error}"))?;

    Ok(DashboardStore::new(transactions, today))
}

fn get_local_today(local_timezone: &str) -> Result<Date, Error> {
    let local_offset = get_local_offset(local_timezone).ok_or_else(|| {
        tracing::error!("Invalid timezone {}", local_timezone);
        Error::InvalidTimezoneError(local_timezone.to_owned())
    })?;

    Ok(OffsetDateTime::now_utc().to_offset(local_offset).date())
}

fn log_failure(context: &str, error: &Error) {
    match error {
        Error::Validation(_) | Error::InvalidId(_) => tracing::info!("{context}: {error}"),
        _ => tracing::error!("{context}: {error}"),
    }
}
