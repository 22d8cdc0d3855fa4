//! Transaction management for the money tracker.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and database functions for storing, listing and deleting transactions
//! - Validation of client input and the JSON wire format
//! - Totals and per-category summaries
//! - The JSON API route handlers

mod api;
mod core;
mod totals;
mod validation;
mod wire;

pub use api::{create_transaction_endpoint, delete_transaction_endpoint, list_transactions_endpoint};
pub use core::{
    NewTransaction, Transaction, TransactionType, create_transaction, create_transaction_table,
    delete_transaction, list_transactions,
};
pub use totals::{CategoryTotal, Totals, expenses_by_category};
pub use validation::{FieldInput, TransactionRequest, ValidationError};
pub use wire::TransactionDto;

pub(crate) use api::{CREATE_FAILED_MESSAGE, DELETE_FAILED_MESSAGE, parse_transaction_id};

#[cfg(test)]
pub use core::{count_transactions, get_transaction};
