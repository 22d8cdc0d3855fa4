//! The JSON representation of transactions.

use serde::{Deserialize, Serialize};
use time::{
    OffsetDateTime, UtcOffset, format_description::BorrowedFormatItem,
    macros::format_description,
};

use crate::{
    database_id::TransactionId,
    transaction::{
        core::{Transaction, TransactionType},
        validation::{FieldInput, TransactionRequest},
    },
};

/// A transaction as it is sent to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionDto {
    /// The ID assigned by the database.
    pub id: TransactionId,
    /// The amount of money, always positive.
    pub amount: f64,
    /// The category label.
    pub category: String,
    /// The note, empty if there is none.
    pub note: String,
    /// Whether the money was earned or spent.
    #[serde(rename = "type")]
    pub type_: TransactionType,
    /// The date as an ISO 8601 UTC string with milliseconds, e.g. "2024-01-01T00:00:00.000Z".
    pub date: String,
}

impl From<Transaction> for TransactionDto {
    fn from(transaction: Transaction) -> Self {
        Self {
            id: transaction.id,
            amount: transaction.amount,
            category: transaction.category,
            note: transaction.note.unwrap_or_default(),
            type_: transaction.type_,
            date: format_iso_date(transaction.date),
        }
    }
}

/// A DTO can be submitted again as a request, e.g. to restore a deleted
/// transaction. The ID is dropped since the database assigns a new one.
impl From<TransactionDto> for TransactionRequest {
    fn from(dto: TransactionDto) -> Self {
        Self {
            amount: Some(FieldInput::Number(dto.amount)),
            category: Some(FieldInput::Text(dto.category)),
            note: Some(FieldInput::Text(dto.note)),
            type_: Some(dto.type_.as_str().into()),
            date: Some(FieldInput::Text(dto.date)),
        }
    }
}

const ISO_DATE_FORMAT: &[BorrowedFormatItem] = format_description!(
    "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z"
);

/// Format `date_time` in UTC as `YYYY-MM-DDTHH:MM:SS.mmmZ`.
pub fn format_iso_date(date_time: OffsetDateTime) -> String {
    let utc = date_time.to_offset(UtcOffset::UTC);

    utc.format(ISO_DATE_FORMAT)
        .unwrap_or_else(|_| utc.to_string())
}
