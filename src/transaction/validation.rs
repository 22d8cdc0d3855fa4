//! Validation of client input for new transactions.
//!
//! Clients send loosely typed input (any field may be missing or hold the
//! wrong kind of JSON value). [TransactionRequest::validate] turns that input into
//! a [NewTransaction] or rejects it with the first rule that failed.

use serde::Deserialize;
use serde_json::{Value, value::RawValue};
use time::{
    Date, OffsetDateTime, PrimitiveDateTime, UtcOffset,
    format_description::{BorrowedFormatItem, well_known::Rfc3339},
    macros::format_description,
};

use crate::transaction::core::{NewTransaction, TransactionType};

const DATE_FORMAT: &[BorrowedFormatItem<'_>] = format_description!("[year]-[month]-[day]");

/// Date-times without an offset are read as UTC.
const DATE_TIME_FORMATS: [&[BorrowedFormatItem<'_>]; 3] = [
    format_description!("[year]-[month]-[day]T[hour]:[minute]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
];

/// The reasons a transaction can be rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The amount is missing, not a number, not finite, or not greater than zero.
    #[error("Amount must be a number greater than 0")]
    InvalidAmount,
    /// The category is missing or only contains whitespace.
    #[error("Category cannot be empty")]
    EmptyCategory,
    /// The type is missing or is not exactly "INCOME" or "EXPENSE".
    #[error("Type must be either INCOME or EXPENSE")]
    InvalidType,
    /// The date could not be parsed as a calendar date.
    #[error("Date is not a valid calendar date")]
    InvalidDate,
}

/// A field as sent by a client, before its type has been checked.
///
/// JSON clients may send any kind of value for any field. Keeping the kind
/// around lets [TransactionRequest::validate] reject a wrongly typed field
/// with the same error as a wrong value, in the usual rule order.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldInput {
    /// A JSON string or a form field, e.g. `"12.5"`.
    Text(String),
    /// A JSON number. Numbers too large for an `f64` are infinite.
    Number(f64),
    /// A JSON boolean.
    Bool(bool),
    /// A JSON array or object.
    Other,
}

impl FieldInput {
    fn from_json(raw: &RawValue) -> Self {
        match serde_json::from_str::<Value>(raw.get()) {
            Ok(Value::String(text)) => FieldInput::Text(text),
            Ok(Value::Number(number)) => number
                .as_f64()
                .map_or(FieldInput::Other, FieldInput::Number),
            Ok(Value::Bool(value)) => FieldInput::Bool(value),
            Ok(_) => FieldInput::Other,
            // serde_json refuses numbers outside the range of f64, e.g. 1e400.
            Err(_) => raw
                .get()
                .parse()
                .map_or(FieldInput::Other, FieldInput::Number),
        }
    }

    fn as_text(&self) -> Option<&str> {
        match self {
            FieldInput::Text(text) => Some(text),
            _ => None,
        }
    }

    fn to_amount(&self) -> Option<f64> {
        match self {
            FieldInput::Number(number) => Some(*number),
            FieldInput::Text(text) => text.trim().parse().ok(),
            FieldInput::Bool(_) | FieldInput::Other => None,
        }
    }

    /// Numbers and booleans are read as their text, e.g. `12` becomes "12".
    fn to_category(&self) -> Option<String> {
        match self {
            FieldInput::Text(text) => Some(text.trim().to_owned()),
            FieldInput::Number(number) => Some(number.to_string()),
            FieldInput::Bool(value) => Some(value.to_string()),
            FieldInput::Other => None,
        }
    }
}

impl From<&str> for FieldInput {
    fn from(text: &str) -> Self {
        FieldInput::Text(text.to_owned())
    }
}

impl From<String> for FieldInput {
    fn from(text: String) -> Self {
        FieldInput::Text(text)
    }
}

impl From<f64> for FieldInput {
    fn from(number: f64) -> Self {
        FieldInput::Number(number)
    }
}

/// A request body with each field kept as unparsed JSON.
#[derive(Deserialize)]
struct TransactionBody {
    #[serde(default)]
    amount: Option<Box<RawValue>>,
    #[serde(default)]
    category: Option<Box<RawValue>>,
    #[serde(default)]
    note: Option<Box<RawValue>>,
    #[serde(default, rename = "type")]
    type_: Option<Box<RawValue>>,
    #[serde(default)]
    date: Option<Box<RawValue>>,
}

impl From<TransactionBody> for TransactionRequest {
    fn from(body: TransactionBody) -> Self {
        let field = |raw: Option<Box<RawValue>>| raw.as_deref().map(FieldInput::from_json);

        Self {
            amount: field(body.amount),
            category: field(body.category),
            note: field(body.note),
            type_: field(body.type_),
            date: field(body.date),
        }
    }
}

/// A candidate transaction that has not been validated yet.
///
/// Deserializing only fails if the body is not a JSON object. Fields of the
/// wrong type are caught by [TransactionRequest::validate].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "TransactionBody")]
pub struct TransactionRequest {
    /// The amount of money, a number or numeric text.
    pub amount: Option<FieldInput>,
    /// The category label.
    pub category: Option<FieldInput>,
    /// An optional note. Anything other than text is ignored.
    pub note: Option<FieldInput>,
    /// "INCOME" or "EXPENSE".
    pub type_: Option<FieldInput>,
    /// When the transaction happened. Defaults to the time of validation.
    pub date: Option<FieldInput>,
}

impl TransactionRequest {
    /// Check the request and normalize it into a [NewTransaction].
    ///
    /// The rules are checked in order and the first one that fails is
    /// returned:
    /// 1. the amount must be a finite number greater than zero,
    /// 2. the category must not be empty after trimming,
    /// 3. the type must be exactly "INCOME" or "EXPENSE",
    /// 4. a non-empty date must be text that parses as `YYYY-MM-DD`, an
    ///    RFC 3339 date-time, or a date-time without an offset (read as UTC).
    ///
    /// A missing or empty date is replaced with `now`. Dates are stored in UTC
    /// with millisecond precision. The note is trimmed and defaults to an
    /// empty string.
    ///
    /// # Errors
    /// Returns the [ValidationError] for the first rule that failed.
    pub fn validate(self, now: OffsetDateTime) -> Result<NewTransaction, ValidationError> {
        let amount = self
            .amount
            .as_ref()
            .and_then(FieldInput::to_amount)
            .filter(|amount| amount.is_finite() && *amount > 0.0)
            .ok_or(ValidationError::InvalidAmount)?;

        let category = self
            .category
            .as_ref()
            .and_then(FieldInput::to_category)
            .filter(|category| !category.is_empty())
            .ok_or(ValidationError::EmptyCategory)?;

        let type_ = self
            .type_
            .as_ref()
            .and_then(FieldInput::as_text)
            .and_then(TransactionType::parse)
            .ok_or(ValidationError::InvalidType)?;

        let date = match &self.date {
            None => now,
            Some(FieldInput::Text(text)) if text.trim().is_empty() => now,
            Some(FieldInput::Text(text)) => {
                parse_date(text.trim()).ok_or(ValidationError::InvalidDate)?
            }
            Some(_) => return Err(ValidationError::InvalidDate),
        };

        let note = self
            .note
            .as_ref()
            .and_then(FieldInput::as_text)
            .map(str::trim)
            .unwrap_or_default()
            .to_owned();

        Ok(NewTransaction {
            amount,
            category,
            note,
            type_,
            date: truncate_to_millisecond(date.to_offset(UtcOffset::UTC)),
        })
    }
}

/// Parse a date or date-time sent by a client.
///
/// Only years 0 to 9999 are accepted so that every stored date has a four
/// digit ISO 8601 representation.
fn parse_date(text: &str) -> Option<OffsetDateTime> {
    let date_time = Date::parse(text, DATE_FORMAT)
        .map(|date| date.midnight().assume_utc())
        .or_else(|_| OffsetDateTime::parse(text, &Rfc3339))
        .ok()
        .or_else(|| {
            DATE_TIME_FORMATS.iter().find_map(|&format| {
                PrimitiveDateTime::parse(text, format)
                    .map(PrimitiveDateTime::assume_utc)
                    .ok()
            })
        })?
        .to_offset(UtcOffset::UTC);

    (0..=9999)
        .contains(&date_time.year())
        .then_some(date_time)
}

fn truncate_to_millisecond(date_time: OffsetDateTime) -> OffsetDateTime {
    date_time
        .replace_millisecond(date_time.millisecond())
        .unwrap_or(date_time)
}
