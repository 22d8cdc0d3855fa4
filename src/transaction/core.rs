//! Defines the core data models and database queries for transactions.

use std::fmt::Display;

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Error, database_id::TransactionId};

// ============================================================================
// MODELS
// ============================================================================

/// Whether money was earned or spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    /// Money that was earned, e.g. a salary payment.
    Income,
    /// Money that was spent.
    Expense,
}

impl TransactionType {
    /// The text used for this type in the database and on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "INCOME",
            TransactionType::Expense => "EXPENSE",
        }
    }

    /// Parse the exact wire representation of a type.
    ///
    /// Returns `None` for anything other than "INCOME" or "EXPENSE".
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "INCOME" => Some(TransactionType::Income),
            "EXPENSE" => Some(TransactionType::Expense),
            _ => None,
        }
    }

    /// Read a type stored in the database.
    ///
    /// Rows written under a different type vocabulary are treated as
    /// expenses rather than failing the whole query.
    pub fn from_stored(text: &str) -> Self {
        Self::parse(text).unwrap_or_else(|| {
            tracing::warn!("unrecognized transaction type {text:?} in database, reading as EXPENSE");
            TransactionType::Expense
        })
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// Transactions are stored from a [NewTransaction], usually the result of
/// validating a [crate::TransactionRequest].
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The amount of money spent or earned in this transaction, always positive.
    pub amount: f64,
    /// A user-defined label such as "Food" or "Salary".
    pub category: String,
    /// Free text detailing the transaction, `None` for rows stored without one.
    pub note: Option<String>,
    /// Whether the money was earned or spent.
    pub type_: TransactionType,
    /// When the transaction happened, in UTC.
    pub date: OffsetDateTime,
}

/// The validated fields of a transaction that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    /// The amount of money, finite and greater than zero.
    pub amount: f64,
    /// The category with surrounding whitespace removed, never empty.
    pub category: String,
    /// The note with surrounding whitespace removed, may be empty.
    pub note: String,
    /// Whether the money was earned or spent.
    pub type_: TransactionType,
    /// When the transaction happened, in UTC with millisecond precision.
    pub date: OffsetDateTime,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create a new transaction in the database.
///
/// # Errors
/// This function will return an [Error::PersistenceError] if there is some SQL error.
pub fn create_transaction(
    transaction: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "INSERT INTO \"transaction\" (amount, category, note, type, date)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING id, amount, category, note, type, date",
        )?
        .query_row(
            (
                transaction.amount,
                transaction.category,
                transaction.note,
                transaction.type_.as_str(),
                transaction.date,
            ),
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Retrieve a transaction from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - or [Error::PersistenceError] there is some other SQL error.
#[cfg(test)]
pub fn get_transaction(id: TransactionId, connection: &Connection) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "SELECT id, amount, category, note, type, date FROM \"transaction\" WHERE id = :id",
        )?
        .query_one(&[(":id", &id)], map_transaction_row)?;

    Ok(transaction)
}

/// Get all transactions, most recent first.
///
/// Transactions on the same date are ordered by ID, newest first.
///
/// # Errors
/// This function will return an [Error::PersistenceError] if there is some SQL error.
pub fn list_transactions(connection: &Connection) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT id, amount, category, note, type, date FROM \"transaction\"
             ORDER BY date DESC, id DESC",
        )?
        .query_map([], map_transaction_row)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|error| error.into())
}

/// Delete the transaction with the ID `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if there is no transaction with the ID `id`,
/// - or [Error::PersistenceError] if there is some other SQL error.
pub fn delete_transaction(id: TransactionId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM \"transaction\" WHERE id = :id",
        &[(":id", &id)],
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Get the total number of transactions in the database.
///
/// # Errors
/// This function will return an [Error::PersistenceError] there is some SQL error.
#[cfg(test)]
pub fn count_transactions(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM \"transaction\";", [], |row| {
            row.get(0)
        })
        .map_err(|error| error.into())
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                amount REAL NOT NULL CHECK (amount > 0),
                category TEXT NOT NULL,
                note TEXT,
                type TEXT NOT NULL,
                date TEXT NOT NULL
                )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_date ON \"transaction\"(date);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let amount = row.get(1)?;
    let category = row.get(2)?;
    let note = row.get(3)?;
    let raw_type: String = row.get(4)?;
    let date = row.get(5)?;

    Ok(Transaction {
        id,
        amount,
        category,
        note,
        type_: TransactionType::from_stored(&raw_type),
        date,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod database_tests {
    use rusqlite::Connection;
    use time::macros::datetime;

    use crate::{
        Error,
        db::initialize,
        transaction::{
            NewTransaction, TransactionType, count_transactions, create_transaction,
            delete_transaction, get_transaction, list_transactions,
        },
    };

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    fn new_transaction(
        amount: f64,
        type_: TransactionType,
        date: time::OffsetDateTime,
    ) -> NewTransaction {
        NewTransaction {
            amount,
            category: "Food".to_owned(),
            note: String::new(),
            type_,
            date,
        }
    }

    #[test]
    fn create_succeeds() {
        let conn = get_test_connection();
        let amount = 12.3;

        let result = create_transaction(
            new_transaction(
                amount,
                TransactionType::Expense,
                datetime!(2025-10-05 0:00 UTC),
            ),
            &conn,
        );

        match result {
            Ok(transaction) => {
                assert!(transaction.id > 0);
                assert_eq!(transaction.amount, amount);
                assert_eq!(transaction.category, "Food");
                assert_eq!(transaction.note, Some(String::new()));
                assert_eq!(transaction.type_, TransactionType::Expense);
                assert_eq!(transaction.date, datetime!(2025-10-05 0:00 UTC));
            }
            Err(error) => panic!("Unexpected error: {error}"),
        }
    }

    #[test]
    fn ids_are_unique_and_increasing() {
        let conn = get_test_connection();
        let date = datetime!(2025-10-05 0:00 UTC);

        let first =
            create_transaction(new_transaction(1.0, TransactionType::Income, date), &conn).unwrap();
        let second =
            create_transaction(new_transaction(2.0, TransactionType::Income, date), &conn).unwrap();

        assert!(second.id > first.id);
    }

    #[test]
    fn database_rejects_non_positive_amount() {
        let conn = get_test_connection();

        let result = create_transaction(
            new_transaction(0.0, TransactionType::Expense, datetime!(2025-10-05 0:00 UTC)),
            &conn,
        );

        assert!(matches!(result, Err(Error::PersistenceError(_))));
        assert_eq!(count_transactions(&conn).unwrap(), 0);
    }

    #[test]
    fn get_transaction_fails_on_missing_id() {
        let conn = get_test_connection();

        assert_eq!(get_transaction(42, &conn), Err(Error::NotFound));
    }

    #[test]
    fn list_orders_by_date_descending() {
        let conn = get_test_connection();
        let middle = create_transaction(
            new_transaction(2.0, TransactionType::Expense, datetime!(2024-02-01 0:00 UTC)),
            &conn,
        )
        .unwrap();
        let oldest = create_transaction(
            new_transaction(1.0, TransactionType::Expense, datetime!(2024-01-01 0:00 UTC)),
            &conn,
        )
        .unwrap();
        let newest = create_transaction(
            new_transaction(3.0, TransactionType::Income, datetime!(2024-03-01 12:30 UTC)),
            &conn,
        )
        .unwrap();

        let transactions = list_transactions(&conn).unwrap();

        assert_eq!(transactions, vec![newest, middle, oldest]);
    }

    #[test]
    fn list_returns_empty_vec_for_empty_table() {
        let conn = get_test_connection();

        assert_eq!(list_transactions(&conn).unwrap(), vec![]);
    }

    #[test]
    fn delete_removes_transaction() {
        let conn = get_test_connection();
        let transaction = create_transaction(
            new_transaction(1.23, TransactionType::Expense, datetime!(2025-10-26 0:00 UTC)),
            &conn,
        )
        .unwrap();

        delete_transaction(transaction.id, &conn).unwrap();

        assert_eq!(get_transaction(transaction.id, &conn), Err(Error::NotFound));
    }

    #[test]
    fn delete_missing_transaction_returns_not_found() {
        let conn = get_test_connection();
        create_transaction(
            new_transaction(1.23, TransactionType::Expense, datetime!(2025-10-26 0:00 UTC)),
            &conn,
        )
        .unwrap();

        let result = delete_transaction(999, &conn);

        assert_eq!(result, Err(Error::NotFound));
        assert_eq!(count_transactions(&conn).unwrap(), 1);
    }

    #[test]
    fn unrecognized_stored_type_is_read_as_expense() {
        let conn = get_test_connection();
        conn.execute(
            "INSERT INTO \"transaction\" (amount, category, note, type, date)
             VALUES (?1, ?2, NULL, ?3, ?4)",
            (5.0, "Legacy", "TRANSFER", datetime!(2024-01-01 0:00 UTC)),
        )
        .unwrap();

        let transactions = list_transactions(&conn).unwrap();

        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].type_, TransactionType::Expense);
        assert_eq!(transactions[0].note, None);
    }

    #[test]
    fn get_count() {
        let conn = get_test_connection();
        let date = datetime!(2025-10-05 0:00 UTC);
        let want_count = 20;
        for i in 1..=want_count {
            create_transaction(
                new_transaction(i as f64, TransactionType::Expense, date),
                &conn,
            )
            .expect("Could not create transaction");
        }

        let got_count = count_transactions(&conn).expect("Could not get count");

        assert_eq!(want_count, got_count);
    }
}
