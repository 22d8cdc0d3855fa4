//! The state behind one render of the dashboard.

use time::Date;

use crate::{
    database_id::TransactionId,
    transaction::{
        CategoryTotal, Totals, Transaction, TransactionType, expenses_by_category,
    },
};

/// The values shown in the new transaction form.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct FormState {
    pub amount: String,
    pub category: String,
    pub note: String,
    /// The date in `YYYY-MM-DD` format.
    pub date: String,
    pub type_: TransactionType,
}

impl FormState {
    /// An empty expense dated `today`.
    pub fn new(today: Date) -> Self {
        Self {
            amount: String::new(),
            category: String::new(),
            note: String::new(),
            date: today.to_string(),
            type_: TransactionType::Expense,
        }
    }
}

/// The transactions, totals, form values and error message shown on the dashboard.
///
/// The totals always match the transactions held by the store. The store is
/// only changed through the `record_*` and form methods, and the handlers
/// only call `record_created` and `record_deleted` after the database has
/// confirmed the change.
#[derive(Debug, Clone)]
pub(super) struct DashboardStore {
    transactions: Vec<Transaction>,
    totals: Totals,
    form: FormState,
    error: Option<String>,
    today: Date,
}

impl DashboardStore {
    /// Create a store for `transactions`, which must be ordered most recent first.
    pub fn new(transactions: Vec<Transaction>, today: Date) -> Self {
        let totals = Totals::from_transactions(&transactions);

        Self {
            transactions,
            totals,
            form: FormState::new(today),
            error: None,
            today,
        }
    }

    /// Add a newly stored transaction, keeping the most recent first.
    ///
    /// Clears the error message and resets the form.
    pub fn record_created(&mut self, transaction: Transaction) {
        let position = self
            .transactions
            .iter()
            .position(|existing| {
                (existing.date, existing.id) < (transaction.date, transaction.id)
            })
            .unwrap_or(self.transactions.len());

        self.transactions.insert(position, transaction);
        self.totals = Totals::from_transactions(&self.transactions);
        self.error = None;
        self.reset_form();
    }

    /// Remove the transaction with `id`. Clears the error message.
    pub fn record_deleted(&mut self, id: TransactionId) {
        self.transactions.retain(|transaction| transaction.id != id);
        self.totals = Totals::from_transactions(&self.transactions);
        self.error = None;
    }

    /// Show `message`, replacing any previous one. The transactions are left as they were.
    pub fn record_failure(&mut self, message: String) {
        self.error = Some(message);
    }

    pub fn reset_form(&mut self) {
        self.form = FormState::new(self.today);
    }

    /// Show `form` instead of the current form values, e.g. to keep what the user typed after an error.
    pub fn set_form(&mut self, form: FormState) {
        self.form = form;
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn totals(&self) -> Totals {
        self.totals
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn expenses_by_category(&self) -> Vec<CategoryTotal> {
        expenses_by_category(&self.transactions)
    }
}
