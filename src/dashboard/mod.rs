//! Dashboard module
//!
//! Provides the page showing the income and expense totals, the form for
//! adding transactions, the list of transactions and a chart of expenses by
//! category.

mod chart;
mod handlers;
mod store;
mod view;

pub use handlers::{
    delete_transaction_from_dashboard, get_dashboard_page, submit_transaction_form,
};
