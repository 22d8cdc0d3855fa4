//! Summaries derived from a list of transactions.

use serde::Serialize;

use crate::transaction::core::{Transaction, TransactionType};

/// The income, expenses and balance over a set of transactions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Totals {
    /// The sum of all income amounts.
    pub income: f64,
    /// The sum of all expense amounts.
    pub expense: f64,
    /// `income - expense`.
    pub balance: f64,
}

impl Totals {
    /// Sum `transactions` into income and expense totals.
    ///
    /// Any transaction that is not income counts as an expense. An empty
    /// slice gives all zeros.
    pub fn from_transactions(transactions: &[Transaction]) -> Self {
        transactions
            .iter()
            .fold(Totals::default(), |mut totals, transaction| {
                if transaction.type_ == TransactionType::Income {
                    totals.income += transaction.amount;
                } else {
                    totals.expense += transaction.amount;
                }

                totals.balance = totals.income - totals.expense;
                totals
            })
    }
}

/// The total spent in one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    /// The category label.
    pub category: String,
    /// The sum of expense amounts in this category.
    pub amount: f64,
}

/// Sum the expenses in `transactions` by category.
///
/// Categories appear in the order they are first seen. Income is ignored.
pub fn expenses_by_category(transactions: &[Transaction]) -> Vec<CategoryTotal> {
    let mut totals: Vec<CategoryTotal> = Vec::new();

    for transaction in transactions
        .iter()
        .filter(|transaction| transaction.type_ == TransactionType::Expense)
    {
        match totals
            .iter_mut()
            .find(|total| total.category == transaction.category)
        {
            Some(total) => total.amount += transaction.amount,
            None => totals.push(CategoryTotal {
                category: transaction.category.clone(),
                amount: transaction.amount,
            }),
        }
    }

    totals
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use crate::transaction::{
        Transaction, TransactionType,
        totals::{CategoryTotal, Totals, expenses_by_category},
    };

    fn create_test_transaction(
        id: i64,
        amount: f64,
        category: &str,
        type_: TransactionType,
    ) -> Transaction {
        Transaction {
            id,
            amount,
            category: category.to_owned(),
            note: None,
            type_,
            date: datetime!(2024-01-01 0:00 UTC),
        }
    }

    #[test]
    fn empty_list_gives_zero_totals() {
        assert_eq!(
            Totals::from_transactions(&[]),
            Totals {
                income: 0.0,
                expense: 0.0,
                balance: 0.0
            }
        );
    }

    #[test]
    fn sums_income_and_expense() {
        let transactions = [
            create_test_transaction(1, 500.0, "Salary", TransactionType::Income),
            create_test_transaction(2, 200.0, "Food", TransactionType::Expense),
        ];

        let totals = Totals::from_transactions(&transactions);

        assert_eq!(
            totals,
            Totals {
                income: 500.0,
                expense: 200.0,
                balance: 300.0
            }
        );
    }

    #[test]
    fn balance_equals_income_minus_expense() {
        let transactions: Vec<_> = (1..=25)
            .map(|i| {
                let type_ = if i % 3 == 0 {
                    TransactionType::Income
                } else {
                    TransactionType::Expense
                };
                create_test_transaction(i, i as f64 * 1.37, "Misc", type_)
            })
            .collect();

        for end in 0..=transactions.len() {
            let totals = Totals::from_transactions(&transactions[..end]);

            assert_eq!(totals.balance, totals.income - totals.expense);
            assert!(totals.income >= 0.0);
            assert!(totals.expense >= 0.0);
        }
    }

    #[test]
    fn result_does_not_depend_on_previous_calls() {
        let transactions = [
            create_test_transaction(1, 10.0, "Food", TransactionType::Expense),
            create_test_transaction(2, 30.0, "Pay", TransactionType::Income),
        ];

        let first = Totals::from_transactions(&transactions);
        let second = Totals::from_transactions(&transactions);

        assert_eq!(first, second);
    }

    #[test]
    fn groups_expenses_by_category_in_first_seen_order() {
        let transactions = [
            create_test_transaction(1, 12.0, "Transport", TransactionType::Expense),
            create_test_transaction(2, 1000.0, "Salary", TransactionType::Income),
            create_test_transaction(3, 20.0, "Food", TransactionType::Expense),
            create_test_transaction(4, 8.0, "Transport", TransactionType::Expense),
        ];

        let got = expenses_by_category(&transactions);

        assert_eq!(
            got,
            vec![
                CategoryTotal {
                    category: "Transport".to_owned(),
                    amount: 20.0
                },
                CategoryTotal {
                    category: "Food".to_owned(),
                    amount: 20.0
                },
            ]
        );
    }

    #[test]
    fn no_expenses_gives_empty_breakdown() {
        let transactions = [create_test_transaction(
            1,
            1000.0,
            "Salary",
            TransactionType::Income,
        )];

        assert!(expenses_by_category(&transactions).is_empty());
    }
}
