//! Aggregate views derived from a transaction snapshot.
//!
//! All of these are recomputed from scratch on each call. Collections at
//! personal-finance scale stay small enough that incremental aggregation
//! would buy nothing.

use std::collections::HashMap;

use crate::transaction::{Transaction, TransactionType};

/// The sum of the amounts of all transactions of `kind`.
///
/// An empty collection sums to 0.
pub fn total_by_type(transactions: &[Transaction], kind: TransactionType) -> f64 {
    transactions
        .iter()
        .filter(|transaction| transaction.kind == kind)
        .map(|transaction| transaction.amount)
        .sum()
}

/// Total income minus total expenses.
pub fn balance(transactions: &[Transaction]) -> f64 {
    total_by_type(transactions, TransactionType::Income)
        - total_by_type(transactions, TransactionType::Expense)
}

/// The amounts summed per category, regardless of transaction type.
///
/// Each category starts at 0 when first seen. The iteration order of the
/// result carries no meaning.
pub fn totals_by_category(transactions: &[Transaction]) -> HashMap<String, f64> {
    let mut totals: HashMap<String, f64> = HashMap::new();

    for transaction in transactions {
        *totals.entry(transaction.category.clone()).or_default() += transaction.amount;
    }

    totals
}

#[cfg(test)]
mod aggregate_tests {
    use time::macros::datetime;

    use crate::transaction::{Transaction, TransactionType};

    use super::{balance, total_by_type, totals_by_category};

    fn transaction(kind: TransactionType, amount: f64, category: &str) -> Transaction {
        Transaction {
            id: format!("{category}-{amount}"),
            kind,
            amount,
            category: category.to_owned(),
            description: "test".to_owned(),
            date: datetime!(2024-06-01 12:00 UTC),
            currency: "USD".to_owned(),
        }
    }

    #[test]
    fn totals_are_zero_for_an_empty_collection() {
        assert_eq!(total_by_type(&[], TransactionType::Income), 0.0);
        assert_eq!(total_by_type(&[], TransactionType::Expense), 0.0);
        assert_eq!(balance(&[]), 0.0);
        assert!(totals_by_category(&[]).is_empty());
    }

    #[test]
    fn total_by_type_only_counts_the_matching_kind() {
        let transactions = vec![
            transaction(TransactionType::Income, 100.0, "Salary"),
            transaction(TransactionType::Expense, 30.0, "Food"),
            transaction(TransactionType::Expense, 20.0, "Transport"),
        ];

        assert_eq!(total_by_type(&transactions, TransactionType::Income), 100.0);
        assert_eq!(total_by_type(&transactions, TransactionType::Expense), 50.0);
    }

    #[test]
    fn balance_is_income_minus_expenses() {
        let transactions = vec![
            transaction(TransactionType::Income, 100.0, "Salary"),
            transaction(TransactionType::Expense, 30.0, "Food"),
        ];

        let got = balance(&transactions);

        assert_eq!(got, 70.0);
        assert_eq!(
            got,
            total_by_type(&transactions, TransactionType::Income)
                - total_by_type(&transactions, TransactionType::Expense)
        );
    }

    #[test]
    fn category_totals_sum_across_both_kinds() {
        let transactions = vec![
            transaction(TransactionType::Income, 100.0, "Salary"),
            transaction(TransactionType::Expense, 30.0, "Food"),
            transaction(TransactionType::Expense, 12.5, "Food"),
            transaction(TransactionType::Income, 5.0, "Food"),
        ];

        let totals = totals_by_category(&transactions);

        assert_eq!(totals.len(), 2);
        assert_eq!(totals["Salary"], 100.0);
        assert_eq!(totals["Food"], 47.5);
    }
}
