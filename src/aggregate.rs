use std::collections::HashMap;

use crate::expense::Expense;

/// Sums amounts per category in a single pass. Iteration order of the result is unspecified.
pub fn totals_by_category(expenses: &[Expense]) -> HashMap<String, f64> {
    let mut totals: HashMap<String, f64> = HashMap::new();
    for expense in expenses {
        *totals.entry(expense.category().to_string()).or_insert(0.0) += expense.amount();
    }
    totals
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    pub category: String,
    pub total: f64,
}

/// Totals ordered by category name, for display.
pub fn sorted_totals(totals: &HashMap<String, f64>) -> Vec<CategoryTotal> {
    let mut sorted: Vec<CategoryTotal> = totals
        .iter()
        .map(|(category, total)| CategoryTotal {
            category: category.clone(),
            total: *total,
        })
        .collect();
    sorted.sort_by(|a, b| a.category.cmp(&b.category));
    sorted
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::NaiveDate;

    fn expense(date: &str, category: &str, amount: f64) -> Expense {
        Expense::new(
            NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            category,
            amount,
        )
    }

    #[test]
    fn totals() {
        let expenses = [
            expense("2024-01-01", "Food", 10.0),
            expense("2024-01-02", "Food", 5.5),
            expense("2024-01-03", "Transport", 3.0),
        ];
        let totals = totals_by_category(&expenses);
        assert_eq!(totals.len(), 2);
        assert_eq!(totals["Food"], 15.5);
        assert_eq!(totals["Transport"], 3.0);
    }

    #[test]
    fn totals_empty() {
        assert!(totals_by_category(&[]).is_empty());
    }

    #[test]
    fn totals_with_negative_amount() {
        let expenses = [
            expense("2024-01-01", "Food", 10.0),
            expense("2024-01-02", "Food", -4.0),
        ];
        assert_eq!(totals_by_category(&expenses)["Food"], 6.0);
    }

    #[test]
    fn categories_are_case_sensitive() {
        let expenses = [
            expense("2024-01-01", "food", 1.0),
            expense("2024-01-01", "Food", 2.0),
        ];
        assert_eq!(totals_by_category(&expenses).len(), 2);
    }

    #[test]
    fn sorted_by_category() {
        let expenses = [
            expense("2024-01-03", "Transport", 3.0),
            expense("2024-01-01", "Food", 1.0),
            expense("2024-01-02", "Food", 2.0),
        ];
        let sorted = sorted_totals(&totals_by_category(&expenses));
        assert_eq!(
            sorted,
            vec![
                CategoryTotal {
                    category: "Food".into(),
                    total: 3.0
                },
                CategoryTotal {
                    category: "Transport".into(),
                    total: 3.0
                },
            ]
        );
    }
}
