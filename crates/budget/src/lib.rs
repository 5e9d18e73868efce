//! Budget-estimation helpers: the fixed spending categories with their
//! chart colours, month rollover, and the actual-vs-estimated comparison
//! shown on the budget page.

use models::{BudgetResponse, BudgetSlice, CategoryTotal};

/// The spending categories the budget endpoint reports, in display order.
pub const CATEGORIES: [&str; 7] = [
    "Food",
    "Groceries",
    "Fashion",
    "Leisures",
    "Accommodation",
    "Insurance",
    "Miscellaneous",
];

/// One colour per category, same order as [`CATEGORIES`].
pub const COLORS: [&str; 7] = [
    "#FF6384", "#36A2EB", "#FFCE56", "#4BC0C0", "#9966FF", "#FF9F40", "#C9CBCF",
];

/// The month after `(month, year)`, carrying December into the next year.
/// Months are 1-based; out-of-range input is passed through the same rule
/// (anything but 12 just increments).
pub fn next_month(month: u32, year: i32) -> (u32, i32) {
    if month == 12 {
        (1, year + 1)
    } else {
        (month + 1, year)
    }
}

/// Joins category totals with the palette, keeping palette order.
///
/// Categories with no reported total are omitted (the pie chart drops empty
/// slices); totals for unknown categories are ignored. Category names match
/// case-insensitively since the backend is not consistent about casing.
pub fn build_slices(totals: &[CategoryTotal]) -> Vec<BudgetSlice> {
    CATEGORIES
        .iter()
        .zip(COLORS.iter())
        .filter_map(|(&category, &color)| {
            let mut amount = 0.0;
            let mut seen = false;
            for total in totals {
                if total.category.eq_ignore_ascii_case(category) {
                    amount += total.amount;
                    seen = true;
                }
            }
            seen.then(|| BudgetSlice {
                category: category.to_string(),
                amount,
                color: color.to_string(),
            })
        })
        .collect()
}

/// Actual spending for one month next to the estimate for the following
/// month, as the budget page displays them side by side.
#[derive(Debug, Clone)]
pub struct BudgetComparison {
    pub actual_month: (u32, i32),
    pub estimated_month: (u32, i32),
    pub actual: Vec<BudgetSlice>,
    pub estimated: Vec<BudgetSlice>,
}

impl BudgetComparison {
    /// Builds the comparison from the two budget responses: `actual` for
    /// the selected month, `estimated` for the month after it.
    pub fn from_responses(
        month: u32,
        year: i32,
        actual: &BudgetResponse,
        estimated: &BudgetResponse,
    ) -> Self {
        Self {
            actual_month: (month, year),
            estimated_month: next_month(month, year),
            actual: build_slices(&actual.actual),
            estimated: build_slices(&estimated.estimated),
        }
    }

    pub fn actual_total(&self) -> f64 {
        self.actual.iter().map(|s| s.amount).sum()
    }

    pub fn estimated_total(&self) -> f64 {
        self.estimated.iter().map(|s| s.amount).sum()
    }
}
