use crate::rates::RateTable;
use crate::schemas::{Category, Expense, Trip};

/// Sum of all expenses converted into the trip's base currency.
pub fn total_spent(trip: &Trip, rates: &RateTable) -> f64 {
    trip.expenses
        .iter()
        .map(|e| rates.convert(e.amount, &e.currency, &trip.base_currency))
        .sum()
}

/// Converted totals per category in declaration order; categories without
/// spending are omitted.
pub fn category_totals(trip: &Trip, rates: &RateTable) -> Vec<(Category, f64)> {
    Category::ALL
        .into_iter()
        .filter_map(|category| {
            let total: f64 = trip
                .expenses
                .iter()
                .filter(|e| e.category == category)
                .map(|e| rates.convert(e.amount, &e.currency, &trip.base_currency))
                .sum();
            (total > 0.0).then_some((category, total))
        })
        .collect()
}

/// The expense list filtered by category; `None` keeps everything.
pub fn expenses_in_category<'a>(trip: &'a Trip, category: Option<Category>) -> Vec<&'a Expense> {
    trip.expenses
        .iter()
        .filter(|e| category.map_or(true, |c| e.category == c))
        .collect()
}
