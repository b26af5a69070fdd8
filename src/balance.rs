use std::collections::HashMap;

use crate::rates::RateTable;
use crate::schemas::{MemberId, Trip};

pub type Balances = HashMap<MemberId, f64>;

/// Net position of every member in the trip's base currency. Positive means
/// the group owes them, negative means they owe the group. Members with no
/// expense involvement keep a balance of zero, and the whole map sums to
/// zero (within rounding noise) for any expense set.
pub fn compute_balances(trip: &Trip, rates: &RateTable) -> Balances {
    let mut balances: Balances = trip.members.iter().map(|m| (m.id.clone(), 0.0)).collect();
    for expense in &trip.expenses {
        let total = rates.convert(expense.amount, &expense.currency, &trip.base_currency);
        // An expense with no participants credits the payer and debits
        // nobody; dividing by max(1, n) keeps that case total.
        let per_person = total / expense.participants.len().max(1) as f64;
        if let Some(balance) = balances.get_mut(&expense.payer_id) {
            *balance += total;
        }
        for participant in &expense.participants {
            if let Some(balance) = balances.get_mut(participant) {
                *balance -= per_person;
            }
        }
    }
    balances
}
