use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use tracing::{debug, warn};

use crate::balance::{compute_balances, Balances};
use crate::error::{Result, SplitError};
use crate::rates::RateTable;
use crate::schemas::{Expense, Member, Trip};
use crate::settlement::{is_fully_settled, match_settlements, Settlement};

/// Everything derived from a trip snapshot in one recomputation cycle.
/// Never persisted; recomputed from scratch on every read.
#[derive(Clone, Debug)]
pub struct Derived {
    pub balances: Balances,
    pub settlements: Vec<Settlement>,
    pub fully_settled: bool,
}

pub fn recompute(trip: &Trip, rates: &RateTable) -> Derived {
    let balances = compute_balances(trip, rates);
    let settlements = match_settlements(&trip.members, &balances, &trip.base_currency);
    let fully_settled = is_fully_settled(&settlements, &trip.completed_settlement_keys);
    debug!(
        trip = %trip.id,
        settlements = settlements.len(),
        fully_settled,
        "recomputed settlement state"
    );
    Derived {
        balances,
        settlements,
        fully_settled,
    }
}

fn refreshed(mut trip: Trip, rates: &RateTable) -> Trip {
    trip.is_fully_settled = recompute(&trip, rates).fully_settled;
    trip
}

/// Validates member references and the amount, prepends the expense
/// (newest first) and clears all settlement confirmations: the amounts
/// embedded in the old keys no longer describe the new transfer list.
pub fn add_expense(trip: &Trip, expense: Expense, rates: &RateTable) -> Result<Trip> {
    if expense.amount < 0.0 {
        return Err(SplitError::NegativeAmount);
    }
    if trip.member(&expense.payer_id).is_none() {
        return Err(SplitError::UnknownMember(expense.payer_id.clone()));
    }
    for participant in &expense.participants {
        if trip.member(participant).is_none() {
            return Err(SplitError::UnknownMember(participant.clone()));
        }
    }
    let mut next = trip.clone();
    next.expenses.insert(0, expense);
    next.completed_settlement_keys.clear();
    Ok(refreshed(next, rates))
}

/// Removing an expense shifts balances the same way adding one does, so
/// confirmations are cleared here too.
pub fn remove_expense(trip: &Trip, expense_id: &str, rates: &RateTable) -> Trip {
    let mut next = trip.clone();
    next.expenses.retain(|e| e.id != expense_id);
    next.completed_settlement_keys.clear();
    refreshed(next, rates)
}

/// New members start at balance zero, so existing confirmations survive.
pub fn add_member(trip: &Trip, member: Member, rates: &RateTable) -> Trip {
    let mut next = trip.clone();
    next.members.push(member);
    refreshed(next, rates)
}

/// A member can only leave a trip once no expense references them; the
/// owner (first member) can never leave. Both rejections carry enough
/// context for the caller to explain why.
pub fn remove_member(trip: &Trip, member_id: &str, rates: &RateTable) -> Result<Trip> {
    let member = trip
        .member(member_id)
        .ok_or_else(|| SplitError::UnknownMember(member_id.to_string()))?;
    if trip.owner().map(|m| m.id.as_str()) == Some(member_id) {
        warn!(trip = %trip.id, member = %member_id, "refused to remove trip owner");
        return Err(SplitError::OwnerRemoval);
    }
    let referenced = trip
        .expenses
        .iter()
        .filter(|e| e.payer_id == member_id || e.participants.iter().any(|p| p == member_id))
        .count();
    if referenced > 0 {
        warn!(
            trip = %trip.id,
            member = %member_id,
            expenses = referenced,
            "refused to remove member with expense associations"
        );
        return Err(SplitError::MemberInUse {
            name: member.name.clone(),
            expenses: referenced,
        });
    }
    let mut next = trip.clone();
    next.members.retain(|m| m.id != member_id);
    Ok(refreshed(next, rates))
}

/// Flips the confirmation state of one settlement key. The key is not
/// checked against the live settlement list; a stale key just sits in the
/// set until the next expense mutation clears it.
pub fn toggle_settlement(trip: &Trip, key: &str, rates: &RateTable) -> Trip {
    let mut next = trip.clone();
    if !next.completed_settlement_keys.remove(key) {
        next.completed_settlement_keys.insert(key.to_string());
    }
    refreshed(next, rates)
}

/// Confirmations are not cleared: settlement amounts change with the new
/// base currency, so the old keys simply stop matching and the flag is
/// recomputed accordingly.
pub fn set_base_currency(trip: &Trip, currency: &str, rates: &RateTable) -> Trip {
    let mut next = trip.clone();
    next.base_currency = currency.to_string();
    refreshed(next, rates)
}

/// Renames the trip; a blank name leaves the current one in place.
pub fn rename_trip(trip: &Trip, name: &str) -> Trip {
    let mut next = trip.clone();
    let name = name.trim();
    if !name.is_empty() {
        next.name = name.to_string();
    }
    next
}

#[derive(Serialize)]
struct HashInput<'a> {
    base_currency: &'a str,
    members: &'a [Member],
    expenses: &'a [Expense],
    confirmed: &'a BTreeSet<String>,
}

/// Content hash over everything `recompute` reads. Any cache of derived
/// values must key on this to stay coherent with the snapshot.
pub fn content_hash(trip: &Trip) -> Result<String> {
    let input = HashInput {
        base_currency: &trip.base_currency,
        members: &trip.members,
        expenses: &trip.expenses,
        confirmed: &trip.completed_settlement_keys,
    };
    let mut hasher = Sha256::new();
    hasher.update(serde_json::to_vec(&input)?);
    Ok(hasher
        .finalize()
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect())
}
