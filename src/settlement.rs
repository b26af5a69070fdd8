use serde::Serialize;
use std::collections::BTreeSet;

use crate::balance::Balances;
use crate::schemas::Member;

/// Balances inside this band count as settled and produce no transfer.
pub const SETTLE_EPSILON: f64 = 0.01;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Settlement {
    /// Debtor display name.
    pub from: String,
    /// Creditor display name.
    pub to: String,
    pub amount: f64,
    pub currency: String,
    /// Deterministic identity for confirmation tracking. Only meaningful
    /// within one recomputation of the trip's settlement list.
    pub key: String,
}

struct RunningBalance<'a> {
    member: &'a Member,
    balance: f64,
}

/// Keys use member ids rather than display names so that two members who
/// happen to share a name cannot confirm each other's transfers. The amount
/// is rounded to a whole unit of the base currency.
pub fn settlement_key(from: &Member, to: &Member, amount: f64) -> String {
    format!("{}-{}-{}", from.id, to.id, amount.round() as i64)
}

/// Greedy largest-first matching of debtors against creditors. Not a global
/// min-cash-flow optimum, but deterministic: stable sorts keep member-list
/// order on ties, so the same balances always yield the same transfer list.
pub fn match_settlements(
    members: &[Member],
    balances: &Balances,
    base_currency: &str,
) -> Vec<Settlement> {
    let mut debtors: Vec<RunningBalance> = members
        .iter()
        .map(|m| RunningBalance {
            member: m,
            balance: balances.get(&m.id).copied().unwrap_or(0.0),
        })
        .filter(|r| r.balance < -SETTLE_EPSILON)
        .collect();
    let mut creditors: Vec<RunningBalance> = members
        .iter()
        .map(|m| RunningBalance {
            member: m,
            balance: balances.get(&m.id).copied().unwrap_or(0.0),
        })
        .filter(|r| r.balance > SETTLE_EPSILON)
        .collect();
    debtors.sort_by(|a, b| a.balance.total_cmp(&b.balance));
    creditors.sort_by(|a, b| b.balance.total_cmp(&a.balance));

    let mut settlements = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < debtors.len() && j < creditors.len() {
        let amount = debtors[i].balance.abs().min(creditors[j].balance);
        if amount > SETTLE_EPSILON {
            settlements.push(Settlement {
                from: debtors[i].member.name.clone(),
                to: creditors[j].member.name.clone(),
                amount,
                currency: base_currency.to_string(),
                key: settlement_key(debtors[i].member, creditors[j].member, amount),
            });
        }
        debtors[i].balance += amount;
        creditors[j].balance -= amount;
        // Both cursors may advance in the same step when debtor and
        // creditor zero out together; remainders under the epsilon are
        // rounding noise and get dropped.
        if debtors[i].balance.abs() < SETTLE_EPSILON {
            i += 1;
        }
        if creditors[j].balance.abs() < SETTLE_EPSILON {
            j += 1;
        }
    }
    settlements
}

/// A trip with nothing left to settle is *not* fully settled by this
/// predicate; "nothing owed" and "everything paid" stay distinguishable.
pub fn is_fully_settled(settlements: &[Settlement], confirmed: &BTreeSet<String>) -> bool {
    !settlements.is_empty() && settlements.iter().all(|s| confirmed.contains(&s.key))
}
