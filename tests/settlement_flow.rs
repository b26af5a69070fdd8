//! End-to-end walk of the settlement lifecycle: expenses in several
//! currencies, derived balances and transfers, confirmation tracking, and
//! the invalidation rules, all through the store boundary.

use chrono::NaiveDate;
use travelsplit::schemas::{Category, Expense, Member, Trip};
use travelsplit::store::{decode_trips, encode_trips, InMemoryTripStore, TripStore};
use travelsplit::{recompute, trip, RateTable, SplitError};

fn expense(id: &str, amount: f64, currency: &str, payer: &str, participants: &[&str]) -> Expense {
    Expense {
        id: id.to_string(),
        title: format!("expense {id}"),
        amount,
        currency: currency.to_string(),
        category: Category::Food,
        date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        location: None,
        payer_id: payer.to_string(),
        participants: participants.iter().map(|p| p.to_string()).collect(),
    }
}

fn sample_trip() -> Trip {
    let mut t = Trip::new("t1", "Tokyo", "TWD", Member::new("a", "A"));
    t.members.push(Member::new("b", "B"));
    t.members.push(Member::new("c", "C"));
    t
}

#[tokio::test]
async fn settle_confirm_invalidate_lifecycle() {
    let rates = RateTable::builtin();
    let store = InMemoryTripStore::new();
    store.insert_trip(sample_trip()).await.unwrap();

    // one 300 TWD expense paid by A, split across A, B, C
    let snapshot = store.get_trip("t1").await.unwrap().unwrap();
    let next = trip::add_expense(&snapshot, expense("e1", 300.0, "TWD", "a", &["a", "b", "c"]), &rates)
        .unwrap();
    store.replace_trip(next).await.unwrap();

    let snapshot = store.get_trip("t1").await.unwrap().unwrap();
    let derived = recompute(&snapshot, &rates);
    assert!((derived.balances["a"] - 200.0).abs() < 1e-9);
    assert!((derived.balances["b"] + 100.0).abs() < 1e-9);
    assert!((derived.balances["c"] + 100.0).abs() < 1e-9);
    assert_eq!(derived.settlements.len(), 2);
    assert_eq!(derived.settlements[0].from, "B");
    assert_eq!(derived.settlements[0].to, "A");
    assert_eq!(derived.settlements[1].from, "C");
    assert!((derived.settlements[1].amount - 100.0).abs() < 1e-9);
    assert!(!derived.fully_settled);

    // confirming both transfers settles the trip
    let mut snapshot = snapshot;
    for settlement in &derived.settlements {
        snapshot = trip::toggle_settlement(&snapshot, &settlement.key, &rates);
    }
    store.replace_trip(snapshot.clone()).await.unwrap();
    assert!(snapshot.is_fully_settled);
    assert!(recompute(&snapshot, &rates).fully_settled);

    // a new 90-unit expense clears the confirmations and shifts balances
    let next = trip::add_expense(&snapshot, expense("e2", 90.0, "TWD", "b", &["a", "b", "c"]), &rates)
        .unwrap();
    store.replace_trip(next).await.unwrap();
    let snapshot = store.get_trip("t1").await.unwrap().unwrap();
    assert!(snapshot.completed_settlement_keys.is_empty());
    assert!(!snapshot.is_fully_settled);
    let derived = recompute(&snapshot, &rates);
    assert!((derived.balances["a"] - 170.0).abs() < 1e-9);
    assert!((derived.balances["b"] + 40.0).abs() < 1e-9);
    assert!((derived.balances["c"] + 130.0).abs() < 1e-9);
}

#[test]
fn balances_sum_to_zero_across_mutations() {
    let rates = RateTable::builtin();
    let mut snapshot = sample_trip();

    let steps: Vec<Expense> = vec![
        expense("e1", 300.0, "TWD", "a", &["a", "b", "c"]),
        expense("e2", 42.5, "USD", "b", &["a", "b"]),
        expense("e3", 9800.0, "JPY", "c", &["a", "b", "c"]),
        expense("e4", 75.0, "EUR", "a", &["b"]),
        expense("e5", 120.0, "THB", "b", &["a", "c"]),
    ];
    for e in steps {
        snapshot = trip::add_expense(&snapshot, e, &rates).unwrap();
        let sum: f64 = recompute(&snapshot, &rates).balances.values().sum();
        assert!(sum.abs() < 0.01, "sum drifted to {sum}");
    }
    for id in ["e2", "e5", "e1"] {
        snapshot = trip::remove_expense(&snapshot, id, &rates);
        let sum: f64 = recompute(&snapshot, &rates).balances.values().sum();
        assert!(sum.abs() < 0.01, "sum drifted to {sum}");
    }
}

#[test]
fn settlements_are_stable_across_recomputation() {
    let rates = RateTable::builtin();
    let mut snapshot = sample_trip();
    snapshot = trip::add_expense(&snapshot, expense("e1", 333.0, "TWD", "a", &["a", "b", "c"]), &rates)
        .unwrap();
    snapshot = trip::add_expense(&snapshot, expense("e2", 55.0, "USD", "b", &["a", "c"]), &rates)
        .unwrap();

    let first = recompute(&snapshot, &rates).settlements;
    let second = recompute(&snapshot, &rates).settlements;
    assert_eq!(first, second);
    assert!(first.iter().all(|s| s.amount >= 0.01));
    assert!(first.iter().all(|s| s.currency == "TWD"));
}

#[test]
fn member_removal_is_guarded_by_expense_associations() {
    let rates = RateTable::builtin();
    let mut snapshot = sample_trip();
    snapshot = trip::add_expense(&snapshot, expense("e1", 300.0, "TWD", "a", &["a", "b"]), &rates)
        .unwrap();

    // payer and participant are both protected
    assert!(matches!(
        trip::remove_member(&snapshot, "b", &rates),
        Err(SplitError::MemberInUse { .. })
    ));
    assert_eq!(snapshot.members.len(), 3);

    // C has no associations and can leave; afterwards the expense is
    // removed and B can leave too
    snapshot = trip::remove_member(&snapshot, "c", &rates).unwrap();
    snapshot = trip::remove_expense(&snapshot, "e1", &rates);
    snapshot = trip::remove_member(&snapshot, "b", &rates).unwrap();
    assert_eq!(snapshot.members.len(), 1);
}

#[test]
fn nothing_to_settle_is_not_fully_settled() {
    let rates = RateTable::builtin();
    let snapshot = sample_trip();
    let derived = recompute(&snapshot, &rates);
    assert!(derived.settlements.is_empty());
    assert!(!derived.fully_settled);
}

#[tokio::test]
async fn snapshots_survive_a_store_round_trip() {
    let rates = RateTable::builtin();
    let mut snapshot = sample_trip();
    snapshot = trip::add_expense(&snapshot, expense("e1", 48.0, "USD", "a", &["b", "c"]), &rates)
        .unwrap();
    let key = recompute(&snapshot, &rates).settlements[0].key.clone();
    snapshot = trip::toggle_settlement(&snapshot, &key, &rates);

    let json = encode_trips(&[snapshot.clone()]).unwrap();
    let restored = decode_trips(&json).unwrap();
    assert_eq!(restored, vec![snapshot.clone()]);

    let store = InMemoryTripStore::with_trips(restored).await;
    let loaded = store.get_trip("t1").await.unwrap().unwrap();
    assert_eq!(
        recompute(&loaded, &rates).settlements,
        recompute(&snapshot, &rates).settlements
    );
    assert!(loaded.completed_settlement_keys.contains(&key));
}
