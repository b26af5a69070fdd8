//! Settlement engine for a group-trip expense splitter: multi-currency
//! expenses become per-member net balances, a minimal transfer list, and a
//! tracked confirmation state with well-defined invalidation.

pub mod balance;
pub mod error;
pub mod rates;
pub mod receipt;
pub mod schemas;
pub mod settlement;
pub mod stats;
pub mod store;
pub mod trip;

pub use balance::{compute_balances, Balances};
pub use error::{Result, SplitError};
pub use rates::RateTable;
pub use schemas::{Category, Expense, Member, Trip};
pub use settlement::{is_fully_settled, match_settlements, Settlement, SETTLE_EPSILON};
pub use store::{InMemoryTripStore, TripStore};
pub use trip::{recompute, Derived};
