use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{Result, SplitError};
use crate::schemas::{Trip, TripId};

/// Boundary to whatever holds the trip list. The engine only ever reads a
/// snapshot from here and writes a replacement snapshot back; it never
/// mutates stored state in place.
#[async_trait]
pub trait TripStore: Send + Sync {
    async fn get_trip(&self, id: &str) -> Result<Option<Trip>>;
    async fn all_trips(&self) -> Result<Vec<Trip>>;
    /// Swaps in a new snapshot for an existing trip.
    async fn replace_trip(&self, trip: Trip) -> Result<()>;
    async fn insert_trip(&self, trip: Trip) -> Result<()>;
    /// Refuses to delete the last remaining trip.
    async fn remove_trip(&self, id: &str) -> Result<()>;
}

/// A thread-safe in-memory trip store, enough for tests and a single-user
/// deployment where the snapshot codec below handles persistence.
#[derive(Default, Clone)]
pub struct InMemoryTripStore {
    trips: Arc<RwLock<BTreeMap<TripId, Trip>>>,
}

impl InMemoryTripStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn with_trips(trips: Vec<Trip>) -> Self {
        let store = Self::new();
        {
            let mut guard = store.trips.write().await;
            for trip in trips {
                guard.insert(trip.id.clone(), trip);
            }
        }
        store
    }
}

#[async_trait]
impl TripStore for InMemoryTripStore {
    async fn get_trip(&self, id: &str) -> Result<Option<Trip>> {
        let trips = self.trips.read().await;
        Ok(trips.get(id).cloned())
    }

    async fn all_trips(&self) -> Result<Vec<Trip>> {
        let trips = self.trips.read().await;
        Ok(trips.values().cloned().collect())
    }

    async fn replace_trip(&self, trip: Trip) -> Result<()> {
        let mut trips = self.trips.write().await;
        if !trips.contains_key(&trip.id) {
            return Err(SplitError::UnknownTrip(trip.id));
        }
        trips.insert(trip.id.clone(), trip);
        Ok(())
    }

    async fn insert_trip(&self, trip: Trip) -> Result<()> {
        let mut trips = self.trips.write().await;
        trips.insert(trip.id.clone(), trip);
        Ok(())
    }

    async fn remove_trip(&self, id: &str) -> Result<()> {
        let mut trips = self.trips.write().await;
        if !trips.contains_key(id) {
            return Err(SplitError::UnknownTrip(id.to_string()));
        }
        if trips.len() == 1 {
            return Err(SplitError::LastTrip);
        }
        trips.remove(id);
        Ok(())
    }
}

/// Serializes the trip list for a key-value backend.
pub fn encode_trips(trips: &[Trip]) -> Result<String> {
    Ok(serde_json::to_string(trips)?)
}

/// Deserializes a persisted trip list. Snapshots written before the
/// confirmation tracker existed lack the confirmed-key list and the
/// fully-settled flag; those default instead of failing the load.
pub fn decode_trips(json: &str) -> Result<Vec<Trip>> {
    Ok(serde_json::from_str(json)?)
}
