// SPDX-FileCopyrightText: 2026 Tripline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock trip store for deterministic testing.
//!
//! `MockStore` implements `TripStore` with scripted per-call results and a
//! static dimension table, so report pipelines can be tested without a
//! database.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use tripline_core::error::TriplineError;
use tripline_core::traits::TripStore;
use tripline_core::types::{DimensionRecord, FactRecord, FetchWindow};

/// A mock trip store with scripted fetch results.
///
/// Each `completed_trips()` call pops one scripted result. When the script
/// runs out, calls return the fallback rows (empty by default), so a single
/// data set can serve any number of window fetches.
pub struct MockStore {
    scripted: Arc<Mutex<VecDeque<Result<Vec<FactRecord>, TriplineError>>>>,
    fallback: Arc<Mutex<Vec<FactRecord>>>,
    dimensions: Arc<Mutex<Vec<DimensionRecord>>>,
    trip_calls: AtomicUsize,
    dimension_calls: AtomicUsize,
}

impl MockStore {
    /// Create a new mock store with no data.
    pub fn new() -> Self {
        Self {
            scripted: Arc::new(Mutex::new(VecDeque::new())),
            fallback: Arc::new(Mutex::new(Vec::new())),
            dimensions: Arc::new(Mutex::new(Vec::new())),
            trip_calls: AtomicUsize::new(0),
            dimension_calls: AtomicUsize::new(0),
        }
    }

    /// Script the result of the next unscripted `completed_trips()` call.
    pub async fn push_trips(&self, result: Result<Vec<FactRecord>, TriplineError>) {
        self.scripted.lock().await.push_back(result);
    }

    /// Set the rows returned once the script is exhausted.
    pub async fn set_fallback(&self, facts: Vec<FactRecord>) {
        *self.fallback.lock().await = facts;
    }

    /// Set the station dimension table.
    pub async fn set_dimensions(&self, dimensions: Vec<DimensionRecord>) {
        *self.dimensions.lock().await = dimensions;
    }

    /// Number of `completed_trips()` calls made so far.
    pub fn trip_call_count(&self) -> usize {
        self.trip_calls.load(Ordering::SeqCst)
    }

    /// Number of `station_areas()` calls made so far.
    pub fn dimension_call_count(&self) -> usize {
        self.dimension_calls.load(Ordering::SeqCst)
    }
}

impl Default for MockStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TripStore for MockStore {
    async fn completed_trips(
        &self,
        _category: &str,
        _window: &FetchWindow,
    ) -> Result<Vec<FactRecord>, TriplineError> {
        self.trip_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(result) = self.scripted.lock().await.pop_front() {
            return result;
        }
        Ok(self.fallback.lock().await.clone())
    }

    async fn station_areas(
        &self,
        station_ids: &[String],
    ) -> Result<Vec<DimensionRecord>, TriplineError> {
        self.dimension_calls.fetch_add(1, Ordering::SeqCst);
        let dimensions = self.dimensions.lock().await;
        Ok(dimensions
            .iter()
            .filter(|d| station_ids.contains(&d.station_id))
            .cloned()
            .collect())
    }
}
