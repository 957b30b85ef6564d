// SPDX-FileCopyrightText: 2026 Tripline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The fetch-join-project pipeline behind one (area, category) report.
//!
//! Windows are fetched in bounded-concurrency batches, each window call
//! wrapped in the store retry policy. Facts then join against the station
//! dimension and get filtered to the requested area before projection.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use futures::future::try_join_all;
use tracing::debug;

use tripline_core::error::TriplineError;
use tripline_core::traits::TripStore;
use tripline_core::types::{DimensionRecord, FactRecord, FetchWindow, ResolvedPeriod};
use tripline_resilience::RetryPolicy;

use crate::table::{JoinedFact, ReportTable};
use crate::window::partition_windows;

/// Fetches and shapes report tables from the trip store.
pub struct ReportEngine {
    store: Arc<dyn TripStore>,
    retry: RetryPolicy,
    max_workers: usize,
}

impl ReportEngine {
    pub fn new(store: Arc<dyn TripStore>, max_workers: usize) -> Self {
        Self {
            store,
            retry: RetryPolicy::store(),
            max_workers: max_workers.max(1),
        }
    }

    /// Builds the report table for one (area, category) pair over a period.
    ///
    /// Any window still failing after retries fails the pair; an empty
    /// result at any stage yields an empty table.
    pub async fn fetch(
        &self,
        area: &str,
        category: &str,
        period: &ResolvedPeriod,
    ) -> Result<ReportTable, TriplineError> {
        let windows = partition_windows(period);
        debug!(category, windows = windows.len(), "fetching trip windows");
        let facts = self.fetch_windows(category, &windows).await?;
        if facts.is_empty() {
            return Ok(ReportTable::empty());
        }

        let station_ids = distinct_station_ids(&facts);
        let dimensions = self
            .retry
            .run(|| self.store.station_areas(&station_ids))
            .await?;
        let areas_by_station = area_index(dimensions);

        let joined = join_facts(facts, &areas_by_station);
        let matching: Vec<JoinedFact> = joined
            .into_iter()
            .filter(|row| row.area.as_deref() == Some(area))
            .collect();
        debug!(area, category, rows = matching.len(), "joined and filtered facts");
        Ok(ReportTable::from_joined(&matching))
    }

    /// Unions window results, running at most `max_workers` calls at once.
    async fn fetch_windows(
        &self,
        category: &str,
        windows: &[FetchWindow],
    ) -> Result<Vec<FactRecord>, TriplineError> {
        let mut facts = Vec::new();
        for batch in windows.chunks(self.max_workers) {
            let calls = batch.iter().map(|window| {
                self.retry
                    .run(move || self.store.completed_trips(category, window))
            });
            for rows in try_join_all(calls).await? {
                facts.extend(rows);
            }
        }
        Ok(facts)
    }
}

/// Distinct station ids across the facts, in first-seen order.
fn distinct_station_ids(facts: &[FactRecord]) -> Vec<String> {
    let mut seen = HashSet::new();
    facts
        .iter()
        .filter_map(|fact| fact.filling_station_id.clone())
        .filter(|id| seen.insert(id.clone()))
        .collect()
}

/// Indexes dimension rows as station → areas.
///
/// Rows are deduplicated on (area, station) keeping the first, so a station
/// listed twice under one area joins once while a station under two areas
/// fans out into both.
fn area_index(dimensions: Vec<DimensionRecord>) -> HashMap<String, Vec<Option<String>>> {
    let mut seen = HashSet::new();
    let mut index: HashMap<String, Vec<Option<String>>> = HashMap::new();
    for dim in dimensions {
        if seen.insert((dim.area.clone(), dim.station_id.clone())) {
            index.entry(dim.station_id).or_default().push(dim.area);
        }
    }
    index
}

/// Left join: each fact pairs with every area its station maps to, and
/// facts without a dimension match keep an absent area.
fn join_facts(
    facts: Vec<FactRecord>,
    areas_by_station: &HashMap<String, Vec<Option<String>>>,
) -> Vec<JoinedFact> {
    let mut joined = Vec::new();
    for fact in facts {
        let areas = fact
            .filling_station_id
            .as_ref()
            .and_then(|id| areas_by_station.get(id));
        match areas {
            Some(areas) if !areas.is_empty() => {
                for area in areas {
                    joined.push(JoinedFact {
                        fact: fact.clone(),
                        area: area.clone(),
                    });
                }
            }
            _ => joined.push(JoinedFact { fact, area: None }),
        }
    }
    joined
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::{Duration, TimeZone};
    use chrono_tz::Asia::Kolkata;
    use tripline_core::types::{CellValue, Column};

    #[derive(Default)]
    struct FakeStore {
        scripted: Mutex<VecDeque<Result<Vec<FactRecord>, TriplineError>>>,
        fallback: Vec<FactRecord>,
        dimensions: Vec<DimensionRecord>,
        trip_calls: AtomicUsize,
        dim_calls: AtomicUsize,
    }

    #[async_trait]
    impl TripStore for FakeStore {
        async fn completed_trips(
            &self,
            _category: &str,
            _window: &FetchWindow,
        ) -> Result<Vec<FactRecord>, TriplineError> {
            self.trip_calls.fetch_add(1, Ordering::SeqCst);
            match self.scripted.lock().unwrap().pop_front() {
                Some(result) => result,
                None => Ok(self.fallback.clone()),
            }
        }

        async fn station_areas(
            &self,
            station_ids: &[String],
        ) -> Result<Vec<DimensionRecord>, TriplineError> {
            self.dim_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .dimensions
                .iter()
                .filter(|dim| station_ids.contains(&dim.station_id))
                .cloned()
                .collect())
        }
    }

    fn fact(trip_id: &str, station: &str) -> FactRecord {
        FactRecord {
            trip_id: Some(trip_id.into()),
            trip_category: Some("MC".into()),
            filling_station_id: Some(station.into()),
            dispensed_quantity: Some(100.0),
            ..FactRecord::default()
        }
    }

    fn dim(station: &str, area: &str) -> DimensionRecord {
        DimensionRecord {
            station_id: station.into(),
            area: Some(area.into()),
        }
    }

    fn days(count: u32) -> ResolvedPeriod {
        let start = Kolkata.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let end = Kolkata
            .with_ymd_and_hms(2024, 6, count, 23, 59, 59)
            .unwrap()
            + Duration::microseconds(999_999);
        ResolvedPeriod::new(start, end).unwrap()
    }

    fn transient_error() -> TriplineError {
        TriplineError::Store {
            message: "connection reset".into(),
            source: None,
            transient: true,
        }
    }

    #[tokio::test]
    async fn joins_filters_and_projects_one_area() {
        let store = Arc::new(FakeStore {
            fallback: vec![
                fact("TRIP-1", "FS-1"),
                fact("TRIP-2", "FS-2"),
                fact("TRIP-3", "FS-9"),
            ],
            dimensions: vec![dim("FS-1", "01-North"), dim("FS-2", "02-South")],
            ..FakeStore::default()
        });
        let engine = ReportEngine::new(store.clone(), 4);

        let table = engine.fetch("01-North", "MC", &days(1)).await.unwrap();
        assert_eq!(table.trip_count(), 1);
        let id_index = table
            .columns
            .iter()
            .position(|c| *c == Column::TripId)
            .unwrap();
        assert_eq!(
            table.rows[0][id_index],
            Some(CellValue::Text("TRIP-1".into()))
        );
        assert!(table.columns.contains(&Column::Area));
        assert_eq!(store.dim_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unmatched_stations_never_reach_a_named_area() {
        let store = Arc::new(FakeStore {
            fallback: vec![fact("TRIP-1", "FS-9")],
            dimensions: vec![dim("FS-1", "01-North")],
            ..FakeStore::default()
        });
        let engine = ReportEngine::new(store, 4);

        let table = engine.fetch("01-North", "MC", &days(1)).await.unwrap();
        assert!(table.is_empty());
    }

    #[tokio::test]
    async fn station_in_two_areas_fans_out_but_filters_to_one() {
        let store = Arc::new(FakeStore {
            fallback: vec![fact("TRIP-1", "FS-1")],
            dimensions: vec![dim("FS-1", "01-North"), dim("FS-1", "02-South")],
            ..FakeStore::default()
        });
        let engine = ReportEngine::new(store, 4);

        let north = engine.fetch("01-North", "MC", &days(1)).await.unwrap();
        let south = engine.fetch("02-South", "MC", &days(1)).await.unwrap();
        assert_eq!(north.trip_count(), 1);
        assert_eq!(south.trip_count(), 1);
    }

    #[tokio::test]
    async fn duplicate_dimension_rows_join_once() {
        let store = Arc::new(FakeStore {
            fallback: vec![fact("TRIP-1", "FS-1")],
            dimensions: vec![dim("FS-1", "01-North"), dim("FS-1", "01-North")],
            ..FakeStore::default()
        });
        let engine = ReportEngine::new(store, 4);

        let table = engine.fetch("01-North", "MC", &days(1)).await.unwrap();
        assert_eq!(table.trip_count(), 1);
    }

    #[tokio::test]
    async fn empty_fetch_skips_the_dimension_lookup() {
        let store = Arc::new(FakeStore::default());
        let engine = ReportEngine::new(store.clone(), 4);

        let table = engine.fetch("01-North", "MC", &days(3)).await.unwrap();
        assert!(table.is_empty());
        assert_eq!(store.trip_calls.load(Ordering::SeqCst), 3);
        assert_eq!(store.dim_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn every_window_is_fetched_across_batches() {
        let store = Arc::new(FakeStore {
            fallback: vec![fact("TRIP-1", "FS-1")],
            dimensions: vec![dim("FS-1", "01-North")],
            ..FakeStore::default()
        });
        let engine = ReportEngine::new(store.clone(), 2);

        let table = engine.fetch("01-North", "MC", &days(5)).await.unwrap();
        assert_eq!(store.trip_calls.load(Ordering::SeqCst), 5);
        assert_eq!(table.trip_count(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn transient_window_failure_is_retried() {
        let store = Arc::new(FakeStore {
            scripted: Mutex::new(VecDeque::from([Err(transient_error())])),
            fallback: vec![fact("TRIP-1", "FS-1")],
            dimensions: vec![dim("FS-1", "01-North")],
            ..FakeStore::default()
        });
        let engine = ReportEngine::new(store.clone(), 4);

        let table = engine.fetch("01-North", "MC", &days(1)).await.unwrap();
        assert_eq!(table.trip_count(), 1);
        assert_eq!(store.trip_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn permanent_failure_fails_the_pair_without_retry() {
        let store = Arc::new(FakeStore {
            scripted: Mutex::new(VecDeque::from([Err(TriplineError::Store {
                message: "bad query".into(),
                source: None,
                transient: false,
            })])),
            ..FakeStore::default()
        });
        let engine = ReportEngine::new(store.clone(), 4);

        let err = engine.fetch("01-North", "MC", &days(1)).await.unwrap_err();
        assert!(matches!(err, TriplineError::Store { transient: false, .. }));
        assert_eq!(store.trip_calls.load(Ordering::SeqCst), 1);
    }
}
