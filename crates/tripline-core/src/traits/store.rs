// SPDX-FileCopyrightText: 2026 Tripline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trip store trait for the time-series fact and dimension backends.

use async_trait::async_trait;

use crate::error::TriplineError;
use crate::types::{DimensionRecord, FactRecord, FetchWindow};

/// Read access to the trip fact collection and the station dimension table.
///
/// Window queries are the unit of retry: each call covers one day-length
/// window and may be re-issued on transient failures, so implementations
/// must keep them side-effect free.
#[async_trait]
pub trait TripStore: Send + Sync {
    /// Fetches completed trips of one category whose creation time falls in
    /// the half-open window.
    async fn completed_trips(
        &self,
        category: &str,
        window: &FetchWindow,
    ) -> Result<Vec<FactRecord>, TriplineError>;

    /// Looks up the area dimension rows for the given station ids.
    ///
    /// Stations unknown to the dimension table are simply absent from the
    /// result; the caller's join treats them as unmatched.
    async fn station_areas(
        &self,
        station_ids: &[String],
    ) -> Result<Vec<DimensionRecord>, TriplineError>;
}
