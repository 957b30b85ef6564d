// SPDX-FileCopyrightText: 2026 Tripline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `TripStore` implementation backed by MongoDB aggregations.

use std::sync::Arc;

use async_trait::async_trait;
use chrono_tz::Tz;

use tripline_core::error::TriplineError;
use tripline_core::traits::TripStore;
use tripline_core::types::{DimensionRecord, FactRecord, FetchWindow};

use crate::handle::StoreHandle;
use crate::queries;

/// Mongo-backed trip store.
///
/// Each call borrows the shared handle, which reconnects lazily after idle
/// teardown. The timezone is baked into the fact projection so timestamps
/// arrive rendered in report-local time.
pub struct MongoTripStore {
    handle: Arc<StoreHandle>,
    tz: Tz,
}

impl MongoTripStore {
    pub fn new(handle: Arc<StoreHandle>, tz: Tz) -> Self {
        Self { handle, tz }
    }
}

#[async_trait]
impl TripStore for MongoTripStore {
    async fn completed_trips(
        &self,
        category: &str,
        window: &FetchWindow,
    ) -> Result<Vec<FactRecord>, TriplineError> {
        let client = self.handle.client().await?;
        queries::trips::completed_trips(&client, category, window, self.tz).await
    }

    async fn station_areas(
        &self,
        station_ids: &[String],
    ) -> Result<Vec<DimensionRecord>, TriplineError> {
        let client = self.handle.client().await?;
        queries::stations::station_areas(&client, station_ids).await
    }
}
