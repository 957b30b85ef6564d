// SPDX-FileCopyrightText: 2026 Tripline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! MongoDB persistence layer for the Tripline report agent.
//!
//! Provides a lazily-connected client handle with idle teardown, plus typed
//! aggregation queries for the trip fact collection and the station
//! dimension table. Timestamps are rendered server-side via `$dateToString`
//! so rows arrive as flat, report-ready columns.

pub mod adapter;
pub mod convert;
pub mod handle;
pub mod queries;

pub use adapter::MongoTripStore;
pub use handle::StoreHandle;
