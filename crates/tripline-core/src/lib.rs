// SPDX-FileCopyrightText: 2026 Tripline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Tripline report agent.
//!
//! This crate provides the foundational trait definitions, error types, and
//! common types used throughout the Tripline workspace. The channel, store,
//! and extraction backends all implement traits defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::TriplineError;
pub use types::{
    CellValue, Column, DimensionRecord, FactRecord, FetchWindow, InboundEvent, Intent,
    ResolvedPeriod, RunSummary,
};

// Re-export the trait seams at crate root.
pub use traits::{ExtractionBackend, ReportChannel, TripStore};
