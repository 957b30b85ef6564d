// SPDX-FileCopyrightText: 2026 Tripline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams between the agent and its backends.
//!
//! All traits use `#[async_trait]` for dynamic dispatch compatibility; each
//! has one production implementation and one mock in `tripline-test-utils`.

pub mod channel;
pub mod extract;
pub mod store;

pub use channel::ReportChannel;
pub use extract::ExtractionBackend;
pub use store::TripStore;
