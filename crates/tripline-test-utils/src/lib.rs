// SPDX-FileCopyrightText: 2026 Tripline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Tripline integration tests.
//!
//! Mock implementations of the extraction, store, and chat seams plus a
//! [`TestHarness`] that wires them into a complete dialogue stack, so
//! tests run deterministically without external services.
//!
//! # Components
//!
//! - [`MockBackend`] - extraction backend with queued completions
//! - [`MockChannel`] - chat channel with event injection and send capture
//! - [`MockStore`] - trip store with scripted fetch results

pub mod harness;
pub mod mock_backend;
pub mod mock_channel;
pub mod mock_store;

pub use harness::TestHarness;
pub use mock_backend::MockBackend;
pub use mock_channel::{MockChannel, SentDocument};
pub use mock_store::MockStore;
