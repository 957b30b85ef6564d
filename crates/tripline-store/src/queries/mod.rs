// SPDX-FileCopyrightText: 2026 Tripline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Aggregation query modules for the fact and dimension collections.

pub mod stations;
pub mod trips;
