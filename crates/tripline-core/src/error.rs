// SPDX-FileCopyrightText: 2026 Tripline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Tripline report agent.

use thiserror::Error;

/// The primary error type used across all Tripline trait seams and core operations.
#[derive(Debug, Error)]
pub enum TriplineError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Chat channel errors (connection failure, send/upload failure, rate limiting).
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Extraction backend errors (API failure, malformed completion, token limits).
    #[error("extraction error: {message}")]
    Extract {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Period text that could not be resolved into a date range.
    ///
    /// Recovered by the dialogue layer with a user-facing message; never retried.
    #[error("period error: {message}")]
    Period { message: String },

    /// Trip store errors. `transient` records whether the underlying driver
    /// failure was connectivity-shaped and therefore worth retrying.
    #[error("store error: {message}")]
    Store {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        transient: bool,
    },

    /// Report generation errors (workbook construction, file system).
    #[error("report error: {message}")]
    Report {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl TriplineError {
    /// True when the error is a connectivity-shaped store failure.
    ///
    /// Feeds the store retry predicate: only these are worth another attempt.
    pub fn is_transient(&self) -> bool {
        matches!(self, TriplineError::Store { transient: true, .. })
    }

    /// True when the error came from the chat channel.
    ///
    /// Feeds the delivery retry predicate.
    pub fn is_channel(&self) -> bool {
        matches!(self, TriplineError::Channel { .. })
    }
}
