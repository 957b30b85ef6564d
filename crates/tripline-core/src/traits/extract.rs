// SPDX-FileCopyrightText: 2026 Tripline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Extraction backend trait for LLM-assisted text understanding.

use async_trait::async_trait;

use crate::error::TriplineError;

/// A language-model backend expected to answer prompts with JSON text.
///
/// The intent extractor and the period resolver share one backend; callers
/// own prompt construction and response parsing, implementations own
/// transport and completion mechanics (including any JSON-mode negotiation).
#[async_trait]
pub trait ExtractionBackend: Send + Sync {
    /// Runs one completion and returns the raw response text.
    ///
    /// The returned text is expected to be JSON, possibly wrapped in
    /// markdown code fences; callers strip and parse it.
    async fn extract_json(
        &self,
        system: &str,
        user: &str,
        max_tokens: u32,
    ) -> Result<String, TriplineError>;
}
