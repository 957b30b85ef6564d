// SPDX-FileCopyrightText: 2026 Tripline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! LLM-backed slot extraction for the Tripline report agent.
//!
//! [`LlmClient`] speaks the OpenAI-compatible chat-completions protocol
//! and implements [`ExtractionBackend`]; [`IntentExtractor`] and
//! [`PeriodResolver`] drive it with slot-extraction prompts and contain
//! its failure modes: a failed intent extraction degrades to the empty
//! intent, a failed period resolution is a typed error the dialogue
//! layer reports back to the user.
//!
//! [`ExtractionBackend`]: tripline_core::traits::ExtractionBackend

pub mod client;
pub mod intent;
pub mod period;
pub mod types;

use std::sync::LazyLock;

use regex::Regex;

pub use client::LlmClient;
pub use intent::IntentExtractor;
pub use period::PeriodResolver;

/// Matches a response wrapped whole in a Markdown code fence.
static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?si)^\s*```(?:json)?\s*(.*?)\s*```\s*$").unwrap());

/// Strips a Markdown code fence wrapper from a backend response.
///
/// Models in plain-completion mode habitually wrap JSON in ```json
/// fences even when told not to.
pub(crate) fn strip_code_fences(raw: &str) -> &str {
    if let Some(caps) = CODE_FENCE.captures(raw) {
        if let Some(inner) = caps.get(1) {
            return inner.as_str();
        }
    }
    raw.trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_json_tagged_fence() {
        let raw = "```json\n{\"a\": 1}\n```";
        assert_eq!(strip_code_fences(raw), "{\"a\": 1}");
    }

    #[test]
    fn strips_untagged_fence() {
        let raw = "```\n{\"a\": 1}\n```";
        assert_eq!(strip_code_fences(raw), "{\"a\": 1}");
    }

    #[test]
    fn strips_uppercase_tagged_fence() {
        let raw = "```JSON\n{}\n```";
        assert_eq!(strip_code_fences(raw), "{}");
    }

    #[test]
    fn trims_unfenced_text() {
        assert_eq!(strip_code_fences("  {\"a\": 1}\n"), "{\"a\": 1}");
    }

    #[test]
    fn leaves_interior_backticks_alone() {
        let raw = r#"{"note": "use ``` for code"}"#;
        assert_eq!(strip_code_fences(raw), raw);
    }
}
