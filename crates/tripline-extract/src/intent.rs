// SPDX-FileCopyrightText: 2026 Tripline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Free-text intent extraction against a fixed category/area vocabulary.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, warn};
use tripline_core::error::TriplineError;
use tripline_core::traits::ExtractionBackend;
use tripline_core::types::Intent;

use crate::strip_code_fences;

/// Token ceiling for intent extraction responses.
const INTENT_MAX_TOKENS: u32 = 250;

/// System prompt for intent extraction. `{categories}`, `{areas}`, and
/// `{example_area}` are replaced at construction time.
const INTENT_PROMPT: &str = r#"You extract the slots of a fuel trip report request.

Valid trip categories: {categories}
Valid areas:
{areas}

Return a JSON object with exactly these fields:
- "categories": array of category codes from the valid list, or ["all"] when every category is wanted
- "areas": array of area names copied exactly from the valid list, or ["all"] when every area is wanted
- "all_categories": true only when the user asks for all categories
- "all_areas": true only when the user asks for all areas
- "has_period": true when the message names a reporting period
- "period_text": the period phrase copied verbatim from the message, or "" when has_period is false
- "has_area": true when the message names one or more areas, or all areas

Match areas loosely: an area number or a neighbourhood name both mean the closest entry from the valid list. Never invent categories or areas that are not listed.

Examples:
"MC trips for June 2024" -> {"categories": ["MC"], "areas": [], "all_categories": false, "all_areas": false, "has_period": true, "period_text": "June 2024", "has_area": false}
"all trips for all areas in May" -> {"categories": ["all"], "areas": ["all"], "all_categories": true, "all_areas": true, "has_period": true, "period_text": "May", "has_area": true}
"PS and JR report for area 3 last month" -> {"categories": ["PS", "JR"], "areas": ["{example_area}"], "all_categories": false, "all_areas": false, "has_period": true, "period_text": "last month", "has_area": true}
"trip report" -> {"categories": [], "areas": [], "all_categories": false, "all_areas": false, "has_period": false, "period_text": "", "has_area": false}

Output the JSON object only."#;

/// Wire shape of the backend's intent JSON.
///
/// Every field defaults so partial answers still parse, and unknown
/// fields are ignored. Backends occasionally answer with scalar
/// "category"/"area" fields; those are accepted and promoted into the
/// corresponding lists when the lists are empty.
#[derive(Debug, Default, Deserialize)]
struct IntentPayload {
    #[serde(default)]
    categories: Vec<String>,
    #[serde(default)]
    areas: Vec<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    area: Option<String>,
    #[serde(default)]
    all_categories: bool,
    #[serde(default)]
    all_areas: bool,
    #[serde(default)]
    has_period: bool,
    #[serde(default)]
    period_text: Option<String>,
    #[serde(default)]
    has_area: bool,
}

impl IntentPayload {
    fn into_intent(self) -> Intent {
        let mut categories = self.categories;
        if categories.is_empty() {
            if let Some(single) = self.category {
                if !single.trim().is_empty() {
                    categories.push(single);
                }
            }
        }
        let mut areas = self.areas;
        if areas.is_empty() {
            if let Some(single) = self.area {
                if !single.trim().is_empty() {
                    areas.push(single);
                }
            }
        }
        Intent {
            categories,
            areas,
            period_text: self.period_text,
            has_period: self.has_period,
            has_area: self.has_area,
            all_categories: self.all_categories,
            all_areas: self.all_areas,
        }
        .normalized()
    }
}

/// Extracts a structured [`Intent`] from free-text report requests.
///
/// The category and area vocabularies come from configuration; the
/// backend is only ever asked to pick from them. Extraction never fails
/// past this boundary: anything unusable comes back as the empty intent,
/// and the dialogue layer asks the user to rephrase.
pub struct IntentExtractor {
    backend: Arc<dyn ExtractionBackend>,
    system_prompt: String,
}

impl IntentExtractor {
    pub fn new(
        backend: Arc<dyn ExtractionBackend>,
        categories: &[String],
        areas: &[String],
    ) -> Self {
        Self {
            backend,
            system_prompt: build_system_prompt(categories, areas),
        }
    }

    /// Extracts an intent from `text`, degrading to the empty intent on
    /// any backend or parse failure.
    pub async fn extract(&self, text: &str) -> Intent {
        match self.try_extract(text).await {
            Ok(intent) => intent,
            Err(err) => {
                warn!("intent extraction failed, treating request as unparsed: {err}");
                Intent::default()
            }
        }
    }

    async fn try_extract(&self, text: &str) -> Result<Intent, TriplineError> {
        let raw = self
            .backend
            .extract_json(&self.system_prompt, text, INTENT_MAX_TOKENS)
            .await?;
        debug!(raw = %raw, "intent extraction response");
        let payload: IntentPayload = serde_json::from_str(strip_code_fences(&raw)).map_err(
            |e| TriplineError::Extract {
                message: format!("backend returned unparseable intent JSON: {e}"),
                source: Some(Box::new(e)),
            },
        )?;
        Ok(payload.into_intent())
    }
}

/// Interpolates the configured vocabulary into the prompt template.
fn build_system_prompt(categories: &[String], areas: &[String]) -> String {
    let example_area = areas
        .get(2)
        .or_else(|| areas.first())
        .map(String::as_str)
        .unwrap_or("area 3");
    INTENT_PROMPT
        .replace("{categories}", &categories.join(", "))
        .replace("{areas}", &areas.join("\n"))
        .replace("{example_area}", example_area)
}
