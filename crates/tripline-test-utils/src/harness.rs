// SPDX-FileCopyrightText: 2026 Tripline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end harness for dialogue-to-delivery tests.
//!
//! [`TestHarness`] assembles the dialogue engine over mock adapters and a
//! temp report directory; [`TestHarness::send_message`] drives one inbound
//! message through extraction, slot filling, fetch, and delivery.

use std::sync::Arc;
use std::time::Duration;

use chrono_tz::Tz;

use tripline_agent::{DialogueEngine, ReportOrchestrator};
use tripline_config::model::{AgentConfig, ReportConfig};
use tripline_core::error::TriplineError;
use tripline_core::types::{DimensionRecord, FactRecord, InboundEvent};
use tripline_extract::{IntentExtractor, PeriodResolver};
use tripline_report::ReportEngine;

use crate::mock_backend::MockBackend;
use crate::mock_channel::MockChannel;
use crate::mock_store::MockStore;

/// Configures the mocks and catalogs a harness is built with.
pub struct TestHarnessBuilder {
    responses: Vec<String>,
    facts: Vec<FactRecord>,
    dimensions: Vec<DimensionRecord>,
    categories: Vec<String>,
    areas: Vec<String>,
    timezone: String,
    dialogue_timeout: Duration,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        let report = ReportConfig::default();
        Self {
            responses: Vec::new(),
            facts: Vec::new(),
            dimensions: Vec::new(),
            categories: report.categories,
            areas: report.areas,
            timezone: report.timezone,
            dialogue_timeout: Duration::from_secs(AgentConfig::default().dialogue_timeout_secs),
        }
    }

    /// Queue mock backend completions, consumed in order.
    pub fn with_backend_responses(mut self, responses: Vec<String>) -> Self {
        self.responses = responses;
        self
    }

    /// Set the rows every trip fetch returns.
    pub fn with_trips(mut self, facts: Vec<FactRecord>) -> Self {
        self.facts = facts;
        self
    }

    /// Set the station dimension table.
    pub fn with_dimensions(mut self, dimensions: Vec<DimensionRecord>) -> Self {
        self.dimensions = dimensions;
        self
    }

    /// Replace the default category catalog.
    pub fn with_categories(mut self, categories: Vec<String>) -> Self {
        self.categories = categories;
        self
    }

    /// Replace the default area catalog.
    pub fn with_areas(mut self, areas: Vec<String>) -> Self {
        self.areas = areas;
        self
    }

    /// Shorten or extend the slot-filling conversation timeout.
    pub fn with_dialogue_timeout(mut self, timeout: Duration) -> Self {
        self.dialogue_timeout = timeout;
        self
    }

    /// Build the test harness, assembling the full dialogue stack.
    pub async fn build(self) -> Result<TestHarness, TriplineError> {
        // Temp directory for generated workbooks
        let output_dir = tempfile::TempDir::new().map_err(|e| TriplineError::Report {
            message: "failed to create temp report directory".to_string(),
            source: Some(Box::new(e)),
        })?;

        let tz: Tz = self
            .timezone
            .parse()
            .map_err(|_| TriplineError::Config(format!("unknown timezone '{}'", self.timezone)))?;

        let channel = Arc::new(MockChannel::new());
        let backend = Arc::new(MockBackend::new());
        for response in self.responses {
            backend.add_response(response).await;
        }
        let store = Arc::new(MockStore::new());
        store.set_fallback(self.facts).await;
        store.set_dimensions(self.dimensions).await;

        let extractor = IntentExtractor::new(backend.clone(), &self.categories, &self.areas);
        let resolver = PeriodResolver::new(backend.clone(), tz);
        let orchestrator = ReportOrchestrator::new(
            ReportEngine::new(store.clone(), 4),
            channel.clone(),
            self.categories.clone(),
            self.areas.clone(),
            output_dir.path().to_path_buf(),
        );
        let engine = DialogueEngine::new(
            extractor,
            resolver,
            orchestrator,
            channel.clone(),
            self.categories,
            self.areas,
            self.dialogue_timeout,
            tz,
        );

        Ok(TestHarness {
            channel,
            backend,
            store,
            engine,
            _output_dir: output_dir,
        })
    }
}

/// An assembled dialogue stack over mocks, ready to drive in tests.
///
/// The mock fields are public so tests can script results and assert on
/// captured traffic around each [`TestHarness::send_message`] call.
pub struct TestHarness {
    /// The mock chat channel.
    pub channel: Arc<MockChannel>,
    /// The mock extraction backend.
    pub backend: Arc<MockBackend>,
    /// The mock trip store.
    pub store: Arc<MockStore>,
    /// The dialogue engine under test.
    pub engine: DialogueEngine,
    /// Temp directory kept alive for cleanup on drop.
    _output_dir: tempfile::TempDir,
}

impl TestHarness {
    /// Starts a builder with the default catalogs and an empty script.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Drive one inbound message through the dialogue engine.
    ///
    /// Replies and report uploads land on the mock channel for assertion.
    pub async fn send_message(&mut self, chat_id: i64, text: &str) -> Result<(), TriplineError> {
        self.engine
            .handle(InboundEvent {
                chat_id,
                sender_id: Some(1),
                text: text.to_string(),
            })
            .await
    }

    /// Add a completion to the mock backend's queue.
    pub async fn add_backend_response(&self, text: String) {
        self.backend.add_response(text).await;
    }
}
