// SPDX-FileCopyrightText: 2026 Tripline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock extraction backend for deterministic testing.
//!
//! `MockBackend` answers `ExtractionBackend` calls from a queue of canned
//! completions, so dialogue tests run without an LLM endpoint.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use tripline_core::error::TriplineError;
use tripline_core::traits::ExtractionBackend;

/// A mock extraction backend that returns pre-configured completions.
///
/// Completions are popped from a FIFO queue. When the queue is empty, an
/// empty JSON object is returned, which parses as a blank intent.
pub struct MockBackend {
    responses: Arc<Mutex<VecDeque<String>>>,
    calls: AtomicUsize,
    fail_next: AtomicU32,
}

impl MockBackend {
    /// Create a new mock backend with an empty completion queue.
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            calls: AtomicUsize::new(0),
            fail_next: AtomicU32::new(0),
        }
    }

    /// Create a mock backend pre-loaded with the given completions.
    pub fn with_responses(responses: &[&str]) -> Self {
        let queue: VecDeque<String> = responses.iter().map(|r| r.to_string()).collect();
        Self {
            responses: Arc::new(Mutex::new(queue)),
            calls: AtomicUsize::new(0),
            fail_next: AtomicU32::new(0),
        }
    }

    /// Add a completion to the end of the queue.
    pub async fn add_response(&self, text: String) {
        self.responses.lock().await.push_back(text);
    }

    /// Fail the next `count` extraction calls with a backend error.
    ///
    /// Failed calls still count toward `call_count()` and do not consume
    /// queued completions.
    pub fn fail_next_calls(&self, count: u32) {
        self.fail_next.store(count, Ordering::SeqCst);
    }

    /// Number of extraction calls made so far, failures included.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Pop the next completion, or return the default.
    async fn next_response(&self) -> String {
        self.responses
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| "{}".to_string())
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ExtractionBackend for MockBackend {
    async fn extract_json(
        &self,
        _system: &str,
        _user: &str,
        _max_tokens: u32,
    ) -> Result<String, TriplineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let armed = self
            .fail_next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        if armed.is_ok() {
            return Err(TriplineError::Extract {
                message: "scripted backend failure".to_string(),
                source: None,
            });
        }
        Ok(self.next_response().await)
    }
}
