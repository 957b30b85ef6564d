// SPDX-FileCopyrightText: 2026 Tripline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock chat channel for deterministic testing.
//!
//! `MockChannel` implements `ReportChannel` with injectable inbound events
//! and captured outbound traffic for assertion in tests.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};

use tripline_core::error::TriplineError;
use tripline_core::traits::ReportChannel;
use tripline_core::types::InboundEvent;

/// A document upload captured by `send_document()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentDocument {
    pub chat_id: i64,
    pub path: PathBuf,
    pub caption: String,
}

/// A mock chat channel for testing.
///
/// Provides three queues:
/// - **inbound**: Events injected via `inject()` are returned by `receive()`
/// - **texts**: Messages passed to `send_text()` are captured with their chat ids
/// - **documents**: Uploads passed to `send_document()` are captured with their captions
pub struct MockChannel {
    inbound: Arc<Mutex<VecDeque<InboundEvent>>>,
    texts: Arc<Mutex<Vec<(i64, String)>>>,
    documents: Arc<Mutex<Vec<SentDocument>>>,
    fail_next: AtomicU32,
    closed: AtomicBool,
    notify: Arc<Notify>,
}

impl MockChannel {
    /// Create a new mock channel with empty queues.
    pub fn new() -> Self {
        Self {
            inbound: Arc::new(Mutex::new(VecDeque::new())),
            texts: Arc::new(Mutex::new(Vec::new())),
            documents: Arc::new(Mutex::new(Vec::new())),
            fail_next: AtomicU32::new(0),
            closed: AtomicBool::new(false),
            notify: Arc::new(Notify::new()),
        }
    }

    /// Inject an inbound event into the receive queue.
    ///
    /// The next call to `receive()` will return this event.
    pub async fn inject(&self, event: InboundEvent) {
        self.inbound.lock().await.push_back(event);
        self.notify.notify_one();
    }

    /// Close the inbound feed: once the queue drains, `receive()` errors.
    pub fn close_inbound(&self) {
        self.closed.store(true, Ordering::SeqCst);
        // notify_one stores a permit, so a receiver that checked the queue
        // before this call still wakes up and observes the close.
        self.notify.notify_one();
    }

    /// Fail the next `count` sends (text or document) with a channel error.
    ///
    /// Failed sends are not captured.
    pub fn fail_next_sends(&self, count: u32) {
        self.fail_next.store(count, Ordering::SeqCst);
    }

    /// Get all messages captured from `send_text()`, with their chat ids.
    pub async fn texts(&self) -> Vec<(i64, String)> {
        self.texts.lock().await.clone()
    }

    /// Get all uploads captured from `send_document()`.
    pub async fn documents(&self) -> Vec<SentDocument> {
        self.documents.lock().await.clone()
    }

    fn check_send_failure(&self) -> Result<(), TriplineError> {
        let armed = self
            .fail_next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        if armed.is_ok() {
            return Err(TriplineError::Channel {
                message: "scripted send failure".to_string(),
                source: None,
            });
        }
        Ok(())
    }
}

impl Default for MockChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReportChannel for MockChannel {
    async fn connect(&mut self) -> Result<(), TriplineError> {
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), TriplineError> {
        Ok(())
    }

    async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), TriplineError> {
        self.check_send_failure()?;
        self.texts.lock().await.push((chat_id, text.to_string()));
        Ok(())
    }

    async fn send_document(
        &self,
        chat_id: i64,
        path: &Path,
        caption: &str,
    ) -> Result<(), TriplineError> {
        self.check_send_failure()?;
        self.documents.lock().await.push(SentDocument {
            chat_id,
            path: path.to_path_buf(),
            caption: caption.to_string(),
        });
        Ok(())
    }

    async fn receive(&self) -> Result<InboundEvent, TriplineError> {
        loop {
            // The queue lock must drop before waiting, or inject() could
            // never enqueue.
            {
                let mut queue = self.inbound.lock().await;
                if let Some(event) = queue.pop_front() {
                    return Ok(event);
                }
            }
            if self.closed.load(Ordering::SeqCst) {
                return Err(TriplineError::Channel {
                    message: "inbound queue closed".to_string(),
                    source: None,
                });
            }
            self.notify.notified().await;
        }
    }
}
