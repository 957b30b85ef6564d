// SPDX-FileCopyrightText: 2026 Tripline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Channel trait for the chat platform integration (Telegram today).

use std::path::Path;

use async_trait::async_trait;

use crate::error::TriplineError;
use crate::types::InboundEvent;

/// Bidirectional chat channel for receiving queries and delivering reports.
///
/// Implementations filter unauthorized chats before events reach
/// [`receive`](ReportChannel::receive); everything downstream assumes an
/// allowed chat.
#[async_trait]
pub trait ReportChannel: Send + Sync {
    /// Establishes a connection to the chat platform and starts the inbound feed.
    async fn connect(&mut self) -> Result<(), TriplineError>;

    /// Stops the inbound feed and releases the connection.
    async fn disconnect(&self) -> Result<(), TriplineError>;

    /// Sends a plain text message to a chat.
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), TriplineError>;

    /// Uploads a file to a chat with a caption.
    async fn send_document(
        &self,
        chat_id: i64,
        path: &Path,
        caption: &str,
    ) -> Result<(), TriplineError>;

    /// Receives the next inbound event from the channel.
    async fn receive(&self) -> Result<InboundEvent, TriplineError>;
}
