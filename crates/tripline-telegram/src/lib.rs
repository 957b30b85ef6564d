// SPDX-FileCopyrightText: 2026 Tripline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram channel adapter for the Tripline report agent.
//!
//! Implements [`ReportChannel`] for the Telegram Bot API via teloxide:
//! long polling feeds an inbound queue, chat authorization and group
//! mention filtering happen at this boundary, and report delivery goes out
//! as plain text plus document uploads.

pub mod handler;

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{ChatId, InputFile};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use tripline_config::model::TelegramConfig;
use tripline_core::error::TriplineError;
use tripline_core::traits::ReportChannel;
use tripline_core::types::InboundEvent;

/// Telegram channel implementing [`ReportChannel`].
///
/// Messages from chats outside `allowed_chats` are dropped here, so the
/// dialogue layer only ever sees authorized traffic.
pub struct TelegramChannel {
    bot: Bot,
    config: TelegramConfig,
    inbound_rx: tokio::sync::Mutex<mpsc::Receiver<InboundEvent>>,
    inbound_tx: mpsc::Sender<InboundEvent>,
    polling_handle: Option<tokio::task::JoinHandle<()>>,
}

impl TelegramChannel {
    /// Creates the channel. Requires `config.bot_token`.
    pub fn new(config: TelegramConfig) -> Result<Self, TriplineError> {
        let token = config
            .bot_token
            .as_deref()
            .ok_or_else(|| TriplineError::Config("telegram.bot_token is required".into()))?;

        if token.is_empty() {
            return Err(TriplineError::Config(
                "telegram.bot_token cannot be empty".into(),
            ));
        }

        let bot = Bot::new(token);
        let (inbound_tx, inbound_rx) = mpsc::channel(100);

        Ok(Self {
            bot,
            config,
            inbound_rx: tokio::sync::Mutex::new(inbound_rx),
            inbound_tx,
            polling_handle: None,
        })
    }
}

#[async_trait]
impl ReportChannel for TelegramChannel {
    async fn connect(&mut self) -> Result<(), TriplineError> {
        if self.polling_handle.is_some() {
            return Ok(());
        }

        // The bot's own username drives group mention detection.
        let me = self.bot.get_me().await.map_err(|e| TriplineError::Channel {
            message: format!("failed to resolve bot identity: {e}"),
            source: Some(Box::new(e)),
        })?;
        let username = me.username().to_string();

        let bot = self.bot.clone();
        let tx = self.inbound_tx.clone();
        let allowed_chats: Arc<Vec<i64>> = Arc::new(self.config.allowed_chats.clone());
        let bot_username: Arc<str> = Arc::from(username.as_str());

        info!(bot = %username, "starting Telegram long polling");

        let handle = tokio::spawn(async move {
            let handler = Update::filter_message().endpoint(move |msg: Message| {
                let tx = tx.clone();
                let allowed = allowed_chats.clone();
                let bot_username = bot_username.clone();
                async move {
                    if !handler::is_allowed_chat(&msg, &allowed) {
                        debug!(chat_id = msg.chat.id.0, "ignoring message from unauthorized chat");
                        return respond(());
                    }

                    match handler::relevant_text(&msg, &bot_username) {
                        Some(text) => {
                            let event = handler::to_inbound_event(&msg, text);
                            if tx.send(event).await.is_err() {
                                warn!("inbound queue closed, dropping message");
                            }
                        }
                        None => {
                            debug!(
                                chat_id = msg.chat.id.0,
                                "ignoring message without processable text"
                            );
                        }
                    }

                    respond(())
                }
            });

            Dispatcher::builder(bot, handler)
                // Non-message updates (edits, member joins) are not relevant here.
                .default_handler(|_| async {})
                .build()
                .dispatch()
                .await;
        });

        self.polling_handle = Some(handle);
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), TriplineError> {
        if let Some(handle) = &self.polling_handle {
            handle.abort();
        }
        debug!("Telegram channel disconnected");
        Ok(())
    }

    async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), TriplineError> {
        self.bot
            .send_message(ChatId(chat_id), text)
            .await
            .map_err(|e| TriplineError::Channel {
                message: format!("failed to send message: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(())
    }

    async fn send_document(
        &self,
        chat_id: i64,
        path: &Path,
        caption: &str,
    ) -> Result<(), TriplineError> {
        self.bot
            .send_document(ChatId(chat_id), InputFile::file(path))
            .caption(caption)
            .await
            .map_err(|e| TriplineError::Channel {
                message: format!("failed to upload document: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(())
    }

    async fn receive(&self) -> Result<InboundEvent, TriplineError> {
        let mut rx = self.inbound_rx.lock().await;
        rx.recv().await.ok_or_else(|| TriplineError::Channel {
            message: "Telegram inbound queue closed".into(),
            source: None,
        })
    }
}
