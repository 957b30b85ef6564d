// SPDX-FileCopyrightText: 2026 Tripline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Agent runtime for the Tripline report bot.
//!
//! [`AgentLoop`] owns the receive side of a [`ReportChannel`] and feeds
//! every inbound event through the [`DialogueEngine`], which fills
//! request slots across turns and hands complete requests to the
//! [`ReportOrchestrator`]. The loop runs until the channel closes or
//! shutdown is signalled through a [`CancellationToken`].

pub mod dialogue;
pub mod orchestrator;
pub mod shutdown;

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tripline_core::error::TriplineError;
use tripline_core::traits::ReportChannel;

pub use dialogue::{DialogueEngine, SlotState};
pub use orchestrator::ReportOrchestrator;
pub use shutdown::install_signal_handler;

/// Drives the dialogue engine from a channel's inbound events.
pub struct AgentLoop {
    channel: Arc<dyn ReportChannel>,
    engine: DialogueEngine,
}

impl AgentLoop {
    pub fn new(channel: Arc<dyn ReportChannel>, engine: DialogueEngine) -> Self {
        Self { channel, engine }
    }

    /// Receives and handles events until the channel closes or `cancel` fires.
    ///
    /// A failed event is logged and the loop moves on; only a closed
    /// channel or the cancellation token stops it.
    pub async fn run(&mut self, cancel: CancellationToken) -> Result<(), TriplineError> {
        info!("agent loop running");
        loop {
            tokio::select! {
                event = self.channel.receive() => {
                    match event {
                        Ok(inbound) => {
                            if let Err(e) = self.engine.handle(inbound).await {
                                error!(error = %e, "failed to handle inbound event");
                            }
                        }
                        Err(e) => {
                            error!(error = %e, "channel receive error");
                            // A closed inbound feed is the only receive error
                            // that ends the loop.
                            if e.to_string().contains("closed") {
                                break;
                            }
                        }
                    }
                }
                _ = cancel.cancelled() => {
                    info!("shutdown signal received, stopping agent loop");
                    break;
                }
            }
        }
        info!("agent loop stopped");
        Ok(())
    }
}
