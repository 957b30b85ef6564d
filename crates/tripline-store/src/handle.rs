// SPDX-FileCopyrightText: 2026 Tripline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Client lifecycle management: lazy connection, idle teardown, shutdown.
//!
//! The Mongo client is created on first use and torn down after a
//! configurable idle period, so the agent holds no open connections while
//! it sits waiting for chat traffic. All lifecycle transitions are
//! serialized through one async mutex.

use std::sync::Arc;
use std::time::{Duration, Instant};

use mongodb::Client;
use mongodb::error::ErrorKind;
use mongodb::options::ClientOptions;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use tripline_core::error::TriplineError;

/// How long the driver may spend picking a server before a query fails.
const SERVER_SELECTION_TIMEOUT: Duration = Duration::from_secs(5);

/// How often the idle watcher checks for an expired connection.
const IDLE_CHECK_INTERVAL: Duration = Duration::from_secs(60);

struct Inner {
    client: Option<Client>,
    last_active: Instant,
}

/// Shared handle owning the Mongo client lifecycle.
pub struct StoreHandle {
    inner: Mutex<Inner>,
    connection_string: String,
    max_workers: usize,
    idle_timeout: Duration,
}

impl StoreHandle {
    /// Creates a disconnected handle. No I/O happens until [`Self::client`].
    pub fn new(connection_string: String, max_workers: usize, idle_timeout: Duration) -> Self {
        Self {
            inner: Mutex::new(Inner {
                client: None,
                last_active: Instant::now(),
            }),
            connection_string,
            max_workers,
            idle_timeout,
        }
    }

    /// Returns the live client, connecting on first use.
    ///
    /// Every call stamps the activity clock, deferring idle teardown. The
    /// pool is sized to the fetch worker count so a full fan-out never
    /// queues on connections.
    pub async fn client(&self) -> Result<Client, TriplineError> {
        let mut inner = self.inner.lock().await;
        inner.last_active = Instant::now();
        if let Some(client) = &inner.client {
            return Ok(client.clone());
        }

        let mut options = ClientOptions::parse(&self.connection_string)
            .await
            .map_err(|e| TriplineError::Store {
                message: "invalid store connection string".into(),
                source: Some(Box::new(e)),
                transient: false,
            })?;
        options.max_pool_size = Some(self.max_workers as u32);
        options.server_selection_timeout = Some(SERVER_SELECTION_TIMEOUT);

        let client = Client::with_options(options)
            .map_err(|e| store_error("store client construction failed", e))?;
        debug!(max_pool_size = self.max_workers, "store connection opened");
        inner.client = Some(client.clone());
        Ok(client)
    }

    /// True when a client is currently held.
    pub async fn is_connected(&self) -> bool {
        self.inner.lock().await.client.is_some()
    }

    /// Tears down the client if one exists.
    ///
    /// `force` skips the graceful drain and drops in-flight operations.
    pub async fn close(&self, force: bool) {
        let mut inner = self.inner.lock().await;
        if let Some(client) = inner.client.take() {
            client.shutdown().immediate(force).await;
            debug!(force, "store connection closed");
        }
    }

    /// Spawns the idle watcher task.
    ///
    /// Ticks every [`IDLE_CHECK_INTERVAL`] and closes the connection once it
    /// has gone unused for the configured idle timeout. Cancellation
    /// force-closes and exits.
    pub fn spawn_idle_watcher(self: &Arc<Self>, cancel: CancellationToken) -> JoinHandle<()> {
        let handle = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(IDLE_CHECK_INTERVAL);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = ticker.tick() => handle.close_if_idle().await,
                    _ = cancel.cancelled() => {
                        handle.close(true).await;
                        break;
                    }
                }
            }
        })
    }

    async fn close_if_idle(&self) {
        let mut inner = self.inner.lock().await;
        if inner.last_active.elapsed() < self.idle_timeout {
            return;
        }
        if let Some(client) = inner.client.take() {
            client.shutdown().await;
            debug!("store connection idle, closed");
        }
    }
}

/// Wraps a driver error, recording whether it is worth retrying.
pub(crate) fn store_error(message: impl Into<String>, err: mongodb::error::Error) -> TriplineError {
    let transient = is_transient_error(&err);
    TriplineError::Store {
        message: message.into(),
        source: Some(Box::new(err)),
        transient,
    }
}

/// Connectivity-shaped driver failures: I/O, server selection, pool clears,
/// or anything the server itself labeled retryable.
pub(crate) fn is_transient_error(err: &mongodb::error::Error) -> bool {
    if err.contains_label("RetryableWriteError") {
        return true;
    }
    matches!(
        *err.kind,
        ErrorKind::Io(_) | ErrorKind::ServerSelection { .. } | ErrorKind::ConnectionPoolCleared { .. }
    )
}
