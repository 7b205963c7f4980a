//! Process-wide HTTP client pool.
//!
//! One pooled `reqwest::Client` is built at startup and shared by every
//! request handler. The pool is an owned handle (held in an `Arc` by the
//! server process), not a global.
//!
//! Lifecycle: `Uninitialized` → `Ready` → `Closed`, each transition at most once.

use std::time::Duration;

use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::config::PoolConfig;

#[derive(Error, Debug)]
pub enum PoolError {
    #[error("failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),

    #[error("client pool already shut down")]
    Closed,
}

#[derive(Debug)]
enum PoolState {
    Uninitialized,
    Ready(reqwest::Client),
    Closed,
}

/// Shared HTTP client pool handle.
#[derive(Debug)]
pub struct HttpPool {
    state: RwLock<PoolState>,
}

impl HttpPool {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(PoolState::Uninitialized),
        }
    }

    /// Build the pooled client. Idempotent: a second call is a logged no-op.
    /// Fails with [`PoolError::Closed`] after `shutdown`.
    pub async fn initialize(&self, config: &PoolConfig) -> Result<(), PoolError> {
        let mut state = self.state.write().await;
        match &*state {
            PoolState::Ready(_) => {
                debug!("HTTP client pool already initialized");
                Ok(())
            }
            PoolState::Closed => Err(PoolError::Closed),
            PoolState::Uninitialized => {
                info!(
                    max_connections = config.max_connections,
                    timeout_secs = config.request_timeout_secs,
                    "Initializing HTTP client pool"
                );
                let client = reqwest::Client::builder()
                    .pool_max_idle_per_host(config.max_connections)
                    .timeout(Duration::from_secs(config.request_timeout_secs))
                    .build()?;
                *state = PoolState::Ready(client);
                Ok(())
            }
        }
    }

    /// The pooled client, or `None` if the pool was never initialized or has
    /// been shut down. Safe to call from many concurrent handler contexts;
    /// the returned client is a cheap handle onto the shared pool.
    pub async fn get(&self) -> Option<reqwest::Client> {
        match &*self.state.read().await {
            PoolState::Ready(client) => Some(client.clone()),
            _ => None,
        }
    }

    /// Release the pooled connections. A second call is a no-op.
    pub async fn shutdown(&self) {
        let mut state = self.state.write().await;
        match std::mem::replace(&mut *state, PoolState::Closed) {
            // Dropping the client here releases its idle connections and timers.
            PoolState::Ready(_) => info!("HTTP client pool shut down"),
            PoolState::Uninitialized => debug!("HTTP client pool was never initialized"),
            PoolState::Closed => debug!("HTTP client pool already shut down"),
        }
    }
}

impl Default for HttpPool {
    fn default() -> Self {
        Self::new()
    }
}
