//! Process-wide database connection reuse.
//!
//! A [`ConnectionCache`] is built once at startup and shared by every request
//! handler. Concurrent callers that arrive before a connection exists all
//! attach to one in-flight attempt, so at most one physical connect is ever
//! outstanding.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use async_trait::async_trait;
use futures::{
    future::{BoxFuture, Shared},
    FutureExt,
};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Opens the underlying connection for a [`ConnectionCache`].
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    type Handle: Clone + Send + Sync + 'static;

    async fn connect(&self, target: &str) -> anyhow::Result<Self::Handle>;
}

#[derive(Debug, Clone, Error)]
pub enum CacheError {
    #[error("database connection target is not configured")]
    MissingTarget,
    #[error("database connection failed: {0:#}")]
    Connect(Arc<anyhow::Error>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Empty,
    Connecting,
    Ready,
}

type PendingConnect<H> = Shared<BoxFuture<'static, Result<H, CacheError>>>;

enum CacheState<H> {
    Empty,
    Connecting(PendingConnect<H>),
    Ready(H),
}

impl<H> CacheState<H> {
    fn status(&self) -> CacheStatus {
        match self {
            Self::Empty => CacheStatus::Empty,
            Self::Connecting(_) => CacheStatus::Connecting,
            Self::Ready(_) => CacheStatus::Ready,
        }
    }
}

pub struct ConnectionCache<C: Connector> {
    connector: Arc<C>,
    target: Option<String>,
    state: Mutex<CacheState<C::Handle>>,
    attempts: AtomicU64,
}

impl<C: Connector> ConnectionCache<C> {
    /// A blank target is treated the same as a missing one.
    pub fn new(connector: C, target: Option<String>) -> Self {
        let target = target
            .map(|raw| raw.trim().to_string())
            .filter(|raw| !raw.is_empty());
        Self {
            connector: Arc::new(connector),
            target,
            state: Mutex::new(CacheState::Empty),
            attempts: AtomicU64::new(0),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.target.is_some()
    }

    /// Returns the shared handle, connecting first if nobody has yet.
    ///
    /// Every caller waiting on the same attempt observes the same outcome.
    /// A failed attempt leaves the cache empty so the next call starts over.
    pub async fn acquire(&self) -> Result<C::Handle, CacheError> {
        let pending = {
            let mut state = self.state.lock().await;
            match &*state {
                CacheState::Ready(handle) => return Ok(handle.clone()),
                CacheState::Connecting(pending) => {
                    debug!("joining in-flight database connection attempt");
                    pending.clone()
                }
                CacheState::Empty => {
                    let Some(target) = self.target.clone() else {
                        return Err(CacheError::MissingTarget);
                    };
                    let pending = self.start_attempt(target);
                    *state = CacheState::Connecting(pending.clone());
                    pending
                }
            }
        };

        let outcome = pending.clone().await;
        self.settle(&pending, &outcome).await;
        outcome
    }

    /// The handle if one is already cached. Never starts an attempt.
    pub async fn cached(&self) -> Option<C::Handle> {
        match &*self.state.lock().await {
            CacheState::Ready(handle) => Some(handle.clone()),
            CacheState::Empty | CacheState::Connecting(_) => None,
        }
    }

    /// Drops the cached handle or the in-flight attempt. A late result from
    /// an invalidated attempt is still returned to its waiters but never
    /// cached.
    pub async fn invalidate(&self) -> CacheStatus {
        let mut state = self.state.lock().await;
        let previous = state.status();
        *state = CacheState::Empty;
        if previous != CacheStatus::Empty {
            info!(?previous, "database connection cache invalidated");
        }
        previous
    }

    pub async fn status(&self) -> CacheStatus {
        self.state.lock().await.status()
    }

    /// Number of physical connection attempts started so far.
    pub fn attempts(&self) -> u64 {
        self.attempts.load(Ordering::SeqCst)
    }

    fn start_attempt(&self, target: String) -> PendingConnect<C::Handle> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        info!(attempt, "opening database connection");
        let connector = Arc::clone(&self.connector);
        async move {
            connector
                .connect(&target)
                .await
                .map_err(|error| CacheError::Connect(Arc::new(error)))
        }
        .boxed()
        .shared()
    }

    async fn settle(
        &self,
        pending: &PendingConnect<C::Handle>,
        outcome: &Result<C::Handle, CacheError>,
    ) {
        let mut state = self.state.lock().await;
        let still_current =
            matches!(&*state, CacheState::Connecting(inflight) if inflight.ptr_eq(pending));
        if !still_current {
            return;
        }

        match outcome {
            Ok(handle) => {
                info!("database connection ready");
                *state = CacheState::Ready(handle.clone());
            }
            Err(error) => {
                warn!(%error, "database connection attempt failed");
                *state = CacheState::Empty;
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/connection_cache_tests.rs"]
mod tests;
