//! Process-wide registration state shared by every bridge instance.
//!
//! The coordinator holds the active connection pool together with the cache
//! of entries registered from it. Both are published and torn down together
//! under one lock, so a reader never sees cached entries without the pool
//! that serves them.

use super::{cache::DescriptorCache, pool::ConnectionPool};
use crate::tool_bridge::domain::RegisteredToolEntry;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};
use tracing::{debug, warn};

static GLOBAL_COORDINATOR: OnceLock<Arc<LifecycleCoordinator>> = OnceLock::new();

/// Which registration path a new bridge instance should take.
#[derive(Debug, Clone)]
pub enum RegistrationPath {
    /// A live pool with cached entries exists; replay them.
    Fast {
        /// Active pool that serves the cached entries.
        pool: Arc<ConnectionPool>,
        /// Cached entries in discovery order.
        entries: Vec<RegisteredToolEntry>,
    },
    /// Nothing reusable is live; build a new pool and service.
    Cold,
}

#[derive(Debug, Default)]
struct SharedState {
    pool: Option<Arc<ConnectionPool>>,
    cache: DescriptorCache,
}

/// Shared pool and descriptor cache.
#[derive(Debug, Default)]
pub struct LifecycleCoordinator {
    state: Mutex<SharedState>,
}

impl LifecycleCoordinator {
    /// Creates an empty coordinator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the coordinator shared by the whole process.
    #[must_use]
    pub fn global() -> Arc<Self> {
        Arc::clone(GLOBAL_COORDINATOR.get_or_init(|| Arc::new(Self::new())))
    }

    fn lock(&self) -> MutexGuard<'_, SharedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Picks the registration path from one consistent snapshot.
    ///
    /// The fast path requires both a live pool and at least one cached
    /// entry. A pool that discovered nothing sends callers down the cold
    /// path again.
    #[must_use]
    pub fn registration_path(&self) -> RegistrationPath {
        let state = self.lock();
        match &state.pool {
            Some(pool) if !state.cache.is_empty() => RegistrationPath::Fast {
                pool: Arc::clone(pool),
                entries: state.cache.entries().to_vec(),
            },
            _ => RegistrationPath::Cold,
        }
    }

    /// Makes `pool` and `cache` the active shared state.
    ///
    /// A different pool that was active before is retired, so stopping its
    /// service later cannot close connections the new pool relies on.
    pub fn publish(&self, pool: Arc<ConnectionPool>, cache: DescriptorCache) {
        let mut state = self.lock();
        if let Some(previous) = &state.pool
            && !Arc::ptr_eq(previous, &pool)
        {
            warn!(
                replaced_tools = state.cache.len(),
                "replacing a connection pool published by another service"
            );
            previous.retire();
        }
        debug!(tools = cache.len(), "publishing connection pool");
        state.pool = Some(pool);
        state.cache = cache;
    }

    /// Clears the shared state when `pool` is the active pool.
    ///
    /// Returns whether anything was cleared. A pool that was already
    /// replaced leaves the newer state untouched.
    pub fn teardown(&self, pool: &Arc<ConnectionPool>) -> bool {
        let mut state = self.lock();
        let owned = state
            .pool
            .as_ref()
            .is_some_and(|active| Arc::ptr_eq(active, pool));
        if owned {
            state.pool = None;
            state.cache.clear();
        }
        owned
    }

    /// Returns the active pool, if any.
    #[must_use]
    pub fn active_pool(&self) -> Option<Arc<ConnectionPool>> {
        self.lock().pool.clone()
    }

    /// Returns a copy of the cached entries in discovery order.
    #[must_use]
    pub fn cached_entries(&self) -> Vec<RegisteredToolEntry> {
        self.lock().cache.entries().to_vec()
    }

    /// Returns whether a pool is currently published.
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.lock().pool.is_some()
    }
}
