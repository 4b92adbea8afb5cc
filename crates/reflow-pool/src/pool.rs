//! Pool coordinator and leasing protocol
//!
//! All mutable pool state (the idle registry and the total count) lives
//! behind one mutex. Two signals coordinate the parties: `available`
//! wakes exactly one blocked acquirer when a handle is returned, and
//! `demand` wakes the producer task when the idle supply runs out.
//! Establishing or closing a connection always happens outside the
//! lock.

use std::collections::VecDeque;
use std::ops::Deref;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

use reflow_core::{Connection, ConnectionFactory, EndpointConfig, PoolError, Result};

use crate::config::PoolConfig;
use crate::lifecycle::PoolState;
use crate::stats::PoolStats;
use crate::{producer, reaper};

/// An idle handle together with the moment it was returned.
pub(crate) struct IdleEntry {
    pub(crate) connection: Arc<dyn Connection>,
    pub(crate) idle_since: Instant,
}

impl IdleEntry {
    pub(crate) fn new(connection: Arc<dyn Connection>) -> Self {
        Self {
            connection,
            idle_since: Instant::now(),
        }
    }
}

/// Registry of idle handles plus the pool-wide bookkeeping.
///
/// Invariants, observable whenever the lock is held: every entry in
/// `idle` is owned by the pool and leased to nobody; `idle.len()`
/// plus the number of outstanding leases equals `total`; `total`
/// never exceeds the configured ceiling.
pub(crate) struct Registry {
    /// FIFO of idle handles, front = longest idle
    pub(crate) idle: VecDeque<IdleEntry>,
    /// Handles owned by the pool in any state
    pub(crate) total: usize,
    pub(crate) state: PoolState,
}

impl Registry {
    fn new() -> Self {
        Self {
            idle: VecDeque::new(),
            total: 0,
            state: PoolState::Uninitialized,
        }
    }

    pub(crate) fn transition(&mut self, next: PoolState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal pool state transition {:?} -> {:?}",
            self.state,
            next
        );
        self.state = next;
    }
}

/// State shared between the pool handle, leases, and background tasks.
pub(crate) struct Shared {
    pub(crate) config: PoolConfig,
    pub(crate) endpoint: EndpointConfig,
    pub(crate) factory: Arc<dyn ConnectionFactory>,
    pub(crate) registry: Mutex<Registry>,
    /// Wakes one blocked acquirer; signalled once per released handle
    pub(crate) available: Notify,
    /// Wakes the producer task to grow the pool
    pub(crate) demand: Notify,
    /// Broadcast at shutdown to stop both background tasks
    pub(crate) stop: Notify,
    /// Callers currently inside an acquire attempt
    waiting: AtomicUsize,
}

/// Outcome of one pop attempt against the idle registry.
enum Popped {
    Handle(Arc<dyn Connection>),
    Stale(Arc<dyn Connection>),
    Empty,
}

impl Shared {
    /// Wait until an idle handle can be popped, or the pool closes.
    ///
    /// The caller bounds this with a timeout; the loop itself blocks
    /// indefinitely on the availability signal.
    async fn acquire_handle(&self) -> Result<Arc<dyn Connection>> {
        loop {
            // Register interest before checking the registry so a
            // release landing in between is not lost.
            let notified = self.available.notified();

            let popped = {
                let mut registry = self.registry.lock();
                if !registry.state.is_open() {
                    return Err(PoolError::Closed);
                }
                match registry.idle.pop_front() {
                    Some(entry) => {
                        if !registry.idle.is_empty() {
                            // Notify permits coalesce; hand the surplus
                            // on so no waiter sleeps beside a non-empty
                            // registry.
                            self.available.notify_one();
                        }
                        if entry.connection.is_usable() {
                            Popped::Handle(entry.connection)
                        } else {
                            registry.total -= 1;
                            Popped::Stale(entry.connection)
                        }
                    }
                    None => Popped::Empty,
                }
            };

            match popped {
                Popped::Handle(connection) => {
                    self.demand.notify_one();
                    return Ok(connection);
                }
                Popped::Stale(connection) => {
                    tracing::debug!("discarding unusable idle connection");
                    let _ = connection.close().await;
                    self.demand.notify_one();
                }
                Popped::Empty => {
                    self.demand.notify_one();
                    notified.await;
                }
            }
        }
    }

    /// Return a handle to the registry. Never blocks; called from
    /// `Lease::drop`.
    pub(crate) fn release(&self, connection: Arc<dyn Connection>) {
        let mut registry = self.registry.lock();
        if !registry.state.is_open() || !connection.is_usable() {
            registry.total = registry.total.saturating_sub(1);
            drop(registry);
            tracing::debug!("retiring connection instead of returning it to the pool");
            Self::close_from_sync(connection);
            self.demand.notify_one();
            return;
        }
        registry.idle.push_back(IdleEntry::new(connection));
        drop(registry);
        self.available.notify_one();
        self.demand.notify_one();
    }

    /// Close a retired handle from a context that cannot await.
    ///
    /// The close runs as a task on the surrounding runtime; without a
    /// runtime the handle is abandoned and dies with its last
    /// reference.
    fn close_from_sync(connection: Arc<dyn Connection>) {
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                if let Err(e) = connection.close().await {
                    tracing::debug!(error = %e, "error closing retired connection");
                }
            });
        }
    }
}

/// A bounded pool of reusable connections.
///
/// Constructed once at the application's composition root and shared
/// by reference (or `Arc`) with consumers; there is no process-wide
/// singleton. Dropping the pool without calling [`shutdown`] aborts
/// the background tasks and abandons the remaining handles.
///
/// [`shutdown`]: ConnectionPool::shutdown
pub struct ConnectionPool {
    shared: Arc<Shared>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl ConnectionPool {
    /// Build a pool, establishing the initial stock of connections and
    /// starting the producer and reaper tasks.
    ///
    /// A failed creation during initialization is logged and skipped;
    /// the pool starts below its floor and the producer tops it up.
    /// If not a single connection can be established this returns a
    /// `Config` error and no tasks are started.
    #[tracing::instrument(skip(config, endpoint, factory), fields(endpoint = %endpoint.address()))]
    pub async fn initialize(
        config: PoolConfig,
        endpoint: EndpointConfig,
        factory: impl ConnectionFactory,
    ) -> Result<Self> {
        tracing::info!(
            initial_size = config.initial_size(),
            max_size = config.max_size(),
            "initializing connection pool"
        );

        let shared = Arc::new(Shared {
            config,
            endpoint,
            factory: Arc::new(factory),
            registry: Mutex::new(Registry::new()),
            available: Notify::new(),
            demand: Notify::new(),
            stop: Notify::new(),
            waiting: AtomicUsize::new(0),
        });
        shared.registry.lock().transition(PoolState::Initializing);

        for _ in 0..shared.config.initial_size() {
            match shared.factory.connect(&shared.endpoint).await {
                Ok(connection) => {
                    let mut registry = shared.registry.lock();
                    registry.idle.push_back(IdleEntry::new(connection));
                    registry.total += 1;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "connection failed during pool initialization");
                }
            }
        }

        {
            let mut registry = shared.registry.lock();
            if registry.total == 0 {
                registry.transition(PoolState::Closed);
                return Err(PoolError::Config(format!(
                    "none of the {} initial connections to {} could be established",
                    shared.config.initial_size(),
                    shared.endpoint.address()
                )));
            }
            if registry.total < shared.config.initial_size() {
                tracing::warn!(
                    established = registry.total,
                    requested = shared.config.initial_size(),
                    "pool initialized below its configured floor"
                );
            }
            registry.transition(PoolState::Ready);
        }

        let producer = tokio::spawn(producer::run(Arc::clone(&shared)));
        let reaper = tokio::spawn(reaper::run(Arc::clone(&shared)));

        tracing::info!("connection pool ready");
        Ok(Self {
            shared,
            tasks: Mutex::new(vec![producer, reaper]),
        })
    }

    /// Acquire a lease using the configured default timeout.
    pub async fn acquire(&self) -> Result<Lease> {
        self.acquire_within(self.shared.config.acquire_timeout())
            .await
    }

    /// Acquire a lease, waiting at most `timeout` for a handle to
    /// become available.
    ///
    /// Safe to call from arbitrarily many tasks concurrently. Returns
    /// `AcquireTimeout` when the bound elapses and `Closed` once
    /// shutdown has begun.
    pub async fn acquire_within(&self, timeout: Duration) -> Result<Lease> {
        self.shared.waiting.fetch_add(1, Ordering::SeqCst);
        let result = tokio::time::timeout(timeout, self.shared.acquire_handle()).await;
        self.shared.waiting.fetch_sub(1, Ordering::SeqCst);

        match result {
            Ok(Ok(connection)) => Ok(Lease {
                connection: Some(connection),
                shared: Arc::clone(&self.shared),
            }),
            Ok(Err(e)) => Err(e),
            Err(_) => {
                tracing::debug!(?timeout, "acquire timed out");
                Err(PoolError::AcquireTimeout(timeout))
            }
        }
    }

    /// Get a snapshot of the pool's current statistics.
    pub fn stats(&self) -> PoolStats {
        let (total, idle) = {
            let registry = self.shared.registry.lock();
            (registry.total, registry.idle.len())
        };
        let waiting = self.shared.waiting.load(Ordering::SeqCst);
        PoolStats::new(total, idle, total - idle, waiting)
    }

    /// Get the current lifecycle state.
    pub fn state(&self) -> PoolState {
        self.shared.registry.lock().state
    }

    /// Get the pool configuration.
    pub fn config(&self) -> &PoolConfig {
        &self.shared.config
    }

    /// Shut the pool down.
    ///
    /// Stops both background tasks, fails every blocked and future
    /// acquire with `Closed`, closes all idle handles, and waits up to
    /// the configured grace period for outstanding leases before
    /// closing the pool anyway. Idempotent.
    #[tracing::instrument(skip(self))]
    pub async fn shutdown(&self) -> Result<()> {
        let drained = {
            let mut registry = self.shared.registry.lock();
            match registry.state {
                PoolState::ShuttingDown | PoolState::Closed => {
                    tracing::debug!("shutdown already in progress");
                    return Ok(());
                }
                _ => {}
            }
            registry.transition(PoolState::ShuttingDown);
            let drained: Vec<IdleEntry> = registry.idle.drain(..).collect();
            registry.total -= drained.len();
            drained
        };
        tracing::info!(idle_closed = drained.len(), "pool shutting down");

        // Every blocked acquirer re-checks the state and fails fast;
        // both tasks observe the stop signal and exit.
        self.shared.available.notify_waiters();
        self.shared.demand.notify_waiters();
        self.shared.stop.notify_waiters();

        for entry in drained {
            if let Err(e) = entry.connection.close().await {
                tracing::debug!(error = %e, "error closing idle connection");
            }
        }

        let grace = self.shared.config.shutdown_grace();
        let tasks: Vec<JoinHandle<()>> = self.tasks.lock().drain(..).collect();
        for mut task in tasks {
            if tokio::time::timeout(grace, &mut task).await.is_err() {
                task.abort();
            }
        }

        // Leased handles are closed by their release path once the
        // holder lets go; outstanding leases past the grace period are
        // a usage error.
        let deadline = Instant::now() + grace;
        loop {
            let remaining = self.shared.registry.lock().total;
            if remaining == 0 {
                break;
            }
            if Instant::now() >= deadline {
                tracing::warn!(leased = remaining, "closing pool with leases still outstanding");
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        self.shared.registry.lock().transition(PoolState::Closed);
        tracing::info!("pool closed");
        Ok(())
    }
}

impl Drop for ConnectionPool {
    fn drop(&mut self) {
        for task in self.tasks.lock().drain(..) {
            task.abort();
        }
        let mut registry = self.shared.registry.lock();
        if registry.state != PoolState::Closed {
            registry.state = PoolState::Closed;
            registry.idle.clear();
        }
    }
}

/// A short-lived exclusive lease over one pooled connection.
///
/// Exactly one caller holds a given handle at a time; the pool does
/// not serialize calls made through the lease. The handle returns to
/// the pool on drop, on every exit path.
pub struct Lease {
    connection: Option<Arc<dyn Connection>>,
    shared: Arc<Shared>,
}

impl Lease {
    /// Borrow the underlying handle, e.g. to pass to driver-specific
    /// helpers.
    pub fn handle(&self) -> &Arc<dyn Connection> {
        self.connection.as_ref().expect("lease already released")
    }

    /// Release the lease explicitly. Equivalent to dropping it.
    pub fn release(self) {}
}

impl Deref for Lease {
    type Target = dyn Connection;

    fn deref(&self) -> &Self::Target {
        self.connection
            .as_ref()
            .expect("lease already released")
            .as_ref()
    }
}

impl Drop for Lease {
    fn drop(&mut self) {
        if let Some(connection) = self.connection.take() {
            self.shared.release(connection);
        }
    }
}
