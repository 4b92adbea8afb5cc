//! Producer task: grows the pool under demand
//!
//! Runs for the lifetime of the pool. Connection establishment is slow
//! and may fail, so it happens here rather than on the acquire path,
//! and always outside the registry lock.

use std::sync::Arc;

use crate::backoff::BackoffStrategy;
use crate::lifecycle::PoolState;
use crate::pool::{IdleEntry, Shared};

/// Whether another connection should be established right now.
///
/// The pool grows when the floor has not been reached (first start, or
/// after a partial initialization), and whenever the idle supply is
/// exhausted while below the ceiling.
fn wants_connection(total: usize, idle: usize, shared: &Shared) -> bool {
    total < shared.config.initial_size() || (idle == 0 && total < shared.config.max_size())
}

pub(crate) async fn run(shared: Arc<Shared>) {
    tracing::debug!("producer task started");
    let backoff = BackoffStrategy::default();
    let mut failures: u32 = 0;

    loop {
        // Register for demand before inspecting the registry so a
        // signal arriving in between is not lost.
        let demand = shared.demand.notified();

        let wanted = {
            let registry = shared.registry.lock();
            match registry.state {
                PoolState::ShuttingDown | PoolState::Closed => break,
                _ => wants_connection(registry.total, registry.idle.len(), &shared),
            }
        };

        if !wanted {
            tokio::select! {
                _ = demand => {}
                _ = shared.stop.notified() => break,
            }
            continue;
        }

        match shared.factory.connect(&shared.endpoint).await {
            Ok(connection) => {
                failures = 0;
                let rejected = {
                    let mut registry = shared.registry.lock();
                    if registry.state == PoolState::Ready
                        && registry.total < shared.config.max_size()
                    {
                        registry.total += 1;
                        registry.idle.push_back(IdleEntry::new(connection));
                        tracing::debug!(total = registry.total, "deposited new connection");
                        None
                    } else {
                        // The pool filled up or began closing while we
                        // were connecting.
                        Some(connection)
                    }
                };
                match rejected {
                    None => shared.available.notify_one(),
                    Some(connection) => {
                        let _ = connection.close().await;
                    }
                }
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    attempt = failures + 1,
                    "failed to establish connection, backing off"
                );
                let delay = backoff.delay_for(failures);
                failures = failures.saturating_add(1);
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = shared.stop.notified() => break,
                }
            }
        }
    }
    tracing::debug!("producer task stopped");
}
