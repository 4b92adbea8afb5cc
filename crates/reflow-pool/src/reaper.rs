//! Reaper task: evicts connections idle past the threshold
//!
//! Wakes on a fixed interval equal to the idle threshold. Only the
//! front of the registry needs inspecting per step: it is the longest
//! idle entry, so once it is within bound nothing behind it can be
//! overdue. Eviction cost is proportional to the number of evictable
//! handles, not the registry size.

use std::sync::Arc;

use reflow_core::Connection;

use crate::lifecycle::PoolState;
use crate::pool::Shared;

pub(crate) async fn run(shared: Arc<Shared>) {
    tracing::debug!("reaper task started");
    let interval = shared.config.max_idle();

    loop {
        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = shared.stop.notified() => break,
        }

        let evicted: Vec<Arc<dyn Connection>> = {
            let mut registry = shared.registry.lock();
            match registry.state {
                PoolState::ShuttingDown | PoolState::Closed => break,
                _ => {}
            }
            let mut evicted = Vec::new();
            while registry.total > shared.config.initial_size() {
                let overdue = registry
                    .idle
                    .front()
                    .is_some_and(|entry| entry.idle_since.elapsed() > shared.config.max_idle());
                if !overdue {
                    break;
                }
                if let Some(entry) = registry.idle.pop_front() {
                    registry.total -= 1;
                    evicted.push(entry.connection);
                }
            }
            evicted
        };

        if evicted.is_empty() {
            continue;
        }
        tracing::debug!(count = evicted.len(), "evicting idle connections");
        for connection in evicted {
            if let Err(e) = connection.close().await {
                tracing::debug!(error = %e, "error closing evicted connection");
            }
        }
    }
    tracing::debug!("reaper task stopped");
}
