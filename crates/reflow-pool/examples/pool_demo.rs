//! End-to-end demo with an in-memory connection factory.
//!
//! Shows the intended composition: build the pool once at the
//! application root, hand it to workers behind an `Arc`, and let
//! leases return connections on drop. Run with
//! `RUST_LOG=reflow_pool=debug` to watch the producer and reaper work.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use reflow_pool::{
    Connection, ConnectionFactory, ConnectionPool, EndpointConfig, PoolConfig, Result,
};

struct DemoConnection {
    id: usize,
    closed: AtomicBool,
}

#[async_trait]
impl Connection for DemoConnection {
    fn driver_name(&self) -> &str {
        "demo"
    }

    fn is_usable(&self) -> bool {
        !self.closed.load(Ordering::SeqCst)
    }

    async fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        tracing::info!(id = self.id, "demo connection closed");
        Ok(())
    }
}

struct DemoFactory {
    counter: AtomicUsize,
}

#[async_trait]
impl ConnectionFactory for DemoFactory {
    async fn connect(&self, endpoint: &EndpointConfig) -> Result<Arc<dyn Connection>> {
        let id = self.counter.fetch_add(1, Ordering::SeqCst);
        // Stand-in for the real handshake latency.
        tokio::time::sleep(Duration::from_millis(30)).await;
        tracing::info!(id, endpoint = %endpoint.address(), "established demo connection");
        Ok(Arc::new(DemoConnection {
            id,
            closed: AtomicBool::new(false),
        }))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,reflow_pool=debug".into()),
        )
        .init();

    let endpoint = EndpointConfig::new("localhost", 3306)
        .with_database("demo")
        .with_credentials("demo", "demo");
    let config = PoolConfig::new(2, 5)
        .with_acquire_timeout_ms(2_000)
        .with_max_idle_ms(500);

    let pool = Arc::new(
        ConnectionPool::initialize(
            config,
            endpoint,
            DemoFactory {
                counter: AtomicUsize::new(0),
            },
        )
        .await?,
    );

    let workers: Vec<_> = (0..8)
        .map(|worker| {
            let pool = Arc::clone(&pool);
            tokio::spawn(async move {
                for round in 0..4 {
                    let lease = pool.acquire().await.expect("acquire");
                    tracing::info!(worker, round, driver = lease.driver_name(), "holding lease");
                    tokio::time::sleep(Duration::from_millis(20)).await;
                }
            })
        })
        .collect();
    for worker in workers {
        worker.await?;
    }
    tracing::info!(stats = ?pool.stats(), "after burst");

    // Give the reaper time to shrink the grown pool back to its floor.
    tokio::time::sleep(Duration::from_millis(1_500)).await;
    tracing::info!(stats = ?pool.stats(), "after idle reaping");

    pool.shutdown().await?;
    Ok(())
}
