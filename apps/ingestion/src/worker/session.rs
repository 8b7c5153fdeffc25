use tokio::sync::watch;
use tracing::info;

use crate::config::Config;
use crate::db::{create_pool, ensure_schema};
use crate::errors::IngestError;
use crate::store::{PgWarehouse, RedisSource};
use crate::worker::Poller;

/// One worker session: connect to both stores, make sure the tables exist,
/// then poll until something escalates or `shutdown` is set.
///
/// Connections live exactly as long as the session; the Postgres pool is
/// closed before the session returns, on error and on shutdown alike.
pub async fn run_session(
    config: &Config,
    attempt: u32,
    shutdown: watch::Receiver<bool>,
) -> Result<(), IngestError> {
    if *shutdown.borrow() {
        return Ok(());
    }

    info!(
        "Starting worker session (attempt {attempt}/{})",
        config.retry.max_attempts
    );

    info!(
        "Connecting to Redis at {}:{}...",
        config.redis_host, config.redis_port
    );
    let source = RedisSource::connect(&config.redis_url()).await?;

    let pool = create_pool(&config.database_url()).await?;
    info!("PostgreSQL warehouse ready at {}", config.database_target());

    let result = match ensure_schema(&pool).await {
        Ok(()) => {
            Poller::new(source, PgWarehouse::new(pool.clone()), config.poll)
                .run_until_shutdown(shutdown)
                .await
        }
        Err(e) => Err(e.into()),
    };

    pool.close().await;
    info!("PostgreSQL pool closed");
    result
}
