use std::collections::HashMap;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use tracing::info;

use crate::errors::IngestError;
use crate::store::SourceStore;

/// Source store backed by a single multiplexed Redis connection.
#[derive(Clone)]
pub struct RedisSource {
    conn: MultiplexedConnection,
}

impl RedisSource {
    /// Opens the connection and checks it with `PING`.
    pub async fn connect(redis_url: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(redis_url)?;
        let mut conn = client.get_multiplexed_async_connection().await?;
        redis::cmd("PING").query_async::<_, String>(&mut conn).await?;

        info!("Connected to Redis");
        Ok(Self { conn })
    }
}

#[async_trait]
impl SourceStore for RedisSource {
    async fn list_keys(&self, pattern: &str) -> Result<Vec<String>, IngestError> {
        let mut conn = self.conn.clone();
        let keys: Vec<String> = conn.keys(pattern).await?;
        Ok(keys)
    }

    async fn fetch_fields(&self, key: &str) -> Result<HashMap<String, String>, IngestError> {
        let mut conn = self.conn.clone();
        let fields: HashMap<String, String> = conn.hgetall(key).await?;
        Ok(fields)
    }
}
