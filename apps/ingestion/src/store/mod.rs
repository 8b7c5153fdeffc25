//! Seams between the worker and its two stores.
//!
//! The poller only sees these traits; production wires in `RedisSource` and
//! `PgWarehouse`, tests wire in in-memory doubles.

pub mod pg_warehouse;
pub mod redis_source;

use std::collections::HashMap;

use async_trait::async_trait;

use crate::errors::IngestError;
use crate::models::answer::AnswerRecord;
use crate::models::question::QuestionRecord;

pub use pg_warehouse::PgWarehouse;
pub use redis_source::RedisSource;

/// Read-only view of the key-value store the producer writes to.
#[async_trait]
pub trait SourceStore: Send + Sync {
    /// Keys matching a glob pattern such as `question:*`.
    async fn list_keys(&self, pattern: &str) -> Result<Vec<String>, IngestError>;

    /// All fields of a hash. Empty when the key does not exist.
    async fn fetch_fields(&self, key: &str) -> Result<HashMap<String, String>, IngestError>;
}

/// Destination relational store.
#[async_trait]
pub trait Warehouse: Send + Sync {
    /// Inserts unless the question id already exists. Returns whether a row
    /// was created.
    async fn insert_question(&self, question: &QuestionRecord) -> Result<bool, IngestError>;

    /// Correct option of an ingested question, `None` when the question has
    /// not been ingested yet.
    async fn correct_option(&self, question_id: i32) -> Result<Option<String>, IngestError>;

    /// Inserts unless the (user, question, attempt) triple already exists.
    /// Returns whether a row was created.
    async fn insert_answer(
        &self,
        answer: &AnswerRecord,
        is_correct: bool,
    ) -> Result<bool, IngestError>;
}
