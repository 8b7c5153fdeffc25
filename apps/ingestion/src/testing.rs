//! In-memory stores for unit tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::Config;
use crate::errors::IngestError;
use crate::models::answer::AnswerRecord;
use crate::models::question::QuestionRecord;
use crate::store::{SourceStore, Warehouse};

#[derive(Default)]
pub struct MemorySource {
    records: Mutex<BTreeMap<String, HashMap<String, String>>>,
    latency: Option<Duration>,
    listing_down: AtomicBool,
    pub fetches: AtomicUsize,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every round-trip sleeps for `latency`.
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency: Some(latency),
            ..Self::default()
        }
    }

    pub fn put(&self, key: &str, fields: &[(&str, &str)]) {
        let fields = fields
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self.records.lock().unwrap().insert(key.to_string(), fields);
    }

    pub fn take_down(&self) {
        self.listing_down.store(true, Ordering::SeqCst);
    }

    async fn round_trip(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl SourceStore for MemorySource {
    async fn list_keys(&self, pattern: &str) -> Result<Vec<String>, IngestError> {
        self.round_trip().await;
        if self.listing_down.load(Ordering::SeqCst) {
            let refused = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
            return Err(IngestError::Source(redis::RedisError::from(refused)));
        }
        let prefix = pattern.trim_end_matches('*');
        Ok(self
            .records
            .lock()
            .unwrap()
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }

    async fn fetch_fields(&self, key: &str) -> Result<HashMap<String, String>, IngestError> {
        self.round_trip().await;
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .records
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .unwrap_or_default())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredAnswer {
    pub answer_text: String,
    pub is_correct: bool,
}

#[derive(Default)]
pub struct MemoryWarehouse {
    pub questions: Mutex<HashMap<i32, QuestionRecord>>,
    pub answers: Mutex<HashMap<(String, i32, i32), StoredAnswer>>,
    /// Number of calls made through the `Warehouse` trait.
    pub calls: AtomicUsize,
    fail_writes: Option<fn() -> IngestError>,
}

impl MemoryWarehouse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every insert fails with the error built by `make_error`.
    pub fn failing(make_error: fn() -> IngestError) -> Self {
        Self {
            fail_writes: Some(make_error),
            ..Self::default()
        }
    }

    pub fn question_count(&self) -> usize {
        self.questions.lock().unwrap().len()
    }

    pub fn answer_count(&self) -> usize {
        self.answers.lock().unwrap().len()
    }

    pub fn answer(&self, user_id: &str, question_id: i32, attempt: i32) -> Option<StoredAnswer> {
        self.answers
            .lock()
            .unwrap()
            .get(&(user_id.to_string(), question_id, attempt))
            .cloned()
    }

    fn check_write(&self) -> Result<(), IngestError> {
        match self.fail_writes {
            Some(make_error) => Err(make_error()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Warehouse for MemoryWarehouse {
    async fn insert_question(&self, question: &QuestionRecord) -> Result<bool, IngestError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.check_write()?;
        let mut questions = self.questions.lock().unwrap();
        if questions.contains_key(&question.question_id) {
            return Ok(false);
        }
        questions.insert(question.question_id, question.clone());
        Ok(true)
    }

    async fn correct_option(&self, question_id: i32) -> Result<Option<String>, IngestError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .questions
            .lock()
            .unwrap()
            .get(&question_id)
            .map(|q| q.correct_option.clone()))
    }

    async fn insert_answer(
        &self,
        answer: &AnswerRecord,
        is_correct: bool,
    ) -> Result<bool, IngestError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.check_write()?;
        let triple = (
            answer.key.user_id.clone(),
            answer.key.question_id,
            answer.key.attempt_number,
        );
        let mut answers = self.answers.lock().unwrap();
        if answers.contains_key(&triple) {
            return Ok(false);
        }
        answers.insert(
            triple,
            StoredAnswer {
                answer_text: answer.answer_text.clone(),
                is_correct,
            },
        );
        Ok(true)
    }
}

/// Producer fields of the `question:42` sample ("2+2?", correct "B").
pub const SAMPLE_QUESTION: &[(&str, &str)] = &[
    ("question_text", "2+2?"),
    ("alternativa_a", "3"),
    ("alternativa_b", "4"),
    ("alternativa_c", "5"),
    ("alternativa_d", "6"),
    ("alternativa_correta", "B"),
    ("dificuldade", "easy"),
    ("assunto", "math"),
];

/// Store settings for the `#[ignore]`d tests that need a live Postgres or
/// Redis. Reads `.env` and the environment like the worker does.
pub fn live_config() -> Config {
    Config::from_env().unwrap()
}
