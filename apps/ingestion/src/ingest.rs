use tracing::{debug, error, info, warn};

use crate::errors::IngestError;
use crate::models::answer::AnswerRecord;
use crate::models::question::QuestionRecord;
use crate::store::{SourceStore, Warehouse};

/// Result of processing one source key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A new row was written.
    Inserted,
    /// The row already existed; nothing was written.
    AlreadyPresent,
    /// The key had no fields (expired or never populated).
    Skipped,
    /// The answer's question has not been ingested yet.
    Deferred,
    /// Record-level failure, logged and rolled back. Retried next scan.
    Failed,
}

/// Copies one `question:<id>` record into `questions`.
///
/// Returns `Err` only for connection-level failures.
pub async fn ingest_question<S, W>(
    source: &S,
    warehouse: &W,
    key: &str,
) -> Result<Outcome, IngestError>
where
    S: SourceStore + ?Sized,
    W: Warehouse + ?Sized,
{
    settle("question", key, try_ingest_question(source, warehouse, key).await)
}

/// Grades one `answer:<user>:<question>:<attempt>` record and copies it
/// into `answers`.
///
/// Answers whose question is not stored yet are deferred, not failed: the
/// key stays in the source store and is picked up again on a later scan.
pub async fn ingest_answer<S, W>(
    source: &S,
    warehouse: &W,
    key: &str,
) -> Result<Outcome, IngestError>
where
    S: SourceStore + ?Sized,
    W: Warehouse + ?Sized,
{
    settle("answer", key, try_ingest_answer(source, warehouse, key).await)
}

async fn try_ingest_question<S, W>(
    source: &S,
    warehouse: &W,
    key: &str,
) -> Result<Outcome, IngestError>
where
    S: SourceStore + ?Sized,
    W: Warehouse + ?Sized,
{
    let fields = source.fetch_fields(key).await?;
    if fields.is_empty() {
        debug!("Question key {key} has no fields, skipping");
        return Ok(Outcome::Skipped);
    }

    let question = QuestionRecord::from_source(key, &fields)?;
    if warehouse.insert_question(&question).await? {
        info!("Processed question {}", question.question_id);
        Ok(Outcome::Inserted)
    } else {
        debug!("Question {} already stored", question.question_id);
        Ok(Outcome::AlreadyPresent)
    }
}

async fn try_ingest_answer<S, W>(
    source: &S,
    warehouse: &W,
    key: &str,
) -> Result<Outcome, IngestError>
where
    S: SourceStore + ?Sized,
    W: Warehouse + ?Sized,
{
    let fields = source.fetch_fields(key).await?;
    if fields.is_empty() {
        debug!("Answer key {key} has no fields, skipping");
        return Ok(Outcome::Skipped);
    }

    let answer = AnswerRecord::from_source(key, &fields)?;
    let Some(correct_option) = warehouse.correct_option(answer.key.question_id).await? else {
        warn!(
            "Question {} not found for answer {key}, deferring",
            answer.key.question_id
        );
        return Ok(Outcome::Deferred);
    };

    let is_correct = answer.is_correct(&correct_option);
    if warehouse.insert_answer(&answer, is_correct).await? {
        info!(
            "Processed answer for user {}, question {}, attempt {} (correct: {is_correct})",
            answer.key.user_id, answer.key.question_id, answer.key.attempt_number
        );
        Ok(Outcome::Inserted)
    } else {
        debug!("Answer {key} already stored");
        Ok(Outcome::AlreadyPresent)
    }
}

/// Swallows record-scoped errors after logging them; fatal errors escalate.
fn settle(
    kind: &str,
    key: &str,
    result: Result<Outcome, IngestError>,
) -> Result<Outcome, IngestError> {
    match result {
        Ok(outcome) => Ok(outcome),
        Err(e) if e.is_fatal() => Err(e),
        Err(e) => {
            error!("Error processing {kind} {key}: {e}");
            Ok(Outcome::Failed)
        }
    }
}
