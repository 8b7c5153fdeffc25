use async_trait::async_trait;
use sqlx::PgPool;

use crate::errors::IngestError;
use crate::models::answer::AnswerRecord;
use crate::models::question::QuestionRecord;
use crate::store::Warehouse;

const INSERT_QUESTION: &str = r#"
    INSERT INTO questions
        (question_id, question_text, option_a, option_b, option_c, option_d,
         correct_option, difficulty, subject)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
    ON CONFLICT (question_id) DO NOTHING
    RETURNING question_id
"#;

const INSERT_ANSWER: &str = r#"
    INSERT INTO answers (user_id, question_id, attempt_number, answer_text, is_correct)
    VALUES ($1, $2, $3, $4, $5)
    ON CONFLICT (user_id, question_id, attempt_number) DO NOTHING
    RETURNING id
"#;

/// Warehouse backed by Postgres. Each insert runs in its own transaction,
/// which is rolled back when dropped uncommitted on error.
#[derive(Clone)]
pub struct PgWarehouse {
    pool: PgPool,
}

impl PgWarehouse {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Warehouse for PgWarehouse {
    async fn insert_question(&self, question: &QuestionRecord) -> Result<bool, IngestError> {
        let mut tx = self.pool.begin().await?;
        let inserted: Option<i32> = sqlx::query_scalar(INSERT_QUESTION)
            .bind(question.question_id)
            .bind(&question.question_text)
            .bind(&question.option_a)
            .bind(&question.option_b)
            .bind(&question.option_c)
            .bind(&question.option_d)
            .bind(&question.correct_option)
            .bind(&question.difficulty)
            .bind(&question.subject)
            .fetch_optional(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(inserted.is_some())
    }

    async fn correct_option(&self, question_id: i32) -> Result<Option<String>, IngestError> {
        // A NULL correct_option (rows written by other tools) grades every answer as wrong.
        let row: Option<Option<String>> =
            sqlx::query_scalar("SELECT correct_option FROM questions WHERE question_id = $1")
                .bind(question_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(Option::unwrap_or_default))
    }

    async fn insert_answer(
        &self,
        answer: &AnswerRecord,
        is_correct: bool,
    ) -> Result<bool, IngestError> {
        let mut tx = self.pool.begin().await?;
        let inserted: Option<i32> = sqlx::query_scalar(INSERT_ANSWER)
            .bind(&answer.key.user_id)
            .bind(answer.key.question_id)
            .bind(answer.key.attempt_number)
            .bind(&answer.answer_text)
            .bind(is_correct)
            .fetch_optional(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(inserted.is_some())
    }
}
