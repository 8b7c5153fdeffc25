use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Opens the worker's Postgres handle.
///
/// The pool is capped at a single connection: every write in a session goes
/// through the same long-lived connection, one record at a time.
pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(database_url)
        .await?;

    info!("PostgreSQL connection established");
    Ok(pool)
}

const CREATE_QUESTIONS: &str = r#"
    CREATE TABLE IF NOT EXISTS questions (
        id SERIAL PRIMARY KEY,
        question_id INTEGER UNIQUE,
        question_text TEXT,
        option_a TEXT,
        option_b TEXT,
        option_c TEXT,
        option_d TEXT,
        correct_option CHAR(1),
        difficulty TEXT,
        subject TEXT,
        created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
    )
"#;

const CREATE_ANSWERS: &str = r#"
    CREATE TABLE IF NOT EXISTS answers (
        id SERIAL PRIMARY KEY,
        user_id TEXT,
        question_id INTEGER,
        attempt_number INTEGER,
        answer_text CHAR(1),
        is_correct BOOLEAN,
        created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
        UNIQUE(user_id, question_id, attempt_number)
    )
"#;

/// Creates the `questions` and `answers` tables when missing. Safe to run on
/// every startup.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;
    sqlx::query(CREATE_QUESTIONS).execute(&mut *tx).await?;
    sqlx::query(CREATE_ANSWERS).execute(&mut *tx).await?;
    tx.commit().await?;

    info!("Database tables created/verified");
    Ok(())
}
