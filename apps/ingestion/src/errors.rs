use thiserror::Error;

/// Worker-level error type.
///
/// Record-scoped variants are swallowed by the ingestion functions after
/// logging; only errors for which [`IngestError::is_fatal`] is true escalate
/// out of a scan cycle and end the current session.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Source store error: {0}")]
    Source(#[from] redis::RedisError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Malformed key '{key}': {reason}")]
    MalformedKey { key: String, reason: String },

    #[error("Record '{key}' is missing required field '{field}'")]
    MissingField { key: String, field: &'static str },

    #[error("Record '{key}' has unreadable fields: {reason}")]
    InvalidFields { key: String, reason: String },

    #[error("Giving up after {attempts} failed attempts")]
    RetriesExhausted { attempts: u32 },
}

impl IngestError {
    pub fn malformed_key(key: &str, reason: impl Into<String>) -> Self {
        IngestError::MalformedKey {
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    /// True when the error means a store connection is unusable, as opposed
    /// to a problem with a single record.
    pub fn is_fatal(&self) -> bool {
        match self {
            IngestError::Source(e) => {
                e.is_io_error()
                    || e.is_connection_refusal()
                    || e.is_connection_dropped()
                    || e.is_timeout()
            }
            IngestError::Database(e) => matches!(
                e,
                sqlx::Error::Io(_)
                    | sqlx::Error::Tls(_)
                    | sqlx::Error::PoolTimedOut
                    | sqlx::Error::PoolClosed
                    | sqlx::Error::WorkerCrashed
            ),
            IngestError::RetriesExhausted { .. } => true,
            IngestError::MalformedKey { .. }
            | IngestError::MissingField { .. }
            | IngestError::InvalidFields { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_errors_are_not_fatal() {
        assert!(!IngestError::malformed_key("question:x", "bad id").is_fatal());
        assert!(!IngestError::MissingField {
            key: "question:1".to_string(),
            field: "alternativa_correta",
        }
        .is_fatal());
    }

    #[test]
    fn test_connection_errors_are_fatal() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset");
        assert!(IngestError::Database(sqlx::Error::Io(io)).is_fatal());
        assert!(IngestError::Database(sqlx::Error::PoolClosed).is_fatal());

        let refused = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        assert!(IngestError::Source(redis::RedisError::from(refused)).is_fatal());
    }

    #[test]
    fn test_query_errors_stay_record_scoped() {
        assert!(!IngestError::Database(sqlx::Error::RowNotFound).is_fatal());
        let wrong_type = redis::RedisError::from((
            redis::ErrorKind::TypeError,
            "WRONGTYPE Operation against a key holding the wrong kind of value",
        ));
        assert!(!IngestError::Source(wrong_type).is_fatal());
    }

    #[test]
    fn test_error_messages_name_the_key() {
        let err = IngestError::malformed_key("answer:u1:x:1", "question id is not an integer");
        assert_eq!(
            err.to_string(),
            "Malformed key 'answer:u1:x:1': question id is not an integer"
        );
    }
}
