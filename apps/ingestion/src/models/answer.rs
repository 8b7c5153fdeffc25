use std::collections::HashMap;

use serde::Deserialize;

use crate::errors::IngestError;
use crate::models::decode_fields;

pub const ANSWER_KEY_TAG: &str = "answer";
pub const ANSWER_KEY_PATTERN: &str = "answer:*";

/// Field layout of an `answer:<user>:<question>:<attempt>` hash.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AnswerFields {
    #[serde(rename = "alternativa_escolhida")]
    pub chosen_option: Option<String>,
}

/// Identity of an answer, taken from its source key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AnswerKey {
    pub user_id: String,
    pub question_id: i32,
    pub attempt_number: i32,
}

impl AnswerKey {
    /// Parses `answer:<user>:<question id>:<attempt>`; exactly four parts.
    pub fn parse(key: &str) -> Result<Self, IngestError> {
        let parts: Vec<&str> = key.split(':').collect();
        let [tag, user_id, question_id, attempt] = parts.as_slice() else {
            return Err(IngestError::malformed_key(
                key,
                format!("expected 4 ':'-separated parts, found {}", parts.len()),
            ));
        };
        if *tag != ANSWER_KEY_TAG {
            return Err(IngestError::malformed_key(key, "not an answer key"));
        }
        if user_id.is_empty() {
            return Err(IngestError::malformed_key(key, "empty user id"));
        }
        let question_id = question_id
            .parse::<i32>()
            .map_err(|_| IngestError::malformed_key(key, "question id is not an integer"))?;
        let attempt_number = attempt
            .parse::<i32>()
            .map_err(|_| IngestError::malformed_key(key, "attempt number is not an integer"))?;

        Ok(AnswerKey {
            user_id: user_id.to_string(),
            question_id,
            attempt_number,
        })
    }
}

/// A submitted answer ready to be graded and written to `answers`.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerRecord {
    pub key: AnswerKey,
    /// Submitted option letter, trimmed; empty when the producer sent none.
    pub answer_text: String,
}

impl AnswerRecord {
    pub fn from_source(key: &str, fields: &HashMap<String, String>) -> Result<Self, IngestError> {
        let answer_key = AnswerKey::parse(key)?;
        let fields: AnswerFields = decode_fields(key, fields)?;

        Ok(AnswerRecord {
            key: answer_key,
            answer_text: fields
                .chosen_option
                .map(|s| s.trim().to_string())
                .unwrap_or_default(),
        })
    }

    pub fn is_correct(&self, correct_option: &str) -> bool {
        grade(&self.answer_text, correct_option)
    }
}

/// Case-insensitive comparison of a submitted option against the correct one.
/// An empty submission is always wrong.
pub fn grade(submitted: &str, correct_option: &str) -> bool {
    let submitted = submitted.trim();
    if submitted.is_empty() {
        return false;
    }
    submitted.to_lowercase() == correct_option.trim().to_lowercase()
}
