use std::collections::HashMap;

use serde::Deserialize;

use crate::errors::IngestError;
use crate::models::decode_fields;

pub const QUESTION_KEY_TAG: &str = "question";
pub const QUESTION_KEY_PATTERN: &str = "question:*";

/// Field layout of a `question:<id>` hash as written by the quiz producer.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct QuestionFields {
    #[serde(rename = "question_text")]
    pub question_text: Option<String>,
    #[serde(rename = "alternativa_a")]
    pub option_a: Option<String>,
    #[serde(rename = "alternativa_b")]
    pub option_b: Option<String>,
    #[serde(rename = "alternativa_c")]
    pub option_c: Option<String>,
    #[serde(rename = "alternativa_d")]
    pub option_d: Option<String>,
    #[serde(rename = "alternativa_correta")]
    pub correct_option: Option<String>,
    #[serde(rename = "dificuldade")]
    pub difficulty: Option<String>,
    #[serde(rename = "assunto")]
    pub subject: Option<String>,
}

/// A question ready to be written to the `questions` table.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionRecord {
    pub question_id: i32,
    pub question_text: Option<String>,
    pub option_a: Option<String>,
    pub option_b: Option<String>,
    pub option_c: Option<String>,
    pub option_d: Option<String>,
    pub correct_option: String,
    pub difficulty: Option<String>,
    pub subject: Option<String>,
}

impl QuestionRecord {
    /// Builds a record from a source key and its (non-empty) field map.
    ///
    /// The correct option is the only required field: without it no answer
    /// to this question could ever be graded.
    pub fn from_source(key: &str, fields: &HashMap<String, String>) -> Result<Self, IngestError> {
        let question_id = parse_question_key(key)?;
        let fields: QuestionFields = decode_fields(key, fields)?;

        let correct_option = fields
            .correct_option
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| IngestError::MissingField {
                key: key.to_string(),
                field: "alternativa_correta",
            })?;

        Ok(QuestionRecord {
            question_id,
            question_text: fields.question_text,
            option_a: fields.option_a,
            option_b: fields.option_b,
            option_c: fields.option_c,
            option_d: fields.option_d,
            correct_option,
            difficulty: fields.difficulty,
            subject: fields.subject,
        })
    }
}

/// Parses `question:<integer id>`.
pub fn parse_question_key(key: &str) -> Result<i32, IngestError> {
    let mut parts = key.split(':');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(QUESTION_KEY_TAG), Some(id), None) => id
            .parse::<i32>()
            .map_err(|_| IngestError::malformed_key(key, "question id is not an integer")),
        _ => Err(IngestError::malformed_key(
            key,
            "expected format question:<id>",
        )),
    }
}
