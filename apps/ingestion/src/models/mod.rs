pub mod answer;
pub mod question;

use std::collections::HashMap;

use serde::de::DeserializeOwned;

use crate::errors::IngestError;

/// Decodes a source hash into its typed field set. The serde `rename`
/// attributes on the target struct are the field-name contract with the
/// upstream producer; unknown fields are ignored.
pub(crate) fn decode_fields<T: DeserializeOwned>(
    key: &str,
    fields: &HashMap<String, String>,
) -> Result<T, IngestError> {
    let invalid = |e: serde_json::Error| IngestError::InvalidFields {
        key: key.to_string(),
        reason: e.to_string(),
    };
    let value = serde_json::to_value(fields).map_err(invalid)?;
    serde_json::from_value(value).map_err(invalid)
}
