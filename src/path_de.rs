use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{GenError, Result};

/// Deserialize with JSON-path context in error messages. Trailing characters
/// after the value are rejected.
pub fn from_str_with_path<T: DeserializeOwned>(src: &str) -> Result<T> {
    let mut de = serde_json::Deserializer::from_str(src);
    let value = serde_path_to_error::deserialize::<_, T>(&mut de).map_err(|err| {
        let path = err.path().to_string();
        let inner = err.into_inner();
        GenError::MalformedInput {
            location: format!("{path} (line {}, column {})", inner.line(), inner.column()),
            message: describe(&inner),
        }
    })?;
    de.end().map_err(|err| GenError::MalformedInput {
        location: format!("line {}, column {}", err.line(), err.column()),
        message: describe(&err),
    })?;
    Ok(value)
}

/// Parse a whole input document.
pub fn parse_document(src: &str) -> Result<Value> {
    from_str_with_path(src)
}

// serde_json's Display appends " at line L column C"; the location carries that
fn describe(err: &serde_json::Error) -> String {
    let text = err.to_string();
    match text.rfind(" at line ") {
        Some(i) if err.line() > 0 => text[..i].to_string(),
        _ => text,
    }
}
