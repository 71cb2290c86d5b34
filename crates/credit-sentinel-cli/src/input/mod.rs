pub mod file;
pub mod stdin;

use serde::de::DeserializeOwned;
use serde_json::Value;

/// Resolve a command's structured input: an explicit `--input` file wins,
/// then piped stdin. `None` means the caller should fall back to flags.
pub fn load<T: DeserializeOwned>(path: Option<&str>) -> Result<Option<T>, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        return Ok(Some(file::read_document(path)?));
    }
    match stdin::read_stdin()? {
        Some(value) => Ok(Some(serde_json::from_value(value)?)),
        None => Ok(None),
    }
}

/// Deserialise one part of a loaded document, keeping serde's field-level
/// message (bad date, non-numeric amount) in the error.
pub fn parse_part<T: DeserializeOwned>(
    value: Value,
    what: &str,
) -> Result<T, Box<dyn std::error::Error>> {
    serde_json::from_value(value).map_err(|e| format!("Invalid {what}: {e}").into())
}
