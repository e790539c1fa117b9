pub mod file;
pub mod stdin;

use serde::de::DeserializeOwned;

/// Load a typed payload from `--input`, falling back to piped stdin.
///
/// Returns `None` when neither source supplied anything, so callers can
/// build the payload from individual flags instead.
pub fn read_payload<T: DeserializeOwned>(
    path: &Option<String>,
) -> Result<Option<T>, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        return Ok(Some(file::read_json(path)?));
    }
    match stdin::read_stdin()? {
        Some(data) => Ok(Some(serde_json::from_value(data)?)),
        None => Ok(None),
    }
}
