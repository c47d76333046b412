//! JSON export of a complete pipeline result.
//!
//! The document is the serde representation of
//! [`ProcessResult`](palettree_pipeline::ProcessResult), so it can be read
//! back with `serde_json::from_str::<ProcessResult>`.

use palettree_pipeline::ProcessResult;

use crate::ExportError;

/// Serialize a pipeline result as pretty-printed JSON.
///
/// # Errors
///
/// Returns [`ExportError::Json`] if serialization fails (e.g. a
/// non-finite weight in a hand-built result).
pub fn to_json(result: &ProcessResult) -> Result<String, ExportError> {
    Ok(serde_json::to_string_pretty(result)?)
}
