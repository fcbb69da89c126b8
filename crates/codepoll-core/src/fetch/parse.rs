//! Decode a `/codes/` response body into a CodeSet.

use super::FetchError;
use crate::model::CodeSet;

pub(crate) fn parse_code_set(body: &[u8]) -> Result<CodeSet, FetchError> {
    Ok(serde_json::from_slice(body)?)
}
