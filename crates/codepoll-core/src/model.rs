//! Wire model for the `/codes/` endpoint.
//!
//! The server answers with `{ "Valid": <seconds>, "Codes": [{ "Id", "Name", "Code" }] }`.
//! Ordering of `Codes` is preserved exactly as received.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::time::Duration;

/// Opaque account identifier, stable across refreshes for the same account.
///
/// The reference server sends integers; strings are accepted too and kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CodeId(String);

impl CodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Row identity in the view contract (`code-<Id>`).
    pub fn element_id(&self) -> String {
        format!("code-{}", self.0)
    }
}

impl fmt::Display for CodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<i64> for CodeId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for CodeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl<'de> Deserialize<'de> for CodeId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Int(i64),
            Uint(u64),
            Str(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Int(n) => CodeId(n.to_string()),
            RawId::Uint(n) => CodeId(n.to_string()),
            RawId::Str(s) => CodeId(s),
        })
    }
}

/// One account's current code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Code {
    #[serde(rename = "Id")]
    pub id: CodeId,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Code")]
    pub value: String,
}

/// Longest validity honoured from a payload; larger `Valid` values are capped.
pub const MAX_VALID: Duration = Duration::from_secs(24 * 60 * 60);

/// Result of one successful fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeSet {
    /// Seconds until the codes rotate. May be fractional.
    #[serde(rename = "Valid")]
    pub valid: f64,
    #[serde(rename = "Codes")]
    pub codes: Vec<Code>,
}

impl CodeSet {
    /// `Valid` as a duration; negative or NaN values clamp to zero and
    /// anything above `MAX_VALID` (infinity included) to `MAX_VALID`.
    pub fn valid_for(&self) -> Duration {
        if self.valid.is_nan() || self.valid <= 0.0 {
            return Duration::ZERO;
        }
        Duration::try_from_secs_f64(self.valid)
            .map_or(MAX_VALID, |d| d.min(MAX_VALID))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_reference_payload() {
        let body = r#"{"Codes":[{"Name":"GitHub","Code":"123456","Id":1}],"Valid":17.25}"#;
        let set: CodeSet = serde_json::from_str(body).unwrap();
        assert_eq!(set.codes.len(), 1);
        assert_eq!(set.codes[0].id, CodeId::from(1));
        assert_eq!(set.codes[0].name, "GitHub");
        assert_eq!(set.codes[0].value, "123456");
        assert_eq!(set.valid_for(), Duration::from_millis(17_250));
    }

    #[test]
    fn string_ids_are_kept_verbatim() {
        let body = r#"{"Valid":30,"Codes":[{"Id":"acct-7","Name":"Mail","Code":"000111"}]}"#;
        let set: CodeSet = serde_json::from_str(body).unwrap();
        assert_eq!(set.codes[0].id.as_str(), "acct-7");
        assert_eq!(set.codes[0].id.element_id(), "code-acct-7");
    }

    #[test]
    fn preserves_server_order() {
        let body = r#"{"Valid":30,"Codes":[
            {"Id":3,"Name":"zeta","Code":"1"},
            {"Id":1,"Name":"alpha","Code":"2"},
            {"Id":2,"Name":"mid","Code":"3"}]}"#;
        let set: CodeSet = serde_json::from_str(body).unwrap();
        let names: Vec<_> = set.codes.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn negative_valid_clamps_to_zero() {
        let set = CodeSet {
            valid: -3.0,
            codes: Vec::new(),
        };
        assert_eq!(set.valid_for(), Duration::ZERO);
    }

    #[test]
    fn huge_valid_is_capped() {
        for valid in [1e19, 1e20, f64::INFINITY] {
            let set = CodeSet {
                valid,
                codes: Vec::new(),
            };
            assert_eq!(set.valid_for(), MAX_VALID);
        }
        let set: CodeSet = serde_json::from_str(r#"{"Valid":1e20,"Codes":[]}"#).unwrap();
        assert_eq!(set.valid_for(), MAX_VALID);
    }

    #[test]
    fn missing_codes_is_an_error() {
        assert!(serde_json::from_str::<CodeSet>(r#"{"Valid":30}"#).is_err());
    }

    #[test]
    fn element_id_matches_view_contract() {
        assert_eq!(CodeId::from(1).element_id(), "code-1");
    }
}
