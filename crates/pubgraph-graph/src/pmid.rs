//! Validated PubMed identifiers.

use pubgraph_common::{PubgraphError, Result};
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

fn pmid_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[0-9]+$").expect("PMID regex is valid"))
}

/// A trimmed, all-digit PubMed identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Pmid(String);

impl Pmid {
    /// Trim surrounding whitespace and require the rest to be decimal digits.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if pmid_regex().is_match(trimmed) {
            Ok(Self(trimmed.to_string()))
        } else {
            Err(PubgraphError::InvalidPmid(trimmed.to_string()))
        }
    }

    /// Like [`Pmid::parse`] for identifiers that arrive as JSON.
    /// Anything but a JSON string is rejected regardless of content.
    pub fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::String(s) => Self::parse(s),
            other => Err(PubgraphError::RequiresString(json_type_name(other).to_string())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl FromStr for Pmid {
    type Err = PubgraphError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Pmid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Pmid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
