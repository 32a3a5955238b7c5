// SPDX-License-Identifier: Apache-2.0

use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::{Error, Result};

pub const RECORD_ID_MAX_LEN: usize = 128;
pub const FIELD_NAME_MAX_LEN: usize = 64;

/// Opaque record identity, unique within one record set.
///
/// Record sources hand out both numeric and string identifiers; both
/// deserialize into the same textual form.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(into = "String")]
pub struct RecordId(String);

/// Name of a declared field in a screen's field registry.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FieldName(String);

impl RecordId {
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        if value.is_empty() {
            return Err(invalid("record_id", &value, "must not be empty"));
        }
        if value.trim() != value {
            return Err(invalid(
                "record_id",
                &value,
                "must not contain leading/trailing whitespace",
            ));
        }
        if value.len() > RECORD_ID_MAX_LEN {
            return Err(invalid(
                "record_id",
                &value,
                "must be at most 128 characters",
            ));
        }
        Ok(Self(value))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FieldName {
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        if value.is_empty() {
            return Err(invalid("field_name", &value, "must not be empty"));
        }
        if value.len() > FIELD_NAME_MAX_LEN {
            return Err(invalid(
                "field_name",
                &value,
                "must be at most 64 characters",
            ));
        }
        if !value.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(invalid(
                "field_name",
                &value,
                "must contain only [A-Za-z0-9_]",
            ));
        }
        Ok(Self(value))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn invalid(kind: &'static str, value: &str, reason: &'static str) -> Error {
    Error::InvalidIdentifier {
        kind,
        value: value.to_owned(),
        reason,
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawRecordId {
    Text(String),
    Signed(i64),
    Unsigned(u64),
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = match RawRecordId::deserialize(deserializer)? {
            RawRecordId::Text(s) => s,
            RawRecordId::Signed(n) => n.to_string(),
            RawRecordId::Unsigned(n) => n.to_string(),
        };
        Self::new(text).map_err(serde::de::Error::custom)
    }
}

impl Borrow<str> for FieldName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

macro_rules! impl_id_traits {
    ($name:ident) => {
        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = Error;

            fn try_from(value: String) -> Result<Self> {
                Self::new(value)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = Error;

            fn try_from(value: &str) -> Result<Self> {
                Self::new(value)
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                Self::new(s)
            }
        }
    };
}

impl_id_traits!(RecordId);
impl_id_traits!(FieldName);

#[cfg(test)]
mod tests {
    use super::{FieldName, RecordId};

    #[test]
    fn record_id_accepts_numbers_and_strings() {
        let from_number: RecordId = serde_json::from_str("17").expect("numeric id");
        let from_text: RecordId = serde_json::from_str("\"CMP-17\"").expect("text id");
        assert_eq!(from_number.as_str(), "17");
        assert_eq!(from_text.as_str(), "CMP-17");
        assert!(serde_json::from_str::<RecordId>("\"\"").is_err());
        assert!(serde_json::from_str::<RecordId>("\" 7\"").is_err());
    }

    #[test]
    fn field_name_rejects_punctuation() {
        assert!(FieldName::new("startDate").is_ok());
        assert!(FieldName::new("start_date").is_ok());
        assert!(FieldName::new("start-date").is_err());
        assert!(FieldName::new("").is_err());
        assert!(FieldName::new("x".repeat(65)).is_err());
    }
}
