// SPDX-License-Identifier: Apache-2.0

//! Records whose shape is only known at run time.
//!
//! A [`RecordSchema`] declares the fields a JSON record set exposes; its
//! registry reads them out of [`DynRecord`] objects. A JSON value whose type
//! disagrees with the declared kind reads as malformed rather than being
//! coerced.

use adops_core::RecordId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::registry::{FieldRegistry, RegistryError, Tabular};
use crate::value::{format_number, FieldKind, FieldRead};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DynRecord {
    pub id: RecordId,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Tabular for DynRecord {
    fn record_id(&self) -> &RecordId {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaField {
    pub name: String,
    pub kind: FieldKind,
    #[serde(default)]
    pub searchable: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSchema {
    pub fields: Vec<SchemaField>,
}

impl RecordSchema {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_field(mut self, name: &str, kind: FieldKind, searchable: bool) -> Self {
        self.fields.push(SchemaField {
            name: name.to_string(),
            kind,
            searchable,
        });
        self
    }

    /// Builds the registry. The `id` field always reads the record identity;
    /// when the schema does not declare it, it is added as plain text.
    pub fn registry(&self) -> Result<FieldRegistry<DynRecord>, RegistryError> {
        let mut builder = FieldRegistry::builder();
        if !self.fields.iter().any(|f| f.name == "id") {
            builder = builder.field("id", FieldKind::Text, |r: &DynRecord| {
                FieldRead::text(r.id.as_str())
            });
        }
        for field in &self.fields {
            if field.name == "id" {
                if !matches!(field.kind, FieldKind::Text | FieldKind::Category) {
                    return Err(RegistryError::new(
                        "id",
                        "record identity must be declared text or category",
                    ));
                }
                let kind = field.kind;
                builder = builder.field("id", kind, move |r: &DynRecord| match kind {
                    FieldKind::Category => FieldRead::category(r.id.as_str()),
                    _ => FieldRead::text(r.id.as_str()),
                });
            } else {
                let name = field.name.clone();
                let kind = field.kind;
                builder = builder.field(&field.name, kind, move |r: &DynRecord| {
                    read_json(r.fields.get(&name), kind)
                });
            }
            if field.searchable {
                builder = builder.searchable();
            }
        }
        builder.build()
    }
}

fn read_json(value: Option<&Value>, kind: FieldKind) -> FieldRead {
    let value = match value {
        None | Some(Value::Null) => return FieldRead::Missing,
        Some(value) => value,
    };
    match (kind, value) {
        (FieldKind::Text, Value::String(s)) => FieldRead::text(s.as_str()),
        (FieldKind::Category, Value::String(s)) => FieldRead::category(s.as_str()),
        // Numeric categories such as year or tier ids are common in exports.
        (FieldKind::Category, Value::Number(n)) => match n.as_f64() {
            Some(f) => FieldRead::category(format_number(f)),
            None => FieldRead::Malformed(format!("unrepresentable number {n}")),
        },
        (FieldKind::Number, Value::Number(n)) => match n.as_f64() {
            Some(f) => FieldRead::number(f),
            None => FieldRead::Malformed(format!("unrepresentable number {n}")),
        },
        (FieldKind::Date, Value::String(s)) => FieldRead::date(s),
        (FieldKind::Bool, Value::Bool(b)) => FieldRead::boolean(*b),
        (kind, other) => FieldRead::Malformed(format!(
            "expected {} but found {}",
            kind.as_str(),
            json_type(other)
        )),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::FieldValue;

    fn record(json: &str) -> DynRecord {
        serde_json::from_str(json).expect("record json")
    }

    #[test]
    fn schema_reads_declared_kinds_and_flags_mismatches() {
        let schema = RecordSchema::new()
            .with_field("name", FieldKind::Text, true)
            .with_field("budget", FieldKind::Number, false)
            .with_field("live", FieldKind::Bool, false);
        let registry = schema.registry().expect("registry");
        assert_eq!(registry.len(), 4);
        assert_eq!(registry.searchable_fields().len(), 1);

        let row = record(r#"{"id":7,"name":"Spring","budget":"lots","live":true}"#);
        let read = |field: &str| registry.get(field).map(|d| d.read(&row));
        assert_eq!(read("id"), Some(FieldRead::text("7")));
        assert_eq!(read("name"), Some(FieldRead::text("Spring")));
        assert!(read("budget").is_some_and(|r| r.is_malformed()));
        assert_eq!(read("live"), Some(FieldRead::Value(FieldValue::Bool(true))));
    }

    #[test]
    fn absent_and_null_values_read_missing() {
        let schema = RecordSchema::new().with_field("start", FieldKind::Date, false);
        let registry = schema.registry().expect("registry");
        let row = record(r#"{"id":"a","start":null}"#);
        assert_eq!(registry.get("start").map(|d| d.read(&row)), Some(FieldRead::Missing));
        let row = record(r#"{"id":"b"}"#);
        assert_eq!(registry.get("start").map(|d| d.read(&row)), Some(FieldRead::Missing));
    }

    #[test]
    fn identity_cannot_be_declared_numeric() {
        let schema = RecordSchema::new().with_field("id", FieldKind::Number, false);
        assert_eq!(schema.registry().expect_err("numeric id").field, "id");
    }
}
