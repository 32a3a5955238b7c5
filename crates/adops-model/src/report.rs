use std::fmt;
use std::str::FromStr;

use adops_core::RecordId;
use serde::{Deserialize, Serialize};

use crate::registry::{FieldRegistry, HasFields, RegistryError, Tabular};
use crate::value::{FieldKind, FieldRead};

/// Output format a report consumer serializes the visible rows into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Excel,
    Pdf,
    Csv,
}

impl ExportFormat {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Excel => "excel",
            Self::Pdf => "pdf",
            Self::Csv => "csv",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "excel" | "xlsx" => Ok(Self::Excel),
            "pdf" => Ok(Self::Pdf),
            "csv" => Ok(Self::Csv),
            other => Err(format!("unknown export format `{other}`")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportTemplate {
    pub id: RecordId,
    pub name: String,
    pub category: String,
    pub format: ExportFormat,
    pub created_by: String,
    #[serde(default)]
    pub last_run: Option<String>,
    #[serde(default)]
    pub scheduled: bool,
}

impl Tabular for ReportTemplate {
    fn record_id(&self) -> &RecordId {
        &self.id
    }
}

impl HasFields for ReportTemplate {
    const SCREEN: &'static str = "reports";

    fn field_registry() -> Result<FieldRegistry<Self>, RegistryError> {
        FieldRegistry::builder()
            .field("id", FieldKind::Text, |r: &Self| FieldRead::text(r.id.as_str()))
            .field("name", FieldKind::Text, |r: &Self| FieldRead::text(&r.name))
            .searchable()
            .field("category", FieldKind::Category, |r: &Self| {
                FieldRead::category(&r.category)
            })
            .searchable()
            .field("format", FieldKind::Category, |r: &Self| {
                FieldRead::category(r.format.as_str())
            })
            .field("created_by", FieldKind::Text, |r: &Self| FieldRead::text(&r.created_by))
            .searchable()
            .field("last_run", FieldKind::Date, |r: &Self| {
                FieldRead::optional_date(r.last_run.as_deref())
            })
            .field("scheduled", FieldKind::Bool, |r: &Self| FieldRead::boolean(r.scheduled))
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_formats_parse_loosely_and_print_lowercase() {
        assert_eq!("Excel".parse::<ExportFormat>(), Ok(ExportFormat::Excel));
        assert_eq!(" csv ".parse::<ExportFormat>(), Ok(ExportFormat::Csv));
        assert!("docx".parse::<ExportFormat>().is_err());
        assert_eq!(ExportFormat::Pdf.to_string(), "pdf");
    }

    #[test]
    fn unscheduled_templates_without_runs_read_missing_dates() {
        let template: ReportTemplate = serde_json::from_str(
            r#"{"id":"rt-1","name":"Weekly pacing","category":"Delivery","format":"pdf","created_by":"ana"}"#,
        )
        .expect("template json");
        let registry = ReportTemplate::field_registry().expect("registry");
        let last_run = registry.get("last_run").map(|d| d.read(&template));
        assert_eq!(last_run, Some(FieldRead::Missing));
        assert!(!template.scheduled);
    }
}
