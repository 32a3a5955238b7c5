use adops_model::ExportFormat;
use serde::Serialize;

/// The ordered rows a report consumer turns into a file. Producing the
/// bytes is the consumer's job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportBatch<R> {
    pub format: ExportFormat,
    pub screen: String,
    pub query_hash: String,
    pub records: Vec<R>,
}

impl<R> ExportBatch<R> {
    #[must_use]
    pub fn new(format: ExportFormat, screen: &str, query_hash: &str, records: Vec<R>) -> Self {
        Self {
            format,
            screen: screen.to_string(),
            query_hash: query_hash.to_string(),
            records,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// `<screen>-<first 12 hash chars>.<ext>`, stable for identical queries.
    #[must_use]
    pub fn file_name(&self) -> String {
        let ext = match self.format {
            ExportFormat::Excel => "xlsx",
            ExportFormat::Pdf => "pdf",
            ExportFormat::Csv => "csv",
        };
        let short: String = self.query_hash.chars().take(12).collect();
        format!("{}-{short}.{ext}", self.screen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_uses_screen_hash_prefix_and_extension() {
        let batch = ExportBatch::new(ExportFormat::Excel, "campaigns", "0123456789abcdef", vec![1, 2]);
        assert_eq!(batch.file_name(), "campaigns-0123456789ab.xlsx");
        assert_eq!(batch.len(), 2);
    }
}
