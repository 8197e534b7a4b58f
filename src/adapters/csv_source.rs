use crate::domain::model::Record;
use crate::domain::ports::{RecordSource, Storage};
use crate::utils::error::Result;
use async_trait::async_trait;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Parses CSV bytes with a header row into records. Values are trimmed and
/// rows with only empty cells are dropped.
pub fn parse_records(bytes: &[u8]) -> Result<Vec<Record>> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let headers = reader.headers()?.clone();
    let mut records = Vec::new();

    for row in reader.records() {
        let row = row?;
        if row.iter().all(str::is_empty) {
            continue;
        }

        let data = headers
            .iter()
            .zip(row.iter())
            .map(|(field, value)| (field.to_string(), value.to_string()))
            .collect();
        records.push(Record { data });
    }

    Ok(records)
}

/// Reads participant and prior-pair CSV files through a [`Storage`].
pub struct CsvRecordSource<S: Storage> {
    storage: S,
    participants_file: String,
    prior_pairs_file: Option<String>,
}

impl<S: Storage> CsvRecordSource<S> {
    pub fn new(storage: S, participants_file: String, prior_pairs_file: Option<String>) -> Self {
        Self {
            storage,
            participants_file,
            prior_pairs_file,
        }
    }
}

#[async_trait]
impl<S: Storage> RecordSource for CsvRecordSource<S> {
    async fn read_participants(&self) -> Result<Vec<Record>> {
        tracing::debug!("Reading participants from {}", self.participants_file);
        let bytes = self.storage.read_file(&self.participants_file).await?;
        parse_records(&bytes)
    }

    async fn read_prior_pairs(&self) -> Result<Vec<Record>> {
        let Some(path) = &self.prior_pairs_file else {
            tracing::debug!("No prior pairs file configured");
            return Ok(Vec::new());
        };

        tracing::debug!("Reading prior pairs from {}", path);
        let bytes = self.storage.read_file(path).await?;
        parse_records(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::SantaError;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone, Default)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        async fn put(&self, path: &str, data: &str) {
            self.files
                .lock()
                .await
                .insert(path.to_string(), data.as_bytes().to_vec());
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                SantaError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    #[test]
    fn test_parse_records_trims_and_skips_blank_rows() {
        let csv = "\u{FEFF}Employee_Name, Employee_EmailID\n Alice , alice@acme.com\n,\n\nBob,bob@acme.com\n";
        let records = parse_records(csv.as_bytes()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("Employee_Name"), Some("Alice"));
        assert_eq!(records[0].get("Employee_EmailID"), Some("alice@acme.com"));
        assert_eq!(records[1].get("Employee_Name"), Some("Bob"));
    }

    #[test]
    fn test_parse_records_short_row_leaves_field_absent() {
        let records = parse_records(b"Employee_Name,Employee_EmailID\nCarol\n").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("Employee_EmailID"), None);
    }

    #[test]
    fn test_parse_records_header_only() {
        let records = parse_records(b"Employee_Name,Employee_EmailID\n").unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_source_without_prior_file_returns_empty_history() {
        let storage = MockStorage::default();
        storage
            .put("staff.csv", "Employee_Name,Employee_EmailID\nA,a@acme.com\n")
            .await;

        let source = CsvRecordSource::new(storage, "staff.csv".to_string(), None);

        assert_eq!(source.read_participants().await.unwrap().len(), 1);
        assert!(source.read_prior_pairs().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_source_missing_prior_file_is_error() {
        let storage = MockStorage::default();
        let source = CsvRecordSource::new(
            storage,
            "staff.csv".to_string(),
            Some("last_year.csv".to_string()),
        );

        let err = source.read_prior_pairs().await.unwrap_err();
        assert!(matches!(err, SantaError::IoError(_)));
    }
}
