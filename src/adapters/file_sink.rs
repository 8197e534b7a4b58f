use crate::domain::model::{DrawResult, FieldMapping, Record};
use crate::domain::ports::{RecordSink, Storage};
use crate::utils::error::{Result, SantaError};
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

pub const DEFAULT_FILE_STEM: &str = "secret_santa_assignments";

/// Renders records as delimited text with the given column order.
pub fn render_delimited(records: &[Record], headers: &[&str], delimiter: u8) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());

    writer.write_record(headers)?;
    for record in records {
        writer.write_record(headers.iter().map(|h| record.get(h).unwrap_or_default()))?;
    }

    writer
        .into_inner()
        .map_err(|e| SantaError::IoError(e.into_error()))
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    generated_at: String,
    seed: u64,
    attempts: u32,
    pair_count: usize,
    assignments: Vec<BTreeMap<&'a str, &'a str>>,
}

pub fn render_json(result: &DrawResult, headers: &[&str]) -> Result<Vec<u8>> {
    let assignments = result
        .records
        .iter()
        .map(|record| {
            headers
                .iter()
                .map(|&h| (h, record.get(h).unwrap_or_default()))
                .collect()
        })
        .collect();

    let report = JsonReport {
        generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        seed: result.assignment.seed,
        attempts: result.attempts,
        pair_count: result.records.len(),
        assignments,
    };

    Ok(serde_json::to_vec_pretty(&report)?)
}

/// Writes one file per configured format (`csv`, `tsv`, `json`).
pub struct FileRecordSink<S: Storage> {
    storage: S,
    output_path: String,
    formats: Vec<String>,
    file_stem: String,
    fields: FieldMapping,
}

impl<S: Storage> FileRecordSink<S> {
    pub fn new(storage: S, output_path: String, formats: Vec<String>, fields: FieldMapping) -> Self {
        Self {
            storage,
            output_path,
            formats,
            file_stem: DEFAULT_FILE_STEM.to_string(),
            fields,
        }
    }

    pub fn with_file_stem(mut self, file_stem: impl Into<String>) -> Self {
        self.file_stem = file_stem.into();
        self
    }

    fn render(&self, format: &str, result: &DrawResult) -> Result<Vec<u8>> {
        let headers = self.fields.output_headers();
        match format {
            "csv" => render_delimited(&result.records, &headers, b','),
            "tsv" => render_delimited(&result.records, &headers, b'\t'),
            "json" => render_json(result, &headers),
            other => Err(SantaError::UnsupportedFormat {
                format: other.to_string(),
            }),
        }
    }
}

#[async_trait]
impl<S: Storage> RecordSink for FileRecordSink<S> {
    async fn write_assignment(&self, result: &DrawResult) -> Result<Vec<String>> {
        let mut written = Vec::with_capacity(self.formats.len());

        for format in &self.formats {
            let data = self.render(format, result)?;
            let file_name = format!("{}.{}", self.file_stem, format);

            tracing::debug!("Writing {} ({} bytes)", file_name, data.len());
            self.storage.write_file(&file_name, &data).await?;
            written.push(format!("{}/{}", self.output_path, file_name));
        }

        Ok(written)
    }
}
