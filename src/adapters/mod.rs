// Adapters layer: concrete record sources, sinks and storage backends.

pub mod csv_source;
pub mod file_sink;
pub mod storage;

pub use csv_source::CsvRecordSource;
pub use file_sink::FileRecordSink;
pub use storage::LocalStorage;
