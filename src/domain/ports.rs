use crate::domain::model::{DrawInput, DrawResult, FieldMapping, Record};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn participants_file(&self) -> &str;
    fn prior_pairs_file(&self) -> Option<&str>;
    fn output_path(&self) -> &str;
    fn output_formats(&self) -> &[String];
    fn fields(&self) -> &FieldMapping;
    fn seed(&self) -> Option<u64>;
    fn max_attempts(&self) -> u32;
    fn budget_factor(&self) -> usize;
    fn timeout_seconds(&self) -> Option<u64>;
}

/// Supplies participant and prior-pair records.
#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn read_participants(&self) -> Result<Vec<Record>>;
    async fn read_prior_pairs(&self) -> Result<Vec<Record>>;
}

/// Persists assignment records, returning the locations written.
#[async_trait]
pub trait RecordSink: Send + Sync {
    async fn write_assignment(&self, result: &DrawResult) -> Result<Vec<String>>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<DrawInput>;
    async fn transform(&self, input: DrawInput) -> Result<DrawResult>;
    async fn load(&self, result: DrawResult) -> Result<Vec<String>>;
}
