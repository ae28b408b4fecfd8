use crate::config::toml_config::{AccountConfig, ErrorHandlingConfig, MappingConfig, SourceConfig};
use crate::domain::model::{StatementRow, TransformResult};
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
    fn source(&self) -> &SourceConfig;
    fn account(&self) -> &AccountConfig;
    fn mapping(&self) -> &MappingConfig;
    fn error_handling(&self) -> &ErrorHandlingConfig;
    fn max_records(&self) -> Option<usize>;
    fn output_path(&self) -> &str;
    fn output_filename(&self) -> &str;
    /// Zip archive name when compression is enabled
    fn archive_filename(&self) -> Option<&str>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<StatementRow>>;
    async fn transform(&self, rows: Vec<StatementRow>) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<String>;
}
