use crate::domain::model::{
    CleaningOperation, CleaningResult, Dataset, ExportFormat, InterpolationBoundary,
    SummaryReport,
};
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
    fn input_path(&self) -> &str;
    fn output_path(&self) -> &str;
    fn operation(&self) -> Option<CleaningOperation>;
    fn export_format(&self) -> ExportFormat;
    fn interpolation_boundary(&self) -> InterpolationBoundary;

    /// Overrides the standard download name for the chosen operation.
    fn output_name(&self) -> Option<&str> {
        None
    }
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Dataset>;
    async fn summarize(&self, data: &Dataset) -> Result<SummaryReport>;
    async fn transform(&self, data: &Dataset) -> Result<Option<CleaningResult>>;
    async fn load(&self, result: CleaningResult) -> Result<String>;
}
