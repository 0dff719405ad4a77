use crate::core::{exporter, loader, summary, transforms};
use crate::core::{CleaningResult, ConfigProvider, Dataset, Pipeline, Storage, SummaryReport};
use crate::utils::error::Result;
use std::path::Path;

pub struct CleaningPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> CleaningPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }

    pub fn config(&self) -> &C {
        &self.config
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for CleaningPipeline<S, C> {
    async fn extract(&self) -> Result<Dataset> {
        let input = self.config.input_path();
        tracing::debug!("Reading input file: {}", input);

        let bytes = self.storage.read_file(input).await?;
        tracing::debug!("Read {} bytes", bytes.len());

        // 依副檔名決定解析方式，只看檔名部分
        let filename = Path::new(input)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(input);

        loader::load(&bytes, filename)
    }

    async fn summarize(&self, data: &Dataset) -> Result<SummaryReport> {
        Ok(summary::summarize(data))
    }

    async fn transform(&self, data: &Dataset) -> Result<Option<CleaningResult>> {
        let Some(operation) = self.config.operation() else {
            tracing::debug!("No cleaning operation requested, summary only");
            return Ok(None);
        };

        let cleaned = transforms::apply(data, operation, self.config.interpolation_boundary())?;

        Ok(Some(exporter::package(
            cleaned,
            operation,
            self.config.export_format(),
            self.config.output_name(),
        )))
    }

    async fn load(&self, result: CleaningResult) -> Result<String> {
        let file = exporter::export(&result)?;
        let output_path = format!("{}/{}", self.config.output_path(), file.filename);

        tracing::debug!(
            "Writing {} ({} bytes, {}) to storage",
            file.filename,
            file.bytes.len(),
            file.content_type
        );
        self.storage.write_file(&file.filename, &file.bytes).await?;

        tracing::debug!("Cleaned file saved successfully");
        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{CleaningOperation, ExportFormat, InterpolationBoundary};
    use crate::utils::error::EtlError;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn with_file(path: &str, data: &[u8]) -> Self {
            let mut files = HashMap::new();
            files.insert(path.to_string(), data.to_vec());
            Self {
                files: Arc::new(Mutex::new(files)),
            }
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                EtlError::IoError(std::io::Error::new(
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

    struct MockConfig {
        input_path: String,
        operation: Option<CleaningOperation>,
        format: ExportFormat,
    }

    impl MockConfig {
        fn new(input_path: &str, operation: Option<CleaningOperation>) -> Self {
            Self {
                input_path: input_path.to_string(),
                operation,
                format: ExportFormat::Csv,
            }
        }
    }

    impl ConfigProvider for MockConfig {
        fn input_path(&self) -> &str {
            &self.input_path
        }

        fn output_path(&self) -> &str {
            "test_output"
        }

        fn operation(&self) -> Option<CleaningOperation> {
            self.operation
        }

        fn export_format(&self) -> ExportFormat {
            self.format
        }

        fn interpolation_boundary(&self) -> InterpolationBoundary {
            InterpolationBoundary::LeaveMissing
        }
    }

    const PEOPLE: &[u8] = b"name,age\nAlice,30\nBob,\nAlice,30\n";

    #[tokio::test]
    async fn test_extract_uses_file_name_for_dispatch() {
        let storage = MockStorage::with_file("data/people.csv", PEOPLE);
        let pipeline = CleaningPipeline::new(storage, MockConfig::new("data/people.csv", None));

        let data = pipeline.extract().await.unwrap();
        assert_eq!(data.n_rows(), 3);
        assert_eq!(data.n_cols(), 2);
    }

    #[tokio::test]
    async fn test_extract_missing_file_is_io_error() {
        let storage = MockStorage::with_file("other.csv", PEOPLE);
        let pipeline = CleaningPipeline::new(storage, MockConfig::new("people.csv", None));

        assert!(matches!(pipeline.extract().await, Err(EtlError::IoError(_))));
    }

    #[tokio::test]
    async fn test_transform_without_operation_is_summary_only() {
        let storage = MockStorage::with_file("people.csv", PEOPLE);
        let pipeline = CleaningPipeline::new(storage, MockConfig::new("people.csv", None));

        let data = pipeline.extract().await.unwrap();
        assert!(pipeline.transform(&data).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_full_run_writes_cleaned_csv() {
        let storage = MockStorage::with_file("people.csv", PEOPLE);
        let pipeline = CleaningPipeline::new(
            storage.clone(),
            MockConfig::new("people.csv", Some(CleaningOperation::RemoveMissing)),
        );

        let data = pipeline.extract().await.unwrap();
        let result = pipeline.transform(&data).await.unwrap().unwrap();
        assert_eq!(result.filename, "cleaned_missing_removed.csv");

        let path = pipeline.load(result).await.unwrap();
        assert_eq!(path, "test_output/cleaned_missing_removed.csv");

        let written = storage.get_file("cleaned_missing_removed.csv").await.unwrap();
        assert_eq!(
            String::from_utf8(written).unwrap(),
            "name,age\nAlice,30\nAlice,30\n"
        );
    }

    #[tokio::test]
    async fn test_xlsx_output_name() {
        let storage = MockStorage::with_file("people.csv", PEOPLE);
        let mut config = MockConfig::new("people.csv", Some(CleaningOperation::HandleMissing));
        config.format = ExportFormat::Xlsx;
        let pipeline = CleaningPipeline::new(storage.clone(), config);

        let data = pipeline.extract().await.unwrap();
        let result = pipeline.transform(&data).await.unwrap().unwrap();
        pipeline.load(result).await.unwrap();

        let written = storage.get_file("filled_data.xlsx").await.unwrap();
        assert_eq!(&written[..2], b"PK");
    }
}
