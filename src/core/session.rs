use crate::core::{exporter, loader, summary, transforms};
use crate::domain::model::{
    CleaningOperation, CleaningResult, Dataset, ExportFormat, ExportedFile,
    InterpolationBoundary, SummaryReport,
};
use crate::utils::error::{EtlError, Result};

struct Upload {
    filename: String,
    original: Dataset,
}

/// One user's upload and the cleaning actions run against it.
///
/// Every cleaning action starts from the dataset as uploaded; results are
/// handed back to the caller and never fed into the next action.
#[derive(Default)]
pub struct CleaningSession {
    upload: Option<Upload>,
    boundary: InterpolationBoundary,
}

impl CleaningSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_boundary(boundary: InterpolationBoundary) -> Self {
        Self {
            upload: None,
            boundary,
        }
    }

    /// Replaces whatever was uploaded before. A file that fails to parse
    /// leaves the session empty and ready for another upload.
    pub fn upload(&mut self, bytes: &[u8], filename: &str) -> Result<SummaryReport> {
        self.upload = None;

        let original = loader::load(bytes, filename).inspect_err(|e| {
            tracing::warn!("Upload of '{}' rejected: {}", filename, e);
        })?;
        let report = summary::summarize(&original);

        tracing::info!(
            "Uploaded '{}' ({} rows, {} columns)",
            filename,
            report.rows,
            report.columns
        );

        self.upload = Some(Upload {
            filename: filename.to_string(),
            original,
        });
        Ok(report)
    }

    pub fn is_loaded(&self) -> bool {
        self.upload.is_some()
    }

    pub fn filename(&self) -> Option<&str> {
        self.upload.as_ref().map(|u| u.filename.as_str())
    }

    pub fn original(&self) -> Result<&Dataset> {
        self.upload
            .as_ref()
            .map(|u| &u.original)
            .ok_or(EtlError::NoDatasetError)
    }

    pub fn summary(&self) -> Result<SummaryReport> {
        Ok(summary::summarize(self.original()?))
    }

    pub fn clean(
        &self,
        operation: CleaningOperation,
        format: ExportFormat,
    ) -> Result<CleaningResult> {
        let original = self.original()?;
        let cleaned = transforms::apply(original, operation, self.boundary).inspect_err(|e| {
            tracing::error!("{} failed: {}", operation, e);
        })?;
        Ok(exporter::package(cleaned, operation, format, None))
    }

    /// Cleans and encodes in one step, the way a download button does.
    pub fn download(
        &self,
        operation: CleaningOperation,
        format: ExportFormat,
    ) -> Result<ExportedFile> {
        let result = self.clean(operation, format)?;
        exporter::export(&result)
    }
}

pub fn upload_message(filename: &str) -> String {
    format!("File '{}' uploaded successfully!", filename)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Cell;

    const PEOPLE: &[u8] = b"name,age\nAlice,30\nBob,\nAlice,30\n";

    #[test]
    fn test_empty_session_prompts_for_upload() {
        let session = CleaningSession::new();
        assert!(matches!(session.summary(), Err(EtlError::NoDatasetError)));
        assert!(matches!(
            session.clean(CleaningOperation::RemoveMissing, ExportFormat::Csv),
            Err(EtlError::NoDatasetError)
        ));
    }

    #[test]
    fn test_each_action_starts_from_the_original() {
        let mut session = CleaningSession::new();
        session.upload(PEOPLE, "people.csv").unwrap();

        let first = session
            .clean(CleaningOperation::RemoveMissing, ExportFormat::Csv)
            .unwrap();
        assert_eq!(first.dataset.n_rows(), 2);

        let second = session
            .clean(CleaningOperation::HandleMissing, ExportFormat::Csv)
            .unwrap();
        assert_eq!(second.dataset.n_rows(), 3);
        assert_eq!(session.original().unwrap().n_rows(), 3);
    }

    #[test]
    fn test_failed_upload_clears_and_recovers() {
        let mut session = CleaningSession::new();
        session.upload(PEOPLE, "people.csv").unwrap();

        assert!(session.upload(b"junk", "junk.xlsx").is_err());
        assert!(!session.is_loaded());

        session.upload(PEOPLE, "people.csv").unwrap();
        assert_eq!(session.filename(), Some("people.csv"));
    }

    #[test]
    fn test_download_names_follow_operation() {
        let mut session = CleaningSession::new();
        session.upload(PEOPLE, "people.csv").unwrap();

        let file = session
            .download(CleaningOperation::RemoveDuplicates, ExportFormat::Csv)
            .unwrap();
        assert_eq!(file.filename, "cleaned_duplicates_removed.csv");
        assert_eq!(file.content_type, "text/csv");
        assert_eq!(String::from_utf8(file.bytes).unwrap(), "name,age\nAlice,30\nBob,\n");
    }

    #[test]
    fn test_boundary_policy_is_applied() {
        let mut session = CleaningSession::with_boundary(InterpolationBoundary::CarryForward);
        session.upload(b"v\n1\n3\nNA\n", "v.csv").unwrap();

        let result = session
            .clean(CleaningOperation::HandleMissing, ExportFormat::Csv)
            .unwrap();
        assert_eq!(
            result.dataset.columns()[0].cells,
            vec![Cell::Number(1.0), Cell::Number(3.0), Cell::Number(3.0)]
        );
    }
}
