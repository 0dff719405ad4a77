use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("CSV encoding error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Could not parse '{filename}': {message}")]
    ParseError { filename: String, message: String },

    #[error("No dataset loaded")]
    NoDatasetError,

    #[error("Dataset shape error: {message}")]
    ShapeError { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Configuration,
    Processing,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn parse(filename: impl Into<String>, message: impl Into<String>) -> Self {
        EtlError::ParseError {
            filename: filename.into(),
            message: message.into(),
        }
    }

    pub fn processing(message: impl Into<String>) -> Self {
        EtlError::ProcessingError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::ParseError { .. } | EtlError::NoDatasetError => ErrorCategory::Input,
            EtlError::ConfigError { .. }
            | EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            EtlError::ShapeError { .. }
            | EtlError::ProcessingError { .. }
            | EtlError::CsvError(_)
            | EtlError::ZipError(_) => ErrorCategory::Processing,
            EtlError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 尚未上傳檔案只是提示，不算失敗
            EtlError::NoDatasetError => ErrorSeverity::Low,
            EtlError::ParseError { .. } => ErrorSeverity::Medium,
            EtlError::IoError(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Input => match self {
                EtlError::NoDatasetError => "Upload a CSV or Excel file first",
                _ => "Check that the file is a valid .csv or .xlsx file and try another upload",
            },
            ErrorCategory::Configuration => "Review the command line flags or job file values",
            ErrorCategory::Processing => "Retry the operation; if it keeps failing, re-upload the file",
            ErrorCategory::System => "Check file permissions and available disk space",
        }
    }

    /// Message shown to the end user. Processing failures collapse into a
    /// generic message so internals never leak into the UI.
    pub fn user_friendly_message(&self) -> String {
        match self {
            EtlError::NoDatasetError => {
                "Please upload a CSV or Excel file to start cleaning your data.".to_string()
            }
            EtlError::ParseError { filename, message } => {
                format!("Could not read '{}': {}", filename, message)
            }
            EtlError::IoError(e) => format!("File system error: {}", e),
            EtlError::ConfigError { .. }
            | EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. } => self.to_string(),
            EtlError::ShapeError { .. }
            | EtlError::ProcessingError { .. }
            | EtlError::CsvError(_)
            | EtlError::ZipError(_) => {
                "Something went wrong while cleaning the data. No file was produced.".to_string()
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
