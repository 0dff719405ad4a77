pub mod etl;
pub mod exporter;
pub mod loader;
pub mod pipeline;
pub mod session;
pub mod summary;
pub mod transforms;

pub use crate::domain::model::{
    Cell, CleaningOperation, CleaningResult, Column, ColumnType, Dataset, ExportFormat,
    ExportedFile, InterpolationBoundary, SummaryReport,
};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
