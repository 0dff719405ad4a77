pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use config::cli::LocalStorage;
pub use config::toml_config::TomlConfig;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use core::{
    etl::{EtlEngine, RunReport},
    pipeline::CleaningPipeline,
    session::CleaningSession,
};
pub use domain::model::{
    Cell, CleaningOperation, CleaningResult, Column, ColumnType, Dataset, ExportFormat,
    ExportedFile, InterpolationBoundary, SummaryReport,
};
pub use utils::error::{EtlError, Result};
