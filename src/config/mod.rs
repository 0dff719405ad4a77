pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::core::{CleaningOperation, ConfigProvider, ExportFormat, InterpolationBoundary};
#[cfg(feature = "cli")]
use crate::utils::error::{EtlError, Result};
#[cfg(feature = "cli")]
use crate::utils::validation::{self, Validate, SUPPORTED_INPUT_EXTENSIONS};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "tidy-etl")]
#[command(about = "Summarize a CSV or Excel file and apply one cleaning step")]
pub struct CliConfig {
    /// CSV or Excel file to load
    pub input: String,

    /// remove-missing, handle-missing or remove-duplicates; omit for a summary only
    #[arg(long, value_parser = parse_operation)]
    pub operation: Option<CleaningOperation>,

    #[arg(long, default_value = "csv", value_parser = parse_format)]
    pub format: ExportFormat,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, help = "Override the standard output file name")]
    pub output_name: Option<String>,

    #[arg(long, help = "Repeat the last value over trailing gaps when interpolating")]
    pub fill_trailing: bool,

    #[arg(long, help = "Print the summary as JSON")]
    pub json: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log memory and timing for each stage")]
    pub monitor: bool,
}

#[cfg(feature = "cli")]
fn parse_operation(value: &str) -> std::result::Result<CleaningOperation, String> {
    validation::validate_one_of("--operation", value).map_err(|e: EtlError| e.to_string())
}

#[cfg(feature = "cli")]
fn parse_format(value: &str) -> std::result::Result<ExportFormat, String> {
    validation::validate_one_of("--format", value).map_err(|e: EtlError| e.to_string())
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn input_path(&self) -> &str {
        &self.input
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn operation(&self) -> Option<CleaningOperation> {
        self.operation
    }

    fn export_format(&self) -> ExportFormat {
        self.format
    }

    fn interpolation_boundary(&self) -> InterpolationBoundary {
        if self.fill_trailing {
            InterpolationBoundary::CarryForward
        } else {
            InterpolationBoundary::LeaveMissing
        }
    }

    fn output_name(&self) -> Option<&str> {
        self.output_name.as_deref()
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("input", &self.input)?;
        validation::validate_file_extensions(
            "input",
            std::slice::from_ref(&self.input),
            SUPPORTED_INPUT_EXTENSIONS,
        )?;
        validation::validate_path("output_path", &self.output_path)?;

        if let Some(name) = &self.output_name {
            validation::validate_non_empty_string("output_name", name)?;
            validation::validate_file_name("output_name", name)?;
            validation::validate_file_extensions(
                "output_name",
                std::slice::from_ref(name),
                &[self.format.extension()],
            )?;
        }

        Ok(())
    }
}
