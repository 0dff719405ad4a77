use crate::core::{CleaningOperation, ConfigProvider, ExportFormat, InterpolationBoundary};
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{self, Validate, SUPPORTED_INPUT_EXTENSIONS};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Cleaning job described in a TOML file.
///
/// ```toml
/// [job]
/// name = "weekly-survey"
///
/// [input]
/// path = "${DATA_DIR}/survey.xlsx"
///
/// [cleaning]
/// operation = "handle-missing"
/// fill_trailing = true
///
/// [output]
/// path = "./output"
/// format = "xlsx"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub job: JobConfig,
    pub input: InputConfig,
    #[serde(default)]
    pub cleaning: CleaningConfig,
    pub output: OutputConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobConfig {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    pub path: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CleaningConfig {
    pub operation: Option<CleaningOperation>,
    pub fill_trailing: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub path: String,
    #[serde(default)]
    pub format: ExportFormat,
    pub filename: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub json_logs: Option<bool>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${DATA_DIR})；未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| EtlError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_non_empty_string("job.name", &self.job.name)?;

        validation::validate_path("input.path", &self.input.path)?;
        validation::validate_file_extensions(
            "input.path",
            std::slice::from_ref(&self.input.path),
            SUPPORTED_INPUT_EXTENSIONS,
        )?;

        validation::validate_path("output.path", &self.output.path)?;
        if let Some(filename) = &self.output.filename {
            validation::validate_non_empty_string("output.filename", filename)?;
            validation::validate_file_name("output.filename", filename)?;
            validation::validate_file_extensions(
                "output.filename",
                std::slice::from_ref(filename),
                &[self.output.format.extension()],
            )?;
        }

        Ok(())
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn json_logs(&self) -> bool {
        self.monitoring
            .as_ref()
            .and_then(|m| m.json_logs)
            .unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn input_path(&self) -> &str {
        &self.input.path
    }

    fn output_path(&self) -> &str {
        &self.output.path
    }

    fn operation(&self) -> Option<CleaningOperation> {
        self.cleaning.operation
    }

    fn export_format(&self) -> ExportFormat {
        self.output.format
    }

    fn interpolation_boundary(&self) -> InterpolationBoundary {
        if self.cleaning.fill_trailing.unwrap_or(false) {
            InterpolationBoundary::CarryForward
        } else {
            InterpolationBoundary::LeaveMissing
        }
    }

    fn output_name(&self) -> Option<&str> {
        self.output.filename.as_deref()
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_basic_toml_config() {
        let toml_content = r#"
[job]
name = "survey"
description = "Weekly survey cleanup"

[input]
path = "data/survey.xlsx"

[cleaning]
operation = "handle-missing"
fill_trailing = true

[output]
path = "./out"
format = "xlsx"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.job.name, "survey");
        assert_eq!(config.operation(), Some(CleaningOperation::HandleMissing));
        assert_eq!(config.export_format(), ExportFormat::Xlsx);
        assert_eq!(
            config.interpolation_boundary(),
            InterpolationBoundary::CarryForward
        );
        assert!(!config.monitoring_enabled());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_defaults_when_sections_are_sparse() {
        let toml_content = r#"
[job]
name = "summary-only"

[input]
path = "people.csv"

[output]
path = "./out"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.operation(), None);
        assert_eq!(config.export_format(), ExportFormat::Csv);
        assert_eq!(
            config.interpolation_boundary(),
            InterpolationBoundary::LeaveMissing
        );
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("TIDY_ETL_TEST_DATA_DIR", "/srv/data");

        let toml_content = r#"
[job]
name = "env"

[input]
path = "${TIDY_ETL_TEST_DATA_DIR}/people.csv"

[output]
path = "${TIDY_ETL_TEST_UNSET_VAR}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.input.path, "/srv/data/people.csv");
        assert_eq!(config.output.path, "${TIDY_ETL_TEST_UNSET_VAR}");

        std::env::remove_var("TIDY_ETL_TEST_DATA_DIR");
    }

    #[test]
    fn test_unknown_operation_fails_to_parse() {
        let toml_content = r#"
[job]
name = "bad"

[input]
path = "people.csv"

[cleaning]
operation = "shuffle-rows"

[output]
path = "./out"
"#;

        assert!(matches!(
            TomlConfig::from_toml_str(toml_content),
            Err(EtlError::ConfigValidationError { .. })
        ));
    }

    #[test]
    fn test_config_validation() {
        let toml_content = r#"
[job]
name = "bad-input"

[input]
path = "people.json"

[output]
path = "./out"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_output_filename_must_be_bare() {
        let toml_content = r#"
[job]
name = "escape"

[input]
path = "people.csv"

[output]
path = "./out"
filename = "../people_clean.csv"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(matches!(
            config.validate(),
            Err(EtlError::InvalidConfigValueError { ref field, .. }) if field == "output.filename"
        ));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[job]
name = "file-test"

[input]
path = "people.csv"

[cleaning]
operation = "remove-duplicates"

[output]
path = "./out"
filename = "unique.csv"

[monitoring]
enabled = true
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.job.name, "file-test");
        assert_eq!(config.output_name(), Some("unique.csv"));
        assert!(config.monitoring_enabled());
        assert!(config.validate().is_ok());
    }
}
