use crate::core::ConfigProvider;
use crate::qif::AccountType;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub pipeline: PipelineConfig,
    pub source: SourceConfig,
    #[serde(default)]
    pub extract: ExtractConfig,
    pub account: AccountConfig,
    pub mapping: MappingConfig,
    #[serde(default)]
    pub load: LoadConfig,
    #[serde(default)]
    pub error_handling: ErrorHandlingConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    #[default]
    File,
    Http,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default)]
    pub r#type: SourceType,
    /// Local statement file, for `type = "file"`
    pub path: Option<String>,
    /// Statement download URL, for `type = "http"`
    pub url: Option<String>,
    pub headers: Option<HashMap<String, String>>,
    pub timeout_seconds: Option<u64>,
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
    #[serde(default = "default_true")]
    pub has_headers: bool,
    /// Preamble lines some banks put above the header row
    #[serde(default)]
    pub skip_rows: usize,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            r#type: SourceType::File,
            path: None,
            url: None,
            headers: None,
            timeout_seconds: None,
            delimiter: default_delimiter(),
            has_headers: true,
            skip_rows: 0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractConfig {
    pub max_records: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountConfig {
    pub name: String,
    #[serde(default)]
    pub r#type: AccountType,
    #[serde(default)]
    pub description: String,
}

/// Column names in the statement export. Without a header row, columns
/// are addressed by 1-based position (`"1"`, `"2"`, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingConfig {
    pub date: String,
    #[serde(default = "default_date_format")]
    pub date_format: String,
    /// Signed amount column; use `debit`/`credit` for split columns instead
    pub amount: Option<String>,
    pub debit: Option<String>,
    pub credit: Option<String>,
    pub payee: Option<String>,
    pub memo: Option<String>,
    pub category: Option<String>,
    pub cleared: Option<String>,
    pub number: Option<String>,
    /// Rows sharing this column's value become one split transaction
    pub split_key: Option<String>,
    #[serde(default = "default_decimal_separator")]
    pub decimal_separator: String,
    #[serde(default)]
    pub invert_amounts: bool,
    pub default_category: Option<String>,
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            date: "Date".to_string(),
            date_format: default_date_format(),
            amount: Some("Amount".to_string()),
            debit: None,
            credit: None,
            payee: Some("Payee".to_string()),
            memo: Some("Memo".to_string()),
            category: None,
            cleared: None,
            number: None,
            split_key: None,
            decimal_separator: default_decimal_separator(),
            invert_amounts: false,
            default_category: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    #[serde(default = "default_output_path")]
    pub output_path: String,
    #[serde(default = "default_filename")]
    pub filename: String,
    pub compression: Option<CompressionConfig>,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            output_path: default_output_path(),
            filename: default_filename(),
            compression: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressionConfig {
    pub enabled: bool,
    #[serde(default = "default_archive_name")]
    pub filename: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvalidRowPolicy {
    #[default]
    Skip,
    Fail,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorHandlingConfig {
    #[serde(default)]
    pub on_invalid_row: InvalidRowPolicy,
}

fn default_delimiter() -> String {
    ",".to_string()
}

fn default_true() -> bool {
    true
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

fn default_decimal_separator() -> String {
    ".".to_string()
}

fn default_output_path() -> String {
    "./output".to_string()
}

fn default_filename() -> String {
    "statement.qif".to_string()
}

fn default_archive_name() -> String {
    "statement.zip".to_string()
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("valid env var pattern"))
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${BANK_TOKEN})，未設定的保持原樣
    fn substitute_env_vars(content: &str) -> String {
        env_var_pattern()
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn delimiter(&self) -> Result<u8> {
        let c = validation::validate_single_ascii_char("source.delimiter", &self.source.delimiter)?;
        Ok(c as u8)
    }

    pub fn decimal_separator(&self) -> Result<char> {
        validation::validate_single_ascii_char(
            "mapping.decimal_separator",
            &self.mapping.decimal_separator,
        )
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        match self.source.r#type {
            SourceType::File => {
                let path = validation::validate_required_field("source.path", &self.source.path)?;
                validation::validate_path("source.path", path)?;
                validation::validate_file_extensions(
                    "source.path",
                    std::slice::from_ref(path),
                    &["csv", "txt", "tsv"],
                )?;
            }
            SourceType::Http => {
                let url = validation::validate_required_field("source.url", &self.source.url)?;
                validation::validate_url("source.url", url)?;
            }
        }

        if let Some(timeout) = self.source.timeout_seconds {
            validation::validate_range("source.timeout_seconds", timeout, 1, 300)?;
        }
        self.delimiter()?;

        if let Some(max) = self.extract.max_records {
            validation::validate_positive_number("extract.max_records", max, 1)?;
        }

        validation::validate_non_empty_string("account.name", &self.account.name)?;

        validation::validate_non_empty_string("mapping.date", &self.mapping.date)?;
        validation::validate_date_format("mapping.date_format", &self.mapping.date_format)?;
        let separator = self.decimal_separator()?;
        if separator != '.' && separator != ',' {
            return Err(EtlError::InvalidConfigValueError {
                field: "mapping.decimal_separator".to_string(),
                value: self.mapping.decimal_separator.clone(),
                reason: "Decimal separator must be '.' or ','".to_string(),
            });
        }

        let has_amount = self.mapping.amount.is_some();
        let has_debit_credit = self.mapping.debit.is_some() || self.mapping.credit.is_some();
        if has_amount == has_debit_credit {
            return Err(EtlError::ConfigValidationError {
                field: "mapping.amount".to_string(),
                message: "Map either `amount` or `debit`/`credit` columns, not both or neither"
                    .to_string(),
            });
        }

        validation::validate_path("load.output_path", &self.load.output_path)?;
        validation::validate_non_empty_string("load.filename", &self.load.filename)?;
        if let Some(compression) = &self.load.compression {
            if compression.enabled {
                validation::validate_file_extensions(
                    "load.compression.filename",
                    std::slice::from_ref(&compression.filename),
                    &["zip"],
                )?;
            }
        }

        Ok(())
    }
}

impl ConfigProvider for TomlConfig {
    fn source(&self) -> &SourceConfig {
        &self.source
    }

    fn account(&self) -> &AccountConfig {
        &self.account
    }

    fn mapping(&self) -> &MappingConfig {
        &self.mapping
    }

    fn error_handling(&self) -> &ErrorHandlingConfig {
        &self.error_handling
    }

    fn max_records(&self) -> Option<usize> {
        self.extract.max_records
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn output_filename(&self) -> &str {
        &self.load.filename
    }

    fn archive_filename(&self) -> Option<&str> {
        self.load
            .compression
            .as_ref()
            .filter(|c| c.enabled)
            .map(|c| c.filename.as_str())
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
