#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::qif::AccountType;
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use toml_config::{
    AccountConfig, CompressionConfig, ErrorHandlingConfig, ExtractConfig, InvalidRowPolicy,
    LoadConfig, MappingConfig, PipelineConfig, SourceConfig, SourceType, TomlConfig,
};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "qif-etl")]
#[command(about = "Convert bank statement exports into QIF files")]
pub struct CliConfig {
    /// Path to a TOML pipeline configuration; flags below override it
    #[arg(short, long)]
    pub config: Option<String>,

    /// Statement CSV file, or an http(s) URL to download it from
    #[arg(short, long)]
    pub input: Option<String>,

    #[arg(long)]
    pub output_path: Option<String>,

    /// Name of the generated .qif file
    #[arg(long)]
    pub output_filename: Option<String>,

    #[arg(long)]
    pub account_name: Option<String>,

    /// QIF account type: Bank, Cash, CCard, Invst, "Oth A", "Oth L"
    #[arg(long)]
    pub account_type: Option<AccountType>,

    /// chrono format string for the date column, e.g. %d.%m.%Y
    #[arg(long)]
    pub date_format: Option<String>,

    #[arg(long)]
    pub delimiter: Option<String>,

    /// Also write a zip archive with the QIF file and a JSON summary
    #[arg(long)]
    pub compress: bool,

    /// Abort on the first row that cannot be converted
    #[arg(long)]
    pub strict: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub log_json: bool,

    /// Validate configuration and print the plan without converting
    #[arg(long)]
    pub dry_run: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// Loads the TOML file when given, otherwise starts from defaults,
    /// then applies command-line overrides.
    pub fn resolve(&self) -> Result<TomlConfig> {
        let mut config = match &self.config {
            Some(path) => TomlConfig::from_file(path)?,
            None => TomlConfig {
                pipeline: PipelineConfig {
                    name: "cli".to_string(),
                    description: None,
                },
                source: SourceConfig::default(),
                extract: ExtractConfig::default(),
                account: AccountConfig {
                    name: String::new(),
                    r#type: AccountType::default(),
                    description: String::new(),
                },
                mapping: MappingConfig::default(),
                load: LoadConfig::default(),
                error_handling: ErrorHandlingConfig::default(),
            },
        };

        if let Some(input) = &self.input {
            if input.starts_with("http://") || input.starts_with("https://") {
                config.source.r#type = SourceType::Http;
                config.source.url = Some(input.clone());
            } else {
                config.source.r#type = SourceType::File;
                config.source.path = Some(input.clone());
            }
        }
        if let Some(output_path) = &self.output_path {
            config.load.output_path = output_path.clone();
        }
        if let Some(filename) = &self.output_filename {
            config.load.filename = filename.clone();
        }
        if let Some(name) = &self.account_name {
            config.account.name = name.clone();
        }
        if let Some(account_type) = self.account_type {
            config.account.r#type = account_type;
        }
        if let Some(format) = &self.date_format {
            config.mapping.date_format = format.clone();
        }
        if let Some(delimiter) = &self.delimiter {
            config.source.delimiter = delimiter.clone();
        }
        if self.compress {
            let filename = config
                .load
                .compression
                .as_ref()
                .map(|c| c.filename.clone())
                .unwrap_or_else(|| "statement.zip".to_string());
            config.load.compression = Some(CompressionConfig {
                enabled: true,
                filename,
            });
        }
        if self.strict {
            config.error_handling.on_invalid_row = InvalidRowPolicy::Fail;
        }

        Ok(config)
    }
}
