pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod qif;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::{cli::LocalStorage, CliConfig};

pub use crate::config::toml_config::TomlConfig;
pub use crate::core::{etl::EtlEngine, pipeline::StatementPipeline};
pub use crate::qif::{Account, AccountType, QifDocument, QifError, Split, Transaction};
pub use crate::utils::error::{EtlError, Result};
