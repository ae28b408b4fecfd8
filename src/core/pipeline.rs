use crate::adapters::http::fetch_statement;
use crate::config::toml_config::{InvalidRowPolicy, SourceType};
use crate::core::mapping::{build_transaction, group_entries, RowMapper};
use crate::core::statement::{read_rows, ReadOptions};
use crate::core::{ConfigProvider, Pipeline, StatementRow, Storage, TransformResult};
use crate::domain::model::ConversionSummary;
use crate::qif::{Account, QifDocument};
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{validate_required_field, validate_single_ascii_char};
use reqwest::Client;
use std::io::Write;
use std::path::Path;
use zip::write::{SimpleFileOptions, ZipWriter};

/// Converts one statement export into a QIF file for one account.
pub struct StatementPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    client: Client,
}

impl<S: Storage, C: ConfigProvider> StatementPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self {
            storage,
            config,
            client: Client::new(),
        }
    }

    pub fn with_client(storage: S, config: C, client: Client) -> Self {
        Self {
            storage,
            config,
            client,
        }
    }

    fn account(&self) -> Account {
        let account = self.config.account();
        Account::new()
            .name(&account.name)
            .account_type(account.r#type)
            .description(&account.description)
            .build()
    }

    fn read_options(&self) -> Result<ReadOptions> {
        let source = self.config.source();
        let delimiter = validate_single_ascii_char("source.delimiter", &source.delimiter)?;
        Ok(ReadOptions {
            delimiter: delimiter as u8,
            has_headers: source.has_headers,
            skip_rows: source.skip_rows,
            max_records: self.config.max_records(),
        })
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for StatementPipeline<S, C> {
    async fn extract(&self) -> Result<Vec<StatementRow>> {
        let source = self.config.source();

        let raw = match source.r#type {
            SourceType::File => {
                let path = validate_required_field("source.path", &source.path)?;
                tracing::info!("📄 Reading statement file: {}", path);
                self.storage.read_file(path).await?
            }
            SourceType::Http => {
                tracing::info!(
                    "🌐 Downloading statement from: {}",
                    source.url.as_deref().unwrap_or_default()
                );
                fetch_statement(&self.client, source).await?
            }
        };

        let rows = read_rows(&raw, &self.read_options()?)?;
        tracing::debug!("Parsed {} statement rows", rows.len());
        Ok(rows)
    }

    async fn transform(&self, rows: Vec<StatementRow>) -> Result<TransformResult> {
        let account = self.account();
        let mapper = RowMapper::new(self.config.mapping())?;
        let policy = self.config.error_handling().on_invalid_row;
        let rows_read = rows.len();

        let mut mapped = Vec::with_capacity(rows.len());
        let mut rejected = Vec::new();
        for row in &rows {
            match mapper.map_row(row) {
                Ok(m) => mapped.push(m),
                Err(rejection) => match policy {
                    InvalidRowPolicy::Fail => {
                        return Err(EtlError::InvalidRowError {
                            line: rejection.line,
                            reason: rejection.reason,
                        });
                    }
                    InvalidRowPolicy::Skip => {
                        tracing::warn!(
                            "⚠️ Skipping line {}: {}",
                            rejection.line,
                            rejection.reason
                        );
                        rejected.push(rejection);
                    }
                },
            }
        }

        let entries = group_entries(mapped)?;

        let mut document = QifDocument::new(&account);
        for entry in &entries {
            document.push(build_transaction(entry, &account)?)?;
        }

        let summary = ConversionSummary {
            account_name: account.get_name().to_string(),
            account_type: account.get_type().to_string(),
            rows_read,
            transactions_written: document.len(),
            split_transactions: entries.iter().filter(|e| !e.splits.is_empty()).count(),
            rows_rejected: rejected.len(),
            total_amount: document.total()?,
            first_date: entries.iter().map(|e| e.date).min(),
            last_date: entries.iter().map(|e| e.date).max(),
        };

        Ok(TransformResult {
            entries,
            rejected,
            qif_output: document.render(),
            summary,
        })
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        let output_dir = Path::new(self.config.output_path());
        let qif_name = self.config.output_filename();
        let qif_path = output_dir.join(qif_name);

        self.storage
            .write_file(&qif_path.to_string_lossy(), result.qif_output.as_bytes())
            .await?;
        tracing::debug!("QIF file written: {}", qif_path.display());

        let Some(archive_name) = self.config.archive_filename() else {
            return Ok(qif_path.to_string_lossy().into_owned());
        };

        // 建立 ZIP：QIF 檔案、摘要與被拒絕的列
        let zip_data = {
            let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
            let options = SimpleFileOptions::default();

            zip.start_file(qif_name, options)?;
            zip.write_all(result.qif_output.as_bytes())?;

            zip.start_file("summary.json", options)?;
            zip.write_all(serde_json::to_string_pretty(&result.summary)?.as_bytes())?;

            if !result.rejected.is_empty() {
                zip.start_file("rejected.json", options)?;
                zip.write_all(serde_json::to_string_pretty(&result.rejected)?.as_bytes())?;
            }

            zip.finish()?.into_inner()
        };

        let archive_path = output_dir.join(archive_name);
        tracing::debug!("Writing ZIP file ({} bytes)", zip_data.len());
        self.storage
            .write_file(&archive_path.to_string_lossy(), &zip_data)
            .await?;

        Ok(archive_path.to_string_lossy().into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::toml_config::TomlConfig;
    use crate::core::etl::EtlEngine;
    use crate::qif::QifError;
    use httpmock::prelude::*;
    use std::collections::HashMap;
    use std::io::Read;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn with_file(path: &str, data: &str) -> Self {
            let files = HashMap::from([(path.to_string(), data.as_bytes().to_vec())]);
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

    const STATEMENT: &str = "\
Date,Amount,Payee,Memo,Category,Receipt
2024-03-01,-12.50,Grocer,,Food,R1
2024-03-01,-7.50,Grocer,,Household,R1
2024-03-02,2500.00,Employer,March,Salary,
2024-03-03,oops,Broken,,,
";

    fn config(extra: &str) -> TomlConfig {
        TomlConfig::from_toml_str(&format!(
            r#"
[source]
path = "in/statement.csv"

[account]
name = "Checking"
type = "Bank"

[mapping]
date = "Date"
amount = "Amount"
payee = "Payee"
memo = "Memo"
category = "Category"
split_key = "Receipt"

[load]
output_path = "out"
filename = "checking.qif"
{}
"#,
            extra
        ))
        .unwrap()
    }

    #[tokio::test]
    async fn converts_statement_with_splits_and_skips_bad_rows() {
        let storage = MockStorage::with_file("in/statement.csv", STATEMENT);
        let pipeline = StatementPipeline::new(storage.clone(), config(""));

        let rows = pipeline.extract().await.unwrap();
        assert_eq!(rows.len(), 4);

        let result = pipeline.transform(rows).await.unwrap();
        assert_eq!(result.entries.len(), 2);
        assert_eq!(result.rejected.len(), 1);
        assert_eq!(result.rejected[0].line, 5);
        assert_eq!(result.summary.transactions_written, 2);
        assert_eq!(result.summary.split_transactions, 1);
        assert_eq!(result.summary.total_amount, 248000);

        let expected = "\
!Account
NChecking
TBank
^
!Type:Bank
D03/01/2024
PGrocer
M
L
C
T-20.00
SFood
E
$-12.50
SHousehold
E
$-7.50
^
!Type:Bank
D03/02/2024
PEmployer
MMarch
LSalary
C
T2500.00
^
";
        assert_eq!(result.qif_output, expected);

        let path = pipeline.load(result).await.unwrap();
        let expected_path = Path::new("out").join("checking.qif");
        assert_eq!(path, expected_path.to_string_lossy());
        let written = storage.get_file(&path).await.unwrap();
        assert_eq!(String::from_utf8(written).unwrap(), expected);
    }

    #[tokio::test]
    async fn strict_mode_fails_on_first_bad_row() {
        let storage = MockStorage::with_file("in/statement.csv", STATEMENT);
        let pipeline = StatementPipeline::new(
            storage,
            config("\n[error_handling]\non_invalid_row = \"fail\"\n"),
        );

        let rows = pipeline.extract().await.unwrap();
        let err = pipeline.transform(rows).await.unwrap_err();
        assert!(matches!(err, EtlError::InvalidRowError { line: 5, .. }));
    }

    #[tokio::test]
    async fn compressed_output_contains_qif_and_summary() {
        let storage = MockStorage::with_file("in/statement.csv", STATEMENT);
        let pipeline = StatementPipeline::new(
            storage.clone(),
            config("\n[load.compression]\nenabled = true\nfilename = \"march.zip\"\n"),
        );

        let rows = pipeline.extract().await.unwrap();
        let result = pipeline.transform(rows).await.unwrap();
        let path = pipeline.load(result).await.unwrap();
        assert!(path.ends_with("march.zip"));

        let zip_data = storage.get_file(&path).await.unwrap();
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(zip_data)).unwrap();
        let names: Vec<String> = archive.file_names().map(str::to_string).collect();
        assert!(names.contains(&"checking.qif".to_string()));
        assert!(names.contains(&"summary.json".to_string()));
        assert!(names.contains(&"rejected.json".to_string()));

        let mut summary = String::new();
        archive
            .by_name("summary.json")
            .unwrap()
            .read_to_string(&mut summary)
            .unwrap();
        let summary: ConversionSummary = serde_json::from_str(&summary).unwrap();
        assert_eq!(summary.rows_rejected, 1);
        assert_eq!(summary.account_type, "Bank");
    }

    #[tokio::test]
    async fn overflowing_statement_total_fails_the_run() {
        let statement = "\
Date,Amount,Payee,Memo,Category,Receipt
2024-03-01,90000000000000000.00,Big,,,
2024-03-02,90000000000000000.00,Bigger,,,
";
        let storage = MockStorage::with_file("in/statement.csv", statement);
        let pipeline = StatementPipeline::new(storage.clone(), config(""));

        let err = EtlEngine::new(pipeline).run().await.unwrap_err();
        assert!(matches!(
            err,
            EtlError::QifError(QifError::AmountOverflow { .. })
        ));
        assert!(storage.get_file("out/checking.qif").await.is_none());
    }

    #[tokio::test]
    async fn http_source_uses_the_supplied_client() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/export.csv");
            then.status(200).body(STATEMENT);
        });

        let mut config = config("");
        config.source.r#type = SourceType::Http;
        config.source.path = None;
        config.source.url = Some(server.url("/export.csv"));

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(5))
            .build()
            .unwrap();
        let storage = MockStorage::with_file("unused.csv", "");
        let pipeline = StatementPipeline::with_client(storage, config, client);

        let rows = pipeline.extract().await.unwrap();
        mock.assert();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[2].get("Payee"), Some("Employer"));
    }

    #[tokio::test]
    async fn missing_source_file_surfaces_io_error() {
        let storage = MockStorage::with_file("elsewhere.csv", STATEMENT);
        let pipeline = StatementPipeline::new(storage, config(""));

        let err = pipeline.extract().await.unwrap_err();
        assert!(matches!(err, EtlError::IoError(_)));
    }
}
