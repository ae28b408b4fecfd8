use crate::config::toml_config::SourceConfig;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::validate_required_field;
use reqwest::Client;
use std::time::Duration;

/// Downloads a statement export described by an HTTP source.
pub async fn fetch_statement(client: &Client, source: &SourceConfig) -> Result<Vec<u8>> {
    let url = validate_required_field("source.url", &source.url)?;

    let mut request = client.get(url);

    // 添加自定義標頭
    if let Some(headers) = &source.headers {
        for (key, value) in headers {
            request = request.header(key, value);
        }
    }

    if let Some(timeout) = source.timeout_seconds {
        request = request.timeout(Duration::from_secs(timeout));
    }

    tracing::debug!("Requesting statement from: {}", url);
    let response = request.send().await?;
    let status = response.status();
    tracing::debug!("Statement response status: {}", status);

    if !status.is_success() {
        return Err(EtlError::SourceUnavailable {
            url: url.clone(),
            status: status.as_u16(),
        });
    }

    let body = response.bytes().await?;
    tracing::info!("📥 Downloaded {} bytes", body.len());
    Ok(body.to_vec())
}
