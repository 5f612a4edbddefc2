//! HTTP/HTTPS file reader implementation

use anyhow::{Context, Result};
use tokio::io::AsyncBufRead;

/// Reads a file from HTTP/HTTPS
pub struct HttpFileReader;

impl HttpFileReader {
    /// Open an HTTP/HTTPS URL and return a reader over the response body
    ///
    /// The whole response body is fetched up front; `buffer_size` is unused.
    pub async fn open(
        url: String,
        _buffer_size: usize,
    ) -> Result<Box<dyn AsyncBufRead + Send + Unpin>> {
        let client = reqwest::Client::new();

        let response = client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch URL: {url}"))?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("HTTP request failed with status {status} for URL: {url}");
        }

        let bytes = response
            .bytes()
            .await
            .with_context(|| format!("Failed to read response body from: {url}"))?;

        tracing::debug!("Fetched {} bytes from: {}", bytes.len(), url);

        Ok(Box::new(std::io::Cursor::new(bytes)))
    }
}
