//! Local filesystem file reader implementation

use anyhow::{Context, Result};
use std::path::PathBuf;
use tokio::io::{AsyncBufRead, BufReader};

/// Reads a local file with configurable buffering
pub struct LocalFileReader;

impl LocalFileReader {
    /// Open a local file and return a buffered async reader
    ///
    /// The file is streamed rather than read into memory, so import files
    /// larger than RAM are fine.
    pub async fn open(
        path: PathBuf,
        buffer_size: usize,
    ) -> Result<Box<dyn AsyncBufRead + Send + Unpin>> {
        let file = tokio::fs::File::open(&path)
            .await
            .with_context(|| format!("Failed to open file: {}", path.display()))?;
        tracing::debug!("Opened local file: {}", path.display());
        Ok(Box::new(BufReader::with_capacity(buffer_size, file)))
    }
}
