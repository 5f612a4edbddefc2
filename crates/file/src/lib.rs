//! File source abstraction for reading import files from the local
//! filesystem or HTTP/HTTPS.
//!
//! # Source Types
//!
//! - **Local**: plain paths, or `file:` URLs (`file:/persons.csv`,
//!   `file:///persons.csv`) resolved against an optional import directory
//! - **HTTP/HTTPS**: single URLs
//!
//! # Example
//!
//! ```ignore
//! use graph_import_file::FileSource;
//!
//! let source = FileSource::parse("file:/persons.csv", Some(Path::new("/var/import")))?;
//! let reader = source.open().await?;
//! ```

mod http;
mod local;

use anyhow::{bail, Result};
use std::path::{Component, Path, PathBuf};
use tokio::io::AsyncBufRead;

pub use http::HttpFileReader;
pub use local::LocalFileReader;

/// Default buffer size for reading operations (1MB)
pub const DEFAULT_BUFFER_SIZE: usize = 1024 * 1024;

/// A single file location
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSource {
    /// Local filesystem path
    Local(PathBuf),
    /// HTTP/HTTPS URL
    Http(String),
}

impl FileSource {
    /// Parse a file name into a FileSource, auto-detecting the source type
    ///
    /// - `http://` or `https://` -> Http
    /// - `file:` URLs -> Local, joined onto `import_dir` when given
    /// - Everything else -> Local; relative paths are joined onto `import_dir`
    ///
    /// With an import directory, `file:` URLs may not climb out of it with `..`.
    pub fn parse(name: &str, import_dir: Option<&Path>) -> Result<Self> {
        if name.starts_with("http://") || name.starts_with("https://") {
            return Ok(FileSource::Http(name.to_string()));
        }

        if let Some(rest) = name.strip_prefix("file:") {
            let path = file_url_path(rest);
            return match import_dir {
                Some(dir) => {
                    let relative = path.trim_start_matches('/');
                    if Path::new(relative)
                        .components()
                        .any(|c| matches!(c, Component::ParentDir))
                    {
                        bail!("File URL '{name}' escapes the import directory");
                    }
                    Ok(FileSource::Local(dir.join(relative)))
                }
                None => Ok(FileSource::Local(PathBuf::from(path))),
            };
        }

        let path = PathBuf::from(name);
        match import_dir {
            Some(dir) if path.is_relative() => Ok(FileSource::Local(dir.join(path))),
            _ => Ok(FileSource::Local(path)),
        }
    }

    /// Open this source and return a buffered async reader
    pub async fn open(&self) -> Result<Box<dyn AsyncBufRead + Send + Unpin>> {
        self.open_with_buffer(DEFAULT_BUFFER_SIZE).await
    }

    /// Open this source with an explicit read buffer size
    pub async fn open_with_buffer(
        &self,
        buffer_size: usize,
    ) -> Result<Box<dyn AsyncBufRead + Send + Unpin>> {
        match self {
            FileSource::Local(path) => LocalFileReader::open(path.clone(), buffer_size).await,
            FileSource::Http(url) => HttpFileReader::open(url.clone(), buffer_size).await,
        }
    }

    /// Get a display name for logging
    pub fn display_name(&self) -> String {
        match self {
            FileSource::Local(path) => path.display().to_string(),
            FileSource::Http(url) => url.clone(),
        }
    }
}

/// Path part of a `file:` URL with the scheme already removed.
///
/// `//host/path` and `///path` forms drop the authority; `/path` and
/// `path` are returned unchanged.
fn file_url_path(rest: &str) -> &str {
    match rest.strip_prefix("//") {
        Some(after_authority) => match after_authority.find('/') {
            Some(slash) => &after_authority[slash..],
            None => after_authority,
        },
        None => rest,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_local_file() {
        let source = FileSource::parse("/data/file.csv", None).unwrap();
        assert_eq!(source, FileSource::Local(PathBuf::from("/data/file.csv")));
    }

    #[test]
    fn test_parse_relative_with_import_dir() {
        let source = FileSource::parse("nodes/persons.csv", Some(Path::new("/import"))).unwrap();
        assert_eq!(
            source,
            FileSource::Local(PathBuf::from("/import/nodes/persons.csv"))
        );
    }

    #[test]
    fn test_parse_absolute_ignores_import_dir() {
        let source = FileSource::parse("/data/file.csv", Some(Path::new("/import"))).unwrap();
        assert_eq!(source, FileSource::Local(PathBuf::from("/data/file.csv")));
    }

    #[test]
    fn test_parse_file_url_with_import_dir() {
        let dir = Path::new("/import");
        for name in ["file:/id.csv", "file:///id.csv", "file:id.csv", "file://localhost/id.csv"] {
            let source = FileSource::parse(name, Some(dir)).unwrap();
            assert_eq!(
                source,
                FileSource::Local(PathBuf::from("/import/id.csv")),
                "{name}"
            );
        }
    }

    #[test]
    fn test_parse_file_url_without_import_dir() {
        let source = FileSource::parse("file:///tmp/id.csv", None).unwrap();
        assert_eq!(source, FileSource::Local(PathBuf::from("/tmp/id.csv")));
    }

    #[test]
    fn test_parse_file_url_rejects_parent_dir() {
        let result = FileSource::parse("file:/../etc/passwd", Some(Path::new("/import")));
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_http_url() {
        let source = FileSource::parse("https://example.com/data.csv", None).unwrap();
        assert_eq!(
            source,
            FileSource::Http("https://example.com/data.csv".to_string())
        );
        assert_eq!(source.display_name(), "https://example.com/data.csv");
    }
}
