//! Opening an import file and reading its rows.
//!
//! Fields are split on the configured delimiter. A field that starts with
//! the quote character is quoted: it runs until a quote that is directly
//! followed by the delimiter or the end of the line, and may span lines.
//! Only that outer pair is removed; quote characters inside the field have
//! no escape form and are kept as they are.

use crate::config::ImportConfig;
use crate::error::ImportError;
use crate::header::{FileKind, Header};
use csv::StringRecord;
use graph_import_file::FileSource;
use std::io;
use std::path::Path;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::debug;

/// Where a record started, as returned by [`FieldReader::read_record`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RecordStart {
    line: u64,
    /// The record was an empty line
    blank: bool,
}

/// Splits a line-oriented stream into records.
struct FieldReader {
    source: Box<dyn AsyncBufRead + Send + Unpin>,
    delimiter: char,
    quote: char,
    line: String,
    line_number: u64,
}

impl FieldReader {
    fn new(source: Box<dyn AsyncBufRead + Send + Unpin>, config: &ImportConfig) -> Self {
        Self {
            source,
            delimiter: config.delimiter,
            quote: config.quotation_character,
            line: String::new(),
            line_number: 0,
        }
    }

    /// Read the next physical line without its terminator.
    async fn next_line(&mut self) -> io::Result<bool> {
        self.line.clear();
        if self.source.read_line(&mut self.line).await? == 0 {
            return Ok(false);
        }
        if self.line.ends_with('\n') {
            self.line.pop();
            if self.line.ends_with('\r') {
                self.line.pop();
            }
        }
        self.line_number += 1;
        Ok(true)
    }

    /// Read the next record into `record`, or `None` at end of input.
    async fn read_record(&mut self, record: &mut StringRecord) -> io::Result<Option<RecordStart>> {
        record.clear();
        if !self.next_line().await? {
            return Ok(None);
        }
        let start = RecordStart {
            line: self.line_number,
            blank: self.line.is_empty(),
        };
        let (delimiter, quote) = (self.delimiter, self.quote);

        let mut field = String::new();
        let mut quoted = false;
        let mut field_start = true;
        loop {
            let mut chars = self.line.chars().peekable();
            while let Some(c) = chars.next() {
                let at_boundary = chars.peek().map_or(true, |&next| next == delimiter);
                if quoted {
                    if c == quote && at_boundary {
                        quoted = false;
                    } else {
                        field.push(c);
                    }
                } else if c == delimiter {
                    record.push_field(&field);
                    field.clear();
                    field_start = true;
                    continue;
                } else if field_start && c == quote && chars.peek().is_some() {
                    quoted = true;
                } else {
                    field.push(c);
                }
                field_start = false;
            }

            if !quoted {
                record.push_field(&field);
                return Ok(Some(start));
            }
            field.push('\n');
            if !self.next_line().await? {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("quoted field starting on line {} is not closed", start.line),
                ));
            }
        }
    }
}

/// One open import file with its parsed header.
pub struct CsvFile {
    name: String,
    header: Header,
    fields: FieldReader,
}

impl CsvFile {
    /// Locate `file_name`, open it and parse its header.
    pub async fn open(
        file_name: &str,
        kind: FileKind,
        config: &ImportConfig,
        import_dir: Option<&Path>,
    ) -> Result<Self, ImportError> {
        let not_found = |source| ImportError::ResourceNotFound {
            file: file_name.to_string(),
            source,
        };
        let source = FileSource::parse(file_name, import_dir).map_err(not_found)?;
        debug!("Opening {file_name} from {}", source.display_name());
        let reader = source.open().await.map_err(not_found)?;
        Self::from_reader(file_name, reader, kind, config).await
    }

    /// Read the header from an already opened stream.
    pub async fn from_reader(
        file_name: &str,
        reader: Box<dyn AsyncBufRead + Send + Unpin>,
        kind: FileKind,
        config: &ImportConfig,
    ) -> Result<Self, ImportError> {
        let mut fields = FieldReader::new(reader, config);

        let mut first = StringRecord::new();
        let has_header = fields
            .read_record(&mut first)
            .await
            .map_err(|source| ImportError::Read {
                file: file_name.to_string(),
                source,
            })?;
        if has_header.is_none() {
            return Err(ImportError::InvalidHeader {
                file: file_name.to_string(),
                column: 0,
                reason: "file is empty".to_string(),
            });
        }

        let header = Header::parse(file_name, first.iter(), kind, config)?;
        debug!("Header of {file_name}: {:?}", header.columns());

        Ok(Self {
            name: file_name.to_string(),
            header,
            fields,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Read the next data row into `record` and return its line number,
    /// or `None` at end of file.
    ///
    /// An empty line is a row with one empty field. Files with more than one
    /// column skip empty lines instead.
    pub async fn next_row(&mut self, record: &mut StringRecord) -> Result<Option<u64>, ImportError> {
        loop {
            let start = self
                .fields
                .read_record(record)
                .await
                .map_err(|source| ImportError::Read {
                    file: self.name.clone(),
                    source,
                })?;
            let Some(start) = start else {
                return Ok(None);
            };
            if start.blank && self.header.len() > 1 {
                continue;
            }

            if record.len() != self.header.len() {
                return Err(ImportError::MalformedRow {
                    file: self.name.clone(),
                    row: start.line,
                    expected: self.header.len(),
                    found: record.len(),
                });
            }
            return Ok(Some(start.line));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn open(content: &'static str, config: &ImportConfig) -> Result<CsvFile, ImportError> {
        CsvFile::from_reader(
            "test.csv",
            Box::new(std::io::Cursor::new(content)),
            FileKind::Node,
            config,
        )
        .await
    }

    fn pipe_config() -> ImportConfig {
        ImportConfig {
            delimiter: '|',
            ..Default::default()
        }
    }

    async fn rows(content: &'static str, config: &ImportConfig) -> Vec<Vec<String>> {
        let mut file = open(content, config).await.unwrap();
        let mut record = StringRecord::new();
        let mut rows = Vec::new();
        while file.next_row(&mut record).await.unwrap().is_some() {
            rows.push(record.iter().map(str::to_string).collect());
        }
        rows
    }

    #[tokio::test]
    async fn test_rows_with_line_numbers() {
        let mut file = open(":ID,name\n1,John\r\n2,Jane", &ImportConfig::default())
            .await
            .unwrap();
        let mut record = StringRecord::new();

        assert_eq!(file.next_row(&mut record).await.unwrap(), Some(2));
        assert_eq!(record.get(1), Some("John"));
        assert_eq!(file.next_row(&mut record).await.unwrap(), Some(3));
        assert_eq!(record.get(1), Some("Jane"));
        assert_eq!(file.next_row(&mut record).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_quoted_field_keeps_delimiter() {
        let rows = rows(
            ":ID,name,speaks:STRING[]\n1,John,\"en,fr\"\n",
            &ImportConfig::default(),
        )
        .await;
        assert_eq!(rows, vec![vec!["1", "John", "en,fr"]]);
    }

    #[tokio::test]
    async fn test_embedded_quotes_are_kept() {
        let rows = rows(":ID|name\n1|\"John \"Johnny\" Doe\"\n2|Jane \"JJ\"\n", &pipe_config()).await;
        assert_eq!(
            rows,
            vec![
                vec!["1", "John \"Johnny\" Doe"],
                vec!["2", "Jane \"JJ\""],
            ]
        );
    }

    #[tokio::test]
    async fn test_quote_edge_cases() {
        let rows = rows(":ID|a|b\n1|\"\"|\"\n2|\"\"x\"\"|\"|\"\n", &pipe_config()).await;
        assert_eq!(
            rows,
            vec![vec!["1", "", "\""], vec!["2", "\"x\"", "|"]]
        );
    }

    #[tokio::test]
    async fn test_quoted_field_spans_lines() {
        let mut file = open(":ID,bio\n1,\"first\nsecond\"\n2,x\n", &ImportConfig::default())
            .await
            .unwrap();
        let mut record = StringRecord::new();
        assert_eq!(file.next_row(&mut record).await.unwrap(), Some(2));
        assert_eq!(record.get(1), Some("first\nsecond"));
        assert_eq!(file.next_row(&mut record).await.unwrap(), Some(4));
    }

    #[tokio::test]
    async fn test_unclosed_quote_is_a_read_error() {
        let mut file = open(":ID,bio\n1,\"open\n", &ImportConfig::default())
            .await
            .unwrap();
        let mut record = StringRecord::new();
        assert!(matches!(
            file.next_row(&mut record).await,
            Err(ImportError::Read { .. })
        ));
    }

    #[tokio::test]
    async fn test_custom_quote_and_delimiter() {
        let config = ImportConfig {
            delimiter: '|',
            array_delimiter: ':',
            quotation_character: '\'',
            ..Default::default()
        };
        let rows = rows("id:ID|:LABEL|name\n'1'|'Student:Employee'|'John'\n", &config).await;
        assert_eq!(rows, vec![vec!["1", "Student:Employee", "John"]]);
    }

    #[tokio::test]
    async fn test_blank_line_in_single_column_file() {
        let rows = rows("name\nJohn\n\nJane\n", &ImportConfig::default()).await;
        assert_eq!(rows, vec![vec!["John"], vec![""], vec!["Jane"]]);
    }

    #[tokio::test]
    async fn test_blank_lines_skipped_in_wider_files() {
        let rows = rows(":ID,name\n1,John\n\n2,Jane\n\n", &ImportConfig::default()).await;
        assert_eq!(rows, vec![vec!["1", "John"], vec!["2", "Jane"]]);
    }

    #[tokio::test]
    async fn test_field_count_mismatch() {
        let mut file = open(":ID,name\n1,John,extra\n", &ImportConfig::default())
            .await
            .unwrap();
        let mut record = StringRecord::new();
        match file.next_row(&mut record).await {
            Err(ImportError::MalformedRow {
                row,
                expected,
                found,
                ..
            }) => {
                assert_eq!(row, 2);
                assert_eq!(expected, 2);
                assert_eq!(found, 3);
            }
            other => panic!("expected MalformedRow, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_empty_file() {
        assert!(matches!(
            open("", &ImportConfig::default()).await,
            Err(ImportError::InvalidHeader { column: 0, .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_file() {
        let result = CsvFile::open(
            "file:/missing.csv",
            FileKind::Node,
            &ImportConfig::default(),
            Some(Path::new("/nonexistent-import-dir")),
        )
        .await;
        assert!(matches!(result, Err(ImportError::ResourceNotFound { .. })));
    }
}
