//! graph-import
//!
//! A tool for bulk-importing property graphs from CSV files into Neo4j.
//!
//! Node and relationship files describe their columns in the header line
//! (`personId:ID(Person)`, `:LABEL`, `:START_ID`, `since:INT`, ...). The
//! import engine lives in the `graph-import-csv` crate; this crate adds the
//! command-line surface and the choice of storage backend.
//!
//! # CLI Usage
//!
//! ```bash
//! # Import persons and their relationships into Neo4j
//! graph-import import \
//!   --nodes Person=persons.csv \
//!   --relationships KNOWS=knows.csv \
//!   --import-dir /var/lib/import \
//!   --neo4j-uri bolt://localhost:7687
//!
//! # Run a job document against the in-memory store
//! graph-import import --job job.yaml --dry-run
//! ```

use anyhow::{bail, Context};
use clap::Parser;
use graph_import_csv::{ImportConfig, NodeFile, RelationshipFile};
use neo4j_sink::Neo4jOpts;
use std::path::PathBuf;

pub mod import;

// Re-export the engine crate for convenience
pub use graph_import_csv as csv;

#[derive(Parser, Clone, Debug)]
pub struct Neo4jArgs {
    /// Neo4j Bolt URI
    #[arg(long, default_value = "bolt://localhost:7687", env = "NEO4J_URI")]
    pub neo4j_uri: String,

    /// Neo4j username
    #[arg(long, default_value = "neo4j", env = "NEO4J_USERNAME")]
    pub neo4j_username: String,

    /// Neo4j password
    #[arg(long, default_value = "password", env = "NEO4J_PASSWORD")]
    pub neo4j_password: String,

    /// Neo4j database name
    #[arg(long, default_value = "neo4j", env = "NEO4J_DATABASE")]
    pub neo4j_database: String,
}

impl From<&Neo4jArgs> for Neo4jOpts {
    fn from(args: &Neo4jArgs) -> Self {
        Self {
            uri: args.neo4j_uri.clone(),
            username: args.neo4j_username.clone(),
            password: args.neo4j_password.clone(),
            database: args.neo4j_database.clone(),
        }
    }
}

/// Import options given on the command line.
///
/// Each flag overrides the value from `--config-file` or the job document.
#[derive(Parser, Clone, Debug, Default)]
pub struct ConfigArgs {
    /// Config document (JSON, YAML or TOML)
    #[arg(long, value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    /// Field delimiter
    #[arg(long)]
    pub delimiter: Option<char>,

    /// Delimiter between array elements and between labels
    #[arg(long)]
    pub array_delimiter: Option<char>,

    /// Quotation character
    #[arg(long)]
    pub quote: Option<char>,

    /// Treat id columns as strings (true) or integers (false)
    #[arg(long)]
    pub string_ids: Option<bool>,

    /// Records committed per transaction
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Skip repeated node ids without reporting them
    #[arg(long)]
    pub skip_duplicate_nodes: Option<bool>,
}

impl ConfigArgs {
    /// Layer the config file and the individual flags over `base`.
    pub fn apply(&self, base: ImportConfig) -> anyhow::Result<ImportConfig> {
        let mut config = match &self.config_file {
            Some(path) => base
                .with_file(path)
                .with_context(|| format!("Failed to load import config from {path:?}"))?,
            None => base,
        };
        if let Some(delimiter) = self.delimiter {
            config.delimiter = delimiter;
        }
        if let Some(array_delimiter) = self.array_delimiter {
            config.array_delimiter = array_delimiter;
        }
        if let Some(quote) = self.quote {
            config.quotation_character = quote;
        }
        if let Some(string_ids) = self.string_ids {
            config.string_ids = string_ids;
        }
        if let Some(batch_size) = self.batch_size {
            config.batch_size = batch_size;
        }
        if let Some(skip) = self.skip_duplicate_nodes {
            config.skip_duplicate_nodes = skip;
        }
        Ok(config)
    }
}

/// Split `PREFIX=FILE` when the prefix is a list of names.
///
/// URLs may contain `=` in their query string, so a prefix with anything
/// other than name characters and `:` is treated as part of the file name.
fn split_prefix(arg: &str) -> Option<(&str, &str)> {
    let (prefix, file) = arg.split_once('=')?;
    let is_names = !prefix.is_empty()
        && prefix
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == ':');
    is_names.then_some((prefix, file))
}

/// Parse a `--nodes` argument of the form `[Label1:Label2=]FILE`.
pub fn parse_node_file(arg: &str) -> anyhow::Result<NodeFile> {
    let (labels, file) = match split_prefix(arg) {
        Some((prefix, file)) => (
            prefix
                .split(':')
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .collect(),
            file,
        ),
        None => (Vec::new(), arg),
    };
    if file.is_empty() {
        bail!("Missing file name in --nodes argument '{arg}'");
    }
    Ok(NodeFile {
        file_name: file.to_string(),
        labels,
    })
}

/// Parse a `--relationships` argument of the form `[TYPE=]FILE`.
pub fn parse_relationship_file(arg: &str) -> anyhow::Result<RelationshipFile> {
    let (rel_type, file) = match split_prefix(arg) {
        Some((prefix, _)) if prefix.contains(':') => {
            bail!("Relationship type '{prefix}' in '{arg}' must be a single name")
        }
        Some((prefix, file)) => (Some(prefix.to_string()), file),
        None => (None, arg),
    };
    if file.is_empty() {
        bail!("Missing file name in --relationships argument '{arg}'");
    }
    Ok(RelationshipFile {
        file_name: file.to_string(),
        rel_type,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_node_file_with_labels() {
        let file = parse_node_file("Person:Employee=persons.csv").unwrap();
        assert_eq!(file.file_name, "persons.csv");
        assert_eq!(file.labels, vec!["Person", "Employee"]);
    }

    #[test]
    fn test_parse_node_file_without_labels() {
        let file = parse_node_file("file:/persons.csv").unwrap();
        assert_eq!(file.file_name, "file:/persons.csv");
        assert!(file.labels.is_empty());
    }

    #[test]
    fn test_parse_url_with_query_string() {
        let file = parse_node_file("http://host/export?table=persons").unwrap();
        assert_eq!(file.file_name, "http://host/export?table=persons");
        assert!(file.labels.is_empty());

        let file = parse_node_file("Person=http://host/export?table=persons").unwrap();
        assert_eq!(file.file_name, "http://host/export?table=persons");
        assert_eq!(file.labels, vec!["Person"]);
    }

    #[test]
    fn test_parse_relationship_file() {
        let file = parse_relationship_file("KNOWS=knows.csv").unwrap();
        assert_eq!(file.file_name, "knows.csv");
        assert_eq!(file.default_type(), Some("KNOWS"));

        let file = parse_relationship_file("knows.csv").unwrap();
        assert_eq!(file.default_type(), None);
    }

    #[test]
    fn test_parse_rejects_bad_arguments() {
        assert!(parse_node_file("Person=").is_err());
        assert!(parse_relationship_file("KNOWS:LIKES=knows.csv").is_err());
    }

    #[test]
    fn test_config_flags_override_base() {
        let args = ConfigArgs {
            delimiter: Some('|'),
            batch_size: Some(10),
            ..Default::default()
        };
        let base = ImportConfig {
            string_ids: false,
            ..Default::default()
        };
        let config = args.apply(base).unwrap();
        assert_eq!(config.delimiter, '|');
        assert_eq!(config.batch_size, 10);
        assert!(!config.string_ids);
        assert_eq!(config.array_delimiter, ';');
    }

    #[test]
    fn test_config_file_keeps_job_settings() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("overrides.json");
        std::fs::write(&path, r#"{"batchSize": 7}"#).unwrap();

        let args = ConfigArgs {
            config_file: Some(path),
            skip_duplicate_nodes: Some(true),
            ..Default::default()
        };
        let base = ImportConfig {
            delimiter: '|',
            ..Default::default()
        };
        let config = args.apply(base).unwrap();
        assert_eq!(config.delimiter, '|');
        assert_eq!(config.batch_size, 7);
        assert!(config.skip_duplicate_nodes);
    }
}
