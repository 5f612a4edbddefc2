//! Import configuration and job documents.
//!
//! Both can be read from JSON, YAML or TOML files. The format is chosen
//! from the file extension.

use crate::error::ImportError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Options shared by every file of one import call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImportConfig {
    /// Field separator (default: ',')
    pub delimiter: char,

    /// Separator between elements of array fields and label columns (default: ';')
    pub array_delimiter: char,

    /// Character wrapping quoted fields (default: '"')
    pub quotation_character: char,

    /// Whether id columns hold strings (true) or integers (false)
    pub string_ids: bool,

    /// Number of staged records committed per transaction
    pub batch_size: usize,

    /// Skip repeated node ids silently instead of reporting them as row errors
    pub skip_duplicate_nodes: bool,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            delimiter: ',',
            array_delimiter: ';',
            quotation_character: '"',
            string_ids: true,
            batch_size: 20000,
            skip_duplicate_nodes: false,
        }
    }
}

impl ImportConfig {
    /// Check option combinations the reader cannot work with.
    pub fn validate(&self) -> Result<(), ImportError> {
        if self.batch_size == 0 {
            return Err(ImportError::Config(
                "batchSize must be a positive integer".to_string(),
            ));
        }
        if !self.delimiter.is_ascii() {
            return Err(ImportError::Config(format!(
                "delimiter '{}' must be a single ASCII character",
                self.delimiter
            )));
        }
        if !self.quotation_character.is_ascii() {
            return Err(ImportError::Config(format!(
                "quotationCharacter '{}' must be a single ASCII character",
                self.quotation_character
            )));
        }
        if self.delimiter == self.quotation_character {
            return Err(ImportError::Config(format!(
                "delimiter and quotationCharacter are both '{}'",
                self.delimiter
            )));
        }
        if self.array_delimiter == self.delimiter {
            return Err(ImportError::Config(format!(
                "arrayDelimiter and delimiter are both '{}'",
                self.delimiter
            )));
        }
        Ok(())
    }

    /// Load a config document.
    pub fn from_file(path: &Path) -> Result<Self, ImportError> {
        load_document(path)
    }

    /// Load a config document over `self`: keys missing from the document
    /// keep the value they have here instead of the default.
    pub fn with_file(&self, path: &Path) -> Result<Self, ImportError> {
        let mut merged = serde_json::to_value(self)
            .map_err(|e| ImportError::Config(format!("Failed to encode config: {e}")))?;
        let overrides: serde_json::Value = load_document(path)?;
        match (merged.as_object_mut(), overrides) {
            (Some(merged), serde_json::Value::Object(overrides)) => merged.extend(overrides),
            _ => {
                return Err(ImportError::Config(format!(
                    "{} does not hold a config object",
                    path.display()
                )))
            }
        }
        serde_json::from_value(merged)
            .map_err(|e| ImportError::Config(format!("Failed to parse {}: {e}", path.display())))
    }
}

/// A node file and the labels every node from it receives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeFile {
    pub file_name: String,
    #[serde(default)]
    pub labels: Vec<String>,
}

impl NodeFile {
    pub fn new(file_name: impl Into<String>, labels: &[&str]) -> Self {
        Self {
            file_name: file_name.into(),
            labels: labels.iter().map(|l| l.to_string()).collect(),
        }
    }
}

/// A relationship file and the type used for rows without a `:TYPE` value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipFile {
    pub file_name: String,
    #[serde(rename = "type", default)]
    pub rel_type: Option<String>,
}

impl RelationshipFile {
    pub fn new(file_name: impl Into<String>, rel_type: &str) -> Self {
        Self {
            file_name: file_name.into(),
            rel_type: Some(rel_type.to_string()),
        }
    }

    /// Default type, if one was given and is not blank.
    pub fn default_type(&self) -> Option<&str> {
        self.rel_type.as_deref().filter(|t| !t.is_empty())
    }
}

/// A complete import call: node files, relationship files and options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportJob {
    pub nodes: Vec<NodeFile>,
    pub relationships: Vec<RelationshipFile>,
    pub config: ImportConfig,
}

impl ImportJob {
    /// Load a job document.
    pub fn from_file(path: &Path) -> Result<Self, ImportError> {
        load_document(path)
    }
}

fn load_document<T: DeserializeOwned>(path: &Path) -> Result<T, ImportError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        ImportError::Config(format!("Failed to read {}: {e}", path.display()))
    })?;

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    let parsed = match extension.as_deref() {
        Some("json") => serde_json::from_str(&content).map_err(|e| e.to_string()),
        Some("yaml") | Some("yml") => serde_yaml::from_str(&content).map_err(|e| e.to_string()),
        Some("toml") => toml::from_str(&content).map_err(|e| e.to_string()),
        _ => {
            return Err(ImportError::Config(format!(
                "Unsupported file extension for {}, expected .json, .yaml, .yml or .toml",
                path.display()
            )))
        }
    };

    parsed.map_err(|e| ImportError::Config(format!("Failed to parse {}: {e}", path.display())))
}
