//! Shared fixtures for the import integration tests.

#![allow(dead_code)]

use graph_import_csv::ImportConfig;
use import_core::NodeHandle;
use memory_sink::{MemoryGraph, StoredRelationship};
use tempfile::TempDir;

pub const FIXTURES: &[(&str, &str)] = &[
    ("array.csv", ":ID|name:STRING[]\n1|John;Bob;Alice\n"),
    (
        "custom-ids-basic-affiliated-with.csv",
        ":START_ID,:END_ID\n1,3\n2,4\n",
    ),
    (
        "custom-ids-basic-companies.csv",
        "companyId:ID,name:STRING\n4,Neo4j\n",
    ),
    (
        "custom-ids-basic-persons.csv",
        "personId:ID,name:STRING\n1,John\n2,Jane\n",
    ),
    (
        "custom-ids-basic-unis.csv",
        "uniId:ID,name:STRING\n3,TU Munich\n",
    ),
    (
        "custom-ids-idspaces-affiliated-with.csv",
        ":START_ID(Person),:END_ID(Organisation)\n1,1\n2,2\n",
    ),
    (
        "custom-ids-idspaces-companies.csv",
        "companyId:ID(Organisation),name:STRING\n2,Neo4j\n",
    ),
    (
        "custom-ids-idspaces-persons.csv",
        "personId:ID(Person),name:STRING\n1,John\n2,Jane\n",
    ),
    (
        "custom-ids-idspaces-unis.csv",
        "uniId:ID(Organisation),name:STRING\n1,TU Munich\n",
    ),
    ("id-idspaces.csv", ":ID(Person)|name:STRING\n1|John\n2|Jane\n"),
    ("id.csv", "id:ID|name:STRING\n1|John\n2|Jane\n"),
    (
        "ignore-nodes.csv",
        ":ID|firstname:STRING|lastname:IGNORE|age:INT\n1|John|Doe|25\n2|Jane|Doe|26\n",
    ),
    (
        "ignore-relationships.csv",
        ":START_ID|:END_ID|prop1:IGNORE|prop2:INT\n1|2|a|3\n2|1|b|6\n",
    ),
    ("label.csv", ":ID|:LABEL|name:STRING\n1|Student;Employee|John\n"),
    (
        "knows.csv",
        ":START_ID,:END_ID,since:INT\n1,2,2016\n10,11,2014\n11,12,2013",
    ),
    (
        "persons.csv",
        ":ID,name:STRING,speaks:STRING[]\n1,John,\"en,fr\"\n2,Jane,\"en,de\"",
    ),
    (
        "quoted.csv",
        "id:ID|:LABEL|name:STRING\n'1'|'Student:Employee'|'John'\n",
    ),
    (
        "rel-on-ids-idspaces.csv",
        ":START_ID(Person)|:END_ID(Person)|since:INT\n1|2|2016\n",
    ),
    ("rel-on-ids.csv", "x:START_ID|:END_ID|since:INT\n1|2|2016\n"),
    (
        "rel-type.csv",
        ":START_ID|:END_ID|:TYPE|since:INT\n1|2|FRIENDS_WITH|2016\n2|1||2016\n",
    ),
    ("typeless.csv", ":ID|name\n1|John\n2|Jane\n"),
];

/// An import directory holding every fixture file.
pub fn fixture_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    for (name, content) in FIXTURES {
        std::fs::write(dir.path().join(name), content).unwrap();
    }
    dir
}

/// Write one extra file into `dir`.
pub fn write(dir: &TempDir, name: &str, content: &str) {
    std::fs::write(dir.path().join(name), content).unwrap();
}

pub fn pipe_config() -> ImportConfig {
    ImportConfig {
        delimiter: '|',
        ..Default::default()
    }
}

pub async fn name_of(graph: &MemoryGraph, handle: NodeHandle) -> String {
    graph
        .node(handle)
        .await
        .and_then(|n| n.property("name").and_then(|v| v.as_str()).map(str::to_string))
        .unwrap_or_default()
}

/// "start end" name pairs of the given relationships, sorted.
pub async fn pairs(graph: &MemoryGraph, relationships: &[StoredRelationship]) -> Vec<String> {
    let mut pairs = Vec::new();
    for rel in relationships {
        pairs.push(format!(
            "{} {}",
            name_of(graph, rel.start).await,
            name_of(graph, rel.end).await
        ));
    }
    pairs.sort();
    pairs
}

/// Values of a string property across nodes with `label`, sorted.
pub async fn sorted_names(graph: &MemoryGraph, label: &str) -> Vec<String> {
    let mut names: Vec<String> = graph
        .nodes_with_label(label)
        .await
        .iter()
        .filter_map(|n| n.property("name").and_then(|v| v.as_str()).map(str::to_string))
        .collect();
    names.sort();
    names
}
