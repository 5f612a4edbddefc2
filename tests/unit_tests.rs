use clap::Parser;
use graph_import::import::ImportArgs;
use graph_import::Neo4jArgs;
use neo4j_sink::Neo4jOpts;

#[test]
fn test_import_args_parsing() {
    let args = ImportArgs::try_parse_from([
        "import",
        "--nodes",
        "Person=persons.csv",
        "--nodes",
        "Company:Organisation=companies.csv",
        "--relationships",
        "WORKS_AT=works-at.csv",
        "--delimiter",
        "|",
        "--string-ids",
        "false",
        "--batch-size",
        "500",
        "--dry-run",
    ])
    .unwrap();

    assert_eq!(args.nodes.len(), 2);
    assert!(args.dry_run);
    assert_eq!(args.config.delimiter, Some('|'));
    assert_eq!(args.config.string_ids, Some(false));
    assert_eq!(args.config.batch_size, Some(500));
    assert_eq!(args.config.quote, None);

    let job = args.build_job().unwrap();
    assert_eq!(job.nodes[1].labels, vec!["Company", "Organisation"]);
    assert_eq!(job.relationships[0].default_type(), Some("WORKS_AT"));
    assert_eq!(job.config.delimiter, '|');
    assert!(!job.config.string_ids);
    assert_eq!(job.config.batch_size, 500);
    assert_eq!(job.config.array_delimiter, ';');
}

#[test]
fn test_invalid_batch_size_is_rejected() {
    let result = ImportArgs::try_parse_from(["import", "--nodes", "a.csv", "--batch-size", "many"]);
    assert!(result.is_err());
}

#[test]
fn test_neo4j_opts_from_args() {
    let args = Neo4jArgs {
        neo4j_uri: "bolt://graph:7687".to_string(),
        neo4j_username: "importer".to_string(),
        neo4j_password: "secret".to_string(),
        neo4j_database: "people".to_string(),
    };

    let opts = Neo4jOpts::from(&args);
    assert_eq!(opts.uri, "bolt://graph:7687");
    assert_eq!(opts.username, "importer");
    assert_eq!(opts.password, "secret");
    assert_eq!(opts.database, "people");
}
