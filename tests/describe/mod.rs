use schemaspy::catalog::resolve_namespace;
use schemaspy::repository::interface::CatalogReader;
use schemaspy::repository::postgres::PgCatalogReader;
use schemaspy::schema::{Column, IndexKey, RelationKind, Volatility, EXPRESSION_PLACEHOLDER};

use crate::{drop_schema, make_repository_with};

const DDL: &str = r#"
CREATE TABLE {schema}.simple (
    id uuid NOT NULL,
    name text,
    t timestamp
);

CREATE TABLE {schema}.root (id integer);
CREATE TABLE {schema}.root_123 (extra text) INHERITS ({schema}.root);

CREATE TABLE {schema}.indexed (
    id serial PRIMARY KEY,
    name text UNIQUE,
    major integer,
    minor integer
);
CREATE INDEX indexed_major_minor ON {schema}.indexed (major, minor);
CREATE INDEX indexed_lower_name_minor ON {schema}.indexed (lower(name), minor);

CREATE VIEW {schema}.simple_ids AS SELECT id FROM {schema}.simple;
CREATE MATERIALIZED VIEW {schema}.simple_names AS SELECT name FROM {schema}.simple;

CREATE FUNCTION {schema}.add(a integer, b integer) RETURNS integer
    AS 'SELECT a + b' LANGUAGE SQL IMMUTABLE;
"#;

#[tokio::test]
#[ignore = "needs a PostgreSQL database in DATABASE_URL"]
async fn test_describe_schema() {
    let (repository, schema_name) = make_repository_with(DDL).await;

    let schema = repository.describe(&schema_name).await.unwrap();

    assert_eq!(schema.name, schema_name);
    assert!(schema.database.is_some());
    assert_eq!(schema.tables, vec!["indexed", "root", "root_123", "simple"]);
    assert_eq!(schema.views, vec!["simple_ids"]);
    assert_eq!(schema.materialized, vec!["simple_names"]);
    assert_eq!(
        schema.relations["simple_names"].kind,
        RelationKind::MaterializedView
    );

    // Columns
    let simple = &schema.relations["simple"];
    assert_eq!(simple.columns.len(), 3);
    assert_eq!(simple.column_names(), vec!["id", "name", "t"]);
    assert_eq!(
        simple.columns["id"],
        Column {
            r#type: "uuid".to_string(),
            not_null: true,
            position: 1,
        }
    );
    assert_eq!(
        simple.columns["name"],
        Column {
            r#type: "text".to_string(),
            not_null: false,
            position: 2,
        }
    );

    // Inheritance
    assert_eq!(schema.relations["root"].children, vec!["root_123"]);
    assert_eq!(schema.relations["root_123"].inherits, vec!["root"]);
    assert_eq!(
        schema.relations["root_123"].column_names(),
        vec!["id", "extra"]
    );

    // Indexes
    assert_eq!(
        schema.relations["indexed"].indexes,
        vec![
            "indexed_lower_name_minor",
            "indexed_major_minor",
            "indexed_name_key",
            "indexed_pkey"
        ]
    );
    let pkey = &schema.indexes["indexed_pkey"];
    assert!(pkey.primary && pkey.unique);
    assert_eq!(pkey.method, "btree");
    assert_eq!(pkey.relation, "indexed");
    assert_eq!(pkey.columns, vec![IndexKey::Column("id".to_string())]);
    assert_eq!(
        schema.indexes["indexed_major_minor"].column_names(),
        vec!["major", "minor"]
    );
    assert_eq!(
        schema.indexes["indexed_lower_name_minor"].column_names(),
        vec![EXPRESSION_PLACEHOLDER, "minor"]
    );

    // Sequences and functions
    let sequence = &schema.sequences["indexed_id_seq"];
    assert_eq!(sequence.start, 1);
    assert_eq!(sequence.increment_by, 1);
    assert!(!sequence.cycle);

    let add = &schema.functions["add(a integer, b integer)"];
    assert_eq!(add.return_type, "integer");
    assert_eq!(add.volatility, Volatility::Immutable);

    // A second pass sees the same thing
    let again = repository.describe(&schema_name).await.unwrap();
    assert_eq!(schema, again);

    drop_schema(&repository, &schema_name).await;
}

#[tokio::test]
#[ignore = "needs a PostgreSQL database in DATABASE_URL"]
async fn test_list_indexes_decodes_key_positions() {
    let (repository, schema_name) = make_repository_with(DDL).await;

    let mut conn = repository.executor.acquire().await.unwrap();
    let mut reader = PgCatalogReader::new(&mut *conn);

    let namespaces = reader.list_namespaces().await.unwrap();
    let namespace = resolve_namespace(&namespaces, &schema_name).unwrap();
    let relations = reader.list_relations(namespace.oid).await.unwrap();
    let indexes = reader.list_indexes().await.unwrap();

    let keys_of = |name: &str| {
        let oid = relations.iter().find(|r| r.name == name).unwrap().oid;
        indexes.iter().find(|i| i.index == oid).unwrap().keys.clone()
    };
    assert_eq!(keys_of("indexed_pkey"), vec![1]);
    assert_eq!(keys_of("indexed_major_minor"), vec![3, 4]);
    assert_eq!(keys_of("indexed_lower_name_minor"), vec![0, 4]);

    drop(reader);
    drop(conn);
    drop_schema(&repository, &schema_name).await;
}
