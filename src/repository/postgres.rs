use std::time::Duration;

use async_trait::async_trait;
use futures::TryStreamExt;
use sqlx::{
    postgres::{types::Oid as PgOid, PgPoolOptions, PgRow},
    FromRow, PgConnection, PgPool, Row,
};
use tracing::{debug, warn};

use crate::catalog::{resolve, CatalogError, CatalogResult};
use crate::schema::Schema;

use super::interface::{
    AccessMethodRow, AttributeRow, CatalogReader, FunctionRow, IndexRow, InheritsRow,
    Listing, NamespaceRow, Oid, RelationRow, SequenceRow, TypeRow,
};

/// `indkey` is an int2vector, which is indexed from 0. sqlx only decodes
/// arrays starting at 1, so the slice rebases it.
const LIST_INDEXES: &str = r#"
    SELECT indexrelid, indrelid, indisunique, indisprimary,
        indkey[0:array_length(indkey, 1)]::int2[] AS indkey
    FROM pg_catalog.pg_index
    "#;

#[derive(Debug)]
pub struct PostgresRepository {
    pub executor: PgPool,
}

impl PostgresRepository {
    pub async fn connect(dsn: &str, max_connections: u32) -> CatalogResult<Self> {
        let pool = PgPoolOptions::new()
            .min_connections(0)
            .max_connections(max_connections)
            .idle_timeout(Duration::from_millis(30000))
            .test_before_acquire(true)
            .connect(dsn)
            .await
            .map_err(CatalogError::Connection)?;

        Ok(Self { executor: pool })
    }

    /// Take a snapshot of a namespace (the default one if `schema_name` is
    /// empty). All listings are read in one read-only, repeatable-read
    /// transaction, so concurrent DDL can't produce a torn view.
    pub async fn describe(&self, schema_name: &str) -> CatalogResult<Schema> {
        let mut tx = self
            .executor
            .begin()
            .await
            .map_err(CatalogError::TransactionStart)?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await
            .map_err(CatalogError::TransactionStart)?;

        let schema = resolve(&mut PgCatalogReader::new(&mut *tx), schema_name).await;

        // Read-only, nothing to commit
        if let Err(e) = tx.rollback().await {
            warn!("Error rolling back the catalog transaction: {e}");
        }
        schema
    }
}

/// Reads the raw listings from `pg_catalog` over a single connection, which
/// should be inside a transaction.
pub struct PgCatalogReader<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> PgCatalogReader<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    async fn fetch<T>(&mut self, listing: Listing, sql: &'static str) -> CatalogResult<Vec<T>>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        debug!("Listing {listing}");
        sqlx::query_as::<_, T>(sql)
            .fetch(&mut *self.conn)
            .try_collect::<Vec<T>>()
            .await
            .map_err(|source| CatalogError::Query { listing, source })
    }
}

fn oid(row: &PgRow, column: &str) -> Result<Oid, sqlx::Error> {
    Ok(row.try_get::<PgOid, _>(column)?.0)
}

impl<'r> FromRow<'r, PgRow> for NamespaceRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            oid: oid(row, "oid")?,
            name: row.try_get("nspname")?,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for RelationRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            oid: oid(row, "oid")?,
            name: row.try_get("relname")?,
            type_oid: oid(row, "reltype")?,
            access_method: oid(row, "relam")?,
            kind: row.try_get("relkind")?,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for AttributeRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            relation: oid(row, "attrelid")?,
            name: row.try_get("attname")?,
            type_oid: oid(row, "atttypid")?,
            position: row.try_get("attnum")?,
            not_null: row.try_get("attnotnull")?,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for TypeRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            oid: oid(row, "oid")?,
            name: row.try_get("typname")?,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for InheritsRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            child: oid(row, "inhrelid")?,
            parent: oid(row, "inhparent")?,
            seq_no: row.try_get("inhseqno")?,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for IndexRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            index: oid(row, "indexrelid")?,
            relation: oid(row, "indrelid")?,
            unique: row.try_get("indisunique")?,
            primary: row.try_get("indisprimary")?,
            keys: row.try_get("indkey")?,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for AccessMethodRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            oid: oid(row, "oid")?,
            name: row.try_get("amname")?,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for SequenceRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            name: row.try_get("sequencename")?,
            start: row.try_get("start_value")?,
            increment_by: row.try_get("increment_by")?,
            max_value: row.try_get("max_value")?,
            min_value: row.try_get("min_value")?,
            cycle: row.try_get("cycle")?,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for FunctionRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            name: row.try_get("proname")?,
            arguments: row.try_get("arguments")?,
            return_type: row.try_get("return_type")?,
            volatility: row.try_get("provolatile")?,
        })
    }
}

#[async_trait]
impl<'c> CatalogReader for PgCatalogReader<'c> {
    async fn current_database(&mut self) -> CatalogResult<Option<String>> {
        let name: String = sqlx::query_scalar("SELECT current_database()::text")
            .fetch_one(&mut *self.conn)
            .await
            .map_err(|source| CatalogError::Query {
                listing: Listing::CurrentDatabase,
                source,
            })?;
        Ok(Some(name))
    }

    async fn list_namespaces(&mut self) -> CatalogResult<Vec<NamespaceRow>> {
        self.fetch(
            Listing::Namespaces,
            r#"
            SELECT oid, nspname
            FROM pg_catalog.pg_namespace
            "#,
        )
        .await
    }

    async fn list_relations(&mut self, namespace: Oid) -> CatalogResult<Vec<RelationRow>> {
        debug!("Listing {}", Listing::Relations);
        sqlx::query_as::<_, RelationRow>(
            r#"
            SELECT oid, relname, reltype, relam, relkind::text AS relkind
            FROM pg_catalog.pg_class
            WHERE relnamespace = $1
            "#,
        )
        .bind(PgOid(namespace))
        .fetch_all(&mut *self.conn)
        .await
        .map_err(|source| CatalogError::Query {
            listing: Listing::Relations,
            source,
        })
    }

    async fn list_attributes(&mut self) -> CatalogResult<Vec<AttributeRow>> {
        self.fetch(
            Listing::Attributes,
            r#"
            SELECT attrelid, attname, atttypid, attnum, attnotnull
            FROM pg_catalog.pg_attribute
            WHERE NOT attisdropped
            "#,
        )
        .await
    }

    async fn list_types(&mut self) -> CatalogResult<Vec<TypeRow>> {
        self.fetch(
            Listing::Types,
            r#"
            SELECT oid, typname
            FROM pg_catalog.pg_type
            "#,
        )
        .await
    }

    async fn list_inherits(&mut self) -> CatalogResult<Vec<InheritsRow>> {
        self.fetch(
            Listing::Inherits,
            r#"
            SELECT inhrelid, inhparent, inhseqno
            FROM pg_catalog.pg_inherits
            "#,
        )
        .await
    }

    async fn list_indexes(&mut self) -> CatalogResult<Vec<IndexRow>> {
        // Expressions aren't read; pg_get_expr(indexprs, indrelid) could render them
        self.fetch(Listing::Indexes, LIST_INDEXES).await
    }

    async fn list_access_methods(&mut self) -> CatalogResult<Vec<AccessMethodRow>> {
        self.fetch(
            Listing::AccessMethods,
            r#"
            SELECT oid, amname
            FROM pg_catalog.pg_am
            "#,
        )
        .await
    }

    async fn list_sequences(&mut self, namespace: &str) -> CatalogResult<Vec<SequenceRow>> {
        debug!("Listing {}", Listing::Sequences);
        sqlx::query_as::<_, SequenceRow>(
            r#"
            SELECT sequencename::text AS sequencename, start_value, increment_by,
                max_value, min_value, cycle
            FROM pg_catalog.pg_sequences
            WHERE schemaname = $1
            "#,
        )
        .bind(namespace)
        .fetch_all(&mut *self.conn)
        .await
        .map_err(|source| CatalogError::Query {
            listing: Listing::Sequences,
            source,
        })
    }

    async fn list_functions(&mut self, namespace: Oid) -> CatalogResult<Vec<FunctionRow>> {
        debug!("Listing {}", Listing::Functions);
        sqlx::query_as::<_, FunctionRow>(
            r#"
            SELECT
                proname,
                pg_get_function_identity_arguments(oid) AS arguments,
                format_type(prorettype, NULL) AS return_type,
                provolatile::text AS provolatile
            FROM pg_catalog.pg_proc
            WHERE pronamespace = $1
            "#,
        )
        .bind(PgOid(namespace))
        .fetch_all(&mut *self.conn)
        .await
        .map_err(|source| CatalogError::Query {
            listing: Listing::Functions,
            source,
        })
    }
}

pub mod testutils {
    use rand::Rng;

    pub fn get_random_schema() -> String {
        // Generate a random schema (taken from IOx)
        let mut rng = rand::thread_rng();
        (&mut rng)
            .sample_iter(rand::distributions::Alphanumeric)
            .filter(|c| c.is_ascii_alphabetic())
            .take(20)
            .map(char::from)
            .collect::<String>()
            .to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::LIST_INDEXES;

    #[test]
    fn test_index_keys_are_rebased() {
        assert!(LIST_INDEXES.contains("indkey[0:array_length(indkey, 1)]::int2[] AS indkey"));
        assert!(!LIST_INDEXES.contains("indkey::int2[]"));
    }
}
