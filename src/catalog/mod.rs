//! Resolution of raw catalog listings into a [`Schema`] snapshot.
//!
//! One pass runs the namespace lookup, reads every listing from the
//! [`CatalogReader`] and then feeds a fresh schema builder through
//! the relation classifier, the inheritance linker, the column attacher and
//! the index resolver, in that order.
use tracing::{debug, info};

use crate::repository::interface::{CatalogReader, Listing, Oid};
use crate::schema::{Function, Schema, Sequence, Volatility};

mod builder;
mod classify;
mod columns;
mod indexes;
mod inherits;
mod namespace;
mod oid_index;

pub use classify::KindCode;
pub use namespace::resolve_namespace;
pub use oid_index::OidIndex;

pub const DEFAULT_SCHEMA: &str = "public";

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Failed to connect to the database: {0}")]
    Connection(#[source] sqlx::Error),

    #[error("Failed to start the catalog transaction: {0}")]
    TransactionStart(#[source] sqlx::Error),

    #[error("Namespace {name:?} not found")]
    NamespaceNotFound { name: String },

    #[error("Error listing {listing}: {source}")]
    Query {
        listing: Listing,
        #[source]
        source: sqlx::Error,
    },

    // Catalog inconsistencies
    #[error("Type with OID {oid} of column {relation}.{column} doesn't exist")]
    UnresolvedType {
        oid: Oid,
        relation: String,
        column: String,
    },

    #[error("Access method with OID {oid} of index {index:?} doesn't exist")]
    UnresolvedAccessMethod { oid: Oid, index: String },

    #[error("No index details for index {index:?} (OID {oid})")]
    MissingIndexDetails { oid: Oid, index: String },
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Read a full snapshot of a namespace. An empty `schema_name` means
/// [`DEFAULT_SCHEMA`].
///
/// Every listing is read through `reader`, which is expected to serve them
/// all from one snapshot. Any error aborts the pass.
pub async fn resolve<R: CatalogReader + ?Sized>(
    reader: &mut R,
    schema_name: &str,
) -> CatalogResult<Schema> {
    let namespaces = reader.list_namespaces().await?;
    let namespace = resolve_namespace(&namespaces, schema_name)?;
    debug!("Resolved namespace {:?} to OID {}", namespace.name, namespace.oid);

    let database = reader.current_database().await?;

    let oids = OidIndex::new(
        reader.list_relations(namespace.oid).await?,
        reader.list_types().await?,
        reader.list_indexes().await?,
        reader.list_access_methods().await?,
        reader.list_inherits().await?,
    );
    let attributes = reader.list_attributes().await?;

    let mut builder = builder::SchemaBuilder::new(namespace.name.clone());
    classify::classify_relations(&oids, &mut builder);
    inherits::link_inheritance(&oids, &mut builder);
    columns::attach_columns(&oids, &attributes, &mut builder)?;
    indexes::resolve_indexes(&oids, &mut builder)?;

    let mut schema = builder.finish();
    schema.database = database;

    for row in reader.list_sequences(&namespace.name).await? {
        schema.sequences.insert(
            row.name,
            Sequence {
                start: row.start,
                increment_by: row.increment_by,
                max_value: row.max_value,
                min_value: row.min_value,
                cycle: row.cycle,
            },
        );
    }

    for row in reader.list_functions(namespace.oid).await? {
        let Some(volatility) = Volatility::from_code(&row.volatility) else {
            debug!(
                "Skipping function {} with unknown volatility {:?}",
                row.name, row.volatility
            );
            continue;
        };
        let function = Function {
            name: row.name,
            arguments: row.arguments,
            return_type: row.return_type,
            volatility,
        };
        schema.functions.insert(function.signature(), function);
    }

    info!(
        "Resolved schema {:?}: {} tables, {} views, {} materialized views, {} indexes",
        schema.name,
        schema.tables.len(),
        schema.views.len(),
        schema.materialized.len(),
        schema.indexes.len()
    );

    Ok(schema)
}
