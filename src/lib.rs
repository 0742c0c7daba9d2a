//! Reads the catalog of a PostgreSQL database and reconstructs one namespace
//! as a cross-referenced [`schema::Schema`]: tables, views, materialized
//! views, their columns, inheritance links and indexes, plus the sequences
//! and functions of the namespace.
//!
//! It never changes anything; the use case is maintenance and setup tooling
//! that inspects the current state of a database and applies its own `ALTER`
//! commands afterwards.
pub mod catalog;
pub mod config;
pub mod repository;
pub mod schema;

use crate::catalog::{CatalogResult, DEFAULT_SCHEMA};
use crate::repository::postgres::PostgresRepository;
use crate::schema::Schema;

/// Describe the default namespace of the database at `dsn`.
pub async fn public(dsn: &str) -> CatalogResult<Schema> {
    let repository = PostgresRepository::connect(dsn, 1).await?;
    let schema = repository.describe(DEFAULT_SCHEMA).await;
    repository.executor.close().await;
    schema
}
