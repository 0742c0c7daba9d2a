use async_trait::async_trait;
use strum_macros::Display;

use crate::catalog::CatalogResult;

/// Catalog object identifier.
pub type Oid = u32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceRow {
    pub oid: Oid,
    pub name: String,
}

/// A `pg_class` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationRow {
    pub oid: Oid,
    pub name: String,
    pub type_oid: Oid,
    pub access_method: Oid,
    /// `relkind`, a single character.
    pub kind: String,
}

/// A `pg_attribute` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeRow {
    pub relation: Oid,
    pub name: String,
    pub type_oid: Oid,
    /// `attnum`; negative for system columns.
    pub position: i16,
    pub not_null: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRow {
    pub oid: Oid,
    pub name: String,
}

/// A `pg_inherits` edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InheritsRow {
    pub child: Oid,
    pub parent: Oid,
    pub seq_no: i32,
}

/// A `pg_index` entry. This is in addition to the `pg_class` row of the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexRow {
    pub index: Oid,
    pub relation: Oid,
    pub unique: bool,
    pub primary: bool,
    /// 1-based column positions; 0 for an expression.
    pub keys: Vec<i16>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessMethodRow {
    pub oid: Oid,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceRow {
    pub name: String,
    pub start: i64,
    pub increment_by: i64,
    pub max_value: i64,
    pub min_value: i64,
    pub cycle: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionRow {
    pub name: String,
    pub arguments: String,
    pub return_type: String,
    /// `provolatile`, a single character.
    pub volatility: String,
}

/// Identity of a raw listing, carried by query errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Listing {
    CurrentDatabase,
    Namespaces,
    Relations,
    Attributes,
    Types,
    Inherits,
    Indexes,
    AccessMethods,
    Sequences,
    Functions,
}

/// Source of raw, unordered catalog rows.
///
/// All calls made during one resolution pass must observe the same snapshot.
#[async_trait]
pub trait CatalogReader: Send {
    async fn current_database(&mut self) -> CatalogResult<Option<String>> {
        Ok(None)
    }

    async fn list_namespaces(&mut self) -> CatalogResult<Vec<NamespaceRow>>;

    /// Relations of a single namespace.
    async fn list_relations(&mut self, namespace: Oid) -> CatalogResult<Vec<RelationRow>>;

    async fn list_attributes(&mut self) -> CatalogResult<Vec<AttributeRow>>;

    async fn list_types(&mut self) -> CatalogResult<Vec<TypeRow>>;

    async fn list_inherits(&mut self) -> CatalogResult<Vec<InheritsRow>>;

    async fn list_indexes(&mut self) -> CatalogResult<Vec<IndexRow>>;

    async fn list_access_methods(&mut self) -> CatalogResult<Vec<AccessMethodRow>>;

    async fn list_sequences(&mut self, _namespace: &str) -> CatalogResult<Vec<SequenceRow>> {
        Ok(vec![])
    }

    async fn list_functions(&mut self, _namespace: Oid) -> CatalogResult<Vec<FunctionRow>> {
        Ok(vec![])
    }
}
