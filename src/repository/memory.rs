//! In-memory catalog reader holding literal rows. Used to exercise the
//! resolution passes without a database.
use async_trait::async_trait;

use crate::catalog::CatalogResult;

use super::interface::{
    AccessMethodRow, AttributeRow, CatalogReader, FunctionRow, IndexRow, InheritsRow,
    NamespaceRow, Oid, RelationRow, SequenceRow, TypeRow,
};

#[derive(Debug, Clone, Default)]
pub struct MemoryReader {
    pub database: Option<String>,
    pub namespaces: Vec<NamespaceRow>,
    /// (namespace, relation)
    pub relations: Vec<(Oid, RelationRow)>,
    pub attributes: Vec<AttributeRow>,
    pub types: Vec<TypeRow>,
    pub inherits: Vec<InheritsRow>,
    pub indexes: Vec<IndexRow>,
    pub access_methods: Vec<AccessMethodRow>,
    /// (namespace name, sequence)
    pub sequences: Vec<(String, SequenceRow)>,
    /// (namespace, function)
    pub functions: Vec<(Oid, FunctionRow)>,
}

impl MemoryReader {
    pub fn new(database: &str) -> Self {
        Self {
            database: Some(database.to_string()),
            ..Default::default()
        }
    }

    pub fn with_namespace(mut self, oid: Oid, name: &str) -> Self {
        self.namespaces.push(NamespaceRow {
            oid,
            name: name.to_string(),
        });
        self
    }

    pub fn with_type(mut self, oid: Oid, name: &str) -> Self {
        self.types.push(TypeRow {
            oid,
            name: name.to_string(),
        });
        self
    }

    pub fn with_access_method(mut self, oid: Oid, name: &str) -> Self {
        self.access_methods.push(AccessMethodRow {
            oid,
            name: name.to_string(),
        });
        self
    }

    pub fn with_relation(mut self, namespace: Oid, oid: Oid, name: &str, kind: &str) -> Self {
        self.relations.push((
            namespace,
            RelationRow {
                oid,
                name: name.to_string(),
                type_oid: 0,
                access_method: 0,
                kind: kind.to_string(),
            },
        ));
        self
    }

    /// Add the `pg_class` row of an index; pair with [`MemoryReader::with_index`].
    pub fn with_index_relation(
        mut self,
        namespace: Oid,
        oid: Oid,
        name: &str,
        access_method: Oid,
    ) -> Self {
        self.relations.push((
            namespace,
            RelationRow {
                oid,
                name: name.to_string(),
                type_oid: 0,
                access_method,
                kind: "i".to_string(),
            },
        ));
        self
    }

    pub fn with_attribute(
        mut self,
        relation: Oid,
        name: &str,
        type_oid: Oid,
        position: i16,
        not_null: bool,
    ) -> Self {
        self.attributes.push(AttributeRow {
            relation,
            name: name.to_string(),
            type_oid,
            position,
            not_null,
        });
        self
    }

    pub fn with_inherits(mut self, child: Oid, parent: Oid, seq_no: i32) -> Self {
        self.inherits.push(InheritsRow {
            child,
            parent,
            seq_no,
        });
        self
    }

    pub fn with_index(
        mut self,
        index: Oid,
        relation: Oid,
        unique: bool,
        primary: bool,
        keys: Vec<i16>,
    ) -> Self {
        self.indexes.push(IndexRow {
            index,
            relation,
            unique,
            primary,
            keys,
        });
        self
    }

    pub fn with_sequence(
        mut self,
        namespace: &str,
        name: &str,
        start: i64,
        increment_by: i64,
        max_value: i64,
        min_value: i64,
        cycle: bool,
    ) -> Self {
        self.sequences.push((
            namespace.to_string(),
            SequenceRow {
                name: name.to_string(),
                start,
                increment_by,
                max_value,
                min_value,
                cycle,
            },
        ));
        self
    }

    pub fn with_function(
        mut self,
        namespace: Oid,
        name: &str,
        arguments: &str,
        return_type: &str,
        volatility: &str,
    ) -> Self {
        self.functions.push((
            namespace,
            FunctionRow {
                name: name.to_string(),
                arguments: arguments.to_string(),
                return_type: return_type.to_string(),
                volatility: volatility.to_string(),
            },
        ));
        self
    }
}

#[async_trait]
impl CatalogReader for MemoryReader {
    async fn current_database(&mut self) -> CatalogResult<Option<String>> {
        Ok(self.database.clone())
    }

    async fn list_namespaces(&mut self) -> CatalogResult<Vec<NamespaceRow>> {
        Ok(self.namespaces.clone())
    }

    async fn list_relations(&mut self, namespace: Oid) -> CatalogResult<Vec<RelationRow>> {
        Ok(self
            .relations
            .iter()
            .filter(|(ns, _)| *ns == namespace)
            .map(|(_, r)| r.clone())
            .collect())
    }

    async fn list_attributes(&mut self) -> CatalogResult<Vec<AttributeRow>> {
        Ok(self.attributes.clone())
    }

    async fn list_types(&mut self) -> CatalogResult<Vec<TypeRow>> {
        Ok(self.types.clone())
    }

    async fn list_inherits(&mut self) -> CatalogResult<Vec<InheritsRow>> {
        Ok(self.inherits.clone())
    }

    async fn list_indexes(&mut self) -> CatalogResult<Vec<IndexRow>> {
        Ok(self.indexes.clone())
    }

    async fn list_access_methods(&mut self) -> CatalogResult<Vec<AccessMethodRow>> {
        Ok(self.access_methods.clone())
    }

    async fn list_sequences(&mut self, namespace: &str) -> CatalogResult<Vec<SequenceRow>> {
        Ok(self
            .sequences
            .iter()
            .filter(|(ns, _)| ns == namespace)
            .map(|(_, s)| s.clone())
            .collect())
    }

    async fn list_functions(&mut self, namespace: Oid) -> CatalogResult<Vec<FunctionRow>> {
        Ok(self
            .functions
            .iter()
            .filter(|(ns, _)| *ns == namespace)
            .map(|(_, f)| f.clone())
            .collect())
    }
}
