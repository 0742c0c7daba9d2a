use std::collections::{BTreeMap, HashMap};

use crate::repository::interface::Oid;
use crate::schema::{Column, Index, Relation, RelationKind, Schema};

/// Handle into the builder's relation arena.
pub(super) type RelationId = usize;

#[derive(Debug)]
pub(super) struct RelationEntry {
    pub name: String,
    pub kind: RelationKind,
    pub columns: BTreeMap<String, Column>,
    /// (inhseqno, parent)
    parents: Vec<(i32, RelationId)>,
    children: Vec<RelationId>,
    indexes: Vec<String>,
}

impl RelationEntry {
    pub fn column_at(&self, position: i16) -> Option<&str> {
        self.columns
            .iter()
            .find(|(_, c)| c.position == position)
            .map(|(name, _)| name.as_str())
    }
}

/// Mutable graph that the resolution passes write into. Cross references are
/// arena handles; [`SchemaBuilder::finish`] turns them into names.
#[derive(Debug)]
pub(super) struct SchemaBuilder {
    name: String,
    relations: Vec<RelationEntry>,
    by_oid: HashMap<Oid, RelationId>,
    indexes: BTreeMap<String, Index>,
}

impl SchemaBuilder {
    pub fn new(name: String) -> Self {
        Self {
            name,
            relations: vec![],
            by_oid: HashMap::new(),
            indexes: BTreeMap::new(),
        }
    }

    pub fn add_relation(&mut self, oid: Oid, name: String, kind: RelationKind) -> RelationId {
        let id = self.relations.len();
        self.relations.push(RelationEntry {
            name,
            kind,
            columns: BTreeMap::new(),
            parents: vec![],
            children: vec![],
            indexes: vec![],
        });
        self.by_oid.insert(oid, id);
        id
    }

    pub fn lookup(&self, oid: Oid) -> Option<RelationId> {
        self.by_oid.get(&oid).copied()
    }

    pub fn relation(&self, id: RelationId) -> &RelationEntry {
        &self.relations[id]
    }

    pub fn link(&mut self, child: RelationId, parent: RelationId, seq_no: i32) {
        self.relations[child].parents.push((seq_no, parent));
        self.relations[parent].children.push(child);
    }

    pub fn set_column(&mut self, id: RelationId, name: String, column: Column) {
        self.relations[id].columns.insert(name, column);
    }

    /// Register an index globally and, when its relation is part of this
    /// snapshot, on that relation.
    pub fn add_index(&mut self, name: String, index: Index, owner: Option<RelationId>) {
        if let Some(owner) = owner {
            self.relations[owner].indexes.push(name.clone());
        }
        self.indexes.insert(name, index);
    }

    pub fn finish(self) -> Schema {
        let mut schema = Schema {
            name: self.name,
            indexes: self.indexes,
            ..Default::default()
        };

        let names: Vec<&str> = self.relations.iter().map(|r| r.name.as_str()).collect();

        for entry in &self.relations {
            let mut parents = entry.parents.clone();
            parents.sort_by_key(|(seq_no, _)| *seq_no);
            let inherits = parents
                .into_iter()
                .map(|(_, id)| names[id].to_string())
                .collect();

            let mut children: Vec<String> =
                entry.children.iter().map(|id| names[*id].to_string()).collect();
            children.sort();
            children.dedup();

            let mut indexes = entry.indexes.clone();
            indexes.sort();
            indexes.dedup();

            match entry.kind {
                RelationKind::Table => schema.tables.push(entry.name.clone()),
                RelationKind::View => schema.views.push(entry.name.clone()),
                RelationKind::MaterializedView => schema.materialized.push(entry.name.clone()),
            }

            schema.relations.insert(
                entry.name.clone(),
                Relation {
                    kind: entry.kind,
                    columns: entry.columns.clone(),
                    inherits,
                    children,
                    indexes,
                },
            );
        }

        schema.tables.sort();
        schema.views.sort();
        schema.materialized.sort();
        schema
    }
}
