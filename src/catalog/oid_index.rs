use std::collections::HashMap;

use itertools::Itertools;

use crate::repository::interface::{
    AccessMethodRow, IndexRow, InheritsRow, Oid, RelationRow, TypeRow,
};

/// Lookup tables over the raw listings of one resolution pass.
///
/// Duplicate OIDs are resolved last-write-wins. Map iteration order is
/// arbitrary; anything user-visible has to be sorted afterwards.
#[derive(Debug, Default)]
pub struct OidIndex {
    pub relations: HashMap<Oid, RelationRow>,
    pub types: HashMap<Oid, TypeRow>,
    pub indexes: HashMap<Oid, IndexRow>,
    pub access_methods: HashMap<Oid, AccessMethodRow>,
    pub inherits: Vec<InheritsRow>,
}

impl OidIndex {
    pub fn new(
        relations: Vec<RelationRow>,
        types: Vec<TypeRow>,
        indexes: Vec<IndexRow>,
        access_methods: Vec<AccessMethodRow>,
        inherits: Vec<InheritsRow>,
    ) -> Self {
        Self {
            relations: relations.into_iter().map(|r| (r.oid, r)).collect(),
            types: types.into_iter().map(|t| (t.oid, t)).collect(),
            indexes: indexes.into_iter().map(|i| (i.index, i)).collect(),
            access_methods: access_methods.into_iter().map(|a| (a.oid, a)).collect(),
            inherits,
        }
    }

    pub fn type_name(&self, oid: Oid) -> Option<&str> {
        self.types.get(&oid).map(|t| t.name.as_str())
    }

    pub fn access_method_name(&self, oid: Oid) -> Option<&str> {
        self.access_methods.get(&oid).map(|a| a.name.as_str())
    }

    /// Relation rows sorted by name, so passes that walk them behave the same
    /// from run to run.
    pub fn relations_by_name(&self) -> Vec<&RelationRow> {
        self.relations
            .values()
            .sorted_by(|a, b| a.name.cmp(&b.name).then(a.oid.cmp(&b.oid)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ty(oid: Oid, name: &str) -> TypeRow {
        TypeRow {
            oid,
            name: name.to_string(),
        }
    }

    fn relation(oid: Oid, name: &str) -> RelationRow {
        RelationRow {
            oid,
            name: name.to_string(),
            type_oid: 0,
            access_method: 0,
            kind: "r".to_string(),
        }
    }

    #[test]
    fn test_last_write_wins() {
        let index = OidIndex::new(
            vec![],
            vec![ty(25, "text"), ty(23, "int4"), ty(25, "varchar")],
            vec![],
            vec![],
            vec![],
        );
        assert_eq!(index.types.len(), 2);
        assert_eq!(index.type_name(25), Some("varchar"));
        assert_eq!(index.type_name(1), None);
    }

    #[test]
    fn test_relations_by_name() {
        let index = OidIndex::new(
            vec![relation(3, "c"), relation(1, "b"), relation(2, "a")],
            vec![],
            vec![],
            vec![],
            vec![],
        );
        let names: Vec<_> = index
            .relations_by_name()
            .into_iter()
            .map(|r| r.name.as_str())
            .collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }
}
