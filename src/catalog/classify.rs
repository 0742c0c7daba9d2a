use tracing::debug;

use crate::schema::RelationKind;

use super::builder::SchemaBuilder;
use super::oid_index::OidIndex;

/// Decoded `pg_class.relkind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindCode {
    Table,
    View,
    MaterializedView,
    Index,
    /// Sequences, composite types, foreign tables, ...
    ///
    /// Also partitioned tables (`p`) and partitioned indexes (`I`). Their
    /// partitions are plain tables, so they show up as tables with an empty
    /// `inherits` and the partitioned parent is absent from the snapshot.
    Other,
}

impl KindCode {
    pub fn from_code(code: &str) -> Self {
        match code {
            "r" => Self::Table,
            "v" => Self::View,
            "m" => Self::MaterializedView,
            "i" => Self::Index,
            _ => Self::Other,
        }
    }

    /// The kind of snapshot relation this code produces, if any.
    pub fn relation_kind(self) -> Option<RelationKind> {
        match self {
            Self::Table => Some(RelationKind::Table),
            Self::View => Some(RelationKind::View),
            Self::MaterializedView => Some(RelationKind::MaterializedView),
            Self::Index | Self::Other => None,
        }
    }
}

/// Seed the builder with one empty relation per table, view and materialized
/// view. Indexes and unmodelled kinds are skipped.
pub(super) fn classify_relations(oids: &OidIndex, builder: &mut SchemaBuilder) {
    for row in oids.relations_by_name() {
        match KindCode::from_code(&row.kind).relation_kind() {
            Some(kind) => {
                builder.add_relation(row.oid, row.name.clone(), kind);
            }
            None => debug!("Not classifying {:?} (relkind {:?})", row.name, row.kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use crate::repository::interface::RelationRow;

    use super::*;

    #[rstest]
    #[case("r", KindCode::Table)]
    #[case("v", KindCode::View)]
    #[case("m", KindCode::MaterializedView)]
    #[case("i", KindCode::Index)]
    #[case("S", KindCode::Other)]
    #[case("c", KindCode::Other)]
    #[case("f", KindCode::Other)]
    #[case("p", KindCode::Other)]
    #[case("I", KindCode::Other)]
    #[case("", KindCode::Other)]
    fn test_kind_codes(#[case] code: &str, #[case] expected: KindCode) {
        assert_eq!(KindCode::from_code(code), expected);
    }

    #[test]
    fn test_classify_relations() {
        let row = |oid, name: &str, kind: &str| RelationRow {
            oid,
            name: name.to_string(),
            type_oid: 0,
            access_method: 0,
            kind: kind.to_string(),
        };
        let oids = OidIndex::new(
            vec![
                row(1, "t2", "r"),
                row(2, "t1", "r"),
                row(3, "v1", "v"),
                row(4, "m1", "m"),
                row(5, "t1_pkey", "i"),
                row(6, "t1_id_seq", "S"),
            ],
            vec![],
            vec![],
            vec![],
            vec![],
        );

        let mut builder = SchemaBuilder::new("public".to_string());
        classify_relations(&oids, &mut builder);

        assert!(builder.lookup(5).is_none());
        assert!(builder.lookup(6).is_none());

        let schema = builder.finish();
        assert_eq!(schema.tables, vec!["t1", "t2"]);
        assert_eq!(schema.views, vec!["v1"]);
        assert_eq!(schema.materialized, vec!["m1"]);
        assert_eq!(schema.relations.len(), 4);
        assert_eq!(schema.relations["m1"].kind, RelationKind::MaterializedView);
    }
}
