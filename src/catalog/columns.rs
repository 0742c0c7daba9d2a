use crate::repository::interface::AttributeRow;
use crate::schema::Column;

use super::builder::SchemaBuilder;
use super::oid_index::OidIndex;
use super::{CatalogError, CatalogResult};

/// Attach user columns to the relations of the snapshot.
///
/// System columns (negative positions) and attributes of relations outside
/// the snapshot are skipped. A type that can't be resolved is an error.
pub(super) fn attach_columns(
    oids: &OidIndex,
    attributes: &[AttributeRow],
    builder: &mut SchemaBuilder,
) -> CatalogResult<()> {
    for attr in attributes {
        if attr.position < 0 {
            continue;
        }
        let Some(owner) = builder.lookup(attr.relation) else {
            continue;
        };

        let r#type = oids
            .type_name(attr.type_oid)
            .ok_or_else(|| CatalogError::UnresolvedType {
                oid: attr.type_oid,
                relation: builder.relation(owner).name.clone(),
                column: attr.name.clone(),
            })?
            .to_string();

        builder.set_column(
            owner,
            attr.name.clone(),
            Column {
                r#type,
                not_null: attr.not_null,
                position: attr.position,
            },
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::repository::interface::TypeRow;
    use crate::schema::RelationKind;

    use super::*;

    fn attr(relation: u32, name: &str, type_oid: u32, position: i16) -> AttributeRow {
        AttributeRow {
            relation,
            name: name.to_string(),
            type_oid,
            position,
            not_null: position == 1,
        }
    }

    fn oids() -> OidIndex {
        OidIndex::new(
            vec![],
            vec![
                TypeRow {
                    oid: 23,
                    name: "int4".to_string(),
                },
                TypeRow {
                    oid: 25,
                    name: "text".to_string(),
                },
            ],
            vec![],
            vec![],
            vec![],
        )
    }

    #[test]
    fn test_attach_columns() {
        let mut builder = SchemaBuilder::new("public".to_string());
        builder.add_relation(10, "simple".to_string(), RelationKind::Table);

        attach_columns(
            &oids(),
            &[
                attr(10, "name", 25, 2),
                attr(10, "id", 23, 1),
                attr(10, "ctid", 999, -1),
                // Not tracked; unresolvable type doesn't matter
                attr(11, "other", 999, 1),
            ],
            &mut builder,
        )
        .unwrap();

        let schema = builder.finish();
        let simple = &schema.relations["simple"];
        assert_eq!(simple.columns.len(), 2);
        assert_eq!(simple.column_names(), vec!["id", "name"]);
        assert_eq!(simple.columns["id"].r#type, "int4");
        assert!(simple.columns["id"].not_null);
        assert!(!simple.columns["name"].not_null);
    }

    #[test]
    fn test_attach_columns_unresolved_type() {
        let mut builder = SchemaBuilder::new("public".to_string());
        builder.add_relation(10, "simple".to_string(), RelationKind::Table);

        let error = attach_columns(&oids(), &[attr(10, "x", 7, 1)], &mut builder).unwrap_err();
        assert_eq!(
            error.to_string(),
            "Type with OID 7 of column simple.x doesn't exist"
        );
    }
}
