use tracing::{debug, warn};

use crate::schema::{Index, IndexKey};

use super::builder::SchemaBuilder;
use super::classify::KindCode;
use super::oid_index::OidIndex;
use super::{CatalogError, CatalogResult};

/// Resolve every index relation of the namespace into an [`Index`] and
/// attach it to the relation it is defined on.
///
/// Must run after the columns have been attached, since key positions are
/// mapped to column names. An index whose relation is outside the snapshot is
/// still recorded, with its keys left as positions.
pub(super) fn resolve_indexes(oids: &OidIndex, builder: &mut SchemaBuilder) -> CatalogResult<()> {
    for row in oids.relations_by_name() {
        if KindCode::from_code(&row.kind) != KindCode::Index {
            continue;
        }

        let details = oids
            .indexes
            .get(&row.oid)
            .ok_or_else(|| CatalogError::MissingIndexDetails {
                oid: row.oid,
                index: row.name.clone(),
            })?;

        let method = oids
            .access_method_name(row.access_method)
            .ok_or_else(|| CatalogError::UnresolvedAccessMethod {
                oid: row.access_method,
                index: row.name.clone(),
            })?
            .to_string();

        let owner = builder.lookup(details.relation);
        let (relation, columns) = match owner {
            Some(owner) => {
                let entry = builder.relation(owner);
                let columns: Vec<IndexKey> = details
                    .keys
                    .iter()
                    .map(|&position| match position {
                        0 => IndexKey::Expression,
                        p => match entry.column_at(p) {
                            Some(name) => IndexKey::Column(name.to_string()),
                            None => {
                                warn!(
                                    "Index {:?} refers to position {p} missing from {:?}",
                                    row.name, entry.name
                                );
                                IndexKey::Position(p)
                            }
                        },
                    })
                    .collect();
                (entry.name.clone(), columns)
            }
            None => {
                debug!(
                    "Index {:?} is defined on relation {} outside of the namespace",
                    row.name, details.relation
                );
                let columns: Vec<IndexKey> = details
                    .keys
                    .iter()
                    .map(|&position| match position {
                        0 => IndexKey::Expression,
                        p => IndexKey::Position(p),
                    })
                    .collect();
                let relation = oids
                    .relations
                    .get(&details.relation)
                    .map(|r| r.name.clone())
                    .unwrap_or_else(|| details.relation.to_string());
                (relation, columns)
            }
        };

        builder.add_index(
            row.name.clone(),
            Index {
                relation,
                method,
                unique: details.unique,
                primary: details.primary,
                columns,
            },
            owner,
        );
    }
    Ok(())
}
