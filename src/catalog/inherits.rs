use tracing::debug;

use super::builder::SchemaBuilder;
use super::oid_index::OidIndex;

/// Record parent and child links for every inheritance edge whose endpoints
/// are both part of the snapshot. Edges reaching outside of it are dropped.
pub(super) fn link_inheritance(oids: &OidIndex, builder: &mut SchemaBuilder) {
    for edge in &oids.inherits {
        match (builder.lookup(edge.child), builder.lookup(edge.parent)) {
            (Some(child), Some(parent)) => builder.link(child, parent, edge.seq_no),
            _ => debug!(
                "Skipping inheritance edge {} -> {} outside of the namespace",
                edge.child, edge.parent
            ),
        }
    }
}
