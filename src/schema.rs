use std::collections::BTreeMap;
use std::fmt;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Marker recorded for an index key part that is an expression rather than
/// a plain column.
pub const EXPRESSION_PLACEHOLDER: &str = "[expression]";

/// A resolved snapshot of one namespace.
///
/// Every name in `tables`, `views` and `materialized` has a matching entry in
/// `relations`, and each relation name appears in exactly one of those lists.
/// The lists are sorted ascending; the maps iterate in name order.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct Schema {
    pub name: String,
    /// Database the snapshot was taken from, when the reader knows it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    pub relations: BTreeMap<String, Relation>,
    pub tables: Vec<String>,
    pub views: Vec<String>,
    pub materialized: Vec<String>,
    pub indexes: BTreeMap<String, Index>,
    #[serde(default)]
    pub sequences: BTreeMap<String, Sequence>,
    /// Keyed by identity signature, e.g. `add(integer, integer)`.
    #[serde(default)]
    pub functions: BTreeMap<String, Function>,
}

impl Schema {
    pub fn relation(&self, name: &str) -> Option<&Relation> {
        self.relations.get(name)
    }

    /// Indexes attached to the given relation, in name order.
    pub fn indexes_on<'a>(&'a self, relation: &str) -> impl Iterator<Item = (&'a str, &'a Index)> {
        self.relations
            .get(relation)
            .into_iter()
            .flat_map(|r| r.indexes.iter())
            .filter_map(|name| self.indexes.get(name).map(|i| (name.as_str(), i)))
    }
}

#[derive(
    Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString,
)]
pub enum RelationKind {
    #[serde(rename = "table")]
    #[strum(serialize = "table")]
    Table,
    #[serde(rename = "view")]
    #[strum(serialize = "view")]
    View,
    #[serde(rename = "materialized view")]
    #[strum(serialize = "materialized view")]
    MaterializedView,
}

/// A table, view or materialized view.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    pub kind: RelationKind,
    pub columns: BTreeMap<String, Column>,
    /// Direct parents, in declaration order.
    pub inherits: Vec<String>,
    /// Direct children, sorted by name.
    pub children: Vec<String>,
    /// Names of the indexes defined on this relation, sorted.
    pub indexes: Vec<String>,
}

impl Relation {
    pub fn new(kind: RelationKind) -> Self {
        Self {
            kind,
            columns: BTreeMap::new(),
            inherits: vec![],
            children: vec![],
            indexes: vec![],
        }
    }

    /// Column names in declaration order.
    pub fn column_names(&self) -> Vec<String> {
        self.columns
            .iter()
            .sorted_by_key(|(_, c)| c.position)
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// The column at a 1-based position, if any.
    pub fn column_at(&self, position: i16) -> Option<&str> {
        self.columns
            .iter()
            .find(|(_, c)| c.position == position)
            .map(|(name, _)| name.as_str())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Column {
    #[serde(rename = "type")]
    pub r#type: String,
    pub not_null: bool,
    /// 1-based.
    pub position: i16,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Index {
    /// The relation the index is defined on.
    pub relation: String,
    /// Access method, e.g. `btree` or `gin`.
    pub method: String,
    pub unique: bool,
    pub primary: bool,
    pub columns: Vec<IndexKey>,
}

impl Index {
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|k| k.to_string()).collect()
    }
}

/// One key part of an index.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IndexKey {
    Column(String),
    /// An expression; its text is not read.
    Expression,
    /// A column position that could not be mapped to a name, e.g. because the
    /// indexed relation is not part of the snapshot.
    Position(i16),
}

impl fmt::Display for IndexKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexKey::Column(name) => f.write_str(name),
            IndexKey::Expression => f.write_str(EXPRESSION_PLACEHOLDER),
            IndexKey::Position(p) => write!(f, "#{p}"),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    pub start: i64,
    pub increment_by: i64,
    pub max_value: i64,
    pub min_value: i64,
    pub cycle: bool,
}

#[derive(
    Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Volatility {
    Immutable,
    Stable,
    Volatile,
}

impl Volatility {
    /// Decode `pg_proc.provolatile`.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "i" => Some(Self::Immutable),
            "s" => Some(Self::Stable),
            "v" => Some(Self::Volatile),
            _ => None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Function {
    pub name: String,
    pub arguments: String,
    pub return_type: String,
    pub volatility: Volatility,
}

impl Function {
    pub fn signature(&self) -> String {
        format!("{}({})", self.name, self.arguments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(r#type: &str, position: i16) -> Column {
        Column {
            r#type: r#type.to_string(),
            not_null: false,
            position,
        }
    }

    #[test]
    fn test_column_names_follow_positions() {
        let mut relation = Relation::new(RelationKind::Table);
        relation.columns.insert("t".to_string(), column("timestamp", 3));
        relation.columns.insert("id".to_string(), column("uuid", 1));
        relation.columns.insert("name".to_string(), column("text", 2));

        assert_eq!(relation.column_names(), vec!["id", "name", "t"]);
        assert_eq!(relation.column_at(2), Some("name"));
        assert_eq!(relation.column_at(4), None);
    }

    #[test]
    fn test_relation_kind_display() {
        assert_eq!(RelationKind::MaterializedView.to_string(), "materialized view");
        assert_eq!(
            serde_json::to_string(&RelationKind::Table).unwrap(),
            "\"table\""
        );
        assert_eq!(
            "view".parse::<RelationKind>().unwrap(),
            RelationKind::View
        );
    }

    #[test]
    fn test_index_key_display() {
        let index = Index {
            relation: "indexed".to_string(),
            method: "btree".to_string(),
            unique: false,
            primary: false,
            columns: vec![IndexKey::Expression, IndexKey::Column("minor".to_string())],
        };
        assert_eq!(index.column_names(), vec![EXPRESSION_PLACEHOLDER, "minor"]);
    }

    #[test]
    fn test_volatility_codes() {
        assert_eq!(Volatility::from_code("i"), Some(Volatility::Immutable));
        assert_eq!(Volatility::from_code("x"), None);
        assert_eq!(Volatility::Stable.to_string(), "stable");
    }
}
