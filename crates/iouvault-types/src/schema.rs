//! versioned column layout of the obligation table.
//!
//! a schema version is an immutable description of which columns a table has,
//! what type each one holds and whether it may be null. evolution is append-only:
//! a changed layout becomes a new [`SchemaVersion`] variant with its own
//! descriptor, and existing versions are never edited. this lets one store hold
//! rows written under several historical versions.

use std::fmt;

use serde::Serialize;

use crate::{Error, Result};

/// storage type of a single column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    /// variable-length text
    Text,
    /// signed 32-bit integer
    Integer32,
    /// 128-bit uuid
    Uuid,
    /// variable-length byte sequence
    Bytes,
}

impl ColumnType {
    /// name used in human-readable output.
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Text => "text",
            ColumnType::Integer32 => "integer32",
            ColumnType::Uuid => "uuid",
            ColumnType::Bytes => "bytes",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// mapping of one in-memory field to one table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColumnDescriptor {
    /// field name on the record
    pub field: &'static str,
    /// column name in the table
    pub column: &'static str,
    /// storage type
    pub column_type: ColumnType,
    /// whether the column accepts null
    pub nullable: bool,
}

impl ColumnDescriptor {
    const fn new(
        field: &'static str,
        column: &'static str,
        column_type: ColumnType,
        nullable: bool,
    ) -> Self {
        Self {
            field,
            column,
            column_type,
            nullable,
        }
    }
}

/// a mapped entity: one table and its ordered columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EntityDescriptor {
    /// entity type name
    pub name: &'static str,
    /// table name
    pub table: &'static str,
    /// columns in row order
    pub columns: &'static [ColumnDescriptor],
}

impl EntityDescriptor {
    /// look up a column by its column name.
    pub fn column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.column == name)
    }

    /// column names in row order.
    pub fn column_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns.iter().map(|c| c.column)
    }
}

/// a named, numbered schema and the entities it maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MappedSchema {
    /// logical schema family shared by all versions
    pub family: &'static str,
    /// version number within the family
    pub version: u32,
    /// entities mapped by this version
    pub entities: &'static [EntityDescriptor],
}

impl MappedSchema {
    /// look up a mapped entity by its table name.
    pub fn entity_for_table(&self, table: &str) -> Option<&EntityDescriptor> {
        self.entities.iter().find(|e| e.table == table)
    }
}

/// the `iou_states` table as defined by version 1.
pub const PERSISTENT_IOU_V1: EntityDescriptor = EntityDescriptor {
    name: "PersistentIOU",
    table: "iou_states",
    columns: &[
        ColumnDescriptor::new("lender", "lender", ColumnType::Text, true),
        ColumnDescriptor::new("borrower", "borrower", ColumnType::Text, true),
        ColumnDescriptor::new("value", "value", ColumnType::Integer32, false),
        ColumnDescriptor::new("linear_id", "linear_id", ColumnType::Uuid, true),
        ColumnDescriptor::new("public_key", "public_key", ColumnType::Bytes, true),
        ColumnDescriptor::new("signed_message", "signed_message", ColumnType::Bytes, true),
    ],
};

/// version 1 of the obligation schema.
pub const IOU_SCHEMA_V1: MappedSchema = MappedSchema {
    family: "IOUSchema",
    version: 1,
    entities: &[PERSISTENT_IOU_V1],
};

/// registry of every obligation schema version ever defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SchemaVersion {
    /// initial layout: six columns in `iou_states`
    V1,
}

impl SchemaVersion {
    /// all versions, oldest first.
    pub const ALL: &'static [SchemaVersion] = &[SchemaVersion::V1];

    /// the version new records are written under.
    pub const LATEST: SchemaVersion = SchemaVersion::V1;

    /// resolve a version number.
    pub fn from_number(version: u32) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|v| v.number() == version)
            .ok_or(Error::UnknownSchemaVersion(version))
    }

    /// version number of this schema.
    pub fn number(&self) -> u32 {
        self.schema().version
    }

    /// full schema description for this version.
    pub fn schema(&self) -> &'static MappedSchema {
        match self {
            SchemaVersion::V1 => &IOU_SCHEMA_V1,
        }
    }

    /// the obligation entity as laid out in this version.
    pub fn iou_entity(&self) -> &'static EntityDescriptor {
        match self {
            SchemaVersion::V1 => &PERSISTENT_IOU_V1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_v1_identity() {
        let schema = SchemaVersion::V1.schema();
        assert_eq!(schema.family, "IOUSchema");
        assert_eq!(schema.version, 1);
        assert_eq!(schema.entities.len(), 1);
        assert_eq!(schema.entities[0].name, "PersistentIOU");
        assert_eq!(schema.entities[0].table, "iou_states");
    }

    #[test]
    fn test_v1_columns() {
        let names: Vec<_> = PERSISTENT_IOU_V1.column_names().collect();
        assert_eq!(
            names,
            vec![
                "lender",
                "borrower",
                "value",
                "linear_id",
                "public_key",
                "signed_message"
            ]
        );

        // value is the only non-nullable column
        let non_null: Vec<_> = PERSISTENT_IOU_V1
            .columns
            .iter()
            .filter(|c| !c.nullable)
            .map(|c| c.column)
            .collect();
        assert_eq!(non_null, vec!["value"]);

        let linear_id = PERSISTENT_IOU_V1.column("linear_id").unwrap();
        assert_eq!(linear_id.field, "linear_id");
        assert_eq!(linear_id.column_type, ColumnType::Uuid);
    }

    #[test]
    fn test_registry_lookup() {
        assert_eq!(SchemaVersion::from_number(1).unwrap(), SchemaVersion::V1);
        assert_eq!(SchemaVersion::LATEST.number(), 1);
        assert_eq!(
            SchemaVersion::from_number(2),
            Err(Error::UnknownSchemaVersion(2))
        );
    }

    #[test]
    fn test_versions_share_family() {
        for version in SchemaVersion::ALL {
            assert_eq!(version.schema().family, "IOUSchema");
            assert!(version.schema().entity_for_table("iou_states").is_some());
        }
    }

    #[test]
    fn test_schema_serializes() {
        let json = serde_json::to_value(&IOU_SCHEMA_V1).unwrap();
        assert_eq!(json["family"], "IOUSchema");
        assert_eq!(json["entities"][0]["columns"][2]["column_type"], "integer32");
    }
}
