//! iou state entity for database storage.

use std::str::FromStr;

use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue::NotSet, Set, Value};

use iouvault_types::{ColumnValue, EntityDescriptor, IouRecord, SchemaVersion};

use crate::{Error, StoredIou};

/// iou state database model.
///
/// one row per stored version of an obligation. `id` is the per-version row id;
/// every other column is declared by the schema's column descriptors.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "iou_states")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    pub lender: Option<String>,
    pub borrower: Option<String>,

    /// amount owed
    pub value: i32,

    /// id shared by all versions of one obligation
    pub linear_id: Option<Uuid>,

    /// opaque public key bytes
    #[sea_orm(column_type = "Blob", nullable)]
    pub public_key: Option<Vec<u8>>,

    /// opaque detached signature bytes
    #[sea_orm(column_type = "Blob", nullable)]
    pub signed_message: Option<Vec<u8>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// lay the mapped columns out as a tuple in the entity's declared order.
    fn column_values(&self, entity: &EntityDescriptor) -> crate::Result<Vec<ColumnValue>> {
        entity
            .columns
            .iter()
            .map(|descriptor| {
                let column = Column::from_str(descriptor.column).map_err(|_| {
                    Error::InvalidData(format!(
                        "column {} is not mapped by table {}",
                        descriptor.column, entity.table
                    ))
                })?;
                to_column_value(descriptor.column, self.get(column))
            })
            .collect()
    }
}

fn to_column_value(column: &str, value: Value) -> crate::Result<ColumnValue> {
    let value = match value {
        Value::String(Some(s)) => ColumnValue::Text(s.to_string()),
        Value::Int(Some(v)) => ColumnValue::Int32(v),
        Value::Uuid(Some(u)) => ColumnValue::Uuid(Uuid::from_bytes(*u.as_bytes())),
        Value::Bytes(Some(b)) => ColumnValue::Bytes(b.to_vec()),
        Value::String(None) | Value::Int(None) | Value::Uuid(None) | Value::Bytes(None) => {
            ColumnValue::Null
        }
        other => {
            return Err(Error::InvalidData(format!(
                "unsupported value in column {}: {:?}",
                column, other
            )));
        }
    };
    Ok(value)
}

impl TryFrom<Model> for StoredIou {
    type Error = Error;

    fn try_from(model: Model) -> crate::Result<Self> {
        let id = u64::try_from(model.id)
            .map_err(|_| Error::InvalidData(format!("negative row id {}", model.id)))?;
        let row = model.column_values(SchemaVersion::V1.iou_entity())?;
        let record = IouRecord::from_versioned_row(SchemaVersion::V1, &row)?;
        Ok(StoredIou { id, record })
    }
}

impl From<&IouRecord> for ActiveModel {
    fn from(record: &IouRecord) -> Self {
        ActiveModel {
            id: NotSet,
            lender: Set(record.lender().map(str::to_string)),
            borrower: Set(record.borrower().map(str::to_string)),
            value: Set(record.value()),
            linear_id: Set(record.linear_id().map(|id| id.as_uuid())),
            public_key: Set(record.public_key().map(|k| k.as_bytes().to_vec())),
            signed_message: Set(record.signed_message().map(|s| s.as_bytes().to_vec())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use iouvault_types::{LinearId, PublicKey, SignedMessage};
    use sea_orm::ActiveValue;

    fn model() -> Model {
        Model {
            id: 7,
            lender: Some("Alice".to_string()),
            borrower: Some("Bob".to_string()),
            value: 100,
            linear_id: Some(Uuid::from_u128(42)),
            public_key: Some(vec![0x01, 0x02]),
            signed_message: None,
        }
    }

    #[test]
    fn test_model_to_stored_iou() {
        let stored = StoredIou::try_from(model()).unwrap();
        assert_eq!(stored.id, 7);
        assert_eq!(stored.record.lender(), Some("Alice"));
        assert_eq!(stored.record.borrower(), Some("Bob"));
        assert_eq!(stored.record.value(), 100);
        assert_eq!(
            stored.record.linear_id(),
            Some(LinearId::from_uuid(Uuid::from_u128(42)))
        );
        assert_eq!(
            stored.record.public_key(),
            Some(&PublicKey::from_bytes(vec![0x01, 0x02]))
        );
        assert!(stored.record.signed_message().is_none());
    }

    #[test]
    fn test_negative_row_id_is_invalid() {
        let model = Model { id: -1, ..model() };
        assert!(matches!(
            StoredIou::try_from(model),
            Err(Error::InvalidData(_))
        ));
    }

    #[test]
    fn test_column_values_follow_descriptor_order() {
        let row = model()
            .column_values(SchemaVersion::V1.iou_entity())
            .unwrap();
        assert_eq!(row, IouRecord::from_row(&row).unwrap().to_row());
        assert_eq!(row[2], ColumnValue::Int32(100));
        assert_eq!(row[5], ColumnValue::Null);
    }

    #[test]
    fn test_active_model_from_record() {
        let record = IouRecord::new(
            "Alice",
            "Bob",
            -5,
            LinearId::from_uuid(Uuid::from_u128(1)),
            None,
            Some(SignedMessage::from_bytes(vec![0xaa])),
        );
        let active: ActiveModel = (&record).into();
        assert!(matches!(active.id, NotSet));
        assert!(matches!(active.value, ActiveValue::Set(-5)));
        assert!(matches!(active.public_key, ActiveValue::Set(None)));
        assert!(matches!(
            active.signed_message,
            ActiveValue::Set(Some(ref sig)) if sig == &[0xaa]
        ));
    }
}
